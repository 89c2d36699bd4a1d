//! Integration tests for audiomark
//!
//! Tests the full path from note text to controls, playback and overlays, and
//! the picker over a vault on disk.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use audiomark::host::{TextBuffer, VaultWorkspace};
use audiomark::playback::memory::{MemoryMedia, MemoryRoot, MemorySurface};
use audiomark::playback::{Activation, MediaEvent, OverlayState};
use audiomark::{
    collect_audio_references, insert_marker, open_audio_picker, render_note, render_note_html, scan_markers,
    AudiomarkError, MarkerBinding, Node, RootHandle, Settings,
};

#[test]
fn test_render_note_with_markers() {
    let source = "# Meeting\n\nIntro at [audio:standup.mp3@0] and the demo [audio:standup.mp3@95-140].\n\n![[standup.mp3]]\n";
    let root: RootHandle = Rc::new(MemoryRoot::new());
    let fragment = render_note(source, root);

    let controls = fragment.controls();
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[0].binding(), &MarkerBinding::new("standup.mp3", 0, None));
    assert_eq!(controls[1].binding(), &MarkerBinding::new("standup.mp3", 95, Some(140)));
    assert_eq!(controls[1].label(), "Play standup.mp3 @ 95s");
}

#[test]
fn test_rewrite_keeps_literal_text() {
    let source = "a [audio:x.mp3@1] b [audio:broken@] c [audio:y.mp3@2-3] d";
    let root: RootHandle = Rc::new(MemoryRoot::new());
    let fragment = render_note(source, root);

    let mut expected = source.to_string();
    for token in scan_markers(source).iter().rev() {
        expected.replace_range(token.span.clone(), "");
    }
    assert_eq!(fragment.literal_text(), expected);
    assert!(fragment.literal_text().contains("[audio:broken@]"));
}

#[test]
fn test_render_note_html() {
    let html = render_note_html("Hear [audio:a.mp3@3-6]");
    assert!(html.contains("data-audio-file=\"a.mp3\""));
    assert!(html.contains("data-end=\"6\""));
    assert!(html.contains(">Play a.mp3 @ 3s</button>"));
    assert!(!html.contains("[audio:"));
}

#[test]
fn test_click_plays_segment_and_clears_overlay() {
    let root = Rc::new(MemoryRoot::new());
    let clip = root.push(MemoryMedia::new("vault/rec/clip.mp3").with_metadata(20.0));
    let handle: RootHandle = root.clone();
    let fragment = render_note("Key point: [audio:clip.mp3@5-8]", handle);

    let surface = Rc::new(MemorySurface::new());
    let binder = Settings::default().binder(surface.clone());
    let control = fragment.controls()[0].clone();

    let outcome = binder.activate(&control);
    assert_eq!(
        outcome,
        Activation::Started {
            bounded: true,
            overlay: OverlayState::Drawn
        }
    );
    assert_eq!(clip.snapshot().current_time, 5.0);
    assert_eq!(surface.len(), 1);

    clip.advance_to(7.0);
    assert_eq!(surface.len(), 1);
    clip.advance_to(8.2);

    let state = clip.snapshot();
    assert!(state.paused);
    assert_eq!(state.pauses, 1);
    assert!(surface.is_empty());
    assert_eq!(clip.listener_count(), 0);
}

#[test]
fn test_click_before_player_is_ready() {
    let root = Rc::new(MemoryRoot::new());
    let clip = root.push(MemoryMedia::new("clip.mp3"));
    let handle: RootHandle = root.clone();
    let fragment = render_note("[audio:clip.mp3@10]", handle);

    let surface = Rc::new(MemorySurface::new());
    let binder = Settings::default().binder(surface.clone());
    let control = fragment.controls()[0].clone();

    assert_eq!(
        binder.activate(&control),
        Activation::Started {
            bounded: false,
            overlay: OverlayState::Deferred
        }
    );
    clip.load_metadata(40.0);
    assert_eq!(surface.len(), 1);
    assert_eq!(clip.listener_count_for(MediaEvent::LoadedMetadata), 0);

    clip.finish();
    assert!(surface.is_empty());
}

#[test]
fn test_click_without_player_does_nothing() {
    let root = Rc::new(MemoryRoot::new());
    let other = root.push(MemoryMedia::new("other.mp3").with_metadata(20.0));
    let handle: RootHandle = root.clone();
    let fragment = render_note("[audio:clip.mp3@10]", handle);

    let surface = Rc::new(MemorySurface::new());
    let binder = Settings::default().binder(surface.clone());

    assert_eq!(binder.activate(fragment.controls()[0]), Activation::NoTarget);
    assert_eq!(other.snapshot().play_calls, 0);
    assert!(surface.is_empty());
}

#[test]
fn test_rerender_is_stable() {
    let root: RootHandle = Rc::new(MemoryRoot::new());
    let mut fragment = render_note("x [audio:a.mp3@1] y", root.clone());
    let once = fragment.clone();
    audiomark::rewrite_markers(&mut fragment, &root);
    assert_eq!(fragment, once);
    assert!(matches!(&fragment, Node::Container(_)));
}

struct TempVault {
    dir: PathBuf,
}

impl TempVault {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("audiomark-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("notes")).unwrap();
        fs::create_dir_all(dir.join("attachments/audio")).unwrap();
        Self { dir }
    }

    fn write(&self, rel: &str, content: &str) {
        fs::write(self.dir.join(rel), content).unwrap();
    }
}

impl Drop for TempVault {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn test_vault_picker_lists_embedded_audio() {
    let vault = TempVault::new("picker");
    vault.write("attachments/audio/standup.mp3", "");
    vault.write("attachments/audio/retro.mp3", "");
    vault.write("notes/local.mp3", "");
    vault.write("attachments/diagram.png", "");
    vault.write(
        "notes/day.md",
        "![[standup.mp3]]\n![[diagram.png]]\n![[nowhere.mp3]]\n![[local.mp3|Local]]\n![[attachments/audio/retro.mp3#t]]\n",
    );

    let workspace = VaultWorkspace::new(&vault.dir).with_active_note("notes/day.md");
    let refs = collect_audio_references(&workspace, "mp3").unwrap();

    let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["standup.mp3", "local.mp3", "retro.mp3"]);
    assert_eq!(refs[0].src, "attachments/audio/standup.mp3");
    assert_eq!(refs[1].src, "notes/local.mp3");
    assert_eq!(refs[2].src, "attachments/audio/retro.mp3");

    let mut editor = TextBuffer::new("", 0);
    insert_marker(&mut editor, &refs[0], Settings::default().insert);
    assert_eq!(editor.text, "[audio:standup.mp3@0]");
}

#[test]
fn test_vault_picker_errors_become_notices() {
    let vault = TempVault::new("notices");

    let no_note = VaultWorkspace::new(&vault.dir);
    assert!(matches!(
        collect_audio_references(&no_note, "mp3"),
        Err(AudiomarkError::NoActiveNote)
    ));
    assert!(open_audio_picker(&no_note, "mp3").is_none());
    assert_eq!(no_note.notices(), vec!["No active note".to_string()]);

    let unsaved = VaultWorkspace::new(&vault.dir).with_unsaved_note();
    assert!(open_audio_picker(&unsaved, "mp3").is_none());
    assert_eq!(unsaved.notices(), vec!["No file in active note".to_string()]);

    let missing = VaultWorkspace::new(&vault.dir).with_active_note("notes/missing.md");
    assert!(open_audio_picker(&missing, "mp3").is_none());
    assert_eq!(missing.notices().len(), 1);
}
