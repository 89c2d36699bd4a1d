//! Audio references for the marker picker.
//!
//! The picker lists the audio files embedded in the active note (`![[...]]`)
//! and, on selection, writes a marker for the chosen file at the cursor.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::InsertRange;
use crate::error::AudiomarkError;
use crate::host::{Editor, Workspace};
use crate::marker::MarkerBinding;

fn embed_regex() -> &'static Regex {
    static RE_EMBED: OnceLock<Regex> = OnceLock::new();
    RE_EMBED.get_or_init(|| Regex::new(r"!\[\[(.+?)\]\]").expect("embed pattern compiles"))
}

/// An embedded audio file the picker can offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioReference {
    /// File name, as markers refer to it
    pub name: String,
    /// Vault-relative path
    pub src: String,
}

impl AudioReference {
    pub fn marker(&self, range: InsertRange) -> MarkerBinding {
        MarkerBinding::new(self.name.clone(), range.start, range.end)
    }
}

/// Link targets of every `![[...]]` embed, in source order.
///
/// ```
/// use audiomark::embed_links;
///
/// let links = embed_links("![[talk.mp3]] text ![[img/cover.png|200]]");
/// assert_eq!(links, vec!["talk.mp3", "img/cover.png|200"]);
/// ```
pub fn embed_links(content: &str) -> Vec<&str> {
    embed_regex()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Embedded files of the active note whose extension is `extension`.
///
/// Links that resolve to nothing, or to another kind of file, are skipped.
/// The extension must match exactly, so `song.MP3` is not an `mp3` file.
pub fn collect_audio_references(
    workspace: &dyn Workspace,
    extension: &str,
) -> Result<Vec<AudioReference>, AudiomarkError> {
    let note = workspace.active_note().ok_or(AudiomarkError::NoActiveNote)?;
    let path = note.file.ok_or(AudiomarkError::NoFile)?;
    let content = workspace.read(&path)?;

    let mut references = Vec::new();
    for link in embed_links(&content) {
        let Some(file) = workspace.resolve_link(link, &path) else {
            trace!(link, "embed did not resolve");
            continue;
        };
        if file.extension != extension {
            trace!(link, extension = %file.extension, "embed is not audio");
            continue;
        }
        references.push(AudioReference {
            name: file.name,
            src: file.path,
        });
    }

    debug!(note = %path, count = references.len(), "collected audio references");
    Ok(references)
}

/// [`collect_audio_references`] for a user action: a failure becomes one
/// notice and `None`.
pub fn open_audio_picker(workspace: &dyn Workspace, extension: &str) -> Option<Vec<AudioReference>> {
    match collect_audio_references(workspace, extension) {
        Ok(references) => Some(references),
        Err(e) => {
            workspace.notice(&e.to_string());
            None
        }
    }
}

/// Write a marker for `reference` at the editor's cursor.
pub fn insert_marker(editor: &mut dyn Editor, reference: &AudioReference, range: InsertRange) -> MarkerBinding {
    let binding = reference.marker(range);
    editor.replace_selection(&binding.to_marker_text());
    binding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ActiveNote, FileRef, TextBuffer};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeWorkspace {
        active: Option<ActiveNote>,
        files: HashMap<String, String>,
        notices: RefCell<Vec<String>>,
    }

    impl Workspace for FakeWorkspace {
        fn active_note(&self) -> Option<ActiveNote> {
            self.active.clone()
        }

        fn read(&self, path: &str) -> Result<String, AudiomarkError> {
            self.files.get(path).cloned().ok_or_else(|| AudiomarkError::Read {
                path: path.to_string(),
                message: "not found".to_string(),
            })
        }

        fn resolve_link(&self, link: &str, _source_path: &str) -> Option<FileRef> {
            let target = link.split('|').next().unwrap_or(link);
            self.files
                .keys()
                .find(|path| path.ends_with(target))
                .map(|path| FileRef::from_path(path))
        }

        fn notice(&self, message: &str) {
            self.notices.borrow_mut().push(message.to_string());
        }
    }

    fn workspace_with(note: &str) -> FakeWorkspace {
        let mut files = HashMap::new();
        files.insert("daily.md".to_string(), note.to_string());
        files.insert("media/talk.mp3".to_string(), String::new());
        files.insert("media/song.MP3".to_string(), String::new());
        files.insert("img/cover.png".to_string(), String::new());
        FakeWorkspace {
            active: Some(ActiveNote {
                file: Some("daily.md".to_string()),
            }),
            files,
            notices: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_collects_only_audio_in_order() {
        let workspace = workspace_with("![[talk.mp3|Talk]]\n![[cover.png]]\n![[missing.mp3]]\n![[song.MP3]]");
        let refs = collect_audio_references(&workspace, "mp3").unwrap();
        assert_eq!(
            refs,
            vec![AudioReference {
                name: "talk.mp3".to_string(),
                src: "media/talk.mp3".to_string()
            }]
        );
    }

    #[test]
    fn test_extension_match_is_exact() {
        let workspace = workspace_with("![[song.MP3]]\n![[talk.mp3]]");
        let upper = collect_audio_references(&workspace, "MP3").unwrap();
        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].name, "song.MP3");
    }

    #[test]
    fn test_no_active_note_is_a_notice() {
        let workspace = FakeWorkspace::default();
        assert!(open_audio_picker(&workspace, "mp3").is_none());
        assert_eq!(*workspace.notices.borrow(), vec!["No active note".to_string()]);
    }

    #[test]
    fn test_note_without_file_is_a_notice() {
        let workspace = FakeWorkspace {
            active: Some(ActiveNote { file: None }),
            ..FakeWorkspace::default()
        };
        assert!(open_audio_picker(&workspace, "mp3").is_none());
        assert_eq!(*workspace.notices.borrow(), vec!["No file in active note".to_string()]);
    }

    #[test]
    fn test_unreadable_note_is_a_notice() {
        let workspace = FakeWorkspace {
            active: Some(ActiveNote {
                file: Some("gone.md".to_string()),
            }),
            ..FakeWorkspace::default()
        };
        assert!(open_audio_picker(&workspace, "mp3").is_none());
        assert_eq!(workspace.notices.borrow().len(), 1);
    }

    #[test]
    fn test_note_without_embeds_gives_empty_list() {
        let workspace = workspace_with("just [[a link]] and text");
        assert_eq!(open_audio_picker(&workspace, "mp3"), Some(vec![]));
        assert!(workspace.notices.borrow().is_empty());
    }

    #[test]
    fn test_insert_marker_at_cursor() {
        let reference = AudioReference {
            name: "talk.mp3".to_string(),
            src: "media/talk.mp3".to_string(),
        };
        let mut buffer = TextBuffer::new("Intro: \nmore", 7);

        let binding = insert_marker(&mut buffer, &reference, InsertRange::default());
        assert_eq!(binding, MarkerBinding::new("talk.mp3", 0, None));
        assert_eq!(buffer.text, "Intro: [audio:talk.mp3@0]\nmore");

        insert_marker(&mut buffer, &reference, InsertRange { start: 4, end: Some(9) });
        assert_eq!(buffer.text, "Intro: [audio:talk.mp3@0][audio:talk.mp3@4-9]\nmore");
    }
}
