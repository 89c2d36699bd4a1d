pub mod config;
pub mod embeds;
pub mod error;
pub mod host;
pub mod html;
pub mod marker;
pub mod node;
pub mod playback;
pub mod rewrite;

use std::rc::Rc;

pub use config::{InsertRange, Settings};
pub use embeds::{collect_audio_references, embed_links, insert_marker, open_audio_picker, AudioReference};
pub use error::*;
pub use html::to_html;
pub use marker::{contains_marker, scan_markers, split_segments, MarkerBinding, MarkerToken, Segment};
pub use node::{fragment_from_text, Container, Control, Node, RootHandle};
pub use rewrite::{rewrite_markers, MarkerPostProcessor};

/// Render note text into a fragment with its markers turned into controls
/// bound to `root`.
pub fn render_note(source: &str, root: RootHandle) -> Node {
    let mut fragment = fragment_from_text(source);
    MarkerPostProcessor::new(root).process(&mut fragment);
    fragment
}

/// Render note text straight to HTML. Controls are bound to an empty root,
/// as there are no live players outside a host.
pub fn render_note_html(source: &str) -> String {
    let root: RootHandle = Rc::new(playback::memory::MemoryRoot::new());
    to_html(&render_note(source, root))
}
