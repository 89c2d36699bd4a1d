//! Host collaborators: the workspace (active note, storage, link resolution,
//! notices) and the editor the picker inserts into.
//!
//! [`VaultWorkspace`] implements the workspace over a directory on disk.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use walkdir::WalkDir;

use crate::error::AudiomarkError;

/// A file a link resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// File name with extension
    pub name: String,
    /// Vault-relative path with `/` separators
    pub path: String,
    /// Extension without the dot
    pub extension: String,
}

impl FileRef {
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let extension = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
            _ => String::new(),
        };
        Self {
            name,
            path: path.to_string(),
            extension,
        }
    }
}

/// The note in focus. `file` is `None` for a view not backed by a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNote {
    pub file: Option<String>,
}

pub trait Workspace {
    fn active_note(&self) -> Option<ActiveNote>;

    fn read(&self, path: &str) -> Result<String, AudiomarkError>;

    /// Resolve link text as written in `source_path` to a file, if any.
    fn resolve_link(&self, link: &str, source_path: &str) -> Option<FileRef>;

    /// Show a transient message to the user.
    fn notice(&self, message: &str);
}

/// Cursor-aware text editor.
pub trait Editor {
    /// Replace the current selection (or insert at the cursor when empty).
    fn replace_selection(&mut self, text: &str);
}

/// Plain string editor with a byte-range selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    pub text: String,
    pub selection: std::ops::Range<usize>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            selection: cursor..cursor,
        }
    }
}

impl Editor for TextBuffer {
    /// Offsets past the end, or inside a multibyte character, snap back to
    /// the previous character boundary.
    fn replace_selection(&mut self, text: &str) {
        let end = floor_char_boundary(&self.text, self.selection.end);
        let start = floor_char_boundary(&self.text, self.selection.start.min(end));
        self.text.replace_range(start..end, text);
        let cursor = start + text.len();
        self.selection = cursor..cursor;
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Workspace over a vault directory.
pub struct VaultWorkspace {
    root: PathBuf,
    active: Option<ActiveNote>,
    notices: RefCell<Vec<String>>,
}

impl VaultWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: None,
            notices: RefCell::new(Vec::new()),
        }
    }

    /// Focus a note by vault-relative path.
    pub fn with_active_note(mut self, path: impl Into<String>) -> Self {
        self.active = Some(ActiveNote {
            file: Some(path.into()),
        });
        self
    }

    /// Focus a view that has no file behind it.
    pub fn with_unsaved_note(mut self) -> Self {
        self.active = Some(ActiveNote { file: None });
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    fn existing(&self, rel: &str) -> Option<FileRef> {
        let rel = rel.trim_start_matches('/');
        if rel.is_empty() {
            return None;
        }
        let candidates = [rel.to_string(), format!("{}.md", rel)];
        let found = candidates
            .iter()
            .find(|candidate| self.root.join(candidate).is_file())
            .map(|candidate| FileRef::from_path(candidate));
        found
    }

    fn find_by_name(&self, name: &str) -> Option<FileRef> {
        let with_md = format!("{}.md", name);
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .find(|entry| {
                let file_name = entry.file_name().to_string_lossy();
                file_name == name || file_name == with_md
            })
            .and_then(|entry| self.relative(entry.path()))
            .map(|rel| FileRef::from_path(&rel))
    }
}

impl Workspace for VaultWorkspace {
    fn active_note(&self) -> Option<ActiveNote> {
        self.active.clone()
    }

    fn read(&self, path: &str) -> Result<String, AudiomarkError> {
        fs::read_to_string(self.root.join(path)).map_err(|e| AudiomarkError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn resolve_link(&self, link: &str, source_path: &str) -> Option<FileRef> {
        // [[target#heading|alias]]
        let target = link.split('|').next().unwrap_or(link);
        let target = target.split('#').next().unwrap_or(target).trim();
        if target.is_empty() {
            return None;
        }

        if let Some(found) = self.existing(target) {
            return Some(found);
        }

        if let Some((folder, _)) = source_path.rsplit_once('/') {
            if let Some(found) = self.existing(&format!("{}/{}", folder, target)) {
                return Some(found);
            }
        }

        let name = target.rsplit('/').next().unwrap_or(target);
        let found = self.find_by_name(name);
        if found.is_none() {
            trace!(link, "link did not resolve");
        }
        found
    }

    fn notice(&self, message: &str) {
        warn!(notice = message, "user notice");
        eprintln!("{}", message);
        self.notices.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ref_from_path() {
        let file = FileRef::from_path("media/Talk 1.mp3");
        assert_eq!(file.name, "Talk 1.mp3");
        assert_eq!(file.extension, "mp3");

        assert_eq!(FileRef::from_path("README").extension, "");
        assert_eq!(FileRef::from_path(".hidden").extension, "");
    }

    #[test]
    fn test_text_buffer_inserts_at_cursor() {
        let mut buffer = TextBuffer::new("ab", 1);
        buffer.replace_selection("XY");
        assert_eq!(buffer.text, "aXYb");
        assert_eq!(buffer.selection, 3..3);
    }

    #[test]
    fn test_text_buffer_replaces_selection() {
        let mut buffer = TextBuffer {
            text: "hello world".to_string(),
            selection: 6..11,
        };
        buffer.replace_selection("there");
        assert_eq!(buffer.text, "hello there");
    }

    #[test]
    fn test_text_buffer_cursor_inside_multibyte_char() {
        // byte 4 falls inside 'é'
        let mut buffer = TextBuffer::new("café notes", 4);
        buffer.replace_selection("[audio:a.mp3@0]");
        assert_eq!(buffer.text, "caf[audio:a.mp3@0]é notes");

        let mut buffer = TextBuffer::new("café", 40);
        buffer.replace_selection("!");
        assert_eq!(buffer.text, "café!");
    }

    #[test]
    fn test_vault_resolves_exact_path_and_md_suffix() {
        let root = std::env::temp_dir().join(format!("audiomark-host-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("media")).unwrap();
        fs::write(root.join("media/talk.mp3"), "").unwrap();
        fs::write(root.join("Index.md"), "").unwrap();

        let workspace = VaultWorkspace::new(&root);
        let audio = workspace.resolve_link("media/talk.mp3", "Index.md").unwrap();
        assert_eq!(audio.path, "media/talk.mp3");
        let note = workspace.resolve_link("Index", "Index.md").unwrap();
        assert_eq!(note.path, "Index.md");
        assert!(workspace.resolve_link("media/none.mp3", "Index.md").is_none());

        fs::remove_dir_all(&root).unwrap();
    }
}
