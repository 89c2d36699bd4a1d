//! # Error Types
//!
//! Errors surfaced by the parts of audiomark that talk to the host: reading the
//! active note, enumerating its embeds and loading settings.
//!
//! Marker scanning and playback never produce errors. Malformed markers pass
//! through as text, and an activation without a matching player is a no-op.
//!
//! ## Usage
//! ```rust
//! use audiomark::AudiomarkError;
//!
//! let err = AudiomarkError::NoActiveNote;
//! assert_eq!(err.to_string(), "No active note");
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudiomarkError {
    /// The host has no markdown view in focus.
    #[error("No active note")]
    NoActiveNote,

    /// A markdown view is open but is not backed by a file.
    #[error("No file in active note")]
    NoFile,

    /// Reading a note from storage failed.
    ///
    /// # Example
    /// ```
    /// # use audiomark::AudiomarkError;
    /// let err = AudiomarkError::Read {
    ///     path: "notes/day.md".to_string(),
    ///     message: "permission denied".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Failed to read 'notes/day.md': permission denied");
    /// ```
    #[error("Failed to read '{path}': {message}")]
    Read { path: String, message: String },

    /// Settings YAML is malformed or holds out-of-range values.
    #[error("Invalid settings: {0}")]
    SettingsError(String),
}
