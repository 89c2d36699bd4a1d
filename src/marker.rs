//! # Marker Grammar
//!
//! Scans note text for inline audio markers:
//!
//! ```text
//! [audio:<filename>@<startSeconds>]
//! [audio:<filename>@<startSeconds>-<endSeconds>]
//! ```
//!
//! `filename` is any run of characters other than `]` and `@`; both times are
//! non-negative integer seconds. Matching is a single left-to-right,
//! non-overlapping pass. Anything that does not match (missing bracket, letters
//! in the time, a number too large for `u32`) stays literal text.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

fn marker_regex() -> &'static Regex {
    static RE_MARKER: OnceLock<Regex> = OnceLock::new();
    // ASCII digits only; `\d` would also accept other Unicode digits
    RE_MARKER.get_or_init(|| {
        Regex::new(r"\[audio:([^\]@]+)@([0-9]+)(?:-([0-9]+))?\]").expect("marker pattern compiles")
    })
}

/// What a marker points at: a file name and a time range in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerBinding {
    pub name: String,
    pub start: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl MarkerBinding {
    pub fn new(name: impl Into<String>, start: u32, end: Option<u32>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Label shown on the rendered control. The end time is never shown.
    ///
    /// ```
    /// use audiomark::MarkerBinding;
    ///
    /// let binding = MarkerBinding::new("clip.mp3", 5, Some(8));
    /// assert_eq!(binding.label(), "Play clip.mp3 @ 5s");
    /// ```
    pub fn label(&self) -> String {
        format!("Play {} @ {}s", self.name, self.start)
    }

    /// The end time playback should stop at.
    ///
    /// An end at or before the start is ignored, otherwise the control would
    /// pause itself the moment it starts playing.
    pub fn end_boundary(&self) -> Option<u32> {
        self.end.filter(|&end| end > self.start)
    }

    /// Textual form as it is stored in the note.
    pub fn to_marker_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MarkerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[audio:{}@{}-{}]", self.name, self.start, end),
            None => write!(f, "[audio:{}@{}]", self.name, self.start),
        }
    }
}

/// A marker found in text, with the byte range it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerToken {
    pub binding: MarkerBinding,
    pub span: Range<usize>,
}

/// A piece of text split around markers, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Marker(MarkerToken),
}

/// Find every well-formed marker in `text`, left to right.
///
/// ```
/// use audiomark::scan_markers;
///
/// let tokens = scan_markers("intro [audio:talk.mp3@10-25] and [audio:talk.mp3@40]");
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].binding.end, Some(25));
/// assert_eq!(tokens[1].binding.start, 40);
/// ```
pub fn scan_markers(text: &str) -> Vec<MarkerToken> {
    marker_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let start = caps.get(2)?.as_str().parse::<u32>().ok()?;
            let end = match caps.get(3) {
                Some(m) => Some(m.as_str().parse::<u32>().ok()?),
                None => None,
            };
            Some(MarkerToken {
                binding: MarkerBinding::new(&caps[1], start, end),
                span: whole.range(),
            })
        })
        .collect()
}

/// Cheap pre-check used to skip text that cannot contain a marker.
pub fn contains_marker(text: &str) -> bool {
    text.contains("[audio:") && !scan_markers(text).is_empty()
}

/// Split `text` into literal runs and markers.
///
/// Empty literal runs (between adjacent markers, or at either end) are
/// omitted, so joining the `Text` segments gives back the input with the
/// marker spans cut out.
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for token in scan_markers(text) {
        if token.span.start > last {
            segments.push(Segment::Text(&text[last..token.span.start]));
        }
        last = token.span.end;
        segments.push(Segment::Marker(token));
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }

    segments
}
