//! Playback value types shared by the binder, the overlay renderer and hosts.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in host page coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Media lifecycle signals the binder listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaEvent {
    /// Playback position changed
    TimeUpdate,
    Pause,
    /// Playback reached the end of the media
    Ended,
    /// Duration became known
    LoadedMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

/// How a player should be brought into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl ScrollOptions {
    /// Smooth scroll that leaves the player vertically centred.
    pub fn centered() -> Self {
        Self {
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Center,
        }
    }
}

/// Identifier a host hands back for an attached overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OverlayId(pub u64);

/// Everything a host needs to draw one segment overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySpec {
    pub rect: Rect,
    pub fill: String,
    pub z_index: i32,
}

impl OverlaySpec {
    /// Inline style for an absolutely positioned element that lets pointer
    /// events through to the player underneath.
    ///
    /// ```
    /// use audiomark::playback::{OverlaySpec, Rect};
    ///
    /// let spec = OverlaySpec {
    ///     rect: Rect::new(10.0, 20.0, 30.5, 4.0),
    ///     fill: "rgba(0, 0, 0, 0.5)".to_string(),
    ///     z_index: 5,
    /// };
    /// assert_eq!(
    ///     spec.css(),
    ///     "position: absolute; left: 10px; top: 20px; width: 30.5px; height: 4px; \
    ///      background: rgba(0, 0, 0, 0.5); z-index: 5; pointer-events: none;"
    /// );
    /// ```
    pub fn css(&self) -> String {
        format!(
            "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; \
             background: {}; z-index: {}; pointer-events: none;",
            self.rect.left, self.rect.top, self.rect.width, self.rect.height, self.fill, self.z_index
        )
    }
}
