//! Segment overlay: a translucent band drawn over a player's seek bar that
//! covers the marked time range.
//!
//! Where the seek bar sits inside the player is host chrome, so it is estimated
//! by a [`SeekBarGeometry`]. [`EmpiricalSeekBar`] uses fixed insets measured
//! against the default audio controls; hosts with different chrome can plug in
//! their own estimator without touching the ratio math.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::media::{MediaElement, Subscription};
use super::types::{MediaEvent, OverlayId, OverlaySpec, Rect};

/// Estimates the seek-bar rectangle from a player's bounding box.
pub trait SeekBarGeometry {
    fn seek_bar(&self, bounds: &Rect) -> Rect;
}

impl<F> SeekBarGeometry for F
where
    F: Fn(&Rect) -> Rect,
{
    fn seek_bar(&self, bounds: &Rect) -> Rect {
        self(bounds)
    }
}

/// Fixed offsets approximating where native audio controls draw the scrubber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EmpiricalSeekBar {
    /// Pixels from the player's left edge to the start of the bar
    pub left_inset: f64,
    /// Bar width as a fraction of the player width
    pub width_fraction: f64,
    /// Pixels from the player's top edge to the band
    pub band_top: f64,
    pub band_height: f64,
}

impl Default for EmpiricalSeekBar {
    fn default() -> Self {
        Self {
            left_inset: 100.0,
            width_fraction: 0.5,
            band_top: 22.0,
            band_height: 10.0,
        }
    }
}

impl SeekBarGeometry for EmpiricalSeekBar {
    fn seek_bar(&self, bounds: &Rect) -> Rect {
        Rect::new(
            bounds.left + self.left_inset,
            bounds.top + self.band_top,
            bounds.width * self.width_fraction,
            self.band_height,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OverlayStyle {
    pub fill: String,
    pub z_index: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill: "rgba(255, 196, 0, 0.45)".to_string(),
            z_index: 1000,
        }
    }
}

/// Where overlays are attached. Implemented by the host document.
pub trait OverlaySurface {
    fn attach(&self, spec: OverlaySpec) -> OverlayId;
    fn detach(&self, id: OverlayId);
}

/// Part of `bar` covering `start..end` of a track of length `duration`.
///
/// Returns `None` when the duration is unusable (not finite, or not positive)
/// or the range is empty. A missing end, or one past the duration, runs to the
/// end of the bar.
///
/// ```
/// use audiomark::playback::{segment_rect, Rect};
///
/// let bar = Rect::new(100.0, 22.0, 200.0, 10.0);
/// let seg = segment_rect(&bar, 5.0, Some(8.0), 20.0).unwrap();
/// assert_eq!(seg.left, 150.0);
/// assert!((seg.width - 30.0).abs() < 1e-9);
/// ```
pub fn segment_rect(bar: &Rect, start: f64, end: Option<f64>, duration: f64) -> Option<Rect> {
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }

    let start_ratio = start / duration;
    let end_ratio = end.map_or(1.0, |end| (end / duration).min(1.0));
    if start_ratio >= 1.0 || end_ratio <= start_ratio {
        return None;
    }

    Some(Rect::new(
        bar.left + bar.width * start_ratio,
        bar.top,
        bar.width * (end_ratio - start_ratio),
        bar.height,
    ))
}

struct AttachedOverlay {
    id: OverlayId,
    surface: Rc<dyn OverlaySurface>,
    subscriptions: Vec<Subscription>,
}

impl Drop for AttachedOverlay {
    fn drop(&mut self) {
        self.surface.detach(self.id);
        trace!(id = self.id.0, "overlay detached");
        // the pause/ended listeners go with `subscriptions`
    }
}

/// Owning handle to a drawn overlay.
///
/// The overlay is removed on the player's next pause or end of playback,
/// on [`OverlayHandle::remove`], or when the last handle is dropped.
#[derive(Clone)]
pub struct OverlayHandle {
    inner: Rc<RefCell<Option<AttachedOverlay>>>,
}

impl OverlayHandle {
    pub fn is_attached(&self) -> bool {
        self.inner.borrow().is_some()
    }

    pub fn remove(&self) {
        remove_attached(&self.inner);
    }
}

fn remove_attached(inner: &RefCell<Option<AttachedOverlay>>) {
    let attached = inner.borrow_mut().take();
    drop(attached);
}

/// Draws segment overlays on a surface.
#[derive(Clone)]
pub struct OverlayRenderer {
    geometry: Rc<dyn SeekBarGeometry>,
    surface: Rc<dyn OverlaySurface>,
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(
        geometry: Rc<dyn SeekBarGeometry>,
        surface: Rc<dyn OverlaySurface>,
        style: OverlayStyle,
    ) -> Self {
        Self {
            geometry,
            surface,
            style,
        }
    }

    /// Overlay that `render` would draw, without attaching anything.
    pub fn plan(&self, media: &dyn MediaElement, start: u32, end: Option<u32>) -> Option<OverlaySpec> {
        let duration = media.duration();
        let bar = self.geometry.seek_bar(&media.bounding_box());
        let Some(rect) = segment_rect(&bar, f64::from(start), end.map(f64::from), duration) else {
            debug!(duration, start, ?end, "no overlay for this range");
            return None;
        };
        Some(OverlaySpec {
            rect,
            fill: self.style.fill.clone(),
            z_index: self.style.z_index,
        })
    }

    /// Attach an overlay for `start..end` over `media` and tie its removal to
    /// the player's pause and ended events.
    pub fn render(&self, media: &Rc<dyn MediaElement>, start: u32, end: Option<u32>) -> Option<OverlayHandle> {
        let spec = self.plan(media.as_ref(), start, end)?;
        let id = self.surface.attach(spec);
        trace!(id = id.0, "overlay attached");

        let handle = OverlayHandle {
            inner: Rc::new(RefCell::new(Some(AttachedOverlay {
                id,
                surface: self.surface.clone(),
                subscriptions: Vec::new(),
            }))),
        };

        for event in [MediaEvent::Pause, MediaEvent::Ended] {
            let weak: Weak<RefCell<Option<AttachedOverlay>>> = Rc::downgrade(&handle.inner);
            let subscription = media.subscribe(
                event,
                Rc::new(move |_: MediaEvent| {
                    if let Some(inner) = weak.upgrade() {
                        remove_attached(&inner);
                    }
                }),
            );
            if let Some(attached) = handle.inner.borrow_mut().as_mut() {
                attached.subscriptions.push(subscription);
            }
        }

        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAR: Rect = Rect {
        left: 100.0,
        top: 30.0,
        width: 400.0,
        height: 8.0,
    };

    #[test]
    fn test_segment_rect_rejects_bad_duration() {
        assert!(segment_rect(&BAR, 1.0, None, f64::NAN).is_none());
        assert!(segment_rect(&BAR, 1.0, None, f64::INFINITY).is_none());
        assert!(segment_rect(&BAR, 1.0, None, 0.0).is_none());
        assert!(segment_rect(&BAR, 1.0, None, -3.0).is_none());
    }

    #[test]
    fn test_segment_rect_open_end_runs_to_bar_end() {
        let seg = segment_rect(&BAR, 10.0, None, 40.0).unwrap();
        assert_eq!(seg.left, 200.0);
        assert_eq!(seg.right(), BAR.right());
        assert_eq!(seg.top, BAR.top);
        assert_eq!(seg.height, BAR.height);
    }

    #[test]
    fn test_segment_rect_clamps_end() {
        let seg = segment_rect(&BAR, 20.0, Some(90.0), 40.0).unwrap();
        assert_eq!(seg.left, 300.0);
        assert_eq!(seg.width, 200.0);
    }

    #[test]
    fn test_segment_rect_empty_ranges() {
        assert!(segment_rect(&BAR, 40.0, None, 40.0).is_none());
        assert!(segment_rect(&BAR, 50.0, Some(60.0), 40.0).is_none());
        assert!(segment_rect(&BAR, 10.0, Some(10.0), 40.0).is_none());
    }

    #[test]
    fn test_empirical_seek_bar() {
        let geometry = EmpiricalSeekBar::default();
        let bar = geometry.seek_bar(&Rect::new(10.0, 50.0, 300.0, 54.0));
        assert_eq!(bar, Rect::new(110.0, 72.0, 150.0, 10.0));
    }

    #[test]
    fn test_closure_geometry() {
        let geometry = |bounds: &Rect| Rect::new(bounds.left, bounds.top, bounds.width, 2.0);
        let bar = geometry.seek_bar(&Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(bar.height, 2.0);
    }
}
