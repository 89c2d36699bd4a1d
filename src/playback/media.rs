//! Capabilities the host provides for embedded players.
//!
//! A player is never created or destroyed here. The binder only finds players
//! through a [`RenderRoot`], drives them through [`MediaElement`] and listens to
//! them through [`Subscription`] handles.

use std::fmt;
use std::rc::Rc;

use percent_encoding::percent_decode_str;

use super::types::{MediaEvent, Rect, ScrollOptions};

/// Callback invoked with the event that fired.
pub type Listener = Rc<dyn Fn(MediaEvent)>;

/// Handle for one registered listener.
///
/// Cancelling, explicitly or by dropping the handle, deregisters the listener.
/// Cancelling twice is harmless.
pub struct Subscription {
    canceller: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(canceller: impl FnOnce() + 'static) -> Self {
        Self {
            canceller: Some(Box::new(canceller)),
        }
    }

    /// A handle with nothing to cancel, for hosts that cannot deliver an event.
    pub fn detached() -> Self {
        Self { canceller: None }
    }

    pub fn cancel(mut self) {
        self.run_canceller();
    }

    fn run_canceller(&mut self) {
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_canceller();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.canceller.is_some())
            .finish()
    }
}

/// An embedded, audio-capable player owned by the host.
///
/// Hosts dispatch events on a single thread. Listeners may cancel
/// subscriptions or call back into the element while an event is being
/// delivered.
pub trait MediaElement {
    /// Explicit source attribute, if the embed carries one.
    fn source(&self) -> Option<String>;

    /// Source currently loaded by the player.
    fn current_source(&self) -> Option<String>;

    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64);

    /// Duration in seconds. `NaN` until metadata is loaded.
    fn duration(&self) -> f64;

    /// True once metadata (and so the duration) is available.
    fn has_metadata(&self) -> bool;

    fn is_paused(&self) -> bool;

    fn play(&self);

    fn pause(&self);

    fn scroll_into_view(&self, options: ScrollOptions);

    /// On-screen bounds of the player.
    fn bounding_box(&self) -> Rect;

    fn subscribe(&self, event: MediaEvent, listener: Listener) -> Subscription;
}

/// Top-level container of one rendered fragment.
pub trait RenderRoot {
    /// Players below this root, in document order.
    fn media_elements(&self) -> Vec<Rc<dyn MediaElement>>;
}

/// The identifier used to match a player to a marker: the explicit source,
/// falling back to whatever the player has loaded.
pub fn resolvable_source(media: &dyn MediaElement) -> Option<String> {
    media
        .source()
        .filter(|s| !s.is_empty())
        .or_else(|| media.current_source().filter(|s| !s.is_empty()))
}

/// File name portion of a source: last path segment, query dropped, percent-decoded.
///
/// ```
/// use audiomark::playback::file_name_of;
///
/// assert_eq!(file_name_of("app://vault/rec/My%20Talk.mp3?1700000000"), "My Talk.mp3");
/// assert_eq!(file_name_of("clip.mp3"), "clip.mp3");
/// ```
pub fn file_name_of(source: &str) -> String {
    let last = source.rsplit('/').next().unwrap_or(source);
    let without_query = last.split('?').next().unwrap_or(last);
    match percent_decode_str(without_query).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => without_query.to_string(),
    }
}

/// First player under `root` whose file name equals `file_name`.
pub fn find_media(root: &dyn RenderRoot, file_name: &str) -> Option<Rc<dyn MediaElement>> {
    root.media_elements().into_iter().find(|media| {
        resolvable_source(media.as_ref()).is_some_and(|source| file_name_of(&source) == file_name)
    })
}
