//! In-memory host: a player, a rendering root and an overlay surface that
//! behave like their browser counterparts without a DOM.
//!
//! Used by the test suites and by the command-line renderer, which has no
//! live players to bind to.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::media::{Listener, MediaElement, RenderRoot, Subscription};
use super::overlay::OverlaySurface;
use super::types::{MediaEvent, OverlayId, OverlaySpec, Rect, ScrollOptions};

/// Observable state of a [`MemoryMedia`].
#[derive(Debug, Clone, PartialEq)]
pub struct MediaState {
    pub source: Option<String>,
    pub current_source: Option<String>,
    pub current_time: f64,
    pub duration: f64,
    pub has_metadata: bool,
    pub paused: bool,
    pub bounds: Rect,
    pub scroll_requests: Vec<ScrollOptions>,
    pub play_calls: usize,
    /// Number of times a pause event was fired
    pub pauses: usize,
}

struct ListenerEntry {
    id: u64,
    event: MediaEvent,
    listener: Listener,
}

type ListenerList = RefCell<Vec<ListenerEntry>>;

/// A simulated audio player.
pub struct MemoryMedia {
    state: RefCell<MediaState>,
    listeners: Rc<ListenerList>,
    next_listener: Cell<u64>,
}

impl MemoryMedia {
    /// Player with an explicit source and no metadata yet.
    pub fn new(source: impl Into<String>) -> Self {
        Self::build(Some(source.into()))
    }

    /// Player without a source attribute.
    pub fn without_source() -> Self {
        Self::build(None)
    }

    fn build(source: Option<String>) -> Self {
        Self {
            state: RefCell::new(MediaState {
                source,
                current_source: None,
                current_time: 0.0,
                duration: f64::NAN,
                has_metadata: false,
                paused: true,
                bounds: Rect::new(0.0, 0.0, 300.0, 54.0),
                scroll_requests: Vec::new(),
                play_calls: 0,
                pauses: 0,
            }),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
        }
    }

    pub fn with_current_source(self, source: impl Into<String>) -> Self {
        self.state.borrow_mut().current_source = Some(source.into());
        self
    }

    /// Metadata already loaded, as for a player that has been on the page a while.
    pub fn with_metadata(self, duration: f64) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.duration = duration;
            state.has_metadata = true;
        }
        self
    }

    pub fn with_bounds(self, bounds: Rect) -> Self {
        self.state.borrow_mut().bounds = bounds;
        self
    }

    pub fn snapshot(&self) -> MediaState {
        self.state.borrow().clone()
    }

    /// Load metadata and fire `loadedmetadata`.
    pub fn load_metadata(&self, duration: f64) {
        {
            let mut state = self.state.borrow_mut();
            state.duration = duration;
            state.has_metadata = true;
        }
        self.dispatch(MediaEvent::LoadedMetadata);
    }

    /// Move the playhead as playback would and fire `timeupdate`.
    pub fn advance_to(&self, seconds: f64) {
        self.state.borrow_mut().current_time = seconds;
        self.dispatch(MediaEvent::TimeUpdate);
    }

    /// Reach the end of the media: fires `pause` (if playing) then `ended`.
    pub fn finish(&self) {
        let was_playing = {
            let mut state = self.state.borrow_mut();
            if state.duration.is_finite() {
                state.current_time = state.duration;
            }
            let was_playing = !state.paused;
            if was_playing {
                state.paused = true;
                state.pauses += 1;
            }
            was_playing
        };
        if was_playing {
            self.dispatch(MediaEvent::Pause);
        }
        self.dispatch(MediaEvent::Ended);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn listener_count_for(&self, event: MediaEvent) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }

    fn dispatch(&self, event: MediaEvent) {
        // Listeners may cancel subscriptions or fire nested events, so the
        // list is not borrowed while they run.
        let pending: Vec<(u64, Listener)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|entry| entry.event == event)
            .map(|entry| (entry.id, entry.listener.clone()))
            .collect();

        for (id, listener) in pending {
            let registered = self.listeners.borrow().iter().any(|entry| entry.id == id);
            if registered {
                listener(event);
            }
        }
    }
}

impl MediaElement for MemoryMedia {
    fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    fn current_source(&self) -> Option<String> {
        self.state.borrow().current_source.clone()
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.borrow_mut().current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn has_metadata(&self) -> bool {
        self.state.borrow().has_metadata
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn play(&self) {
        let mut state = self.state.borrow_mut();
        state.paused = false;
        state.play_calls += 1;
    }

    fn pause(&self) {
        let was_playing = {
            let mut state = self.state.borrow_mut();
            let was_playing = !state.paused;
            if was_playing {
                state.paused = true;
                state.pauses += 1;
            }
            was_playing
        };
        if was_playing {
            self.dispatch(MediaEvent::Pause);
        }
    }

    fn scroll_into_view(&self, options: ScrollOptions) {
        self.state.borrow_mut().scroll_requests.push(options);
    }

    fn bounding_box(&self) -> Rect {
        self.state.borrow().bounds
    }

    fn subscribe(&self, event: MediaEvent, listener: Listener) -> Subscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push(ListenerEntry {
            id,
            event,
            listener,
        });

        let listeners: Weak<ListenerList> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }
}

/// Rendering root holding simulated players in document order.
#[derive(Default)]
pub struct MemoryRoot {
    media: RefCell<Vec<Rc<MemoryMedia>>>,
}

impl MemoryRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a player after every existing one.
    pub fn push(&self, media: MemoryMedia) -> Rc<MemoryMedia> {
        let media = Rc::new(media);
        self.media.borrow_mut().push(media.clone());
        media
    }

    pub fn clear(&self) {
        self.media.borrow_mut().clear();
    }
}

impl RenderRoot for MemoryRoot {
    fn media_elements(&self) -> Vec<Rc<dyn MediaElement>> {
        self.media
            .borrow()
            .iter()
            .map(|media| media.clone() as Rc<dyn MediaElement>)
            .collect()
    }
}

/// Overlay surface that records what is attached.
#[derive(Default)]
pub struct MemorySurface {
    overlays: RefCell<BTreeMap<OverlayId, OverlaySpec>>,
    next_id: Cell<u64>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.overlays.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.borrow().is_empty()
    }

    /// Attached overlays, oldest first.
    pub fn attached(&self) -> Vec<OverlaySpec> {
        self.overlays.borrow().values().cloned().collect()
    }
}

impl OverlaySurface for MemorySurface {
    fn attach(&self, spec: OverlaySpec) -> OverlayId {
        let id = OverlayId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.overlays.borrow_mut().insert(id, spec);
        id
    }

    fn detach(&self, id: OverlayId) {
        self.overlays.borrow_mut().remove(&id);
    }
}
