//! Playback binder: turns a control activation into playback on a matching player.
//!
//! One activation on a player is a *session*. It owns up to three things, each
//! released on every exit path:
//!
//! - the end watch (a `timeupdate` and a `pause` subscription), present only
//!   when the marker has an end boundary
//! - a one-shot `loadedmetadata` subscription when the overlay has to wait for
//!   the duration
//! - the overlay itself
//!
//! A new activation on the same player supersedes the previous session, so
//! listeners never pile up on one element.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::media::{find_media, MediaElement, RenderRoot, Subscription};
use super::overlay::{OverlayHandle, OverlayRenderer};
use super::types::{MediaEvent, ScrollOptions};
use crate::marker::MarkerBinding;
use crate::node::Control;

/// What an activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// No player under the root matched the marker's file name
    NoTarget,
    Started {
        /// An end watch was installed
        bounded: bool,
        overlay: OverlayState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Drawn,
    /// Waiting for the player's metadata
    Deferred,
    /// Duration unusable or range empty
    Skipped,
}

#[derive(Default)]
struct SessionState {
    watch: Vec<Subscription>,
    readiness: Option<Subscription>,
    overlay: Option<OverlayHandle>,
}

struct Session {
    media: Weak<dyn MediaElement>,
    state: RefCell<SessionState>,
}

impl Session {
    fn new(media: &Rc<dyn MediaElement>) -> Self {
        Self {
            media: Rc::downgrade(media),
            state: RefCell::new(SessionState::default()),
        }
    }

    fn targets(&self, media: &Rc<dyn MediaElement>) -> bool {
        self.media
            .upgrade()
            .is_some_and(|own| Rc::ptr_eq(&own, media))
    }

    fn is_live(&self) -> bool {
        if self.media.strong_count() == 0 {
            return false;
        }
        let state = self.state.borrow();
        !state.watch.is_empty()
            || state.readiness.is_some()
            || state.overlay.as_ref().is_some_and(OverlayHandle::is_attached)
    }

    fn clear_watch(&self) {
        let watch = std::mem::take(&mut self.state.borrow_mut().watch);
        drop(watch);
    }

    fn cancel(&self) {
        let state = std::mem::take(&mut *self.state.borrow_mut());
        if let Some(overlay) = &state.overlay {
            overlay.remove();
        }
        drop(state);
    }
}

/// Resolves activated controls to players and drives playback.
pub struct Binder {
    renderer: OverlayRenderer,
    sessions: RefCell<Vec<Rc<Session>>>,
}

impl Binder {
    pub fn new(renderer: OverlayRenderer) -> Self {
        Self {
            renderer,
            sessions: RefCell::new(Vec::new()),
        }
    }

    /// Activate a rendered control in the root it was scanned under.
    pub fn activate(&self, control: &Control) -> Activation {
        self.activate_in(control.root().as_ref(), control.binding())
    }

    /// Seek the first matching player under `root` to the marker's start and
    /// play it, stopping at the end boundary if there is one.
    pub fn activate_in(&self, root: &dyn RenderRoot, binding: &MarkerBinding) -> Activation {
        let Some(media) = find_media(root, &binding.name) else {
            debug!(name = %binding.name, "no player for marker");
            return Activation::NoTarget;
        };

        self.supersede(&media);

        media.set_current_time(f64::from(binding.start));
        media.play();
        media.scroll_into_view(ScrollOptions::centered());

        let session = Rc::new(Session::new(&media));
        let end = binding.end_boundary();

        if let Some(end) = end {
            watch_end(&session, &media, end);
        }

        let overlay = if media.has_metadata() {
            let drawn = self.renderer.render(&media, binding.start, end);
            let state = if drawn.is_some() {
                OverlayState::Drawn
            } else {
                OverlayState::Skipped
            };
            session.state.borrow_mut().overlay = drawn;
            state
        } else {
            self.defer_overlay(&session, &media, binding.start, end);
            OverlayState::Deferred
        };

        debug!(name = %binding.name, start = binding.start, ?end, ?overlay, "playback started");
        self.sessions.borrow_mut().push(session);

        Activation::Started {
            bounded: end.is_some(),
            overlay,
        }
    }

    /// Sessions that still hold a watch, a pending overlay or a drawn overlay.
    pub fn live_sessions(&self) -> usize {
        self.sessions.borrow().iter().filter(|s| s.is_live()).count()
    }

    /// Cancel every session, removing their overlays and listeners.
    pub fn release_all(&self) {
        let sessions = std::mem::take(&mut *self.sessions.borrow_mut());
        for session in &sessions {
            session.cancel();
        }
    }

    fn supersede(&self, media: &Rc<dyn MediaElement>) {
        let stale: Vec<Rc<Session>> = {
            let mut sessions = self.sessions.borrow_mut();
            let (stale, kept): (Vec<_>, Vec<_>) = sessions
                .drain(..)
                .partition(|s| s.targets(media) || !s.is_live());
            *sessions = kept;
            stale
        };

        for session in &stale {
            if session.targets(media) && session.is_live() {
                debug!("superseding previous session on this player");
            }
            session.cancel();
        }
    }

    fn defer_overlay(&self, session: &Rc<Session>, media: &Rc<dyn MediaElement>, start: u32, end: Option<u32>) {
        let session_ref = Rc::downgrade(session);
        let media_ref = Rc::downgrade(media);
        let renderer = self.renderer.clone();

        let subscription = media.subscribe(
            MediaEvent::LoadedMetadata,
            Rc::new(move |_: MediaEvent| {
                let Some(session) = session_ref.upgrade() else {
                    return;
                };
                let readiness = session.state.borrow_mut().readiness.take();
                drop(readiness);

                let Some(media) = media_ref.upgrade() else {
                    return;
                };
                if media.is_paused() {
                    debug!("player paused before metadata arrived, no overlay");
                    return;
                }
                let drawn = renderer.render(&media, start, end);
                session.state.borrow_mut().overlay = drawn;
            }),
        );
        session.state.borrow_mut().readiness = Some(subscription);
    }
}

impl Drop for Binder {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn watch_end(session: &Rc<Session>, media: &Rc<dyn MediaElement>, end: u32) {
    let end_at = f64::from(end);

    let session_ref = Rc::downgrade(session);
    let media_ref = Rc::downgrade(media);
    let on_time = media.subscribe(
        MediaEvent::TimeUpdate,
        Rc::new(move |_: MediaEvent| {
            let (Some(session), Some(media)) = (session_ref.upgrade(), media_ref.upgrade()) else {
                return;
            };
            if media.current_time() >= end_at {
                session.clear_watch();
                debug!(end, "end boundary reached");
                media.pause();
            }
        }),
    );

    let session_ref = Rc::downgrade(session);
    let on_pause = media.subscribe(
        MediaEvent::Pause,
        Rc::new(move |_: MediaEvent| {
            if let Some(session) = session_ref.upgrade() {
                session.clear_watch();
            }
        }),
    );

    session.state.borrow_mut().watch = vec![on_time, on_pause];
}
