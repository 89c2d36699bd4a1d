//! # Playback Module
//!
//! Binds rendered marker controls to embedded players and draws the segment
//! overlay.
//!
//! ## Sub-modules
//! - `types` - geometry, media events, scroll options, overlay specs
//! - `media` - host capabilities: [`MediaElement`], [`RenderRoot`], [`Subscription`]
//! - `overlay` - seek-bar geometry estimation and the overlay renderer
//! - `binder` - activation: resolve, seek, play, end watch, overlay scheduling
//! - `memory` - in-memory host used by tests and the CLI
//!
//! ## Flow
//! ```text
//! control activated
//!   └── find_media(root, file name)        first match in document order, else no-op
//!         ├── seek to start, play, scroll into view (smooth, centred)
//!         ├── end boundary?  watch timeupdate → pause once at end
//!         └── metadata ready? draw overlay now : draw on loadedmetadata
//!               └── overlay removed on pause / ended
//! ```
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//! use audiomark::playback::memory::{MemoryMedia, MemoryRoot, MemorySurface};
//! use audiomark::playback::{Activation, Binder, EmpiricalSeekBar, OverlayRenderer, OverlayStyle};
//! use audiomark::MarkerBinding;
//!
//! let root = MemoryRoot::new();
//! let clip = root.push(MemoryMedia::new("clip.mp3").with_metadata(20.0));
//! let surface = Rc::new(MemorySurface::new());
//! let binder = Binder::new(OverlayRenderer::new(
//!     Rc::new(EmpiricalSeekBar::default()),
//!     surface.clone(),
//!     OverlayStyle::default(),
//! ));
//!
//! let outcome = binder.activate_in(&root, &MarkerBinding::new("clip.mp3", 5, Some(8)));
//! assert!(matches!(outcome, Activation::Started { bounded: true, .. }));
//! assert_eq!(surface.len(), 1);
//!
//! clip.advance_to(8.0);
//! assert!(clip.snapshot().paused);
//! assert!(surface.is_empty());
//! ```

mod binder;
mod media;
pub mod memory;
mod overlay;
mod types;


pub use binder::{Activation, Binder, OverlayState};
pub use media::{file_name_of, find_media, resolvable_source, Listener, MediaElement, RenderRoot, Subscription};
pub use overlay::{
    segment_rect, EmpiricalSeekBar, OverlayHandle, OverlayRenderer, OverlayStyle, OverlaySurface,
    SeekBarGeometry,
};
pub use types::{MediaEvent, OverlayId, OverlaySpec, Rect, ScrollBehavior, ScrollBlock, ScrollOptions};
