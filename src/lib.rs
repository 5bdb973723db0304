//! # Mapcore
//!
//! Mapcore is the surface-lifecycle coordinator and event-dispatch bus that
//! sits between a windowing/UI layer and a native map-rendering engine. It
//! keeps three asynchronous timelines consistent: the UI framework's
//! surface create/resize/destroy callbacks, the native context's strictly
//! ordered init/teardown sequence, and a broadcast system fanning map-state
//! transitions out to listeners with at-most-once "ready" delivery.
//!
//! ## Architecture
//!
//! - [`MapView`] is the coordinator. The UI layer drives it with lifecycle
//!   calls (`on_create`/`on_start`/`on_stop`/`on_destroy`) and surface
//!   callbacks; the native engine reports completions through an
//!   [`EventProxy`] from any thread.
//! - [`SurfaceLifecycle`](surface::SurfaceLifecycle) owns the handshake
//!   with the native context and gates rendering: a render call succeeds
//!   only while a surface is attached and teardown has not begun.
//! - [`EventBus`](dispatch::EventBus) maps each [`MapEventKind`] to at most
//!   one current listener; [`LegacyListeners`](legacy::LegacyListeners) is
//!   the deprecated everything-as-an-integer-tag broadcast kept for
//!   compatibility. Both are views over one typed dispatch.
//! - [`ReadyQueue`](ready::ReadyQueue) buffers `get_map_async` consumers
//!   until the first style load, then drains them exactly once.
//!
//! ## Example
//!
//! ```rust
//! use mapcore::{MapEvent, MapView, RenderEngine};
//!
//! struct NullEngine;
//!
//! impl RenderEngine for NullEngine {
//!     type Surface = u64;
//!
//!     fn initialize_display(&self) {}
//!     fn initialize_context(&self) {}
//!     fn create_surface(&self, _surface: &u64) {}
//!     fn resize_framebuffer(&self, _size: dpi::PhysicalSize<u32>) {}
//!     fn destroy_surface(&self) {}
//!     fn terminate_context(&self) {}
//!     fn terminate_display(&self) {}
//!     fn render(&self) {}
//!     fn on_low_memory(&self) {}
//!     fn set_style_url(&self, _url: &str) {}
//! }
//!
//! let view = MapView::new(NullEngine);
//! view.on_create();
//! view.surface_created(1);
//! view.surface_changed(dpi::PhysicalSize::new(800, 600));
//!
//! view.get_map_async(|map| assert!(map.is_ready()));
//!
//! // The engine reports the first style load from its own thread...
//! view.event_proxy().post(MapEvent::DidFinishLoadingStyle);
//! // ...and the UI loop pumps it; the ready consumer runs after event
//! // dispatch, off the triggering call stack.
//! view.process_events();
//!
//! assert!(view.render());
//! view.on_destroy();
//! assert!(!view.render());
//! ```

pub mod dispatch;
pub mod engine;
pub mod event;
pub mod ext_event;
pub mod legacy;
pub mod map;
pub mod map_view;
pub mod ready;
pub mod surface;

pub use dispatch::{EventBus, EventCallback};
pub use engine::RenderEngine;
pub use event::{map_change, MapChange, MapEvent, MapEventKind};
pub use ext_event::EventProxy;
pub use legacy::{LegacyListeners, MapChangeListener};
pub use map::Map;
pub use map_view::MapView;
pub use ready::{ReadyQueue, ReadyState};
pub use surface::{SurfaceLifecycle, SurfaceState};
