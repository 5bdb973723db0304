use std::{cell::Cell, rc::Rc, sync::Arc};

use dpi::PhysicalSize;

use crate::{
    dispatch::{EventBus, EventCallback},
    engine::RenderEngine,
    event::{MapEvent, MapEventKind},
    ext_event::{EventInbox, EventProxy, Scheduler},
    legacy::{LegacyListeners, MapChangeListener},
    map::Map,
    ready::ReadyQueue,
    surface::{SurfaceLifecycle, SurfaceState},
};

/// The surface coordinator: composes the event bus, the legacy broadcast
/// list, the ready queue and the surface lifecycle for one widget instance.
///
/// Three asynchronous timelines meet here. UI lifecycle and surface
/// callbacks arrive from the windowing layer in orders the widget does not
/// control; the native context must be brought up and torn down in a strict
/// sequence, never twice; and engine completion events fan out to any number
/// of listeners with at-most-once ready delivery. All state mutation happens
/// on the logical UI thread; engine notifications from other threads go
/// through [`MapView::event_proxy`] and are drained by
/// [`MapView::process_events`].
///
/// `MapView` is deliberately not `Send`: it lives and dies on the UI thread.
pub struct MapView<E: RenderEngine + 'static> {
    engine: Rc<E>,
    lifecycle: SurfaceLifecycle<E>,
    bus: EventBus,
    legacy: LegacyListeners,
    ready: Rc<ReadyQueue<Map<E>>>,
    scheduler: Rc<Scheduler>,
    inbox: EventInbox,
    map: Map<E>,
    tombstone: Rc<Cell<bool>>,
    started: Cell<bool>,
}

impl<E: RenderEngine + 'static> MapView<E> {
    pub fn new(engine: E) -> Self {
        Self::with_waker(engine, || {})
    }

    /// `waker` runs every time an engine thread posts a completion event;
    /// wire it to the host UI loop's wake-up so a
    /// [`MapView::process_events`] turn gets scheduled. It may be invoked
    /// from any thread.
    pub fn with_waker(engine: E, waker: impl Fn() + Send + Sync + 'static) -> Self {
        let engine = Rc::new(engine);
        let tombstone = Rc::new(Cell::new(false));
        let lifecycle = SurfaceLifecycle::new(engine.clone(), tombstone.clone());
        let map = Map::new(engine.clone(), tombstone.clone());
        let ready = Rc::new(ReadyQueue::new());
        let scheduler = Rc::new(Scheduler::default());
        let bus = EventBus::new();

        ready.set_pre_deliver(|map: &Map<E>| map.mark_ready());

        // Internal sink: runs after the external single-slot listener for
        // the same event, before the legacy broadcast.
        {
            let map = map.clone();
            let ready = ready.clone();
            let scheduler = scheduler.clone();
            bus.bind_sink(Box::new(move |event: &MapEvent| match event {
                MapEvent::DidFinishLoadingStyle => {
                    if ready.mark_style_loaded() {
                        let ready = ready.clone();
                        let map = map.clone();
                        scheduler.defer(move || ready.deliver(&map));
                    }
                }
                MapEvent::CameraIsChanging
                | MapEvent::CameraDidChange { .. }
                | MapEvent::DidFinishLoadingMap => map.note_region_change(),
                MapEvent::DidFinishRenderingFrame { .. } => map.note_frame_rendered(),
                _ => {}
            }));
        }

        Self {
            engine,
            lifecycle,
            bus,
            legacy: LegacyListeners::new(),
            ready,
            scheduler,
            inbox: EventInbox::new(Arc::new(waker)),
            map,
            tombstone,
            started: Cell::new(false),
        }
    }

    //
    // UI lifecycle entry points
    //

    /// Call from the host's create hook, before any surface callback.
    /// Brings up the native display and context.
    pub fn on_create(&self) {
        self.lifecycle.initialize();
    }

    pub fn on_start(&self) {
        if self.tombstone.get() {
            return;
        }
        self.started.set(true);
        log::trace!("map view started");
    }

    pub fn on_stop(&self) {
        if self.tombstone.get() {
            return;
        }
        self.started.set(false);
        log::trace!("map view stopped");
    }

    /// Hard cutoff. Tears the native context down exactly once and discards
    /// everything still queued (marshaled events, deferred ready drains)
    /// because the context underneath is no longer valid. Idempotent.
    pub fn on_destroy(&self) {
        if self.tombstone.get() {
            return;
        }
        self.started.set(false);
        self.lifecycle.teardown();
        self.inbox.clear();
        self.scheduler.clear();
    }

    pub fn on_low_memory(&self) {
        if self.tombstone.get() {
            return;
        }
        self.engine.on_low_memory();
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.tombstone.get()
    }

    //
    // Rendering
    //

    /// Paint-request entry point. Renders and returns `true` iff a surface
    /// is attached and teardown has not begun; otherwise a safe no-op,
    /// because paint requests can race surface teardown.
    pub fn render(&self) -> bool {
        self.lifecycle.render()
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.lifecycle.state()
    }

    /// Starts loading a new style; completion comes back as an event.
    pub fn set_style_url(&self, url: &str) {
        self.map.set_style_url(url);
    }

    //
    // Callback-driven surface
    //

    pub fn surface_created(&self, surface: E::Surface) {
        self.lifecycle.surface_created(surface);
    }

    pub fn surface_changed(&self, size: PhysicalSize<u32>) {
        self.lifecycle.resize(size);
    }

    pub fn surface_destroyed(&self) {
        self.lifecycle.surface_destroyed();
    }

    //
    // Texture-backed surface
    //

    /// Texture surfaces report their initial size together with creation.
    pub fn surface_texture_available(&self, surface: E::Surface, size: PhysicalSize<u32>) {
        self.lifecycle.surface_created(surface);
        self.lifecycle.resize(size);
    }

    pub fn surface_texture_size_changed(&self, size: PhysicalSize<u32>) {
        self.lifecycle.resize(size);
    }

    pub fn surface_texture_destroyed(&self) {
        self.lifecycle.surface_destroyed();
    }

    /// Frame-presented signal: pulls any pending camera/region update so
    /// screen-anchored collaborators can sync with what was just shown.
    pub fn surface_texture_updated(&self) {
        if self.tombstone.get() {
            return;
        }
        self.map.flush_region_change();
    }

    //
    // Application-facing registration
    //

    /// Replaces the single-slot listener for `kind`; `None` clears it.
    pub fn set_listener(&self, kind: MapEventKind, listener: Option<Box<EventCallback>>) {
        self.bus.set_listener(kind, listener);
    }

    /// Deprecated multiplexed registration. Duplicate adds produce duplicate
    /// deliveries.
    pub fn add_on_map_changed_listener(&self, listener: Arc<dyn MapChangeListener + Send + Sync>) {
        self.legacy.add(listener);
    }

    pub fn remove_on_map_changed_listener(
        &self,
        listener: &Arc<dyn MapChangeListener + Send + Sync>,
    ) {
        self.legacy.remove(listener);
    }

    /// Cloneable handle to the legacy registry for call sites that register
    /// or deregister off the UI thread.
    pub fn legacy_listeners(&self) -> LegacyListeners {
        self.legacy.clone()
    }

    /// Registers a consumer for the ready map handle. Before the first style
    /// load completes the consumer is queued; afterwards it is scheduled on
    /// the next turn. Either way it runs exactly once, off this call stack.
    pub fn get_map_async(&self, callback: impl FnOnce(&Map<E>) + 'static) {
        if self.ready.is_settled() {
            let map = self.map.clone();
            self.scheduler.defer(move || callback(&map));
        } else {
            self.ready.enqueue(Box::new(callback));
        }
    }

    pub fn map(&self) -> &Map<E> {
        &self.map
    }

    //
    // Engine notification plumbing
    //

    /// Hand this to the native engine; it posts completion events from its
    /// own threads.
    pub fn event_proxy(&self) -> EventProxy {
        self.inbox.proxy()
    }

    /// One turn of the logical UI thread: drains marshaled engine events,
    /// dispatches each, then runs the deferred tasks queued before this
    /// turn. After teardown everything drained here is discarded unacted.
    pub fn process_events(&self) {
        let events = self.inbox.drain();
        if self.tombstone.get() {
            return;
        }
        for event in events {
            // A listener may destroy the view mid-turn; the rest of the
            // batch is then dead.
            if self.tombstone.get() {
                return;
            }
            self.dispatch(&event);
        }
        self.scheduler.run_turn();
    }

    /// Dispatches one event in the fixed contract order: external
    /// single-slot listener, internal sink, legacy broadcast. For engines
    /// that already call back on the UI thread. Discarded after teardown,
    /// same as the marshaled path.
    pub fn dispatch(&self, event: &MapEvent) {
        if self.tombstone.get() {
            return;
        }
        self.bus.dispatch(event);
        self.legacy.broadcast(event.legacy_change());
    }
}
