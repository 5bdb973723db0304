use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::engine::RenderEngine;

/// Cloneable handle to the running map, delivered to `get_map_async`
/// consumers once the first style load completes.
///
/// The handle shares the coordinator's tombstone: every operation that would
/// touch the native engine checks it first and degrades to a no-op after
/// teardown, because the context underneath is no longer valid.
pub struct Map<E: RenderEngine> {
    shared: Rc<MapShared<E>>,
}

struct MapShared<E: RenderEngine> {
    engine: Rc<E>,
    tombstone: Rc<Cell<bool>>,
    ready: Cell<bool>,
    region_dirty: Cell<bool>,
    frame_rendered: Cell<bool>,
    region_sync: RefCell<Option<Rc<dyn Fn()>>>,
}

impl<E: RenderEngine> Clone for Map<E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<E: RenderEngine> Map<E> {
    pub(crate) fn new(engine: Rc<E>, tombstone: Rc<Cell<bool>>) -> Self {
        Self {
            shared: Rc::new(MapShared {
                engine,
                tombstone,
                ready: Cell::new(false),
                region_dirty: Cell::new(false),
                frame_rendered: Cell::new(false),
                region_sync: RefCell::new(None),
            }),
        }
    }

    /// Whether the first style load has completed and the map is safe for
    /// application code to query and mutate.
    pub fn is_ready(&self) -> bool {
        self.shared.ready.get()
    }

    pub(crate) fn mark_ready(&self) {
        self.shared.ready.set(true);
    }

    /// Starts loading a new style. Asynchronous; completion arrives as a
    /// `DidFinishLoadingStyle` or `DidFailLoadingMap` event. No-op after
    /// teardown.
    pub fn set_style_url(&self, url: &str) {
        if self.shared.tombstone.get() {
            return;
        }
        self.shared.engine.set_style_url(url);
    }

    /// Hook run when a pending camera/region update is pulled by the
    /// texture-surface frame-presented signal. Camera and annotation
    /// collaborators register here; this core only stores and fires it.
    pub fn set_region_sync(&self, hook: impl Fn() + 'static) {
        *self.shared.region_sync.borrow_mut() = Some(Rc::new(hook));
    }

    pub(crate) fn note_region_change(&self) {
        self.shared.region_dirty.set(true);
    }

    pub(crate) fn note_frame_rendered(&self) {
        self.shared.frame_rendered.set(true);
    }

    /// True once per completed frame since the last call; collaborators use
    /// this to refresh screen-anchored overlays.
    pub fn take_frame_rendered(&self) -> bool {
        self.shared.frame_rendered.replace(false)
    }

    /// Whether a camera/region change is waiting to be pulled.
    pub fn has_pending_region_change(&self) -> bool {
        self.shared.region_dirty.get()
    }

    pub(crate) fn flush_region_change(&self) {
        if !self.shared.region_dirty.replace(false) {
            return;
        }
        let hook = self.shared.region_sync.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}
