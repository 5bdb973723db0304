use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use dpi::PhysicalSize;

use crate::engine::RenderEngine;

/// Where the drawing surface stands relative to the native context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Widget constructed; no native call issued yet.
    Uninitialized,
    /// Display and context are up; waiting for the UI layer to provide a
    /// backing surface.
    ContextInitialized,
    /// A surface is attached; rendering is permitted.
    SurfaceCreated,
    /// The UI layer reclaimed the surface; the context survives and a new
    /// surface may be attached.
    SurfaceDestroyed,
    /// Native teardown ran. Terminal; every further call is a no-op.
    TornDown,
}

/// Owns the handshake between UI-visible surface callbacks and the native
/// context's init/teardown sequence, and gates the render entry point.
///
/// All transitions happen on the logical UI thread. The tombstone cell is
/// shared with the coordinator and the map handle: once set, no native call
/// is ever issued again.
pub struct SurfaceLifecycle<E: RenderEngine> {
    engine: Rc<E>,
    state: Cell<SurfaceState>,
    surface: RefCell<Option<E::Surface>>,
    framebuffer_size: Cell<Option<PhysicalSize<u32>>>,
    tombstone: Rc<Cell<bool>>,
}

impl<E: RenderEngine> SurfaceLifecycle<E> {
    pub(crate) fn new(engine: Rc<E>, tombstone: Rc<Cell<bool>>) -> Self {
        Self {
            engine,
            state: Cell::new(SurfaceState::Uninitialized),
            surface: RefCell::new(None),
            framebuffer_size: Cell::new(None),
            tombstone,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state.get()
    }

    pub fn is_torn_down(&self) -> bool {
        self.tombstone.get()
    }

    /// Brings up the native display and context. Invoked once, at widget
    /// creation, before any surface callback.
    ///
    /// # Panics
    ///
    /// Panics when called twice; re-initializing a live native context is a
    /// construction bug, not a runtime condition to tolerate.
    pub fn initialize(&self) {
        assert_eq!(
            self.state.get(),
            SurfaceState::Uninitialized,
            "native display/context initialized twice"
        );
        self.engine.initialize_display();
        self.engine.initialize_context();
        self.state.set(SurfaceState::ContextInitialized);
    }

    /// The UI layer reported a backing surface. Records the handle and
    /// attaches the engine to it.
    pub fn surface_created(&self, surface: E::Surface) {
        if self.tombstone.get() {
            return;
        }
        match self.state.get() {
            SurfaceState::ContextInitialized | SurfaceState::SurfaceDestroyed => {
                self.engine.create_surface(&surface);
                *self.surface.borrow_mut() = Some(surface);
                self.state.set(SurfaceState::SurfaceCreated);
            }
            state => {
                log::warn!("surface created while in {state:?}; ignored");
            }
        }
    }

    /// Resizes the framebuffer. A no-op when the dimensions are unchanged
    /// or no surface is attached; never raises, because paint and resize
    /// callbacks can race surface teardown.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        if self.tombstone.get() || self.state.get() != SurfaceState::SurfaceCreated {
            return;
        }
        if self.framebuffer_size.get() == Some(size) {
            return;
        }
        self.framebuffer_size.set(Some(size));
        self.engine.resize_framebuffer(size);
    }

    /// The UI layer is reclaiming the surface. The engine is detached first;
    /// the OS handle is released strictly after, synchronously, so the
    /// caller may reclaim it the moment this returns.
    pub fn surface_destroyed(&self) {
        if self.state.get() == SurfaceState::TornDown {
            return;
        }
        if self.state.get() == SurfaceState::SurfaceCreated {
            self.engine.destroy_surface();
            self.state.set(SurfaceState::SurfaceDestroyed);
        }
        self.framebuffer_size.set(None);
        let released = self.surface.borrow_mut().take();
        drop(released);
    }

    /// The render gate: draws and returns `true` iff a surface is attached
    /// and teardown has not begun. Outside that window the call is a safe
    /// no-op returning `false`.
    pub fn render(&self) -> bool {
        if self.tombstone.get() || self.state.get() != SurfaceState::SurfaceCreated {
            return false;
        }
        self.engine.render();
        true
    }

    /// Tears the native context down: terminate context, terminate display,
    /// destroy surface, in that order, exactly once. Sets the tombstone so
    /// every subsequent call on this widget is a no-op.
    pub fn teardown(&self) {
        if self.tombstone.get() {
            return;
        }
        self.tombstone.set(true);
        self.engine.terminate_context();
        self.engine.terminate_display();
        self.engine.destroy_surface();
        self.surface.borrow_mut().take();
        self.state.set(SurfaceState::TornDown);
    }
}
