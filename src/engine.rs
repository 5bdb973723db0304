use dpi::PhysicalSize;

/// Boundary to the native rendering engine that owns the GPU context and
/// issues draw calls.
///
/// Every method is infallible at this layer: load failures come back as
/// [`crate::event::MapEvent::DidFailLoadingMap`] notifications, never as
/// lifecycle errors. The coordinator guarantees call ordering: display and
/// context are initialized once before any surface call, teardown runs
/// exactly once, and no method is invoked after teardown.
///
/// The engine may deliver its completion notifications from a render or
/// worker thread; those go through [`crate::ext_event::EventProxy`], never
/// back into this trait.
pub trait RenderEngine {
    /// OS-level drawing-surface handle the engine draws into. The lifecycle
    /// retains ownership and releases the handle only after
    /// [`RenderEngine::destroy_surface`] has returned.
    type Surface;

    fn initialize_display(&self);
    fn initialize_context(&self);
    fn create_surface(&self, surface: &Self::Surface);
    fn resize_framebuffer(&self, size: PhysicalSize<u32>);
    fn destroy_surface(&self);
    fn terminate_context(&self);
    fn terminate_display(&self);
    fn render(&self);
    fn on_low_memory(&self);
    /// Asynchronous: returns before the style finishes loading. Completion
    /// is reported through [`crate::event::MapEvent::DidFinishLoadingStyle`]
    /// or [`crate::event::MapEvent::DidFailLoadingMap`].
    fn set_style_url(&self, url: &str);
}
