use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::event::{MapEvent, MapEventKind};

/// Callback signature shared by single-slot listeners and the internal sink.
pub type EventCallback = dyn Fn(&MapEvent);

/// Fan-out registry mapping each [`MapEventKind`] to at most one current
/// external listener, plus one internal sink bound by the coordinator.
///
/// Dispatch order is a contract: the external listener runs first, then the
/// sink, so internal state updates (ready-queue latching, region-change
/// flags) observe an event only after any listener that might register new
/// consumers in response to it.
#[derive(Default)]
pub struct EventBus {
    slots: RefCell<FxHashMap<MapEventKind, Rc<EventCallback>>>,
    sink: RefCell<Option<Rc<EventCallback>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current listener for `kind` wholesale; `None` clears the
    /// slot. A dispatch already in flight keeps the reference it captured and
    /// never observes a half-updated slot.
    pub fn set_listener(&self, kind: MapEventKind, listener: Option<Box<EventCallback>>) {
        let mut slots = self.slots.borrow_mut();
        match listener {
            Some(listener) => {
                slots.insert(kind, Rc::from(listener));
            }
            None => {
                slots.remove(&kind);
            }
        }
    }

    pub(crate) fn bind_sink(&self, sink: Box<EventCallback>) {
        *self.sink.borrow_mut() = Some(Rc::from(sink));
    }

    /// Dispatches one event to the listener registered for its kind, then to
    /// the internal sink. Empty slots are skipped. Single-slot listeners are
    /// trusted call sites of the embedding application; a fault there
    /// propagates to the caller instead of being contained here.
    pub fn dispatch(&self, event: &MapEvent) {
        let listener = self.slots.borrow().get(&event.kind()).cloned();
        if let Some(listener) = listener {
            listener(event);
        }
        let sink = self.sink.borrow().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }
}
