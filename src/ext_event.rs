use std::{cell::RefCell, collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::event::MapEvent;

type WakeFn = dyn Fn() + Send + Sync;

/// Thread-safe hand-off for completion events produced off the UI thread.
///
/// The native engine runs frame/style/camera notifications on its own render
/// or worker thread; this proxy is the one mandatory synchronization
/// boundary. `post` enqueues the event and invokes the wake callback so the
/// host's UI loop schedules a [`crate::MapView::process_events`] turn.
/// Cloneable and cheap to hand to any number of producer threads.
#[derive(Clone)]
pub struct EventProxy {
    queue: Arc<Mutex<VecDeque<MapEvent>>>,
    wake: Arc<WakeFn>,
}

impl EventProxy {
    pub fn post(&self, event: MapEvent) {
        self.queue.lock().push_back(event);
        (self.wake)();
    }
}

/// UI-thread end of the hand-off queue.
pub(crate) struct EventInbox {
    queue: Arc<Mutex<VecDeque<MapEvent>>>,
    wake: Arc<WakeFn>,
}

impl EventInbox {
    pub(crate) fn new(wake: Arc<WakeFn>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            wake,
        }
    }

    pub(crate) fn proxy(&self) -> EventProxy {
        EventProxy {
            queue: self.queue.clone(),
            wake: self.wake.clone(),
        }
    }

    pub(crate) fn drain(&self) -> Vec<MapEvent> {
        let mut queue = self.queue.lock();
        queue.drain(..).collect()
    }

    pub(crate) fn clear(&self) {
        self.queue.lock().clear();
    }
}

/// Next-turn task queue for the logical UI thread.
///
/// "Deferred" delivery (the ready-queue drain, post-settle ready requests)
/// is scheduling onto the next turn, not a blocking wait. Tasks queued while
/// a turn is running wait for the following turn, which keeps ready
/// consumers off the call stack of the event that triggered them.
#[derive(Default)]
pub(crate) struct Scheduler {
    tasks: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl Scheduler {
    pub(crate) fn defer(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Runs the tasks that were queued before this turn started.
    pub(crate) fn run_turn(&self) {
        let queued = self.tasks.borrow().len();
        for _ in 0..queued {
            let task = self.tasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    pub(crate) fn clear(&self) {
        self.tasks.borrow_mut().clear();
    }
}
