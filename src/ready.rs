use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

/// Where the first-ready latch currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// No style has finished loading yet; consumers are queued.
    Pending,
    /// The first style load completed; the drain is scheduled or running.
    Delivering,
    /// Consumers were drained once; later requests are served directly.
    Settled,
}

/// Consumer registered through `get_map_async`, invoked once with the
/// fully-initialized map handle.
pub type ReadyCallback<T> = Box<dyn FnOnce(&T)>;

type ReadyHook<T> = Rc<dyn Fn(&T)>;

/// Buffers on-ready consumers until the first successful style load, then
/// drains them exactly once in FIFO registration order.
///
/// "First ready" only: style reloads after the first never re-fire. The
/// coordinator schedules [`ReadyQueue::deliver`] off the dispatch stack of
/// the triggering event, so consumers can do further UI-affecting work
/// without re-entering the event that signalled readiness.
pub struct ReadyQueue<T> {
    state: Cell<ReadyState>,
    queue: RefCell<VecDeque<ReadyCallback<T>>>,
    pre_deliver: RefCell<Option<ReadyHook<T>>>,
    post_deliver: RefCell<Option<ReadyHook<T>>>,
}

impl<T> Default for ReadyQueue<T> {
    fn default() -> Self {
        Self {
            state: Cell::new(ReadyState::Pending),
            queue: RefCell::new(VecDeque::new()),
            pre_deliver: RefCell::new(None),
            post_deliver: RefCell::new(None),
        }
    }
}

impl<T> ReadyQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReadyState {
        self.state.get()
    }

    pub fn is_settled(&self) -> bool {
        self.state.get() == ReadyState::Settled
    }

    /// Hook invoked before the drain, while consumers are still queued.
    pub fn set_pre_deliver(&self, hook: impl Fn(&T) + 'static) {
        *self.pre_deliver.borrow_mut() = Some(Rc::new(hook));
    }

    /// Hook invoked after the queued consumers have run.
    pub fn set_post_deliver(&self, hook: impl Fn(&T) + 'static) {
        *self.post_deliver.borrow_mut() = Some(Rc::new(hook));
    }

    /// Appends a consumer for the upcoming (or in-flight) drain. The caller
    /// is responsible for routing requests made after settling straight to
    /// the scheduler instead.
    pub fn enqueue(&self, callback: ReadyCallback<T>) {
        debug_assert_ne!(self.state.get(), ReadyState::Settled);
        self.queue.borrow_mut().push_back(callback);
    }

    /// Flips the single-shot latch. Returns `true` exactly once, on the
    /// first style-load completion; the caller then schedules the drain.
    /// Later style loads are ignored here.
    pub fn mark_style_loaded(&self) -> bool {
        match self.state.get() {
            ReadyState::Pending => {
                self.state.set(ReadyState::Delivering);
                true
            }
            ReadyState::Delivering | ReadyState::Settled => {
                log::debug!("style reloaded after first ready; latch already fired");
                false
            }
        }
    }

    /// Runs the drain: pre hook, queued consumers in FIFO order (including
    /// any enqueued re-entrantly by a running consumer), post hook, settle.
    /// A no-op unless the latch is mid-delivery, so a drain scheduled before
    /// teardown and discarded never double-fires.
    pub fn deliver(&self, value: &T) {
        if self.state.get() != ReadyState::Delivering {
            return;
        }
        if let Some(hook) = self.pre_deliver.borrow().clone() {
            hook(value);
        }
        self.drain(value);
        if let Some(hook) = self.post_deliver.borrow().clone() {
            hook(value);
        }
        self.state.set(ReadyState::Settled);
        // A post hook may have registered consumers; they still belong to
        // this turn rather than waiting on a settle that already happened.
        self.drain(value);
    }

    fn drain(&self, value: &T) {
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(callback) => callback(value),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumers_drain_in_registration_order() {
        let queue = ReadyQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            queue.enqueue(Box::new(move |_value: &u32| order.borrow_mut().push(tag)));
        }

        assert!(queue.mark_style_loaded());
        queue.deliver(&7);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
        assert!(queue.is_settled());
    }

    #[test]
    fn latch_fires_exactly_once() {
        let queue: ReadyQueue<u32> = ReadyQueue::new();
        assert!(queue.mark_style_loaded());
        assert!(!queue.mark_style_loaded());
        queue.deliver(&0);
        assert!(!queue.mark_style_loaded());
    }

    #[test]
    fn deliver_without_latch_is_a_no_op() {
        let queue = ReadyQueue::new();
        let hits = Rc::new(Cell::new(0));

        let out = hits.clone();
        queue.enqueue(Box::new(move |_value: &u32| out.set(out.get() + 1)));

        queue.deliver(&0);
        assert_eq!(hits.get(), 0);
        assert_eq!(queue.state(), ReadyState::Pending);
    }

    #[test]
    fn second_deliver_does_not_re_fire_consumers() {
        let queue = ReadyQueue::new();
        let hits = Rc::new(Cell::new(0));

        let out = hits.clone();
        queue.enqueue(Box::new(move |_value: &u32| out.set(out.get() + 1)));

        queue.mark_style_loaded();
        queue.deliver(&0);
        queue.deliver(&0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn hooks_bracket_the_drain() {
        let queue = ReadyQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = order.clone();
        queue.set_pre_deliver(move |_value: &u32| log.borrow_mut().push("pre"));
        let log = order.clone();
        queue.set_post_deliver(move |_value: &u32| log.borrow_mut().push("post"));
        let log = order.clone();
        queue.enqueue(Box::new(move |_value: &u32| {
            log.borrow_mut().push("consumer")
        }));

        queue.mark_style_loaded();
        queue.deliver(&0);
        assert_eq!(*order.borrow(), vec!["pre", "consumer", "post"]);
    }

    #[test]
    fn re_entrant_enqueue_is_drained_in_the_same_pass() {
        let queue = Rc::new(ReadyQueue::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let inner_queue = queue.clone();
        let log = order.clone();
        queue.enqueue(Box::new(move |_value: &u32| {
            log.borrow_mut().push("outer");
            let log = log.clone();
            inner_queue.enqueue(Box::new(move |_value: &u32| {
                log.borrow_mut().push("inner")
            }));
        }));

        queue.mark_style_loaded();
        queue.deliver(&0);
        assert_eq!(*order.borrow(), vec!["outer", "inner"]);
        assert!(queue.is_settled());
    }
}
