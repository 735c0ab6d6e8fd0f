use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::platform::RuntimeScheduler;

pub type Task = Box<dyn FnOnce() + 'static>;

struct RuntimeInner {
    scheduler: Rc<dyn RuntimeScheduler>,
    render_requested: Cell<bool>,
    render_requests: Cell<u64>,
    pending_effects: RefCell<Vec<Task>>,
    tasks: RefCell<VecDeque<Task>>,
}

impl RuntimeInner {
    fn new(scheduler: Rc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            render_requested: Cell::new(false),
            render_requests: Cell::new(0),
            pending_effects: RefCell::new(Vec::new()),
            tasks: RefCell::new(VecDeque::new()),
        }
    }

    fn request_render(&self) {
        self.render_requests.set(self.render_requests.get() + 1);
        if !self.render_requested.replace(true) {
            self.scheduler.schedule_frame();
        }
    }

    fn take_render_request(&self) -> bool {
        self.render_requested.replace(false)
    }

    fn queue_effect(&self, effect: Task) {
        self.pending_effects.borrow_mut().push(effect);
    }

    fn commit_effects(&self) -> usize {
        let effects: Vec<Task> = self.pending_effects.borrow_mut().drain(..).collect();
        let count = effects.len();
        if count > 0 {
            self.tasks.borrow_mut().extend(effects);
            self.scheduler.schedule_frame();
        }
        count
    }

    fn discard_effects(&self) -> usize {
        let mut pending = self.pending_effects.borrow_mut();
        let count = pending.len();
        pending.clear();
        count
    }

    fn enqueue_task(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
        self.scheduler.schedule_frame();
    }

    fn drain_tasks(&self) -> usize {
        let mut ran = 0;
        loop {
            // Release the borrow before running: tasks may enqueue more tasks.
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    fn has_tasks(&self) -> bool {
        !self.tasks.borrow().is_empty()
    }
}

/// Per-root scheduling state: render requests plus the FIFO effect/task queue.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Rc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn needs_render(&self) -> bool {
        self.inner.render_requested.get()
    }

    pub fn take_render_request(&self) -> bool {
        self.inner.take_render_request()
    }

    /// Total render requests seen, coalesced or not.
    pub fn render_requests(&self) -> u64 {
        self.inner.render_requests.get()
    }

    /// Moves effects registered during the pass that just finished into the task queue.
    pub fn commit_effects(&self) -> usize {
        self.inner.commit_effects()
    }

    pub fn discard_effects(&self) -> usize {
        self.inner.discard_effects()
    }

    pub fn drain_tasks(&self) -> usize {
        self.inner.drain_tasks()
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.inner.has_tasks()
    }

    pub fn is_idle(&self) -> bool {
        !self.needs_render() && !self.has_pending_tasks()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Rc::new(DefaultScheduler))
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Weak handle held by instances and setters; a dropped root turns every
/// call into a no-op.
#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    pub fn request_render(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.request_render();
        }
    }

    pub fn queue_effect(&self, effect: Task) {
        if let Some(inner) = self.0.upgrade() {
            inner.queue_effect(effect);
        }
    }

    pub fn spawn_task(&self, task: Task) {
        if let Some(inner) = self.0.upgrade() {
            inner.enqueue_task(task);
        }
    }

    pub fn drain_tasks(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.drain_tasks();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
