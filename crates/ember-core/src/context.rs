//! Tracks which component instance is currently rendering.
//!
//! Hooks resolve their slot through the innermost frame. Frames nest when a
//! component renders a child component synchronously.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::thread_local;

use crate::error::{RenderError, RenderResult};
use crate::instance::Instance;

struct RenderFrame {
    instance: Instance,
    cursor: usize,
}

thread_local! {
    static RENDER_STACK: RefCell<Vec<RenderFrame>> = const { RefCell::new(Vec::new()) };
}

/// Guard that makes an instance the current render target until dropped.
pub struct RenderScope {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl RenderScope {
    pub fn enter(instance: &Instance) -> Self {
        let depth = RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(RenderFrame {
                instance: instance.clone(),
                cursor: 0,
            });
            stack.len()
        });
        Self {
            depth,
            _not_send: PhantomData,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for RenderScope {
    fn drop(&mut self) {
        let frame = RENDER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(stack.len(), self.depth, "render scopes dropped out of order");
            stack.pop()
        });
        if let Some(frame) = frame {
            frame.instance.finish_render(frame.cursor);
        }
    }
}

/// Runs `f` with `instance` as the current render target.
pub fn with_render_target<R>(instance: &Instance, f: impl FnOnce() -> R) -> R {
    let _scope = RenderScope::enter(instance);
    f()
}

pub fn current_render_target() -> Option<Instance> {
    RENDER_STACK.with(|stack| stack.borrow().last().map(|frame| frame.instance.clone()))
}

pub fn render_depth() -> usize {
    RENDER_STACK.with(|stack| stack.borrow().len())
}

/// Claims the next hook slot of the current render target.
pub(crate) fn claim_hook_slot(hook: &'static str) -> RenderResult<(Instance, usize)> {
    RENDER_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let frame = stack
            .last_mut()
            .ok_or(RenderError::InvalidHookCall { hook })?;
        let index = frame.cursor;
        frame.cursor += 1;
        Ok((frame.instance.clone(), index))
    })
}
