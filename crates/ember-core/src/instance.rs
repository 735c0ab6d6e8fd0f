//! Component instances: the per-position record that owns hook slots
//! across renders.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::component::{ClassState, Component, ComponentId, Props};
use crate::context::with_render_target;
use crate::error::{RenderError, RenderResult};
use crate::hooks::{EffectSlot, StateSlot};
use crate::node::Node;
use crate::runtime::RuntimeHandle;

pub type InstanceId = usize;

static NEXT_INSTANCE_ID: AtomicUsize = AtomicUsize::new(1);

fn next_instance_id() -> InstanceId {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) enum HookSlot {
    State(Rc<dyn Any>),
    Effect(Rc<RefCell<EffectSlot>>),
}

impl HookSlot {
    fn label(&self) -> &'static str {
        match self {
            HookSlot::State(_) => "use_state",
            HookSlot::Effect(_) => "use_effect",
        }
    }
}

pub(crate) struct InstanceInner {
    id: InstanceId,
    name: &'static str,
    component_id: ComponentId,
    runtime: RuntimeHandle,
    hooks: RefCell<Vec<HookSlot>>,
    class_state: RefCell<Option<Rc<dyn Any>>>,
    mounted: Cell<bool>,
    hook_count: Cell<Option<usize>>,
    renders: Cell<u64>,
}

/// Shared handle to one component instance.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

impl Instance {
    pub fn new(component: &Component, runtime: RuntimeHandle) -> Self {
        let inner = InstanceInner {
            id: next_instance_id(),
            name: component.name(),
            component_id: component.id(),
            runtime,
            hooks: RefCell::new(Vec::new()),
            class_state: RefCell::new(None),
            mounted: Cell::new(true),
            hook_count: Cell::new(None),
            renders: Cell::new(0),
        };
        log::trace!("created instance {} of `{}`", inner.id, inner.name);
        Self {
            inner: Rc::new(inner),
        }
    }

    pub(crate) fn from_inner(inner: Rc<InstanceInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<InstanceInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn component_id(&self) -> ComponentId {
        self.inner.component_id
    }

    pub fn runtime(&self) -> &RuntimeHandle {
        &self.inner.runtime
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// Completed renders of this instance.
    pub fn renders(&self) -> u64 {
        self.inner.renders.get()
    }

    pub fn hook_count(&self) -> usize {
        self.inner.hooks.borrow().len()
    }

    /// Asks the owning root to re-render. No-op once unmounted.
    pub fn request_render(&self) {
        if self.is_mounted() {
            log::trace!("`{}` ({}) requested a render", self.inner.name, self.inner.id);
            self.inner.runtime.request_render();
        }
    }

    /// Marks the instance unmounted and runs every pending effect cleanup in
    /// slot order. Calling it again does nothing.
    pub fn unmount(&self) {
        if !self.inner.mounted.replace(false) {
            return;
        }
        log::trace!("unmounting `{}` ({})", self.inner.name, self.inner.id);
        let slots = std::mem::take(&mut *self.inner.hooks.borrow_mut());
        self.inner.class_state.borrow_mut().take();
        for slot in slots {
            if let HookSlot::Effect(effect) = slot {
                let cleanup = effect.borrow_mut().cleanup.take();
                if let Some(cleanup) = cleanup {
                    cleanup.run();
                }
            }
        }
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> RenderError {
        RenderError::HookOrderMismatch {
            component: self.inner.name,
            index,
            expected,
        }
    }

    pub(crate) fn state_slot<T: 'static>(
        &self,
        index: usize,
        init: impl FnOnce() -> T,
    ) -> RenderResult<Rc<StateSlot<T>>> {
        if let Some(slot) = self.inner.hooks.borrow().get(index) {
            return match slot {
                HookSlot::State(any) => Rc::clone(any)
                    .downcast::<StateSlot<T>>()
                    .map_err(|_| self.mismatch(index, "use_state")),
                other => Err(self.mismatch(index, other.label())),
            };
        }
        // Initializer runs with no borrow held.
        let slot = Rc::new(StateSlot::new(init(), self.downgrade()));
        self.inner
            .hooks
            .borrow_mut()
            .push(HookSlot::State(slot.clone() as Rc<dyn Any>));
        Ok(slot)
    }

    pub(crate) fn effect_slot(&self, index: usize) -> RenderResult<Rc<RefCell<EffectSlot>>> {
        let mut hooks = self.inner.hooks.borrow_mut();
        if let Some(slot) = hooks.get(index) {
            return match slot {
                HookSlot::Effect(effect) => Ok(Rc::clone(effect)),
                other => Err(self.mismatch(index, other.label())),
            };
        }
        let slot = Rc::new(RefCell::new(EffectSlot::default()));
        hooks.push(HookSlot::Effect(Rc::clone(&slot)));
        Ok(slot)
    }

    pub(crate) fn class_state<S: 'static>(
        &self,
        init: impl FnOnce() -> S,
    ) -> RenderResult<Rc<ClassState<S>>> {
        if let Some(any) = self.inner.class_state.borrow().as_ref() {
            return Rc::clone(any)
                .downcast::<ClassState<S>>()
                .map_err(|_| self.mismatch(0, "class state"));
        }
        let state = Rc::new(ClassState {
            value: RefCell::new(init()),
            owner: self.downgrade(),
        });
        *self.inner.class_state.borrow_mut() = Some(state.clone() as Rc<dyn Any>);
        Ok(state)
    }

    /// Called when a render scope for this instance closes.
    pub(crate) fn finish_render(&self, hooks_used: usize) {
        self.inner.renders.set(self.inner.renders.get() + 1);
        let previous = self.inner.hook_count.replace(Some(hooks_used));
        if let Some(previous) = previous {
            if previous != hooks_used {
                log::warn!(
                    "`{}` called {} hooks this render but {} the previous one; hooks must run in the same order every render",
                    self.inner.name,
                    hooks_used,
                    previous
                );
            }
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.inner.id)
            .field("component", &self.inner.name)
            .field("mounted", &self.inner.mounted.get())
            .finish()
    }
}

/// Renders `component` with `props`, reusing `existing` when it belongs to
/// the same component and is still mounted. Returns the rendered subtree
/// together with the instance that produced it.
pub fn mount_component(
    component: &Component,
    props: &Props,
    existing: Option<Instance>,
    runtime: &RuntimeHandle,
) -> RenderResult<(Node, Instance)> {
    let instance = existing
        .filter(|instance| instance.component_id() == component.id() && instance.is_mounted())
        .unwrap_or_else(|| Instance::new(component, runtime.clone()));
    let output = with_render_target(&instance, || component.invoke(props, &instance))?;
    Ok((output, instance))
}

#[cfg(test)]
#[path = "tests/instance_tests.rs"]
mod tests;
