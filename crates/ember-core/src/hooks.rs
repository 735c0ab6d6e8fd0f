//! `use_state` and `use_effect`, resolved against the current render target.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::context::claim_hook_slot;
use crate::error::RenderResult;
use crate::instance::{Instance, InstanceInner};

pub(crate) struct StateSlot<T> {
    value: RefCell<T>,
    owner: Weak<InstanceInner>,
}

impl<T> StateSlot<T> {
    pub(crate) fn new(value: T, owner: Weak<InstanceInner>) -> Self {
        Self {
            value: RefCell::new(value),
            owner,
        }
    }

    fn owner(&self) -> Option<Instance> {
        self.owner.upgrade().map(Instance::from_inner)
    }
}

/// Writes a state slot. The same setter is handed out on every render.
pub struct StateSetter<T> {
    slot: Rc<StateSlot<T>>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> PartialEq for StateSetter<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateSetter(..)")
    }
}

impl<T: Clone + PartialEq + 'static> StateSetter<T> {
    /// Stores `value` and requests a re-render unless it equals the current value.
    pub fn set(&self, value: T) {
        let Some(owner) = self.slot.owner().filter(Instance::is_mounted) else {
            return;
        };
        {
            let mut current = self.slot.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        owner.request_render();
    }

    /// Computes the next value from the latest one, including writes made
    /// since the last render.
    pub fn update(&self, next: impl FnOnce(&T) -> T) {
        let value = next(&self.slot.value.borrow());
        self.set(value);
    }

    /// Latest stored value.
    pub fn get(&self) -> T {
        self.slot.value.borrow().clone()
    }
}

/// Work to undo an effect before it re-runs or when its instance unmounts.
#[derive(Default)]
pub struct Cleanup(Option<Box<dyn FnOnce()>>);

impl Cleanup {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn from_fn(cleanup: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(cleanup)))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn run(self) {
        if let Some(cleanup) = self.0 {
            cleanup();
        }
    }
}

impl From<()> for Cleanup {
    fn from(_: ()) -> Self {
        Cleanup::none()
    }
}

impl<F: FnOnce() + 'static> From<Option<F>> for Cleanup {
    fn from(cleanup: Option<F>) -> Self {
        cleanup.map_or_else(Cleanup::none, Cleanup::from_fn)
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_some() {
            f.write_str("Cleanup(..)")
        } else {
            f.write_str("Cleanup(none)")
        }
    }
}

#[derive(Default)]
pub(crate) struct EffectSlot {
    deps: Option<Box<dyn Any>>,
    pub(crate) cleanup: Option<Cleanup>,
}

impl EffectSlot {
    fn should_run<D: PartialEq + 'static>(&self, deps: Option<&D>) -> bool {
        let Some(next) = deps else {
            return true;
        };
        match self.deps.as_ref().and_then(|prev| prev.downcast_ref::<D>()) {
            Some(prev) => prev != next,
            None => true,
        }
    }

    fn run_cleanup(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.run();
        }
    }
}

struct DepsRollback {
    slot: Rc<RefCell<EffectSlot>>,
    previous: Option<Option<Box<dyn Any>>>,
}

impl DepsRollback {
    fn disarm(mut self) {
        self.previous = None;
    }
}

impl Drop for DepsRollback {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        if let Ok(mut slot) = self.slot.try_borrow_mut() {
            slot.deps = previous;
        }
    }
}

impl Drop for EffectSlot {
    fn drop(&mut self) {
        self.run_cleanup();
    }
}

/// Declares a piece of state for the rendering component.
///
/// Returns the current value and a setter that stays the same across renders.
pub fn use_state<T: Clone + PartialEq + 'static>(initial: T) -> RenderResult<(T, StateSetter<T>)> {
    use_state_impl("use_state", move || initial)
}

/// [`use_state`] with a lazily computed initial value; `init` runs on the first render only.
pub fn use_state_with<T: Clone + PartialEq + 'static>(
    init: impl FnOnce() -> T,
) -> RenderResult<(T, StateSetter<T>)> {
    use_state_impl("use_state_with", init)
}

fn use_state_impl<T: Clone + PartialEq + 'static>(
    hook: &'static str,
    init: impl FnOnce() -> T,
) -> RenderResult<(T, StateSetter<T>)> {
    let (instance, index) = claim_hook_slot(hook)?;
    let slot = instance.state_slot(index, init)?;
    let value = slot.value.borrow().clone();
    Ok((value, StateSetter { slot }))
}

/// Runs `effect` after every committed render.
pub fn use_effect<C: Into<Cleanup> + 'static>(effect: impl FnOnce() -> C + 'static) -> RenderResult<()> {
    schedule_effect("use_effect", None::<()>, effect)
}

/// Runs `effect` after a committed render whenever `deps` differs from the
/// value passed on the previous render. `()` runs it once.
pub fn use_effect_with<D, C>(deps: D, effect: impl FnOnce() -> C + 'static) -> RenderResult<()>
where
    D: PartialEq + 'static,
    C: Into<Cleanup> + 'static,
{
    schedule_effect("use_effect_with", Some(deps), effect)
}

fn schedule_effect<D, C>(
    hook: &'static str,
    deps: Option<D>,
    effect: impl FnOnce() -> C + 'static,
) -> RenderResult<()>
where
    D: PartialEq + 'static,
    C: Into<Cleanup> + 'static,
{
    let (instance, index) = claim_hook_slot(hook)?;
    let slot = instance.effect_slot(index)?;
    if !slot.borrow().should_run(deps.as_ref()) {
        return Ok(());
    }

    // Deps are recorded at render time. A task dropped unrun restores the previous ones.
    let rollback = deps.map(|deps| {
        let previous = slot.borrow_mut().deps.replace(Box::new(deps) as Box<dyn Any>);
        DepsRollback {
            slot: Rc::clone(&slot),
            previous: Some(previous),
        }
    });

    let owner = instance.downgrade();
    instance.runtime().queue_effect(Box::new(move || {
        if let Some(rollback) = rollback {
            rollback.disarm();
        }
        let mounted = owner
            .upgrade()
            .map(Instance::from_inner)
            .is_some_and(|instance| instance.is_mounted());
        if !mounted {
            return;
        }
        let previous = slot.borrow_mut().cleanup.take();
        if let Some(previous) = previous {
            previous.run();
        }
        let cleanup = effect().into();
        slot.borrow_mut().cleanup = Some(cleanup);
    }));
    Ok(())
}

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod tests;
