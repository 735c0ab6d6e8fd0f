//! Component conventions: plain render functions and stateful class-like units.

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::attributes::{AttrValue, Attributes, EventHandler};
use crate::error::RenderResult;
use crate::instance::{Instance, InstanceInner};
use crate::node::{Key, Node};

/// Identity of a component. Stable across renders for the same function or class type.
pub type ComponentId = TypeId;

type RenderFn = dyn Fn(&Props, &Instance) -> RenderResult<Node>;

#[derive(Clone)]
pub struct Component {
    id: ComponentId,
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    /// Wraps a render function. Every distinct function or closure expression
    /// is a distinct component.
    pub fn function<F>(render: F) -> Self
    where
        F: Fn(&Props) -> RenderResult<Node> + 'static,
    {
        Self {
            id: TypeId::of::<F>(),
            name: short_name(type_name::<F>()),
            render: Rc::new(move |props: &Props, _: &Instance| render(props)),
        }
    }

    /// Same as [`Component::function`] with an explicit display name.
    pub fn named<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&Props) -> RenderResult<Node> + 'static,
    {
        Self {
            name,
            ..Self::function(render)
        }
    }

    pub fn class<C: ClassComponent>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: short_name(type_name::<C>()),
            render: Rc::new(render_class::<C>),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the render function. Callers bracket this with a render scope;
    /// see [`crate::mount_component`].
    pub(crate) fn invoke(&self, props: &Props, instance: &Instance) -> RenderResult<Node> {
        (self.render)(props, instance)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component").field("name", &self.name).finish()
    }
}

fn short_name(full: &'static str) -> &'static str {
    let trimmed = full.split('<').next().unwrap_or(full);
    trimmed.rsplit("::").next().unwrap_or(trimmed)
}

/// Stateful component convention: local state plus `set_state`/`force_update`.
pub trait ClassComponent: 'static {
    type State: Clone + 'static;

    fn initial_state(props: &Props) -> Self::State;

    fn render(props: &Props, state: &Self::State, this: &Updater<Self::State>) -> RenderResult<Node>;
}

fn render_class<C: ClassComponent>(props: &Props, instance: &Instance) -> RenderResult<Node> {
    let cell = instance.class_state(|| C::initial_state(props))?;
    let snapshot = cell.value.borrow().clone();
    let updater = Updater { cell };
    C::render(props, &snapshot, &updater)
}

pub(crate) struct ClassState<S> {
    pub(crate) value: RefCell<S>,
    pub(crate) owner: Weak<InstanceInner>,
}

/// Handle a class component uses to change its own state.
pub struct Updater<S> {
    cell: Rc<ClassState<S>>,
}

impl<S> Clone for Updater<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<S: 'static> Updater<S> {
    /// Applies `patch` to the current state and requests a re-render of the root.
    pub fn set_state(&self, patch: impl FnOnce(&mut S)) {
        patch(&mut self.cell.value.borrow_mut());
        self.force_update();
    }

    pub fn force_update(&self) {
        if let Some(owner) = self.cell.owner.upgrade() {
            Instance::from_inner(owner).request_render();
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.cell.value.borrow())
    }
}

/// What a component receives: its node's attributes and children.
#[derive(Clone, Debug, Default)]
pub struct Props {
    attributes: Attributes,
    children: Vec<Node>,
    key: Option<Key>,
}

impl Props {
    pub fn new(attributes: Attributes, children: Vec<Node>) -> Self {
        Self {
            attributes,
            children,
            key: None,
        }
    }

    pub fn from_node(node: &Node) -> Self {
        Self {
            attributes: node.attributes().clone(),
            children: node.children().to_vec(),
            key: node.key().cloned(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            AttrValue::Int(value) => Some(*value),
            AttrValue::Str(value) => value.parse().ok(),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            AttrValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn handler(&self, name: &str) -> Option<&EventHandler> {
        match self.get(name)? {
            AttrValue::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// Opaque data stored with [`AttrValue::data`].
    pub fn data<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        match self.get(name)? {
            AttrValue::Data(value) => Rc::clone(value).downcast::<T>().ok(),
            _ => None,
        }
    }
}
