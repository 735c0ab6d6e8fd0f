//! The declarative tree: nodes, their construction, and the live state a
//! renderer attaches to them.

use std::fmt;

use crate::attributes::{AttrValue, Attributes, NodeRef};
use crate::component::Component;
use crate::error::{RenderError, RenderResult};
use crate::instance::Instance;

/// Opaque handle to a live surface element or text unit.
pub type SurfaceId = usize;

/// Stable identity hint among sibling nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(value) => write!(f, "{value}"),
            Key::Str(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

#[derive(Clone)]
pub enum NodeKind {
    Element(String),
    Component(Component),
    Text(String),
    Fragment,
}

impl NodeKind {
    /// Two kinds are the same when a renderer may update one into the other
    /// in place.
    pub fn same_as(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Element(a), NodeKind::Element(b)) => a == b,
            (NodeKind::Component(a), NodeKind::Component(b)) => a.id() == b.id(),
            (NodeKind::Text(_), NodeKind::Text(_)) => true,
            (NodeKind::Fragment, NodeKind::Fragment) => true,
            _ => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            NodeKind::Element(tag) => format!("<{tag}>"),
            NodeKind::Component(component) => format!("component `{}`", component.name()),
            NodeKind::Text(_) => "text".to_owned(),
            NodeKind::Fragment => "fragment".to_owned(),
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Element(tag) => f.debug_tuple("Element").field(tag).finish(),
            NodeKind::Component(component) => {
                f.debug_tuple("Component").field(&component.name()).finish()
            }
            NodeKind::Text(value) => f.debug_tuple("Text").field(value).finish(),
            NodeKind::Fragment => f.write_str("Fragment"),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(tag: &str) -> Self {
        NodeKind::Element(tag.to_owned())
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::Element(tag)
    }
}

impl From<Component> for NodeKind {
    fn from(component: Component) -> Self {
        NodeKind::Component(component)
    }
}

/// Live state owned by the interactive renderer.
#[derive(Default)]
struct LiveState {
    surface: Option<SurfaceId>,
    instance: Option<Instance>,
    rendered: Option<Box<Node>>,
}

/// One position in the declarative tree.
pub struct Node {
    kind: NodeKind,
    attributes: Attributes,
    children: Vec<Node>,
    key: Option<Key>,
    node_ref: Option<NodeRef>,
    live: LiveState,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn node_ref(&self) -> Option<&NodeRef> {
        self.node_ref.as_ref()
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// True when a renderer may update `self` into `other` without replacing it.
    pub fn is_same_position(&self, other: &Node) -> bool {
        self.key == other.key && self.kind.same_as(&other.kind)
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.live.surface
    }

    /// Clearing leaves the ref alone when another node has claimed it since.
    pub fn set_surface(&mut self, handle: Option<SurfaceId>) {
        let previous = std::mem::replace(&mut self.live.surface, handle);
        if let Some(node_ref) = &self.node_ref {
            if handle.is_some() || node_ref.get() == previous {
                node_ref.set(handle);
            }
        }
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.live.instance.as_ref()
    }

    pub fn set_instance(&mut self, instance: Instance) {
        self.live.instance = Some(instance);
    }

    pub fn take_instance(&mut self) -> Option<Instance> {
        self.live.instance.take()
    }

    /// The subtree a component node produced on its last render.
    pub fn rendered(&self) -> Option<&Node> {
        self.live.rendered.as_deref()
    }

    pub fn set_rendered(&mut self, output: Node) {
        self.live.rendered = Some(Box::new(output));
    }

    pub fn take_rendered(&mut self) -> Option<Node> {
        self.live.rendered.take().map(|output| *output)
    }

    /// Top-level surface handles this node contributes to its parent, in order.
    pub fn surface_handles(&self) -> Vec<SurfaceId> {
        let mut handles = Vec::new();
        self.collect_handles(&mut handles);
        handles
    }

    fn collect_handles(&self, out: &mut Vec<SurfaceId>) {
        match &self.kind {
            NodeKind::Element(_) | NodeKind::Text(_) => out.extend(self.live.surface),
            NodeKind::Fragment => {
                for child in &self.children {
                    child.collect_handles(out);
                }
            }
            NodeKind::Component(_) => {
                if let Some(rendered) = &self.live.rendered {
                    rendered.collect_handles(out);
                }
            }
        }
    }

    /// Unmounts every component instance in this subtree, children first.
    pub fn unmount_instances(&mut self) {
        if let Some(mut rendered) = self.live.rendered.take() {
            rendered.unmount_instances();
        }
        for child in &mut self.children {
            child.unmount_instances();
        }
        if let Some(instance) = self.live.instance.take() {
            instance.unmount();
        }
        self.set_surface(None);
    }
}

/// Cloning copies the description; live state stays with the original.
impl Clone for Node {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            attributes: self.attributes.clone(),
            children: self.children.clone(),
            key: self.key.clone(),
            node_ref: self.node_ref.clone(),
            live: LiveState::default(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Node");
        debug.field("kind", &self.kind);
        if let Some(key) = &self.key {
            debug.field("key", key);
        }
        if !self.attributes.is_empty() {
            debug.field("attributes", &self.attributes);
        }
        if !self.children.is_empty() {
            debug.field("children", &self.children);
        }
        debug.finish()
    }
}

/// Child input accepted by [`build`].
pub enum Child {
    Node(Node),
    List(Vec<Child>),
    Empty,
}

impl Child {
    fn flatten_into(self, out: &mut Vec<Node>) {
        match self {
            Child::Node(node) => out.push(node),
            Child::List(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            Child::Empty => {}
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Node(text(value))
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Node(text(value))
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Child::Node(text(value.as_str()))
    }
}

macro_rules! number_child {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Node(text(value.to_string()))
                }
            }
        )*
    };
}

number_child!(i32, i64, u32, u64, usize, f64);

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(values: Vec<T>) -> Self {
        Child::List(values.into_iter().map(Into::into).collect())
    }
}

/// Builds a node. `key` and `ref` are lifted out of `attributes`,
/// `children` is dropped from it, child lists are flattened, and
/// empty children removed.
pub fn build(
    kind: impl Into<NodeKind>,
    attributes: impl Into<Option<Attributes>>,
    children: impl IntoIterator<Item = Child>,
) -> Node {
    let mut attributes = attributes.into().unwrap_or_default();
    let key = attributes.remove("key").and_then(|value| match value {
        AttrValue::Key(key) => Some(key),
        AttrValue::Str(value) => Some(Key::Str(value)),
        AttrValue::Int(value) => Some(Key::Int(value)),
        _ => None,
    });
    let node_ref = match attributes.remove("ref") {
        Some(AttrValue::Ref(node_ref)) => Some(node_ref),
        _ => None,
    };
    attributes.remove("children");

    let mut flat = Vec::new();
    for child in children {
        child.flatten_into(&mut flat);
    }

    Node {
        kind: kind.into(),
        attributes,
        children: flat,
        key,
        node_ref,
        live: LiveState::default(),
    }
}

pub fn element(
    tag: impl Into<String>,
    attributes: impl Into<Option<Attributes>>,
    children: impl IntoIterator<Item = Child>,
) -> Node {
    build(NodeKind::Element(tag.into()), attributes, children)
}

pub fn component(
    component: Component,
    attributes: impl Into<Option<Attributes>>,
    children: impl IntoIterator<Item = Child>,
) -> Node {
    build(NodeKind::Component(component), attributes, children)
}

pub fn fragment(children: impl IntoIterator<Item = Child>) -> Node {
    build(NodeKind::Fragment, None, children)
}

pub fn text(value: impl Into<String>) -> Node {
    Node {
        kind: NodeKind::Text(value.into()),
        attributes: Attributes::new(),
        children: Vec::new(),
        key: None,
        node_ref: None,
        live: LiveState::default(),
    }
}

/// Host tags must be non-empty ASCII alphanumerics or `-`, starting with a letter.
pub fn validate_tag(tag: &str) -> RenderResult<()> {
    let mut chars = tag.chars();
    let valid = chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(RenderError::UnsupportedNodeKind(format!(
            "host element with tag {tag:?}"
        )))
    }
}

#[cfg(test)]
#[path = "tests/node_tests.rs"]
mod tests;
