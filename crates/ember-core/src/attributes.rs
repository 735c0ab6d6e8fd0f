//! Attribute values carried by nodes, and the classification rules both
//! renderers share when turning them into surface calls or markup.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::RenderConfig;
use crate::node::{Key, SurfaceId};

/// An event delivered to an [`EventHandler`].
#[derive(Debug)]
pub struct Event {
    kind: String,
    target: Option<SurfaceId>,
    current_target: Cell<Option<SurfaceId>>,
    data: Option<String>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target: None,
            current_target: Cell::new(None),
            data: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn with_target(mut self, target: SurfaceId) -> Self {
        self.target = Some(target);
        self
    }

    /// Attaches a payload, e.g. the value of an input after an `input` event.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> Option<SurfaceId> {
        self.target
    }

    pub fn current_target(&self) -> Option<SurfaceId> {
        self.current_target.get()
    }

    pub fn set_current_target(&self, target: SurfaceId) {
        self.current_target.set(Some(target));
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Shared event callback. Two handlers are equal only if they are the same allocation.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}

/// Receives the surface handle of the element it is attached to.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<SurfaceId>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<SurfaceId> {
        self.0.get()
    }

    pub fn set(&self, handle: Option<SurfaceId>) {
        self.0.set(handle);
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.0.get()).finish()
    }
}

/// Ordered style declarations. Keys may be written camelCase; they are
/// rendered kebab-case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    properties: IndexMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(property.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Declarations with their property names already converted to kebab-case.
    pub fn declarations(&self) -> impl Iterator<Item = (String, &str)> {
        self.properties
            .iter()
            .map(|(name, value)| (kebab_case(name), value.as_str()))
    }

    /// The `style="..."` text for this map.
    pub fn to_css(&self) -> String {
        self.declarations()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// A single attribute value.
#[derive(Clone)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Style(Style),
    Handler(EventHandler),
    Ref(NodeRef),
    Key(Key),
    /// Opaque data passed through props; never rendered.
    Data(Rc<dyn Any>),
}

impl AttrValue {
    pub fn data<T: 'static>(value: T) -> Self {
        AttrValue::Data(Rc::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Text form used for plain attributes; `None` for values that have no
    /// textual representation.
    pub fn to_text(&self) -> Option<String> {
        match self {
            AttrValue::Str(value) => Some(value.clone()),
            AttrValue::Int(value) => Some(value.to_string()),
            AttrValue::Float(value) => Some(value.to_string()),
            AttrValue::Bool(true) => Some(String::new()),
            AttrValue::Key(Key::Str(value)) => Some(value.clone()),
            AttrValue::Key(Key::Int(value)) => Some(value.to_string()),
            AttrValue::Bool(false)
            | AttrValue::Style(_)
            | AttrValue::Handler(_)
            | AttrValue::Ref(_)
            | AttrValue::Data(_) => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Style(a), AttrValue::Style(b)) => a == b,
            (AttrValue::Handler(a), AttrValue::Handler(b)) => a == b,
            (AttrValue::Ref(a), AttrValue::Ref(b)) => a == b,
            (AttrValue::Key(a), AttrValue::Key(b)) => a == b,
            (AttrValue::Data(a), AttrValue::Data(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(value) => f.debug_tuple("Str").field(value).finish(),
            AttrValue::Int(value) => f.debug_tuple("Int").field(value).finish(),
            AttrValue::Float(value) => f.debug_tuple("Float").field(value).finish(),
            AttrValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            AttrValue::Style(value) => f.debug_tuple("Style").field(value).finish(),
            AttrValue::Handler(value) => f.debug_tuple("Handler").field(value).finish(),
            AttrValue::Ref(value) => f.debug_tuple("Ref").field(value).finish(),
            AttrValue::Key(value) => f.debug_tuple("Key").field(value).finish(),
            AttrValue::Data(_) => f.write_str("Data(..)"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Str(value.clone())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Style> for AttrValue {
    fn from(value: Style) -> Self {
        AttrValue::Style(value)
    }
}

impl From<EventHandler> for AttrValue {
    fn from(value: EventHandler) -> Self {
        AttrValue::Handler(value)
    }
}

impl From<NodeRef> for AttrValue {
    fn from(value: NodeRef) -> Self {
        AttrValue::Ref(value)
    }
}

impl From<Key> for AttrValue {
    fn from(value: Key) -> Self {
        AttrValue::Key(value)
    }
}

/// Insertion-ordered attribute map. Order is irrelevant to semantics but
/// keeps rendered output deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    entries: IndexMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.entries.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<AttrValue>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

/// What a renderer should do with one attribute.
#[derive(Debug, PartialEq)]
pub enum AttributeOp<'a> {
    ClassName(String),
    Style(&'a Style),
    Listener {
        event: String,
        handler: &'a EventHandler,
    },
    Set {
        name: &'a str,
        value: String,
    },
    Skip,
}

/// Maps an attribute onto the operation both renderers perform for it.
pub fn classify<'a>(name: &'a str, value: &'a AttrValue, config: &RenderConfig) -> AttributeOp<'a> {
    match value {
        AttrValue::Handler(handler) => match event_name(name, &config.event_prefix) {
            Some(event) => AttributeOp::Listener { event, handler },
            None => AttributeOp::Skip,
        },
        AttrValue::Style(style) if name == "style" => AttributeOp::Style(style),
        _ if name == "className" || name == "class" => match value.to_text() {
            Some(class) => AttributeOp::ClassName(class),
            None => AttributeOp::Skip,
        },
        _ => match value.to_text() {
            Some(text) => AttributeOp::Set { name, value: text },
            None => AttributeOp::Skip,
        },
    }
}

/// `onClick` -> `click` for the default prefix.
pub fn event_name(name: &str, prefix: &str) -> Option<String> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_ascii_lowercase())
}
