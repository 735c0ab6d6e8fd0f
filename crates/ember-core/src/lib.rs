#![doc = r"Core pieces of the Ember rendering runtime: nodes, hooks and component instances."]

pub mod attributes;
pub mod collections;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod instance;
pub mod node;
pub mod platform;
pub mod runtime;

pub use attributes::{
    classify, AttrValue, AttributeOp, Attributes, Event, EventHandler, NodeRef, Style,
};
pub use component::{ClassComponent, Component, ComponentId, Props, Updater};
pub use config::{DocumentConfig, RenderConfig, UpdateStrategy};
pub use context::{current_render_target, render_depth, with_render_target, RenderScope};
pub use error::{RenderError, RenderResult};
pub use hooks::{use_effect, use_effect_with, use_state, use_state_with, Cleanup, StateSetter};
pub use instance::{mount_component, Instance, InstanceId};
pub use node::{
    build, component, element, fragment, text, validate_tag, Child, Key, Node, NodeKind,
    SurfaceId,
};
pub use platform::RuntimeScheduler;
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle, Task};

/// Builds a `Vec<Child>` from heterogeneous child expressions.
///
/// ```
/// use ember_core::{build, children};
/// let node = build("p", None, children!["count: ", 3, None::<&str>]);
/// assert_eq!(node.children().len(), 2);
/// ```
#[macro_export]
macro_rules! children {
    () => {
        ::std::vec::Vec::<$crate::Child>::new()
    };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::Child::from($child)),+]
    };
}

/// Builds an [`Attributes`] map from `name => value` pairs.
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Attributes::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Attributes::new()$(.with($name, $value))+
    };
}
