//! The host capability set the interactive renderer drives.

use ember_core::{EventHandler, SurfaceId};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("surface node {id} missing")]
    Missing { id: SurfaceId },
    #[error("surface node {id} is not an element")]
    NotAnElement { id: SurfaceId },
    #[error("surface node {id} is not a text unit")]
    NotAText { id: SurfaceId },
    #[error("surface node {child} is not a child of {parent}")]
    NotAChild { parent: SurfaceId, child: SurfaceId },
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// A live presentation tree: elements and text units addressed by handle.
///
/// Inserting a node that already has a parent moves it. Removing a node
/// releases its whole subtree.
pub trait Surface {
    fn create_element(&mut self, tag: &str) -> SurfaceId;
    fn create_text(&mut self, value: &str) -> SurfaceId;
    fn set_text(&mut self, id: SurfaceId, value: &str) -> SurfaceResult<()>;

    fn append_child(&mut self, parent: SurfaceId, child: SurfaceId) -> SurfaceResult<()>;
    /// Inserts `child` before `before`, or appends when `before` is `None`.
    fn insert_before(
        &mut self,
        parent: SurfaceId,
        child: SurfaceId,
        before: Option<SurfaceId>,
    ) -> SurfaceResult<()>;
    fn remove_child(&mut self, parent: SurfaceId, child: SurfaceId) -> SurfaceResult<()>;
    fn clear_children(&mut self, parent: SurfaceId) -> SurfaceResult<()>;

    fn set_attribute(&mut self, id: SurfaceId, name: &str, value: &str) -> SurfaceResult<()>;
    fn remove_attribute(&mut self, id: SurfaceId, name: &str) -> SurfaceResult<()>;
    fn set_class_name(&mut self, id: SurfaceId, class: &str) -> SurfaceResult<()>;
    fn set_style(&mut self, id: SurfaceId, property: &str, value: &str) -> SurfaceResult<()>;
    fn remove_style(&mut self, id: SurfaceId, property: &str) -> SurfaceResult<()>;

    /// Binds `handler` for `event`, replacing any handler already bound for it.
    fn add_event_listener(
        &mut self,
        id: SurfaceId,
        event: &str,
        handler: EventHandler,
    ) -> SurfaceResult<()>;
    fn remove_event_listener(&mut self, id: SurfaceId, event: &str) -> SurfaceResult<()>;

    fn children(&self, id: SurfaceId) -> SurfaceResult<Vec<SurfaceId>>;
    /// `None` for text units.
    fn tag_name(&self, id: SurfaceId) -> SurfaceResult<Option<String>>;
    /// `None` for elements.
    fn text_value(&self, id: SurfaceId) -> SurfaceResult<Option<String>>;
}
