//! Arena-backed in-memory surface used for tests, benchmarks and headless hosts.

use ember_core::{Event, EventHandler, RenderConfig, SurfaceId};
use indexmap::IndexMap;

use crate::surface::{Surface, SurfaceError, SurfaceResult};

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    listeners: IndexMap<String, EventHandler>,
    children: Vec<SurfaceId>,
}

enum NodeData {
    Element(ElementData),
    Text(String),
}

struct SurfaceNode {
    parent: Option<SurfaceId>,
    data: NodeData,
}

/// In-memory surface. `class` and `style` live in the attribute list so
/// that [`MemorySurface::markup`] reads like the markup renderer's output.
#[derive(Default)]
pub struct MemorySurface {
    nodes: Vec<Option<SurfaceNode>>,
    config: RenderConfig,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
        }
    }

    /// Creates a surface holding a single container element.
    pub fn with_container(tag: &str) -> (Self, SurfaceId) {
        let mut surface = Self::new();
        let container = surface.create_element(tag);
        (surface, container)
    }

    /// Live nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        matches!(self.nodes.get(id), Some(Some(_)))
    }

    fn push(&mut self, data: NodeData) -> SurfaceId {
        let id = self.nodes.len();
        self.nodes.push(Some(SurfaceNode { parent: None, data }));
        id
    }

    fn node(&self, id: SurfaceId) -> SurfaceResult<&SurfaceNode> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(SurfaceError::Missing { id })
    }

    fn node_mut(&mut self, id: SurfaceId) -> SurfaceResult<&mut SurfaceNode> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(SurfaceError::Missing { id })
    }

    fn element(&self, id: SurfaceId) -> SurfaceResult<&ElementData> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(SurfaceError::NotAnElement { id }),
        }
    }

    fn element_mut(&mut self, id: SurfaceId) -> SurfaceResult<&mut ElementData> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(SurfaceError::NotAnElement { id }),
        }
    }

    fn detach(&mut self, child: SurfaceId) -> SurfaceResult<()> {
        let parent = self.node_mut(child)?.parent.take();
        if let Some(parent) = parent {
            let element = self.element_mut(parent)?;
            element.children.retain(|id| *id != child);
        }
        Ok(())
    }

    fn release(&mut self, id: SurfaceId) {
        let Some(node) = self.nodes.get_mut(id).and_then(Option::take) else {
            return;
        };
        if let NodeData::Element(element) = node.data {
            for child in element.children {
                self.release(child);
            }
        }
    }

    fn sync_style_attribute(element: &mut ElementData) {
        if element.style.is_empty() {
            element.attributes.shift_remove("style");
        } else {
            let css = element
                .style
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            element.attributes.insert("style".to_owned(), css);
        }
    }

    pub fn parent(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.node(id).ok().and_then(|node| node.parent)
    }

    pub fn tag(&self, id: SurfaceId) -> Option<&str> {
        self.element(id).ok().map(|element| element.tag.as_str())
    }

    pub fn text(&self, id: SurfaceId) -> Option<&str> {
        match &self.node(id).ok()?.data {
            NodeData::Text(value) => Some(value),
            NodeData::Element(_) => None,
        }
    }

    pub fn attribute(&self, id: SurfaceId, name: &str) -> Option<&str> {
        self.element(id)
            .ok()?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    pub fn style(&self, id: SurfaceId, property: &str) -> Option<&str> {
        self.element(id).ok()?.style.get(property).map(String::as_str)
    }

    pub fn has_listener(&self, id: SurfaceId, event: &str) -> bool {
        self.element(id)
            .map(|element| element.listeners.contains_key(event))
            .unwrap_or(false)
    }

    pub fn child_ids(&self, id: SurfaceId) -> &[SurfaceId] {
        self.element(id)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: SurfaceId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: SurfaceId, out: &mut String) {
        match self.node(id).map(|node| &node.data) {
            Ok(NodeData::Text(value)) => out.push_str(value),
            Ok(NodeData::Element(element)) => {
                for child in &element.children {
                    self.collect_text(*child, out);
                }
            }
            Err(_) => {}
        }
    }

    /// Depth-first search below (and including) `root`.
    pub fn find_first(
        &self,
        root: SurfaceId,
        predicate: impl Fn(&MemorySurface, SurfaceId) -> bool,
    ) -> Option<SurfaceId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            if predicate(self, id) {
                return Some(id);
            }
            stack.extend(self.child_ids(id).iter().rev());
        }
        None
    }

    pub fn find_by_tag(&self, root: SurfaceId, tag: &str) -> Option<SurfaceId> {
        self.find_first(root, |surface, id| surface.tag(id) == Some(tag))
    }

    pub fn find_by_attribute(&self, root: SurfaceId, name: &str, value: &str) -> Option<SurfaceId> {
        self.find_first(root, |surface, id| surface.attribute(id, name) == Some(value))
    }

    /// Delivers `event` to `target` and bubbles it through its ancestors.
    /// Returns `false` when a handler called `prevent_default`.
    pub fn dispatch_event(&self, target: SurfaceId, event: &Event) -> bool {
        let mut current = Some(target);
        while let Some(id) = current {
            let Ok(node) = self.node(id) else {
                break;
            };
            if let NodeData::Element(element) = &node.data {
                if let Some(handler) = element.listeners.get(event.kind()) {
                    event.set_current_target(id);
                    handler.call(event);
                    if event.propagation_stopped() {
                        break;
                    }
                }
            }
            current = node.parent;
        }
        !event.default_prevented()
    }

    pub fn dispatch(&self, target: SurfaceId, kind: &str) -> bool {
        self.dispatch_event(target, &Event::new(kind).with_target(target))
    }

    pub fn click(&self, target: SurfaceId) -> bool {
        self.dispatch(target, "click")
    }

    /// Outer markup of `id`, unescaped.
    pub fn markup(&self, id: SurfaceId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    /// Markup of the children of `id`.
    pub fn inner_markup(&self, id: SurfaceId) -> String {
        let mut out = String::new();
        for child in self.child_ids(id) {
            self.write_markup(*child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: SurfaceId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(value) => out.push_str(value),
            NodeData::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                if element.children.is_empty() && self.config.is_void_element(&element.tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in &element.children {
                    self.write_markup(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag));
            }
        }
    }

    pub fn dump_tree(&self, root: SurfaceId) -> String {
        let mut output = String::new();
        self.dump_node(&mut output, root, 0);
        output
    }

    fn dump_node(&self, output: &mut String, id: SurfaceId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.node(id).map(|node| &node.data) {
            Ok(NodeData::Element(element)) => {
                output.push_str(&format!("{indent}[{id}] <{}>\n", element.tag));
                for child in &element.children {
                    self.dump_node(output, *child, depth + 1);
                }
            }
            Ok(NodeData::Text(value)) => output.push_str(&format!("{indent}[{id}] {value:?}\n")),
            Err(_) => output.push_str(&format!("{indent}[{id}] (missing)\n")),
        }
    }
}

impl Surface for MemorySurface {
    fn create_element(&mut self, tag: &str) -> SurfaceId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_owned(),
            ..ElementData::default()
        }))
    }

    fn create_text(&mut self, value: &str) -> SurfaceId {
        self.push(NodeData::Text(value.to_owned()))
    }

    fn set_text(&mut self, id: SurfaceId, value: &str) -> SurfaceResult<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(text) => {
                value.clone_into(text);
                Ok(())
            }
            NodeData::Element(_) => Err(SurfaceError::NotAText { id }),
        }
    }

    fn append_child(&mut self, parent: SurfaceId, child: SurfaceId) -> SurfaceResult<()> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: SurfaceId,
        child: SurfaceId,
        before: Option<SurfaceId>,
    ) -> SurfaceResult<()> {
        if before == Some(child) {
            return Ok(());
        }
        self.element(parent)?;
        self.detach(child)?;
        let element = self.element_mut(parent)?;
        let index = match before {
            Some(before) => element
                .children
                .iter()
                .position(|id| *id == before)
                .ok_or(SurfaceError::NotAChild {
                    parent,
                    child: before,
                })?,
            None => element.children.len(),
        };
        element.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: SurfaceId, child: SurfaceId) -> SurfaceResult<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(SurfaceError::NotAChild { parent, child });
        }
        self.detach(child)?;
        self.release(child);
        Ok(())
    }

    fn clear_children(&mut self, parent: SurfaceId) -> SurfaceResult<()> {
        let children = std::mem::take(&mut self.element_mut(parent)?.children);
        for child in children {
            self.release(child);
        }
        Ok(())
    }

    fn set_attribute(&mut self, id: SurfaceId, name: &str, value: &str) -> SurfaceResult<()> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_attribute(&mut self, id: SurfaceId, name: &str) -> SurfaceResult<()> {
        let element = self.element_mut(id)?;
        element.attributes.shift_remove(name);
        if name == "style" {
            element.style.clear();
        }
        Ok(())
    }

    fn set_class_name(&mut self, id: SurfaceId, class: &str) -> SurfaceResult<()> {
        self.set_attribute(id, "class", class)
    }

    fn set_style(&mut self, id: SurfaceId, property: &str, value: &str) -> SurfaceResult<()> {
        let element = self.element_mut(id)?;
        element.style.insert(property.to_owned(), value.to_owned());
        Self::sync_style_attribute(element);
        Ok(())
    }

    fn remove_style(&mut self, id: SurfaceId, property: &str) -> SurfaceResult<()> {
        let element = self.element_mut(id)?;
        element.style.shift_remove(property);
        Self::sync_style_attribute(element);
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        id: SurfaceId,
        event: &str,
        handler: EventHandler,
    ) -> SurfaceResult<()> {
        self.element_mut(id)?
            .listeners
            .insert(event.to_owned(), handler);
        Ok(())
    }

    fn remove_event_listener(&mut self, id: SurfaceId, event: &str) -> SurfaceResult<()> {
        self.element_mut(id)?.listeners.shift_remove(event);
        Ok(())
    }

    fn children(&self, id: SurfaceId) -> SurfaceResult<Vec<SurfaceId>> {
        Ok(self.element(id)?.children.clone())
    }

    fn tag_name(&self, id: SurfaceId) -> SurfaceResult<Option<String>> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Ok(Some(element.tag.clone())),
            NodeData::Text(_) => Ok(None),
        }
    }

    fn text_value(&self, id: SurfaceId) -> SurfaceResult<Option<String>> {
        match &self.node(id)?.data {
            NodeData::Text(value) => Ok(Some(value.clone())),
            NodeData::Element(_) => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
