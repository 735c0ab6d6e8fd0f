//! Tree walking shared by mount, update and repaint.
//!
//! Every walk produces detached surface nodes; the nearest element (or the
//! root container) then places its children with [`Reconciler::sync_children`].

use std::collections::VecDeque;
use std::mem::discriminant;

use ember_core::collections::map::{HashMap, HashSet};
use ember_core::{
    classify, mount_component, validate_tag, AttributeOp, Attributes, Component, Key, Node,
    NodeKind, Props, RenderConfig, RuntimeHandle, SurfaceId,
};

use crate::error::DomResult;
use crate::surface::Surface;

pub(crate) struct Reconciler<'a, S: Surface> {
    pub(crate) surface: &'a mut S,
    config: &'a RenderConfig,
    pub(crate) runtime: RuntimeHandle,
    /// Build new surface nodes for every position instead of reusing live ones.
    fresh: bool,
}

impl<'a, S: Surface> Reconciler<'a, S> {
    pub(crate) fn new(
        surface: &'a mut S,
        config: &'a RenderConfig,
        runtime: RuntimeHandle,
        fresh: bool,
    ) -> Self {
        Self {
            surface,
            config,
            runtime,
            fresh,
        }
    }

    /// Materializes `node` and its subtree. The resulting top-level handles
    /// are left detached.
    pub(crate) fn mount_node(&mut self, node: &mut Node) -> DomResult<()> {
        match node.kind().clone() {
            NodeKind::Text(value) => {
                let id = self.surface.create_text(&value);
                node.set_surface(Some(id));
            }
            NodeKind::Element(tag) => {
                validate_tag(&tag)?;
                let id = self.surface.create_element(&tag);
                self.patch_attributes(id, None, node.attributes())?;
                for child in node.children_mut() {
                    self.mount_node(child)?;
                }
                for handle in child_handles(node.children()) {
                    self.surface.append_child(id, handle)?;
                }
                node.set_surface(Some(id));
            }
            NodeKind::Fragment => {
                for child in node.children_mut() {
                    self.mount_node(child)?;
                }
            }
            NodeKind::Component(component) => self.render_component(&component, node, None)?,
        }
        Ok(())
    }

    /// Moves the live state of `old` into `new`, patching the surface to match.
    pub(crate) fn reconcile(&mut self, mut old: Node, new: &mut Node) -> DomResult<()> {
        if !old.is_same_position(new) {
            log::trace!(
                "replacing {} with {}",
                old.kind().describe(),
                new.kind().describe()
            );
            old.unmount_instances();
            return self.mount_node(new);
        }

        match new.kind().clone() {
            NodeKind::Text(value) => match old.surface().filter(|_| !self.fresh) {
                Some(id) => {
                    if old.text_value() != Some(value.as_str()) {
                        self.surface.set_text(id, &value)?;
                    }
                    new.set_surface(Some(id));
                }
                None => self.mount_node(new)?,
            },
            NodeKind::Element(tag) => {
                let (id, previous) = match old.surface().filter(|_| !self.fresh) {
                    Some(id) => (id, Some(old.attributes())),
                    None => {
                        validate_tag(&tag)?;
                        (self.surface.create_element(&tag), None)
                    }
                };
                self.patch_attributes(id, previous, new.attributes())?;
                let old_children = std::mem::take(old.children_mut());
                self.reconcile_children(old_children, new.children_mut())?;
                self.sync_children(id, &child_handles(new.children()))?;
                new.set_surface(Some(id));
            }
            NodeKind::Fragment => {
                let old_children = std::mem::take(old.children_mut());
                self.reconcile_children(old_children, new.children_mut())?;
            }
            NodeKind::Component(component) => {
                self.render_component(&component, new, Some(old))?;
            }
        }
        Ok(())
    }

    fn render_component(
        &mut self,
        component: &Component,
        node: &mut Node,
        previous: Option<Node>,
    ) -> DomResult<()> {
        let (existing, old_output) = match previous {
            Some(mut old) => (old.take_instance(), old.take_rendered()),
            None => (None, None),
        };
        let props = Props::from_node(node);
        let (mut output, instance) = mount_component(component, &props, existing, &self.runtime)?;
        node.set_instance(instance);
        let result = match old_output {
            Some(old_output) => self.reconcile(old_output, &mut output),
            None => self.mount_node(&mut output),
        };
        node.set_rendered(output);
        result
    }

    /// Keyed children match by key, the rest by position among unkeyed
    /// siblings. Unmatched old children are unmounted.
    pub(crate) fn reconcile_children(&mut self, old: Vec<Node>, new: &mut [Node]) -> DomResult<()> {
        let mut keyed: HashMap<Key, usize> = HashMap::new();
        let mut unkeyed = VecDeque::new();
        for (index, node) in old.iter().enumerate() {
            match node.key() {
                Some(key) => {
                    if keyed.insert(key.clone(), index).is_some() {
                        log::warn!("duplicate key `{key}` among siblings; only the last one is reused");
                    }
                }
                None => unkeyed.push_back(index),
            }
        }

        let assigned: Vec<Option<usize>> = new
            .iter()
            .map(|child| match child.key() {
                Some(key) => keyed.remove(key),
                None => unkeyed.pop_front(),
            })
            .collect();

        let mut pool: Vec<Option<Node>> = old.into_iter().map(Some).collect();
        let mut matched: Vec<Option<Node>> = assigned
            .into_iter()
            .map(|index| index.and_then(|index| pool.get_mut(index).and_then(Option::take)))
            .collect();
        // Leftovers unmount before any new child mounts.
        for mut leftover in pool.into_iter().flatten() {
            leftover.unmount_instances();
        }

        for (child, old) in new.iter_mut().zip(matched.iter_mut()) {
            match old.take() {
                Some(old) => self.reconcile(old, child)?,
                None => self.mount_node(child)?,
            }
        }
        Ok(())
    }

    /// Makes the children of `parent` exactly `desired`, in order. Children
    /// not in `desired` are removed and released.
    pub(crate) fn sync_children(&mut self, parent: SurfaceId, desired: &[SurfaceId]) -> DomResult<()> {
        let wanted: HashSet<SurfaceId> = desired.iter().copied().collect();
        let mut current = self.surface.children(parent)?;
        for stale in current.iter().filter(|id| !wanted.contains(*id)) {
            self.surface.remove_child(parent, *stale)?;
        }
        current.retain(|id| wanted.contains(id));

        for (index, handle) in desired.iter().enumerate() {
            if current.get(index) == Some(handle) {
                continue;
            }
            let before = current.get(index).copied();
            self.surface.insert_before(parent, *handle, before)?;
            current.retain(|id| id != handle);
            current.insert(index, *handle);
        }
        Ok(())
    }

    /// Applies `new` onto element `id`, undoing whatever `old` set that `new` no longer does.
    pub(crate) fn patch_attributes(
        &mut self,
        id: SurfaceId,
        old: Option<&Attributes>,
        new: &Attributes,
    ) -> DomResult<()> {
        let config = self.config;
        if let Some(old) = old {
            for (name, value) in old.iter() {
                if !new.contains(name) {
                    self.undo(id, classify(name, value, config))?;
                }
            }
        }

        for (name, value) in new.iter() {
            let next = classify(name, value, config);
            let previous = old
                .and_then(|old| old.get(name))
                .map(|value| classify(name, value, config));
            match (previous, next) {
                (Some(AttributeOp::Style(previous)), AttributeOp::Style(next)) => {
                    for (property, _) in previous.declarations() {
                        if !next.declarations().any(|(kept, _)| kept == property) {
                            self.surface.remove_style(id, &property)?;
                        }
                    }
                    for (property, declared) in next.declarations() {
                        self.surface.set_style(id, &property, declared)?;
                    }
                }
                (Some(previous), next) if discriminant(&previous) == discriminant(&next) => {
                    if previous != next {
                        self.apply(id, next)?;
                    }
                }
                (previous, next) => {
                    if let Some(previous) = previous {
                        self.undo(id, previous)?;
                    }
                    self.apply(id, next)?;
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, id: SurfaceId, op: AttributeOp<'_>) -> DomResult<()> {
        match op {
            AttributeOp::ClassName(class) => self.surface.set_class_name(id, &class)?,
            AttributeOp::Style(style) => {
                for (property, value) in style.declarations() {
                    self.surface.set_style(id, &property, value)?;
                }
            }
            AttributeOp::Listener { event, handler } => {
                self.surface.add_event_listener(id, &event, handler.clone())?;
            }
            AttributeOp::Set { name, value } => self.surface.set_attribute(id, name, &value)?,
            AttributeOp::Skip => {}
        }
        Ok(())
    }

    fn undo(&mut self, id: SurfaceId, op: AttributeOp<'_>) -> DomResult<()> {
        match op {
            AttributeOp::ClassName(_) => self.surface.remove_attribute(id, "class")?,
            AttributeOp::Style(style) => {
                for (property, _) in style.declarations() {
                    self.surface.remove_style(id, &property)?;
                }
            }
            AttributeOp::Listener { event, .. } => self.surface.remove_event_listener(id, &event)?,
            AttributeOp::Set { name, .. } => self.surface.remove_attribute(id, name)?,
            AttributeOp::Skip => {}
        }
        Ok(())
    }
}

pub(crate) fn child_handles(children: &[Node]) -> Vec<SurfaceId> {
    children.iter().flat_map(Node::surface_handles).collect()
}
