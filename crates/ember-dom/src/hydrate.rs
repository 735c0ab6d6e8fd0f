//! Adopting surface content that was produced elsewhere (usually from server markup).

use std::collections::VecDeque;

use ember_core::{mount_component, validate_tag, Node, NodeKind, Props, SurfaceId};

use crate::error::{DomError, DomResult};
use crate::reconcile::Reconciler;
use crate::surface::Surface;

impl<S: Surface> Reconciler<'_, S> {
    /// Claims surface nodes from the front of `cursor` (the unclaimed children
    /// of `parent`) for `node`, checking that they have the expected shape and
    /// attaching listeners.
    pub(crate) fn hydrate_node(
        &mut self,
        node: &mut Node,
        parent: SurfaceId,
        cursor: &mut VecDeque<SurfaceId>,
    ) -> DomResult<()> {
        match node.kind().clone() {
            NodeKind::Text(value) => {
                let id = self.hydrate_text(&value, parent, cursor)?;
                node.set_surface(Some(id));
            }
            NodeKind::Element(tag) => {
                validate_tag(&tag)?;
                let id = claim(cursor, || format!("<{tag}>"))?;
                let found = self.surface.tag_name(id)?;
                if !found.is_some_and(|found| found.eq_ignore_ascii_case(&tag)) {
                    return Err(DomError::HydrationMismatch {
                        expected: format!("<{tag}>"),
                        found: self.describe(id)?,
                    });
                }
                self.patch_attributes(id, None, node.attributes())?;
                let mut children: VecDeque<SurfaceId> = self.surface.children(id)?.into();
                for child in node.children_mut() {
                    self.hydrate_node(child, id, &mut children)?;
                }
                for extra in children {
                    log::debug!("removing surplus surface node {extra} under <{tag}>");
                    self.surface.remove_child(id, extra)?;
                }
                node.set_surface(Some(id));
            }
            NodeKind::Fragment => {
                for child in node.children_mut() {
                    self.hydrate_node(child, parent, cursor)?;
                }
            }
            NodeKind::Component(component) => {
                let props = Props::from_node(node);
                let (mut output, instance) =
                    mount_component(&component, &props, None, &self.runtime)?;
                node.set_instance(instance);
                let result = self.hydrate_node(&mut output, parent, cursor);
                node.set_rendered(output);
                result?;
            }
        }
        Ok(())
    }

    /// Adjacent text children arrive as one merged run, and empty ones not
    /// at all. A run that starts with `value` is split; an empty `value`
    /// gets a fresh node.
    fn hydrate_text(
        &mut self,
        value: &str,
        parent: SurfaceId,
        cursor: &mut VecDeque<SurfaceId>,
    ) -> DomResult<SurfaceId> {
        if value.is_empty() {
            let id = self.surface.create_text("");
            self.surface.insert_before(parent, id, cursor.front().copied())?;
            return Ok(id);
        }

        let id = claim(cursor, || format!("text {value:?}"))?;
        let Some(existing) = self.surface.text_value(id)? else {
            return Err(DomError::HydrationMismatch {
                expected: format!("text {value:?}"),
                found: self.describe(id)?,
            });
        };
        match existing.strip_prefix(value) {
            Some("") => {}
            Some(rest) => {
                log::trace!("splitting text run {existing:?} after {} bytes", value.len());
                self.surface.set_text(id, value)?;
                let remainder = self.surface.create_text(rest);
                self.surface.insert_before(parent, remainder, cursor.front().copied())?;
                cursor.push_front(remainder);
            }
            None => self.surface.set_text(id, value)?,
        }
        Ok(id)
    }

    fn describe(&self, id: SurfaceId) -> DomResult<String> {
        if let Some(tag) = self.surface.tag_name(id)? {
            return Ok(format!("<{tag}>"));
        }
        let text = self.surface.text_value(id)?.unwrap_or_default();
        Ok(format!("text {text:?}"))
    }
}

fn claim(
    cursor: &mut VecDeque<SurfaceId>,
    expected: impl FnOnce() -> String,
) -> DomResult<SurfaceId> {
    cursor.pop_front().ok_or_else(|| DomError::HydrationMismatch {
        expected: expected(),
        found: "nothing".to_owned(),
    })
}
