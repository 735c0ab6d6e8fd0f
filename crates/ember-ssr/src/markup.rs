//! Node trees to static markup.
//!
//! Output is never escaped, handlers are dropped, and a void element with no
//! children closes itself as `<img src="a.png" />`. Components render once
//! against a throwaway runtime: state hooks yield their initial values and
//! effects are discarded without running.

use std::fmt::Write;

use ember_core::{
    classify, mount_component, validate_tag, AttributeOp, Node, NodeKind, Props, RenderConfig,
    RenderResult, Runtime, RuntimeHandle,
};

/// Serializes `node` with the default configuration.
pub fn serialize(node: &Node) -> RenderResult<String> {
    MarkupRenderer::new().render(node)
}

#[derive(Clone, Debug, Default)]
pub struct MarkupRenderer {
    config: RenderConfig,
}

impl MarkupRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self, node: &Node) -> RenderResult<String> {
        let runtime = Runtime::default();
        let mut out = String::new();
        let result = self.write_node(node, &runtime.handle(), &mut out);
        let dropped = runtime.discard_effects();
        log::trace!(
            "serialized {} ({} bytes, {dropped} effects dropped)",
            node.kind().describe(),
            out.len()
        );
        result.map(|()| out)
    }

    fn write_node(&self, node: &Node, runtime: &RuntimeHandle, out: &mut String) -> RenderResult<()> {
        match node.kind() {
            NodeKind::Text(value) => out.push_str(value),
            NodeKind::Fragment => {
                for child in node.children() {
                    self.write_node(child, runtime, out)?;
                }
            }
            NodeKind::Component(component) => {
                let props = Props::from_node(node);
                let (output, instance) = mount_component(component, &props, None, runtime)?;
                let result = self.write_node(&output, runtime, out);
                instance.unmount();
                result?;
            }
            NodeKind::Element(tag) => {
                validate_tag(tag)?;
                out.push('<');
                out.push_str(tag);
                self.write_attributes(node, out);
                if node.children().is_empty() && self.config.is_void_element(tag) {
                    out.push_str(" />");
                    return Ok(());
                }
                out.push('>');
                for child in node.children() {
                    self.write_node(child, runtime, out)?;
                }
                let _ = write!(out, "</{tag}>");
            }
        }
        Ok(())
    }

    fn write_attributes(&self, node: &Node, out: &mut String) {
        for (name, value) in node.attributes().iter() {
            match classify(name, value, &self.config) {
                AttributeOp::ClassName(class) => {
                    let _ = write!(out, " class=\"{class}\"");
                }
                AttributeOp::Style(style) if !style.is_empty() => {
                    let _ = write!(out, " style=\"{}\"", style.to_css());
                }
                AttributeOp::Set { name, value } => {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                AttributeOp::Style(_) | AttributeOp::Listener { .. } | AttributeOp::Skip => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/markup_tests.rs"]
mod tests;
