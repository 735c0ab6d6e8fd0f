//! Loads server markup onto a surface so hydration can be tested without a
//! browser.
//!
//! Only the dialect the markup renderer writes is understood: double-quoted
//! attribute values, `/>` or a void tag for childless elements, and raw
//! (unescaped) text.

use ember_core::{RenderConfig, SurfaceId};
use ember_dom::{Surface, SurfaceError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MarkupLoadError {
    #[error("malformed markup at byte {offset}: {message}")]
    Malformed { offset: usize, message: String },
    #[error("closing tag </{found}> at byte {offset} does not match <{expected}>")]
    Mismatched {
        offset: usize,
        expected: String,
        found: String,
    },
    #[error("unclosed <{tag}>")]
    Unclosed { tag: String },
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Parses `markup` and appends the resulting nodes to `parent`.
pub fn load_markup<S: Surface>(
    surface: &mut S,
    parent: SurfaceId,
    markup: &str,
    config: &RenderConfig,
) -> Result<(), MarkupLoadError> {
    let mut stack: Vec<(String, SurfaceId)> = Vec::new();
    let mut rest = markup;
    while !rest.is_empty() {
        let offset = markup.len() - rest.len();
        let current = stack.last().map_or(parent, |(_, id)| *id);

        if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').ok_or_else(|| malformed(offset, "unterminated closing tag"))?;
            let found = after[..end].trim();
            match stack.pop() {
                Some((expected, _)) if expected == found => {}
                Some((expected, _)) => {
                    return Err(MarkupLoadError::Mismatched {
                        offset,
                        expected,
                        found: found.to_owned(),
                    })
                }
                None => return Err(malformed(offset, "closing tag without an open element")),
            }
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix('<') {
            let (tag, attributes, self_closing, remaining) = parse_open_tag(after, offset + 1)?;
            let id = surface.create_element(&tag);
            for (name, value) in attributes {
                apply_attribute(surface, id, &name, &value)?;
            }
            surface.append_child(current, id)?;
            if !self_closing && !config.is_void_element(&tag) {
                stack.push((tag, id));
            }
            rest = remaining;
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let text = surface.create_text(&rest[..end]);
            surface.append_child(current, text)?;
            rest = &rest[end..];
        }
    }

    match stack.pop() {
        Some((tag, _)) => Err(MarkupLoadError::Unclosed { tag }),
        None => {
            log::trace!("loaded {} bytes of markup under {parent}", markup.len());
            Ok(())
        }
    }
}

type OpenTag<'a> = (String, Vec<(String, String)>, bool, &'a str);

fn parse_open_tag(input: &str, offset: usize) -> Result<OpenTag<'_>, MarkupLoadError> {
    let name_end = input
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-'))
        .unwrap_or(input.len());
    if name_end == 0 {
        return Err(malformed(offset, "missing tag name"));
    }
    let tag = input[..name_end].to_owned();
    let mut rest = &input[name_end..];
    let mut attributes = Vec::new();
    loop {
        rest = rest.trim_start();
        let position = offset + input.len() - rest.len();
        if let Some(after) = rest.strip_prefix("/>") {
            return Ok((tag, attributes, true, after));
        }
        if let Some(after) = rest.strip_prefix('>') {
            return Ok((tag, attributes, false, after));
        }
        let name_end = rest
            .find(|ch: char| ch == '=' || ch == '>' || ch == '/' || ch.is_whitespace())
            .ok_or_else(|| malformed(position, "unterminated tag"))?;
        if name_end == 0 {
            return Err(malformed(position, "unexpected character in tag"));
        }
        let name = rest[..name_end].to_owned();
        rest = &rest[name_end..];
        let value = match rest.strip_prefix("=\"") {
            Some(after) => {
                let end = after
                    .find('"')
                    .ok_or_else(|| malformed(position, "unterminated attribute value"))?;
                rest = &after[end + 1..];
                after[..end].to_owned()
            }
            None => String::new(),
        };
        attributes.push((name, value));
    }
}

fn apply_attribute<S: Surface>(
    surface: &mut S,
    id: SurfaceId,
    name: &str,
    value: &str,
) -> Result<(), SurfaceError> {
    match name {
        "class" => surface.set_class_name(id, value),
        "style" => {
            for declaration in value.split(';') {
                if let Some((property, declared)) = declaration.split_once(':') {
                    surface.set_style(id, property.trim(), declared.trim())?;
                }
            }
            Ok(())
        }
        _ => surface.set_attribute(id, name, value),
    }
}

fn malformed(offset: usize, message: &str) -> MarkupLoadError {
    MarkupLoadError::Malformed {
        offset,
        message: message.to_owned(),
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
