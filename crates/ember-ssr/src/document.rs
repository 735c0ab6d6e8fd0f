//! The HTML document server markup is embedded in.

use std::fmt::Write;

use ember_core::DocumentConfig;
use serde_json::Value;

use crate::error::SsrResult;
use crate::escape::escape_html;

/// Wraps rendered markup in a full document and ships the initial state
/// as `<script>window.<global> = <json>;</script>`.
#[derive(Clone, Debug, Default)]
pub struct DocumentTemplate {
    config: DocumentConfig,
    head: Vec<String>,
    body: Vec<String>,
}

impl DocumentTemplate {
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            head: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Extra raw markup appended to `<head>`.
    pub fn with_head(mut self, tag: impl Into<String>) -> Self {
        self.head.push(tag.into());
        self
    }

    /// Extra raw markup appended to `<body>` after the state script.
    pub fn with_body(mut self, tag: impl Into<String>) -> Self {
        self.body.push(tag.into());
        self
    }

    pub fn render(&self, html: &str, initial_state: Option<&Value>) -> SsrResult<String> {
        let config = &self.config;
        let mut out = String::with_capacity(html.len() + 512);
        let _ = writeln!(out, "<!DOCTYPE html>");
        let _ = writeln!(out, "<html lang=\"{}\">", escape_html(&config.lang));
        let _ = writeln!(out, "<head>");
        let _ = writeln!(out, "    <meta charset=\"UTF-8\">");
        let _ = writeln!(
            out,
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        );
        let _ = writeln!(out, "    <title>{}</title>", escape_html(&config.title));
        for tag in &self.head {
            let _ = writeln!(out, "    {tag}");
        }
        let _ = writeln!(out, "</head>");
        let _ = writeln!(out, "<body>");
        let _ = writeln!(out, "    <div id=\"{}\">{html}</div>", escape_html(&config.root_id));
        if let Some(state) = initial_state {
            let _ = writeln!(
                out,
                "    <script>window.{} = {};</script>",
                config.state_global,
                script_safe_json(state)?
            );
        }
        for tag in &self.body {
            let _ = writeln!(out, "    {tag}");
        }
        let _ = write!(out, "</body>\n</html>");
        Ok(out)
    }
}

/// JSON that cannot close the surrounding `<script>` element early.
fn script_safe_json(value: &Value) -> SsrResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Reads back the state blob written by [`DocumentTemplate::render`].
/// Returns `Ok(None)` when the document carries no blob for `global`.
pub fn extract_initial_state(document: &str, global: &str) -> SsrResult<Option<Value>> {
    let marker = format!("window.{global} = ");
    let Some(start) = document.find(&marker) else {
        return Ok(None);
    };
    let rest = &document[start + marker.len()..];
    let end = rest.find("</script>").unwrap_or(rest.len());
    let json = rest[..end].trim_end().trim_end_matches(';');
    Ok(Some(serde_json::from_str(json)?))
}

/// The markup inside the root element, as written by [`DocumentTemplate::render`].
pub fn extract_root_markup<'a>(document: &'a str, root_id: &str) -> Option<&'a str> {
    let open = format!("<div id=\"{root_id}\">");
    let start = document.find(&open)? + open.len();
    let end = document[start..].find("</div>\n")?;
    Some(&document[start..start + end])
}

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
