//! Render configuration shared by the interactive and markup renderers.
//!
//! Every field has a default so sparse TOML files work; loading from disk
//! lives in `ember-runtime-std`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_EVENT_PREFIX: &str = "on";
pub const DEFAULT_MAX_FLUSH_PASSES: usize = 50;

const DEFAULT_VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// How a root applies a re-render triggered by a state change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStrategy {
    /// Reconcile the new tree against the live surface.
    #[default]
    Patch,
    /// Clear the container and rebuild every surface node, keeping component state.
    Repaint,
}

impl std::str::FromStr for UpdateStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(UpdateStrategy::Patch),
            "repaint" => Ok(UpdateStrategy::Repaint),
            other => Err(format!("unknown update strategy `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub title: String,
    pub lang: String,
    /// Id of the element the markup is embedded in and later hydrated from.
    pub root_id: String,
    /// Global the initial-state blob is assigned to.
    pub state_global: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "Ember App".to_owned(),
            lang: "en".to_owned(),
            root_id: "root".to_owned(),
            state_global: "__INITIAL_STATE__".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub event_prefix: String,
    pub void_elements: Vec<String>,
    pub update_strategy: UpdateStrategy,
    /// Upper bound on render passes a single `flush` may run before giving up.
    pub max_flush_passes: usize,
    pub document: DocumentConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            event_prefix: DEFAULT_EVENT_PREFIX.to_owned(),
            void_elements: DEFAULT_VOID_ELEMENTS.iter().map(|tag| (*tag).to_owned()).collect(),
            update_strategy: UpdateStrategy::default(),
            max_flush_passes: DEFAULT_MAX_FLUSH_PASSES,
            document: DocumentConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn is_void_element(&self, tag: &str) -> bool {
        self.void_elements
            .iter()
            .any(|void| void.eq_ignore_ascii_case(tag))
    }

    pub fn with_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }
}
