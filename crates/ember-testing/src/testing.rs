use ember_core::{Node, RenderConfig, Runtime, SurfaceId};
use ember_dom::{DomError, MemorySurface, MountOptions, Root, Surface};
use thiserror::Error;

use crate::loader::{load_markup, MarkupLoadError};

#[derive(Debug, Error)]
pub enum TestError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Markup(#[from] MarkupLoadError),
    #[error("no element matches {0}")]
    NoMatch(String),
}

pub type TestResult<T> = Result<T, TestError>;

/// Headless harness around a [`Root`] on a [`MemorySurface`].
///
/// Interactions (`click*`) pump the root until idle afterwards, so state
/// changes are visible in [`TestRoot::markup`] right away.
pub struct TestRoot {
    root: Root<MemorySurface>,
    has_content: bool,
}

impl TestRoot {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        let mut surface = MemorySurface::with_config(config.clone());
        let container = surface.create_element("div");
        Self {
            root: Root::with_config(surface, container, config),
            has_content: false,
        }
    }

    /// Mounts `node` and runs its first effects.
    pub fn set_content(&mut self, node: Node) -> TestResult<()> {
        self.root.mount(node, MountOptions::default())?;
        self.has_content = true;
        self.pump_until_idle()?;
        Ok(())
    }

    /// Loads `server_markup` into the container, then hydrates `node` over it.
    pub fn hydrate(&mut self, server_markup: &str, node: Node) -> TestResult<()> {
        let container = self.root.container();
        let config = self.root.config().clone();
        load_markup(self.root.surface_mut(), container, server_markup, &config)?;
        self.root.mount(node, MountOptions::hydrate())?;
        self.has_content = true;
        self.pump_until_idle()?;
        Ok(())
    }

    pub fn update(&mut self, node: Node) -> TestResult<()> {
        self.root.update(node)?;
        self.pump_until_idle()?;
        Ok(())
    }

    /// Runs queued effects and requested renders. Returns the number of render passes.
    pub fn pump_until_idle(&mut self) -> TestResult<usize> {
        Ok(self.root.flush()?)
    }

    /// Dispatches a click and pumps. Returns `false` when a handler prevented the default.
    pub fn click(&mut self, target: SurfaceId) -> TestResult<bool> {
        let default_allowed = self.root.surface().click(target);
        self.pump_until_idle()?;
        Ok(default_allowed)
    }

    pub fn click_tag(&mut self, tag: &str) -> TestResult<bool> {
        let target = self
            .find_by_tag(tag)
            .ok_or_else(|| TestError::NoMatch(format!("<{tag}>")))?;
        self.click(target)
    }

    pub fn click_attribute(&mut self, name: &str, value: &str) -> TestResult<bool> {
        let target = self
            .find_by_attribute(name, value)
            .ok_or_else(|| TestError::NoMatch(format!("[{name}=\"{value}\"]")))?;
        self.click(target)
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<SurfaceId> {
        self.root.surface().find_by_tag(self.container(), tag)
    }

    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<SurfaceId> {
        self.root
            .surface()
            .find_by_attribute(self.container(), name, value)
    }

    /// Markup of everything inside the container.
    pub fn markup(&self) -> String {
        self.root.surface().inner_markup(self.container())
    }

    pub fn text(&self) -> String {
        self.root.surface().text_content(self.container())
    }

    pub fn text_of(&self, id: SurfaceId) -> String {
        self.root.surface().text_content(id)
    }

    pub fn dump_tree(&self) -> String {
        self.root.surface().dump_tree(self.container())
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn container(&self) -> SurfaceId {
        self.root.container()
    }

    pub fn surface(&self) -> &MemorySurface {
        self.root.surface()
    }

    pub fn runtime(&self) -> &Runtime {
        self.root.runtime()
    }

    pub fn root(&mut self) -> &mut Root<MemorySurface> {
        &mut self.root
    }

    pub fn unmount(&mut self) -> TestResult<()> {
        self.root.unmount()?;
        self.has_content = false;
        Ok(())
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a [`TestRoot`].
pub fn run_test_root<R>(f: impl FnOnce(&mut TestRoot) -> R) -> R {
    let mut root = TestRoot::new();
    f(&mut root)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
