//! A render root: one container on a surface plus the tree mounted into it.

use std::collections::VecDeque;
use std::rc::Rc;

use ember_core::{Node, RenderConfig, Runtime, RuntimeScheduler, SurfaceId, UpdateStrategy};

use crate::error::{DomError, DomResult};
use crate::reconcile::Reconciler;
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountOptions {
    /// Adopt the container's existing content instead of clearing it.
    pub hydrate: bool,
}

impl MountOptions {
    pub fn hydrate() -> Self {
        Self { hydrate: true }
    }
}

/// Owns a surface container and keeps it in sync with a node tree.
///
/// State changes inside the tree only flag a render request on the root's
/// [`Runtime`]; call [`Root::flush`] to run queued effects and the renders
/// they request.
pub struct Root<S: Surface> {
    surface: S,
    container: SurfaceId,
    config: RenderConfig,
    runtime: Runtime,
    description: Option<Node>,
    tree: Option<Node>,
}

impl<S: Surface> Root<S> {
    pub fn new(surface: S, container: SurfaceId) -> Self {
        Self::with_config(surface, container, RenderConfig::default())
    }

    pub fn with_config(surface: S, container: SurfaceId, config: RenderConfig) -> Self {
        Self::with_runtime(surface, container, config, Runtime::default())
    }

    pub fn with_scheduler(
        surface: S,
        container: SurfaceId,
        config: RenderConfig,
        scheduler: Rc<dyn RuntimeScheduler>,
    ) -> Self {
        Self::with_runtime(surface, container, config, Runtime::new(scheduler))
    }

    /// Renders against an existing runtime, e.g. one driven by a host scheduler.
    pub fn with_runtime(
        surface: S,
        container: SurfaceId,
        config: RenderConfig,
        runtime: Runtime,
    ) -> Self {
        Self {
            surface,
            container,
            config,
            runtime,
            description: None,
            tree: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn container(&self) -> SurfaceId {
        self.container
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.tree.is_some()
    }

    /// The live tree from the last committed pass.
    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    /// Releases the surface, leaving its content in place. Instances are
    /// unmounted first so their cleanups run.
    pub fn into_surface(mut self) -> S {
        if let Some(mut tree) = self.tree.take() {
            tree.unmount_instances();
        }
        self.runtime.discard_effects();
        self.surface
    }

    /// Mounts `node` into the container, replacing whatever was mounted before.
    pub fn mount(&mut self, node: Node, options: MountOptions) -> DomResult<()> {
        if self.tree.is_some() {
            self.unmount()?;
        }
        log::debug!(
            "mounting {} into container {} (hydrate: {})",
            node.kind().describe(),
            self.container,
            options.hydrate
        );
        self.description = Some(node.clone());
        self.runtime.take_render_request();

        let mut tree = node;
        let result = if options.hydrate {
            self.hydrate_tree(&mut tree)
        } else {
            self.mount_tree(&mut tree)
        };
        match result {
            Ok(()) => {
                self.commit();
                self.tree = Some(tree);
                Ok(())
            }
            Err(err) => {
                self.runtime.discard_effects();
                tree.unmount_instances();
                self.description = None;
                log::error!("mount failed: {err}");
                Err(err)
            }
        }
    }

    /// Replaces the stored root description with `next` and reconciles.
    pub fn update(&mut self, next: Node) -> DomResult<()> {
        if self.tree.is_none() {
            return Err(DomError::NotMounted);
        }
        self.description = Some(next.clone());
        self.render(next)
    }

    /// Re-renders the stored root description.
    pub fn force_update(&mut self) -> DomResult<()> {
        let next = self.description.clone().ok_or(DomError::NotMounted)?;
        self.render(next)
    }

    /// Runs queued tasks and re-renders while renders are requested.
    /// Returns the number of render passes.
    pub fn flush(&mut self) -> DomResult<usize> {
        let mut passes = 0;
        loop {
            self.runtime.drain_tasks();
            if !self.runtime.needs_render() {
                return Ok(passes);
            }
            if self.tree.is_none() {
                self.runtime.take_render_request();
                return Ok(passes);
            }
            if passes >= self.config.max_flush_passes {
                self.runtime.take_render_request();
                log::error!("render loop did not settle after {passes} passes");
                return Err(DomError::UpdateDepthExceeded { passes });
            }
            passes += 1;
            self.force_update()?;
        }
    }

    /// Unmounts every instance and clears the container.
    pub fn unmount(&mut self) -> DomResult<()> {
        let Some(mut tree) = self.tree.take() else {
            return Ok(());
        };
        log::debug!("unmounting root in container {}", self.container);
        tree.unmount_instances();
        self.runtime.discard_effects();
        self.description = None;
        self.surface.clear_children(self.container)?;
        Ok(())
    }

    fn render(&mut self, next: Node) -> DomResult<()> {
        let old = self.tree.take().ok_or(DomError::NotMounted)?;
        self.runtime.take_render_request();
        let fresh = self.config.update_strategy == UpdateStrategy::Repaint;

        let mut tree = next;
        let result = self.reconcile_tree(old, &mut tree, fresh);
        // Keep whatever became live so a later pass or unmount can reach it.
        self.tree = Some(tree);
        match result {
            Ok(()) => {
                self.commit();
                Ok(())
            }
            Err(err) => {
                self.runtime.discard_effects();
                log::error!("render pass failed: {err}");
                Err(err)
            }
        }
    }

    fn commit(&self) {
        let effects = self.runtime.commit_effects();
        log::trace!("render pass committed, {effects} effects queued");
    }

    fn mount_tree(&mut self, tree: &mut Node) -> DomResult<()> {
        let container = self.container;
        self.surface.clear_children(container)?;
        let mut reconciler =
            Reconciler::new(&mut self.surface, &self.config, self.runtime.handle(), false);
        reconciler.mount_node(tree)?;
        reconciler.sync_children(container, &tree.surface_handles())
    }

    fn reconcile_tree(&mut self, old: Node, tree: &mut Node, fresh: bool) -> DomResult<()> {
        let container = self.container;
        if fresh {
            self.surface.clear_children(container)?;
        }
        let mut reconciler =
            Reconciler::new(&mut self.surface, &self.config, self.runtime.handle(), fresh);
        reconciler.reconcile(old, tree)?;
        reconciler.sync_children(container, &tree.surface_handles())
    }

    fn hydrate_tree(&mut self, tree: &mut Node) -> DomResult<()> {
        let container = self.container;
        let attempt = {
            let mut reconciler =
                Reconciler::new(&mut self.surface, &self.config, self.runtime.handle(), false);
            let mut cursor: VecDeque<SurfaceId> = reconciler.surface.children(container)?.into();
            reconciler.hydrate_node(tree, container, &mut cursor).and_then(|()| {
                for extra in cursor {
                    reconciler.surface.remove_child(container, extra)?;
                }
                Ok(())
            })
        };
        match attempt {
            Err(DomError::HydrationMismatch { expected, found }) => {
                log::warn!("hydration mismatch (expected {expected}, found {found}); mounting fresh");
                tree.unmount_instances();
                self.runtime.discard_effects();
                *tree = tree.clone();
                self.mount_tree(tree)
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "tests/root_tests.rs"]
mod tests;
