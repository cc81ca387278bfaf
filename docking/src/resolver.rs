//! Drop target lookup
//!
//! Floating containers are searched front to back using the engine's own
//! stacking order, then the panes of the primary container, and finally the
//! primary container itself.

use crate::geometry::Point;
use crate::manager::DockManager;
use crate::pane::{ContainerId, DropTarget, PaneId};
use crate::substrate::DockSubstrate;

impl<S: DockSubstrate> DockManager<S> {
    /// Topmost drop target under the pointer
    ///
    /// `exclude` is the pane being dragged. Hovering it yields its container
    /// so the container's absolute zones can still be offered.
    pub(crate) fn drop_target_under_cursor(&self, global: Point, exclude: &PaneId) -> Option<DropTarget> {
        let primary = self.substrate.primary_container();

        // The floating container of the current target keeps precedence while
        // the pointer stays on it
        let mut current_floating: Option<ContainerId> = None;
        match self.drop_zones.target() {
            Some(DropTarget::Pane(pane)) => {
                if let Some(container) = self.substrate.pane_container(pane) {
                    if container != primary {
                        if pane != exclude
                            && self
                                .substrate
                                .pane_geometry(pane)
                                .is_some_and(|rect| rect.contains(global))
                        {
                            return Some(DropTarget::Pane(pane.clone()));
                        }
                        current_floating = Some(container);
                    }
                }
            }
            Some(DropTarget::Container(container)) if *container != primary => {
                current_floating = Some(container.clone());
            }
            _ => {}
        }

        let mut floating_targets: Vec<DropTarget> = Vec::new();
        for container in self.floating_order.iter() {
            if !self.substrate.container_exists(container)
                || !self.substrate.is_container_visible(container)
                || self.substrate.is_container_minimized(container)
            {
                continue;
            }

            let is_current = current_floating.as_ref() == Some(container);
            if is_current {
                floating_targets.insert(0, DropTarget::Container(container.clone()));
            }

            // A floating-only pane makes its whole container undockable
            let mut dockable = true;
            for pane in self.substrate.container_panes(container) {
                if self.substrate.pane_allowed_areas(&pane).is_floating_only() {
                    dockable = false;
                    continue;
                }
                if is_current {
                    floating_targets.insert(0, DropTarget::Pane(pane));
                } else {
                    floating_targets.push(DropTarget::Pane(pane));
                }
            }

            if dockable && !is_current {
                floating_targets.push(DropTarget::Container(container.clone()));
            }
        }

        let primary_minimized = self.substrate.is_container_minimized(&primary);
        let primary_targets = if primary_minimized {
            Vec::new()
        } else {
            self.substrate
                .container_panes(&primary)
                .into_iter()
                .map(DropTarget::Pane)
                .collect()
        };

        for candidate in floating_targets.iter().chain(primary_targets.iter()) {
            if let Some(target) = self.target_for(candidate, global, exclude) {
                return Some(target);
            }
        }

        let in_primary = self
            .substrate
            .container_geometry(&primary)
            .is_some_and(|rect| rect.contains(global));
        if in_primary && !primary_minimized {
            return Some(DropTarget::Container(primary));
        }
        None
    }

    fn target_for(&self, candidate: &DropTarget, global: Point, exclude: &PaneId) -> Option<DropTarget> {
        match candidate {
            DropTarget::Pane(pane) => {
                if !self.substrate.is_pane_visible(pane) {
                    return None;
                }
                let rect = self.substrate.pane_geometry(pane)?;
                if !rect.contains(global) {
                    return None;
                }
                if pane == exclude {
                    return self.substrate.pane_container(pane).map(DropTarget::Container);
                }
                Some(candidate.clone())
            }
            DropTarget::Container(container) => {
                let rect = self.substrate.container_geometry(container)?;
                rect.contains(global).then(|| candidate.clone())
            }
        }
    }
}
