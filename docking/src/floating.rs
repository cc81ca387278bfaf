//! Floating container lifecycle
//!
//! Floating containers are created when a pane is floated and destroyed as
//! soon as they no longer hold a visible pane. Their native state and
//! geometry are cached on destruction so a pane reopened later lands in an
//! equivalent window.

use crate::geometry::Rect;
use crate::manager::{DockManager, RestoreFloating};
use crate::pane::{ContainerId, DockArea, PaneId, TitleBarButtons, TitleBarDrawMode, TitleBarOwner};
use crate::substrate::DockSubstrate;
use tracing::{debug, info, warn};

impl<S: DockSubstrate> DockManager<S> {
    /// Visible direct children of a container
    pub(crate) fn visible_panes(&self, container: &ContainerId) -> Vec<PaneId> {
        self.substrate
            .container_panes(container)
            .into_iter()
            .filter(|pane| self.substrate.is_pane_visible(pane))
            .collect()
    }

    /// The pane is the only visible content of a floating container
    pub fn is_single_floating_child(&self, pane: &PaneId) -> bool {
        let Some(container) = self.substrate.pane_container(pane) else {
            return false;
        };
        if !self.is_floating(&container) {
            return false;
        }
        let visible = self.visible_panes(&container);
        visible.len() == 1 && visible[0] == *pane
    }

    /// Float a pane with the given frame geometry
    ///
    /// A pane that already is the sole occupant of a floating container just
    /// moves that container.
    pub fn make_floating(&mut self, pane: &PaneId, rect: Rect) {
        if self.is_single_floating_child(pane) {
            if let Some(container) = self.substrate.pane_container(pane) {
                self.substrate.set_frame_geometry(&container, rect);
                self.substrate.raise_container(&container);
                self.floating_order.raise(&container);
                debug!(pane = %pane, container = %container, "Moved floating container");
                return;
            }
        }

        self.with_bulk_update(|manager| {
            let container = ContainerId::new(manager.unique_name("FloatingWindow"));
            manager.create_floating_container(&container, rect);
            manager.substrate.remove_pane(pane);
            manager.substrate.add_pane(&container, pane, DockArea::Left);
            manager.substrate.set_pane_visible(pane, true);
        });
    }

    /// Create a floating container window on top of the stacking order
    pub(crate) fn create_floating_container(&mut self, container: &ContainerId, rect: Rect) {
        self.substrate.create_floating_container(container, rect);
        self.floating_order.raise(container);

        // Floating windows stay above the primary window
        let primary = self.substrate.primary_container();
        if let (Some(window), Some(parent)) = (
            self.substrate.container_window(container),
            self.substrate.container_window(&primary),
        ) {
            self.substrate.set_transient_parent(window, Some(parent));
        }
        info!(container = %container, rect = ?rect, "Created floating container");
    }

    /// Destroy a floating container that no longer shows any pane
    pub fn destroy_if_useless(&mut self, container: &ContainerId) {
        if self.bulk_update || !self.is_floating(container) {
            return;
        }
        let panes = self.substrate.container_panes(container);
        if panes.iter().any(|pane| self.substrate.is_pane_visible(pane)) {
            return;
        }

        let geometry = self.substrate.frame_geometry(container).unwrap_or_default();
        let state = self.substrate.save_container_state(container);
        self.restore_floatings
            .insert(container.clone(), RestoreFloating { state, geometry });

        // Hidden panes survive in the primary container
        let primary = self.substrate.primary_container();
        for pane in &panes {
            self.substrate.set_pane_parent(pane, &primary);
        }

        self.floating_order.remove(container);

        // Windows stacked above this one keep their place above its parent
        if let Some(window) = self.substrate.container_window(container) {
            let parent = self.substrate.transient_parent(window);
            for child in self.substrate.transient_children(window) {
                self.substrate.set_transient_parent(child, parent);
            }
        }

        self.substrate.destroy_container(container);
        info!(container = %container, hidden = panes.len(), "Destroyed empty floating container");
    }

    /// Put the window controls on the single visible child, or on the
    /// container when it holds several panes
    pub(crate) fn update_title_bars(&mut self, container: &ContainerId) {
        if !self.substrate.container_exists(container) {
            return;
        }
        let panes = self.substrate.container_panes(container);

        if *container == self.substrate.primary_container() {
            for pane in &panes {
                set_controls(&mut self.substrate, &TitleBarOwner::Pane(pane.clone()), false);
            }
            return;
        }

        let visible = self.visible_panes(container);
        let owner = TitleBarOwner::Container(container.clone());
        if visible.len() == 1 {
            set_controls(&mut self.substrate, &TitleBarOwner::Pane(visible[0].clone()), true);
            if let Some(title_bar) = self.substrate.title_bar(&owner) {
                title_bar.set_draw_mode(TitleBarDrawMode::Hidden);
            }
        } else {
            for pane in &panes {
                set_controls(&mut self.substrate, &TitleBarOwner::Pane(pane.clone()), false);
            }
            set_controls(&mut self.substrate, &owner, true);
            if let Some(title_bar) = self.substrate.title_bar(&owner) {
                title_bar.set_draw_mode(TitleBarDrawMode::Simple);
            }
        }
    }

    /// Title a floating window after its top-left visible pane
    pub(crate) fn update_floating_title(&mut self, container: &ContainerId) {
        if !self.is_floating(container) {
            return;
        }
        let top_left = self
            .visible_panes(container)
            .into_iter()
            .filter_map(|pane| {
                let rect = self.substrate.pane_geometry(&pane)?;
                Some((rect.y, rect.x, pane))
            })
            .min()
            .map(|(_, _, pane)| pane);
        let Some(pane) = top_left else {
            return;
        };

        let titled = self
            .tab_groups
            .get(&pane)
            .and_then(|group| group.active_tab().cloned())
            .unwrap_or(pane);
        let title = self.substrate.pane_title(&titled);
        self.substrate.set_container_title(container, &title);
    }

    /// Let the container's title bar move the window, or start a dock drag
    pub(crate) fn update_drag_or_dock(&mut self, container: &ContainerId) {
        if !self.is_floating(container) {
            return;
        }
        let drags_window = self.container_drags_window(container);
        if let Some(title_bar) = self.substrate.title_bar(&TitleBarOwner::Container(container.clone())) {
            title_bar.set_drag_enabled(drags_window);
        }
    }

    /// Dragging the title bar moves the window instead of docking its content
    pub(crate) fn container_drags_window(&self, container: &ContainerId) -> bool {
        match self.visible_panes(container).as_slice() {
            [single] => self.substrate.pane_allowed_areas(single).is_floating_only(),
            _ => true,
        }
    }

    /// Close every visible pane of a floating container
    ///
    /// Returns `false` if a pane refused to close; the panes closed before it
    /// stay closed.
    pub fn close_floating_container(&mut self, container: &ContainerId) -> bool {
        if !self.is_floating(container) {
            return false;
        }
        for pane in self.visible_panes(container) {
            if !self.substrate.close_pane(&pane) {
                warn!(pane = %pane, container = %container, "Pane refused to close");
                return false;
            }
        }
        self.defer(crate::manager::Deferred::DestroyIfUseless(container.clone()));
        true
    }
}

fn set_controls<S: DockSubstrate>(substrate: &mut S, owner: &TitleBarOwner, showing: bool) {
    let Some(title_bar) = substrate.title_bar(owner) else {
        return;
    };
    if showing {
        title_bar.set_buttons(TitleBarButtons::all());
    } else {
        title_bar.set_buttons(TitleBarButtons::empty());
    }
    title_bar.set_is_showing_window_controls(showing);
}
