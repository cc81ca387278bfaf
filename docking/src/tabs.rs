//! Tab groups
//!
//! A tab group is hosted by a synthetic pane created by the engine. The host
//! occupies a single slot in its container's layout and the tabbed panes are
//! handed to it through [`DockSubstrate::set_tab_host`]. Tab groups never
//! nest: tabbing onto a tabbed pane redirects to its host, and dropping a
//! whole group moves its tabs one by one.

use crate::manager::DockManager;
use crate::pane::{ContainerId, Orientation, PaneGrab, PaneId};
use crate::substrate::DockSubstrate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ordered tabs of a group and the active one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabGroup {
    pub tabs: Vec<PaneId>,
    pub active: usize,
}

impl TabGroup {
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn contains(&self, pane: &PaneId) -> bool {
        self.tabs.contains(pane)
    }

    pub fn active_tab(&self) -> Option<&PaneId> {
        self.tabs.get(self.active)
    }

    /// Remove a tab, keeping the active index on the same pane when possible
    fn remove(&mut self, pane: &PaneId) -> bool {
        let Some(index) = self.tabs.iter().position(|tab| tab == pane) else {
            return false;
        };
        self.tabs.remove(index);
        if index < self.active {
            self.active -= 1;
        }
        if self.active >= self.tabs.len() {
            self.active = self.tabs.len().saturating_sub(1);
        }
        true
    }
}

impl<S: DockSubstrate> DockManager<S> {
    /// Tab `dropped` together with `target`
    ///
    /// Returns the host of the resulting group, or `None` if `dropped` is
    /// already part of it.
    pub fn tabify(&mut self, target: &PaneId, dropped: &PaneId, dropped_grab: Option<&PaneGrab>) -> Option<PaneId> {
        if target == dropped {
            return None;
        }
        if let Some(host) = self.tab_of(target).cloned() {
            return self.tabify(&host, dropped, dropped_grab);
        }

        self.with_bulk_update(|manager| manager.tabify_untabbed(target, dropped, dropped_grab))
    }

    fn tabify_untabbed(&mut self, target: &PaneId, dropped: &PaneId, dropped_grab: Option<&PaneGrab>) -> Option<PaneId> {
        let existing = self.tab_groups.get(target);

        // Remember the size of a lone pane so it can be torn off again later
        let save_grab_name = match existing {
            None => Some(target.clone()),
            Some(group) if group.len() == 1 => group.tabs.first().cloned(),
            Some(_) => None,
        };
        if existing.is_some_and(|group| group.contains(dropped)) {
            return None;
        }

        if let Some(name) = save_grab_name {
            if !self.last_floating.contains_key(&name) {
                if let Some(grab) = self.substrate.grab_pane(target) {
                    self.last_floating.insert(name, grab);
                }
            }
        }

        let host = if self.tab_groups.contains_key(target) {
            target.clone()
        } else {
            let Some(container) = self.substrate.pane_container(target) else {
                warn!(pane = %target, "Tab target isn't docked in a container");
                return None;
            };
            self.create_tab_group(&container, Some(target), None)
        };

        // A pane tabbed before keeps the size it had before that
        if !self.last_floating.contains_key(dropped) {
            if let Some(grab) = dropped_grab {
                self.last_floating.insert(dropped.clone(), grab.clone());
            }
        }

        let new_active = if let Some(old_group) = self.tab_groups.get(dropped).cloned() {
            // A whole group was dropped: move its tabs instead of nesting it
            let base = self.tab_groups.get(&host).map_or(0, TabGroup::len);
            for tab in &old_group.tabs {
                self.last_tab_group.remove(tab);
                self.untabify(tab);
                self.add_tab(&host, tab);
            }
            base + old_group.active
        } else {
            // A tab of another group leaves it first
            if self.tab_of(dropped).is_some_and(|old_host| *old_host != host) {
                self.last_tab_group.remove(dropped);
                self.untabify(dropped);
            }
            self.add_tab(&host, dropped)
        };

        self.set_active_tab(&host, new_active);
        debug!(host = %host, pane = %dropped, "Tabified pane");
        Some(host)
    }

    /// Create an empty tab group host in `container`
    ///
    /// With `replace` the host takes that pane's slot and the pane becomes its
    /// first tab.
    pub(crate) fn create_tab_group(
        &mut self,
        container: &ContainerId,
        replace: Option<&PaneId>,
        name: Option<PaneId>,
    ) -> PaneId {
        let host = name.unwrap_or_else(|| PaneId::new(self.unique_name("TabContainer")));
        self.substrate.create_pane(&host, "");
        self.tab_groups.insert(host.clone(), TabGroup::default());

        match replace {
            Some(pane) => {
                // The layout can't swap a pane in place: split next to it and
                // move it into the group
                self.split_panes(pane, &host, Orientation::Horizontal);
                self.add_tab(&host, pane);
            }
            None => {
                self.substrate.add_pane(container, &host, crate::pane::DockArea::Left);
            }
        }

        debug!(host = %host, container = %container, "Created tab group");
        host
    }

    /// Append a tab and remember the group for later restores
    pub(crate) fn add_tab(&mut self, host: &PaneId, pane: &PaneId) -> usize {
        let Some(group) = self.tab_groups.get_mut(host) else {
            return 0;
        };
        group.tabs.push(pane.clone());
        let index = group.tabs.len() - 1;

        self.substrate.set_tab_host(pane, Some(host));
        self.substrate.set_pane_visible(pane, true);
        self.last_tab_group.insert(pane.clone(), host.clone());
        index
    }

    pub(crate) fn set_active_tab(&mut self, host: &PaneId, index: usize) {
        let Some(group) = self.tab_groups.get_mut(host) else {
            return;
        };
        if group.tabs.is_empty() {
            return;
        }
        group.active = index.min(group.tabs.len() - 1);
        let pane = group.tabs[group.active].clone();
        self.substrate.set_active_tab(host, &pane);
    }

    /// Take a pane out of its tab group, destroying the group once empty
    pub fn untabify(&mut self, pane: &PaneId) -> bool {
        let Some(host) = self.tab_of(pane).cloned() else {
            return false;
        };
        let Some(group) = self.tab_groups.get_mut(&host) else {
            return false;
        };
        group.remove(pane);
        let remaining = group.len();
        let active = group.active;
        self.substrate.set_tab_host(pane, None);
        debug!(host = %host, pane = %pane, remaining, "Untabified pane");

        if remaining == 0 {
            self.destroy_tab_host(&host);
        } else {
            self.set_active_tab(&host, active);
        }
        true
    }

    /// Destroy an empty tab group host and clean up its floating container
    fn destroy_tab_host(&mut self, host: &PaneId) {
        let container = self.substrate.pane_container(host);
        self.tab_groups.remove(host);
        self.substrate.destroy_pane(host);

        if let Some(container) = container {
            if container != self.substrate.primary_container() {
                self.destroy_if_useless(&container);
            }
        }
    }

    /// Split `dropped` next to `target` and share the space evenly
    pub(crate) fn split_panes(&mut self, target: &PaneId, dropped: &PaneId, orientation: Orientation) {
        let Some(target_rect) = self.substrate.pane_geometry(target) else {
            return;
        };
        let split = match orientation {
            Orientation::Horizontal => target_rect.width / 2,
            Orientation::Vertical => target_rect.height / 2,
        };

        // Re-docking a pane that is still in the layout could leave a stale copy behind
        self.substrate.remove_pane(dropped);
        self.substrate.split_pane(target, dropped, orientation);
        self.substrate.set_pane_visible(dropped, true);
        self.substrate
            .resize_panes(&[target.clone(), dropped.clone()], &[split, split], orientation);
    }
}
