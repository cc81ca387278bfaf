//! Layout persistence
//!
//! The layout is stored as a versioned JSON document holding the native
//! state of every container plus the bookkeeping the substrate doesn't know
//! about: floating children, tab groups and the maps used to reopen panes
//! where they were last seen.

use crate::error::{DockError, DockResult};
use crate::geometry::Rect;
use crate::manager::{Deferred, DockManager, RestoreFloating};
use crate::pane::{ContainerId, DockArea, PaneId};
use crate::substrate::DockSubstrate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Format version of [`PersistedLayout`]; bump on incompatible changes
pub const LAYOUT_VERSION: u32 = 3;

/// A floating container and the panes it held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingEntry {
    pub name: ContainerId,
    pub panes: Vec<PaneId>,
    pub state: Vec<u8>,
    pub geometry: Rect,
}

/// A tab group, hosted by the primary container when `floating_container` is `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabGroupEntry {
    pub host: PaneId,
    pub floating_container: Option<ContainerId>,
    pub tabs: Vec<PaneId>,
    pub active: usize,
}

/// Versioned snapshot of the whole docking arrangement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedLayout {
    pub version: u32,
    pub primary_state: Vec<u8>,
    /// Back to front, so restoring them in order rebuilds the stacking
    pub floating: Vec<FloatingEntry>,
    pub placeholders: BTreeMap<PaneId, ContainerId>,
    pub restore_floatings: BTreeMap<ContainerId, RestoreFloating>,
    pub last_tab_groups: BTreeMap<PaneId, PaneId>,
    pub tab_groups: Vec<TabGroupEntry>,
}

/// Read before the full document so other versions fail cleanly
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl PersistedLayout {
    pub fn to_bytes(&self) -> DockResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a layout blob, checking the version first
    pub fn from_bytes(data: &[u8]) -> DockResult<Self> {
        if data.is_empty() {
            return Err(DockError::EmptyLayout);
        }
        let probe: VersionProbe = serde_json::from_slice(data)?;
        if probe.version != LAYOUT_VERSION {
            return Err(DockError::VersionMismatch {
                expected: LAYOUT_VERSION,
                found: probe.version,
            });
        }
        Ok(serde_json::from_slice(data)?)
    }
}

impl<S: DockSubstrate> DockManager<S> {
    /// Snapshot the current layout
    pub fn layout_snapshot(&self) -> PersistedLayout {
        let primary = self.substrate.primary_container();

        let floating = self
            .floating_order
            .iter()
            .rev()
            .filter(|container| self.substrate.container_exists(container))
            .filter_map(|container| {
                let panes = self.substrate.container_panes(container);
                if !panes.is_empty() && panes.iter().all(|pane| self.no_autosave.contains(pane)) {
                    debug!(container = %container, "Skipping container excluded from autosave");
                    return None;
                }
                Some(FloatingEntry {
                    name: container.clone(),
                    panes,
                    state: self.substrate.save_container_state(container),
                    geometry: self.substrate.frame_geometry(container).unwrap_or_default(),
                })
            })
            .collect();

        let tab_groups = self
            .tab_groups
            .iter()
            .filter_map(|(host, group)| {
                let container = self.substrate.pane_container(host)?;
                Some(TabGroupEntry {
                    host: host.clone(),
                    floating_container: (container != primary).then_some(container),
                    tabs: group.tabs.clone(),
                    active: group.active,
                })
            })
            .collect();

        PersistedLayout {
            version: LAYOUT_VERSION,
            primary_state: self.substrate.save_container_state(&primary),
            floating,
            placeholders: self.placeholders.clone(),
            restore_floatings: self.restore_floatings.clone(),
            last_tab_groups: self.last_tab_group.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            tab_groups,
        }
    }

    /// Serialize the current layout; empty on failure
    pub fn save_state(&self) -> Vec<u8> {
        match self.layout_snapshot().to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize docking layout: {}", e);
                Vec::new()
            }
        }
    }

    /// Restore a layout produced by [`save_state`](Self::save_state)
    ///
    /// `Err` means nothing was touched. `Ok(false)` means the layout was
    /// applied but some container's native state could not be restored.
    pub fn try_restore_state(&mut self, data: &[u8]) -> DockResult<bool> {
        if self.session.as_ref().is_some_and(|session| session.committing) {
            return Err(DockError::Reentrant);
        }
        let layout = PersistedLayout::from_bytes(data)?;
        let primary = self.substrate.primary_container();
        if let Some(entry) = layout.floating.iter().find(|entry| entry.name == primary) {
            return Err(DockError::Structural(format!(
                "floating entry {} names the primary container",
                entry.name
            )));
        }

        if self.session.is_some() {
            self.clear_dragging_state();
        }

        let success = self.with_bulk_update(|manager| manager.apply_layout(layout));

        self.update_title_bars(&primary);
        for container in self.floating_order.iter().cloned().collect::<Vec<_>>() {
            self.defer(Deferred::UpdateTitleBars(container.clone()));
            self.defer(Deferred::UpdateFloatingTitle(container.clone()));
            self.defer(Deferred::UpdateDragOrDock(container.clone()));
            self.defer(Deferred::DestroyIfUseless(container));
        }

        info!(success, floating = self.floating_order.len(), tab_groups = self.tab_groups.len(), "Restored docking layout");
        Ok(success)
    }

    /// Boolean form of [`try_restore_state`](Self::try_restore_state)
    pub fn restore_state(&mut self, data: &[u8]) -> bool {
        match self.try_restore_state(data) {
            Ok(success) => success,
            Err(e) => {
                warn!("Failed to restore docking layout: {}", e);
                false
            }
        }
    }

    fn apply_layout(&mut self, layout: PersistedLayout) -> bool {
        let primary = self.substrate.primary_container();
        self.clear_layout(&primary);

        self.placeholders = layout.placeholders;
        self.restore_floatings = layout.restore_floatings;
        self.last_tab_group = layout.last_tab_groups.into_iter().collect();

        let surviving_hosts: HashSet<PaneId> = layout
            .tab_groups
            .iter()
            .filter(|entry| entry.tabs.iter().any(|tab| self.substrate.pane_exists(tab)))
            .map(|entry| entry.host.clone())
            .collect();

        let mut created = Vec::new();
        for entry in &layout.floating {
            let panes: Vec<PaneId> = entry
                .panes
                .iter()
                .filter(|pane| !surviving_hosts.contains(*pane) && self.substrate.pane_exists(pane))
                .cloned()
                .collect();
            let hosts = entry.panes.iter().filter(|pane| surviving_hosts.contains(*pane)).count();
            if panes.is_empty() && hosts == 0 {
                debug!(container = %entry.name, "No surviving panes, not recreating floating container");
                continue;
            }

            self.create_floating_container(&entry.name, entry.geometry);
            for pane in &panes {
                self.substrate.remove_pane(pane);
                self.substrate.add_pane(&entry.name, pane, DockArea::Left);
            }
            created.push(entry);
        }

        for entry in &layout.tab_groups {
            if !surviving_hosts.contains(&entry.host) {
                continue;
            }
            let container = entry
                .floating_container
                .clone()
                .filter(|container| self.substrate.container_exists(container))
                .unwrap_or_else(|| primary.clone());
            let host = self.create_tab_group(&container, None, Some(entry.host.clone()));

            let active_pane = entry.tabs.get(entry.active);
            let mut active = 0;
            let surviving: Vec<PaneId> = entry
                .tabs
                .iter()
                .filter(|tab| self.substrate.pane_exists(tab))
                .cloned()
                .collect();
            for tab in &surviving {
                self.substrate.remove_pane(tab);
                let index = self.add_tab(&host, tab);
                if Some(tab) == active_pane {
                    active = index;
                }
            }
            self.set_active_tab(&host, active);
        }

        // Native states last so the recreated tab groups fill their slots
        let mut success = true;
        if !layout.primary_state.is_empty() && !self.substrate.restore_container_state(&primary, &layout.primary_state) {
            warn!("Failed to restore the primary container state");
            success = false;
        }
        for entry in created {
            if !self.substrate.restore_container_state(&entry.name, &entry.state) {
                warn!(container = %entry.name, "Failed to restore floating container state");
                success = false;
            }
        }

        // Panes that became floating-only since the save can't stay docked
        for pane in self.substrate.container_panes(&primary) {
            if self.substrate.is_pane_visible(&pane) && self.substrate.pane_allowed_areas(&pane).is_floating_only() {
                let rect = self.substrate.pane_geometry(&pane).unwrap_or_default();
                debug!(pane = %pane, "Forcing floating-only pane out of the primary container");
                self.make_floating(&pane, rect);
            }
        }

        success
    }

    /// Remove every floating container and tab group, keeping all panes in
    /// the primary container
    fn clear_layout(&mut self, primary: &ContainerId) {
        for (host, group) in std::mem::take(&mut self.tab_groups) {
            for tab in &group.tabs {
                self.substrate.set_tab_host(tab, None);
                self.substrate.set_pane_parent(tab, primary);
            }
            self.substrate.destroy_pane(&host);
        }

        let floating: Vec<ContainerId> = self.floating_order.iter().cloned().collect();
        for container in floating {
            if !self.substrate.container_exists(&container) {
                continue;
            }
            for pane in self.substrate.container_panes(&container) {
                self.substrate.set_pane_parent(&pane, primary);
            }
            self.substrate.destroy_container(&container);
        }
        self.floating_order.clear();
    }

    /// Reopen a pane where it was last seen
    ///
    /// Tries its last tab group, then its last floating container (recreated
    /// from the cached state if needed), then the primary container.
    pub fn restore_single_pane(&mut self, pane: &PaneId) -> bool {
        if !self.substrate.pane_exists(pane) {
            return false;
        }

        if let Some(host) = self.last_tab_group.get(pane).cloned() {
            if self.tab_groups.contains_key(&host) && self.substrate.pane_exists(&host) {
                if self.tab_of(pane) != Some(&host) {
                    self.untabify(pane);
                    self.substrate.remove_pane(pane);
                    let index = self.add_tab(&host, pane);
                    self.set_active_tab(&host, index);
                }
                debug!(pane = %pane, host = %host, "Restored pane into its tab group");
                return true;
            }
        }

        if let Some(container) = self.placeholders.get(pane).cloned() {
            if self.restore_into_floating(pane, &container) {
                return true;
            }
        }

        let primary = self.substrate.primary_container();
        if !self.substrate.restore_pane(&primary, pane) {
            self.substrate.add_pane(&primary, pane, DockArea::Left);
        }
        debug!(pane = %pane, "Restored pane into the primary container");
        true
    }

    fn restore_into_floating(&mut self, pane: &PaneId, container: &ContainerId) -> bool {
        if !self.substrate.container_exists(container) {
            let Some(cached) = self.restore_floatings.get(container).cloned() else {
                return false;
            };
            self.with_bulk_update(|manager| {
                manager.create_floating_container(container, cached.geometry);
                manager.substrate.set_pane_parent(pane, container);
                if !manager.substrate.restore_container_state(container, &cached.state) {
                    warn!(container = %container, "Failed to restore cached floating state");
                }
            });
        }

        if !self.substrate.restore_pane(container, pane) || self.substrate.pane_container(pane).as_ref() != Some(container) {
            self.substrate.remove_pane(pane);
            self.substrate.add_pane(container, pane, DockArea::Left);
        }
        self.substrate.set_pane_visible(pane, true);
        self.substrate.raise_container(container);
        self.floating_order.raise(container);
        self.defer(Deferred::DestroyIfUseless(container.clone()));
        debug!(pane = %pane, container = %container, "Restored pane into its floating container");
        true
    }

    /// Leave the pane's floating container out of saved layouts
    pub fn disable_autosave(&mut self, pane: &PaneId) {
        self.no_autosave.insert(pane.clone());
    }

    pub fn enable_autosave(&mut self, pane: &PaneId) {
        self.no_autosave.remove(pane);
    }

    /// Write the current layout to a file
    pub fn save_layout_to<P: AsRef<Path>>(&self, path: P) -> DockResult<()> {
        let bytes = self.layout_snapshot().to_bytes()?;
        std::fs::write(&path, bytes)?;
        info!("Saved docking layout to {:?}", path.as_ref());
        Ok(())
    }

    /// Restore a layout file written by [`save_layout_to`](Self::save_layout_to)
    pub fn restore_layout_from<P: AsRef<Path>>(&mut self, path: P) -> DockResult<bool> {
        let bytes = std::fs::read(&path)?;
        let success = self.try_restore_state(&bytes)?;
        info!("Loaded docking layout from {:?}", path.as_ref());
        Ok(success)
    }
}
