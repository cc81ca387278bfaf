//! The docking engine
//!
//! [`DockManager`] owns every piece of docking bookkeeping the native
//! substrate can't provide: floating stacking order, tab groups, cached
//! floating sizes and the state of the current drag. The host forwards input
//! through [`DockManager::handle_event`] and calls [`DockManager::pump`] once
//! per event-loop iteration.

use crate::config::DockingConfig;
use crate::drag::{DragPhase, DragSession};
use crate::drop_zone::DropZoneState;
use crate::geometry::Rect;
use crate::input::DockEvent;
use crate::pane::{ContainerId, DockArea, DropTarget, Hosting, PaneGrab, PaneId};
use crate::screens::{ScreenId, ScreenLayout};
use crate::substrate::{DockSubstrate, DropZonePainter, GhostVisual, Notification, PainterFactory};
use crate::tabs::TabGroup;
use crate::zorder::FloatingOrder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::{debug, trace, warn};
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

/// Upper bound of notification/deferred rounds run by a single [`DockManager::pump`]
const MAX_PUMP_ROUNDS: usize = 32;

/// Work postponed to the next event-loop iteration
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Finish a dock drop once the dragged pane's visibility has settled
    CommitDrop {
        pane: PaneId,
        onto: DropTarget,
        area: DockArea,
        on_absolute: bool,
    },
    DestroyIfUseless(ContainerId),
    UpdateTitleBars(ContainerId),
    UpdateFloatingTitle(ContainerId),
    UpdateDragOrDock(ContainerId),
}

/// Cached state of a destroyed floating container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreFloating {
    pub state: Vec<u8>,
    pub geometry: Rect,
}

/// Docking overlay manager
pub struct DockManager<S: DockSubstrate> {
    pub(crate) substrate: S,
    pub(crate) config: DockingConfig,
    pub(crate) ghost: Box<dyn GhostVisual>,
    pub(crate) painter_factory: PainterFactory,
    pub(crate) painters: BTreeMap<ScreenId, Box<dyn DropZonePainter>>,
    pub(crate) active_painters: Vec<ScreenId>,
    pub(crate) screens: ScreenLayout,
    pub(crate) drop_zones: DropZoneState,
    pub(crate) session: Option<DragSession>,
    pub(crate) floating_order: FloatingOrder,
    pub(crate) tab_groups: BTreeMap<PaneId, TabGroup>,
    /// Last floating size of panes that were docked or tabbed
    pub(crate) last_floating: HashMap<PaneId, PaneGrab>,
    /// Tab group a pane was last inserted into
    pub(crate) last_tab_group: HashMap<PaneId, PaneId>,
    /// Floating container a pane was last seen in
    pub(crate) placeholders: BTreeMap<PaneId, ContainerId>,
    pub(crate) restore_floatings: BTreeMap<ContainerId, RestoreFloating>,
    pub(crate) no_autosave: HashSet<PaneId>,
    pub(crate) modifiers: ModifiersState,
    pub(crate) deferred: VecDeque<Deferred>,
    pub(crate) bulk_update: bool,
    pub(crate) fade_active: bool,
}

impl<S: DockSubstrate> DockManager<S> {
    pub fn new(
        substrate: S,
        config: DockingConfig,
        ghost: Box<dyn GhostVisual>,
        painter_factory: PainterFactory,
    ) -> Self {
        let screens = substrate.screens();
        debug!(screens = screens.screens().len(), "Created dock manager");
        Self {
            substrate,
            config,
            ghost,
            painter_factory,
            painters: BTreeMap::new(),
            active_painters: Vec::new(),
            screens,
            drop_zones: DropZoneState::default(),
            session: None,
            floating_order: FloatingOrder::new(),
            tab_groups: BTreeMap::new(),
            last_floating: HashMap::new(),
            last_tab_group: HashMap::new(),
            placeholders: BTreeMap::new(),
            restore_floatings: BTreeMap::new(),
            no_autosave: HashSet::new(),
            modifiers: ModifiersState::empty(),
            deferred: VecDeque::new(),
            bulk_update: false,
            fade_active: false,
        }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn substrate_mut(&mut self) -> &mut S {
        &mut self.substrate
    }

    pub fn config(&self) -> &DockingConfig {
        &self.config
    }

    /// Drop zones of the current drag, shared with the painters
    pub fn drop_zones(&self) -> &DropZoneState {
        &self.drop_zones
    }

    pub fn floating_order(&self) -> &FloatingOrder {
        &self.floating_order
    }

    pub fn drag_phase(&self) -> DragPhase {
        match &self.session {
            None => DragPhase::Idle,
            Some(session) if session.committing => DragPhase::Committing,
            Some(_) if self.drop_zones.dragging() => DragPhase::Dragging,
            Some(_) => DragPhase::Pressed,
        }
    }

    /// Current drag session, if a press is being tracked
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_floating(&self, container: &ContainerId) -> bool {
        *container != self.substrate.primary_container() && self.substrate.container_exists(container)
    }

    /// Tab group host of a tabbed pane
    pub fn tab_of(&self, pane: &PaneId) -> Option<&PaneId> {
        self.tab_groups
            .iter()
            .find(|(_, group)| group.tabs.contains(pane))
            .map(|(host, _)| host)
    }

    pub fn tab_group(&self, host: &PaneId) -> Option<&TabGroup> {
        self.tab_groups.get(host)
    }

    pub fn tab_groups(&self) -> impl Iterator<Item = (&PaneId, &TabGroup)> {
        self.tab_groups.iter()
    }

    /// Cached floating size of a pane
    pub fn last_floating_grab(&self, pane: &PaneId) -> Option<&PaneGrab> {
        self.last_floating.get(pane)
    }

    /// Which kind of container currently hosts a pane; `None` for orphans
    pub fn hosting(&self, pane: &PaneId) -> Option<Hosting> {
        if let Some(host) = self.tab_of(pane) {
            let container = self.substrate.pane_container(host)?;
            return Some(Hosting::Tabbed {
                group: host.clone(),
                container,
            });
        }

        let container = self.substrate.pane_container(pane)?;
        if container == self.substrate.primary_container() {
            Some(Hosting::Primary)
        } else {
            Some(Hosting::Floating(container))
        }
    }

    /// Handle an input event forwarded by the host
    ///
    /// Returns `true` if the event was consumed by the docking engine.
    pub fn handle_event(&mut self, event: DockEvent) -> bool {
        match event {
            DockEvent::PanePressed {
                pane,
                local,
                global,
                button,
            } => button == MouseButton::Left && self.press_pane(&pane, local, global),
            DockEvent::ContainerTitlePressed {
                container,
                local,
                global,
                button,
            } => button == MouseButton::Left && self.press_container_title(&container, local, global),
            DockEvent::TabPressed { host, index, global } => self.press_tab(&host, index, global),
            DockEvent::PointerMoved { global } => self.on_pointer_moved(global),
            DockEvent::PointerReleased { global, button } => self.on_pointer_released(global, button),
            DockEvent::KeyPressed(key) => {
                if !self.drop_zones.dragging() {
                    return false;
                }
                if key == KeyCode::Escape {
                    debug!("Drag cancelled");
                    self.clear_dragging_state();
                } else {
                    // Modifier keys change how the ghost is drawn
                    self.repaint_floating_indicators();
                }
                true
            }
            DockEvent::KeyReleased(_) => {
                if self.drop_zones.dragging() {
                    self.repaint_floating_indicators();
                }
                false
            }
            DockEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
                if self.drop_zones.dragging() {
                    self.repaint_floating_indicators();
                }
                false
            }
            DockEvent::WindowBlocked => {
                // The release would be lost to the modal dialog
                if self.drop_zones.dragging() {
                    debug!("Drag cancelled by a blocking window");
                    self.clear_dragging_state();
                }
                false
            }
            DockEvent::UndockPane(pane) => {
                self.undock_pane(&pane);
                true
            }
            DockEvent::UndockTab { host, index } => {
                self.undock_tab(&host, index);
                true
            }
            DockEvent::ScreensChanged => {
                self.refresh_screens();
                false
            }
        }
    }

    /// React to a substrate notification
    pub fn handle_notification(&mut self, notification: Notification) {
        trace!(notification = ?notification, "Handling notification");
        let primary = self.substrate.primary_container();

        match notification {
            Notification::ChildAdded { container, pane } => {
                if container == primary || !self.substrate.container_exists(&container) {
                    return;
                }
                self.placeholders.insert(pane, container.clone());
                self.defer(Deferred::UpdateFloatingTitle(container.clone()));
                self.update_title_bars(&container);
                self.defer(Deferred::UpdateDragOrDock(container));
            }
            Notification::ChildRemoved { container, pane } => {
                if container == primary || !self.substrate.container_exists(&container) {
                    return;
                }
                self.defer(Deferred::UpdateFloatingTitle(container.clone()));
                self.update_title_bars(&container);
                self.update_drag_or_dock(&container);
                self.defer(Deferred::DestroyIfUseless(container));

                // A destroyed pane keeps its entry so it can be restored later,
                // as does a floating-only pane that will be re-floated
                if self.substrate.pane_exists(&pane)
                    && !self.substrate.pane_allowed_areas(&pane).is_floating_only()
                {
                    self.placeholders.remove(&pane);
                }
            }
            Notification::PaneShown(pane) => {
                let Some(container) = self.substrate.pane_container(&pane) else {
                    return;
                };
                self.update_title_bars(&container);
                if container != primary {
                    self.defer(Deferred::UpdateFloatingTitle(container));
                }
            }
            Notification::PaneHidden(pane) => {
                let Some(container) = self.substrate.pane_container(&pane) else {
                    return;
                };
                self.update_title_bars(&container);
                if container != primary {
                    self.defer(Deferred::UpdateFloatingTitle(container.clone()));
                    // The pane may only be hidden while being reparented
                    if !self.bulk_update {
                        self.defer(Deferred::DestroyIfUseless(container));
                    }
                }
            }
            Notification::ContainerActivated(container) => {
                if container != primary {
                    self.floating_order.raise(&container);
                }
            }
            Notification::CloseRequested(container) => {
                self.close_floating_container(&container);
            }
        }
    }

    /// Drain substrate notifications and run deferred work until both settle
    pub fn pump(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let notifications = self.substrate.drain_notifications();
            let idle = notifications.is_empty() && self.deferred.is_empty();
            for notification in notifications {
                self.handle_notification(notification);
            }

            let tasks: Vec<Deferred> = self.deferred.drain(..).collect();
            for task in tasks {
                self.run_deferred(task);
            }

            if idle {
                return;
            }
        }
        warn!("Dock manager did not settle within {} rounds", MAX_PUMP_ROUNDS);
    }

    /// Queue work for the next [`pump`](Self::pump), skipping duplicates
    pub(crate) fn defer(&mut self, task: Deferred) {
        if !self.deferred.contains(&task) {
            self.deferred.push_back(task);
        }
    }

    fn run_deferred(&mut self, task: Deferred) {
        trace!(task = ?task, "Running deferred task");
        match task {
            Deferred::CommitDrop {
                pane,
                onto,
                area,
                on_absolute,
            } => self.commit_drop(&pane, &onto, area, on_absolute),
            Deferred::DestroyIfUseless(container) => self.destroy_if_useless(&container),
            Deferred::UpdateTitleBars(container) => self.update_title_bars(&container),
            Deferred::UpdateFloatingTitle(container) => self.update_floating_title(&container),
            Deferred::UpdateDragOrDock(container) => self.update_drag_or_dock(&container),
        }
    }

    /// Run `f` with empty floating containers kept alive
    ///
    /// The previous flag is restored afterwards, so bulk updates nest.
    pub(crate) fn with_bulk_update<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.bulk_update, true);
        let result = f(self);
        self.bulk_update = previous;
        result
    }

    pub fn is_bulk_update(&self) -> bool {
        self.bulk_update
    }

    /// Unique name for a synthetic floating container or tab group host
    pub(crate) fn unique_name(&self, kind: &str) -> String {
        loop {
            let name = format!(
                "{}{}-{}",
                self.config.identifier_prefix,
                kind,
                uuid::Uuid::new_v4().simple()
            );
            let taken = self.substrate.container_exists(&ContainerId::new(name.clone()))
                || self.substrate.pane_exists(&PaneId::new(name.clone()));
            if !taken {
                return name;
            }
        }
    }

    pub(crate) fn docking_disabled_by_modifier(&self) -> bool {
        self.config.disable_docking_modifier.is_held(self.modifiers)
    }

    /// Container a drop target lives in
    pub(crate) fn target_container(&self, target: &DropTarget) -> Option<ContainerId> {
        match target {
            DropTarget::Container(container) => Some(container.clone()),
            DropTarget::Pane(pane) => self.substrate.pane_container(pane),
        }
    }

    pub(crate) fn target_geometry(&self, target: &DropTarget) -> Option<Rect> {
        match target {
            DropTarget::Container(container) => self.substrate.container_geometry(container),
            DropTarget::Pane(pane) => self.substrate.pane_geometry(pane),
        }
    }

    /// Move the ghost to the current placeholder
    pub(crate) fn update_ghost(&mut self) {
        if !self.drop_zones.dragging() {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        if !session.placeholder.is_valid() {
            return;
        }

        let opacity = if self.docking_disabled_by_modifier() {
            1.0
        } else {
            self.config.ghost_opacity
        };
        self.ghost.set_opacity(opacity);
        self.ghost
            .set_pixmap(&session.grab, session.placeholder, session.placeholder_screen);
    }

    pub(crate) fn repaint_floating_indicators(&mut self) {
        self.update_ghost();
        self.repaint_drop_zones();
    }

    fn refresh_screens(&mut self) {
        self.screens = self.substrate.screens();
        let screens = &self.screens;
        self.painters.retain(|id, _| screens.get(*id).is_some());
        self.active_painters.retain(|id| screens.get(*id).is_some());
        debug!(screens = self.screens.screens().len(), "Screen layout changed");
    }
}
