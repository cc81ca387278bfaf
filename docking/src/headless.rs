//! In-memory substrate for tests and tools
//!
//! [`HeadlessSubstrate`] keeps containers, panes and top-level windows in
//! plain maps and queues the notifications a real windowing layer would
//! report. Visible panes of a container are laid out side by side in equal
//! columns of its client area unless a test pins their geometry.

use crate::drop_zone::DropZoneState;
use crate::geometry::{Margins, Rect};
use crate::pane::{
    AllowedAreas, ContainerId, Corner, DockArea, Orientation, PaneGrab, PaneId, TitleBarButtons,
    TitleBarDrawMode, TitleBarOwner,
};
use crate::screens::{Screen, ScreenId, ScreenLayout};
use crate::substrate::{DockSubstrate, DropZonePainter, GhostVisual, Notification, PainterFactory, TitleBar};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use tracing::{debug, trace};
use winit::window::WindowId;

pub const PRIMARY_CONTAINER: &str = "MainWindow";
pub const TITLE_BAR_HEIGHT: i32 = 24;
pub const TAB_BAR_HEIGHT: i32 = 22;

/// Title bar that remembers what the engine asked of it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingTitleBar {
    pub buttons: TitleBarButtons,
    pub showing_window_controls: bool,
    pub drag_enabled: bool,
    pub draw_mode: TitleBarDrawMode,
}

impl TitleBar for RecordingTitleBar {
    fn set_buttons(&mut self, buttons: TitleBarButtons) {
        self.buttons = buttons;
    }

    fn set_is_showing_window_controls(&mut self, showing: bool) {
        self.showing_window_controls = showing;
    }

    fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    fn set_draw_mode(&mut self, mode: TitleBarDrawMode) {
        self.draw_mode = mode;
    }
}

#[derive(Debug, Clone)]
struct HeadlessContainer {
    frame: Rect,
    visible: bool,
    minimized: bool,
    title: String,
    panes: Vec<PaneId>,
    corners: BTreeMap<Corner, DockArea>,
    window: u64,
    title_bar: RecordingTitleBar,
}

impl HeadlessContainer {
    fn new(frame: Rect, window: u64) -> Self {
        Self {
            frame,
            visible: true,
            minimized: false,
            title: String::new(),
            panes: Vec::new(),
            corners: BTreeMap::new(),
            window,
            title_bar: RecordingTitleBar::default(),
        }
    }

    fn client_area(&self) -> Rect {
        Rect::new(
            self.frame.x,
            self.frame.y + TITLE_BAR_HEIGHT,
            self.frame.width,
            self.frame.height - TITLE_BAR_HEIGHT,
        )
    }
}

#[derive(Debug, Clone)]
struct HeadlessPane {
    title: String,
    allowed: AllowedAreas,
    container: Option<ContainerId>,
    tab_host: Option<PaneId>,
    visible: bool,
    geometry: Option<Rect>,
    title_region: Option<Rect>,
    refuse_close: bool,
    placeholder_content: bool,
    title_bar: RecordingTitleBar,
}

impl HeadlessPane {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            allowed: AllowedAreas::all(),
            container: None,
            tab_host: None,
            visible: false,
            geometry: None,
            title_region: None,
            refuse_close: false,
            placeholder_content: false,
            title_bar: RecordingTitleBar::default(),
        }
    }
}

/// Recorded call to [`DockSubstrate::resize_panes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resize {
    pub panes: Vec<PaneId>,
    pub sizes: Vec<i32>,
    pub orientation: Orientation,
}

/// Substrate backed by plain maps
#[derive(Debug)]
pub struct HeadlessSubstrate {
    primary: ContainerId,
    screens: ScreenLayout,
    margins: Margins,
    containers: BTreeMap<ContainerId, HeadlessContainer>,
    panes: BTreeMap<PaneId, HeadlessPane>,
    /// Top-level window to its transient parent
    windows: HashMap<u64, Option<u64>>,
    next_window: u64,
    active_tabs: BTreeMap<PaneId, PaneId>,
    resizes: Vec<Resize>,
    notifications: Vec<Notification>,
    input_grabbed: bool,
    drag_cursor: bool,
}

impl Default for HeadlessSubstrate {
    fn default() -> Self {
        Self::new(vec![Screen::new(0, Rect::new(0, 0, 1920, 1080), 1.0)])
    }
}

impl HeadlessSubstrate {
    /// Substrate whose primary window covers the first screen
    pub fn new(screens: Vec<Screen>) -> Self {
        let screens = ScreenLayout::new(screens);
        let frame = screens.primary().map(|screen| screen.geometry).unwrap_or_default();

        let mut substrate = Self {
            primary: ContainerId::new(PRIMARY_CONTAINER),
            screens,
            margins: Margins::default(),
            containers: BTreeMap::new(),
            panes: BTreeMap::new(),
            windows: HashMap::new(),
            next_window: 1,
            active_tabs: BTreeMap::new(),
            resizes: Vec::new(),
            notifications: Vec::new(),
            input_grabbed: false,
            drag_cursor: false,
        };
        let window = substrate.new_window(None);
        substrate
            .containers
            .insert(substrate.primary.clone(), HeadlessContainer::new(frame, window));
        substrate
    }

    fn new_window(&mut self, parent: Option<u64>) -> u64 {
        let window = self.next_window;
        self.next_window += 1;
        self.windows.insert(window, parent);
        window
    }

    fn notify(&mut self, notification: Notification) {
        trace!(notification = ?notification, "Queued notification");
        self.notifications.push(notification);
    }

    /// Take a pane out of its container or tab group
    fn detach(&mut self, pane: &PaneId) {
        let Some(state) = self.panes.get_mut(pane) else {
            return;
        };
        state.tab_host = None;
        let Some(container) = state.container.take() else {
            return;
        };
        if let Some(parent) = self.containers.get_mut(&container) {
            parent.panes.retain(|child| child != pane);
        }
        self.notify(Notification::ChildRemoved {
            container,
            pane: pane.clone(),
        });
    }

    /// Insert a pane into a container at `index`, detaching it first
    fn attach(&mut self, pane: &PaneId, container: &ContainerId, index: Option<usize>, visible: bool) {
        if !self.panes.contains_key(pane) || !self.containers.contains_key(container) {
            return;
        }
        self.detach(pane);
        if let Some(parent) = self.containers.get_mut(container) {
            let index = index.unwrap_or(parent.panes.len()).min(parent.panes.len());
            parent.panes.insert(index, pane.clone());
        }
        if let Some(state) = self.panes.get_mut(pane) {
            state.container = Some(container.clone());
        }
        self.notify(Notification::ChildAdded {
            container: container.clone(),
            pane: pane.clone(),
        });
        self.set_pane_visible(pane, visible);
    }

    // Test helpers

    /// Create a pane docked on the right of the primary container
    pub fn create_docked_pane(&mut self, name: &str, title: &str) -> PaneId {
        let pane = PaneId::new(name);
        self.create_pane(&pane, title);
        let primary = self.primary.clone();
        self.add_pane(&primary, &pane, DockArea::Right);
        pane
    }

    /// Pin the geometry of a pane instead of using the column layout
    pub fn set_pane_geometry(&mut self, pane: &PaneId, geometry: Option<Rect>) {
        if let Some(state) = self.panes.get_mut(pane) {
            state.geometry = geometry;
        }
    }

    /// Pin the pane-local title region, which then reports even without geometry
    pub fn set_title_region(&mut self, pane: &PaneId, region: Option<Rect>) {
        if let Some(state) = self.panes.get_mut(pane) {
            state.title_region = region;
        }
    }

    pub fn set_allowed_areas(&mut self, pane: &PaneId, allowed: AllowedAreas) {
        if let Some(state) = self.panes.get_mut(pane) {
            state.allowed = allowed;
        }
    }

    pub fn set_refuse_close(&mut self, pane: &PaneId, refuse: bool) {
        if let Some(state) = self.panes.get_mut(pane) {
            state.refuse_close = refuse;
        }
    }

    pub fn set_frame_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    pub fn set_container_minimized(&mut self, container: &ContainerId, minimized: bool) {
        if let Some(state) = self.containers.get_mut(container) {
            state.minimized = minimized;
        }
    }

    /// Simulate the user focusing a floating window
    pub fn activate_container(&mut self, container: &ContainerId) {
        self.notify(Notification::ContainerActivated(container.clone()));
    }

    /// Simulate the close button of a floating window
    pub fn request_close(&mut self, container: &ContainerId) {
        self.notify(Notification::CloseRequested(container.clone()));
    }

    /// Add an unrelated top-level window, such as a dialog
    pub fn add_top_level_window(&mut self, parent: Option<WindowId>) -> WindowId {
        let window = self.new_window(parent.map(u64::from));
        WindowId::from(window)
    }

    pub fn container_names(&self) -> Vec<ContainerId> {
        self.containers.keys().cloned().collect()
    }

    /// Floating containers, in name order
    pub fn floating_containers(&self) -> Vec<ContainerId> {
        self.containers
            .keys()
            .filter(|container| **container != self.primary)
            .cloned()
            .collect()
    }

    pub fn container_title(&self, container: &ContainerId) -> Option<&str> {
        self.containers.get(container).map(|state| state.title.as_str())
    }

    pub fn container_title_bar(&self, container: &ContainerId) -> Option<&RecordingTitleBar> {
        self.containers.get(container).map(|state| &state.title_bar)
    }

    pub fn pane_title_bar(&self, pane: &PaneId) -> Option<&RecordingTitleBar> {
        self.panes.get(pane).map(|state| &state.title_bar)
    }

    pub fn corners(&self, container: &ContainerId) -> BTreeMap<Corner, DockArea> {
        self.containers
            .get(container)
            .map(|state| state.corners.clone())
            .unwrap_or_default()
    }

    pub fn resizes(&self) -> &[Resize] {
        &self.resizes
    }

    pub fn tab_host_of(&self, pane: &PaneId) -> Option<&PaneId> {
        self.panes.get(pane).and_then(|state| state.tab_host.as_ref())
    }

    pub fn active_tab(&self, host: &PaneId) -> Option<&PaneId> {
        self.active_tabs.get(host)
    }

    pub fn has_placeholder_content(&self, pane: &PaneId) -> bool {
        self.panes.get(pane).is_some_and(|state| state.placeholder_content)
    }

    pub fn is_input_grabbed(&self) -> bool {
        self.input_grabbed
    }

    pub fn is_drag_cursor(&self) -> bool {
        self.drag_cursor
    }
}

impl DockSubstrate for HeadlessSubstrate {
    fn screens(&self) -> ScreenLayout {
        self.screens.clone()
    }

    fn primary_container(&self) -> ContainerId {
        self.primary.clone()
    }

    fn container_exists(&self, container: &ContainerId) -> bool {
        self.containers.contains_key(container)
    }

    fn create_floating_container(&mut self, container: &ContainerId, geometry: Rect) {
        if self.containers.contains_key(container) {
            return;
        }
        let window = self.new_window(None);
        self.containers
            .insert(container.clone(), HeadlessContainer::new(geometry, window));
        debug!(container = %container, "Created headless floating container");
    }

    fn destroy_container(&mut self, container: &ContainerId) {
        if *container == self.primary {
            return;
        }
        let Some(state) = self.containers.remove(container) else {
            return;
        };
        for pane in &state.panes {
            if let Some(pane) = self.panes.get_mut(pane) {
                pane.container = None;
                pane.visible = false;
            }
        }
        self.windows.remove(&state.window);
    }

    fn container_geometry(&self, container: &ContainerId) -> Option<Rect> {
        self.containers.get(container).map(HeadlessContainer::client_area)
    }

    fn frame_geometry(&self, container: &ContainerId) -> Option<Rect> {
        self.containers.get(container).map(|state| state.frame)
    }

    fn set_frame_geometry(&mut self, container: &ContainerId, geometry: Rect) {
        if let Some(state) = self.containers.get_mut(container) {
            state.frame = geometry;
        }
    }

    fn is_container_visible(&self, container: &ContainerId) -> bool {
        self.containers.get(container).is_some_and(|state| state.visible)
    }

    fn is_container_minimized(&self, container: &ContainerId) -> bool {
        self.containers.get(container).is_some_and(|state| state.minimized)
    }

    fn set_container_visible(&mut self, container: &ContainerId, visible: bool) {
        if let Some(state) = self.containers.get_mut(container) {
            state.visible = visible;
        }
    }

    fn show_normal(&mut self, container: &ContainerId) {
        if let Some(state) = self.containers.get_mut(container) {
            state.minimized = false;
        }
    }

    fn raise_container(&mut self, _container: &ContainerId) {}

    fn set_container_title(&mut self, container: &ContainerId, title: &str) {
        if let Some(state) = self.containers.get_mut(container) {
            state.title = title.to_string();
        }
    }

    fn save_container_state(&self, container: &ContainerId) -> Vec<u8> {
        let Some(state) = self.containers.get(container) else {
            return Vec::new();
        };
        let children: Vec<(String, bool)> = state
            .panes
            .iter()
            .map(|pane| {
                let visible = self.panes.get(pane).is_some_and(|state| state.visible);
                (pane.0.clone(), visible)
            })
            .collect();
        serde_json::to_vec(&children).unwrap_or_default()
    }

    fn restore_container_state(&mut self, container: &ContainerId, state: &[u8]) -> bool {
        if !self.containers.contains_key(container) {
            return false;
        }
        let Ok(children) = serde_json::from_slice::<Vec<(String, bool)>>(state) else {
            return false;
        };

        let mut index = 0;
        for (name, visible) in children {
            let pane = PaneId::new(name);
            let Some(current) = self.panes.get(&pane) else {
                continue;
            };
            if current.tab_host.is_some() {
                continue;
            }
            if current.container.as_ref() == Some(container) {
                if let Some(parent) = self.containers.get_mut(container) {
                    parent.panes.retain(|child| *child != pane);
                    let at = index.min(parent.panes.len());
                    parent.panes.insert(at, pane.clone());
                }
                self.set_pane_visible(&pane, visible);
            } else {
                self.attach(&pane, container, Some(index), visible);
            }
            index += 1;
        }
        true
    }

    fn set_corner(&mut self, container: &ContainerId, corner: Corner, area: DockArea) {
        if let Some(state) = self.containers.get_mut(container) {
            state.corners.insert(corner, area);
        }
    }

    fn frame_margins(&self) -> Margins {
        self.margins
    }

    fn title_bar_height(&self) -> i32 {
        TITLE_BAR_HEIGHT
    }

    fn container_window(&self, container: &ContainerId) -> Option<WindowId> {
        self.containers.get(container).map(|state| WindowId::from(state.window))
    }

    fn transient_parent(&self, window: WindowId) -> Option<WindowId> {
        self.windows
            .get(&u64::from(window))
            .copied()
            .flatten()
            .map(WindowId::from)
    }

    fn transient_children(&self, window: WindowId) -> Vec<WindowId> {
        let window = u64::from(window);
        let mut children: Vec<u64> = self
            .windows
            .iter()
            .filter(|(_, parent)| **parent == Some(window))
            .map(|(child, _)| *child)
            .collect();
        children.sort_unstable();
        children.into_iter().map(WindowId::from).collect()
    }

    fn set_transient_parent(&mut self, window: WindowId, parent: Option<WindowId>) {
        self.windows.insert(u64::from(window), parent.map(u64::from));
    }

    fn pane_exists(&self, pane: &PaneId) -> bool {
        self.panes.contains_key(pane)
    }

    fn pane_title(&self, pane: &PaneId) -> String {
        self.panes.get(pane).map(|state| state.title.clone()).unwrap_or_default()
    }

    fn pane_allowed_areas(&self, pane: &PaneId) -> AllowedAreas {
        self.panes.get(pane).map_or(AllowedAreas::all(), |state| state.allowed)
    }

    fn pane_container(&self, pane: &PaneId) -> Option<ContainerId> {
        self.panes.get(pane).and_then(|state| state.container.clone())
    }

    fn container_panes(&self, container: &ContainerId) -> Vec<PaneId> {
        self.containers
            .get(container)
            .map(|state| state.panes.clone())
            .unwrap_or_default()
    }

    fn pane_geometry(&self, pane: &PaneId) -> Option<Rect> {
        let state = self.panes.get(pane)?;
        if !state.visible {
            return None;
        }
        if let Some(geometry) = state.geometry {
            return Some(geometry);
        }
        if let Some(host) = &state.tab_host {
            return self.pane_geometry(host);
        }

        let container = self.containers.get(state.container.as_ref()?)?;
        let visible: Vec<&PaneId> = container
            .panes
            .iter()
            .filter(|child| self.panes.get(*child).is_some_and(|child| child.visible))
            .collect();
        let index = visible.iter().position(|child| *child == pane)?;
        let client = container.client_area();
        let width = client.width / visible.len() as i32;
        Some(Rect::new(client.x + width * index as i32, client.y, width, client.height))
    }

    fn is_pane_visible(&self, pane: &PaneId) -> bool {
        self.panes.get(pane).is_some_and(|state| state.visible)
    }

    fn set_pane_visible(&mut self, pane: &PaneId, visible: bool) {
        let Some(state) = self.panes.get_mut(pane) else {
            return;
        };
        if state.visible == visible {
            return;
        }
        state.visible = visible;
        if visible {
            self.notify(Notification::PaneShown(pane.clone()));
        } else {
            self.notify(Notification::PaneHidden(pane.clone()));
        }
    }

    fn title_region(&self, pane: &PaneId) -> Option<Rect> {
        if let Some(region) = self.panes.get(pane).and_then(|state| state.title_region) {
            return Some(region);
        }
        let geometry = self.pane_geometry(pane)?;
        Some(Rect::new(0, 0, geometry.width, TITLE_BAR_HEIGHT))
    }

    fn tab_bar_rect(&self, host: &PaneId) -> Option<Rect> {
        let geometry = self.pane_geometry(host)?;
        Some(Rect::new(geometry.x, geometry.y, geometry.width, TAB_BAR_HEIGHT))
    }

    fn add_pane(&mut self, container: &ContainerId, pane: &PaneId, area: DockArea) {
        let index = match area {
            DockArea::Left | DockArea::Top => Some(0),
            DockArea::Right | DockArea::Bottom | DockArea::Tab => None,
        };
        self.attach(pane, container, index, true);
    }

    fn remove_pane(&mut self, pane: &PaneId) {
        if self.panes.get(pane).is_some_and(|state| state.container.is_some()) {
            self.detach(pane);
            if let Some(state) = self.panes.get_mut(pane) {
                state.visible = false;
            }
        }
    }

    fn split_pane(&mut self, target: &PaneId, dropped: &PaneId, _orientation: Orientation) {
        let Some(container) = self.pane_container(target) else {
            return;
        };
        self.detach(dropped);
        let index = self
            .containers
            .get(&container)
            .and_then(|state| state.panes.iter().position(|child| child == target))
            .map(|index| index + 1);
        self.attach(dropped, &container, index, true);
    }

    fn resize_panes(&mut self, panes: &[PaneId], sizes: &[i32], orientation: Orientation) {
        self.resizes.push(Resize {
            panes: panes.to_vec(),
            sizes: sizes.to_vec(),
            orientation,
        });
    }

    fn set_pane_parent(&mut self, pane: &PaneId, container: &ContainerId) {
        if self.pane_container(pane).as_ref() == Some(container) {
            self.set_pane_visible(pane, false);
            return;
        }
        self.attach(pane, container, None, false);
    }

    fn restore_pane(&mut self, container: &ContainerId, pane: &PaneId) -> bool {
        if self.pane_container(pane).as_ref() != Some(container) {
            return false;
        }
        self.set_pane_visible(pane, true);
        true
    }

    fn create_pane(&mut self, pane: &PaneId, title: &str) {
        self.panes.entry(pane.clone()).or_insert_with(|| HeadlessPane::new(title));
    }

    fn destroy_pane(&mut self, pane: &PaneId) {
        self.detach(pane);
        self.panes.remove(pane);
        self.active_tabs.remove(pane);
    }

    fn close_pane(&mut self, pane: &PaneId) -> bool {
        if !self.panes.get(pane).is_some_and(|state| !state.refuse_close) {
            return false;
        }
        self.set_pane_visible(pane, false);
        true
    }

    fn set_tab_host(&mut self, pane: &PaneId, host: Option<&PaneId>) {
        self.detach(pane);
        if let Some(state) = self.panes.get_mut(pane) {
            state.tab_host = host.cloned();
        }
    }

    fn set_active_tab(&mut self, host: &PaneId, pane: &PaneId) {
        self.active_tabs.insert(host.clone(), pane.clone());
    }

    fn set_content_placeholder(&mut self, pane: &PaneId, placeholder: bool) {
        if let Some(state) = self.panes.get_mut(pane) {
            state.placeholder_content = placeholder;
        }
    }

    fn grab_pane(&self, pane: &PaneId) -> Option<PaneGrab> {
        self.pane_geometry(pane).map(|rect| PaneGrab::new(rect.size()))
    }

    fn title_bar(&mut self, owner: &TitleBarOwner) -> Option<&mut dyn TitleBar> {
        match owner {
            TitleBarOwner::Pane(pane) => self
                .panes
                .get_mut(pane)
                .map(|state| &mut state.title_bar as &mut dyn TitleBar),
            TitleBarOwner::Container(container) => self
                .containers
                .get_mut(container)
                .map(|state| &mut state.title_bar as &mut dyn TitleBar),
        }
    }

    fn grab_input(&mut self) {
        self.input_grabbed = true;
    }

    fn release_input(&mut self) {
        self.input_grabbed = false;
    }

    fn set_drag_cursor(&mut self, active: bool) {
        self.drag_cursor = active;
    }

    fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

/// What the engine last asked of the ghost visual
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GhostState {
    pub enabled: bool,
    pub shown: bool,
    pub clipping_to_panes: bool,
    pub opacity: f32,
    pub target: Option<Rect>,
    pub screen: Option<ScreenId>,
}

/// Ghost visual recording into a shared [`GhostState`]
#[derive(Debug, Clone, Default)]
pub struct RecordingGhost {
    state: Rc<RefCell<GhostState>>,
}

impl RecordingGhost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that keeps observing the ghost after it moved into the manager
    pub fn probe(&self) -> GhostProbe {
        GhostProbe {
            state: Rc::clone(&self.state),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GhostProbe {
    state: Rc<RefCell<GhostState>>,
}

impl GhostProbe {
    pub fn state(&self) -> GhostState {
        self.state.borrow().clone()
    }
}

impl GhostVisual for RecordingGhost {
    fn set_pixmap(&mut self, _grab: &PaneGrab, target: Rect, screen: Option<ScreenId>) {
        let mut state = self.state.borrow_mut();
        state.target = Some(target);
        state.screen = screen;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.state.borrow_mut().opacity = opacity;
    }

    fn enable(&mut self) {
        self.state.borrow_mut().enabled = true;
    }

    fn disable(&mut self) {
        self.state.borrow_mut().enabled = false;
    }

    fn enable_clipping_to_panes(&mut self) {
        self.state.borrow_mut().clipping_to_panes = true;
    }

    fn disable_clipping_to_panes(&mut self) {
        self.state.borrow_mut().clipping_to_panes = false;
    }

    fn show(&mut self) {
        self.state.borrow_mut().shown = true;
    }

    fn hide(&mut self) {
        self.state.borrow_mut().shown = false;
    }
}

/// Activity of every painter created by [`recording_painters`]
#[derive(Debug, Clone, Default)]
pub struct PainterLog {
    pub created: Vec<ScreenId>,
    pub active: BTreeSet<ScreenId>,
    pub repaints: usize,
    pub last_state: Option<DropZoneState>,
}

#[derive(Debug, Clone, Default)]
pub struct PainterProbe {
    log: Rc<RefCell<PainterLog>>,
}

impl PainterProbe {
    pub fn log(&self) -> PainterLog {
        self.log.borrow().clone()
    }
}

struct RecordingPainter {
    screen: ScreenId,
    log: Rc<RefCell<PainterLog>>,
}

impl DropZonePainter for RecordingPainter {
    fn screen(&self) -> ScreenId {
        self.screen
    }

    fn start(&mut self) {
        self.log.borrow_mut().active.insert(self.screen);
    }

    fn stop(&mut self) {
        self.log.borrow_mut().active.remove(&self.screen);
    }

    fn repaint(&mut self, state: &DropZoneState) {
        let mut log = self.log.borrow_mut();
        log.repaints += 1;
        log.last_state = Some(state.clone());
    }
}

/// Painter factory whose painters report into the returned probe
pub fn recording_painters() -> (PainterFactory, PainterProbe) {
    let probe = PainterProbe::default();
    let log = Rc::clone(&probe.log);
    let factory: PainterFactory = Box::new(move |screen: &Screen| {
        log.borrow_mut().created.push(screen.id);
        Box::new(RecordingPainter {
            screen: screen.id,
            log: Rc::clone(&log),
        }) as Box<dyn DropZonePainter>
    });
    (factory, probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panes_share_the_client_area() {
        let mut substrate = HeadlessSubstrate::default();
        let a = substrate.create_docked_pane("a", "A");
        let b = substrate.create_docked_pane("b", "B");

        let client = substrate.container_geometry(&substrate.primary_container()).unwrap();
        assert_eq!(client.y, TITLE_BAR_HEIGHT);
        assert_eq!(substrate.pane_geometry(&a), Some(Rect::new(0, TITLE_BAR_HEIGHT, 960, client.height)));
        assert_eq!(substrate.pane_geometry(&b).unwrap().x, 960);

        substrate.set_pane_visible(&a, false);
        assert_eq!(substrate.pane_geometry(&b).unwrap().width, 1920);
    }

    #[test]
    fn test_state_round_trip_restores_visibility() {
        let mut substrate = HeadlessSubstrate::default();
        let a = substrate.create_docked_pane("a", "A");
        let b = substrate.create_docked_pane("b", "B");
        let primary = substrate.primary_container();
        let state = substrate.save_container_state(&primary);

        substrate.set_pane_visible(&a, false);
        substrate.remove_pane(&b);
        assert!(substrate.restore_container_state(&primary, &state));
        assert_eq!(substrate.container_panes(&primary), vec![a.clone(), b.clone()]);
        assert!(substrate.is_pane_visible(&a));
        assert!(substrate.is_pane_visible(&b));
        assert!(!substrate.restore_container_state(&primary, b"nope"));
    }

    #[test]
    fn test_notifications_are_queued() {
        let mut substrate = HeadlessSubstrate::default();
        let a = substrate.create_docked_pane("a", "A");
        let notifications = substrate.drain_notifications();
        assert!(notifications.contains(&Notification::ChildAdded {
            container: substrate.primary_container(),
            pane: a.clone(),
        }));
        assert!(notifications.contains(&Notification::PaneShown(a)));
        assert!(substrate.drain_notifications().is_empty());
    }

    #[test]
    fn test_transient_children() {
        let mut substrate = HeadlessSubstrate::default();
        let main = substrate.container_window(&substrate.primary_container()).unwrap();
        let dialog = substrate.add_top_level_window(Some(main));
        assert_eq!(substrate.transient_parent(dialog), Some(main));
        assert_eq!(substrate.transient_children(main), vec![dialog]);
    }
}
