//! Contracts between the docking engine and its collaborators
//!
//! The engine never creates windows or paints anything itself. It drives a
//! [`DockSubstrate`] (native windows and layouts), a [`GhostVisual`] (the
//! translucent pixmap following the pointer) and one [`DropZonePainter`] per
//! monitor.

use crate::drop_zone::DropZoneState;
use crate::geometry::{Margins, Rect};
use crate::pane::{
    AllowedAreas, ContainerId, Corner, DockArea, Orientation, PaneGrab, PaneId, TitleBarButtons,
    TitleBarDrawMode, TitleBarOwner,
};
use crate::screens::{Screen, ScreenId, ScreenLayout};
use winit::window::WindowId;

/// Notifications reported by the substrate
///
/// The host hands them to the engine through
/// [`DockManager::pump`](crate::manager::DockManager::pump) or
/// [`DockManager::handle_notification`](crate::manager::DockManager::handle_notification).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ChildAdded { container: ContainerId, pane: PaneId },
    ChildRemoved { container: ContainerId, pane: PaneId },
    PaneShown(PaneId),
    PaneHidden(PaneId),
    /// A floating container was focused or raised
    ContainerActivated(ContainerId),
    /// The user asked to close a whole floating container
    CloseRequested(ContainerId),
}

/// Title bar widget of a pane or a floating container
pub trait TitleBar {
    fn set_buttons(&mut self, buttons: TitleBarButtons);
    fn set_is_showing_window_controls(&mut self, showing: bool);
    fn set_drag_enabled(&mut self, enabled: bool);
    fn set_draw_mode(&mut self, mode: TitleBarDrawMode);
}

/// Native windowing and docking layer
///
/// Geometry is reported in global coordinates. Containers own their panes
/// through the native layout; tab group members are handed to their host
/// pane with [`set_tab_host`](DockSubstrate::set_tab_host) and belong to no
/// container while tabbed.
pub trait DockSubstrate {
    // Screens

    fn screens(&self) -> ScreenLayout;

    // Containers

    fn primary_container(&self) -> ContainerId;
    fn container_exists(&self, container: &ContainerId) -> bool;
    /// Create a shown floating container window with the given frame geometry
    fn create_floating_container(&mut self, container: &ContainerId, geometry: Rect);
    fn destroy_container(&mut self, container: &ContainerId);
    /// Area hosting the docking layout
    fn container_geometry(&self, container: &ContainerId) -> Option<Rect>;
    /// Outer window geometry including decorations
    fn frame_geometry(&self, container: &ContainerId) -> Option<Rect>;
    fn set_frame_geometry(&mut self, container: &ContainerId, geometry: Rect);
    fn is_container_visible(&self, container: &ContainerId) -> bool;
    fn is_container_minimized(&self, container: &ContainerId) -> bool;
    fn set_container_visible(&mut self, container: &ContainerId, visible: bool);
    /// Leave the maximized or minimized state
    fn show_normal(&mut self, container: &ContainerId);
    fn raise_container(&mut self, container: &ContainerId);
    fn set_container_title(&mut self, container: &ContainerId, title: &str);
    /// Native sub-layout of a container as an opaque blob
    fn save_container_state(&self, container: &ContainerId) -> Vec<u8>;
    fn restore_container_state(&mut self, container: &ContainerId, state: &[u8]) -> bool;
    fn set_corner(&mut self, container: &ContainerId, corner: Corner, area: DockArea);
    /// Window frame margins of floating windows
    fn frame_margins(&self) -> Margins;
    fn title_bar_height(&self) -> i32;

    // Top-level windows

    fn container_window(&self, container: &ContainerId) -> Option<WindowId>;
    fn transient_parent(&self, window: WindowId) -> Option<WindowId>;
    /// Top-level windows whose transient parent is `window`
    fn transient_children(&self, window: WindowId) -> Vec<WindowId>;
    fn set_transient_parent(&mut self, window: WindowId, parent: Option<WindowId>);

    // Panes

    fn pane_exists(&self, pane: &PaneId) -> bool;
    fn pane_title(&self, pane: &PaneId) -> String;
    fn pane_allowed_areas(&self, pane: &PaneId) -> AllowedAreas;
    /// Container holding the pane, `None` while tabbed or orphaned
    fn pane_container(&self, pane: &PaneId) -> Option<ContainerId>;
    /// Direct children of a container in layout order, hidden ones included
    fn container_panes(&self, container: &ContainerId) -> Vec<PaneId>;
    fn pane_geometry(&self, pane: &PaneId) -> Option<Rect>;
    fn is_pane_visible(&self, pane: &PaneId) -> bool;
    fn set_pane_visible(&mut self, pane: &PaneId, visible: bool);
    /// Draggable title region in pane-local coordinates
    fn title_region(&self, pane: &PaneId) -> Option<Rect>;
    /// Tab bar of a tab group host in global coordinates
    fn tab_bar_rect(&self, host: &PaneId) -> Option<Rect>;
    /// Dock the pane into a container on the given edge and show it
    fn add_pane(&mut self, container: &ContainerId, pane: &PaneId, area: DockArea);
    /// Take the pane out of its container's layout; it becomes an orphan
    fn remove_pane(&mut self, pane: &PaneId);
    /// Dock `dropped` next to `target`
    fn split_pane(&mut self, target: &PaneId, dropped: &PaneId, orientation: Orientation);
    fn resize_panes(&mut self, panes: &[PaneId], sizes: &[i32], orientation: Orientation);
    /// Reparent as a hidden child without docking it into the layout
    fn set_pane_parent(&mut self, pane: &PaneId, container: &ContainerId);
    /// Native restore of a pane to its last place in the container
    fn restore_pane(&mut self, container: &ContainerId, pane: &PaneId) -> bool;
    /// Create an empty pane used to host a tab group
    fn create_pane(&mut self, pane: &PaneId, title: &str);
    fn destroy_pane(&mut self, pane: &PaneId);
    /// Ask the pane to close; `false` if it refused
    fn close_pane(&mut self, pane: &PaneId) -> bool;
    /// Move the pane into (or out of) a tab group host's content
    fn set_tab_host(&mut self, pane: &PaneId, host: Option<&PaneId>);
    fn set_active_tab(&mut self, host: &PaneId, pane: &PaneId);
    /// Swap the pane's content for an inert placeholder (or restore it)
    fn set_content_placeholder(&mut self, pane: &PaneId, placeholder: bool);
    fn grab_pane(&self, pane: &PaneId) -> Option<PaneGrab>;

    // Title bars and input

    fn title_bar(&mut self, owner: &TitleBarOwner) -> Option<&mut dyn TitleBar>;
    /// Route all pointer and keyboard input to the engine
    fn grab_input(&mut self);
    fn release_input(&mut self);
    fn set_drag_cursor(&mut self, active: bool);

    fn drain_notifications(&mut self) -> Vec<Notification>;
}

/// Translucent pixmap following the pointer while dragging
pub trait GhostVisual {
    fn set_pixmap(&mut self, grab: &PaneGrab, target: Rect, screen: Option<ScreenId>);
    fn set_opacity(&mut self, opacity: f32);
    fn enable(&mut self);
    fn disable(&mut self);
    fn enable_clipping_to_panes(&mut self);
    fn disable_clipping_to_panes(&mut self);
    fn show(&mut self);
    fn hide(&mut self);
}

/// Per-monitor overlay drawing the drop zones of the current drag
pub trait DropZonePainter {
    fn screen(&self) -> ScreenId;
    /// Begin participating in the current drag
    fn start(&mut self);
    fn stop(&mut self);
    fn repaint(&mut self, state: &DropZoneState);
}

/// Creates the painter of a monitor the first time it's needed
pub type PainterFactory = Box<dyn FnMut(&Screen) -> Box<dyn DropZonePainter>>;
