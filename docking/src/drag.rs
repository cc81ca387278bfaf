//! Drag session state machine
//!
//! A press on a title region starts tracking; moving further than the start
//! distance turns it into a drag that shows the ghost and the drop zones. The
//! release either docks the pane on the hovered drop zone or floats it at the
//! placeholder rectangle.

use crate::geometry::{Point, Rect};
use crate::manager::{Deferred, DockManager};
use crate::pane::{ContainerId, DockArea, DropTarget, PaneGrab, PaneId};
use crate::screens::{adjust_rect_for_dpi, ScreenId};
use crate::snapping::SnapSides;
use crate::substrate::DockSubstrate;
use tracing::{debug, info, trace, warn};
use winit::event::MouseButton;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// Pointer is down on a title region but hasn't moved far enough
    Pressed,
    Dragging,
    /// Released over a drop zone; the dock is applied on the next pump
    Committing,
}

/// Ephemeral state of one press, move and release cycle
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Pane whose geometry anchors the drag (the tab group host for tab drags)
    pub dock: PaneId,
    /// Pane that actually moves (the tab when a single tab is dragged)
    pub dragged: PaneId,
    pub tab_host: Option<PaneId>,
    pub tab_index: Option<usize>,
    /// Set when the drag started on the title bar of a floating container
    pub floating_container: Option<ContainerId>,
    /// A whole tab group is being dragged
    pub whole_group: bool,
    /// Press position relative to `dock`
    pub press_pos: Point,
    /// Global geometry of `dock` at press time
    pub dock_rect: Rect,
    pub snapped: SnapSides,
    pub placeholder: Rect,
    pub placeholder_screen: Option<ScreenId>,
    pub grab: PaneGrab,
    pub(crate) content_swapped: bool,
    pub(crate) hidden_container: Option<ContainerId>,
    pub(crate) committing: bool,
}

impl DragSession {
    fn new(dock: PaneId, dragged: PaneId, press_pos: Point, dock_rect: Rect, grab: PaneGrab) -> Self {
        Self {
            dock,
            dragged,
            tab_host: None,
            tab_index: None,
            floating_container: None,
            whole_group: false,
            press_pos,
            dock_rect,
            snapped: SnapSides::empty(),
            placeholder: Rect::default(),
            placeholder_screen: None,
            grab,
            content_swapped: false,
            hidden_container: None,
            committing: false,
        }
    }

    /// A single tab is being pulled out of its group
    pub fn is_single_tab(&self) -> bool {
        self.tab_host.is_some() && !self.whole_group
    }
}

impl<S: DockSubstrate> DockManager<S> {
    /// Pointer pressed on a pane; starts tracking if it hit the title region
    pub(crate) fn press_pane(&mut self, pane: &PaneId, local: Point, _global: Point) -> bool {
        let in_title = self
            .substrate
            .title_region(pane)
            .is_some_and(|title| title.contains(local));
        if !in_title {
            return false;
        }
        if self.session.is_some() {
            warn!(pane = %pane, "Press event without a release of the previous one");
            return true;
        }

        if !self.start_dragging(pane.clone(), local, None, None, None) {
            return false;
        }
        // Shown right away so there's no delay once the drag starts
        self.ghost.show();
        true
    }

    /// Pointer pressed on the title bar of a floating container
    pub(crate) fn press_container_title(&mut self, container: &ContainerId, local: Point, _global: Point) -> bool {
        if !self.is_floating(container) || self.container_drags_window(container) {
            return false;
        }
        if self.session.is_some() {
            warn!(container = %container, "Press event without a release of the previous one");
            return true;
        }

        let Some(child) = self
            .substrate
            .container_panes(container)
            .into_iter()
            .find(|pane| self.substrate.is_pane_visible(pane))
        else {
            return false;
        };

        // Keep the child where it is relative to the pointer
        let press_pos = Point::new(local.x, local.y - self.substrate.title_bar_height());
        if !self.start_dragging(child, press_pos, None, None, Some(container.clone())) {
            return false;
        }
        self.ghost.show();
        true
    }

    /// Pointer pressed on a tab group; `index` is `None` outside any tab
    pub(crate) fn press_tab(&mut self, host: &PaneId, index: Option<usize>, global: Point) -> bool {
        if !self.tab_groups.contains_key(host) {
            return false;
        }
        if self.session.is_some() {
            warn!(host = %host, "Press event without a release of the previous one");
            return true;
        }
        let Some(host_rect) = self.substrate.pane_geometry(host) else {
            return false;
        };

        let press_pos = global - host_rect.top_left();
        if !self.start_dragging(host.clone(), press_pos, Some(host.clone()), index, None) {
            return false;
        }

        // The tab bar would swallow the following events otherwise
        self.substrate.grab_input();
        true
    }

    fn start_dragging(
        &mut self,
        dock: PaneId,
        press_pos: Point,
        tab_host: Option<PaneId>,
        tab_index: Option<usize>,
        floating_container: Option<ContainerId>,
    ) -> bool {
        let Some(dock_rect) = self.substrate.pane_geometry(&dock) else {
            warn!(pane = %dock, "Can't drag a pane without geometry");
            return false;
        };

        let dragged = match (&tab_host, tab_index) {
            (Some(host), Some(index)) => self
                .tab_groups
                .get(host)
                .and_then(|group| group.tabs.get(index).cloned())
                .unwrap_or_else(|| dock.clone()),
            _ => dock.clone(),
        };

        let grab = self
            .last_floating
            .get(&dragged)
            .cloned()
            .or_else(|| self.substrate.grab_pane(&dragged))
            .unwrap_or_else(|| PaneGrab::new(dock_rect.size()));

        self.substrate.set_drag_cursor(true);

        let mut session = DragSession::new(dock, dragged, press_pos, dock_rect, grab);
        session.whole_group = tab_host.is_some() && tab_index.is_none();
        session.tab_host = tab_host;
        session.tab_index = tab_index;
        session.floating_container = floating_container;

        debug!(pane = %session.dragged, press = ?press_pos, "Tracking press");
        self.session = Some(session);
        self.drop_zones.set_dragging(false);
        self.setup_drop_zones(None, Point::ZERO);
        true
    }

    /// Decide whether the drag has started and, if so, update targets and
    /// the placeholder
    pub(crate) fn on_pointer_moved(&mut self, global: Point) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if session.committing {
            return false;
        }

        if !self.drop_zones.dragging() {
            let mut difference = global - (session.dock_rect.top_left() + session.press_pos);
            if session.floating_container.is_some() {
                difference.y += self.substrate.title_bar_height();
            }
            let mut should_start = difference.x.abs() + difference.y.abs() > self.config.start_drag_distance;

            // Tabs are only ripped out once the pointer leaves the tab bar
            if let Some(host) = &session.tab_host {
                let tab_count = self.tab_groups.get(host).map_or(0, |group| group.tabs.len());
                if tab_count > 1 {
                    should_start = !self
                        .substrate
                        .tab_bar_rect(host)
                        .is_some_and(|bar| bar.contains(global));
                    if !should_start {
                        return true;
                    }
                }
            }

            if !should_start {
                return false;
            }
            self.begin_drag();
        }

        self.update_drag(global);
        self.drop_zones.dragging()
    }

    /// Pressed becomes Dragging
    fn begin_drag(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let dock = session.dock.clone();
        let dragged = session.dragged.clone();
        let single_tab = session.is_single_tab();
        let tab_count = session
            .tab_host
            .as_ref()
            .and_then(|host| self.tab_groups.get(host))
            .map_or(1, |group| group.tabs.len());

        self.ghost.show();
        self.substrate.grab_input();

        // Hide a floating container whose only visible content is being dragged
        let primary = self.substrate.primary_container();
        let mut hidden_container = None;
        if let Some(container) = self.substrate.pane_container(&dock) {
            if container != primary && self.substrate.container_exists(&container) {
                let visible: usize = self
                    .substrate
                    .container_panes(&container)
                    .iter()
                    .filter(|pane| self.substrate.is_pane_visible(pane))
                    .map(|pane| if *pane == dock && single_tab { tab_count } else { 1 })
                    .sum();
                if visible == 1 {
                    self.substrate.show_normal(&container);
                    self.substrate.set_container_visible(&container, false);
                    hidden_container = Some(container);
                }
            }
        }

        let content_swapped = hidden_container.is_none();
        if content_swapped {
            self.substrate.set_content_placeholder(&dragged, true);
        }

        if let Some(session) = &mut self.session {
            session.hidden_container = hidden_container;
            session.content_swapped = content_swapped;
        }
        self.drop_zones.set_dragging(true);
        info!(pane = %dragged, "Started dragging pane");
    }

    fn update_drag(&mut self, global: Point) {
        let Some(session) = &self.session else {
            return;
        };
        let dock = session.dock.clone();
        let dragged = session.dragged.clone();
        let press_pos = session.press_pos;
        let dock_rect = session.dock_rect;
        let cached_size = session.grab.size;

        if !self.substrate.pane_allowed_areas(&dock).is_floating_only() {
            let target = self.drop_target_under_cursor(global, &dock);
            self.setup_drop_zones(target, global);

            let previous_on_absolute = self.drop_zones.on_absolute();
            let area = self.drop_area_for_pos(global);

            // Entering a new area fades it in again; it's inactive until fully opaque
            if area.is_some()
                && (area != self.drop_zones.drop_area()
                    || previous_on_absolute != self.drop_zones.on_absolute())
            {
                self.restart_hover_fade();
            }

            self.set_ghost_clipping(area);
            self.drop_zones.set_drop_area(area);
        } else {
            self.drop_zones.set_drop_area(None);
        }

        let mut placeholder = Rect::from_origin_size(global - press_pos, dock_rect.size());

        // Restore the cached floating size, keeping the pointer at the same
        // relative horizontal position
        if self.last_floating.contains_key(&dragged) && dock_rect.width > 0 {
            let relative_x =
                (press_pos.x as f32 / dock_rect.width as f32 * cached_size.width as f32) as i32;
            placeholder = placeholder.with_size(cached_size);
            placeholder.x += press_pos.x - relative_x;
        }

        let Some(screen) = self.screens.screen_at(global).copied() else {
            return;
        };
        let snapped = self.adjust_for_snapping(&mut placeholder, Some(&screen));
        if let Some(session) = &mut self.session {
            session.snapped = snapped;
            session.placeholder = placeholder;
            session.placeholder_screen = Some(screen.id);
        }
        trace!(placeholder = ?placeholder, area = ?self.drop_zones.drop_area(), "Drag moved");

        self.ghost.enable();
        self.repaint_floating_indicators();
    }

    pub(crate) fn on_pointer_released(&mut self, _global: Point, button: MouseButton) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if button != MouseButton::Left {
            return false;
        }
        if session.committing {
            return true;
        }

        if self.drop_zones.dragging() {
            let mut area = self.drop_zones.drop_area();
            // An area that hasn't faded in yet, or a held modifier, floats the pane
            if self.docking_disabled_by_modifier() || !self.drop_zone_ready() {
                area = None;
            }
            self.drop_pane(area);
        } else {
            self.clear_dragging_state();
        }
        true
    }

    /// Float the dragged pane (`area` is `None`) or schedule its dock
    ///
    /// Ends the session, immediately when floating and on the next pump when
    /// docking.
    pub(crate) fn drop_pane(&mut self, area: Option<DockArea>) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let pane = session.dragged.clone();

        // A single tab leaves its group before going anywhere else
        if session.is_single_tab() {
            self.last_tab_group.remove(&pane);
            self.untabify(&pane);
        }

        let target = self.drop_zones.target().cloned();
        match (area, target) {
            (Some(area), Some(onto)) => {
                if self.is_single_floating_child(&pane) {
                    self.last_floating.insert(pane.clone(), session.grab.clone());
                }
                let on_absolute = self.drop_zones.on_absolute();
                if let Some(session) = &mut self.session {
                    session.committing = true;
                }
                debug!(pane = %pane, onto = ?onto, area = ?area, "Dropping pane");
                self.defer(Deferred::CommitDrop {
                    pane,
                    onto,
                    area,
                    on_absolute,
                });
            }
            _ => {
                let rect = self.float_rect_for_drop(&session);
                self.make_floating(&pane, rect);
                self.clear_dragging_state();
                self.last_floating.remove(&pane);
                info!(pane = %pane, rect = ?rect, "Floated pane");
            }
        }
    }

    /// Floating frame geometry for the current placeholder
    ///
    /// Snapped sides are compensated for the window frame margins and the
    /// title bar is added on top unless the top edge snapped.
    pub(crate) fn float_rect_for_drop(&self, session: &DragSession) -> Rect {
        let mut rect = session.placeholder;
        let margins = self.substrate.frame_margins();
        let snapped = session.snapped;

        if snapped.contains(SnapSides::LEFT) {
            rect.x += margins.left;
        }
        if snapped.contains(SnapSides::RIGHT) {
            rect.x -= margins.right;
        }
        if snapped.contains(SnapSides::TOP) {
            rect.y += margins.top;
        } else {
            let offset = self.substrate.title_bar_height();
            rect.y -= offset;
            rect.height += offset;
        }
        if snapped.contains(SnapSides::BOTTOM) {
            rect.y -= margins.bottom;
        }

        let from = self.screens.screen_at(session.dock_rect.top_left()).copied();
        let to = self.screens.screen_at(rect.top_left()).copied();
        if let (Some(from), Some(to)) = (from, to) {
            if from.id != to.id {
                rect = adjust_rect_for_dpi(rect, from.scale_factor, to.scale_factor);
            }
        }
        rect
    }

    /// Apply a scheduled dock drop
    pub(crate) fn commit_drop(&mut self, pane: &PaneId, onto: &DropTarget, area: DockArea, on_absolute: bool) {
        if !self.substrate.pane_exists(pane) {
            self.clear_dragging_state();
            return;
        }
        self.substrate.set_pane_visible(pane, true);

        let primary = self.substrate.primary_container();
        let mut container = match onto {
            DropTarget::Container(container) => Some(container.clone()),
            DropTarget::Pane(_) => None,
        };

        if on_absolute {
            let absolute = container
                .clone()
                .or_else(|| self.target_container(onto))
                .unwrap_or_else(|| primary.clone());
            self.set_absolute_corners(&absolute, area);
            container = Some(absolute);
        }

        match (container, onto) {
            (Some(container), _) => {
                if self.substrate.container_exists(&container) {
                    self.substrate.remove_pane(pane);
                    self.substrate.add_pane(&container, pane, area);
                } else {
                    self.float_at_placeholder(pane);
                }
            }
            (None, DropTarget::Pane(target)) => {
                if !self.substrate.pane_exists(target) || self.substrate.pane_container(target).is_none() {
                    // The target went away with the group the pane was torn from
                    self.float_at_placeholder(pane);
                } else if area == DockArea::Tab {
                    let grab = self.session.as_ref().map(|session| session.grab.clone());
                    self.tabify(target, pane, grab.as_ref());
                } else {
                    let orientation = area.orientation();
                    self.split_panes(target, pane, orientation);
                    if matches!(area, DockArea::Left | DockArea::Top) {
                        // The first split puts the pane in the right area, the
                        // second one in the right order
                        self.split_panes(pane, target, orientation);
                    }
                }
            }
            (None, DropTarget::Container(_)) => {}
        }

        info!(pane = %pane, area = ?area, absolute = on_absolute, "Docked pane");
        self.clear_dragging_state();
    }

    fn float_at_placeholder(&mut self, pane: &PaneId) {
        let rect = match &self.session {
            Some(session) => self.float_rect_for_drop(session),
            None => self.substrate.pane_geometry(pane).unwrap_or_default(),
        };
        self.make_floating(pane, rect);
    }

    /// Reserve both corners of an edge for panes docked on the absolute zone
    fn set_absolute_corners(&mut self, container: &ContainerId, area: DockArea) {
        let Some(corners) = area.corners() else {
            return;
        };
        for corner in corners {
            self.substrate.set_corner(container, corner, area);
        }
    }

    /// Reset every transient piece of drag state
    pub(crate) fn clear_dragging_state(&mut self) {
        self.substrate.set_drag_cursor(false);
        self.ghost.hide();
        self.substrate.release_input();

        if let Some(session) = self.session.take() {
            if session.content_swapped && self.substrate.pane_exists(&session.dragged) {
                self.substrate.set_content_placeholder(&session.dragged, false);
            }
            if let Some(container) = &session.hidden_container {
                if self.substrate.container_exists(container) && !self.substrate.is_container_visible(container) {
                    self.substrate.set_container_visible(container, true);
                }
            }
        }

        self.drop_zones.set_dragging(false);
        self.drop_zones.set_drop_area(None);
        self.drop_zones.set_hover_opacity(0.0);
        self.fade_active = false;
        self.stop_drop_zone();
        self.setup_drop_zones(None, Point::ZERO);
        self.ghost.disable();
    }

    /// Float a pane without dragging it, offset by the title bar height
    pub fn undock_pane(&mut self, pane: &PaneId) {
        if self.session.is_some() {
            warn!(pane = %pane, "Ignoring undock request during a drag");
            return;
        }
        let offset = self.substrate.title_bar_height();
        let Some(rect) = self.substrate.pane_geometry(pane) else {
            return;
        };

        let position = rect.top_left() + Point::new(offset, offset);
        self.undock_with_placeholder(pane.clone(), pane.clone(), Rect::from_origin_size(position, rect.size()), None);
    }

    /// Float one tab of a group, or the whole group when `index` is `None`
    pub fn undock_tab(&mut self, host: &PaneId, index: Option<usize>) {
        if self.session.is_some() {
            warn!(host = %host, "Ignoring undock request during a drag");
            return;
        }
        let Some(group) = self.tab_groups.get(host) else {
            return;
        };
        let pane = match index {
            Some(index) => match group.tabs.get(index) {
                Some(pane) => pane.clone(),
                None => return,
            },
            None => host.clone(),
        };
        let Some(host_rect) = self.substrate.pane_geometry(host) else {
            return;
        };

        let offset = self.substrate.title_bar_height();
        let position = host_rect.top_left() + Point::new(offset, offset);
        let tab_host = index.map(|_| host.clone());
        self.undock_with_placeholder(
            host.clone(),
            pane,
            Rect::from_origin_size(position, host_rect.size()),
            tab_host,
        );
    }

    fn undock_with_placeholder(&mut self, dock: PaneId, pane: PaneId, placeholder: Rect, tab_host: Option<PaneId>) {
        let grab = self
            .last_floating
            .get(&pane)
            .cloned()
            .unwrap_or_else(|| PaneGrab::new(placeholder.size()));
        let dock_rect = self.substrate.pane_geometry(&dock).unwrap_or(placeholder);

        let mut session = DragSession::new(dock, pane.clone(), Point::ZERO, dock_rect, grab);
        session.tab_host = tab_host;
        session.placeholder = placeholder;
        session.placeholder_screen = self.screens.screen_at(placeholder.top_left()).map(|screen| screen.id);
        self.session = Some(session);

        debug!(pane = %pane, placeholder = ?placeholder, "Undocking pane");
        self.drop_pane(None);
    }
}
