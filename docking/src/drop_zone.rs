//! Drop zone geometry
//!
//! A pane under the pointer exposes five relative drop zones: four
//! trapezoids with their long side on the pane edges and a circle in the
//! middle for docking as a tab. The outer edges of a container additionally
//! expose absolute zones that dock along the whole container edge.
//!
//! ```text
//!  _______________________
//! |\                     /|
//! | \        top        / |
//! |  \_________________/  |
//! |   |               |   |
//! |left|     (tab)    |right
//! |   |_______________|   |
//! |  /      bottom     \  |
//! |/_____________________\|
//! ```

use crate::config::DockingConfig;
use crate::geometry::{Point, Polygon, Rect};
use crate::manager::DockManager;
use crate::pane::{DockArea, DropTarget};
use crate::substrate::DockSubstrate;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Edge strip of a container that docks along the whole container edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteZone {
    pub area: DockArea,
    pub rect: Rect,
}

/// Shared description of the drop zones of the current drag
///
/// Painters receive it by reference on every repaint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropZoneState {
    target: Option<DropTarget>,
    zones: BTreeMap<DockArea, Polygon>,
    dock_rect: Rect,
    inner_rect: Rect,
    absolute: Option<AbsoluteZone>,
    hover_opacity: f32,
    on_absolute: bool,
    drop_area: Option<DockArea>,
    dragging: bool,
}

impl DropZoneState {
    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    /// Relative zone shapes keyed by area; the tab zone is stored as the
    /// square bounding its circle
    pub fn zones(&self) -> &BTreeMap<DockArea, Polygon> {
        &self.zones
    }

    pub fn has_zones(&self) -> bool {
        !self.zones.is_empty()
    }

    /// Target rectangle after making room for the absolute zone
    pub fn dock_rect(&self) -> Rect {
        self.dock_rect
    }

    pub fn inner_rect(&self) -> Rect {
        self.inner_rect
    }

    pub fn absolute(&self) -> Option<AbsoluteZone> {
        self.absolute
    }

    pub fn hover_opacity(&self) -> f32 {
        self.hover_opacity
    }

    pub fn on_absolute(&self) -> bool {
        self.on_absolute
    }

    /// Area currently hovered, if any
    pub fn drop_area(&self) -> Option<DockArea> {
        self.drop_area
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    pub(crate) fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub(crate) fn set_drop_area(&mut self, area: Option<DockArea>) {
        self.drop_area = area;
    }

    pub(crate) fn set_hover_opacity(&mut self, opacity: f32) {
        self.hover_opacity = opacity;
    }

    fn clear_absolute(&mut self) {
        self.absolute = None;
    }

    /// Forget the target and every zone
    pub(crate) fn reset(&mut self) {
        self.target = None;
        self.zones.clear();
        self.dock_rect = Rect::default();
        self.inner_rect = Rect::default();
        self.absolute = None;
    }

    /// Hit-test the zones, absolute zone first
    ///
    /// Returns the area under `point` and whether it is the absolute zone.
    pub fn area_at(&self, point: Point) -> Option<(DockArea, bool)> {
        self.target.as_ref()?;

        if let Some(absolute) = self.absolute {
            if absolute.rect.contains(point) {
                return Some((absolute.area, true));
            }
        }

        for (area, shape) in &self.zones {
            let hit = match area {
                DockArea::Tab => shape.bounding_rect().ellipse_contains(point),
                _ => shape.contains(point),
            };
            if hit {
                return Some((*area, false));
            }
        }
        None
    }
}

/// Relative zones computed for one target rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeZones {
    pub zones: BTreeMap<DockArea, Polygon>,
    pub inner: Rect,
}

/// Compute the trapezoid and tab zones of a target rectangle
pub fn relative_drop_zones(dock_rect: Rect, config: &DockingConfig) -> RelativeZones {
    let zone_width = config.zone_extent(dock_rect.width);
    let zone_height = config.zone_extent(dock_rect.height);

    let top_left = dock_rect.top_left();
    let top_right = dock_rect.top_right();
    let bottom_left = dock_rect.bottom_left();
    let bottom_right = dock_rect.bottom_right();

    let inner_top_left = Point::new(top_left.x + zone_width, top_left.y + zone_height);
    let inner_top_right = Point::new(top_right.x - zone_width, top_left.y + zone_height);
    let inner_bottom_left = Point::new(top_left.x + zone_width, bottom_left.y - zone_height);
    let inner_bottom_right = Point::new(top_right.x - zone_width, bottom_left.y - zone_height);
    let inner = Rect::from_corners(inner_top_left, inner_bottom_right);

    let mut zones = BTreeMap::new();
    if !config.force_tabbed_docks {
        zones.insert(
            DockArea::Left,
            Polygon::new(vec![top_left, inner_top_left, inner_bottom_left, bottom_left]),
        );
        zones.insert(
            DockArea::Right,
            Polygon::new(vec![top_right, bottom_right, inner_bottom_right, inner_top_right]),
        );
        zones.insert(
            DockArea::Top,
            Polygon::new(vec![top_left, top_right, inner_top_right, inner_top_left]),
        );
        zones.insert(
            DockArea::Bottom,
            Polygon::new(vec![bottom_left, inner_bottom_left, inner_bottom_right, bottom_right]),
        );
    }

    let diameter = (inner.width.min(inner.height) as f32 * config.center_tab_zone_scale) as i32;
    let center = inner.center();
    let tab_rect = Rect::new(
        center.x - diameter / 2,
        center.y - diameter / 2,
        diameter,
        diameter,
    );
    zones.insert(DockArea::Tab, Polygon::from_rect(tab_rect));

    RelativeZones { zones, inner }
}

/// The four absolute strips along the edges of a container, in hit order
pub fn absolute_drop_zones(container: Rect, thickness: i32) -> [AbsoluteZone; 4] {
    let left = Rect::new(container.x, container.y, thickness, container.height);
    let right = Rect::new(container.right() - thickness, container.y, thickness, container.height);
    let top = Rect::new(container.x, container.y, container.width, thickness);
    let bottom = Rect::new(container.x, container.bottom() - thickness, container.width, thickness);
    [
        AbsoluteZone { area: DockArea::Left, rect: left },
        AbsoluteZone { area: DockArea::Right, rect: right },
        AbsoluteZone { area: DockArea::Top, rect: top },
        AbsoluteZone { area: DockArea::Bottom, rect: bottom },
    ]
}

/// Shrink a target rectangle on the side reserved by an absolute zone
pub fn shrink_for_absolute(rect: Rect, area: DockArea, thickness: i32) -> Rect {
    let mut rect = rect;
    match area {
        DockArea::Left => {
            rect.x += thickness;
            rect.width -= thickness;
        }
        DockArea::Right => rect.width -= thickness,
        DockArea::Top => {
            rect.y += thickness;
            rect.height -= thickness;
        }
        DockArea::Bottom => rect.height -= thickness,
        DockArea::Tab => {}
    }
    rect
}

impl<S: DockSubstrate> DockManager<S> {
    /// Absolute zone the target exposes for the current pointer position
    ///
    /// A container target shows it only while the pointer is inside the
    /// strip. A pane target shows it once its hovered edge zone lies on the
    /// container edge.
    pub(crate) fn absolute_drop_zone(&self, target: &DropTarget, global: Point) -> Option<AbsoluteZone> {
        if self.config.force_tabbed_docks {
            return None;
        }

        let container = self.target_container(target)?;

        // A pane can't be docked absolutely into its own container when only
        // one other pane lives there
        if container != self.substrate.primary_container() {
            if let Some(session) = &self.session {
                let children = self.substrate.container_panes(&container);
                if children.len() <= 2 && children.contains(&session.dock) {
                    return None;
                }
            }
        }

        let container_rect = self.substrate.container_geometry(&container)?;
        let zones = absolute_drop_zones(container_rect, self.config.absolute_drop_zone_size);

        match target {
            DropTarget::Container(_) => zones.into_iter().find(|zone| zone.rect.contains(global)),
            DropTarget::Pane(pane) => {
                let pane_rect = self.substrate.pane_geometry(pane)?;
                let area = self.drop_zones.drop_area()?;
                let shares_edge = match area {
                    DockArea::Left => pane_rect.left() == container_rect.left(),
                    DockArea::Right => pane_rect.right() == container_rect.right(),
                    DockArea::Top => pane_rect.top() == container_rect.top(),
                    DockArea::Bottom => pane_rect.bottom() == container_rect.bottom(),
                    DockArea::Tab => false,
                };
                if shares_edge {
                    zones.into_iter().find(|zone| zone.area == area)
                } else {
                    None
                }
            }
        }
    }

    /// Recompute the drop zones for the target under the pointer
    ///
    /// Returns early whenever the target and hovered area are unchanged.
    pub(crate) fn setup_drop_zones(&mut self, target: Option<DropTarget>, global: Point) {
        let Some(target) = target else {
            self.drop_zones.reset();
            return;
        };

        if self.drop_zones.target() == Some(&target) {
            match &target {
                DropTarget::Container(_) => {
                    if self.drop_zones.on_absolute() {
                        return;
                    }
                    self.drop_zones.absolute = self.absolute_drop_zone(&target, global);
                }
                DropTarget::Pane(_) => match self.drop_zones.drop_area() {
                    None | Some(DockArea::Tab) => {
                        if self.drop_zones.absolute.is_some() {
                            self.drop_zones.clear_absolute();
                        } else {
                            return;
                        }
                    }
                    Some(area) => {
                        if self.drop_zones.absolute.map(|zone| zone.area) == Some(area) {
                            return;
                        }
                        match self.absolute_drop_zone(&target, global) {
                            Some(zone) => self.drop_zones.absolute = Some(zone),
                            None if self.drop_zones.absolute.is_none() => return,
                            None => self.drop_zones.clear_absolute(),
                        }
                    }
                },
            }
        } else {
            self.drop_zones.clear_absolute();
        }

        trace!(target = ?target, "Recomputing drop zones");
        self.drop_zones.target = Some(target.clone());
        self.drop_zones.zones.clear();
        self.drop_zones.inner_rect = Rect::default();
        self.start_drop_zone(global);

        let DropTarget::Pane(pane) = &target else {
            self.raise_drop_target();
            return;
        };
        let Some(mut dock_rect) = self.substrate.pane_geometry(pane) else {
            return;
        };

        if let Some(zone) = self.drop_zones.absolute {
            dock_rect = shrink_for_absolute(dock_rect, zone.area, self.config.absolute_drop_zone_size);
        }

        let relative = relative_drop_zones(dock_rect, &self.config);
        self.drop_zones.dock_rect = dock_rect;
        self.drop_zones.inner_rect = relative.inner;
        self.drop_zones.zones = relative.zones;

        self.raise_drop_target();
    }

    /// Hit-test the current zones and record whether the absolute zone is hovered
    pub(crate) fn drop_area_for_pos(&mut self, global: Point) -> Option<DockArea> {
        self.drop_zones.on_absolute = false;
        let (area, on_absolute) = self.drop_zones.area_at(global)?;
        self.drop_zones.on_absolute = on_absolute;
        Some(area)
    }

    /// Bring the floating container of the drop target to the front so the
    /// zones aren't hidden behind it
    fn raise_drop_target(&mut self) {
        let Some(target) = self.drop_zones.target().cloned() else {
            return;
        };
        let Some(container) = self.target_container(&target) else {
            return;
        };
        if container != self.substrate.primary_container() {
            self.substrate.raise_container(&container);
            self.floating_order.raise(&container);
        }
    }

    /// Start the painters of every screen the target touches and stop the rest
    pub(crate) fn start_drop_zone(&mut self, global: Point) {
        let target_rect = self
            .drop_zones
            .target()
            .and_then(|target| self.target_geometry(target));

        let mut wanted: Vec<_> = match target_rect {
            Some(rect) => self
                .screens
                .screens_intersecting(&rect)
                .into_iter()
                .copied()
                .collect(),
            None => Vec::new(),
        };
        if wanted.is_empty() {
            wanted.extend(
                self.screens
                    .screens()
                    .iter()
                    .find(|screen| screen.geometry.contains(global))
                    .copied(),
            );
        }

        let previously_active = std::mem::take(&mut self.active_painters);
        for screen_id in previously_active {
            if wanted.iter().any(|screen| screen.id == screen_id) {
                wanted.retain(|screen| screen.id != screen_id);
                self.active_painters.push(screen_id);
            } else if let Some(painter) = self.painters.get_mut(&screen_id) {
                painter.stop();
            }
        }

        for screen in wanted {
            let factory = &mut self.painter_factory;
            let painter = self
                .painters
                .entry(screen.id)
                .or_insert_with(|| factory(&screen));
            painter.start();
            self.active_painters.push(screen.id);
            debug!(screen = ?screen.id, "Started drop zone painter");
        }
    }

    pub(crate) fn stop_drop_zone(&mut self) {
        for screen_id in std::mem::take(&mut self.active_painters) {
            if let Some(painter) = self.painters.get_mut(&screen_id) {
                painter.repaint(&self.drop_zones);
                painter.stop();
            }
        }
    }

    pub(crate) fn repaint_drop_zones(&mut self) {
        for screen_id in &self.active_painters {
            if let Some(painter) = self.painters.get_mut(screen_id) {
                painter.repaint(&self.drop_zones);
            }
        }
    }

    /// Reset the hover fade when a new area (or the absolute zone) is entered
    pub(crate) fn restart_hover_fade(&mut self) {
        self.drop_zones.set_hover_opacity(0.0);
        self.fade_active = true;
    }

    /// Fade timer tick; call every [`DockingConfig::fade_interval`]
    ///
    /// Returns `true` while the fade is still running.
    pub fn advance_drop_zone_fade(&mut self) -> bool {
        if !self.fade_active {
            return false;
        }

        let full = self.config.drop_zone_opacity;
        let opacity = self.drop_zones.hover_opacity() + self.config.drop_zone_fade_increment;
        if opacity >= full {
            self.drop_zones.set_hover_opacity(full);
            self.fade_active = false;
        } else {
            self.drop_zones.set_hover_opacity(opacity);
        }

        self.update_ghost();
        self.repaint_drop_zones();
        self.fade_active
    }

    /// Drop zones are fully faded in and can accept a drop
    pub(crate) fn drop_zone_ready(&self) -> bool {
        self.drop_zones.hover_opacity() >= self.config.drop_zone_opacity
    }

    /// Clip the ghost to panes only while hovering an area of the primary container
    pub(crate) fn set_ghost_clipping(&mut self, area: Option<DockArea>) {
        let in_primary = self
            .drop_zones
            .target()
            .and_then(|target| self.target_container(target))
            .is_some_and(|container| container == self.substrate.primary_container());

        if in_primary && area.is_some() {
            self.ghost.enable_clipping_to_panes();
        } else {
            self.ghost.disable_clipping_to_panes();
        }
    }
}
