//! Edge snapping for floating placeholders
//!
//! While a pane is dragged without an active drop zone its placeholder
//! snaps to nearby floating windows, then to screen edges and finally to
//! the primary window frame.

use crate::geometry::Rect;
use crate::manager::DockManager;
use crate::screens::Screen;
use crate::substrate::DockSubstrate;
use bitflags::bitflags;
use tracing::trace;

bitflags! {
    /// Sides of a placeholder that were snapped
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SnapSides: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

/// Snap `rect` to the edges of a screen
pub fn snap_to_screen_edges(rect: &mut Rect, screen: &Rect, threshold: i32) -> SnapSides {
    let mut snapped = SnapSides::empty();
    if !screen.is_valid() {
        return snapped;
    }

    if (rect.left() - screen.left()).abs() <= threshold {
        rect.move_left(screen.left());
        snapped |= SnapSides::LEFT;
    } else if (rect.right() - screen.right()).abs() <= threshold {
        rect.move_right(screen.right());
        snapped |= SnapSides::RIGHT;
    }

    if (rect.top() - screen.top()).abs() <= threshold {
        rect.move_top(screen.top());
        snapped |= SnapSides::TOP;
    } else if (rect.bottom() - screen.bottom()).abs() <= threshold {
        rect.move_bottom(screen.bottom());
        snapped |= SnapSides::BOTTOM;
    }

    snapped
}

/// Snap `rect` to the edges of another window
///
/// Adjacent edges (our left to their right, ...) snap when the perpendicular
/// spans overlap. Aligned edges (left to left, ...) snap only when `previous`,
/// the placeholder of the last move, already sits against the window on the
/// perpendicular axis, which lets a placeholder slide around a corner.
pub fn snap_to_window(rect: &mut Rect, window: &Rect, previous: &Rect, threshold: i32) -> SnapSides {
    let mut snapped = SnapSides::empty();

    let vertical_overlap = Rect::new(window.x, rect.y, window.width, rect.height).intersects(window);
    let against_top_or_bottom =
        previous.top() == window.bottom() || previous.bottom() == window.top();

    if (rect.left() - window.left()).abs() <= threshold && against_top_or_bottom {
        rect.move_left(window.left());
        snapped |= SnapSides::LEFT;
    } else if (rect.left() - window.right()).abs() <= threshold && vertical_overlap {
        rect.move_left(window.right());
        snapped |= SnapSides::LEFT;
    } else if (rect.right() - window.left()).abs() <= threshold && vertical_overlap {
        rect.move_right(window.left());
        snapped |= SnapSides::RIGHT;
    } else if (rect.right() - window.right()).abs() <= threshold && against_top_or_bottom {
        rect.move_right(window.right());
        snapped |= SnapSides::RIGHT;
    }

    let horizontal_overlap = Rect::new(rect.x, window.y, rect.width, window.height).intersects(window);
    let against_left_or_right =
        previous.left() == window.right() || previous.right() == window.left();

    if (rect.top() - window.top()).abs() <= threshold && against_left_or_right {
        rect.move_top(window.top());
        snapped |= SnapSides::TOP;
    } else if (rect.top() - window.bottom()).abs() <= threshold && horizontal_overlap {
        rect.move_top(window.bottom());
        snapped |= SnapSides::TOP;
    } else if (rect.bottom() - window.top()).abs() <= threshold && horizontal_overlap {
        rect.move_bottom(window.top());
        snapped |= SnapSides::BOTTOM;
    } else if (rect.bottom() - window.bottom()).abs() <= threshold && against_left_or_right {
        rect.move_bottom(window.bottom());
        snapped |= SnapSides::BOTTOM;
    }

    snapped
}

impl<S: DockSubstrate> DockManager<S> {
    /// Snap a candidate placeholder and return the sides that snapped
    ///
    /// Nothing snaps while a drop zone is shown or the docking-disable
    /// modifier is held.
    pub(crate) fn adjust_for_snapping(&self, rect: &mut Rect, cursor_screen: Option<&Screen>) -> SnapSides {
        if self.drop_zones.has_zones()
            || self.drop_zones.absolute().is_some()
            || self.docking_disabled_by_modifier()
        {
            return SnapSides::empty();
        }

        let threshold = self.config.snap_threshold;
        let previous = self
            .session
            .as_ref()
            .map(|session| session.placeholder)
            .unwrap_or_default();

        let mut snapped = SnapSides::empty();
        for container in self.floating_order.iter() {
            if !self.substrate.container_exists(container) || !self.substrate.is_container_visible(container) {
                continue;
            }
            if let Some(frame) = self.substrate.frame_geometry(container) {
                snapped |= snap_to_window(rect, &frame, &previous, threshold);
            }
        }
        if !snapped.is_empty() {
            trace!(sides = ?snapped, "Snapped to floating window");
            return snapped;
        }

        if let Some(screen) = cursor_screen {
            snapped = snap_to_screen_edges(rect, &screen.geometry, threshold);
            if !snapped.is_empty() {
                return snapped;
            }
        }

        for screen in self.screens.screens() {
            if cursor_screen.is_some_and(|cursor| cursor.id == screen.id) {
                continue;
            }
            snapped = snap_to_screen_edges(rect, &screen.geometry, threshold);
            if !snapped.is_empty() {
                return snapped;
            }
        }

        let primary = self.substrate.primary_container();
        if let Some(frame) = self.substrate.frame_geometry(&primary) {
            snapped = snap_to_window(rect, &frame, &previous, threshold);
        }
        snapped
    }
}
