//! Monitor layout and DPI helpers
//!
//! All geometry handled by the engine lives in one global coordinate space
//! spanning every monitor. Each [`Screen`] carries its own scale factor so a
//! rectangle that moves between monitors can be resized accordingly.

use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifier of a monitor as reported by the substrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenId(pub u32);

/// A single monitor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub id: ScreenId,
    /// Global geometry of the monitor in pixels
    pub geometry: Rect,
    /// The display scale factor (e.g., 2.0 for 200% scaling)
    pub scale_factor: f64,
}

impl Screen {
    pub fn new(id: u32, geometry: Rect, scale_factor: f64) -> Self {
        Self {
            id: ScreenId(id),
            geometry,
            scale_factor,
        }
    }
}

/// The set of monitors attached to the desktop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenLayout {
    screens: Vec<Screen>,
}

impl ScreenLayout {
    /// The first screen is treated as the primary one
    pub fn new(screens: Vec<Screen>) -> Self {
        Self { screens }
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn primary(&self) -> Option<&Screen> {
        self.screens.first()
    }

    pub fn get(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }

    /// Screen containing the point, falling back to the primary screen
    pub fn screen_at(&self, point: Point) -> Option<&Screen> {
        self.screens
            .iter()
            .find(|s| s.geometry.contains(point))
            .or_else(|| self.primary())
    }

    /// Every screen the rectangle touches
    pub fn screens_intersecting(&self, rect: &Rect) -> Vec<&Screen> {
        self.screens
            .iter()
            .filter(|s| s.geometry.intersects(rect))
            .collect()
    }
}

/// Resize a rectangle that moves from a screen with `source_scale` to one
/// with `target_scale`, keeping its top-left corner
pub fn adjust_rect_for_dpi(rect: Rect, source_scale: f64, target_scale: f64) -> Rect {
    if (source_scale - target_scale).abs() < 0.01 || target_scale <= 0.0 {
        return rect;
    }

    let ratio = source_scale / target_scale;
    let adjusted = rect.with_size(Size::new(
        (rect.width as f64 * ratio).round() as i32,
        (rect.height as f64 * ratio).round() as i32,
    ));
    debug!(
        from = source_scale,
        to = target_scale,
        width = adjusted.width,
        height = adjusted.height,
        "Adjusted floating rectangle for DPI change"
    );
    adjusted
}
