//! Pane, container and placement vocabulary
//!
//! Panes and containers are identified by their stable names, which is also
//! what the persisted layout refers to.

use crate::geometry::Size;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a pane
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaneId(pub String);

impl PaneId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a container (the primary window or a floating window)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a dropped pane lands relative to its target
///
/// The declaration order is the order in which drop zones are hit-tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DockArea {
    /// Split to the left of the target
    Left,
    /// Split to the right of the target
    Right,
    /// Split above the target
    Top,
    /// Split below the target
    Bottom,
    /// Join the target as a tab
    Tab,
}

impl DockArea {
    pub const EDGES: [DockArea; 4] = [DockArea::Left, DockArea::Right, DockArea::Top, DockArea::Bottom];

    pub fn is_edge(&self) -> bool {
        !matches!(self, DockArea::Tab)
    }

    /// Split orientation used when docking on this area
    pub fn orientation(&self) -> Orientation {
        match self {
            DockArea::Left | DockArea::Right => Orientation::Horizontal,
            DockArea::Top | DockArea::Bottom | DockArea::Tab => Orientation::Vertical,
        }
    }

    /// The two container corners claimed by an absolute drop on this edge
    pub fn corners(&self) -> Option<[Corner; 2]> {
        match self {
            DockArea::Left => Some([Corner::TopLeft, Corner::BottomLeft]),
            DockArea::Right => Some([Corner::TopRight, Corner::BottomRight]),
            DockArea::Top => Some([Corner::TopLeft, Corner::TopRight]),
            DockArea::Bottom => Some([Corner::BottomLeft, Corner::BottomRight]),
            DockArea::Tab => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

bitflags! {
    /// Edges a pane may be docked to
    ///
    /// An empty set marks a floating-only pane.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AllowedAreas: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl AllowedAreas {
    pub fn is_floating_only(&self) -> bool {
        self.is_empty()
    }
}

bitflags! {
    /// Window controls shown on a title bar
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TitleBarButtons: u8 {
        const MINIMIZE = 1 << 0;
        const MAXIMIZE = 1 << 1;
        const CLOSE = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleBarDrawMode {
    Hidden,
    #[default]
    Simple,
}

/// Whose title bar is being addressed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TitleBarOwner {
    Pane(PaneId),
    Container(ContainerId),
}

/// Candidate widget a dragged pane can be dropped on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Pane(PaneId),
    Container(ContainerId),
}

/// Which kind of container currently hosts a pane
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Hosting {
    Primary,
    Floating(ContainerId),
    Tabbed { group: PaneId, container: ContainerId },
}

/// Screen grab of a pane taken when a drag starts
///
/// The size doubles as the pane's "last floating size" when cached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaneGrab {
    pub size: Size,
    /// Opaque image data handed to the ghost visual
    pub image: Vec<u8>,
}

impl PaneGrab {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            image: Vec::new(),
        }
    }
}
