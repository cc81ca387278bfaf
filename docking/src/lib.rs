//! Docking window overlay manager
//!
//! This crate lets users drag panes between floating windows, tab groups and
//! split regions of a primary window across monitors with different scale
//! factors, and persists the resulting layout. Windowing, painting and title
//! bars are provided by the host through the traits in [`substrate`].

pub mod config;
pub mod drag;
pub mod drop_zone;
pub mod error;
pub mod floating;
pub mod geometry;
pub mod headless;
pub mod input;
pub mod manager;
pub mod pane;
pub mod persistence;
pub mod resolver;
pub mod screens;
pub mod snapping;
pub mod substrate;
pub mod tabs;
pub mod zorder;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::DockingConfig;
    pub use crate::drag::{DragPhase, DragSession};
    pub use crate::drop_zone::{AbsoluteZone, DropZoneState};
    pub use crate::error::{DockError, DockResult};
    pub use crate::geometry::{Margins, Point, Polygon, Rect, Size};
    pub use crate::input::{DisableDockingModifier, DockEvent};
    pub use crate::manager::DockManager;
    pub use crate::pane::{
        AllowedAreas, ContainerId, DockArea, DropTarget, Hosting, Orientation, PaneGrab, PaneId,
    };
    pub use crate::persistence::{PersistedLayout, LAYOUT_VERSION};
    pub use crate::screens::{Screen, ScreenId, ScreenLayout};
    pub use crate::snapping::SnapSides;
    pub use crate::substrate::{DockSubstrate, DropZonePainter, GhostVisual, Notification, TitleBar};
    pub use crate::tabs::TabGroup;

    pub use winit;
}

/// Initialize logging for the docking engine
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
