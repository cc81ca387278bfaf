//! Input events forwarded by the host to the docking engine

use crate::geometry::Point;
use crate::pane::{ContainerId, PaneId};
use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

/// Events the host forwards to [`DockManager::handle_event`](crate::manager::DockManager::handle_event)
///
/// All positions are global (virtual desktop) pixel coordinates unless the
/// field is named `local`, in which case it is relative to the pressed widget.
#[derive(Debug, Clone, PartialEq)]
pub enum DockEvent {
    /// Pointer pressed on a pane
    PanePressed {
        pane: PaneId,
        local: Point,
        global: Point,
        button: MouseButton,
    },
    /// Pointer pressed on the title bar of a floating container
    ContainerTitlePressed {
        container: ContainerId,
        local: Point,
        global: Point,
        button: MouseButton,
    },
    /// Pointer pressed on a tab group; `index` is `None` outside of any tab
    TabPressed {
        host: PaneId,
        index: Option<usize>,
        global: Point,
    },
    PointerMoved {
        global: Point,
    },
    PointerReleased {
        global: Point,
        button: MouseButton,
    },
    KeyPressed(KeyCode),
    KeyReleased(KeyCode),
    ModifiersChanged(ModifiersState),
    /// A modal dialog blocked the primary window
    WindowBlocked,
    /// Float a pane without dragging it
    UndockPane(PaneId),
    /// Float one tab (or the whole group when `index` is `None`)
    UndockTab {
        host: PaneId,
        index: Option<usize>,
    },
    /// Monitors were added, removed or changed geometry
    ScreensChanged,
}

/// Modifier that disables docking while held during a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisableDockingModifier {
    #[default]
    Control,
    Shift,
    Alt,
    Super,
    /// Docking can't be disabled from the keyboard
    Disabled,
}

impl DisableDockingModifier {
    /// Check if the modifier is held in the given modifier state
    pub fn is_held(&self, modifiers: ModifiersState) -> bool {
        match self {
            DisableDockingModifier::Control => modifiers.control_key(),
            DisableDockingModifier::Shift => modifiers.shift_key(),
            DisableDockingModifier::Alt => modifiers.alt_key(),
            DisableDockingModifier::Super => modifiers.super_key(),
            DisableDockingModifier::Disabled => false,
        }
    }
}
