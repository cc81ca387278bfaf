//! Shared setup for the docking integration tests

#![allow(dead_code)]

use docking::config::DockingConfig;
use docking::geometry::{Point, Rect};
use docking::headless::{recording_painters, GhostProbe, HeadlessSubstrate, PainterProbe, RecordingGhost};
use docking::input::DockEvent;
use docking::manager::DockManager;
use docking::pane::{ContainerId, PaneId};
use docking::screens::Screen;
use docking::substrate::DockSubstrate;
use winit::event::MouseButton;

pub struct Harness {
    pub manager: DockManager<HeadlessSubstrate>,
    pub ghost: GhostProbe,
    pub painters: PainterProbe,
}

impl Harness {
    /// Primary window on a single 1920x1080 screen with the given panes docked left to right
    pub fn new(panes: &[&str]) -> Self {
        Self::with_screens(vec![Screen::new(0, Rect::new(0, 0, 1920, 1080), 1.0)], panes)
    }

    pub fn with_screens(screens: Vec<Screen>, panes: &[&str]) -> Self {
        let _ = tracing_subscriber::fmt::try_init();

        let mut substrate = HeadlessSubstrate::new(screens);
        for name in panes {
            substrate.create_docked_pane(name, &name.to_uppercase());
        }
        let ghost = RecordingGhost::new();
        let ghost_probe = ghost.probe();
        let (factory, painters) = recording_painters();

        let mut manager = DockManager::new(substrate, DockingConfig::default(), Box::new(ghost), factory);
        manager.pump();
        Self {
            manager,
            ghost: ghost_probe,
            painters,
        }
    }

    pub fn substrate(&self) -> &HeadlessSubstrate {
        self.manager.substrate()
    }

    pub fn substrate_mut(&mut self) -> &mut HeadlessSubstrate {
        self.manager.substrate_mut()
    }

    pub fn primary(&self) -> ContainerId {
        self.substrate().primary_container()
    }

    pub fn geometry(&self, pane: &PaneId) -> Rect {
        self.substrate()
            .pane_geometry(pane)
            .unwrap_or_else(|| panic!("pane {} has no geometry", pane))
    }

    /// Floating container currently holding the pane
    pub fn floating_container_of(&self, pane: &PaneId) -> ContainerId {
        let container = self
            .substrate()
            .pane_container(pane)
            .unwrap_or_else(|| panic!("pane {} isn't docked", pane));
        assert_ne!(container, self.primary(), "pane {} is in the primary container", pane);
        container
    }

    /// Press on the middle of a pane's title region
    pub fn press_title(&mut self, pane: &PaneId) -> Point {
        let rect = self.geometry(pane);
        let local = Point::new(rect.width / 2, 5);
        let global = rect.top_left() + local;
        assert!(self.manager.handle_event(DockEvent::PanePressed {
            pane: pane.clone(),
            local,
            global,
            button: MouseButton::Left,
        }));
        global
    }

    pub fn move_to(&mut self, global: Point) -> bool {
        self.manager.handle_event(DockEvent::PointerMoved { global })
    }

    pub fn release_at(&mut self, global: Point) -> bool {
        let consumed = self.manager.handle_event(DockEvent::PointerReleased {
            global,
            button: MouseButton::Left,
        });
        self.manager.pump();
        consumed
    }

    /// Run the hover fade until the zone under the pointer is fully opaque
    pub fn finish_fade(&mut self) {
        let mut ticks = 0;
        while self.manager.advance_drop_zone_fade() {
            ticks += 1;
            assert!(ticks < 100, "fade never finished");
        }
    }

    /// Drag a pane by its title and release it at `target` after the zone faded in
    pub fn drag_and_dock(&mut self, pane: &PaneId, target: Point) {
        let start = self.press_title(pane);
        assert!(self.move_to(start + Point::new(40, 40)));
        assert!(self.move_to(target));
        self.finish_fade();
        assert!(self.release_at(target));
    }

    /// Drag a pane by its title and release it at `target` without docking
    pub fn drag_and_float(&mut self, pane: &PaneId, target: Point) {
        let start = self.press_title(pane);
        assert!(self.move_to(start + Point::new(40, 40)));
        assert!(self.move_to(target));
        assert!(self.release_at(target));
    }

    pub fn undock(&mut self, pane: &PaneId) -> ContainerId {
        self.manager.handle_event(DockEvent::UndockPane(pane.clone()));
        self.manager.pump();
        self.floating_container_of(pane)
    }
}

pub fn pane(name: &str) -> PaneId {
    PaneId::new(name)
}

/// Every pane is reachable from exactly one container, directly or through one tab group
pub fn assert_reachable_once(harness: &Harness, panes: &[PaneId]) {
    let substrate = harness.substrate();
    for pane in panes {
        let direct = substrate
            .container_names()
            .iter()
            .filter(|container| substrate.container_panes(container).contains(pane))
            .count();
        let tabbed = harness
            .manager
            .tab_groups()
            .filter(|(host, group)| group.contains(pane) && substrate.pane_container(host).is_some())
            .count();
        assert_eq!(direct + tabbed, 1, "pane {} is reachable {} times", pane, direct + tabbed);
        assert!(substrate.is_pane_visible(pane), "pane {} was hidden", pane);
        assert!(harness.manager.hosting(pane).is_some(), "pane {} is orphaned", pane);
    }
}
