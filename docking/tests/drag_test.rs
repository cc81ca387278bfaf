//! Drag session: start threshold, docking, floating, cancellation

mod common;

use common::{assert_reachable_once, pane, Harness};
use docking::drag::DragPhase;
use docking::geometry::{Margins, Point, Rect};
use docking::input::DockEvent;
use docking::pane::{AllowedAreas, Corner, DockArea, Hosting};
use docking::screens::{Screen, ScreenId};
use docking::snapping::SnapSides;
use docking::substrate::DockSubstrate;
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

#[test]
fn test_press_outside_title_is_ignored() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let rect = h.geometry(&a);

    let consumed = h.manager.handle_event(DockEvent::PanePressed {
        pane: a.clone(),
        local: Point::new(10, 100),
        global: rect.top_left() + Point::new(10, 100),
        button: MouseButton::Left,
    });
    assert!(!consumed);
    assert_eq!(h.manager.drag_phase(), DragPhase::Idle);

    let right_click = h.manager.handle_event(DockEvent::PanePressed {
        pane: a,
        local: Point::new(10, 5),
        global: rect.top_left() + Point::new(10, 5),
        button: MouseButton::Right,
    });
    assert!(!right_click);
}

#[test]
fn test_drag_starts_beyond_distance() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let start = h.press_title(&a);
    assert_eq!(h.manager.drag_phase(), DragPhase::Pressed);

    // Manhattan distance of 6 stays below the threshold
    assert!(!h.move_to(start + Point::new(3, 3)));
    assert_eq!(h.manager.drag_phase(), DragPhase::Pressed);
    assert!(!h.substrate().has_placeholder_content(&a));

    assert!(h.move_to(start + Point::new(40, 40)));
    assert_eq!(h.manager.drag_phase(), DragPhase::Dragging);
    assert!(h.substrate().is_input_grabbed());
    assert!(h.substrate().has_placeholder_content(&a));

    let ghost = h.ghost.state();
    assert!(ghost.shown);
    assert!(ghost.enabled);
    assert_eq!(ghost.opacity, 0.6);
    assert_eq!(ghost.target.map(|rect| rect.size()), Some(h.geometry(&a).size()));
}

#[test]
fn test_second_press_is_consumed() {
    let mut h = Harness::new(&["a", "b"]);
    h.press_title(&pane("a"));
    // Warns and keeps the original session
    h.press_title(&pane("b"));
    assert_eq!(h.manager.session().map(|session| session.dragged.clone()), Some(pane("a")));
}

#[test]
fn test_escape_cancels_drag() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let start = h.press_title(&a);
    h.move_to(start + Point::new(400, 300));
    assert_eq!(h.manager.drag_phase(), DragPhase::Dragging);

    assert!(h.manager.handle_event(DockEvent::KeyPressed(KeyCode::Escape)));
    h.manager.pump();

    assert_eq!(h.manager.drag_phase(), DragPhase::Idle);
    assert!(!h.substrate().is_input_grabbed());
    assert!(!h.substrate().has_placeholder_content(&a));
    assert!(!h.ghost.state().shown);
    assert_eq!(h.manager.hosting(&a), Some(Hosting::Primary));
    assert!(h.substrate().floating_containers().is_empty());
    assert!(h.painters.log().active.is_empty());
}

#[test]
fn test_blocked_window_cancels_drag() {
    let mut h = Harness::new(&["a", "b"]);
    let start = h.press_title(&pane("a"));
    h.move_to(start + Point::new(400, 300));

    h.manager.handle_event(DockEvent::WindowBlocked);
    assert_eq!(h.manager.drag_phase(), DragPhase::Idle);
}

#[test]
fn test_drop_on_center_tabs() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let b = pane("b");
    let center = h.geometry(&b).center();

    h.drag_and_dock(&a, center);

    let Some(Hosting::Tabbed { group, container }) = h.manager.hosting(&a) else {
        panic!("a isn't tabbed");
    };
    assert_eq!(container, h.primary());
    assert_eq!(h.manager.hosting(&b), h.manager.hosting(&a));

    let tabs = h.manager.tab_group(&group).unwrap();
    assert_eq!(tabs.tabs, vec![b.clone(), a.clone()]);
    assert_eq!(tabs.active_tab(), Some(&a));
    assert_eq!(h.substrate().active_tab(&group), Some(&a));
    assert_eq!(h.manager.drag_phase(), DragPhase::Idle);
    assert!(!h.substrate().has_placeholder_content(&a));
    assert_reachable_once(&h, &[a, b]);
}

#[test]
fn test_release_before_fade_floats() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let center = h.geometry(&pane("b")).center();

    h.drag_and_float(&a, center);

    let container = h.floating_container_of(&a);
    assert!(h.substrate().container_exists(&container));
    assert!(h.manager.tab_groups().next().is_none());
}

#[test]
fn test_modifier_disables_docking() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let center = h.geometry(&pane("b")).center();

    let start = h.press_title(&a);
    h.move_to(start + Point::new(40, 40));
    h.move_to(center);
    h.finish_fade();
    h.manager.handle_event(DockEvent::ModifiersChanged(ModifiersState::CONTROL));
    // The ghost is drawn opaque while docking is disabled
    assert_eq!(h.ghost.state().opacity, 1.0);
    h.release_at(center);

    h.floating_container_of(&a);
}

#[test]
fn test_split_right_of_pane() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let a = pane("a");
    let b = pane("b");
    let rect = h.geometry(&b);

    h.drag_and_dock(&a, Point::new(rect.right() - 10, rect.center().y));

    let panes = h.substrate().container_panes(&h.primary());
    assert_eq!(panes, vec![b.clone(), a.clone(), pane("c")]);
    let resize = h.substrate().resizes().last().unwrap();
    assert_eq!(resize.panes, vec![b, a]);
    assert_eq!(resize.sizes, vec![rect.width / 2, rect.width / 2]);
}

#[test]
fn test_split_left_keeps_order() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let c = pane("c");
    let b = pane("b");
    let rect = h.geometry(&b);

    h.drag_and_dock(&c, Point::new(rect.left() + 10, rect.center().y));

    let panes = h.substrate().container_panes(&h.primary());
    assert_eq!(panes, vec![pane("a"), c, b]);
}

#[test]
fn test_absolute_drop_reserves_corners() {
    let mut h = Harness::new(&["a", "b"]);
    let b = pane("b");
    let primary = h.primary();
    let target = Point::new(10, 552);

    let start = h.press_title(&b);
    h.move_to(start + Point::new(40, 40));
    // The absolute zone shows up once the left edge zone of `a` is active
    h.move_to(target);
    h.move_to(target);
    assert!(h.manager.drop_zones().on_absolute());
    h.finish_fade();
    h.release_at(target);

    assert_eq!(h.substrate().container_panes(&primary)[0], b);
    let corners = h.substrate().corners(&primary);
    assert_eq!(corners.get(&Corner::TopLeft), Some(&DockArea::Left));
    assert_eq!(corners.get(&Corner::BottomLeft), Some(&DockArea::Left));
}

#[test]
fn test_drag_sole_pane_moves_its_window() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let container = h.undock(&a);

    let start = h.press_title(&a);
    let press_pos = start - h.geometry(&a).top_left();
    h.move_to(start + Point::new(40, 40));
    // The floating window itself is hidden while its only pane is dragged
    assert!(!h.substrate().is_container_visible(&container));
    assert!(!h.substrate().has_placeholder_content(&a));

    let target = Point::new(800, 400);
    h.move_to(target);
    h.release_at(target);

    assert!(h.substrate().is_container_visible(&container));
    assert_eq!(h.substrate().floating_containers(), vec![container.clone()]);
    let frame = h.substrate().frame_geometry(&container).unwrap();
    assert_eq!(frame.top_left(), target - press_pos - Point::new(0, 24));
}

#[test]
fn test_drop_zone_painters_follow_drag() {
    let mut h = Harness::new(&["a", "b"]);
    let center = h.geometry(&pane("b")).center();

    let start = h.press_title(&pane("a"));
    h.move_to(start + Point::new(40, 40));
    h.move_to(center);

    let log = h.painters.log();
    assert_eq!(log.created, vec![ScreenId(0)]);
    assert!(log.active.contains(&ScreenId(0)));
    assert!(log.repaints > 0);
    let state = log.last_state.unwrap();
    assert_eq!(state.drop_area(), Some(DockArea::Tab));

    h.release_at(center);
    assert!(h.painters.log().active.is_empty());
}

#[test]
fn test_float_to_other_dpi_screen() {
    let screens = vec![
        Screen::new(0, Rect::new(0, 0, 1920, 1080), 1.0),
        Screen::new(1, Rect::new(1920, 0, 1920, 1080), 2.0),
    ];
    let mut h = Harness::with_screens(screens, &["a", "b"]);
    let a = pane("a");
    let target = Point::new(2500, 400);

    h.drag_and_float(&a, target);

    let container = h.floating_container_of(&a);
    let frame = h.substrate().frame_geometry(&container).unwrap();
    assert_eq!(frame, Rect::new(2020, 371, 480, 540));
}

#[test]
fn test_placeholder_snaps_to_screen_edge() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let start = h.press_title(&a);
    let press_pos = start - h.geometry(&a).top_left();

    // Placeholder top-left ends up 12px right of the screen edge, clear of
    // the top edge and of the absolute zones
    let target = Point::new(12, 100) + press_pos;
    h.move_to(start + Point::new(40, 40));
    h.move_to(target);
    let session = h.manager.session().unwrap();
    assert_eq!(session.placeholder.left(), 0);
    assert_eq!(session.placeholder.top(), 100);
}

#[test]
fn test_tab_drag_starts_outside_tab_bar() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let b = pane("b");
    let host = h.manager.tabify(&a, &b, None).unwrap();
    h.manager.pump();

    let bar = h.geometry(&host);
    let press = bar.top_left() + Point::new(10, 5);
    assert!(h.manager.handle_event(DockEvent::TabPressed {
        host: host.clone(),
        index: Some(1),
        global: press,
    }));

    // Far away along the tab bar: still only reordering territory
    assert!(h.move_to(press + Point::new(300, 0)));
    assert_eq!(h.manager.drag_phase(), DragPhase::Pressed);

    assert!(h.move_to(press + Point::new(300, 200)));
    assert_eq!(h.manager.drag_phase(), DragPhase::Dragging);
    assert_eq!(h.manager.session().map(|session| session.dragged.clone()), Some(b));
}

/// Pull one tab out of a two-tab group and float it far from every edge
fn float_tab_out(h: &mut Harness, index: usize) {
    let host = h.manager.tab_groups().next().map(|(host, _)| host.clone()).unwrap();
    let press = h.geometry(&host).top_left() + Point::new(10, 5);
    h.manager.handle_event(DockEvent::TabPressed {
        host,
        index: Some(index),
        global: press,
    });
    let target = Point::new(700, 500);
    h.move_to(press + Point::new(0, 200));
    h.move_to(target);
    h.release_at(target);
}

#[test]
fn test_torn_tab_without_cache_keeps_slot_size() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let b = pane("b");
    let host = h.manager.tabify(&a, &b, None).unwrap();
    h.manager.pump();
    let slot = h.geometry(&host).size();
    assert!(h.manager.last_floating_grab(&b).is_none());

    float_tab_out(&mut h, 1);

    h.floating_container_of(&b);
    assert_eq!(h.geometry(&b).size(), slot);
    assert_eq!(h.manager.hosting(&a).map(|hosting| matches!(hosting, Hosting::Tabbed { .. })), Some(true));
}

#[test]
fn test_torn_tab_restores_cached_size() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let b = pane("b");
    let before = h.geometry(&a).size();
    h.manager.tabify(&a, &b, None).unwrap();
    h.manager.pump();
    assert_eq!(h.manager.last_floating_grab(&a).map(|grab| grab.size), Some(before));

    float_tab_out(&mut h, 0);

    h.floating_container_of(&a);
    assert_eq!(h.geometry(&a).size(), before);
    assert!(h.manager.last_floating_grab(&a).is_none());
}

#[test]
fn test_press_without_geometry_starts_nothing() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    h.substrate_mut().close_pane(&a);
    h.manager.pump();
    h.substrate_mut().set_title_region(&a, Some(Rect::new(0, 0, 100, 24)));

    let consumed = h.manager.handle_event(DockEvent::PanePressed {
        pane: a,
        local: Point::new(10, 5),
        global: Point::new(10, 5),
        button: MouseButton::Left,
    });
    assert!(!consumed);
    assert!(h.manager.session().is_none());
    assert!(!h.ghost.state().shown);
}

/// Harness whose pane `a` can only float and has a small pinned geometry,
/// so its placeholder is `200x100` with the press point at `(100, 5)`
fn floating_only_harness(screens: Vec<Screen>, panes: &[&str]) -> Harness {
    let mut h = Harness::with_screens(screens, panes);
    let a = pane("a");
    h.substrate_mut().set_allowed_areas(&a, AllowedAreas::empty());
    h.substrate_mut().set_pane_geometry(&a, Some(Rect::new(0, 24, 200, 100)));
    h
}

fn single_screen() -> Vec<Screen> {
    vec![Screen::new(0, Rect::new(0, 0, 1920, 1080), 1.0)]
}

/// Start dragging `a` and move its placeholder top-left to `origin`
fn drag_placeholder_to(h: &mut Harness, origin: Point) -> Point {
    let start = h.press_title(&pane("a"));
    assert!(h.move_to(start + Point::new(40, 40)));
    let global = origin + Point::new(100, 5);
    h.move_to(global);
    global
}

#[test]
fn test_floating_window_snaps_before_screen_edge() {
    let mut h = floating_only_harness(single_screen(), &["a", "b", "c"]);
    let b = pane("b");
    let container = h.undock(&b);
    h.manager.make_floating(&b, Rect::new(220, 300, 400, 300));
    h.manager.pump();

    // 10px from the screen's left edge and 10px from the floating window
    let global = drag_placeholder_to(&mut h, Point::new(10, 350));
    let session = h.manager.session().unwrap();
    assert_eq!(session.snapped, SnapSides::RIGHT);
    assert_eq!(session.placeholder, Rect::new(20, 350, 200, 100));

    // The snapped right side gives back the frame margin
    h.substrate_mut().set_frame_margins(Margins::new(3, 4, 5, 6));
    h.release_at(global);
    let floating = h.floating_container_of(&pane("a"));
    assert_ne!(floating, container);
    assert_eq!(h.substrate().frame_geometry(&floating), Some(Rect::new(15, 326, 200, 124)));
}

#[test]
fn test_snapped_corners_compensate_frame_margins() {
    let mut h = floating_only_harness(single_screen(), &["a", "b"]);
    h.substrate_mut().set_frame_margins(Margins::new(3, 4, 5, 6));

    let global = drag_placeholder_to(&mut h, Point::new(8, 6));
    assert_eq!(h.manager.session().unwrap().snapped, SnapSides::LEFT | SnapSides::TOP);
    h.release_at(global);

    // No title bar on top of a snapped top edge
    let floating = h.floating_container_of(&pane("a"));
    assert_eq!(h.substrate().frame_geometry(&floating), Some(Rect::new(3, 4, 200, 100)));
}

#[test]
fn test_snapped_bottom_compensates_frame_margin() {
    let mut h = floating_only_harness(single_screen(), &["a", "b"]);
    h.substrate_mut().set_frame_margins(Margins::new(3, 4, 5, 6));

    let global = drag_placeholder_to(&mut h, Point::new(300, 975));
    let session = h.manager.session().unwrap();
    assert_eq!(session.snapped, SnapSides::BOTTOM);
    assert_eq!(session.placeholder.bottom(), 1080);
    h.release_at(global);

    let floating = h.floating_container_of(&pane("a"));
    assert_eq!(h.substrate().frame_geometry(&floating), Some(Rect::new(300, 950, 200, 124)));
}

#[test]
fn test_other_screens_snap_before_primary_frame() {
    // A taller second screen leaves room below the first one
    let screens = vec![
        Screen::new(0, Rect::new(0, 0, 1920, 1080), 1.0),
        Screen::new(1, Rect::new(1920, 0, 1920, 1200), 1.0),
    ];
    let mut h = floating_only_harness(screens, &["a", "b"]);

    // The pointer is off every screen and falls back to the first one. Its
    // top is 15px below the primary frame but its bottom is 5px from the
    // second screen's bottom.
    drag_placeholder_to(&mut h, Point::new(500, 1095));
    let session = h.manager.session().unwrap();
    assert_eq!(session.snapped, SnapSides::BOTTOM);
    assert_eq!(session.placeholder, Rect::new(500, 1100, 200, 100));
}

#[test]
fn test_primary_frame_snaps_last() {
    let mut h = floating_only_harness(single_screen(), &["a", "b"]);
    let primary = h.primary();
    h.substrate_mut().set_frame_geometry(&primary, Rect::new(200, 100, 1200, 800));

    // Far from every screen edge, 10px below the primary frame
    drag_placeholder_to(&mut h, Point::new(500, 910));
    let session = h.manager.session().unwrap();
    assert_eq!(session.snapped, SnapSides::TOP);
    assert_eq!(session.placeholder.top(), 900);
}

#[test]
fn test_modifier_disables_snapping() {
    let mut h = floating_only_harness(single_screen(), &["a", "b"]);
    h.manager.handle_event(DockEvent::ModifiersChanged(ModifiersState::CONTROL));

    drag_placeholder_to(&mut h, Point::new(8, 300));
    let session = h.manager.session().unwrap();
    assert!(session.snapped.is_empty());
    assert_eq!(session.placeholder.left(), 8);
}

#[test]
fn test_drop_zone_disables_snapping() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    h.substrate_mut().set_pane_geometry(&a, Some(Rect::new(0, 24, 200, 100)));

    // Right edge 5px from the screen edge, pointer over b
    drag_placeholder_to(&mut h, Point::new(1715, 500));
    assert!(h.manager.drop_zones().has_zones());
    let session = h.manager.session().unwrap();
    assert!(session.snapped.is_empty());
    assert_eq!(session.placeholder.right(), 1915);
}

/// Floating container holding `a` on the left and `b` on the right
fn two_pane_floating_container(h: &mut Harness) -> Point {
    let a = pane("a");
    let b = pane("b");
    h.undock(&a);
    let floating = h.geometry(&a);
    h.drag_and_dock(&b, Point::new(floating.right() - 10, floating.center().y));
    assert_eq!(h.floating_container_of(&a), h.floating_container_of(&b));

    // On the outer right edge of the container
    let rect = h.geometry(&b);
    Point::new(rect.right() - 10, rect.center().y)
}

#[test]
fn test_no_absolute_zone_into_own_small_container() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let edge = two_pane_floating_container(&mut h);

    let start = h.press_title(&pane("a"));
    h.move_to(start + Point::new(40, 40));
    h.move_to(edge);
    h.move_to(edge);
    assert_eq!(h.manager.drop_zones().drop_area(), Some(DockArea::Right));
    assert!(h.manager.drop_zones().absolute().is_none());
    assert!(!h.manager.drop_zones().on_absolute());
}

#[test]
fn test_absolute_zone_offered_to_other_panes() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let edge = two_pane_floating_container(&mut h);

    let start = h.press_title(&pane("c"));
    h.move_to(start + Point::new(40, 40));
    h.move_to(edge);
    h.move_to(edge);
    assert!(h.manager.drop_zones().on_absolute());
    assert_eq!(h.manager.drop_zones().absolute().map(|zone| zone.area), Some(DockArea::Right));
}
