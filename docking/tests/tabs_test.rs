//! Tab groups: creation, redirection, merging and teardown

mod common;

use common::{assert_reachable_once, pane, Harness};
use docking::geometry::Point;
use docking::input::DockEvent;
use docking::pane::Hosting;
use docking::substrate::DockSubstrate;

#[test]
fn test_tabify_creates_group_in_target_slot() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let a = pane("a");
    let b = pane("b");
    let c = pane("c");

    let host = h.manager.tabify(&a, &c, None).unwrap();
    h.manager.pump();

    // The group took a's place, left of b
    assert_eq!(h.substrate().container_panes(&h.primary()), vec![host.clone(), b.clone()]);
    let group = h.manager.tab_group(&host).unwrap();
    assert_eq!(group.tabs, vec![a.clone(), c.clone()]);
    assert_eq!(group.active_tab(), Some(&c));
    assert_eq!(h.substrate().tab_host_of(&a), Some(&host));
    assert_eq!(
        h.manager.hosting(&c),
        Some(Hosting::Tabbed {
            group: host.clone(),
            container: h.primary(),
        })
    );
    assert!(host.as_str().starts_with("DockTabContainer-"));
    assert_reachable_once(&h, &[a, b, c]);
}

#[test]
fn test_tabify_onto_tabbed_pane_redirects_to_host() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let a = pane("a");
    let b = pane("b");
    let c = pane("c");

    let host = h.manager.tabify(&a, &b, None).unwrap();
    let again = h.manager.tabify(&b, &c, None).unwrap();
    h.manager.pump();

    assert_eq!(again, host);
    assert_eq!(h.manager.tab_groups().count(), 1);
    assert_eq!(h.manager.tab_group(&host).unwrap().tabs, vec![a.clone(), b.clone(), c.clone()]);
    // No host ever ends up inside another group
    assert!(h.manager.tab_groups().all(|(host, _)| h.manager.tab_of(host).is_none()));
    assert_reachable_once(&h, &[a, b, c]);
}

#[test]
fn test_tabify_same_pane_twice_is_noop() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let b = pane("b");
    let host = h.manager.tabify(&a, &b, None).unwrap();

    assert_eq!(h.manager.tabify(&a, &b, None), None);
    assert_eq!(h.manager.tab_group(&host).unwrap().len(), 2);
}

#[test]
fn test_tabify_pane_onto_itself_is_noop() {
    let mut h = Harness::new(&["a", "b"]);
    let a = pane("a");
    let b = pane("b");

    assert_eq!(h.manager.tabify(&a, &a, None), None);
    assert!(h.manager.tab_groups().next().is_none());
    assert_eq!(h.manager.hosting(&a), Some(Hosting::Primary));

    // A group dropped onto one of its own tabs stays as it is
    let host = h.manager.tabify(&a, &b, None).unwrap();
    assert_eq!(h.manager.tabify(&b, &host, None), None);
    h.manager.pump();
    assert_eq!(h.manager.tab_group(&host).unwrap().tabs, vec![a.clone(), b.clone()]);
    assert_reachable_once(&h, &[a, b]);
}

#[test]
fn test_tab_moved_to_other_group_leaves_old_one() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let (a, b, c) = (pane("a"), pane("b"), pane("c"));

    let first = h.manager.tabify(&a, &b, None).unwrap();
    let second = h.manager.tabify(&c, &b, None).unwrap();
    h.manager.pump();

    assert_ne!(first, second);
    assert_eq!(h.manager.tab_group(&first).unwrap().tabs, vec![a.clone()]);
    assert_eq!(h.manager.tab_group(&second).unwrap().tabs, vec![c.clone(), b.clone()]);
    assert_eq!(h.manager.tab_of(&b), Some(&second));
    assert_eq!(h.manager.tab_groups().filter(|(_, group)| group.contains(&b)).count(), 1);
    assert_reachable_once(&h, &[a, b, c]);
}

#[test]
fn test_dropping_group_moves_its_tabs() {
    let mut h = Harness::new(&["a", "b", "c", "d"]);
    let (a, b, c, d) = (pane("a"), pane("b"), pane("c"), pane("d"));

    let first = h.manager.tabify(&a, &b, None).unwrap();
    let second = h.manager.tabify(&c, &d, None).unwrap();
    h.manager.pump();

    let merged = h.manager.tabify(&a, &second, None).unwrap();
    h.manager.pump();

    assert_eq!(merged, first);
    assert!(!h.substrate().pane_exists(&second));
    assert_eq!(h.manager.tab_groups().count(), 1);
    let group = h.manager.tab_group(&first).unwrap();
    assert_eq!(group.tabs, vec![a.clone(), b.clone(), c.clone(), d.clone()]);
    // The active tab of the dropped group stays active
    assert_eq!(group.active_tab(), Some(&d));
    assert_reachable_once(&h, &[a, b, c, d]);
}

#[test]
fn test_untabify_keeps_active_tab() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let (a, b, c) = (pane("a"), pane("b"), pane("c"));
    let host = h.manager.tabify(&a, &b, None).unwrap();
    h.manager.tabify(&a, &c, None);
    assert_eq!(h.manager.tab_group(&host).unwrap().active_tab(), Some(&c));

    assert!(h.manager.untabify(&a));
    let group = h.manager.tab_group(&host).unwrap();
    assert_eq!(group.tabs, vec![b, c.clone()]);
    assert_eq!(group.active_tab(), Some(&c));
    assert_eq!(h.substrate().tab_host_of(&a), None);
    assert!(!h.manager.untabify(&a));
}

#[test]
fn test_empty_group_destroys_floating_container() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let a = pane("a");
    let b = pane("b");
    let container = h.undock(&a);
    let host = h.manager.tabify(&a, &b, None).unwrap();
    h.manager.pump();
    assert_eq!(h.substrate().pane_container(&host), Some(container.clone()));

    h.manager.untabify(&a);
    h.manager.untabify(&b);
    h.manager.pump();

    assert!(!h.substrate().pane_exists(&host));
    assert!(h.manager.tab_groups().next().is_none());
    assert!(!h.substrate().container_exists(&container));
}

#[test]
fn test_tabify_caches_floating_size_once() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let (a, b, c) = (pane("a"), pane("b"), pane("c"));
    let size = h.geometry(&a).size();

    h.manager.tabify(&a, &b, None);
    h.manager.pump();
    assert_eq!(h.manager.last_floating_grab(&a).map(|grab| grab.size), Some(size));

    // Tabbing more panes onto the group doesn't overwrite the first size
    h.manager.tabify(&a, &c, None);
    assert_eq!(h.manager.last_floating_grab(&a).map(|grab| grab.size), Some(size));
}

#[test]
fn test_undock_tab_and_whole_group() {
    let mut h = Harness::new(&["a", "b", "c"]);
    let (a, b, c) = (pane("a"), pane("b"), pane("c"));
    let host = h.manager.tabify(&a, &b, None).unwrap();
    h.manager.tabify(&a, &c, None);
    h.manager.pump();

    h.manager.handle_event(DockEvent::UndockTab {
        host: host.clone(),
        index: Some(2),
    });
    h.manager.pump();
    assert!(matches!(h.manager.hosting(&c), Some(Hosting::Floating(_))));
    assert_eq!(h.manager.tab_group(&host).unwrap().tabs, vec![a.clone(), b.clone()]);

    h.manager.handle_event(DockEvent::UndockTab {
        host: host.clone(),
        index: None,
    });
    h.manager.pump();
    let Some(Hosting::Tabbed { container, .. }) = h.manager.hosting(&a) else {
        panic!("a left its group");
    };
    assert_ne!(container, h.primary());
    assert_eq!(h.manager.hosting(&b), h.manager.hosting(&a));
    assert_reachable_once(&h, &[a, b, c]);
}

#[test]
fn test_operation_sequence_keeps_every_pane_reachable() {
    let mut h = Harness::new(&["a", "b", "c", "d"]);
    let all = [pane("a"), pane("b"), pane("c"), pane("d")];
    let (a, b, c, d) = (&all[0], &all[1], &all[2], &all[3]);

    // float
    h.undock(a);
    assert_reachable_once(&h, &all);

    // dock b next to the floating pane
    let floating = h.geometry(a);
    h.drag_and_dock(b, Point::new(floating.right() - 10, floating.center().y));
    assert_reachable_once(&h, &all);

    // tabify c onto the floating pane a
    let host = h.manager.tabify(a, c, None).unwrap();
    h.manager.pump();
    assert_reachable_once(&h, &all);

    // drag d onto the center of the group
    let center = h.geometry(&host).center();
    h.drag_and_dock(d, center);
    assert_eq!(h.manager.tab_group(&host).unwrap().len(), 3);
    assert_reachable_once(&h, &all);

    // untabify by undocking single tabs until the group is gone
    for _ in 0..3 {
        h.manager.handle_event(DockEvent::UndockTab {
            host: host.clone(),
            index: Some(0),
        });
        h.manager.pump();
        assert_reachable_once(&h, &all);
    }
    assert!(!h.substrate().pane_exists(&host));
    assert!(h.manager.tab_groups().next().is_none());
}
