//! End-to-end lifecycle behaviour against the recording host

use std::collections::HashSet;

use sideview_core::testing::{harness, harness_with, SurfaceCall};
use sideview_core::{
    Config, ContainerBounds, ContainerGeometry, LogicalRect, SurfaceOp, TabLabel, TabState,
};

fn url(n: usize) -> String {
    format!("https://site-{n}.example")
}

#[tokio::test]
async fn labels_are_never_reused() {
    let (manager, _, _) = harness();
    let mut seen = HashSet::new();

    for n in 0..5 {
        let label = manager.open_tab(Some(&url(n)), None, None).await.unwrap();
        assert!(seen.insert(label));
    }
    for label in manager.tabs().into_iter().map(|t| t.label).take(3) {
        manager.close_tab(&label).await;
    }
    for _ in 0..3 {
        let label = manager.reopen_last_closed_tab().await.unwrap();
        assert!(seen.insert(label));
    }
}

#[tokio::test]
async fn at_most_one_surface_visible() {
    let (manager, host, _) = harness();
    let a = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    let b = manager.open_tab(Some(&url(1)), None, None).await.unwrap();
    let c = manager.open_tab(None, None, None).await.unwrap();

    assert!(host.shown().is_empty());

    manager.activate_tab(&a).await;
    assert_eq!(host.shown(), vec![a.clone()]);

    manager.activate_tab(&b).await;
    assert_eq!(host.shown(), vec![b.clone()]);

    manager.activate_tab(&c).await;
    assert!(host.shown().is_empty());

    assert_eq!(manager.active_label(), Some(c.clone()));
    assert_eq!(manager.state_of(&c), TabState::NewPlaceholder);
    assert_eq!(manager.state_of(&a), TabState::BackedHidden);
    assert_eq!(manager.state_of(&b), TabState::BackedHidden);
}

#[tokio::test]
async fn placeholders_never_touch_the_host() {
    let (manager, host, _) = harness();
    let a = manager.open_tab(None, None, None).await.unwrap();
    let b = manager.open_tab(None, None, None).await.unwrap();

    manager.activate_tab(&a).await;
    manager.refresh_tab(&a).await;
    manager.layout_active().await;
    manager.close_tab(&b).await;

    assert!(host.calls().is_empty());
    assert_eq!(host.surface_count(), 0);
}

#[tokio::test]
async fn closed_history_keeps_ten_most_recent() {
    let (manager, _, _) = harness();
    let mut labels = Vec::new();
    for n in 0..15 {
        labels.push(manager.open_tab(Some(&url(n)), None, None).await.unwrap());
    }

    for label in &labels {
        manager.close_tab(label).await;
    }

    let closed = manager.closed_tabs();
    assert_eq!(closed.len(), 10);
    let expected: Vec<TabLabel> = labels.iter().rev().take(10).cloned().collect();
    let actual: Vec<TabLabel> = closed.into_iter().map(|r| r.tab.label).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn reopen_restores_content_and_position() {
    let (manager, host, _) = harness();
    for n in 0..4 {
        manager.open_tab(Some(&url(n)), None, None).await.unwrap();
    }
    let third = manager.tabs()[2].label.clone();
    manager.close_tab(&third).await;
    host.clear_calls();

    let reopened = manager.reopen_last_closed_tab().await.unwrap();

    assert_ne!(reopened, third);
    assert_eq!(manager.index_of(&reopened), Some(2));
    assert_eq!(manager.find(&reopened).unwrap().url, url(2));
    assert_eq!(manager.active_label(), Some(reopened.clone()));

    let creates: Vec<_> = host
        .calls()
        .into_iter()
        .filter(|call| call.op() == SurfaceOp::Create)
        .collect();
    assert_eq!(creates.len(), 1);
    assert!(matches!(&creates[0], SurfaceCall::Create { url: u, .. } if *u == url(2)));
    assert_eq!(host.count(SurfaceOp::Show, &reopened), 1);
}

#[tokio::test]
async fn reopen_clamps_position() {
    let (manager, _, _) = harness();
    for n in 0..4 {
        manager.open_tab(Some(&url(n)), None, None).await.unwrap();
    }
    let labels: Vec<_> = manager.tabs().into_iter().map(|t| t.label).collect();
    manager.close_tab(&labels[3]).await;
    manager.close_tab(&labels[2]).await;
    manager.close_tab(&labels[1]).await;

    // Most recent is the tab from index 1, then index 2, then index 3
    let first = manager.reopen_last_closed_tab().await.unwrap();
    let second = manager.reopen_last_closed_tab().await.unwrap();
    let third = manager.reopen_last_closed_tab().await.unwrap();

    let order: Vec<_> = manager.tabs().into_iter().map(|t| t.label).collect();
    assert_eq!(order, vec![labels[0].clone(), first, second, third]);
}

#[tokio::test]
async fn closing_last_tab_leaves_placeholder() {
    let (manager, host, _) = harness();
    let only = manager.open_tab(Some(&url(0)), None, None).await.unwrap();

    assert!(manager.close_tab(&only).await);

    let tabs = manager.tabs();
    assert_eq!(tabs.len(), 1);
    assert!(tabs[0].is_new_tab);
    assert_ne!(tabs[0].label, only);
    assert_eq!(manager.active_label(), Some(tabs[0].label.clone()));
    assert_eq!(host.surface_count(), 0);
}

#[tokio::test]
async fn activating_the_active_tab_is_a_no_op() {
    let (manager, host, _) = harness();
    let label = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    host.clear_calls();

    manager.activate_tab(&label).await;
    manager.activate_tab(&label).await;

    assert!(host.calls().is_empty());
    assert_eq!(manager.active_label(), Some(label));
}

#[tokio::test]
async fn layout_uses_snapped_logical_rect() {
    let (manager, host, geometry) = harness();
    let a = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    let b = manager.open_tab(Some(&url(1)), None, None).await.unwrap();

    manager.activate_tab(&a).await;
    let expected = LogicalRect {
        x: 10.0,
        y: 20.0,
        width: 800.0,
        height: 600.0,
    };
    assert!(host
        .calls_for(&a)
        .contains(&SurfaceCall::Resize { label: a.clone(), rect: expected }));

    let moved = ContainerGeometry::new(
        ContainerBounds {
            left: 10.3,
            top: 20.0,
            width: 800.4,
            height: 600.0,
        },
        1.5,
    );
    geometry.report(moved);
    manager.activate_tab(&b).await;

    let rect = moved.logical_rect();
    assert_eq!(rect.x, 10.0);
    assert_eq!(rect.width, 1201.0 / 1.5);
    assert!(host
        .calls_for(&b)
        .contains(&SurfaceCall::Resize { label: b.clone(), rect }));
}

#[tokio::test]
async fn failed_create_records_nothing() {
    let (manager, host, _) = harness();
    let placeholder = manager.open_tab(None, None, None).await.unwrap();
    host.fail_every(SurfaceOp::Create);

    assert!(manager.open_tab(Some(&url(0)), None, None).await.is_none());

    assert_eq!(manager.tab_count(), 1);
    assert_eq!(manager.active_label(), Some(placeholder));
    assert!(host.shown().is_empty());
}

#[tokio::test]
async fn failed_destroy_still_removes_tab() {
    let (manager, host, _) = harness();
    let a = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    let b = manager.open_tab(Some(&url(1)), None, None).await.unwrap();
    host.fail(SurfaceOp::Destroy, &b);

    assert!(manager.close_tab(&b).await);

    assert!(manager.find(&b).is_none());
    assert_eq!(manager.state_of(&b), TabState::Closed);
    assert_eq!(manager.active_label(), Some(a.clone()));
    assert_eq!(host.count(SurfaceOp::Show, &a), 2);
}

#[tokio::test]
async fn superseded_activation_never_shows() {
    let (manager, host, _) = harness();
    let a = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    let b = manager.open_tab(Some(&url(1)), None, None).await.unwrap();
    host.clear_calls();

    // Suspend A's activation inside its layout step
    let gate = host.gate(SurfaceOp::Resize, &a);
    let slow = manager.clone();
    let target = a.clone();
    let pending = tokio::spawn(async move { slow.activate_tab(&target).await });
    gate.reached.await.unwrap();

    manager.activate_tab(&b).await;
    gate.release.send(()).unwrap();
    pending.await.unwrap();

    assert_eq!(manager.active_label(), Some(b.clone()));
    assert_eq!(host.count(SurfaceOp::Show, &a), 0);
    assert_eq!(host.shown(), vec![b]);
}

#[tokio::test]
async fn last_activation_wins_the_pointer() {
    let (manager, host, _) = harness();
    let a = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    let b = manager.open_tab(Some(&url(1)), None, None).await.unwrap();
    let c = manager.open_tab(Some(&url(2)), None, None).await.unwrap();

    tokio::join!(
        manager.activate_tab(&a),
        manager.activate_tab(&b),
        manager.activate_tab(&c),
    );

    assert_eq!(manager.active_label(), Some(c.clone()));
    assert_eq!(host.shown(), vec![c]);
}

#[tokio::test]
async fn navigate_failure_keeps_placeholder() {
    let (manager, host, _) = harness();
    let label = manager.open_tab(None, None, None).await.unwrap();
    host.fail_every(SurfaceOp::Create);

    assert!(!manager.navigate_new_tab(&url(0), None).await);

    let tab = manager.find(&label).unwrap();
    assert!(tab.is_new_tab);
    assert!(tab.url.is_empty());
    assert_eq!(host.surface_count(), 0);
}

#[tokio::test]
async fn navigate_after_placeholder_closed_destroys_surface() {
    let (manager, host, _) = harness();
    let label = manager.open_tab(None, None, None).await.unwrap();
    let gate = host.gate(SurfaceOp::Create, &label);

    let slow = manager.clone();
    let pending = tokio::spawn(async move { slow.navigate_new_tab(&url(0), None).await });
    gate.reached.await.unwrap();

    manager.close_tab(&label).await;
    gate.release.send(()).unwrap();

    assert!(!pending.await.unwrap());
    assert_eq!(host.count(SurfaceOp::Destroy, &label), 1);
    assert!(!host.has_surface(&label));
}

#[tokio::test]
async fn close_others_keeps_one_and_records_backed() {
    let (manager, host, _) = harness();
    let placeholder = manager.open_tab(None, None, None).await.unwrap();
    let keep = manager.open_tab(Some(&url(1)), None, None).await.unwrap();
    let c = manager.open_tab(Some(&url(2)), None, None).await.unwrap();
    let d = manager.open_tab(Some(&url(3)), None, None).await.unwrap();

    manager.close_other_tabs(&keep).await;

    let tabs = manager.tabs();
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].label, keep);
    assert_eq!(manager.active_label(), Some(keep.clone()));
    assert_eq!(host.shown(), vec![keep]);

    let closed: Vec<_> = manager.closed_tabs().into_iter().map(|r| r.tab.label).collect();
    assert_eq!(closed, vec![d.clone(), c.clone()]);
    assert!(!closed.contains(&placeholder));
    assert_eq!(host.count(SurfaceOp::Destroy, &c), 1);
    assert_eq!(host.count(SurfaceOp::Destroy, &d), 1);
}

#[tokio::test]
async fn close_others_with_unknown_label_does_nothing() {
    let (manager, host, _) = harness();
    manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    manager.open_tab(Some(&url(1)), None, None).await.unwrap();
    host.clear_calls();

    manager.close_other_tabs(&TabLabel::from("tab-404")).await;

    assert_eq!(manager.tab_count(), 2);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn closing_last_tab_never_steals_focus_from_a_newer_open() {
    let (manager, host, _) = harness();
    let only = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    let gate = host.gate(SurfaceOp::Destroy, &only);

    let closer = manager.clone();
    let target = only.clone();
    let pending = tokio::spawn(async move { closer.close_tab(&target).await });
    gate.reached.await.unwrap();

    // The replacement placeholder exists while the surface is still going away
    let tabs = manager.tabs();
    assert_eq!(tabs.len(), 1);
    assert!(tabs[0].is_new_tab);
    assert_eq!(manager.active_label(), Some(tabs[0].label.clone()));

    let opened = manager.open_tab(None, None, None).await.unwrap();
    gate.release.send(()).unwrap();
    assert!(pending.await.unwrap());

    let tabs = manager.tabs();
    assert_eq!(tabs.len(), 2);
    assert!(tabs.iter().all(|tab| tab.is_new_tab));
    assert_eq!(manager.active_label(), Some(opened));
}

#[tokio::test]
async fn configured_history_capacity_never_exceeds_ten() {
    let config = Config {
        closed_tab_capacity: 50,
        ..Config::default()
    };
    let (manager, _, _) = harness_with(config);
    let mut labels = Vec::new();
    for n in 0..15 {
        labels.push(manager.open_tab(Some(&url(n)), None, None).await.unwrap());
    }

    for label in &labels {
        manager.close_tab(label).await;
    }

    assert_eq!(manager.closed_tabs().len(), 10);
}

#[tokio::test]
async fn zero_history_capacity_still_allows_reopen() {
    let config = Config {
        closed_tab_capacity: 0,
        ..Config::default()
    };
    let (manager, _, _) = harness_with(config);
    let a = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    manager.open_tab(None, None, None).await.unwrap();

    manager.close_tab(&a).await;

    assert_eq!(manager.closed_tabs().len(), 1);
    assert!(manager.reopen_last_closed_tab().await.is_some());
}

#[tokio::test]
async fn unmounted_container_skips_layout() {
    let (manager, host, geometry) = harness();
    let a = manager.open_tab(Some(&url(0)), None, None).await.unwrap();
    let b = manager.open_tab(Some(&url(1)), None, None).await.unwrap();
    geometry.clear();
    host.clear_calls();

    manager.layout_active().await;
    assert!(host.calls().is_empty());

    // Activation still swaps visibility, it only skips the resize
    manager.activate_tab(&a).await;

    assert_eq!(
        host.calls(),
        vec![SurfaceCall::Hide(b), SurfaceCall::Show(a.clone())]
    );
    assert_eq!(host.shown(), vec![a]);
}
