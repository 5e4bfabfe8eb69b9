use std::{cell::RefCell, rc::Rc};

use platform_host::{
    ElementTree, ManualTimerHost, MemoryElementTree, MemoryNode, Rect, StyleProp,
    PLACEHOLDER_MARKER_ATTR, WINDOW_MARKER_ATTR,
};
use pretty_assertions::assert_eq;
use retro_windows::{
    Debouncer, EngineConfig, EngineError, GridScope, PresentationEngine, ScatterConfig, WindowId,
};

struct Desk {
    tree: MemoryElementTree,
    canvas: MemoryNode,
    slots: Vec<(MemoryNode, MemoryNode)>,
}

fn desk() -> Desk {
    let mut tree = MemoryElementTree::new();
    let canvas = tree.add_canvas(Rect::new(0.0, 80.0, 1200.0, 900.0));
    let slots = (0..3)
        .map(|column| {
            let x = 20.0 + f64::from(column) * 380.0;
            tree.add_window_slot(canvas, Rect::new(x, 120.0, 340.0, 220.0))
        })
        .collect();
    Desk {
        tree,
        canvas,
        slots,
    }
}

fn seeded() -> EngineConfig {
    EngineConfig {
        scatter: ScatterConfig {
            seed: Some("portfolio".to_string()),
            ..ScatterConfig::default()
        },
        ..EngineConfig::default()
    }
}

#[test]
fn float_then_dock_restores_the_original_structure() {
    let mut desk = desk();
    let (placeholder, window) = desk.slots[0];
    let styles_before = desk.tree.inline_styles(placeholder);
    let mut engine = PresentationEngine::new(EngineConfig {
        layer: retro_windows::LayerConfig {
            float_on_load: false,
            ..Default::default()
        },
        scatter: ScatterConfig {
            enabled_on_load: false,
            ..ScatterConfig::default()
        },
        ..EngineConfig::default()
    })
    .expect("config");
    engine.mount(&mut desk.tree);

    engine
        .float_window(&mut desk.tree, WindowId(1))
        .expect("float");
    assert!(!desk.tree.is_child_of(&placeholder, &window));
    assert!(!desk.tree.inline_styles(window).is_empty());

    engine.dock_window(&mut desk.tree, WindowId(1)).expect("dock");

    assert!(desk.tree.is_child_of(&placeholder, &window));
    assert!(desk.tree.inline_styles(window).is_empty());
    assert_eq!(desk.tree.inline_styles(placeholder), styles_before);
    assert!(!engine.store().window(WindowId(1)).expect("record").floated);
}

#[test]
fn grid_mode_round_trip_restores_the_same_scatter() {
    let mut desk = desk();
    let mut engine = PresentationEngine::new(seeded()).expect("config");
    engine.mount(&mut desk.tree);
    let scattered: Vec<_> = engine.snapshot().windows.iter().map(|w| w.scatter).collect();
    let (_, window) = desk.slots[1];
    let transform = desk.tree.inline_style(&window, StyleProp::Transform);
    assert!(transform.is_some());

    assert!(engine
        .set_grid_mode(&mut desk.tree, GridScope::All, true)
        .is_empty());
    assert!(desk
        .slots
        .iter()
        .all(|(placeholder, window)| desk.tree.is_child_of(placeholder, window)));
    assert!(desk.tree.inline_styles(window).is_empty());
    assert!(engine.store().canvas(retro_windows::CanvasId(1)).expect("canvas").grid_mode);

    assert!(engine
        .set_grid_mode(&mut desk.tree, GridScope::All, false)
        .is_empty());
    let restored: Vec<_> = engine.snapshot().windows.iter().map(|w| w.scatter).collect();
    assert_eq!(restored, scattered);
    assert_eq!(desk.tree.inline_style(&window, StyleProp::Transform), transform);
}

#[test]
fn a_fresh_engine_with_the_same_seed_lays_out_identically() {
    let mut first_desk = desk();
    let mut second_desk = desk();
    let mut first = PresentationEngine::new(seeded()).expect("config");
    let mut second = PresentationEngine::new(seeded()).expect("config");
    first.mount(&mut first_desk.tree);
    second.mount(&mut second_desk.tree);

    let plans = |engine: &PresentationEngine| {
        engine
            .snapshot()
            .windows
            .iter()
            .map(|w| w.scatter)
            .collect::<Vec<_>>()
    };
    assert_eq!(plans(&first), plans(&second));
}

#[test]
fn grid_mode_discards_user_pins() {
    let mut desk = desk();
    let mut engine = PresentationEngine::new(seeded()).expect("config");
    engine.mount(&mut desk.tree);
    engine
        .dispatch(
            &mut desk.tree,
            retro_windows::WindowAction::BeginDrag {
                window_id: WindowId(1),
                pointer: platform_host::Point::new(30.0, 210.0),
            },
        )
        .expect("begin");
    engine
        .dispatch(&mut desk.tree, retro_windows::WindowAction::EndDrag)
        .expect("end");
    assert!(engine.store().window(WindowId(1)).expect("record").pinned.is_some());

    engine.set_grid_mode(&mut desk.tree, GridScope::All, true);
    assert!(engine.store().window(WindowId(1)).expect("record").pinned.is_none());
}

#[test]
fn debounced_reflow_runs_once_and_follows_the_grid() {
    let desk = desk();
    let (placeholder, window) = desk.slots[2];
    let tree = Rc::new(RefCell::new(desk.tree));
    let engine = Rc::new(RefCell::new(
        PresentationEngine::new(EngineConfig {
            scatter: ScatterConfig {
                enabled_on_load: false,
                ..ScatterConfig::default()
            },
            ..EngineConfig::default()
        })
        .expect("config"),
    ));
    engine.borrow_mut().mount(&mut *tree.borrow_mut());

    let host = ManualTimerHost::new();
    let debouncer = Debouncer::new(Rc::new(host.clone()), 150);
    let runs = Rc::new(RefCell::new(0));

    tree.borrow_mut()
        .set_layout(placeholder, Rect::new(20.0, 480.0, 340.0, 220.0));
    for _ in 0..4 {
        let (engine, tree, runs) = (engine.clone(), tree.clone(), runs.clone());
        debouncer.call(move || {
            *runs.borrow_mut() += 1;
            let errors = engine.borrow_mut().reflow(&mut *tree.borrow_mut());
            assert!(errors.is_empty());
        });
        host.advance(40);
    }
    assert_eq!(*runs.borrow(), 0);

    host.advance(150);
    assert_eq!(*runs.borrow(), 1);
    assert_eq!(
        tree.borrow().rect(&window),
        Some(Rect::new(20.0, 480.0, 340.0, 220.0))
    );
}

#[test]
fn reflow_skips_orphaned_pairs_and_keeps_going() {
    let mut desk = desk();
    let mut engine = PresentationEngine::new(seeded()).expect("config");
    engine.mount(&mut desk.tree);

    let (orphaned, _) = desk.slots[0];
    desk.tree.remove(orphaned);
    let (moved, window) = desk.slots[1];
    desk.tree
        .set_layout(moved, Rect::new(400.0, 500.0, 340.0, 220.0));

    let errors = engine.reflow(&mut desk.tree);

    assert_eq!(errors, vec![EngineError::PlaceholderMissing(WindowId(1))]);
    assert_eq!(
        engine.store().window(WindowId(2)).expect("record").base.origin(),
        platform_host::Point::new(400.0, 420.0)
    );
    assert!(desk.tree.rect(&window).is_some());
}

#[test]
fn rescan_picks_up_windows_added_after_mount() {
    let mut desk = desk();
    let mut engine = PresentationEngine::new(seeded()).expect("config");
    engine.mount(&mut desk.tree);

    let slot = desk
        .tree
        .add_element(desk.canvas, &[(PLACEHOLDER_MARKER_ATTR, "")]);
    desk.tree
        .set_layout(slot, Rect::new(20.0, 400.0, 340.0, 220.0));
    desk.tree.add_element(slot, &[(WINDOW_MARKER_ATTR, "")]);

    let report = engine.rescan(&mut desk.tree);

    assert_eq!(report.windows_added, vec![WindowId(4)]);
    assert!(engine.store().window(WindowId(4)).expect("record").floated);
}
