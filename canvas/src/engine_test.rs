#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::geom::Point;
use crate::order::InsertionOrder;
use crate::render::{DisplayList, DrawOp};

// =============================================================
// Helpers
// =============================================================

fn running() -> SceneCore {
    let mut core = SceneCore::new();
    core.open("/programs/demo.lps");
    core.apply(Command::Started, 0.0);
    assert_eq!(core.state(), RunState::Running);
    core
}

fn frame(core: &mut SceneCore, syscall: &str, data: Value) -> Vec<Effect> {
    core.apply_frame(syscall, &data, 0.0)
}

fn halts(effects: &[Effect]) -> usize {
    effects.iter().filter(|e| **e == Effect::Send(Request::Halt)).count()
}

fn observed(effects: &[Effect]) -> Option<&str> {
    effects.iter().find_map(|e| match e {
        Effect::Send(Request::Observe { input }) => Some(input.as_str()),
        _ => None,
    })
}

fn click(core: &mut SceneCore, x: f64, y: f64) -> Vec<Effect> {
    core.on_pointer(PointerEvent::new(PointerKind::Click, x, y))
}

fn define_a(core: &mut SceneCore) {
    let effects = frame(
        core,
        "canvas:defineObject",
        json!({"id": "a", "type": "circle", "position": [5, 5], "radius": 10}),
    );
    assert!(effects.is_empty());
}

// =============================================================
// End-to-end
// =============================================================

#[test]
fn click_on_object_sends_two_literal_batch() {
    let mut core = running();
    define_a(&mut core);
    assert_eq!(observed(&click(&mut core, 5.0, 5.0)), Some("lpsClick(5, 5),lpsClick(a, 5, 5)"));
    assert_eq!(observed(&click(&mut core, 100.0, 100.0)), Some("lpsClick(100, 100)"));
}

#[test]
fn update_radius_grows_hit_area() {
    let mut core = running();
    define_a(&mut core);
    assert_eq!(observed(&click(&mut core, 20.0, 5.0)), Some("lpsClick(20, 5)"));

    frame(&mut core, "canvas:updateObject", json!({"id": "a", "properties": {"radius": 20}}));
    assert_eq!(observed(&click(&mut core, 20.0, 5.0)), Some("lpsClick(20, 5),lpsClick(a, 20, 5)"));
}

#[test]
fn open_while_running_defers_until_one_halted() {
    let mut core = running();
    define_a(&mut core);

    let effects = core.open("/programs/next.lps");
    assert_eq!(halts(&effects), 1);
    assert_eq!(core.state(), RunState::Stopping);

    for _ in 0..5 {
        assert!(core.open("/programs/next.lps").is_empty());
    }

    let effects = frame(&mut core, "canvas:lpsHalted", Value::Null);
    assert!(effects.contains(&Effect::Send(Request::Start { pathname: "/programs/next.lps".into() })));
    assert_eq!(core.state(), RunState::Loading);
    assert!(core.doc().is_empty());

    let effects = frame(&mut core, "canvas:lpsHalted", Value::Null);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Send(Request::Start { .. }))));
}

// =============================================================
// Protocol violations
// =============================================================

#[test]
fn duplicate_identifier_stops_exactly_once() {
    let mut core = running();
    define_a(&mut core);
    let effects = frame(&mut core, "canvas:defineObject", json!({"id": "a", "type": "circle"}));
    assert_eq!(halts(&effects), 1);
    assert!(effects.contains(&Effect::Log("Error: Duplicated object identifier given for a".into())));
    assert_eq!(core.doc().len(), 1);
    assert_eq!(core.state(), RunState::Stopping);
}

#[test]
fn invalid_declaration_forces_stop() {
    let mut core = running();
    let effects = frame(&mut core, "canvas:defineObject", json!({"id": "x", "type": "blob"}));
    assert_eq!(halts(&effects), 1);
    assert!(core.doc().is_empty());
}

#[test]
fn unknown_update_and_animate_targets_force_stop() {
    let mut core = running();
    let effects = frame(&mut core, "canvas:updateObject", json!({"id": "ghost", "properties": {}}));
    assert!(effects.contains(&Effect::Log("Error: Invalid object updating for ghost".into())));
    assert_eq!(halts(&effects), 1);

    let mut core = running();
    let effects = frame(
        &mut core,
        "canvas:animateObject",
        json!({"id": "ghost", "duration": 10, "properties": {}}),
    );
    assert!(effects.contains(&Effect::Log("Error: Invalid object animate for ghost".into())));
    assert_eq!(halts(&effects), 1);
}

#[test]
fn malformed_frame_is_a_violation() {
    let mut core = running();
    let effects = frame(&mut core, "canvas:bogus", Value::Null);
    assert_eq!(halts(&effects), 1);
    assert!(core.console().any(|line| line.starts_with("Error: Malformed command")));
}

// =============================================================
// Engine events
// =============================================================

#[test]
fn started_sorts_by_z_index_and_resets_stats() {
    let mut core = SceneCore::new();
    core.open("demo.lps");
    frame(&mut core, "canvas:defineObject", json!({"id": "hi", "type": "circle", "zIndex": 5}));
    frame(&mut core, "canvas:defineObject", json!({"id": "lo", "type": "circle", "zIndex": 1}));
    frame(&mut core, "canvas:lpsTimeUpdate", json!({"time": 0, "numRules": 3}));

    core.apply(Command::Started, 0.0);
    let z = core.doc().drawable().map(|o| o.z_index).collect::<Vec<_>>();
    assert_eq!(z, [1, 5]);
    assert!(core.stats().metrics().is_empty());
}

#[test]
fn warning_logs_without_state_change() {
    let mut core = running();
    let effects = frame(&mut core, "canvas:lpsWarning", json!("careful"));
    assert_eq!(effects, [Effect::Log("Warning: careful".into())]);
    assert_eq!(core.state(), RunState::Running);
}

#[test]
fn engine_error_reveals_console() {
    let mut core = running();
    let effects = frame(&mut core, "canvas:lpsErrorred", json!("no rules"));
    assert!(effects.contains(&Effect::RevealConsole));
    assert_eq!(core.state(), RunState::Errored);
}

#[test]
fn time_update_sets_label_and_logs() {
    let mut core = running();
    let effects = frame(&mut core, "canvas:lpsTimeUpdate", json!({"time": 4, "numRules": 2}));
    assert_eq!(effects, [Effect::Log("Time 4".into()), Effect::StatsUpdated]);
    assert_eq!(core.time_label(), "4");
    assert_eq!(core.stats().max("numRules"), Some(2.0));
}

#[test]
fn image_commands_become_effects() {
    let mut core = running();
    let effects = frame(&mut core, "canvas:loadImage", json!({"id": "cat", "url": "http://img/cat.png"}));
    assert_eq!(effects, [Effect::LoadImage { id: "cat".into(), url: "http://img/cat.png".into() }]);
    assert_eq!(frame(&mut core, "canvas:waitImagesLoaded", Value::Null), [Effect::AwaitImages]);
    assert_eq!(core.images_loaded(), [Effect::Send(Request::ImagesLoaded)]);
}

#[test]
fn image_failure_clears_scene_and_stops() {
    let mut core = running();
    define_a(&mut core);
    let effects = core.image_failed("cat", "http://img/cat.png");
    assert!(core.doc().is_empty());
    assert_eq!(halts(&effects), 1);
    assert!(effects.contains(&Effect::Log("Error: Unable to load image cat from http://img/cat.png".into())));
}

// =============================================================
// User requests and input
// =============================================================

#[test]
fn pointer_input_dropped_unless_running() {
    let mut core = running();
    define_a(&mut core);
    core.pause();
    assert!(click(&mut core, 5.0, 5.0).is_empty());
    core.resume();
    assert!(observed(&click(&mut core, 5.0, 5.0)).is_some());
}

#[test]
fn drag_follows_pointer_and_reports_release() {
    let mut core = running();
    frame(
        &mut core,
        "canvas:defineObject",
        json!({"id": "d", "type": "circle", "position": [0, 0], "radius": 5, "isDragEnabled": true}),
    );
    core.on_pointer(PointerEvent::new(PointerKind::Press, 0.0, 0.0));
    core.on_pointer(PointerEvent::new(PointerKind::Move, 10.0, 5.0));
    assert_eq!(core.doc().get("d").unwrap().position(), Point::new(10.0, 5.0));

    let effects = core.on_pointer(PointerEvent::new(PointerKind::Release, 10.0, 5.0));
    assert_eq!(
        observed(&effects),
        Some("lpsDragRelease(d, 10, 5),lpsMouseUp(10, 5),lpsMouseUp(d, 10, 5)")
    );
}

#[test]
fn console_input_is_forwarded_verbatim() {
    let mut core = running();
    let effects = core.console_input("fire(alarm)");
    assert_eq!(
        effects,
        [
            Effect::Log("Observing \"fire(alarm)\"".into()),
            Effect::Send(Request::Observe { input: "fire(alarm)".into() }),
        ]
    );
    assert_eq!(observed(&core.console_input("")), Some(""));
}

#[test]
fn console_input_bypasses_the_running_gate() {
    let mut core = SceneCore::new();
    assert_eq!(observed(&core.console_input("hello")), Some("hello"));

    let mut core = running();
    core.pause();
    assert_eq!(observed(&core.console_input("fire(1)")), Some("fire(1)"));
}

#[test]
fn restart_reloads_last_program() {
    let mut core = running();
    assert!(core.restart().is_empty());
    core.stop();
    frame(&mut core, "canvas:lpsHalted", Value::Null);
    let effects = core.restart();
    assert!(effects.contains(&Effect::Log("Restarting demo.lps".into())));
    assert_eq!(core.state(), RunState::Loading);
}

#[test]
fn console_records_logged_lines() {
    let mut core = running();
    core.pause();
    let lines = core.console().collect::<Vec<_>>();
    assert_eq!(lines, ["Starting demo.lps", "Pausing LPS program execution..."]);
}

// =============================================================
// Render
// =============================================================

#[test]
fn render_clears_dirty_flag() {
    let mut core = running();
    define_a(&mut core);
    assert!(core.needs_render());
    let mut list = DisplayList::new();
    core.render(&mut list, 0.0).unwrap();
    assert_eq!(list.ops()[0], DrawOp::Clear { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT });
    assert!(!core.needs_render());
}

#[test]
fn animations_keep_scene_dirty_until_done() {
    let mut core = running();
    define_a(&mut core);
    core.apply_frame(
        "canvas:animateObject",
        &json!({"id": "a", "duration": 100, "properties": {"position": [105, 5]}}),
        1000.0,
    );
    let mut list = DisplayList::new();
    core.render(&mut list, 1050.0).unwrap();
    assert!(core.needs_render());
    assert_eq!(core.doc().get("a").unwrap().position(), Point::new(55.0, 5.0));

    core.render(&mut list, 1100.0).unwrap();
    assert!(!core.needs_render());
    assert_eq!(core.doc().get("a").unwrap().position(), Point::new(105.0, 5.0));
}

#[test]
fn set_order_resorts_immediately() {
    let mut core = running();
    frame(&mut core, "canvas:defineObject", json!({"id": "a", "type": "circle", "zIndex": 2}));
    frame(&mut core, "canvas:defineObject", json!({"id": "b", "type": "circle", "zIndex": 1}));
    frame(&mut core, "canvas:updateObject", json!({"id": "a", "properties": {}}));
    let z = core.doc().drawable().map(|o| o.z_index).collect::<Vec<_>>();
    assert_eq!(z, [1, 2]);

    core.set_order(Box::new(|a: &CanvasObject, b: &CanvasObject| b.z_index.cmp(&a.z_index)));
    let z = core.doc().drawable().map(|o| o.z_index).collect::<Vec<_>>();
    assert_eq!(z, [2, 1]);
    core.set_order(Box::new(InsertionOrder));
}

#[test]
fn each_load_gets_a_new_run_id() {
    let mut core = SceneCore::new();
    assert_eq!(core.run_id(), 0);
    core.open("a.lps");
    assert_eq!(core.run_id(), 1);

    core.apply(Command::Started, 0.0);
    core.stop();
    core.apply(Command::Halted, 0.0);
    core.restart();
    assert_eq!(core.run_id(), 2);
}
