#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::render::{DisplayList, DrawOp};

fn descriptor(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn circle(x: f64, y: f64, r: f64) -> CanvasObject {
    CanvasObject::new(Shape::Circle(Circle::new(Point::new(x, y), r)))
}

fn props(value: Value) -> Map<String, Value> {
    descriptor(value)
}

// =============================================================
// Construction
// =============================================================

#[test]
fn descriptor_builds_circle_with_properties() {
    let obj = CanvasObject::from_descriptor(&descriptor(json!({
        "type": "circle", "id": "a", "position": [5, 5], "radius": 10, "fillStyle": "red"
    })))
    .unwrap();
    assert_eq!(obj.kind(), ShapeKind::Circle);
    assert_eq!(obj.position(), Point::new(5.0, 5.0));
    assert_eq!(obj.style.fill_style, "red");
    assert_eq!(obj.style.stroke_style, "#000");
    match obj.shape() {
        Shape::Circle(c) => assert_eq!(c.radius(), 10.0),
        other => panic!("expected circle, got {other:?}"),
    }
}

#[test]
fn descriptor_requires_known_type() {
    assert!(CanvasObject::from_descriptor(&descriptor(json!({"position": [0, 0]}))).is_err());
    assert!(CanvasObject::from_descriptor(&descriptor(json!({"type": "hexagon"}))).is_err());
}

#[test]
fn descriptor_rejects_wrong_typed_property() {
    let err = CanvasObject::from_descriptor(&descriptor(json!({"type": "circle", "radius": "big"})));
    assert!(err.unwrap_err().contains("radius"));
}

#[test]
fn text_defaults_differ_from_circle() {
    let obj = CanvasObject::from_descriptor(&descriptor(json!({"type": "text", "caption": 42}))).unwrap();
    assert_eq!(obj.style.fill_style, "#000");
    assert_eq!(obj.style.stroke_weight, 0.0);
    match obj.shape() {
        Shape::Text(t) => {
            assert_eq!(t.caption, "42");
            assert_eq!(t.font, DEFAULT_FONT);
            assert_eq!(t.max_width, None);
        }
        other => panic!("expected text, got {other:?}"),
    }
}

// =============================================================
// Properties
// =============================================================

#[test]
fn unknown_properties_are_ignored() {
    let mut obj = circle(0.0, 0.0, 1.0);
    obj.apply_properties(&props(json!({"flavor": "mint", "radius": 4}))).unwrap();
    assert_eq!(obj.area(), PI * 4.0 * 4.0);
}

#[test]
fn common_properties_apply_to_every_variant() {
    let mut obj = circle(0.0, 0.0, 1.0);
    obj.apply_properties(&props(json!({
        "strokeDash": [4, 2], "isHidden": true, "zIndex": 7, "strokeWeight": 3
    })))
    .unwrap();
    assert_eq!(obj.style.stroke_dash, vec![4.0, 2.0]);
    assert!(obj.is_hidden);
    assert_eq!(obj.z_index, 7);
    assert_eq!(obj.style.stroke_weight, 3.0);
}

#[test]
fn wrong_typed_property_names_key() {
    let mut obj = circle(0.0, 0.0, 1.0);
    let err = obj.apply_properties(&props(json!({"position": [1]}))).unwrap_err();
    assert_eq!(err, PropertyError("position".into()));
}

#[test]
fn updating_radius_updates_hit_area() {
    let mut obj = circle(5.0, 5.0, 10.0);
    let probe = Point::new(20.0, 5.0);
    assert!(!obj.is_position_hit(probe));
    obj.apply_properties(&props(json!({"radius": 20}))).unwrap();
    assert!(obj.is_position_hit(probe));
}

// =============================================================
// Hit-testing
// =============================================================

#[test]
fn circle_hit_is_strict() {
    let obj = circle(0.0, 0.0, 10.0);
    assert!(obj.is_position_hit(Point::new(0.0, 0.0)));
    assert!(obj.is_position_hit(Point::new(9.9, 0.0)));
    assert!(!obj.is_position_hit(Point::new(10.0, 0.0)));
}

#[test]
fn hidden_object_is_never_hit() {
    let mut obj = circle(0.0, 0.0, 10.0);
    obj.is_hidden = true;
    assert!(!obj.is_position_hit(Point::new(0.0, 0.0)));
}

#[test]
fn image_hit_is_half_open() {
    let obj = CanvasObject::from_descriptor(&descriptor(json!({
        "type": "image", "position": [10, 10], "size": [20, 10], "image": "cat"
    })))
    .unwrap();
    assert!(obj.is_position_hit(Point::new(10.0, 10.0)));
    assert!(obj.is_position_hit(Point::new(29.9, 19.9)));
    assert!(!obj.is_position_hit(Point::new(30.0, 15.0)));
    assert!(!obj.is_position_hit(Point::new(15.0, 20.0)));
}

#[test]
fn text_is_never_hit() {
    let obj = CanvasObject::from_descriptor(&descriptor(json!({
        "type": "text", "position": [0, 0], "caption": "hello"
    })))
    .unwrap();
    assert!(!obj.is_position_hit(Point::new(0.0, 0.0)));
}

// =============================================================
// Animation
// =============================================================

#[test]
fn animation_reaches_target_exactly() {
    let mut obj = circle(0.0, 0.0, 10.0);
    let created = obj.add_animations(100.0, &props(json!({"radius": 30, "position": [10, 20]})), 1000.0).unwrap();
    assert_eq!(created.len(), 2);

    obj.advance_animations(1000.0);
    assert_eq!(obj.position(), Point::new(0.0, 0.0));

    obj.advance_animations(1050.0);
    assert_eq!(obj.position(), Point::new(5.0, 10.0));

    obj.advance_animations(1100.0);
    assert_eq!(obj.position(), Point::new(10.0, 20.0));
    assert!(!obj.is_animating());
}

#[test]
fn non_animatable_keys_are_skipped() {
    let mut obj = circle(0.0, 0.0, 10.0);
    let created = obj.add_animations(100.0, &props(json!({"fillStyle": "red"})), 0.0).unwrap();
    assert!(created.is_empty());
    assert!(!obj.is_animating());
}

#[test]
fn malformed_animation_target_is_an_error() {
    let mut obj = circle(0.0, 0.0, 10.0);
    let err = obj.add_animations(100.0, &props(json!({"radius": "huge"})), 0.0).unwrap_err();
    assert_eq!(err.0, "radius");
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_arms_then_follows_deltas() {
    let mut obj = circle(0.0, 0.0, 10.0);
    obj.handle_drag(Point::new(5.0, 5.0));
    assert_eq!(obj.position(), Point::new(0.0, 0.0));

    obj.apply_properties(&props(json!({"isDragEnabled": true}))).unwrap();
    assert_eq!(obj.drag_state(), DragState::Armed);

    obj.handle_drag(Point::new(5.0, 5.0));
    assert_eq!(obj.drag_state(), DragState::Dragging);
    obj.handle_drag(Point::new(1.0, -2.0));
    assert_eq!(obj.position(), Point::new(6.0, 3.0));

    obj.end_drag();
    assert_eq!(obj.drag_state(), DragState::Disabled);
    assert!(!obj.is_drag_enabled());
}

#[test]
fn starting_drag_drops_position_animation() {
    let mut obj = circle(0.0, 0.0, 10.0);
    obj.apply_properties(&props(json!({"isDragEnabled": true}))).unwrap();
    obj.add_animations(100.0, &props(json!({"position": [50, 50], "radius": 20})), 0.0).unwrap();
    obj.start_drag();
    assert_eq!(obj.animations().len(), 1);
    assert_eq!(obj.animations()[0].property, "radius");
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn circle_draws_fill_then_stroke() {
    let mut obj = circle(1.0, 2.0, 3.0);
    let mut list = DisplayList::new();
    obj.draw(&mut list, 0.0).unwrap();
    let ops = list.ops();
    assert!(ops.contains(&DrawOp::Arc {
        center: Point::new(1.0, 2.0),
        radius: 3.0,
        start: 0.0,
        end: PI_2,
        anticlockwise: true,
    }));
    assert_eq!(ops.last(), Some(&DrawOp::Stroke));
}

#[test]
fn zero_stroke_weight_skips_stroke() {
    let mut obj = circle(0.0, 0.0, 3.0);
    obj.style.stroke_weight = 0.0;
    let mut list = DisplayList::new();
    obj.draw(&mut list, 0.0).unwrap();
    assert!(!list.ops().contains(&DrawOp::Stroke));
}

#[test]
fn hidden_object_draws_nothing_but_still_animates() {
    let mut obj = circle(0.0, 0.0, 3.0);
    obj.is_hidden = true;
    obj.add_animations(10.0, &props(json!({"radius": 6})), 0.0).unwrap();
    let mut list = DisplayList::new();
    obj.draw(&mut list, 10.0).unwrap();
    assert!(list.is_empty());
    assert_eq!(obj.area(), PI * 6.0 * 6.0);
}
