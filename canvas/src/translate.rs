//! Pointer events to observation literals.
//!
//! One pointer event becomes one ordered batch of ground literals:
//!
//! 1. (release only) `lpsDragRelease(Id, X, Y)` for every drag-enabled
//!    object, each followed by ending that object's drag, so the literal
//!    reflects the pre-release state;
//! 2. the untargeted literal, e.g. `lpsClick(X, Y)`;
//! 3. one targeted literal, e.g. `lpsClick(Id, X, Y)`, per visible
//!    registered object under the pointer, in registry order.
//!
//! A move while the button is held first forwards the pointer delta to every
//! drag-enabled object, bypassing animation.

#[cfg(test)]
#[path = "translate_test.rs"]
mod translate_test;

use crate::doc::DocStore;
use crate::geom::Point;
use crate::hit;
use crate::input::{PointerEvent, PointerKind};

const DRAG_RELEASE: &str = "lpsDragRelease";

/// Literal functor for a pointer event kind.
#[must_use]
pub fn literal_name(kind: PointerKind) -> &'static str {
    match kind {
        PointerKind::Click => "lpsClick",
        PointerKind::Press => "lpsMouseDown",
        PointerKind::Release => "lpsMouseUp",
        PointerKind::Move => "lpsMouseMove",
    }
}

/// Translate one event. `delta` is the movement since the previous event
/// and `button_down` the button state before this event was applied.
pub fn translate(event: &PointerEvent, delta: Point, button_down: bool, doc: &mut DocStore) -> Vec<String> {
    let mut literals = Vec::new();
    let at = event.at;

    match event.kind {
        PointerKind::Release => {
            doc.for_each_registered_mut(|id, obj| {
                if !obj.is_drag_enabled() {
                    return;
                }
                literals.push(literal(DRAG_RELEASE, Some(id), at));
                obj.end_drag();
            });
        }
        PointerKind::Move if button_down => {
            doc.for_each_registered_mut(|_, obj| {
                if obj.is_drag_enabled() {
                    obj.handle_drag(delta);
                }
            });
        }
        PointerKind::Click | PointerKind::Press | PointerKind::Move => {}
    }

    let name = literal_name(event.kind);
    literals.push(literal(name, None, at));
    for id in hit::hits_at(doc, at) {
        literals.push(literal(name, Some(&id), at));
    }
    literals
}

/// Comma-join a batch. An empty batch yields `None` and must not be sent.
#[must_use]
pub fn join_batch(literals: &[String]) -> Option<String> {
    if literals.is_empty() {
        return None;
    }
    Some(literals.join(","))
}

/// Format `name(Id, X, Y)` or `name(X, Y)`.
#[must_use]
pub fn literal(name: &str, id: Option<&str>, at: Point) -> String {
    let x = format_number(at.x);
    let y = format_number(at.y);
    match id {
        Some(id) => format!("{name}({id}, {x}, {y})"),
        None => format!("{name}({x}, {y})"),
    }
}

/// Integral values print without a fractional part (`5`, not `5.0`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
