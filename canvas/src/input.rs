//! Input model: pointer events and the button/position tracker.
//!
//! The shell reports four pointer event kinds. [`PointerState`] remembers
//! whether the button is held and where the previous event landed, which is
//! everything the translator needs to compute drag deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// Which pointer event occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Press and release on the same spot.
    Click,
    /// Button went down.
    Press,
    /// Button went up.
    Release,
    /// Pointer moved.
    Move,
}

/// A pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub at: Point,
}

impl PointerEvent {
    #[must_use]
    pub fn new(kind: PointerKind, x: f64, y: f64) -> Self {
        Self { kind, at: Point::new(x, y) }
    }
}

/// Button and position memory between pointer events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    /// The primary button is held.
    pub button_down: bool,
    last: Option<Point>,
}

impl PointerState {
    /// Record `event` and return the movement since the previous event.
    ///
    /// The first event ever observed has no predecessor and yields a zero
    /// delta.
    pub fn observe(&mut self, event: &PointerEvent) -> Point {
        let delta = self.last.map_or(Point::default(), |last| event.at - last);
        self.last = Some(event.at);
        match event.kind {
            PointerKind::Press => self.button_down = true,
            PointerKind::Release => self.button_down = false,
            PointerKind::Click | PointerKind::Move => {}
        }
        delta
    }

    /// Last observed pointer position.
    #[must_use]
    pub fn last(&self) -> Option<Point> {
        self.last
    }
}
