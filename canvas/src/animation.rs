//! Time-bounded property interpolation.
//!
//! An [`Animation`] moves one property of its owner from the value it had
//! when the animation was created to a target value over `duration_ms`.
//! Progress is a pure function of the sampling time, so sampling the same
//! timestamp twice yields the same value. Once the end time is reached the
//! animation reports [`Step::Complete`] carrying exactly the target value,
//! and the owner drops it from its active list.
//!
//! Objects own their active list outright; nothing outside the object holds
//! a reference into it.

#[cfg(test)]
#[path = "animation_test.rs"]
mod animation_test;

use serde_json::{Map, Value};

use crate::geom::{Point, lerp};
use crate::object::PropertyError;

/// An animatable property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimValue {
    /// Componentwise-interpolated pair (positions, sizes).
    Tuple(Point),
    /// Single numeric value (radius, stroke weight).
    Scalar(f64),
}

impl AnimValue {
    fn interpolate(self, to: AnimValue, t: f64) -> AnimValue {
        match (self, to) {
            (Self::Tuple(a), Self::Tuple(b)) => Self::Tuple(a.lerp(b, t)),
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(lerp(a, b, t)),
            // Kinds never mix: both ends come from the same property list.
            (_, target) => target,
        }
    }
}

/// The animatable property names of one object variant.
#[derive(Debug, Clone, Copy)]
pub struct PropertySet {
    /// Properties interpolated componentwise.
    pub tuples: &'static [&'static str],
    /// Properties interpolated as a single number.
    pub scalars: &'static [&'static str],
}

/// Result of sampling an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Still running; apply the value and keep the animation.
    Active(AnimValue),
    /// Finished; apply the (exact target) value and drop the animation.
    Complete(AnimValue),
}

/// One property transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// Property being driven.
    pub property: &'static str,
    /// Value captured when the animation was created.
    pub from: AnimValue,
    /// Value applied at completion.
    pub to: AnimValue,
    /// Scene clock at creation, in milliseconds.
    pub start_ms: f64,
    /// Transition length in milliseconds. Non-positive completes immediately.
    pub duration_ms: f64,
}

impl Animation {
    /// Fraction of the transition elapsed at `now_ms`, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Sample the animation at `now_ms`.
    #[must_use]
    pub fn step(&self, now_ms: f64) -> Step {
        if self.duration_ms <= 0.0 || now_ms >= self.start_ms + self.duration_ms {
            return Step::Complete(self.to);
        }
        Step::Active(self.from.interpolate(self.to, self.progress(now_ms)))
    }
}

/// Access to an owner's animatable properties.
pub trait Animatable {
    /// The properties this owner can animate.
    fn animatable_properties(&self) -> PropertySet;

    /// Current value of an animatable property.
    fn animated_value(&self, property: &str) -> Option<AnimValue>;

    /// Overwrite an animatable property.
    fn set_animated_value(&mut self, property: &str, value: AnimValue);
}

/// Build one animation per recognized property in `targets`, append them to
/// `active` and return the constructed set.
///
/// Start values are captured from `owner` now, not at the first tick. Keys
/// that are not animatable for this owner are skipped, so the result may be
/// empty.
///
/// # Errors
///
/// Returns [`PropertyError`] when a recognized property's target has the
/// wrong shape (e.g. a position that is not an `[x, y]` pair).
pub fn create_animations<A: Animatable + ?Sized>(
    owner: &A,
    active: &mut Vec<Animation>,
    duration_ms: f64,
    targets: &Map<String, Value>,
    now_ms: f64,
) -> Result<Vec<Animation>, PropertyError> {
    let props = owner.animatable_properties();
    let mut created = Vec::new();

    for (key, target) in targets {
        let (property, to) = if let Some(name) = props.tuples.iter().find(|p| **p == key.as_str()) {
            let point = Point::from_json(target).ok_or_else(|| PropertyError(key.clone()))?;
            (*name, AnimValue::Tuple(point))
        } else if let Some(name) = props.scalars.iter().find(|p| **p == key.as_str()) {
            let n = target.as_f64().ok_or_else(|| PropertyError(key.clone()))?;
            (*name, AnimValue::Scalar(n))
        } else {
            continue;
        };
        let Some(from) = owner.animated_value(property) else {
            continue;
        };
        created.push(Animation { property, from, to, start_ms: now_ms, duration_ms });
    }

    active.extend(created.iter().cloned());
    Ok(created)
}

/// Advance every animation in `active` to `now_ms`, writing values into
/// `owner` in list order and dropping completed animations.
///
/// When two animations drive the same property, the later one in the list
/// wins for that tick.
pub fn advance<A: Animatable + ?Sized>(owner: &mut A, active: &mut Vec<Animation>, now_ms: f64) {
    active.retain(|animation| match animation.step(now_ms) {
        Step::Active(value) => {
            owner.set_animated_value(animation.property, value);
            true
        }
        Step::Complete(value) => {
            owner.set_animated_value(animation.property, value);
            false
        }
    });
}
