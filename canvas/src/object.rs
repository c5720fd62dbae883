//! Canvas objects: the polymorphic things the engine puts on screen.
//!
//! A [`CanvasObject`] is a closed set of shape variants ([`Shape`]) wrapped
//! with the state every variant shares: paint style, visibility, stacking
//! key, drag state and the object's own active animations. Capabilities
//! (draw, hit-test, animate, drag) dispatch on the variant tag.
//!
//! Objects are built from engine descriptors (`{"type": "circle", ...}`) and
//! mutated by property maps using the engine's camelCase keys.

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::animation::{self, AnimValue, Animatable, Animation, PropertySet};
use crate::consts::{DEFAULT_FONT, PI_2};
use crate::geom::Point;
use crate::render::Surface;

const CIRCLE_PROPERTIES: PropertySet = PropertySet {
    tuples: &["position"],
    scalars: &["radius", "strokeWeight"],
};

const TEXT_PROPERTIES: PropertySet = PropertySet {
    tuples: &["position"],
    scalars: &["strokeWeight", "maxWidth"],
};

const IMAGE_PROPERTIES: PropertySet = PropertySet {
    tuples: &["position", "size"],
    scalars: &["strokeWeight"],
};

/// A recognized property carried a value of the wrong shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid value for property {0}")]
pub struct PropertyError(pub String);

/// The variant tag of a canvas object, as named in descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Filled circle around a center point.
    Circle,
    /// Single line of text anchored at its baseline start.
    Text,
    /// Loaded bitmap stretched over a rectangle.
    Image,
}

/// Paint style shared by every variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// CSS fill color.
    pub fill_style: String,
    /// CSS stroke color.
    pub stroke_style: String,
    /// Line dash segments; empty draws solid lines.
    pub stroke_dash: Vec<f64>,
    /// Stroke width. Zero or less skips stroking entirely.
    pub stroke_weight: f64,
}

impl Style {
    fn for_kind(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Circle | ShapeKind::Image => Self {
                fill_style: "#FFF".into(),
                stroke_style: "#000".into(),
                stroke_dash: Vec::new(),
                stroke_weight: 1.0,
            },
            ShapeKind::Text => Self {
                fill_style: "#000".into(),
                stroke_style: "#FFF".into(),
                stroke_dash: Vec::new(),
                stroke_weight: 0.0,
            },
        }
    }
}

/// Circle geometry. The squared radius used by hit-testing is derived from
/// the radius and only ever written through [`Circle::set_radius`].
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub position: Point,
    radius: f64,
    radius_sq: f64,
}

impl Circle {
    #[must_use]
    pub fn new(position: Point, radius: f64) -> Self {
        Self { position, radius, radius_sq: radius * radius }
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.radius_sq = radius * radius;
    }

    /// Strict containment by squared distance from the center.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let dx = p.x - self.position.x;
        let dy = p.y - self.position.y;
        dx * dx + dy * dy < self.radius_sq
    }
}

/// Text geometry and content.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub position: Point,
    pub caption: String,
    pub font: String,
    pub max_width: Option<f64>,
}

/// Image placement. `image` names a resource loaded via `loadImage`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub position: Point,
    pub size: Point,
    pub image: String,
}

impl Image {
    /// Half-open containment in the image rectangle.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let (x0, x1) = ordered(self.position.x, self.position.x + self.size.x);
        let (y0, y1) = ordered(self.position.y, self.position.y + self.size.y);
        p.x >= x0 && p.x < x1 && p.y >= y0 && p.y < y1
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Variant-specific geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Text(Text),
    Image(Image),
}

impl Shape {
    fn empty(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Circle => Self::Circle(Circle::new(Point::default(), 0.0)),
            ShapeKind::Text => Self::Text(Text {
                position: Point::default(),
                caption: String::new(),
                font: DEFAULT_FONT.into(),
                max_width: None,
            }),
            ShapeKind::Image => Self::Image(Image {
                position: Point::default(),
                size: Point::default(),
                image: String::new(),
            }),
        }
    }

    fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle(_) => ShapeKind::Circle,
            Self::Text(_) => ShapeKind::Text,
            Self::Image(_) => ShapeKind::Image,
        }
    }

    fn position_mut(&mut self) -> &mut Point {
        match self {
            Self::Circle(c) => &mut c.position,
            Self::Text(t) => &mut t.position,
            Self::Image(i) => &mut i.position,
        }
    }

    fn set_property(&mut self, key: &str, value: &Value) -> Result<(), PropertyError> {
        if key == "position" {
            *self.position_mut() = point_value(key, value)?;
            return Ok(());
        }
        match self {
            Self::Circle(c) => {
                if key == "radius" {
                    c.set_radius(number_value(key, value)?);
                }
            }
            Self::Text(t) => match key {
                "caption" => t.caption = caption_value(key, value)?,
                "font" => t.font = string_value(key, value)?,
                "maxWidth" => {
                    t.max_width = if value.is_null() { None } else { Some(number_value(key, value)?) };
                }
                _ => {}
            },
            Self::Image(i) => match key {
                "size" => i.size = point_value(key, value)?,
                "image" => i.image = string_value(key, value)?,
                _ => {}
            },
        }
        Ok(())
    }
}

/// Where an object stands with respect to pointer dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// Not draggable.
    #[default]
    Disabled,
    /// Enabled by the engine; waiting for the first pointer delta.
    Armed,
    /// Following the pointer.
    Dragging,
}

/// A visual entity on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasObject {
    shape: Shape,
    /// Paint style.
    pub style: Style,
    /// Hidden objects are neither drawn nor hit.
    pub is_hidden: bool,
    /// Stacking key consumed by the default render order.
    pub z_index: i64,
    drag: DragState,
    animations: Vec<Animation>,
}

impl CanvasObject {
    /// Wrap a shape with the variant's default style.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            style: Style::for_kind(shape.kind()),
            shape,
            is_hidden: false,
            z_index: 0,
            drag: DragState::Disabled,
            animations: Vec::new(),
        }
    }

    /// Build an object from an engine descriptor: a `type` tag plus any
    /// initial properties.
    ///
    /// # Errors
    ///
    /// Returns a reason string when the tag is missing or unknown, or when a
    /// recognized property carries the wrong kind of value.
    pub fn from_descriptor(descriptor: &Map<String, Value>) -> Result<Self, String> {
        let tag = descriptor
            .get("type")
            .ok_or_else(|| "missing object type".to_string())?;
        let kind: ShapeKind =
            serde_json::from_value(tag.clone()).map_err(|_| format!("unknown object type {tag}"))?;

        let mut obj = Self::new(Shape::empty(kind));
        let props = descriptor
            .iter()
            .filter(|(k, _)| k.as_str() != "type" && k.as_str() != "id")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Map<_, _>>();
        obj.apply_properties(&props).map_err(|e| e.to_string())?;
        Ok(obj)
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn position(&self) -> Point {
        match &self.shape {
            Shape::Circle(c) => c.position,
            Shape::Text(t) => t.position,
            Shape::Image(i) => i.position,
        }
    }

    /// Rough covered area, used by size-based render ordering.
    #[must_use]
    pub fn area(&self) -> f64 {
        match &self.shape {
            Shape::Circle(c) => PI * c.radius() * c.radius(),
            Shape::Image(i) => (i.size.x * i.size.y).abs(),
            Shape::Text(_) => 0.0,
        }
    }

    /// Apply a property map. Unrecognized keys are ignored.
    ///
    /// Keys are applied in map order; on error, earlier keys stay applied.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] naming the first recognized key whose value
    /// has the wrong shape.
    pub fn apply_properties(&mut self, props: &Map<String, Value>) -> Result<(), PropertyError> {
        for (key, value) in props {
            self.set_property(key, value)?;
        }
        Ok(())
    }

    fn set_property(&mut self, key: &str, value: &Value) -> Result<(), PropertyError> {
        match key {
            "fillStyle" => self.style.fill_style = string_value(key, value)?,
            "strokeStyle" => self.style.stroke_style = string_value(key, value)?,
            "strokeWeight" => self.style.stroke_weight = number_value(key, value)?,
            "strokeDash" => {
                self.style.stroke_dash = value
                    .as_array()
                    .and_then(|items| items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
                    .ok_or_else(|| PropertyError(key.into()))?;
            }
            "isHidden" => self.is_hidden = bool_value(key, value)?,
            "isDragEnabled" => self.set_drag_enabled(bool_value(key, value)?),
            "zIndex" => self.z_index = value.as_i64().ok_or_else(|| PropertyError(key.into()))?,
            _ => self.shape.set_property(key, value)?,
        }
        Ok(())
    }

    // --- Hit-testing ---

    /// Whether `p` falls inside this object. Always false while hidden.
    #[must_use]
    pub fn is_position_hit(&self, p: Point) -> bool {
        if self.is_hidden {
            return false;
        }
        match &self.shape {
            Shape::Circle(c) => c.contains(p),
            Shape::Image(i) => i.contains(p),
            // No text metrics outside the browser; text is never a target.
            Shape::Text(_) => false,
        }
    }

    // --- Animation ---

    /// Start transitions toward `targets` for every animatable key and
    /// return them. Non-animatable keys are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] for an animatable key with a malformed target.
    pub fn add_animations(
        &mut self,
        duration_ms: f64,
        targets: &Map<String, Value>,
        now_ms: f64,
    ) -> Result<Vec<Animation>, PropertyError> {
        let mut active = std::mem::take(&mut self.animations);
        let created = animation::create_animations(&*self, &mut active, duration_ms, targets, now_ms);
        self.animations = active;
        created
    }

    /// Advance active animations to `now_ms`, pruning completed ones.
    pub fn advance_animations(&mut self, now_ms: f64) {
        let mut active = std::mem::take(&mut self.animations);
        animation::advance(self, &mut active, now_ms);
        self.animations = active;
    }

    #[must_use]
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.animations.is_empty()
    }

    // --- Drag ---

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Whether the engine has enabled dragging (armed or in progress).
    #[must_use]
    pub fn is_drag_enabled(&self) -> bool {
        self.drag != DragState::Disabled
    }

    fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag = match (enabled, self.drag) {
            (false, _) => DragState::Disabled,
            (true, DragState::Disabled) => DragState::Armed,
            (true, current) => current,
        };
    }

    /// Begin following the pointer. Pending position animations are dropped
    /// so they cannot fight the pointer.
    pub fn start_drag(&mut self) {
        if self.drag == DragState::Disabled {
            return;
        }
        self.drag = DragState::Dragging;
        self.animations.retain(|a| a.property != "position");
    }

    /// Move by a pointer delta. Starts the drag on the first delta.
    pub fn handle_drag(&mut self, delta: Point) {
        match self.drag {
            DragState::Disabled => {}
            DragState::Armed => {
                self.start_drag();
                self.translate(delta);
            }
            DragState::Dragging => self.translate(delta),
        }
    }

    /// Finish dragging and disarm.
    pub fn end_drag(&mut self) {
        self.drag = DragState::Disabled;
    }

    fn translate(&mut self, delta: Point) {
        let position = self.shape.position_mut();
        *position = *position + delta;
    }

    // --- Drawing ---

    /// Advance this tick's animations, then paint the object.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn draw<S: Surface>(&mut self, surface: &mut S, now_ms: f64) -> Result<(), S::Error> {
        self.advance_animations(now_ms);
        if self.is_hidden {
            return Ok(());
        }

        let style = &self.style;
        match &self.shape {
            Shape::Circle(c) => {
                surface.begin_path();
                surface.set_line_dash(&style.stroke_dash)?;
                surface.set_stroke_style(&style.stroke_style);
                surface.set_fill_style(&style.fill_style);
                surface.arc(c.position, c.radius(), 0.0, PI_2, true)?;
                surface.fill();
                if style.stroke_weight > 0.0 {
                    surface.set_line_width(style.stroke_weight);
                    surface.stroke();
                }
            }
            Shape::Text(t) => {
                surface.set_fill_style(&style.fill_style);
                surface.set_stroke_style(&style.stroke_style);
                surface.set_font(&t.font);
                surface.fill_text(&t.caption, t.position, t.max_width)?;
                if style.stroke_weight > 0.0 {
                    surface.set_line_width(style.stroke_weight);
                    surface.stroke_text(&t.caption, t.position, t.max_width)?;
                }
            }
            Shape::Image(i) => {
                surface.draw_image(&i.image, i.position, i.size)?;
                if style.stroke_weight > 0.0 {
                    surface.begin_path();
                    surface.set_line_dash(&style.stroke_dash)?;
                    surface.set_stroke_style(&style.stroke_style);
                    surface.set_line_width(style.stroke_weight);
                    surface.rect(i.position, i.size);
                    surface.stroke();
                }
            }
        }
        Ok(())
    }
}

impl Animatable for CanvasObject {
    fn animatable_properties(&self) -> PropertySet {
        match self.shape {
            Shape::Circle(_) => CIRCLE_PROPERTIES,
            Shape::Text(_) => TEXT_PROPERTIES,
            Shape::Image(_) => IMAGE_PROPERTIES,
        }
    }

    fn animated_value(&self, property: &str) -> Option<AnimValue> {
        match (property, &self.shape) {
            ("position", _) => Some(AnimValue::Tuple(self.position())),
            ("strokeWeight", _) => Some(AnimValue::Scalar(self.style.stroke_weight)),
            ("radius", Shape::Circle(c)) => Some(AnimValue::Scalar(c.radius())),
            ("maxWidth", Shape::Text(t)) => t.max_width.map(AnimValue::Scalar),
            ("size", Shape::Image(i)) => Some(AnimValue::Tuple(i.size)),
            _ => None,
        }
    }

    fn set_animated_value(&mut self, property: &str, value: AnimValue) {
        match (property, value, &mut self.shape) {
            ("position", AnimValue::Tuple(p), shape) => *shape.position_mut() = p,
            ("strokeWeight", AnimValue::Scalar(w), _) => self.style.stroke_weight = w,
            ("radius", AnimValue::Scalar(r), Shape::Circle(c)) => c.set_radius(r),
            ("maxWidth", AnimValue::Scalar(w), Shape::Text(t)) => t.max_width = Some(w),
            ("size", AnimValue::Tuple(s), Shape::Image(i)) => i.size = s,
            _ => {}
        }
    }
}

// =============================================================
// Property value coercion
// =============================================================

fn number_value(key: &str, value: &Value) -> Result<f64, PropertyError> {
    value.as_f64().ok_or_else(|| PropertyError(key.into()))
}

fn bool_value(key: &str, value: &Value) -> Result<bool, PropertyError> {
    value.as_bool().ok_or_else(|| PropertyError(key.into()))
}

fn string_value(key: &str, value: &Value) -> Result<String, PropertyError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| PropertyError(key.into()))
}

fn point_value(key: &str, value: &Value) -> Result<Point, PropertyError> {
    Point::from_json(value).ok_or_else(|| PropertyError(key.into()))
}

/// Captions accept numbers and booleans too, printed as the engine would.
fn caption_value(key: &str, value: &Value) -> Result<String, PropertyError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(PropertyError(key.into())),
    }
}
