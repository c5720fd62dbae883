//! Drawing surfaces.
//!
//! Objects paint through the [`Surface`] trait, a thin mirror of the 2D
//! canvas API. Two surfaces ship with the crate:
//!
//! - [`DisplayList`] records [`DrawOp`]s. The headless host serializes one
//!   list per frame and ships it to whatever shell displays the scene.
//! - [`WebSurface`] forwards straight to a browser
//!   [`web_sys::CanvasRenderingContext2d`].
//!
//! Surfaces receive read-only geometry and never mutate scene state.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::geom::Point;

/// The drawing operations objects need.
pub trait Surface {
    type Error;

    /// Clear the full surface before a frame.
    ///
    /// # Errors
    ///
    /// Surface-specific.
    fn clear(&mut self, width: f64, height: f64) -> Result<(), Self::Error>;

    fn begin_path(&mut self);

    /// Add a circular arc to the current path.
    ///
    /// # Errors
    ///
    /// Surface-specific (e.g. a negative radius in the browser).
    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, anticlockwise: bool) -> Result<(), Self::Error>;

    fn rect(&mut self, origin: Point, size: Point);

    fn fill(&mut self);

    fn stroke(&mut self);

    /// # Errors
    ///
    /// Surface-specific.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), Self::Error>;

    fn set_fill_style(&mut self, style: &str);

    fn set_stroke_style(&mut self, style: &str);

    fn set_line_width(&mut self, width: f64);

    fn set_font(&mut self, font: &str);

    /// # Errors
    ///
    /// Surface-specific.
    fn fill_text(&mut self, text: &str, at: Point, max_width: Option<f64>) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Surface-specific.
    fn stroke_text(&mut self, text: &str, at: Point, max_width: Option<f64>) -> Result<(), Self::Error>;

    /// Draw a loaded image stretched over `origin..origin + size`.
    ///
    /// # Errors
    ///
    /// Surface-specific.
    fn draw_image(&mut self, image: &str, origin: Point, size: Point) -> Result<(), Self::Error>;
}

// =============================================================
// Display list
// =============================================================

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Clear { width: f64, height: f64 },
    BeginPath,
    Arc { center: Point, radius: f64, start: f64, end: f64, anticlockwise: bool },
    Rect { origin: Point, size: Point },
    Fill,
    Stroke,
    LineDash { segments: Vec<f64> },
    FillStyle { style: String },
    StrokeStyle { style: String },
    LineWidth { width: f64 },
    Font { font: String },
    FillText { text: String, at: Point, max_width: Option<f64> },
    StrokeText { text: String, at: Point, max_width: Option<f64> },
    Image { image: String, origin: Point, size: Point },
}

/// A surface that records operations instead of rasterizing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Surface for DisplayList {
    type Error = Infallible;

    fn clear(&mut self, width: f64, height: f64) -> Result<(), Infallible> {
        self.ops.push(DrawOp::Clear { width, height });
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, anticlockwise: bool) -> Result<(), Infallible> {
        self.ops.push(DrawOp::Arc { center, radius, start, end, anticlockwise });
        Ok(())
    }

    fn rect(&mut self, origin: Point, size: Point) {
        self.ops.push(DrawOp::Rect { origin, size });
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill);
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), Infallible> {
        self.ops.push(DrawOp::LineDash { segments: segments.to_vec() });
        Ok(())
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ops.push(DrawOp::FillStyle { style: style.to_owned() });
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ops.push(DrawOp::StrokeStyle { style: style.to_owned() });
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(DrawOp::LineWidth { width });
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(DrawOp::Font { font: font.to_owned() });
    }

    fn fill_text(&mut self, text: &str, at: Point, max_width: Option<f64>) -> Result<(), Infallible> {
        self.ops.push(DrawOp::FillText { text: text.to_owned(), at, max_width });
        Ok(())
    }

    fn stroke_text(&mut self, text: &str, at: Point, max_width: Option<f64>) -> Result<(), Infallible> {
        self.ops.push(DrawOp::StrokeText { text: text.to_owned(), at, max_width });
        Ok(())
    }

    fn draw_image(&mut self, image: &str, origin: Point, size: Point) -> Result<(), Infallible> {
        self.ops.push(DrawOp::Image { image: image.to_owned(), origin, size });
        Ok(())
    }
}

// =============================================================
// Browser 2D context
// =============================================================

/// A surface backed by a browser canvas context.
///
/// Images are looked up by the identifier they were loaded under; drawing an
/// image that has not been loaded is skipped.
pub struct WebSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    images: &'a HashMap<String, HtmlImageElement>,
}

impl<'a> WebSurface<'a> {
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d, images: &'a HashMap<String, HtmlImageElement>) -> Self {
        Self { ctx, images }
    }
}

impl Surface for WebSurface<'_> {
    type Error = JsValue;

    fn clear(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        self.ctx.clear_rect(0.0, 0.0, width, height);
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, anticlockwise: bool) -> Result<(), JsValue> {
        self.ctx
            .arc_with_anticlockwise(center.x, center.y, radius, start, end, anticlockwise)
    }

    fn rect(&mut self, origin: Point, size: Point) {
        self.ctx.rect(origin.x, origin.y, size.x, size.y);
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), JsValue> {
        let array = js_sys::Array::new();
        for s in segments {
            array.push(&JsValue::from_f64(*s));
        }
        self.ctx.set_line_dash(&array)
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ctx.set_fill_style_str(style);
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ctx.set_stroke_style_str(style);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_text(&mut self, text: &str, at: Point, max_width: Option<f64>) -> Result<(), JsValue> {
        match max_width {
            Some(w) => self.ctx.fill_text_with_max_width(text, at.x, at.y, w),
            None => self.ctx.fill_text(text, at.x, at.y),
        }
    }

    fn stroke_text(&mut self, text: &str, at: Point, max_width: Option<f64>) -> Result<(), JsValue> {
        match max_width {
            Some(w) => self.ctx.stroke_text_with_max_width(text, at.x, at.y, w),
            None => self.ctx.stroke_text(text, at.x, at.y),
        }
    }

    fn draw_image(&mut self, image: &str, origin: Point, size: Point) -> Result<(), JsValue> {
        let Some(element) = self.images.get(image) else {
            return Ok(());
        };
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(element, origin.x, origin.y, size.x, size.y)
    }
}
