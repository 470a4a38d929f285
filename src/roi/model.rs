use serde::{Deserialize, Serialize};

use crate::roi::RoiError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Width and height of a drawing surface in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Bounding box of an on-screen element in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl FrameRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.y >= self.top
            && point.x <= self.left + self.width
            && point.y <= self.top + self.height
    }
}

/// A region of interest in overlay-surface coordinates.
///
/// Always normalized: `(x, y)` is the top-left corner and both extents are
/// non-negative, whichever direction the user dragged in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Map this rect from the rendered surface onto a surface of another
    /// resolution, scaling each axis independently.
    ///
    /// The backend receives the ROI in rendered-player pixels together with
    /// the player size (`iframe_width`/`iframe_height`) and is expected to
    /// apply exactly this transform against the decoded video's native size.
    pub fn rescale(&self, from: SurfaceSize, to: SurfaceSize) -> Result<Rect, RoiError> {
        if from.is_degenerate() {
            return Err(RoiError::ZeroSurface);
        }
        let sx = to.width / from.width;
        let sy = to.height / from.height;
        Ok(Rect {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black_with_opacity(opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(0, 0, 0, a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 2.0,
            color: Color::rgba(255, 0, 0, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub mask: Color,
    pub stroke: StrokeStyle,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            mask: Color::black_with_opacity(0.2),
            stroke: StrokeStyle::default(),
        }
    }
}
