use glam::DVec2;

/// A position in 2D space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ORIGIN: Self = Self { x: 0., y: 0. };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Rounds both coordinates to `digits` decimal places, useful when comparing results of trigonometry.
	pub fn round(self, digits: i32) -> Self {
		let factor = 10_f64.powi(digits);
		Self::new((self.x * factor).round() / factor, (self.y * factor).round() / factor)
	}

	pub fn almost_equals(self, other: Self, tolerance: f64) -> bool {
		(self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
	}
}

impl From<(f64, f64)> for Point {
	fn from((x, y): (f64, f64)) -> Self {
		Self::new(x, y)
	}
}

impl From<DVec2> for Point {
	fn from(value: DVec2) -> Self {
		Self::new(value.x, value.y)
	}
}

impl From<Point> for DVec2 {
	fn from(value: Point) -> Self {
		DVec2::new(value.x, value.y)
	}
}

impl From<kurbo::Point> for Point {
	fn from(value: kurbo::Point) -> Self {
		Self::new(value.x, value.y)
	}
}

impl From<Point> for kurbo::Point {
	fn from(value: Point) -> Self {
		kurbo::Point::new(value.x, value.y)
	}
}

/// A displacement in 2D space. Unlike a [`Point`], a vector ignores the translation part of a transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
	pub dx: f64,
	pub dy: f64,
}

impl Vector {
	pub const ZERO: Self = Self { dx: 0., dy: 0. };

	pub const fn new(dx: f64, dy: f64) -> Self {
		Self { dx, dy }
	}

	pub fn length(self) -> f64 {
		self.dx.hypot(self.dy)
	}
}

impl From<(f64, f64)> for Vector {
	fn from((dx, dy): (f64, f64)) -> Self {
		Self::new(dx, dy)
	}
}

impl From<DVec2> for Vector {
	fn from(value: DVec2) -> Self {
		Self::new(value.x, value.y)
	}
}

impl From<Vector> for DVec2 {
	fn from(value: Vector) -> Self {
		DVec2::new(value.dx, value.dy)
	}
}

/// An axis-aligned rectangle described by its top-left corner and its size.
///
/// Well-formed input never has a negative size, but a flipped rectangle is still meaningful to [`Affine2D::rect_to_rect`](crate::Affine2D::rect_to_rect).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self { x, y, width, height }
	}

	/// The unit square, the coordinate system of `objectBoundingBox` units.
	pub const UNIT: Self = Self::new(0., 0., 1., 1.);

	/// Builds the smallest rectangle containing both corners.
	pub fn from_corners(min: Point, max: Point) -> Self {
		Self::new(min.x.min(max.x), min.y.min(max.y), (max.x - min.x).abs(), (max.y - min.y).abs())
	}

	/// A rectangle with zero width or height covers no area.
	pub fn is_empty(&self) -> bool {
		self.width == 0. || self.height == 0.
	}

	pub fn min(&self) -> Point {
		Point::new(self.x, self.y)
	}

	pub fn max(&self) -> Point {
		Point::new(self.x + self.width, self.y + self.height)
	}
}

impl From<(f64, f64, f64, f64)> for Rect {
	fn from((x, y, width, height): (f64, f64, f64, f64)) -> Self {
		Self::new(x, y, width, height)
	}
}
