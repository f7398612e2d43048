use crate::geometry::{Point, Rect, Vector};
use crate::number::format_number;

use glam::DAffine2;
use std::fmt;

/// Determinants (and linear coefficients) whose magnitude is at most this value are treated as zero.
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// A 2D affine transform, stored as the six coefficients of the matrix
///
/// ```text
/// | a  c  e |
/// | b  d  f |
/// | 0  0  1 |
/// ```
///
/// which maps the point `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
///
/// The builder methods ([`translate`](Self::translate), [`scale`](Self::scale), [`rotate`](Self::rotate), [`skew_x`](Self::skew_x), [`skew_y`](Self::skew_y))
/// post-multiply: the new elementary transform acts in the coordinate space already established by `self`, exactly like consecutive entries of an
/// SVG transform list. [`product`](Self::product) spells out the order explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine2D {
	pub a: f64,
	pub b: f64,
	pub c: f64,
	pub d: f64,
	pub e: f64,
	pub f: f64,
}

impl Default for Affine2D {
	fn default() -> Self {
		Self::identity()
	}
}

impl Affine2D {
	pub const IDENTITY: Self = Self::new(1., 0., 0., 1., 0., 0.);
	pub const DEGENERATE: Self = Self::new(0., 0., 0., 0., 0., 0.);

	pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
		Self { a, b, c, d, e, f }
	}

	pub const fn identity() -> Self {
		Self::IDENTITY
	}

	/// The sentinel returned when inverting a transform that has no inverse. Every coefficient is zero.
	pub const fn degenerate() -> Self {
		Self::DEGENERATE
	}

	pub fn from_coefficients([a, b, c, d, e, f]: [f64; 6]) -> Self {
		Self::new(a, b, c, d, e, f)
	}

	pub fn to_coefficients(self) -> [f64; 6] {
		[self.a, self.b, self.c, self.d, self.e, self.f]
	}

	/// Returns the transform equivalent to applying `first`, then `second`.
	///
	/// In matrix terms this is `second · first`, so `product(A, B)` and `product(B, A)` differ whenever `A` and `B` don't commute.
	pub fn product(first: Self, second: Self) -> Self {
		Self::new(
			second.a * first.a + second.c * first.b,
			second.b * first.a + second.d * first.b,
			second.a * first.c + second.c * first.d,
			second.b * first.c + second.d * first.d,
			second.a * first.e + second.c * first.f + second.e,
			second.b * first.e + second.d * first.f + second.f,
		)
	}

	/// Appends `inner`, which then acts in the coordinate space of `self`.
	fn then_inner(self, inner: Self) -> Self {
		Self::product(inner, self)
	}

	pub fn translate(self, tx: f64, ty: f64) -> Self {
		self.then_inner(Self::new(1., 0., 0., 1., tx, ty))
	}

	pub fn scale(self, sx: f64, sy: f64) -> Self {
		self.then_inner(Self::new(sx, 0., 0., sy, 0., 0.))
	}

	/// Same as [`scale`](Self::scale) with equal factors on both axes.
	pub fn scale_uniform(self, s: f64) -> Self {
		self.scale(s, s)
	}

	/// Rotates by `angle` radians about the origin of the current coordinate space.
	pub fn rotate(self, angle: f64) -> Self {
		let (sin, cos) = angle.sin_cos();
		self.then_inner(Self::new(cos, sin, -sin, cos, 0., 0.))
	}

	/// Rotates by `angle` radians about `(cx, cy)`.
	pub fn rotate_about(self, angle: f64, cx: f64, cy: f64) -> Self {
		self.translate(cx, cy).rotate(angle).translate(-cx, -cy)
	}

	pub fn skew_x(self, angle: f64) -> Self {
		self.then_inner(Self::new(1., 0., angle.tan(), 1., 0., 0.))
	}

	pub fn skew_y(self, angle: f64) -> Self {
		self.then_inner(Self::new(1., angle.tan(), 0., 1., 0., 0.))
	}

	pub fn map_point(&self, point: impl Into<Point>) -> Point {
		let Point { x, y } = point.into();
		Point::new(self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
	}

	/// Maps a displacement through the linear part only; the translation `(e, f)` has no effect.
	pub fn map_vector(&self, vector: impl Into<Vector>) -> Vector {
		let Vector { dx, dy } = vector.into();
		Vector::new(self.a * dx + self.c * dy, self.b * dx + self.d * dy)
	}

	pub fn determinant(&self) -> f64 {
		self.a * self.d - self.b * self.c
	}

	/// A degenerate transform collapses area to zero and can't be inverted.
	///
	/// The all-coefficients check catches tiny linear parts whose determinant would underflow to a value that merely looks non-zero.
	pub fn is_degenerate(&self) -> bool {
		self.determinant().abs() <= DEGENERATE_EPSILON || [self.a, self.b, self.c, self.d].iter().all(|value| value.abs() <= DEGENERATE_EPSILON)
	}

	/// Returns the inverse transform, or [`Affine2D::degenerate`] when there is none. Use [`is_degenerate`](Self::is_degenerate) to tell the two apart.
	pub fn inverse(&self) -> Self {
		if self.is_degenerate() {
			return Self::degenerate();
		}

		let Self { a, b, c, d, e, f } = *self;
		let det = self.determinant();
		Self::new(d / det, -b / det, -c / det, a / det, (c * f - d * e) / det, (b * e - a * f) / det)
	}

	/// Returns the scale + translate transform that maps `src` onto `dest`.
	///
	/// An axis where `src` has no extent keeps a scale of 1. A `dest` without area makes the whole result degenerate.
	pub fn rect_to_rect(src: Rect, dest: Rect) -> Self {
		if dest.is_empty() {
			return Self::degenerate();
		}

		let sx = if src.width == 0. { 1. } else { dest.width / src.width };
		let sy = if src.height == 0. { 1. } else { dest.height / src.height };

		Self::new(sx, 0., 0., sy, dest.x - src.x * sx, dest.y - src.y * sy)
	}

	pub fn gettranslate(&self) -> (f64, f64) {
		(self.e, self.f)
	}

	pub fn getscale(&self) -> (f64, f64) {
		(self.a, self.d)
	}

	pub fn is_identity(&self) -> bool {
		*self == Self::IDENTITY
	}

	/// Component-wise comparison where each pair of coefficients may differ by at most `tolerance`.
	pub fn almost_equals(&self, other: &Self, tolerance: f64) -> bool {
		self.to_coefficients().iter().zip(other.to_coefficients()).all(|(lhs, rhs)| (lhs - rhs).abs() <= tolerance)
	}

	/// Formats the transform as an SVG `matrix(...)` function.
	pub fn to_svg_transform(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Affine2D {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let coefficients = self.to_coefficients().map(format_number);
		write!(f, "matrix({})", coefficients.join(" "))
	}
}

impl From<DAffine2> for Affine2D {
	fn from(value: DAffine2) -> Self {
		Self::from_coefficients(value.to_cols_array())
	}
}

impl From<Affine2D> for DAffine2 {
	fn from(value: Affine2D) -> Self {
		DAffine2::from_cols_array(&value.to_coefficients())
	}
}

impl From<kurbo::Affine> for Affine2D {
	fn from(value: kurbo::Affine) -> Self {
		Self::from_coefficients(value.as_coeffs())
	}
}

impl From<Affine2D> for kurbo::Affine {
	fn from(value: Affine2D) -> Self {
		kurbo::Affine::new(value.to_coefficients())
	}
}
