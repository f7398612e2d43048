/// Settings for the geometry produced when clip paths are applied.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NormalizeOptions {
	/// Largest distance between a curve and the line segments it is flattened into.
	pub flatten_tolerance: f64,
	/// Decimal places of the coordinates in clipped path data.
	pub precision: usize,
}

impl Default for NormalizeOptions {
	fn default() -> Self {
		Self {
			flatten_tolerance: 0.01,
			precision: 3,
		}
	}
}

impl NormalizeOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_flatten_tolerance(mut self, flatten_tolerance: f64) -> Self {
		self.flatten_tolerance = flatten_tolerance;
		self
	}

	pub fn with_precision(mut self, precision: usize) -> Self {
		self.precision = precision;
		self
	}
}
