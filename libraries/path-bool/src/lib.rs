//! Boolean operations on filled regions, computed on polygons flattened from SVG path data.

mod aabb;
mod epsilons;
mod error;
mod grid;
mod line_segment;
mod path_boolean;
mod path_data;
mod region;

pub use aabb::Aabb;
pub use error::BooleanError;
pub use path_boolean::{FillRule, PathBooleanOperation, path_boolean, path_union_all};
pub use path_data::{path_from_path_data, path_to_path_data, region_from_bez_path};
pub use region::{Contour, Region};

#[cfg(test)]
mod test {
	use crate::{FillRule, PathBooleanOperation, path_boolean, path_from_path_data, path_to_path_data};
	use pretty_assertions::assert_eq;

	#[test]
	fn triangle_and_rectangle() {
		let a = path_from_path_data("M 10 10 L 50 10 L 30 40 Z", 0.1).unwrap();
		let b = path_from_path_data("M 20 30 L 60 30 L 60 50 L 20 50 Z", 0.1).unwrap();

		let intersection = path_boolean(&a, FillRule::NonZero, &b, FillRule::NonZero, PathBooleanOperation::Intersection).unwrap();
		// The triangle's tip below y = 30, running from (23.333, 30) to (36.667, 30)
		assert!((intersection.signed_area() - 200. / 3.).abs() < 1e-6);

		let union = path_boolean(&a, FillRule::NonZero, &b, FillRule::NonZero, PathBooleanOperation::Union).unwrap();
		assert!((union.signed_area() - (600. + 800. - 200. / 3.)).abs() < 1e-6);
	}

	#[test]
	fn output_path_data() {
		let a = path_from_path_data("M0,0 H4 V4 H0 Z", 0.1).unwrap();
		let b = path_from_path_data("M2,2 H6 V6 H2 Z", 0.1).unwrap();
		let intersection = path_boolean(&a, FillRule::NonZero, &b, FillRule::NonZero, PathBooleanOperation::Intersection).unwrap();
		assert_eq!(intersection.contours().len(), 1);

		let data = path_to_path_data(&intersection, 6);
		let reparsed = path_from_path_data(&data, 0.1).unwrap();
		assert_eq!(reparsed, intersection);
		assert!((reparsed.signed_area() - 4.).abs() < 1e-9);
	}
}
