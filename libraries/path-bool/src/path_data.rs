use crate::error::BooleanError;
use crate::region::{Contour, Region};
use glam::DVec2;
use kurbo::{BezPath, PathEl};
use std::fmt::Write;

/// Parses SVG path data and flattens its curves into line segments no farther than `tolerance` from the true curve.
///
/// Every subpath is treated as closed, as it is when filled.
pub fn path_from_path_data(data: &str, tolerance: f64) -> Result<Region, BooleanError> {
	let path = BezPath::from_svg(data).map_err(|error| BooleanError::InvalidPathData(error.to_string()))?;
	Ok(region_from_bez_path(&path, tolerance))
}

pub fn region_from_bez_path(path: &BezPath, tolerance: f64) -> Region {
	let mut contours = Vec::new();
	let mut current: Contour = Vec::new();
	let mut subpath_start = DVec2::ZERO;

	kurbo::flatten(path.iter(), tolerance, |element| match element {
		PathEl::MoveTo(point) => {
			if !current.is_empty() {
				contours.push(std::mem::take(&mut current));
			}
			subpath_start = DVec2::new(point.x, point.y);
			current.push(subpath_start);
		}
		PathEl::LineTo(point) => {
			// Drawing after a close continues from the start of the closed subpath
			if current.is_empty() {
				current.push(subpath_start);
			}
			current.push(DVec2::new(point.x, point.y));
		}
		PathEl::ClosePath => contours.push(std::mem::take(&mut current)),
		PathEl::QuadTo(..) | PathEl::CurveTo(..) => log::warn!("Unexpected curve in flattened path"),
	});
	if !current.is_empty() {
		contours.push(current);
	}

	Region::new(contours)
}

/// Writes a region as SVG path data of straight segments, rounding coordinates to `precision` decimal places.
pub fn path_to_path_data(region: &Region, precision: usize) -> String {
	let mut data = String::new();
	for contour in region.contours() {
		for (index, point) in contour.iter().enumerate() {
			if !data.is_empty() {
				data.push(' ');
			}
			if index == 0 {
				data.push('M');
			} else if index == 1 {
				data.push('L');
			}
			let _ = write!(data, "{},{}", format_coordinate(point.x, precision), format_coordinate(point.y, precision));
		}
		data.push_str(" Z");
	}
	data
}

fn format_coordinate(value: f64, precision: usize) -> String {
	let mut text = format!("{value:.precision$}");
	if text.contains('.') {
		let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
		text.truncate(trimmed);
	}
	if text == "-0" { "0".to_string() } else { text }
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_polygons() {
		let region = path_from_path_data("M0,0 L10,0 10,10 Z M20,20 h5 v5 h-5", 0.1).unwrap();
		assert_eq!(
			region.contours(),
			&[
				vec![DVec2::new(0., 0.), DVec2::new(10., 0.), DVec2::new(10., 10.)],
				vec![DVec2::new(20., 20.), DVec2::new(25., 20.), DVec2::new(25., 25.), DVec2::new(20., 25.)]
			]
		);
		assert!(path_from_path_data("", 0.1).unwrap().is_empty());
		assert!(matches!(path_from_path_data("M0,0 X", 0.1), Err(BooleanError::InvalidPathData(_))));
	}

	#[test]
	fn flatten_arcs() {
		let tolerance = 0.01;
		let circle = path_from_path_data("M10,0 A10,10 0 0 1 0,10 A10,10 0 0 1 -10,0 A10,10 0 0 1 0,-10 A10,10 0 0 1 10,0 Z", tolerance).unwrap();
		assert_eq!(circle.contours().len(), 1);
		for point in circle.contours()[0].iter() {
			assert!((point.length() - 10.).abs() <= tolerance * 2.);
		}
		// Drawn clockwise on screen, which is counter-clockwise in a y-up frame
		assert!((circle.signed_area() - std::f64::consts::PI * 100.).abs() < 1.);
	}

	#[test]
	fn write_path_data() {
		let region = Region::new([vec![DVec2::new(0., 0.), DVec2::new(1.5, -0.), DVec2::new(1. / 3., 2.)]]);
		assert_eq!(path_to_path_data(&region, 3), "M0,0 L1.5,0 0.333,2 Z");
		assert_eq!(path_to_path_data(&Region::default(), 3), "");
		assert_eq!(format_coordinate(-0.0001, 3), "0");
		assert_eq!(format_coordinate(120., 2), "120");
	}
}
