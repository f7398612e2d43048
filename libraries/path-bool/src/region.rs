use crate::aabb::{Aabb, extend_bounding_box};
use crate::line_segment::LineSegment;
use crate::path_boolean::FillRule;
use glam::{DAffine2, DVec2};

/// A closed polygon, stored without repeating its first point.
pub type Contour = Vec<DVec2>;

/// A filled area described by closed polygonal contours.
///
/// Regions returned by the boolean operations have their interior on the left of every edge in a y-up frame, so outer
/// contours have a positive signed area and holes a negative one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
	contours: Vec<Contour>,
}

impl Region {
	/// Builds a region from closed contours, dropping repeated points and contours that enclose nothing.
	pub fn new(contours: impl IntoIterator<Item = Contour>) -> Self {
		let contours = contours
			.into_iter()
			.filter_map(|mut contour| {
				contour.dedup();
				while contour.len() > 1 && contour.first() == contour.last() {
					contour.pop();
				}
				(contour.len() >= 3).then_some(contour)
			})
			.collect();
		Self { contours }
	}

	pub fn contours(&self) -> &[Contour] {
		&self.contours
	}

	pub fn is_empty(&self) -> bool {
		self.contours.is_empty()
	}

	pub fn transform(&self, transform: DAffine2) -> Self {
		let contours = self.contours.iter().map(|contour| contour.iter().map(|&point| transform.transform_point2(point)).collect());
		Self::new(contours)
	}

	pub fn bounding_box(&self) -> Option<Aabb> {
		self.points().fold(None, |bounding_box, point| Some(extend_bounding_box(bounding_box, point)))
	}

	/// The sum of the contours' signed areas.
	pub fn signed_area(&self) -> f64 {
		self.edges().map(|[start, end]| start.perp_dot(end)).sum::<f64>() / 2.
	}

	/// How many times the contours wind around `point`, counting counter-clockwise turns in a y-up frame as positive.
	pub fn winding_number(&self, point: DVec2) -> i32 {
		winding_number(self.edges(), point)
	}

	pub fn contains(&self, point: DVec2, fill_rule: FillRule) -> bool {
		fill_rule.is_inside(self.winding_number(point))
	}

	pub(crate) fn points(&self) -> impl Iterator<Item = DVec2> + '_ {
		self.contours.iter().flatten().copied()
	}

	pub(crate) fn edges(&self) -> impl Iterator<Item = LineSegment> + '_ {
		self.contours
			.iter()
			.flat_map(|contour| contour.iter().zip(contour.iter().cycle().skip(1)).map(|(&start, &end)| [start, end]))
	}
}

pub(crate) fn winding_number(edges: impl IntoIterator<Item = LineSegment>, point: DVec2) -> i32 {
	edges.into_iter().map(|edge| winding_contribution(edge, point)).sum()
}

/// The signed crossing of `edge` with the rightward ray from `point`.
fn winding_contribution([start, end]: LineSegment, point: DVec2) -> i32 {
	let side = (end - start).perp_dot(point - start);
	if start.y <= point.y {
		if end.y > point.y && side > 0. {
			return 1;
		}
	} else if end.y <= point.y && side < 0. {
		return -1;
	}
	0
}

#[cfg(test)]
mod test {
	use super::*;

	fn square(min: f64, max: f64) -> Contour {
		vec![DVec2::new(min, min), DVec2::new(max, min), DVec2::new(max, max), DVec2::new(min, max)]
	}

	#[test]
	fn construction_drops_degenerate_contours() {
		let mut closed = square(0., 1.);
		closed.push(DVec2::ZERO);
		let region = Region::new([closed, vec![DVec2::ZERO, DVec2::ONE, DVec2::ONE], vec![]]);
		assert_eq!(region.contours(), &[square(0., 1.)]);
		assert!(Region::new([vec![DVec2::ZERO, DVec2::ONE]]).is_empty());
	}

	#[test]
	fn winding_and_area() {
		let mut hole = square(1., 2.);
		hole.reverse();
		let region = Region::new([square(0., 3.), hole]);

		assert_eq!(region.signed_area(), 8.);
		assert_eq!(region.winding_number(DVec2::new(0.5, 0.5)), 1);
		assert_eq!(region.winding_number(DVec2::new(1.5, 1.5)), 0);
		assert_eq!(region.winding_number(DVec2::new(4., 1.5)), 0);

		let overlapping = Region::new([square(0., 2.), square(1., 3.)]);
		assert_eq!(overlapping.winding_number(DVec2::new(1.5, 1.5)), 2);
		assert!(overlapping.contains(DVec2::new(1.5, 1.5), FillRule::NonZero));
		assert!(!overlapping.contains(DVec2::new(1.5, 1.5), FillRule::EvenOdd));
	}

	#[test]
	fn transform_and_bounds() {
		let region = Region::new([square(0., 1.)]).transform(DAffine2::from_scale_angle_translation(DVec2::new(2., 3.), 0., DVec2::new(1., 1.)));
		let bounding_box = region.bounding_box().unwrap();
		assert_eq!(bounding_box.min(), DVec2::new(1., 1.));
		assert_eq!(bounding_box.max(), DVec2::new(3., 4.));
		assert_eq!(Region::default().bounding_box(), None);
	}
}
