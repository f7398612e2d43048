// Copyright 2024 Adam Platkevič <rflashster@gmail.com>
//
// SPDX-License-Identifier: MIT

use glam::DVec2;

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
	min: DVec2,
	max: DVec2,
}

impl Aabb {
	pub fn new(min: DVec2, max: DVec2) -> Self {
		Self { min: min.min(max), max: min.max(max) }
	}

	/// The smallest box containing every point, or `None` when there are none.
	pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
		points.into_iter().fold(None, |bounding_box, point| Some(extend_bounding_box(bounding_box, point)))
	}

	#[inline]
	pub fn min(&self) -> DVec2 {
		self.min
	}

	#[inline]
	pub fn max(&self) -> DVec2 {
		self.max
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn max_extent(&self) -> f64 {
		(self.max - self.min).max_element()
	}
}

#[inline]
pub(crate) fn bounding_boxes_overlap(a: &Aabb, b: &Aabb) -> bool {
	a.min.x <= b.max.x && b.min.x <= a.max.x && a.min.y <= b.max.y && b.min.y <= a.max.y
}

#[inline]
pub(crate) fn merge_bounding_boxes(a: &Aabb, b: &Aabb) -> Aabb {
	Aabb {
		min: a.min.min(b.min),
		max: a.max.max(b.max),
	}
}

#[inline]
pub(crate) fn extend_bounding_box(bounding_box: Option<Aabb>, point: DVec2) -> Aabb {
	match bounding_box {
		Some(bb) => Aabb {
			min: bb.min.min(point),
			max: bb.max.max(point),
		},
		None => Aabb { min: point, max: point },
	}
}

pub(crate) fn expand_bounding_box(bounding_box: &Aabb, padding: f64) -> Aabb {
	Aabb {
		min: bounding_box.min - DVec2::splat(padding),
		max: bounding_box.max + DVec2::splat(padding),
	}
}
