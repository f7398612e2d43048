// Copyright 2024 Adam Platkevič <rflashster@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::aabb::Aabb;

/// Tolerances of one boolean operation, scaled to the size and position of its operands.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Epsilons {
	/// Vertices closer than this are merged.
	pub point: f64,
	/// Largest distance a side sample is taken from the edge it classifies.
	pub linear: f64,
	/// Intersection parameters this close to an end of a segment snap to that end.
	pub param: f64,
}

impl Epsilons {
	pub(crate) fn for_bounding_box(bounding_box: &Aabb) -> Self {
		let scale = bounding_box.max_extent().max(1.);
		// Far from the origin the spacing of representable coordinates outgrows tolerances based on the extent alone
		let magnitude = bounding_box.min().abs().max(bounding_box.max().abs()).max_element();
		let spacing = magnitude * f64::EPSILON;
		Self {
			point: (scale * 1e-9).max(spacing * 64.),
			linear: (scale * 1e-6).max(spacing * 4096.),
			param: 1e-9,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use glam::DVec2;

	#[test]
	fn scaled_to_extent() {
		let eps = Epsilons::for_bounding_box(&Aabb::new(DVec2::ZERO, DVec2::new(1000., 10.)));
		assert!((eps.point - 1e-6).abs() < 1e-18);
		assert!((eps.linear - 1e-3).abs() < 1e-15);

		let small = Epsilons::for_bounding_box(&Aabb::new(DVec2::ZERO, DVec2::splat(0.01)));
		assert_eq!(small.point, 1e-9);
	}

	#[test]
	fn scaled_to_position() {
		let eps = Epsilons::for_bounding_box(&Aabb::new(DVec2::splat(1e10), DVec2::splat(1e10 + 2.)));
		let spacing = (1e10 + 2.) * f64::EPSILON;
		assert!(eps.point >= spacing * 64.);
		assert!(eps.linear >= spacing * 4096.);
		assert!(eps.linear < 0.01);
	}
}
