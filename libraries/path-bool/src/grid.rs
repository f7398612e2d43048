use crate::aabb::Aabb;
use glam::{DVec2, I64Vec2};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A uniform hash grid of edge bounding boxes, used to find the candidate pairs that may intersect.
///
/// Cells are counted from `origin`, so coordinates far from zero still give small cell indices.
pub(crate) struct Grid {
	origin: DVec2,
	cell_factor: f64,
	cells: FxHashMap<I64Vec2, SmallVec<[usize; 6]>>,
}

impl Grid {
	pub(crate) fn new(origin: DVec2, cell_size: f64, edges: usize) -> Self {
		Grid {
			origin,
			cell_factor: cell_size.recip(),
			cells: FxHashMap::with_capacity_and_hasher(edges, Default::default()),
		}
	}

	pub(crate) fn insert(&mut self, bbox: &Aabb, index: usize) {
		let min_cell = self.point_to_cell(bbox.min());
		let max_cell = self.point_to_cell(bbox.max());

		for i in min_cell.x..=max_cell.x {
			for j in min_cell.y..=max_cell.y {
				self.cells.entry(I64Vec2::new(i, j)).or_default().push(index);
			}
		}
	}

	/// Every index inserted with a box sharing a cell with `bbox`, sorted and without duplicates.
	pub(crate) fn query(&self, bbox: &Aabb, result: &mut Vec<usize>) {
		result.clear();
		let min_cell = self.point_to_cell(bbox.min());
		let max_cell = self.point_to_cell(bbox.max());

		for i in min_cell.x..=max_cell.x {
			for j in min_cell.y..=max_cell.y {
				if let Some(indices) = self.cells.get(&I64Vec2::new(i, j)) {
					result.extend_from_slice(indices);
				}
			}
		}
		result.sort_unstable();
		result.dedup();
	}

	fn point_to_cell(&self, point: DVec2) -> I64Vec2 {
		((point - self.origin) * self.cell_factor).floor().as_i64vec2()
	}
}

/// Merges points that lie within a tolerance of each other into shared vertex indices.
pub(crate) struct VertexSnapper {
	origin: DVec2,
	tolerance: f64,
	cells: FxHashMap<I64Vec2, SmallVec<[usize; 2]>>,
	positions: Vec<DVec2>,
}

impl VertexSnapper {
	pub(crate) fn new(origin: DVec2, tolerance: f64) -> Self {
		Self {
			origin,
			tolerance,
			cells: FxHashMap::default(),
			positions: Vec::new(),
		}
	}

	/// The index of the vertex at `point`, reusing a nearby existing vertex when there is one.
	pub(crate) fn vertex(&mut self, point: DVec2) -> usize {
		let cell = ((point - self.origin) / self.tolerance).floor().as_i64vec2();

		for i in -1..=1 {
			for j in -1..=1 {
				let Some(indices) = self.cells.get(&(cell + I64Vec2::new(i, j))) else { continue };
				if let Some(&index) = indices.iter().find(|&&index| self.positions[index].distance(point) <= self.tolerance) {
					return index;
				}
			}
		}

		let index = self.positions.len();
		self.positions.push(point);
		self.cells.entry(cell).or_default().push(index);
		index
	}

	pub(crate) fn positions(&self) -> &[DVec2] {
		&self.positions
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn grid_query() {
		let mut grid = Grid::new(DVec2::ZERO, 1., 3);
		grid.insert(&Aabb::new(DVec2::new(0.1, 0.1), DVec2::new(0.5, 0.5)), 0);
		grid.insert(&Aabb::new(DVec2::new(0.2, 0.2), DVec2::new(1.5, 0.4)), 1);
		grid.insert(&Aabb::new(DVec2::new(5., 5.), DVec2::new(6., 6.)), 2);

		let mut result = Vec::new();
		grid.query(&Aabb::new(DVec2::new(0., 0.), DVec2::new(0.9, 0.9)), &mut result);
		assert_eq!(result, vec![0, 1]);
		grid.query(&Aabb::new(DVec2::new(1.2, 0.), DVec2::new(1.3, 0.1)), &mut result);
		assert_eq!(result, vec![1]);
	}

	#[test]
	fn snapping() {
		let mut snapper = VertexSnapper::new(DVec2::ZERO, 1e-6);
		let a = snapper.vertex(DVec2::new(1., 1.));
		let b = snapper.vertex(DVec2::new(1. + 1e-7, 1. - 1e-7));
		let c = snapper.vertex(DVec2::new(1. + 1e-3, 1.));
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(snapper.positions().len(), 2);
	}

	#[test]
	fn far_from_origin() {
		let origin = DVec2::splat(1e12);
		let mut snapper = VertexSnapper::new(origin, 1e-3);
		let a = snapper.vertex(origin);
		let b = snapper.vertex(origin + DVec2::new(1e-4, 0.));
		let c = snapper.vertex(origin + DVec2::new(2., 2.));
		assert_eq!(a, b);
		assert_ne!(a, c);

		let mut grid = Grid::new(origin, 1., 2);
		grid.insert(&Aabb::new(origin, origin + DVec2::splat(0.5)), 0);
		grid.insert(&Aabb::new(origin + DVec2::splat(3.), origin + DVec2::splat(4.)), 1);
		let mut result = Vec::new();
		grid.query(&Aabb::new(origin + DVec2::splat(0.25), origin + DVec2::splat(0.75)), &mut result);
		assert_eq!(result, vec![0]);
	}
}
