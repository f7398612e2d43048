use crate::aabb::{Aabb, bounding_boxes_overlap, expand_bounding_box, merge_bounding_boxes};
use crate::epsilons::Epsilons;
use crate::error::BooleanError;
use crate::grid::{Grid, VertexSnapper};
use crate::line_segment::{LineSegment, line_segment_intersection, point_on_segment};
use crate::region::{Contour, Region, winding_number};
use glam::DVec2;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Decides which points a region's contours enclose from their winding number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
	#[default]
	NonZero,
	EvenOdd,
}

impl FillRule {
	pub fn is_inside(self, winding: i32) -> bool {
		match self {
			FillRule::NonZero => winding != 0,
			FillRule::EvenOdd => winding % 2 != 0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathBooleanOperation {
	Union,
	Intersection,
	Difference,
	Exclusion,
}

impl PathBooleanOperation {
	fn combine(self, a: bool, b: bool) -> bool {
		match self {
			PathBooleanOperation::Union => a || b,
			PathBooleanOperation::Intersection => a && b,
			PathBooleanOperation::Difference => a && !b,
			PathBooleanOperation::Exclusion => a != b,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operand {
	A,
	B,
}

/// A piece of an input edge between two snapped vertices, directed as in its contour.
#[derive(Clone, Copy, Debug)]
struct SplitEdge {
	from: usize,
	to: usize,
	operand: Operand,
}

/// Combines two regions, each interpreted under its own fill rule.
///
/// The result never self-intersects, carries its interior on the left of every edge and reads the same under either fill rule.
pub fn path_boolean(a: &Region, fill_a: FillRule, b: &Region, fill_b: FillRule, op: PathBooleanOperation) -> Result<Region, BooleanError> {
	if a.points().chain(b.points()).any(|point| !point.is_finite()) {
		return Err(BooleanError::NonFiniteGeometry);
	}

	let bounding_box = match (a.bounding_box(), b.bounding_box()) {
		(Some(a), Some(b)) => merge_bounding_boxes(&a, &b),
		(Some(bounding_box), None) | (None, Some(bounding_box)) => bounding_box,
		(None, None) => return Ok(Region::default()),
	};
	let eps = Epsilons::for_bounding_box(&bounding_box);

	let input_edges: Vec<(LineSegment, Operand)> = a
		.edges()
		.map(|edge| (edge, Operand::A))
		.chain(b.edges().map(|edge| (edge, Operand::B)))
		.filter(|([start, end], _)| start.distance(*end) > eps.point)
		.collect();

	let (positions, split_edges) = split_edges(&input_edges, bounding_box, eps);
	let boundary = classify_edges(&positions, &split_edges, fill_a, fill_b, op, eps);
	let contours = link_contours(&positions, &boundary);

	let result = Region::new(contours.into_iter().map(|contour| remove_collinear_points(contour, eps.point)));
	log::trace!("{op:?} of {} and {} contours produced {} contours", a.contours().len(), b.contours().len(), result.contours().len());
	Ok(result)
}

/// Unions every region into one, each under its own fill rule.
pub fn path_union_all(regions: impl IntoIterator<Item = (Region, FillRule)>) -> Result<Region, BooleanError> {
	regions
		.into_iter()
		.try_fold(Region::default(), |union, (region, fill_rule)| path_boolean(&union, FillRule::NonZero, &region, fill_rule, PathBooleanOperation::Union))
}

/// Cuts every input edge wherever another edge crosses or touches it, and snaps the pieces' ends onto shared vertices.
fn split_edges(input_edges: &[(LineSegment, Operand)], bounding_box: Aabb, eps: Epsilons) -> (Vec<DVec2>, Vec<SplitEdge>) {
	let boxes: Vec<Aabb> = input_edges.iter().map(|&([start, end], _)| expand_bounding_box(&Aabb::new(start, end), eps.point)).collect();

	let cell_size = (bounding_box.max_extent() / (input_edges.len() as f64).sqrt().max(1.)).max(eps.point * 16.);
	let mut grid = Grid::new(bounding_box.min(), cell_size, input_edges.len());
	for (index, bounding_box) in boxes.iter().enumerate() {
		grid.insert(bounding_box, index);
	}

	let mut splits: Vec<SmallVec<[f64; 4]>> = vec![SmallVec::new(); input_edges.len()];
	let mut candidates = Vec::new();
	for (i, &(segment, _)) in input_edges.iter().enumerate() {
		grid.query(&boxes[i], &mut candidates);
		for &j in candidates.iter().filter(|&&j| j > i) {
			if !bounding_boxes_overlap(&boxes[i], &boxes[j]) {
				continue;
			}
			let other = input_edges[j].0;

			if let Some((s, t)) = line_segment_intersection(segment, other, eps.param) {
				splits[i].push(s);
				splits[j].push(t);
			}
			// Touching endpoints and collinear overlaps
			for point in other {
				if let Some(s) = point_on_segment(segment, point, eps.point) {
					splits[i].push(s);
				}
			}
			for point in segment {
				if let Some(t) = point_on_segment(other, point, eps.point) {
					splits[j].push(t);
				}
			}
		}
	}

	let mut snapper = VertexSnapper::new(bounding_box.min(), eps.point);
	let mut edges = Vec::new();
	for (&([start, end], operand), mut parameters) in input_edges.iter().zip(splits) {
		parameters.retain(|t| *t > eps.param && *t < 1. - eps.param);
		parameters.sort_unstable_by(f64::total_cmp);

		let mut from = snapper.vertex(start);
		for point in parameters.into_iter().map(|t| start.lerp(end, t)).chain([end]) {
			let to = snapper.vertex(point);
			if to != from {
				edges.push(SplitEdge { from, to, operand });
				from = to;
			}
		}
	}

	(snapper.positions().to_vec(), edges)
}

/// Keeps the split edges that separate the result's inside from its outside, directed with the inside on their left.
fn classify_edges(positions: &[DVec2], split_edges: &[SplitEdge], fill_a: FillRule, fill_b: FillRule, op: PathBooleanOperation, eps: Epsilons) -> Vec<(usize, usize)> {
	let operand_edges = |operand: Operand| -> Vec<LineSegment> {
		split_edges
			.iter()
			.filter(|edge| edge.operand == operand)
			.map(|edge| [positions[edge.from], positions[edge.to]])
			.collect()
	};
	let edges_a = operand_edges(Operand::A);
	let edges_b = operand_edges(Operand::B);
	let inside = |point: DVec2| {
		let in_a = fill_a.is_inside(winding_number(edges_a.iter().copied(), point));
		let in_b = fill_b.is_inside(winding_number(edges_b.iter().copied(), point));
		op.combine(in_a, in_b)
	};

	let mut seen = FxHashSet::default();
	let mut boundary = Vec::new();
	for edge in split_edges {
		if !seen.insert((edge.from.min(edge.to), edge.from.max(edge.to))) {
			continue;
		}

		let (start, end) = (positions[edge.from], positions[edge.to]);
		let direction = end - start;
		let length = direction.length();
		let offset = (length * 1e-3).min(eps.linear);
		let normal = direction.perp() / length;
		let midpoint = (start + end) / 2.;

		let inside_left = inside(midpoint + normal * offset);
		let inside_right = inside(midpoint - normal * offset);
		match (inside_left, inside_right) {
			(true, false) => boundary.push((edge.from, edge.to)),
			(false, true) => boundary.push((edge.to, edge.from)),
			_ => {}
		}
	}
	boundary
}

/// Walks the boundary edges into closed loops, taking the sharpest left turn wherever several edges leave a vertex.
///
/// Turning left keeps loops that only touch at a vertex apart.
fn link_contours(positions: &[DVec2], boundary: &[(usize, usize)]) -> Vec<Contour> {
	let mut outgoing: FxHashMap<usize, SmallVec<[usize; 2]>> = FxHashMap::default();
	for (index, &(from, _)) in boundary.iter().enumerate() {
		outgoing.entry(from).or_default().push(index);
	}

	let mut used = vec![false; boundary.len()];
	let mut contours = Vec::new();
	for start in 0..boundary.len() {
		if used[start] {
			continue;
		}

		let start_vertex = boundary[start].0;
		let mut contour = vec![positions[start_vertex]];
		let mut current = start;
		loop {
			used[current] = true;
			let (from, to) = boundary[current];
			if to == start_vertex {
				contours.push(contour);
				break;
			}
			contour.push(positions[to]);

			let incoming = positions[to] - positions[from];
			let turn = |&&index: &&usize| {
				let direction = positions[boundary[index].1] - positions[to];
				incoming.perp_dot(direction).atan2(incoming.dot(direction))
			};
			let next = outgoing.get(&to).and_then(|edges| edges.iter().filter(|&&index| !used[index]).max_by(|a, b| turn(a).total_cmp(&turn(b))));
			match next {
				Some(&next) => current = next,
				None => {
					log::warn!("Dropping an unclosed boundary of {} points", contour.len());
					break;
				}
			}
		}
	}
	contours
}

fn remove_collinear_points(mut contour: Contour, tolerance: f64) -> Contour {
	let mut changed = true;
	while changed && contour.len() >= 3 {
		changed = false;
		let mut index = 0;
		while index < contour.len() && contour.len() >= 3 {
			let previous = contour[(index + contour.len() - 1) % contour.len()];
			let next = contour[(index + 1) % contour.len()];
			let chord = next - previous;
			let length = chord.length();
			let deviation = if length > 0. { chord.perp_dot(contour[index] - previous).abs() / length } else { 0. };
			if deviation <= tolerance {
				contour.remove(index);
				changed = true;
			} else {
				index += 1;
			}
		}
	}
	contour
}
