use glam::DVec2;

pub type LineSegment = [DVec2; 2];

const COLLINEAR_EPS: f64 = f64::EPSILON * 64.;

/// The parameters `(s, t)` at which two segments cross, if they do. Parallel segments never cross here; their overlaps are
/// found by [`point_on_segment`] instead.
pub(crate) fn line_segment_intersection([p1, p2]: LineSegment, [p3, p4]: LineSegment, eps: f64) -> Option<(f64, f64)> {
	// https://en.wikipedia.org/wiki/Intersection_(geometry)#Two_line_segments

	let a = p2 - p1;
	let b = p3 - p4;
	let c = p3 - p1;

	let denom = a.x * b.y - a.y * b.x;

	if denom.abs() < COLLINEAR_EPS * a.length() * b.length() {
		return None;
	}

	let s = (c.x * b.y - c.y * b.x) / denom;
	let t = (a.x * c.y - a.y * c.x) / denom;

	if (-eps..=1. + eps).contains(&s) && (-eps..=1. + eps).contains(&t) { Some((s, t)) } else { None }
}

/// The parameter of `point` along `segment` when the point lies within `distance` of the segment's interior.
pub(crate) fn point_on_segment([start, end]: LineSegment, point: DVec2, distance: f64) -> Option<f64> {
	let direction = end - start;
	let length_squared = direction.length_squared();
	if length_squared == 0. {
		return None;
	}

	let t = (point - start).dot(direction) / length_squared;
	if !(0.0..=1.).contains(&t) {
		return None;
	}
	((start + direction * t).distance(point) <= distance).then_some(t)
}
