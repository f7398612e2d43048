use crate::document::CachedElement;
use crate::error::{ClipResolutionError, NormalizeError};
use crate::options::NormalizeOptions;
use crate::shapes::{Geometry, SHAPE_TAGS, Shape};
use crate::tree::{self, Node, XmlNode};
use path_bool::{FillRule, PathBooleanOperation, Region, path_boolean, path_from_path_data, path_to_path_data, path_union_all};
use glam::DAffine2;
use rustc_hash::FxHashMap;
use svg_transform::{Affine2D, DEGENERATE_EPSILON, Rect, parse_svg_transform};

/// Elements that may sit inside a `<clipPath>` without contributing geometry.
const DESCRIPTIVE_TAGS: [&str; 3] = ["desc", "metadata", "title"];

/// Elements that render nothing themselves, so a clip path on them only reaches their descendants.
const GROUPING_TAGS: [&str; 4] = ["a", "g", "svg", "switch"];

/// Elements whose content is never rendered in place.
const NON_RENDERED_TAGS: [&str; 2] = ["clipPath", "defs"];

/// Reads a `clip-path` value: `url(#id)`, optionally quoted, or `none`.
pub(crate) fn parse_reference(value: &str) -> Result<Option<String>, ClipResolutionError> {
	let trimmed = value.trim();
	if trimmed.is_empty() || trimmed == "none" {
		return Ok(None);
	}

	let malformed = || ClipResolutionError::Malformed { reference: value.to_string() };
	let inner = trimmed.strip_prefix("url(").and_then(|rest| rest.strip_suffix(')')).ok_or_else(malformed)?.trim();
	let unquoted = ['"', '\'']
		.into_iter()
		.find_map(|quote| inner.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)))
		.unwrap_or(inner);
	let id = unquoted.strip_prefix('#').filter(|id| !id.is_empty() && !id.contains(char::is_whitespace)).ok_or_else(malformed)?;
	Ok(Some(id.to_string()))
}

/// A clip path that applies to a target, with the mapping from the referencing element's user space into the target's.
struct Reference {
	id: String,
	/// The element carrying the `clip-path` attribute, when it is an ancestor of the target.
	ancestor: Option<Node>,
	/// Maps target coordinates into the referencing element's user space.
	to_referencing_space: Affine2D,
}

/// A clipped shape and the geometry it fills.
struct Target {
	index: usize,
	region: Region,
	fill_rule: FillRule,
	references: Vec<Reference>,
}

enum Outcome {
	Keep,
	Remove,
	Replace(String),
}

/// Bakes every clip path into the shapes it clips, removing the clip paths afterwards.
///
/// Every result is computed before the tree is touched, so an error leaves the document as it was.
pub(crate) fn apply_clip_paths(root: &Node, elements: &mut Vec<CachedElement>, options: &NormalizeOptions) -> Result<(), NormalizeError> {
	let mut resolver = ClipResolver::new(root, options);
	let mut outcomes: Vec<Outcome> = elements.iter().map(|_| Outcome::Keep).collect();
	let mut targets = Vec::new();

	for (index, element) in elements.iter().enumerate() {
		if is_clip_content(&element.node) {
			continue;
		}

		let Some(references) = references(&element.node, &element.shape, &mut resolver)? else {
			log::warn!("Removing <{}> because its transform chain collapses it", element.shape.tag());
			outcomes[index] = Outcome::Remove;
			continue;
		};
		if references.is_empty() {
			continue;
		}

		let region = path_from_path_data(&element.shape.geometry.to_path_data(), options.flatten_tolerance)?;
		let fill_rule = fill_rule(inherited_attribute(&element.node, "fill-rule").as_deref());
		targets.push(Target { index, region, fill_rule, references });
	}

	// References on groups are resolved even when nothing inside them is clipped, and everything they cover must be a shape
	for node in root.descendants().filter(|node| !is_shape(node) && !is_clip_content(node)) {
		let reference = node.borrow().as_element().and_then(|element| element.attribute_value("clip-path").map(|value| value.into_owned()));
		if let Some(id) = reference.map(|value| parse_reference(&value)).transpose()?.flatten() {
			resolver.container(&id)?;
			if tree::is_svg_element(&node, "clipPath") {
				continue;
			}
			if let Some(tag) = unclippable_element(&node) {
				return Err(ClipResolutionError::UnsupportedTarget { id, tag }.into());
			}
		}
	}

	for target in &targets {
		outcomes[target.index] = clip_target(target, &targets, &mut resolver)?;
	}

	// Everything resolved, so the tree can change now
	for (element, outcome) in elements.iter_mut().zip(&outcomes) {
		match outcome {
			Outcome::Keep => {}
			Outcome::Remove => element.node.detach(),
			Outcome::Replace(d) => {
				element.shape = Shape {
					geometry: Geometry::Path { d: d.clone() },
					clip_path: String::new(),
					attributes: element.shape.attributes.clone(),
				};
				element.dirty = true;
			}
		}
	}

	for mut node in root.descendants().filter(|node| !is_shape(node)) {
		if let XmlNode::Element(element) = &mut *node.borrow_mut() {
			element.remove_attribute("clip-path");
		}
	}

	let mut removed = Vec::new();
	for container in resolver.containers {
		let parent = container.parent();
		container.detach();
		log::debug!("Removed clip path container");

		if let Some(parent) = parent.filter(|parent| tree::is_svg_element(parent, "defs") && tree::element_children(parent).next().is_none()) {
			parent.detach();
			log::debug!("Removed empty <defs>");
		}
		removed.push(container);
	}

	let mut outcomes = outcomes.into_iter();
	elements.retain(|element| {
		let removed_outcome = matches!(outcomes.next(), Some(Outcome::Remove));
		let inside_removed = element.node.ancestors().any(|ancestor| removed.contains(&ancestor));
		!removed_outcome && !inside_removed
	});

	Ok(())
}

fn is_shape(node: &Node) -> bool {
	SHAPE_TAGS.iter().any(|tag| tree::is_svg_element(node, tag))
}

/// The name of the first rendered element at or below `node` that is neither a shape nor a group.
fn unclippable_element(node: &Node) -> Option<String> {
	if is_shape(node) || DESCRIPTIVE_TAGS.iter().chain(&NON_RENDERED_TAGS).any(|tag| tree::is_svg_element(node, tag)) {
		return None;
	}
	if !GROUPING_TAGS.iter().any(|tag| tree::is_svg_element(node, tag)) {
		return node.borrow().as_element().map(|element| element.name.clone());
	}
	tree::element_children(node).find_map(|child| unclippable_element(&child))
}

fn is_clip_content(node: &Node) -> bool {
	node.ancestors().skip(1).any(|ancestor| tree::is_svg_element(&ancestor, "clipPath"))
}

fn element_transform(node: &Node) -> Result<Affine2D, NormalizeError> {
	let transform = node.borrow().as_element().and_then(|element| element.attribute_value("transform").map(|value| value.into_owned()));
	match transform {
		Some(transform) => Ok(parse_svg_transform(&transform)?),
		None => Ok(Affine2D::identity()),
	}
}

/// The value of a presentation attribute on the node or its nearest ancestor that sets it.
fn inherited_attribute(node: &Node, name: &str) -> Option<String> {
	node.ancestors()
		.find_map(|ancestor| ancestor.borrow().as_element().and_then(|element| element.attribute_value(name).map(|value| value.trim().to_string())))
}

fn fill_rule(value: Option<&str>) -> FillRule {
	match value {
		Some("evenodd") => FillRule::EvenOdd,
		_ => FillRule::NonZero,
	}
}

/// Every clip path applying to the shape, from its own `clip-path` and those of its ancestors.
///
/// Returns `None` when the transforms between the shape and a clipped ancestor collapse the shape to nothing.
fn references(node: &Node, shape: &Shape, resolver: &mut ClipResolver<'_>) -> Result<Option<Vec<Reference>>, NormalizeError> {
	let mut references = Vec::new();
	if let Some(id) = parse_reference(&shape.clip_path)? {
		resolver.container(&id)?;
		references.push(Reference {
			id,
			ancestor: None,
			to_referencing_space: Affine2D::identity(),
		});
	}

	// Maps the shape's coordinates into the user space inside each ancestor in turn
	let mut chain = element_transform(node)?;
	for ancestor in node.ancestors().skip(1) {
		let clip_path = ancestor.borrow().as_element().and_then(|element| element.attribute_value("clip-path").map(|value| value.into_owned()));
		if let Some(id) = clip_path.as_deref().map(parse_reference).transpose()?.flatten() {
			resolver.container(&id)?;
			if collapses(&chain) {
				return Ok(None);
			}
			references.push(Reference {
				id,
				ancestor: Some(ancestor.clone()),
				to_referencing_space: chain,
			});
		}
		chain = Affine2D::product(chain, element_transform(&ancestor)?);
	}

	Ok(Some(references))
}

/// Whether the transform flattens area to nothing. The determinant is compared against the lengths of the mapped axes, so tiny but invertible scales don't count.
fn collapses(transform: &Affine2D) -> bool {
	let [a, b, c, d, _, _] = transform.to_coefficients();
	transform.determinant().abs() <= DEGENERATE_EPSILON * a.hypot(b) * c.hypot(d)
}

fn clip_target(target: &Target, targets: &[Target], resolver: &mut ClipResolver<'_>) -> Result<Outcome, NormalizeError> {
	let mut applied: Vec<(&str, Affine2D)> = Vec::new();
	let mut region = target.region.clone();
	let mut fill_rule = target.fill_rule;

	for reference in &target.references {
		let duplicate = applied.iter().any(|(id, mapping)| *id == reference.id && mapping.almost_equals(&reference.to_referencing_space, 1e-12));
		if duplicate {
			continue;
		}
		applied.push((reference.id.as_str(), reference.to_referencing_space));

		let bounding_box = match &reference.ancestor {
			None => bounding_rect(&target.region),
			Some(ancestor) => ancestor_bounding_box(ancestor, targets),
		};
		let clip = resolver.region(&reference.id, bounding_box)?;
		let clip = clip.transform(DAffine2::from(reference.to_referencing_space).inverse());

		region = path_boolean(&region, fill_rule, &clip, FillRule::NonZero, PathBooleanOperation::Intersection)?;
		fill_rule = FillRule::NonZero;
		log::debug!("Applied clip path `{}`", reference.id);
	}

	if region.is_empty() {
		return Ok(Outcome::Remove);
	}
	Ok(Outcome::Replace(path_to_path_data(&region, resolver.options.precision)))
}

fn bounding_rect(region: &Region) -> Option<Rect> {
	region.bounding_box().map(|bounds| Rect::new(bounds.min().x, bounds.min().y, bounds.width(), bounds.height()))
}

/// The bounding box, in the ancestor's user space, of every clipped shape below it.
fn ancestor_bounding_box(ancestor: &Node, targets: &[Target]) -> Option<Rect> {
	let regions = targets.iter().filter_map(|target| {
		let reference = target.references.iter().find(|reference| reference.ancestor.as_ref() == Some(ancestor))?;
		Some(target.region.transform(reference.to_referencing_space.into()))
	});
	let points = regions.flat_map(|region| region.bounding_box().map(|bounds| [bounds.min(), bounds.max()])).flatten();
	path_bool::Aabb::from_points(points).map(|bounds| Rect::new(bounds.min().x, bounds.min().y, bounds.width(), bounds.height()))
}

/// Resolves clip path ids to regions, remembering every container it visits.
struct ClipResolver<'a> {
	root: &'a Node,
	options: &'a NormalizeOptions,
	regions: FxHashMap<(String, Option<[u64; 4]>), Region>,
	containers: Vec<Node>,
	visiting: Vec<String>,
}

impl<'a> ClipResolver<'a> {
	fn new(root: &'a Node, options: &'a NormalizeOptions) -> Self {
		Self {
			root,
			options,
			regions: FxHashMap::default(),
			containers: Vec::new(),
			visiting: Vec::new(),
		}
	}

	/// Finds the `<clipPath>` with this id and records it for removal.
	fn container(&mut self, id: &str) -> Result<Node, ClipResolutionError> {
		let node = tree::find_by_id(self.root, id).ok_or_else(|| ClipResolutionError::Missing { id: id.to_string() })?;
		if !tree::is_svg_element(&node, "clipPath") {
			let tag = node.borrow().as_element().map(|element| element.name.clone()).unwrap_or_default();
			return Err(ClipResolutionError::NotAClipPath { id: id.to_string(), tag });
		}

		if !self.containers.contains(&node) {
			self.containers.push(node.clone());
		}
		Ok(node)
	}

	/// The area the clip path `id` lets through, in the user space of the element referencing it.
	fn region(&mut self, id: &str, bounding_box: Option<Rect>) -> Result<Region, NormalizeError> {
		let key = (id.to_string(), bounding_box.map(|rect| [rect.x, rect.y, rect.width, rect.height].map(f64::to_bits)));
		if let Some(region) = self.regions.get(&key) {
			return Ok(region.clone());
		}

		if self.visiting.iter().any(|visiting| visiting == id) {
			return Err(ClipResolutionError::Cycle { id: id.to_string() }.into());
		}
		self.visiting.push(id.to_string());
		let region = self.compute_region(id, bounding_box);
		self.visiting.pop();

		let region = region?;
		self.regions.insert(key, region.clone());
		Ok(region)
	}

	fn compute_region(&mut self, id: &str, bounding_box: Option<Rect>) -> Result<Region, NormalizeError> {
		let container = self.container(id)?;

		let mut children = Vec::new();
		for child in tree::element_children(&container) {
			if DESCRIPTIVE_TAGS.iter().any(|tag| tree::is_svg_element(&child, tag)) {
				continue;
			}
			if !is_shape(&child) {
				let tag = child.borrow().as_element().map(|element| element.name.clone()).unwrap_or_default();
				return Err(ClipResolutionError::UnsupportedContent { id: id.to_string(), tag }.into());
			}

			let shape = match &*child.borrow() {
				XmlNode::Element(element) => Shape::from_element(element)?,
				_ => continue,
			};
			let clip_rule = fill_rule(inherited_attribute(&child, "clip-rule").as_deref());
			let mut region = path_from_path_data(&shape.geometry.to_path_data(), self.options.flatten_tolerance)?;

			// A clip path on the content clips it in the content's own user space
			if let Some(nested) = parse_reference(&shape.clip_path)? {
				let nested = self.region(&nested, bounding_rect(&region))?;
				region = path_boolean(&region, clip_rule, &nested, FillRule::NonZero, PathBooleanOperation::Intersection)?;
				children.push((region.transform(element_transform(&child)?.into()), FillRule::NonZero));
			} else {
				children.push((region.transform(element_transform(&child)?.into()), clip_rule));
			}
		}

		let mut region = path_union_all(children)?.transform(element_transform(&container)?.into());

		let units = container.borrow().as_element().and_then(|element| element.attribute_value("clipPathUnits").map(|value| value.trim().to_string()));
		if units.as_deref() == Some("objectBoundingBox") {
			region = match bounding_box {
				Some(bounding_box) => region.transform(Affine2D::rect_to_rect(Rect::UNIT, bounding_box).into()),
				None => Region::default(),
			};
		}

		let container_clip = container.borrow().as_element().and_then(|element| element.attribute_value("clip-path").map(|value| value.into_owned()));
		if let Some(nested) = container_clip.as_deref().map(parse_reference).transpose()?.flatten() {
			let nested = self.region(&nested, bounding_box)?;
			region = path_boolean(&region, FillRule::NonZero, &nested, FillRule::NonZero, PathBooleanOperation::Intersection)?;
		}

		Ok(region)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn collapsing_transforms() {
		assert!(collapses(&Affine2D::identity().scale(0., 0.)));
		assert!(collapses(&Affine2D::identity().scale(3., 0.)));
		assert!(collapses(&Affine2D::new(1., 2., 2., 4., 5., 6.)));
		assert!(collapses(&Affine2D::new(1., 0., 1., 1e-12, 0., 0.)));
		assert!(!collapses(&Affine2D::identity().scale(0.00001, 0.00001)));
		assert!(!collapses(&Affine2D::identity().rotate(std::f64::consts::FRAC_PI_2).scale(1e-8, 1e-8)));
		assert!(!collapses(&Affine2D::identity().scale(1e6, 1e-6)));
	}

	#[test]
	fn clip_path_references() {
		assert_eq!(parse_reference("url(#a)"), Ok(Some("a".to_string())));
		assert_eq!(parse_reference(" url( '#clip-1' ) "), Ok(Some("clip-1".to_string())));
		assert_eq!(parse_reference(r##"url("#b")"##), Ok(Some("b".to_string())));
		assert_eq!(parse_reference("none"), Ok(None));
		assert_eq!(parse_reference(""), Ok(None));
		for malformed in ["#a", "url(a)", "url(#)", "url(#a", "url(#a b)"] {
			assert_eq!(parse_reference(malformed), Err(ClipResolutionError::Malformed { reference: malformed.to_string() }));
		}
	}
}
