use crate::clip;
use crate::error::NormalizeError;
use crate::options::NormalizeOptions;
use crate::shapes::{Geometry, SHAPE_TAGS, Shape};
use crate::tree::{self, Node, XmlNode};
use std::cell::RefCell;
use std::io::Read;
use std::str::FromStr;

/// A shape element of the tree together with its decoded value.
pub(crate) struct CachedElement {
	pub node: Node,
	pub shape: Shape,
	/// Set when `shape` no longer matches the node and must be written back before serializing.
	pub dirty: bool,
}

/// Decoded shapes are computed on first use.
pub(crate) enum ElementCache {
	Empty,
	Populated(Vec<CachedElement>),
}

/// An SVG document whose shapes can be rewritten as paths and whose clip paths can be baked into the geometry they clip.
///
/// The document owns its tree and never hands out nodes, so its cache of decoded shapes stays consistent with the tree. The cache
/// fills on first use, which the read accessors may trigger through a shared reference.
/// Every `*_mut` operation edits the document itself; its counterpart without the suffix leaves `self` untouched and returns an
/// edited copy.
pub struct Document {
	root: Node,
	elements: RefCell<ElementCache>,
	options: NormalizeOptions,
}

impl Document {
	/// Reads a document from `reader`.
	pub fn parse(mut reader: impl Read) -> Result<Self, NormalizeError> {
		let mut source = String::new();
		reader.read_to_string(&mut source)?;
		source.parse()
	}

	pub fn with_options(mut self, options: NormalizeOptions) -> Self {
		self.options = options;
		self
	}

	pub fn options(&self) -> &NormalizeOptions {
		&self.options
	}

	/// The decoded shape elements, in document order.
	pub fn shapes(&self) -> Result<Vec<Shape>, NormalizeError> {
		self.populate()?;
		match &*self.elements.borrow() {
			ElementCache::Populated(elements) => Ok(elements.iter().map(|element| element.shape.clone()).collect()),
			ElementCache::Empty => Ok(Vec::new()),
		}
	}

	/// Replaces every shape with its equivalent path.
	pub fn shapes_to_paths_mut(&mut self) -> Result<(), NormalizeError> {
		for element in self.elements()? {
			if !matches!(element.shape.geometry, Geometry::Path { .. }) {
				element.shape = element.shape.to_path();
				element.dirty = true;
			}
		}
		Ok(())
	}

	/// A copy of the document with every shape replaced by its equivalent path.
	pub fn shapes_to_paths(&self) -> Result<Self, NormalizeError> {
		let mut document = self.clone();
		document.shapes_to_paths_mut()?;
		Ok(document)
	}

	/// Intersects every clipped shape with its clip paths, then removes the clip paths and their references.
	///
	/// Shapes that end up covering nothing are removed. When any reference cannot be resolved the document is left unchanged.
	pub fn apply_clip_paths_mut(&mut self) -> Result<(), NormalizeError> {
		self.populate()?;
		let ElementCache::Populated(elements) = self.elements.get_mut() else { return Ok(()) };
		clip::apply_clip_paths(&self.root, elements, &self.options)
	}

	/// A copy of the document with its clip paths applied.
	pub fn apply_clip_paths(&self) -> Result<Self, NormalizeError> {
		let mut document = self.clone();
		document.apply_clip_paths_mut()?;
		Ok(document)
	}

	/// Serializes the document, first writing back every shape changed since it was decoded.
	pub fn to_svg_string(&self) -> String {
		if let ElementCache::Populated(elements) = &mut *self.elements.borrow_mut() {
			for element in elements.iter_mut().filter(|element| element.dirty) {
				write_back(element);
			}
		}
		tree::serialize(&self.root)
	}

	fn populate(&self) -> Result<(), NormalizeError> {
		if let ElementCache::Populated(_) = *self.elements.borrow() {
			return Ok(());
		}

		let mut elements = Vec::new();
		for node in self.root.descendants() {
			if !SHAPE_TAGS.iter().any(|tag| tree::is_svg_element(&node, tag)) {
				continue;
			}
			let shape = match &*node.borrow() {
				XmlNode::Element(element) => Shape::from_element(element)?,
				_ => continue,
			};
			elements.push(CachedElement { node, shape, dirty: false });
		}

		log::debug!("Decoded {} shapes", elements.len());
		*self.elements.borrow_mut() = ElementCache::Populated(elements);
		Ok(())
	}

	fn elements(&mut self) -> Result<&mut [CachedElement], NormalizeError> {
		self.populate()?;
		match self.elements.get_mut() {
			ElementCache::Populated(elements) => Ok(elements),
			ElementCache::Empty => Ok(&mut []),
		}
	}
}

/// Swaps the node's element for the encoded shape, keeping its children, its name prefix and the quotes of unchanged attributes.
fn write_back(cached: &mut CachedElement) {
	let previous = cached.node.borrow().as_element().cloned();
	let Some(previous) = previous else { return };

	let name = match previous.prefix() {
		"" => cached.shape.tag().to_string(),
		prefix => format!("{prefix}:{}", cached.shape.tag()),
	};
	let mut element = cached.shape.to_element(name);
	for attribute in &mut element.attributes {
		if let Some(original) = previous.attributes.iter().find(|original| original.name == attribute.name && original.value == attribute.value) {
			attribute.quote = original.quote;
		}
	}

	*cached.node.borrow_mut() = XmlNode::Element(element);
	cached.dirty = false;
}

impl FromStr for Document {
	type Err = NormalizeError;

	fn from_str(source: &str) -> Result<Self, Self::Err> {
		Ok(Self {
			root: tree::parse(source)?,
			elements: RefCell::new(ElementCache::Empty),
			options: NormalizeOptions::default(),
		})
	}
}

impl Clone for Document {
	/// Deep-copies the tree and points the copied cache at the copied nodes.
	fn clone(&self) -> Self {
		let root = self.root.make_deep_copy();

		let elements = match &*self.elements.borrow() {
			ElementCache::Empty => ElementCache::Empty,
			ElementCache::Populated(elements) => {
				// Both traversals visit corresponding nodes in the same order, as does the cache
				let mut pairs = self.root.descendants().zip(root.descendants());
				let copied = elements
					.iter()
					.filter_map(|element| {
						let (_, node) = pairs.find(|(original, _)| *original == element.node)?;
						Some(CachedElement {
							node,
							shape: element.shape.clone(),
							dirty: element.dirty,
						})
					})
					.collect();
				ElementCache::Populated(copied)
			}
		};

		Self {
			root,
			elements: RefCell::new(elements),
			options: self.options,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use indoc::indoc;
	use pretty_assertions::assert_eq;

	const SHAPES: &str = indoc! {r#"
		<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
			<defs><linearGradient id="g"/></defs>
			<rect x='1' y='2' width='10' height='20' fill="url(#g)"/>
			<g><circle cx="5" cy="5" r="5"><title>dot</title></circle></g>
			<path d="M0,0 L1,1"/>
			<text>not a shape</text>
		</svg>"#};

	#[test]
	fn shapes_in_document_order() {
		let document: Document = SHAPES.parse().unwrap();
		let tags: Vec<_> = document.shapes().unwrap().iter().map(Shape::tag).collect();
		assert_eq!(tags, vec!["rect", "circle", "path"]);
	}

	#[test]
	fn untouched_documents_round_trip() {
		let document: Document = SHAPES.parse().unwrap();
		document.shapes().unwrap();
		assert_eq!(document.to_svg_string(), SHAPES);
	}

	#[test]
	fn shapes_to_paths_in_place() {
		let mut document: Document = SHAPES.parse().unwrap();
		document.shapes_to_paths_mut().unwrap();
		assert!(document.shapes().unwrap().iter().all(|shape| matches!(shape.geometry, Geometry::Path { .. })));

		let expected = SHAPES
			.replace(
				r#"<rect x='1' y='2' width='10' height='20' fill="url(#g)"/>"#,
				r#"<path fill="url(#g)" d="M1,2 H11 V22 H1 Z"/>"#,
			)
			.replace(
				r#"<circle cx="5" cy="5" r="5">"#,
				r#"<path d="M10,5 A5,5 0 0 1 5,10 A5,5 0 0 1 0,5 A5,5 0 0 1 5,0 A5,5 0 0 1 10,5 Z">"#,
			)
			.replace("</circle>", "</path>");
		assert_eq!(document.to_svg_string(), expected);
	}

	#[test]
	fn shapes_to_paths_copy_leaves_source_alone() {
		let document: Document = SHAPES.parse().unwrap();
		let before = document.shapes().unwrap();

		let converted = document.shapes_to_paths().unwrap();
		assert_eq!(document.shapes().unwrap(), before);
		assert_eq!(document.to_svg_string(), SHAPES);
		assert_ne!(converted.to_svg_string(), SHAPES);

		// Converting again changes nothing
		let twice = converted.shapes_to_paths().unwrap();
		assert_eq!(twice.to_svg_string(), converted.to_svg_string());
	}

	#[test]
	fn copies_are_independent() {
		let document: Document = SHAPES.parse().unwrap();
		document.shapes().unwrap();
		let mut copy = document.clone();
		copy.shapes_to_paths_mut().unwrap();

		assert_eq!(document.to_svg_string(), SHAPES);
		assert_eq!(copy.shapes().unwrap().len(), 3);
		assert!(copy.to_svg_string().contains("M1,2 H11 V22 H1 Z"));
	}

	#[test]
	fn parse_from_reader() {
		let document = Document::parse(SHAPES.as_bytes()).unwrap();
		assert_eq!(document.to_svg_string(), SHAPES);
		assert!(matches!(Document::parse("<svg>".as_bytes()), Err(NormalizeError::Xml(_))));
	}

	#[test]
	fn clip_path_field_round_trips() {
		let mut document: Document = r#"<svg><rect width="1" height="1" clip-path="url(#a)"/><rect width="2" height="2" clip-path=""/></svg>"#.parse().unwrap();
		document.shapes_to_paths_mut().unwrap();
		assert_eq!(
			document.to_svg_string(),
			r#"<svg><path d="M0,0 H1 V1 H0 Z" clip-path="url(#a)"/><path d="M0,0 H2 V2 H0 Z"/></svg>"#
		);
	}

	#[test]
	fn reading_through_shared_references() {
		fn summary(document: &Document) -> (usize, String) {
			(document.shapes().unwrap().len(), document.to_svg_string())
		}

		let document: Document = SHAPES.parse().unwrap();
		assert_eq!(summary(&document), (3, SHAPES.to_string()));

		// Pending conversions are written back by the first serialization and stay written
		let converted = document.shapes_to_paths().unwrap();
		let (count, first) = summary(&converted);
		assert_eq!(count, 3);
		assert!(first.contains("M1,2 H11 V22 H1 Z"));
		assert_eq!(summary(&converted).1, first);
	}
}
