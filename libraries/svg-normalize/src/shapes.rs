use crate::error::NormalizeError;
use crate::tree::{self, Attribute, Element};
use std::fmt::{self, Write};
use std::str::FromStr;
use svg_transform::{Point, format_number, parse_length, parse_number_list};

/// Tags of the elements that decode to a [`Shape`].
pub const SHAPE_TAGS: [&str; 7] = ["circle", "ellipse", "line", "path", "polygon", "polyline", "rect"];

/// Attributes stored under a field name that differs from the attribute name.
const ATTRIBUTE_RENAMES: [(&str, &str); 1] = [("clip-path", "clip_path")];

/// Fields left out of the markup while blank.
const OMIT_IF_BLANK: [&str; 1] = ["clip_path"];

fn field_name(attribute: &str) -> &str {
	ATTRIBUTE_RENAMES.iter().find(|(name, _)| *name == attribute).map_or(attribute, |(_, field)| field)
}

fn attribute_name(field: &str) -> &str {
	ATTRIBUTE_RENAMES.iter().find(|(_, name)| *name == field).map_or(field, |(attribute, _)| attribute)
}

/// The geometry fields of each shape tag, in the order they are written.
fn geometry_fields(tag: &str) -> Option<&'static [&'static str]> {
	let fields: &'static [&'static str] = match tag {
		"circle" => &["cx", "cy", "r"],
		"ellipse" => &["cx", "cy", "rx", "ry"],
		"line" => &["x1", "y1", "x2", "y2"],
		"path" => &["d"],
		"polygon" | "polyline" => &["points"],
		"rect" => &["x", "y", "width", "height", "rx", "ry"],
		_ => return None,
	};
	Some(fields)
}

/// The geometry of one SVG basic shape or path, in user units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Geometry {
	Circle { cx: f64, cy: f64, r: f64 },
	Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
	Line { x1: f64, y1: f64, x2: f64, y2: f64 },
	Path { d: String },
	Polygon { points: Vec<Point> },
	Polyline { points: Vec<Point> },
	/// Zero corner radii are unspecified and take the other radius.
	Rect { x: f64, y: f64, width: f64, height: f64, rx: f64, ry: f64 },
}

impl Geometry {
	pub fn tag(&self) -> &'static str {
		match self {
			Geometry::Circle { .. } => "circle",
			Geometry::Ellipse { .. } => "ellipse",
			Geometry::Line { .. } => "line",
			Geometry::Path { .. } => "path",
			Geometry::Polygon { .. } => "polygon",
			Geometry::Polyline { .. } => "polyline",
			Geometry::Rect { .. } => "rect",
		}
	}

	/// Path data drawing the same outline. Shapes that SVG does not render produce empty path data.
	pub fn to_path_data(&self) -> String {
		let mut path = PathData::default();
		match *self {
			Geometry::Circle { cx, cy, r } => path.ellipse(cx, cy, r, r),
			Geometry::Ellipse { cx, cy, rx, ry } => path.ellipse(cx, cy, rx, ry),
			Geometry::Line { x1, y1, x2, y2 } => {
				path.move_to(x1, y1);
				path.line_to(x2, y2);
			}
			Geometry::Path { ref d } => return d.clone(),
			Geometry::Polygon { ref points } => {
				path.polyline(points);
				if !points.is_empty() {
					path.close();
				}
			}
			Geometry::Polyline { ref points } => path.polyline(points),
			Geometry::Rect { x, y, width, height, rx, ry } => path.rect(x, y, width, height, rx, ry),
		}
		path.0
	}

	fn field_values(&self) -> Vec<(&'static str, String)> {
		match self {
			Geometry::Circle { cx, cy, r } => vec![("cx", format_number(*cx)), ("cy", format_number(*cy)), ("r", format_number(*r))],
			Geometry::Ellipse { cx, cy, rx, ry } => vec![("cx", format_number(*cx)), ("cy", format_number(*cy)), ("rx", format_number(*rx)), ("ry", format_number(*ry))],
			Geometry::Line { x1, y1, x2, y2 } => vec![("x1", format_number(*x1)), ("y1", format_number(*y1)), ("x2", format_number(*x2)), ("y2", format_number(*y2))],
			Geometry::Path { d } => vec![("d", d.clone())],
			Geometry::Polygon { points } | Geometry::Polyline { points } => {
				let points = points.iter().map(|point| format!("{},{}", format_number(point.x), format_number(point.y))).collect::<Vec<_>>();
				vec![("points", points.join(" "))]
			}
			Geometry::Rect { x, y, width, height, rx, ry } => {
				let mut values = vec![("x", format_number(*x)), ("y", format_number(*y)), ("width", format_number(*width)), ("height", format_number(*height))];
				// An explicit zero radius would disable the rounding the other radius implies
				values.extend([("rx", *rx), ("ry", *ry)].into_iter().filter(|(_, radius)| *radius != 0.).map(|(name, radius)| (name, format_number(radius))));
				values
			}
		}
	}
}

/// A decoded shape element.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
	pub geometry: Geometry,
	/// The `clip-path` reference, blank when the shape is not clipped.
	pub clip_path: String,
	/// Every other attribute in document order, with values as written in the markup.
	pub attributes: Vec<(String, String)>,
}

impl Shape {
	pub fn new(geometry: Geometry) -> Self {
		Self {
			geometry,
			clip_path: String::new(),
			attributes: Vec::new(),
		}
	}

	pub fn tag(&self) -> &'static str {
		self.geometry.tag()
	}

	/// The raw value of a pass-through attribute.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(attribute, _)| attribute == name).map(|(_, value)| value.as_str())
	}

	/// The equivalent `<path>`, carrying the same clip path and attributes. Paths convert to themselves.
	pub fn to_path(&self) -> Shape {
		Shape {
			geometry: Geometry::Path { d: self.geometry.to_path_data() },
			clip_path: self.clip_path.clone(),
			attributes: self.attributes.clone(),
		}
	}

	/// Decodes a shape element, keyed by its local name.
	pub(crate) fn from_element(element: &Element) -> Result<Self, NormalizeError> {
		let tag = element.local_name();
		let fields = geometry_fields(tag).ok_or_else(|| NormalizeError::UnrecognizedElement { tag: element.name.clone() })?;

		let length = |name: &str| match element.attribute_value(name) {
			Some(value) => parse_length(&value).map_err(|source| invalid_attribute(element, name, &value, source)),
			None => Ok(0.),
		};
		let geometry = match tag {
			"circle" => Geometry::Circle {
				cx: length("cx")?,
				cy: length("cy")?,
				r: length("r")?,
			},
			"ellipse" => Geometry::Ellipse {
				cx: length("cx")?,
				cy: length("cy")?,
				rx: length("rx")?,
				ry: length("ry")?,
			},
			"line" => Geometry::Line {
				x1: length("x1")?,
				y1: length("y1")?,
				x2: length("x2")?,
				y2: length("y2")?,
			},
			"path" => Geometry::Path {
				d: element.attribute_value("d").unwrap_or_default().into_owned(),
			},
			"polygon" => Geometry::Polygon { points: points(element)? },
			"polyline" => Geometry::Polyline { points: points(element)? },
			_ => Geometry::Rect {
				x: length("x")?,
				y: length("y")?,
				width: length("width")?,
				height: length("height")?,
				rx: length("rx")?,
				ry: length("ry")?,
			},
		};

		let mut clip_path = String::new();
		let mut attributes = Vec::new();
		for attribute in &element.attributes {
			match field_name(&attribute.name) {
				"clip_path" => clip_path = tree::unescape(&attribute.value).into_owned(),
				field if fields.iter().any(|name| *name == field) => {}
				_ => attributes.push((attribute.name.clone(), attribute.value.clone())),
			}
		}

		log::trace!("Decoded <{}>", element.name);
		Ok(Self { geometry, clip_path, attributes })
	}

	/// Encodes the shape as an element named `name`: pass-through attributes first, then geometry, then the clip path.
	pub(crate) fn to_element(&self, name: impl Into<String>) -> Element {
		let mut element = Element::new(name);
		element.attributes.extend(self.attributes.iter().map(|(name, value)| Attribute::new(name.as_str(), value.as_str())));
		element
			.attributes
			.extend(self.geometry.field_values().into_iter().map(|(name, value)| Attribute::new(name, tree::escape(&value, '"'))));

		for (field, value) in [("clip_path", &self.clip_path)] {
			if OMIT_IF_BLANK.contains(&field) && value.trim().is_empty() {
				continue;
			}
			element.attributes.push(Attribute::new(attribute_name(field), tree::escape(value, '"')));
		}
		element
	}
}

impl FromStr for Shape {
	type Err = NormalizeError;

	/// Decodes a standalone shape element such as `<rect width="10" height="5"/>`.
	fn from_str(source: &str) -> Result<Self, Self::Err> {
		let root = tree::parse(source)?;
		let Some(node) = tree::element_children(&root).next() else {
			return Err(NormalizeError::UnrecognizedElement { tag: String::new() });
		};

		let element = node.borrow().as_element().cloned().unwrap_or_else(|| Element::new(""));
		let recognized = SHAPE_TAGS.iter().any(|tag| tree::is_svg_element(&node, tag));
		if !recognized {
			return Err(NormalizeError::UnrecognizedElement { tag: element.name });
		}
		Self::from_element(&element)
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let element = self.to_element(self.tag());
		write!(f, "<{}", element.name)?;
		for attribute in &element.attributes {
			write!(f, " {}={}{}{}", attribute.name, attribute.quote, attribute.value, attribute.quote)?;
		}
		f.write_str("/>")
	}
}

/// Parses one shape element and returns its path equivalent.
pub fn shape_to_path(element_source: &str) -> Result<Shape, NormalizeError> {
	Ok(element_source.parse::<Shape>()?.to_path())
}

fn points(element: &Element) -> Result<Vec<Point>, NormalizeError> {
	let Some(value) = element.attribute_value("points") else { return Ok(Vec::new()) };
	let numbers = parse_number_list(&value).map_err(|source| invalid_attribute(element, "points", &value, source))?;
	if numbers.len() % 2 == 1 {
		log::warn!("Ignoring the unpaired last coordinate of <{}> points", element.name);
	}
	Ok(numbers.chunks_exact(2).map(|pair| Point::new(pair[0], pair[1])).collect())
}

fn invalid_attribute(element: &Element, attribute: &str, value: &str, source: svg_transform::ParseError) -> NormalizeError {
	NormalizeError::InvalidAttribute {
		tag: element.name.clone(),
		attribute: attribute.to_string(),
		value: value.to_string(),
		source,
	}
}

#[derive(Default)]
struct PathData(String);

impl PathData {
	fn command(&mut self, command: char) {
		if !self.0.is_empty() {
			self.0.push(' ');
		}
		self.0.push(command);
	}

	fn point(&mut self, x: f64, y: f64) {
		let _ = write!(self.0, "{},{}", format_number(x), format_number(y));
	}

	fn move_to(&mut self, x: f64, y: f64) {
		self.command('M');
		self.point(x, y);
	}

	fn line_to(&mut self, x: f64, y: f64) {
		self.command('L');
		self.point(x, y);
	}

	fn horizontal(&mut self, x: f64) {
		self.command('H');
		self.0.push_str(&format_number(x));
	}

	fn vertical(&mut self, y: f64) {
		self.command('V');
		self.0.push_str(&format_number(y));
	}

	/// A clockwise elliptical arc of less than half a turn.
	fn arc(&mut self, rx: f64, ry: f64, x: f64, y: f64) {
		self.command('A');
		self.point(rx, ry);
		self.0.push_str(" 0 0 1 ");
		self.point(x, y);
	}

	fn close(&mut self) {
		self.command('Z');
	}

	/// Four quarter arcs, starting from the rightmost point.
	fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
		if !(rx > 0. && ry > 0.) {
			return;
		}
		self.move_to(cx + rx, cy);
		self.arc(rx, ry, cx, cy + ry);
		self.arc(rx, ry, cx - rx, cy);
		self.arc(rx, ry, cx, cy - ry);
		self.arc(rx, ry, cx + rx, cy);
		self.close();
	}

	fn polyline(&mut self, points: &[Point]) {
		let Some((first, rest)) = points.split_first() else { return };
		self.move_to(first.x, first.y);
		for point in rest {
			self.line_to(point.x, point.y);
		}
	}

	fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, rx: f64, ry: f64) {
		if !(width > 0. && height > 0.) {
			return;
		}

		let (rx, ry) = (rx.max(0.), ry.max(0.));
		let (rx, ry) = if rx == 0. { (ry, ry) } else if ry == 0. { (rx, rx) } else { (rx, ry) };
		let (rx, ry) = (rx.min(width / 2.), ry.min(height / 2.));

		if rx == 0. || ry == 0. {
			self.move_to(x, y);
			self.horizontal(x + width);
			self.vertical(y + height);
			self.horizontal(x);
			self.close();
			return;
		}

		let (right, bottom) = (x + width, y + height);
		self.move_to(x + rx, y);
		self.horizontal(right - rx);
		self.arc(rx, ry, right, y + ry);
		self.vertical(bottom - ry);
		self.arc(rx, ry, right - rx, bottom);
		self.horizontal(x + rx);
		self.arc(rx, ry, x, bottom - ry);
		self.vertical(y + ry);
		self.arc(rx, ry, x + rx, y);
		self.close();
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	fn path_data(source: &str) -> String {
		let shape = shape_to_path(source).unwrap();
		match shape.geometry {
			Geometry::Path { d } => d,
			geometry => panic!("Expected a path, found {geometry:?}"),
		}
	}

	#[test]
	fn decode() {
		let shape: Shape = r#"<rect id="r" x="1" y="2.5px" width="10" height="20" clip-path="url(#c)" fill="red"/>"#.parse().unwrap();
		assert_eq!(
			shape,
			Shape {
				geometry: Geometry::Rect {
					x: 1.,
					y: 2.5,
					width: 10.,
					height: 20.,
					rx: 0.,
					ry: 0.
				},
				clip_path: "url(#c)".to_string(),
				attributes: vec![("id".to_string(), "r".to_string()), ("fill".to_string(), "red".to_string())],
			}
		);

		let shape: Shape = "<polyline points='0,0 1 1 2'/>".parse().unwrap();
		assert_eq!(shape.geometry, Geometry::Polyline { points: vec![Point::new(0., 0.), Point::new(1., 1.)] });
		assert_eq!(shape.attribute("points"), None);
	}

	#[test]
	fn decode_errors() {
		assert!(matches!("<g/>".parse::<Shape>(), Err(NormalizeError::UnrecognizedElement { tag }) if tag == "g"));
		assert!(matches!(
			r#"<rect xmlns="urn:other" width="1" height="1"/>"#.parse::<Shape>(),
			Err(NormalizeError::UnrecognizedElement { .. })
		));
		assert!(matches!(
			r#"<circle r="5em"/>"#.parse::<Shape>(),
			Err(NormalizeError::InvalidAttribute { attribute, .. }) if attribute == "r"
		));
		assert!(r#"<svg:circle xmlns:svg="http://www.w3.org/2000/svg" r="1"/>"#.parse::<Shape>().is_ok());
	}

	#[test]
	fn encode() {
		let mut shape: Shape = r#"<circle fill="blue" cx="-0" cy="2" r="3" clip-path="url(#c)"/>"#.parse().unwrap();
		assert_eq!(shape.to_string(), r#"<circle fill="blue" cx="0" cy="2" r="3" clip-path="url(#c)"/>"#);

		shape.clip_path = String::new();
		assert_eq!(shape.to_string(), r#"<circle fill="blue" cx="0" cy="2" r="3"/>"#);

		let shape = Shape::new(Geometry::Polygon {
			points: vec![Point::new(0., 0.), Point::new(1.5, 2.)],
		});
		assert_eq!(shape.to_string(), r#"<polygon points="0,0 1.5,2"/>"#);

		let shape: Shape = r#"<rect width="4" height="4" rx="1" style='font-family:"A"'/>"#.parse().unwrap();
		assert_eq!(shape.to_string(), r#"<rect style='font-family:"A"' x="0" y="0" width="4" height="4" rx="1"/>"#);
	}

	#[test]
	fn circles_and_ellipses() {
		assert_eq!(
			path_data(r#"<circle cx="50" cy="40" r="10"/>"#),
			"M60,40 A10,10 0 0 1 50,50 A10,10 0 0 1 40,40 A10,10 0 0 1 50,30 A10,10 0 0 1 60,40 Z"
		);
		assert_eq!(path_data(r#"<ellipse rx="2" ry="1"/>"#), "M2,0 A2,1 0 0 1 0,1 A2,1 0 0 1 -2,0 A2,1 0 0 1 0,-1 A2,1 0 0 1 2,0 Z");
	}

	#[test]
	fn rects() {
		assert_eq!(path_data(r#"<rect x="1" y="2" width="10" height="20"/>"#), "M1,2 H11 V22 H1 Z");
		assert_eq!(
			path_data(r#"<rect width="10" height="20" rx="2"/>"#),
			"M2,0 H8 A2,2 0 0 1 10,2 V18 A2,2 0 0 1 8,20 H2 A2,2 0 0 1 0,18 V2 A2,2 0 0 1 2,0 Z"
		);
		// Radii are clamped to half the size after the missing one is filled in
		assert_eq!(
			path_data(r#"<rect width="10" height="20" rx="8"/>"#),
			"M5,0 H5 A5,8 0 0 1 10,8 V12 A5,8 0 0 1 5,20 H5 A5,8 0 0 1 0,12 V8 A5,8 0 0 1 5,0 Z"
		);
	}

	#[test]
	fn lines_and_polygons() {
		assert_eq!(path_data(r#"<line x1="1" y1="2" x2="3" y2="4"/>"#), "M1,2 L3,4");
		assert_eq!(path_data(r#"<polygon points="0,0 10,0 10,10"/>"#), "M0,0 L10,0 L10,10 Z");
		assert_eq!(path_data(r#"<polyline points="0,0 10,0 10,10"/>"#), "M0,0 L10,0 L10,10");
		assert_eq!(path_data(r#"<path d="M1 1h2"/>"#), "M1 1h2");
	}

	#[test]
	fn degenerate_shapes_draw_nothing() {
		for source in [
			r#"<circle r="0"/>"#,
			r#"<circle r="-1"/>"#,
			r#"<ellipse rx="1"/>"#,
			r#"<rect width="10"/>"#,
			r#"<rect width="-1" height="5"/>"#,
			r#"<polygon/>"#,
			r#"<polyline points=""/>"#,
		] {
			assert_eq!(path_data(source), "", "{source}");
		}
	}

	#[test]
	fn conversion_is_idempotent() {
		let shape: Shape = r#"<rect id="a" width="10" height="5" rx="1" clip-path="url(#c)"/>"#.parse().unwrap();
		let path = shape.to_path();
		assert_eq!(path.to_path(), path);
		assert_eq!(path.clip_path, "url(#c)");
		assert_eq!(path.attribute("id"), Some("a"));
		assert_eq!(shape.tag(), "rect");
	}
}
