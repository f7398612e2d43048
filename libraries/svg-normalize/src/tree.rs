use crate::error::XmlError;
use std::borrow::Cow;
use xmlparser::{ElementEnd, Token, Tokenizer};

pub(crate) const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// An attribute as written in the markup. The value is raw: entities stay unexpanded.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Attribute {
	pub name: String,
	pub value: String,
	pub quote: char,
}

impl Attribute {
	/// Builds an attribute from a raw value, quoting it with whichever quote character it does not contain.
	pub(crate) fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		let value = value.into();
		let quote = if value.contains('"') { '\'' } else { '"' };
		Self { name: name.into(), value, quote }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Element {
	/// The qualified name, including any namespace prefix.
	pub name: String,
	pub attributes: Vec<Attribute>,
}

impl Element {
	pub(crate) fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: Vec::new(),
		}
	}

	pub(crate) fn prefix(&self) -> &str {
		self.name.split_once(':').map_or("", |(prefix, _)| prefix)
	}

	pub(crate) fn local_name(&self) -> &str {
		self.name.split_once(':').map_or(self.name.as_str(), |(_, local)| local)
	}

	/// The raw value of an attribute.
	pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|attribute| attribute.name == name).map(|attribute| attribute.value.as_str())
	}

	/// The value of an attribute with its entities expanded.
	pub(crate) fn attribute_value(&self, name: &str) -> Option<Cow<'_, str>> {
		self.attribute(name).map(unescape)
	}

	pub(crate) fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
		let index = self.attributes.iter().position(|attribute| attribute.name == name)?;
		Some(self.attributes.remove(index))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum XmlNode {
	Root,
	Element(Element),
	/// Character data, raw.
	Text(String),
	/// Declarations, processing instructions, comments, doctypes and CDATA sections, kept verbatim.
	Markup(String),
}

impl XmlNode {
	pub(crate) fn as_element(&self) -> Option<&Element> {
		match self {
			XmlNode::Element(element) => Some(element),
			_ => None,
		}
	}
}

pub(crate) type Node = rctree::Node<XmlNode>;

/// Builds a tree under a [`XmlNode::Root`] node, which holds the root element and any markup around it.
pub(crate) fn parse(source: &str) -> Result<Node, XmlError> {
	let root = Node::new(XmlNode::Root);
	let mut stack = vec![root.clone()];
	// The element whose start tag is still collecting attributes
	let mut current: Option<Node> = None;
	let mut doctype_start = None;

	for token in Tokenizer::from(source) {
		match token? {
			Token::ElementStart { prefix, local, .. } => {
				let element = Element::new(qualified_name(prefix.as_str(), local.as_str()));
				current = Some(Node::new(XmlNode::Element(element)));
			}
			Token::Attribute { prefix, local, value, span } => {
				if let Some(node) = &mut current {
					if let XmlNode::Element(element) = &mut *node.borrow_mut() {
						element.attributes.push(Attribute {
							name: qualified_name(prefix.as_str(), local.as_str()),
							value: value.as_str().to_string(),
							quote: span.as_str().chars().last().unwrap_or('"'),
						});
					}
				}
			}
			Token::ElementEnd { end, .. } => match end {
				ElementEnd::Open => {
					let Some(node) = current.take() else { continue };
					append(&mut stack, node.clone());
					stack.push(node);
				}
				ElementEnd::Empty => {
					let Some(node) = current.take() else { continue };
					append(&mut stack, node);
				}
				ElementEnd::Close(prefix, local) => {
					let found = qualified_name(prefix.as_str(), local.as_str());
					if stack.len() == 1 {
						return Err(XmlError::UnexpectedClose(found));
					}
					let Some(node) = stack.pop() else { continue };
					let expected = node.borrow().as_element().map(|element| element.name.clone()).unwrap_or_default();
					if expected != found {
						return Err(XmlError::MismatchedClose { expected, found });
					}
				}
			},
			Token::Text { text } => append(&mut stack, Node::new(XmlNode::Text(text.as_str().to_string()))),
			Token::Declaration { span, .. } | Token::ProcessingInstruction { span, .. } | Token::Comment { span, .. } | Token::Cdata { span, .. } | Token::EmptyDtd { span, .. } => {
				append(&mut stack, Node::new(XmlNode::Markup(span.as_str().to_string())));
			}
			Token::DtdStart { span, .. } => doctype_start = Some(span.start()),
			Token::EntityDeclaration { .. } => {}
			Token::DtdEnd { span } => {
				if let Some(start) = doctype_start.take() {
					append(&mut stack, Node::new(XmlNode::Markup(source[start..span.end()].to_string())));
				}
			}
		}
	}

	if let Some(unclosed) = stack.pop().filter(|_| !stack.is_empty()) {
		let name = unclosed.borrow().as_element().map(|element| element.name.clone()).unwrap_or_default();
		return Err(XmlError::Unclosed(name));
	}
	let root_elements = root.children().filter(|child| child.borrow().as_element().is_some()).count();
	if root_elements != 1 {
		return Err(XmlError::RootElementCount(root_elements));
	}

	log::trace!("Parsed {} nodes", root.descendants().count());
	Ok(root)
}

fn append(stack: &mut [Node], node: Node) {
	if let Some(parent) = stack.last_mut() {
		parent.append(node);
	}
}

fn qualified_name(prefix: &str, local: &str) -> String {
	if prefix.is_empty() { local.to_string() } else { format!("{prefix}:{local}") }
}

pub(crate) fn serialize(node: &Node) -> String {
	let mut output = String::new();
	write_node(node, &mut output);
	output
}

fn write_node(node: &Node, output: &mut String) {
	match &*node.borrow() {
		XmlNode::Root => {
			for child in node.children() {
				write_node(&child, output);
			}
		}
		XmlNode::Element(element) => {
			output.push('<');
			output.push_str(&element.name);
			for attribute in &element.attributes {
				output.push(' ');
				output.push_str(&attribute.name);
				output.push('=');
				output.push(attribute.quote);
				output.push_str(&attribute.value);
				output.push(attribute.quote);
			}

			if node.has_children() {
				output.push('>');
				for child in node.children() {
					write_node(&child, output);
				}
				output.push_str("</");
				output.push_str(&element.name);
				output.push('>');
			} else {
				output.push_str("/>");
			}
		}
		XmlNode::Text(text) | XmlNode::Markup(text) => output.push_str(text),
	}
}

/// The namespace URI of an element, resolved through the `xmlns` declarations on it and its ancestors.
pub(crate) fn namespace(node: &Node) -> Option<String> {
	let declaration = match &*node.borrow() {
		XmlNode::Element(element) if element.prefix().is_empty() => "xmlns".to_string(),
		XmlNode::Element(element) => format!("xmlns:{}", element.prefix()),
		_ => return None,
	};
	node.ancestors().find_map(|ancestor| ancestor.borrow().as_element().and_then(|element| element.attribute_value(&declaration)).map(Cow::into_owned))
}

/// Whether the node is an element with this local name, either in the SVG namespace or in none.
pub(crate) fn is_svg_element(node: &Node, local_name: &str) -> bool {
	let matches_name = node.borrow().as_element().is_some_and(|element| element.local_name() == local_name);
	matches_name && namespace(node).is_none_or(|namespace| namespace == SVG_NAMESPACE)
}

pub(crate) fn find_by_id(root: &Node, id: &str) -> Option<Node> {
	root.descendants()
		.find(|node| node.borrow().as_element().and_then(|element| element.attribute_value("id")).is_some_and(|value| value == id))
}

pub(crate) fn element_children(node: &Node) -> impl Iterator<Item = Node> {
	node.children().filter(|child| child.borrow().as_element().is_some())
}

/// Expands the predefined and numeric character references. Unknown references are left as written.
pub(crate) fn unescape(raw: &str) -> Cow<'_, str> {
	if !raw.contains('&') {
		return Cow::Borrowed(raw);
	}

	let mut result = String::with_capacity(raw.len());
	let mut rest = raw;
	while let Some(start) = rest.find('&') {
		result.push_str(&rest[..start]);
		rest = &rest[start..];

		let reference = rest.find(';').and_then(|end| decode_reference(&rest[1..end]).map(|character| (character, end)));
		match reference {
			Some((character, end)) => {
				result.push(character);
				rest = &rest[end + 1..];
			}
			None => {
				result.push('&');
				rest = &rest[1..];
			}
		}
	}
	result.push_str(rest);
	Cow::Owned(result)
}

fn decode_reference(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		_ => {
			let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
				u32::from_str_radix(hex, 16).ok()?
			} else {
				name.strip_prefix('#')?.parse().ok()?
			};
			char::from_u32(code)
		}
	}
}

/// Escapes text for use inside an attribute value delimited by `quote`.
pub(crate) fn escape(value: &str, quote: char) -> Cow<'_, str> {
	if !value.contains(['&', '<', quote]) {
		return Cow::Borrowed(value);
	}

	let mut result = String::with_capacity(value.len() + 8);
	for character in value.chars() {
		match character {
			'&' => result.push_str("&amp;"),
			'<' => result.push_str("&lt;"),
			'"' if quote == '"' => result.push_str("&quot;"),
			'\'' if quote == '\'' => result.push_str("&apos;"),
			_ => result.push(character),
		}
	}
	Cow::Owned(result)
}
