use path_bool::BooleanError;
use svg_transform::{ParseError, TransformParseError};
use thiserror::Error;

/// The error type of every fallible document operation.
#[derive(Debug, Error)]
pub enum NormalizeError {
	#[error("Failed to parse the document: {0}")]
	Xml(#[from] XmlError),

	#[error("Failed to read the document: {0}")]
	Io(#[from] std::io::Error),

	#[error("<{tag}> is not a shape element")]
	UnrecognizedElement { tag: String },

	#[error("Invalid `{attribute}` value {value:?} on <{tag}>: {source}")]
	InvalidAttribute {
		tag: String,
		attribute: String,
		value: String,
		#[source]
		source: ParseError,
	},

	#[error("Invalid transform: {0}")]
	TransformParse(#[from] TransformParseError),

	#[error(transparent)]
	ClipResolution(#[from] ClipResolutionError),

	#[error("Boolean operation failed: {0}")]
	Boolean(#[from] BooleanError),
}

#[derive(Debug, Error)]
pub enum XmlError {
	#[error(transparent)]
	Syntax(#[from] xmlparser::Error),

	#[error("Closing tag </{found}> does not match <{expected}>")]
	MismatchedClose { expected: String, found: String },

	#[error("Closing tag </{0}> has no opening tag")]
	UnexpectedClose(String),

	#[error("<{0}> is never closed")]
	Unclosed(String),

	#[error("Expected exactly one root element, found {0}")]
	RootElementCount(usize),
}

/// A `clip-path` reference that cannot be turned into clip geometry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClipResolutionError {
	#[error("No element has the clip path id `{id}`")]
	Missing { id: String },

	#[error("`{id}` names a <{tag}>, not a <clipPath>")]
	NotAClipPath { id: String, tag: String },

	#[error("Malformed clip path reference {reference:?}")]
	Malformed { reference: String },

	#[error("Clip path `{id}` refers back to itself")]
	Cycle { id: String },

	#[error("Clip path `{id}` contains a <{tag}>, which is not a shape")]
	UnsupportedContent { id: String, tag: String },

	#[error("Clip path `{id}` applies to a <{tag}>, whose geometry cannot be clipped")]
	UnsupportedTarget { id: String, tag: String },
}
