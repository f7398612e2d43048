use thiserror::Error;

/// Failure to read an SVG `transform` attribute or a number list. Positions are byte offsets into the parsed text.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseError {
	#[error("Unknown transform function `{name}` at position {position}")]
	UnknownFunction { name: String, position: usize },

	#[error("The `{function}` transform function does not accept {count} argument(s) (at position {position})")]
	ArgumentCount { function: &'static str, count: usize, position: usize },

	#[error("Invalid number at position {position}")]
	InvalidNumber { position: usize },

	#[error("Unsupported unit `{unit}` at position {position}")]
	UnsupportedUnit { unit: String, position: usize },

	#[error("Unexpected character `{character}` at position {position}")]
	UnexpectedCharacter { character: char, position: usize },

	#[error("Unexpected end of input")]
	UnexpectedEnd,
}

/// The error returned by [`parse_svg_transform`](crate::parse_svg_transform).
pub type TransformParseError = ParseError;
