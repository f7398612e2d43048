use crate::error::ParseError;

/// A byte cursor over attribute text that understands the SVG number and separator grammar.
pub(crate) struct Cursor<'a> {
	source: &'a str,
	position: usize,
}

impl<'a> Cursor<'a> {
	pub(crate) fn new(source: &'a str) -> Self {
		Self { source, position: 0 }
	}

	pub(crate) fn position(&self) -> usize {
		self.position
	}

	pub(crate) fn peek(&self) -> Option<u8> {
		self.source.as_bytes().get(self.position).copied()
	}

	/// The character under the cursor, for error reporting.
	pub(crate) fn current_char(&self) -> Option<char> {
		self.source[self.position..].chars().next()
	}

	pub(crate) fn advance(&mut self) {
		self.position += 1;
	}

	pub(crate) fn is_at_end(&self) -> bool {
		self.position >= self.source.len()
	}

	pub(crate) fn skip_whitespace(&mut self) {
		while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
			self.advance();
		}
	}

	/// Skips `wsp* ,? wsp*`, returning whether a comma was consumed.
	pub(crate) fn skip_comma_whitespace(&mut self) -> bool {
		self.skip_whitespace();
		let comma = self.peek() == Some(b',');
		if comma {
			self.advance();
			self.skip_whitespace();
		}
		comma
	}

	/// Consumes an ASCII identifier such as a transform function name.
	pub(crate) fn identifier(&mut self) -> &'a str {
		let start = self.position;
		while self.peek().is_some_and(|byte| byte.is_ascii_alphabetic()) {
			self.advance();
		}
		&self.source[start..self.position]
	}

	/// Whether the next byte can start a number.
	pub(crate) fn at_number(&self) -> bool {
		matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
	}

	fn digits(&mut self) -> usize {
		let start = self.position;
		while self.peek().is_some_and(|byte| byte.is_ascii_digit()) {
			self.advance();
		}
		self.position - start
	}

	/// Consumes one number: `sign? (digits ('.' digits?)? | '.' digits) (exponent)?`.
	pub(crate) fn number(&mut self) -> Result<f64, ParseError> {
		let start = self.position;

		if matches!(self.peek(), Some(b'-' | b'+')) {
			self.advance();
		}

		let integer_digits = self.digits();
		let mut fraction_digits = 0;
		if self.peek() == Some(b'.') {
			self.advance();
			fraction_digits = self.digits();
		}
		if integer_digits + fraction_digits == 0 {
			self.position = start;
			return Err(ParseError::InvalidNumber { position: start });
		}

		// An exponent only counts when digits follow, so "2em" stops before the "e"
		if matches!(self.peek(), Some(b'e' | b'E')) {
			let before_exponent = self.position;
			self.advance();
			if matches!(self.peek(), Some(b'-' | b'+')) {
				self.advance();
			}
			if self.digits() == 0 {
				self.position = before_exponent;
			}
		}

		let literal = &self.source[start..self.position];
		literal.parse::<f64>().ok().filter(|value| value.is_finite()).ok_or(ParseError::InvalidNumber { position: start })
	}
}

/// Parses a comma/whitespace separated list of numbers, as used by the `points` attribute.
pub fn parse_number_list(source: &str) -> Result<Vec<f64>, ParseError> {
	let mut cursor = Cursor::new(source);
	let mut numbers = Vec::new();

	cursor.skip_whitespace();
	while !cursor.is_at_end() {
		numbers.push(cursor.number()?);
		let comma = cursor.skip_comma_whitespace();
		if comma && cursor.is_at_end() {
			return Err(ParseError::UnexpectedEnd);
		}
	}

	Ok(numbers)
}

/// Parses a single number, optionally surrounded by whitespace and followed by a `px` unit.
pub fn parse_length(source: &str) -> Result<f64, ParseError> {
	let mut cursor = Cursor::new(source);
	cursor.skip_whitespace();
	let value = cursor.number()?;

	// Only user units are meaningful without a viewport or font context
	let unit_position = cursor.position();
	let unit = cursor.identifier();
	if !unit.is_empty() && unit != "px" {
		return Err(ParseError::UnsupportedUnit {
			unit: unit.to_string(),
			position: unit_position,
		});
	}
	cursor.skip_whitespace();

	match cursor.current_char() {
		None => Ok(value),
		Some(character) => Err(ParseError::UnexpectedCharacter { character, position: cursor.position() }),
	}
}

/// Writes `value` in its shortest round-trip form, without a sign on zero.
pub fn format_number(value: f64) -> String {
	if value == 0. {
		return "0".to_string();
	}
	value.to_string()
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn number_grammar() {
		assert_eq!(parse_number_list("1 -2.5,.5 +3e2 4E-1").unwrap(), vec![1., -2.5, 0.5, 300., 0.4]);
		// Numbers may run together when the sign or decimal point is unambiguous
		assert_eq!(parse_number_list("1-2.5.5").unwrap(), vec![1., -2.5, 0.5]);
		assert_eq!(parse_number_list("  ").unwrap(), Vec::<f64>::new());
	}

	#[test]
	fn number_list_errors() {
		assert_eq!(parse_number_list("1,,2"), Err(ParseError::InvalidNumber { position: 2 }));
		assert_eq!(parse_number_list("1 2,"), Err(ParseError::UnexpectedEnd));
		assert_eq!(parse_number_list("1 x"), Err(ParseError::InvalidNumber { position: 2 }));
	}

	#[test]
	fn lengths() {
		assert_eq!(parse_length(" 10 "), Ok(10.));
		assert_eq!(parse_length("2.5px"), Ok(2.5));
		assert_eq!(parse_length("-1e1"), Ok(-10.));
		assert!(parse_length("50%").is_err());
		assert!(parse_length("3em").is_err());
		assert!(parse_length("").is_err());
	}

	#[test]
	fn formatting() {
		assert_eq!(format_number(10.), "10");
		assert_eq!(format_number(-0.), "0");
		assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
		assert_eq!(format_number(-2.5), "-2.5");
	}
}
