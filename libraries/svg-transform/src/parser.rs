use crate::affine::Affine2D;
use crate::error::ParseError;
use crate::number::Cursor;

/// The functions of the SVG transform list grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TransformFunction {
	Matrix,
	Translate,
	Scale,
	Rotate,
	SkewX,
	SkewY,
}

impl TransformFunction {
	const ALL: [Self; 6] = [Self::Matrix, Self::Translate, Self::Scale, Self::Rotate, Self::SkewX, Self::SkewY];

	fn name(self) -> &'static str {
		match self {
			Self::Matrix => "matrix",
			Self::Translate => "translate",
			Self::Scale => "scale",
			Self::Rotate => "rotate",
			Self::SkewX => "skewX",
			Self::SkewY => "skewY",
		}
	}

	fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|function| function.name().eq_ignore_ascii_case(name))
	}

	/// Post-multiplies `transform` by this function. Angles arrive in degrees.
	fn apply(self, transform: Affine2D, arguments: &[f64], position: usize) -> Result<Affine2D, ParseError> {
		let result = match (self, arguments) {
			(Self::Matrix, &[a, b, c, d, e, f]) => Affine2D::product(Affine2D::new(a, b, c, d, e, f), transform),
			(Self::Translate, &[tx]) => transform.translate(tx, 0.),
			(Self::Translate, &[tx, ty]) => transform.translate(tx, ty),
			(Self::Scale, &[scale]) => transform.scale(scale, scale),
			(Self::Scale, &[sx, sy]) => transform.scale(sx, sy),
			(Self::Rotate, &[angle]) => transform.rotate(angle.to_radians()),
			(Self::Rotate, &[angle, cx, cy]) => transform.rotate_about(angle.to_radians(), cx, cy),
			(Self::SkewX, &[angle]) => transform.skew_x(angle.to_radians()),
			(Self::SkewY, &[angle]) => transform.skew_y(angle.to_radians()),
			(function, arguments) => {
				return Err(ParseError::ArgumentCount {
					function: function.name(),
					count: arguments.len(),
					position,
				});
			}
		};
		Ok(result)
	}
}

/// Parses the value of an SVG `transform` attribute into the single transform it describes.
///
/// The list `T1 T2 … Tn` composes left to right: each function acts in the coordinate space established by the ones before it,
/// giving the matrix `T1 · T2 · … · Tn`. An empty list is the identity. Function names are matched case-insensitively.
pub fn parse_svg_transform(source: &str) -> Result<Affine2D, ParseError> {
	let mut cursor = Cursor::new(source);
	let mut transform = Affine2D::identity();

	cursor.skip_whitespace();
	while !cursor.is_at_end() {
		let position = cursor.position();
		let name = cursor.identifier();
		if name.is_empty() {
			return Err(unexpected(&cursor));
		}
		let function = TransformFunction::from_name(name).ok_or_else(|| ParseError::UnknownFunction { name: name.to_string(), position })?;

		cursor.skip_whitespace();
		if cursor.peek() != Some(b'(') {
			return Err(unexpected(&cursor));
		}
		cursor.advance();

		let arguments = arguments(&mut cursor)?;
		transform = function.apply(transform, &arguments, position)?;

		if cursor.skip_comma_whitespace() && cursor.is_at_end() {
			return Err(ParseError::UnexpectedEnd);
		}
	}

	Ok(transform)
}

/// Reads `number (comma-wsp number)* wsp* ')'`, with the opening parenthesis already consumed.
fn arguments(cursor: &mut Cursor) -> Result<Vec<f64>, ParseError> {
	let mut arguments = Vec::new();
	let mut after_comma = false;

	cursor.skip_whitespace();
	loop {
		match cursor.peek() {
			None => return Err(ParseError::UnexpectedEnd),
			Some(b')') if !after_comma => {
				cursor.advance();
				return Ok(arguments);
			}
			Some(_) if !cursor.at_number() => return Err(unexpected(cursor)),
			Some(_) => {}
		}

		arguments.push(cursor.number()?);
		after_comma = cursor.skip_comma_whitespace();
	}
}

fn unexpected(cursor: &Cursor) -> ParseError {
	match cursor.current_char() {
		Some(character) => ParseError::UnexpectedCharacter { character, position: cursor.position() },
		None => ParseError::UnexpectedEnd,
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::f64::consts::PI;

	const TOLERANCE: f64 = 1e-3;

	#[test]
	fn parse_transforms() {
		let cases = [
			// translate(tx)
			("translate(-5)".to_string(), Affine2D::new(1., 0., 0., 1., -5., 0.)),
			// translate(tx ty)
			("translate(3.5, -0.65)".to_string(), Affine2D::new(1., 0., 0., 1., 3.5, -0.65)),
			// scale(sx)
			("scale(2)".to_string(), Affine2D::new(2., 0., 0., 2., 0., 0.)),
			// scale(sx,sy)
			("scale(-2 -3)".to_string(), Affine2D::new(-2., 0., 0., -3., 0., 0.)),
			// rotate(angle)
			(format!("rotate({})", (PI / 4.).to_degrees()), Affine2D::new(0.707, 0.707, -0.707, 0.707, 0., 0.)),
			// rotate(angle cx cy)
			(format!("rotate({}, 5, 6)", (PI / 2.).to_degrees()), Affine2D::new(0., 1., -1., 0., 11., 1.)),
			// skewX(angle), with the function name in lowercase
			(format!("skewx({})", (PI / 8.).to_degrees()), Affine2D::new(1., 0., 0.414, 1., 0., 0.)),
			// skewY(angle)
			(format!("skewY({})", (PI / 8.).to_degrees()), Affine2D::new(1., 0.414, 0., 1., 0., 0.)),
			// Example from FontTools
			("matrix(2, 0, 0, 3, 1, 6) matrix(4, 3, 2, 1, 5, 6)".to_string(), Affine2D::new(8., 9., 4., 3., 11., 24.)),
			// The translate, rotate, translate example from SVG 1.1
			("translate(50 90),rotate(-45) translate(130,160)".to_string(), Affine2D::new(0.707, -0.707, 0.707, 0.707, 255.061, 111.213)),
		];

		for (source, expected) in cases {
			let actual = parse_svg_transform(&source).unwrap();
			assert!(actual.almost_equals(&expected, TOLERANCE), "`{source}` parsed to {actual}, expected {expected}");
		}
	}

	#[test]
	fn exact_results() {
		assert_eq!(parse_svg_transform("translate(-5)"), Ok(Affine2D::new(1., 0., 0., 1., -5., 0.)));
		assert_eq!(parse_svg_transform(""), Ok(Affine2D::identity()));
		assert_eq!(parse_svg_transform(" \n\t"), Ok(Affine2D::identity()));
		assert_eq!(parse_svg_transform("rotate(90,5,6)").map(|transform| transform.almost_equals(&Affine2D::new(0., 1., -1., 0., 11., 1.), TOLERANCE)), Ok(true));
	}

	#[test]
	fn whitespace_and_separators() {
		let compact = parse_svg_transform("translate(10,20)scale(2)").unwrap();
		let spaced = parse_svg_transform("  translate ( 10 20 ) ,  scale( 2 )  ").unwrap();
		assert_eq!(compact, spaced);
		assert_eq!(compact, Affine2D::new(2., 0., 0., 2., 10., 20.));
	}

	#[test]
	fn composition_order() {
		// The first function establishes the space in which the second one acts
		let transform = parse_svg_transform("translate(10) scale(2)").unwrap();
		assert_eq!(transform.map_point((1., 1.)), crate::Point::new(12., 2.));

		let transform = parse_svg_transform("scale(2) translate(10)").unwrap();
		assert_eq!(transform.map_point((1., 1.)), crate::Point::new(22., 2.));
	}

	#[test]
	fn errors() {
		assert_eq!(parse_svg_transform("spin(45)"), Err(ParseError::UnknownFunction { name: "spin".to_string(), position: 0 }));
		assert_eq!(
			parse_svg_transform("scale(1) rotate(1, 2)"),
			Err(ParseError::ArgumentCount {
				function: "rotate",
				count: 2,
				position: 9
			})
		);
		assert_eq!(
			parse_svg_transform("matrix(1 2 3)"),
			Err(ParseError::ArgumentCount {
				function: "matrix",
				count: 3,
				position: 0
			})
		);
		assert_eq!(
			parse_svg_transform("translate()"),
			Err(ParseError::ArgumentCount {
				function: "translate",
				count: 0,
				position: 0
			})
		);
		assert_eq!(parse_svg_transform("translate(1e)"), Err(ParseError::UnexpectedCharacter { character: 'e', position: 11 }));
		assert_eq!(parse_svg_transform("translate(1,)"), Err(ParseError::UnexpectedCharacter { character: ')', position: 12 }));
		assert_eq!(parse_svg_transform("translate(1"), Err(ParseError::UnexpectedEnd));
		assert_eq!(parse_svg_transform("translate 1"), Err(ParseError::UnexpectedCharacter { character: '1', position: 10 }));
		assert_eq!(parse_svg_transform("(1)"), Err(ParseError::UnexpectedCharacter { character: '(', position: 0 }));
		assert_eq!(parse_svg_transform("scale(2),"), Err(ParseError::UnexpectedEnd));
	}
}
