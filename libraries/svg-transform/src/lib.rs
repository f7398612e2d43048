//! Exact 2D affine transform algebra for SVG documents.
//!
//! [`Affine2D`] composes, inverts and classifies transforms, and [`parse_svg_transform`] reads the SVG `transform` attribute grammar into one.

mod affine;
mod error;
mod geometry;
mod number;
mod parser;

pub use affine::{Affine2D, DEGENERATE_EPSILON};
pub use error::{ParseError, TransformParseError};
pub use geometry::{Point, Rect, Vector};
pub use number::{format_number, parse_length, parse_number_list};
pub use parser::parse_svg_transform;
