//! Normalizes SVG documents: basic shapes become paths and clip paths are baked into the geometry they clip.
//!
//! A [`Document`] parses the markup once, decodes its shape elements on first use, and writes back only the elements it changed, so
//! everything else serializes exactly as it was read.
//!
//! ```
//! use svg_normalize::Document;
//!
//! let mut document: Document = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="10" height="5"/></svg>"#.parse().unwrap();
//! document.shapes_to_paths_mut().unwrap();
//! assert_eq!(document.to_svg_string(), r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0,0 H10 V5 H0 Z"/></svg>"#);
//! ```

mod clip;
mod document;
mod error;
mod options;
mod shapes;
mod tree;

pub use document::Document;
pub use error::{ClipResolutionError, NormalizeError, XmlError};
pub use options::NormalizeOptions;
pub use path_bool::FillRule;
pub use shapes::{Geometry, SHAPE_TAGS, Shape, shape_to_path};
pub use svg_transform::{Affine2D, Point, Rect, parse_svg_transform};
