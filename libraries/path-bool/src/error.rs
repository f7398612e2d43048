use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum BooleanError {
	#[error("Invalid path data: {0}")]
	InvalidPathData(String),

	#[error("Path coordinates must be finite")]
	NonFiniteGeometry,
}
