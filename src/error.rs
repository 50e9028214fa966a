use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Empty grid")]
	EmptyGrid,

	#[error("Rows of unequal lengths: row {row} has {found} values, expected {expected}")]
	RaggedRows { row: usize, expected: usize, found: usize },

	#[error("Can't parse {token:?} on line {line} as a cell value")]
	Parse { line: usize, token: String },

	#[error("Attempt to combine sandpiles on grids of different sizes: {}x{} and {}x{}", left.0, left.1, right.0, right.1)]
	ShapeMismatch { left: (usize, usize), right: (usize, usize) },

	#[error("Cell value overflow")]
	CellOverflow,

	#[error("Identity not reached within {limit} additions")]
	NonTerminating { limit: u64 },

	#[error("Unable to get the identity element for a {rows}x{cols} grid")]
	NoIdentity { rows: usize, cols: usize },

	#[error("A {rows}x{cols} grid is too large to enumerate (at most {max_cells} cells)")]
	TooLarge { rows: usize, cols: usize, max_cells: usize },

	#[error("Cell value {value} has no colour, stabilize first")]
	Unrenderable { value: i64 },

	#[error(transparent)]
	Io(#[from] io::Error),
}
