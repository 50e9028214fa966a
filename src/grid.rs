use std::{
	fmt,
	hash::{Hash, Hasher},
	str::FromStr,
};

use crate::{Cell, Error, Result};

/// A cell holding this many grains or more is unstable.
pub const THRESHOLD: Cell = 4;

const TL: char = '┏';
const TR: char = '┓';
const BL: char = '┗';
const BR: char = '┛';
const H: char = '━';
const V: char = '┃';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	/// Topple the grid right away. Turn off to watch the
	/// stabilization with [`Sandpile::trace`].
	pub stabilize_on_construct: bool,
}

impl Default for Options {
	fn default() -> Options {
		Options {
			stabilize_on_construct: true,
		}
	}
}

impl Options {
	pub fn deferred() -> Options {
		Options {
			stabilize_on_construct: false,
		}
	}
}

/// A sandpile on a finite rectangular grid whose border leaks into the sink.
///
/// Equality and hashing look at the shape and the cells only.
#[derive(Debug, Clone)]
pub struct Sandpile {
	pub(crate) grid: Vec<Vec<Cell>>,
	pub(crate) last_topple: u64,
}

impl Sandpile {
	/// Builds a sandpile from its rows and stabilizes it.
	pub fn new(grid: Vec<Vec<Cell>>) -> Result<Sandpile> {
		Sandpile::with_options(grid, Options::default())
	}

	pub fn with_options(grid: Vec<Vec<Cell>>, options: Options) -> Result<Sandpile> {
		if grid.is_empty() {
			return Err(Error::EmptyGrid);
		}
		let l = grid[0].len();
		if l == 0 {
			return Err(Error::EmptyGrid);
		}
		for (row, values) in grid.iter().enumerate() {
			if values.len() != l {
				return Err(Error::RaggedRows {
					row,
					expected: l,
					found: values.len(),
				});
			}
		}
		positive_sand(&grid)?;
		let mut pile = Sandpile::from_grid(grid);
		if options.stabilize_on_construct {
			pile.stabilize();
		}
		Ok(pile)
	}

	/// Caller guarantees a non-empty rectangular grid.
	pub(crate) fn from_grid(grid: Vec<Vec<Cell>>) -> Sandpile {
		Sandpile {
			grid,
			last_topple: 0,
		}
	}

	/// Every cell set to `value`, then stabilized.
	pub fn constant(rows: usize, cols: usize, value: Cell) -> Result<Sandpile> {
		Sandpile::new(vec![vec![value; cols]; rows])
	}

	pub fn zero(rows: usize, cols: usize) -> Result<Sandpile> {
		Sandpile::constant(rows, cols, 0)
	}

	/// The stable sandpile with 3 grains everywhere, recurrent on every shape.
	pub fn max_stable(rows: usize, cols: usize) -> Result<Sandpile> {
		Sandpile::constant(rows, cols, THRESHOLD - 1)
	}

	/// Parses one row per non-empty line, values separated by whitespace.
	pub fn from_string(s: &str, options: Options) -> Result<Sandpile> {
		let mut grid = Vec::new();
		for (n, line) in s.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}
			let row = line
				.split_whitespace()
				.map(|token| {
					token.parse::<Cell>().map_err(|_| Error::Parse {
						line: n + 1,
						token: token.to_owned(),
					})
				})
				.collect::<Result<Vec<_>>>()?;
			grid.push(row);
		}
		Sandpile::with_options(grid, options)
	}

	pub fn rows(&self) -> usize {
		self.grid.len()
	}

	pub fn cols(&self) -> usize {
		self.grid[0].len()
	}

	pub fn shape(&self) -> (usize, usize) {
		(self.rows(), self.cols())
	}

	pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
		self.grid.get(row)?.get(col).copied()
	}

	pub fn as_rows(&self) -> &[Vec<Cell>] {
		&self.grid
	}

	pub fn into_rows(self) -> Vec<Vec<Cell>> {
		self.grid
	}

	/// Total amount of sand on the grid, negative cells included.
	pub fn total(&self) -> Result<Cell> {
		self.grid
			.iter()
			.flatten()
			.try_fold(0 as Cell, |acc, &v| acc.checked_add(v))
			.ok_or(Error::CellOverflow)
	}

	pub fn is_stable(&self) -> bool {
		self.grid.iter().flatten().all(|&v| v < THRESHOLD)
	}

	/// Number of topplings done by the last stabilization.
	pub fn last_topple(&self) -> u64 {
		self.last_topple
	}

	pub(crate) fn check_shape(&self, other: &Sandpile) -> Result<()> {
		if self.shape() != other.shape() {
			return Err(Error::ShapeMismatch {
				left: self.shape(),
				right: other.shape(),
			});
		}
		Ok(())
	}

	/// Cellwise sum, left unstabilized.
	pub fn elementwise_add(&self, other: &Sandpile) -> Result<Sandpile> {
		self.check_shape(other)?;
		let grid = self
			.grid
			.iter()
			.zip(&other.grid)
			.map(|(a, b)| {
				a.iter()
					.zip(b)
					.map(|(x, y)| x.checked_add(*y).ok_or(Error::CellOverflow))
					.collect::<Result<Vec<_>>>()
			})
			.collect::<Result<Vec<_>>>()?;
		positive_sand(&grid)?;
		Ok(Sandpile::from_grid(grid))
	}
}

/// Sum of the positive cells. No cell can grow past it while toppling, so
/// a grid that passes this check topples without overflow.
fn positive_sand(grid: &[Vec<Cell>]) -> Result<Cell> {
	grid.iter()
		.flatten()
		.filter(|&&v| v > 0)
		.try_fold(0 as Cell, |acc, &v| acc.checked_add(v))
		.ok_or(Error::CellOverflow)
}

impl PartialEq for Sandpile {
	fn eq(&self, other: &Sandpile) -> bool {
		self.grid == other.grid
	}
}

impl Eq for Sandpile {}

impl Hash for Sandpile {
	fn hash<S: Hasher>(&self, state: &mut S) {
		self.grid.hash(state);
	}
}

impl FromStr for Sandpile {
	type Err = Error;

	fn from_str(s: &str) -> Result<Sandpile> {
		Sandpile::from_string(s, Options::default())
	}
}

impl fmt::Display for Sandpile {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let border: String = std::iter::repeat(H).take(2 * self.cols() + 1).collect();
		writeln!(f, "{}{}{}", TL, border, TR)?;
		for row in &self.grid {
			let cols: Vec<String> = row.iter().map(|v| v.to_string()).collect();
			writeln!(f, "{} {} {}", V, cols.join(" "), V)?;
		}
		write!(f, "{}{}{}", BL, border, BR)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn construction_stabilizes_by_default() {
		let a = Sandpile::new(vec![vec![9, 9, 9], vec![9, 9, 9], vec![9, 9, 9]]).unwrap();
		assert_eq!(a.as_rows(), &[vec![1, 3, 1], vec![3, 1, 3], vec![1, 3, 1]]);
		assert!(a.is_stable());
	}

	#[test]
	fn deferred_construction_keeps_values() {
		let a = Sandpile::with_options(vec![vec![9; 3]; 3], Options::deferred()).unwrap();
		assert_eq!(a.as_rows(), &[vec![9; 3], vec![9; 3], vec![9; 3]]);
		assert!(!a.is_stable());
	}

	#[test]
	fn rejects_malformed_grids() {
		assert!(matches!(Sandpile::new(vec![]), Err(Error::EmptyGrid)));
		assert!(matches!(Sandpile::new(vec![vec![]]), Err(Error::EmptyGrid)));
		assert!(matches!(
			Sandpile::new(vec![vec![1, 2], vec![3]]),
			Err(Error::RaggedRows { row: 1, expected: 2, found: 1 })
		));
	}

	#[test]
	fn equality_is_by_value_and_shape() {
		let a = Sandpile::new(vec![vec![1, 2], vec![3, 0]]).unwrap();
		let b = Sandpile::new(vec![vec![1, 2], vec![3, 0]]).unwrap();
		let c = Sandpile::new(vec![vec![1, 2, 3, 0]]).unwrap();
		assert_eq!(a, b);
		assert_ne!(a, c);
		let set: std::collections::HashSet<_> = vec![a.clone(), b, c].into_iter().collect();
		assert_eq!(set.len(), 2);
		assert!(set.contains(&a));
	}

	#[test]
	fn elementwise_add_does_not_topple() {
		let a = Sandpile::new(vec![vec![3, 3], vec![3, 3]]).unwrap();
		let s = a.elementwise_add(&a).unwrap();
		assert_eq!(s.as_rows(), &[vec![6, 6], vec![6, 6]]);
	}

	#[test]
	fn elementwise_add_rejects_other_shapes() {
		let a = Sandpile::zero(2, 2).unwrap();
		let b = Sandpile::zero(2, 3).unwrap();
		assert!(matches!(
			a.elementwise_add(&b),
			Err(Error::ShapeMismatch { left: (2, 2), right: (2, 3) })
		));
	}

	#[test]
	fn elementwise_add_reports_overflow() {
		let a = Sandpile::with_options(vec![vec![Cell::MAX]], Options::deferred()).unwrap();
		let b = Sandpile::with_options(vec![vec![1]], Options::deferred()).unwrap();
		assert!(matches!(a.elementwise_add(&b), Err(Error::CellOverflow)));
	}

	#[test]
	fn rejects_positive_sand_beyond_the_cell_range() {
		let grid = vec![vec![Cell::MAX, Cell::MAX, -Cell::MAX]];
		assert!(matches!(Sandpile::new(grid.clone()), Err(Error::CellOverflow)));
		assert!(matches!(
			Sandpile::with_options(grid, Options::deferred()),
			Err(Error::CellOverflow)
		));
		let half = Sandpile::with_options(vec![vec![Cell::MAX / 2 + 1, 0]], Options::deferred()).unwrap();
		let other = Sandpile::with_options(vec![vec![0, Cell::MAX / 2 + 1]], Options::deferred()).unwrap();
		assert!(matches!(half.elementwise_add(&other), Err(Error::CellOverflow)));
	}

	#[test]
	fn stabilizes_sand_up_to_the_cell_range() {
		let a = Sandpile::new(vec![vec![Cell::MAX, 0, Cell::MIN]]).unwrap();
		assert!(a.is_stable());
		assert!(a.total().unwrap() < 0);
	}

	#[test]
	fn total_is_checked() {
		let a = Sandpile::new(vec![vec![3, -5], vec![1, 0]]).unwrap();
		assert_eq!(a.total().unwrap(), -1);
		let low = Sandpile::new(vec![vec![Cell::MIN, Cell::MIN]]).unwrap();
		assert!(matches!(low.total(), Err(Error::CellOverflow)));
	}

	#[test]
	fn parses_rows() {
		let a: Sandpile = "1 2 3\n2 3 4\n\n4 3 2\n".parse().unwrap();
		assert_eq!(a.as_rows(), &[vec![3, 0, 1], vec![0, 3, 3], vec![2, 2, 0]]);
		let b = Sandpile::from_string("1 x", Options::deferred());
		assert!(matches!(b, Err(Error::Parse { line: 1, .. })));
	}

	#[test]
	fn renders_inside_a_box() {
		let a = Sandpile::new(vec![vec![1, 3, 1], vec![3, 1, 3]]).unwrap();
		assert_eq!(a.to_string(), "┏━━━━━━━┓\n┃ 1 3 1 ┃\n┃ 3 1 3 ┃\n┗━━━━━━━┛");
	}
}
