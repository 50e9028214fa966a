//! Walking through every sandpile of a shape.

use crate::{grid::THRESHOLD, recurrence, Cell, Error, Result, Sandpile};

/// Every `rows`×`cols` grid with cells in `0..=max`, row-major odometer
/// order starting at all zeros. The grids are not stabilized.
#[derive(Debug, Clone)]
pub struct Configurations {
	cols: usize,
	max: Cell,
	digits: Option<Vec<Cell>>,
}

impl Configurations {
	pub fn new(rows: usize, cols: usize, max: Cell) -> Result<Configurations> {
		if rows == 0 || cols == 0 {
			return Err(Error::EmptyGrid);
		}
		Ok(Configurations {
			cols,
			max,
			digits: if max >= 0 { Some(vec![0; rows * cols]) } else { None },
		})
	}
}

impl Iterator for Configurations {
	type Item = Sandpile;

	fn next(&mut self) -> Option<Sandpile> {
		let digits = self.digits.as_mut()?;
		let grid = digits.chunks(self.cols).map(|row| row.to_vec()).collect();
		let mut exhausted = true;
		for d in digits.iter_mut().rev() {
			if *d < self.max {
				*d += 1;
				exhausted = false;
				break;
			}
			*d = 0;
		}
		if exhausted {
			self.digits = None;
		}
		Some(Sandpile::from_grid(grid))
	}
}

/// All stable sandpiles of a shape, `4^(rows*cols)` of them.
pub fn stable_configurations(rows: usize, cols: usize) -> Result<Configurations> {
	Configurations::new(rows, cols, THRESHOLD - 1)
}

/// The recurrent sandpiles of a shape, found by burning every stable one.
pub fn recurrent_configurations(rows: usize, cols: usize) -> Result<impl Iterator<Item = Sandpile>> {
	Ok(stable_configurations(rows, cols)?.filter(recurrence::is_recurrent))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_every_grid_once() {
		let all: Vec<_> = Configurations::new(1, 2, 2).unwrap().collect();
		assert_eq!(all.len(), 9);
		assert_eq!(all[0].as_rows(), &[vec![0, 0]]);
		assert_eq!(all[1].as_rows(), &[vec![0, 1]]);
		assert_eq!(all[8].as_rows(), &[vec![2, 2]]);
		let unique: std::collections::HashSet<_> = all.into_iter().collect();
		assert_eq!(unique.len(), 9);
	}

	#[test]
	fn stable_configurations_are_stable() {
		let mut n = 0;
		for c in stable_configurations(2, 2).unwrap() {
			assert!(c.is_stable());
			n += 1;
		}
		assert_eq!(n, 256);
	}

	#[test]
	fn recurrent_set_sizes() {
		// Number of spanning trees of the grid graph with the border wired to the sink.
		assert_eq!(recurrent_configurations(1, 1).unwrap().count(), 4);
		assert_eq!(recurrent_configurations(1, 2).unwrap().count(), 15);
		assert_eq!(recurrent_configurations(2, 2).unwrap().count(), 192);
	}

	#[test]
	fn rejects_empty_shapes() {
		assert!(matches!(Configurations::new(0, 3, 3), Err(Error::EmptyGrid)));
		assert_eq!(Configurations::new(1, 1, -1).unwrap().count(), 0);
	}
}
