use std::collections::HashSet;

use crate::{grid::THRESHOLD, Sandpile};

/// How the cells that are over the threshold fire within one
/// [`Sandpile::topple_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOrder {
	/// Row by row, in place: a cell topples once if it is unstable when
	/// visited, including sand it got earlier in the same pass.
	Sweep,
	/// Every cell unstable at the start of the step topples once; sand
	/// received during the step waits for the next one.
	Synchronous,
}

fn neighbours(i: usize, j: usize, rows: usize, cols: usize) -> impl Iterator<Item = (usize, usize)> {
	[
		if i > 0 { Some((i - 1, j)) } else { None },
		if j > 0 { Some((i, j - 1)) } else { None },
		if i + 1 < rows { Some((i + 1, j)) } else { None },
		if j + 1 < cols { Some((i, j + 1)) } else { None },
	]
	.into_iter()
	.flatten()
}

impl Sandpile {
	/// Topples until stable and returns the number of topplings.
	///
	/// Toppling is confluent, so the result does not depend on the order
	/// cells fire in; here every unstable cell fires as often as it can at once.
	pub fn stabilize(&mut self) -> u64 {
		self.avalanche();
		self.last_topple
	}

	/// Stabilizes and returns how many times each cell fired, row-major.
	pub fn stabilize_with_firings(&mut self) -> Vec<u64> {
		self.avalanche()
	}

	fn avalanche(&mut self) -> Vec<u64> {
		let (rows, cols) = self.shape();
		let mut firings = vec![0; rows * cols];
		let mut excessive = HashSet::new();
		let mut ex2;
		for i in 0..rows {
			for j in 0..cols {
				if self.grid[i][j] >= THRESHOLD {
					excessive.insert((i, j));
				}
			}
		}
		let mut count = 0;
		while !excessive.is_empty() {
			ex2 = HashSet::new();
			for (i, j) in excessive.drain() {
				let d = self.grid[i][j] / THRESHOLD;
				if d <= 0 {
					continue;
				}
				self.grid[i][j] %= THRESHOLD;
				firings[i * cols + j] += d as u64;
				count += d as u64;
				// No cell outgrows the positive sand checked at construction.
				for (ni, nj) in neighbours(i, j, rows, cols) {
					self.grid[ni][nj] += d;
					if self.grid[ni][nj] >= THRESHOLD {
						ex2.insert((ni, nj));
					}
				}
			}
			excessive = ex2;
		}
		self.last_topple = count;
		tracing::trace!(rows, cols, topplings = count, "stabilized");
		firings
	}

	/// Fires a single cell once if it is unstable. Returns whether it fired.
	///
	/// Panics if the cell is outside the grid.
	pub fn topple_cell(&mut self, row: usize, col: usize) -> bool {
		if self.grid[row][col] < THRESHOLD {
			return false;
		}
		let (rows, cols) = self.shape();
		self.grid[row][col] -= THRESHOLD;
		for (ni, nj) in neighbours(row, col, rows, cols) {
			self.grid[ni][nj] += 1;
		}
		true
	}

	/// One topple step over the whole grid. Returns the number of cells that
	/// fired, zero once the sandpile is stable.
	pub fn topple_step(&mut self, order: StepOrder) -> u64 {
		let (rows, cols) = self.shape();
		let mut count = 0;
		match order {
			StepOrder::Sweep => {
				for i in 0..rows {
					for j in 0..cols {
						if self.topple_cell(i, j) {
							count += 1;
						}
					}
				}
			}
			StepOrder::Synchronous => {
				let unstable: Vec<_> = (0..rows)
					.flat_map(|i| (0..cols).map(move |j| (i, j)))
					.filter(|&(i, j)| self.grid[i][j] >= THRESHOLD)
					.collect();
				for (i, j) in unstable {
					self.grid[i][j] -= THRESHOLD;
					for (ni, nj) in neighbours(i, j, rows, cols) {
						self.grid[ni][nj] += 1;
					}
					count += 1;
				}
			}
		}
		count
	}

	/// The states a stabilization by [`StepOrder::Sweep`] steps goes through,
	/// from `self` to the first stable one. `self` is left untouched.
	pub fn trace(&self) -> Trace {
		self.trace_with(StepOrder::Sweep)
	}

	pub fn trace_with(&self, order: StepOrder) -> Trace {
		self.clone().into_trace_with(order)
	}

	/// Like [`Sandpile::trace`], but takes the sandpile; its stable form
	/// is the last item.
	pub fn into_trace(self) -> Trace {
		self.into_trace_with(StepOrder::Sweep)
	}

	pub fn into_trace_with(self, order: StepOrder) -> Trace {
		Trace {
			state: Some(self),
			order,
		}
	}
}

/// Iterator returned by [`Sandpile::trace`].
#[derive(Debug, Clone)]
pub struct Trace {
	state: Option<Sandpile>,
	order: StepOrder,
}

impl Iterator for Trace {
	type Item = Sandpile;

	fn next(&mut self) -> Option<Sandpile> {
		let current = self.state.take()?;
		if !current.is_stable() {
			let mut next = current.clone();
			let fired = next.topple_step(self.order);
			next.last_topple = current.last_topple + fired;
			self.state = Some(next);
		}
		Some(current)
	}
}
