//! Deciding which stable sandpiles belong to the group.

use std::collections::HashSet;

use crate::{Cell, Error, Options, Result, Sandpile};

/// The sand every cell gets when each sink edge fires once: the number of
/// its sides that face the border.
pub fn burning_configuration(rows: usize, cols: usize) -> Result<Sandpile> {
	if rows == 0 || cols == 0 {
		return Err(Error::EmptyGrid);
	}
	let grid = (0..rows)
		.map(|i| {
			(0..cols)
				.map(|j| {
					[i == 0, i + 1 == rows, j == 0, j + 1 == cols]
						.iter()
						.filter(|&&b| b)
						.count() as Cell
				})
				.collect()
		})
		.collect();
	Sandpile::with_options(grid, Options::deferred())
}

/// Burning test: `c` is recurrent iff adding the burning configuration makes
/// every cell topple and the sandpile settles back on `c`.
///
/// Unstable sandpiles are never recurrent.
pub fn is_recurrent(c: &Sandpile) -> bool {
	if !c.is_stable() {
		return false;
	}
	let (rows, cols) = c.shape();
	// A stable `c` has at most 3 grains a cell and a sandpile always has a
	// cell, so neither step can fail.
	let mut burnt = match burning_configuration(rows, cols).and_then(|b| c.elementwise_add(&b)) {
		Ok(b) => b,
		Err(_) => return false,
	};
	let firings = burnt.stabilize_with_firings();
	firings.iter().all(|&f| f > 0) && burnt == *c
}

/// `c` is recurrent iff adding the identity leaves it unchanged.
pub fn is_recurrent_with_identity(c: &Sandpile, identity: &Sandpile) -> Result<bool> {
	Ok(c.add(identity)? == *c)
}

/// Membership in a precomputed set of recurrent sandpiles.
pub fn is_member(c: &Sandpile, set: &HashSet<Sandpile>) -> bool {
	set.contains(c)
}
