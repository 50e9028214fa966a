//! Group arithmetic on recurrent sandpiles.
//!
//! [`order`] and [`inverse`] take the identity of the grid's shape as an
//! argument; [`identity`] computes it, and [`crate::Registry`] caches it.

use crate::{Error, Options, Result, Sandpile};

/// How many additions [`order`] and [`inverse`] try before giving up.
pub const DEFAULT_ORDER_LIMIT: u64 = 1 << 20;

impl Sandpile {
	/// Adds `other` cell by cell and stabilizes in place.
	pub fn add_assign(&mut self, other: &Sandpile) -> Result<()> {
		let sum = self.elementwise_add(other)?;
		self.grid = sum.grid;
		self.stabilize();
		Ok(())
	}

	/// The group sum: cellwise sum, stabilized.
	pub fn add(&self, other: &Sandpile) -> Result<Sandpile> {
		let mut sum = self.elementwise_add(other)?;
		sum.stabilize();
		Ok(sum)
	}
}

/// The identity of the sandpile group on a `rows`×`cols` grid.
pub fn identity(rows: usize, cols: usize) -> Result<Sandpile> {
	// Proposition 6.36 of http://people.reed.edu/~davidp/divisors_and_sandpiles/
	let t = 2 * (crate::THRESHOLD - 1);
	let mut grid = Sandpile::with_options(vec![vec![t; cols]; rows], Options::deferred())?;
	grid.stabilize();
	for row in grid.grid.iter_mut() {
		for el in row.iter_mut() {
			*el = t - *el;
		}
	}
	grid.stabilize();
	tracing::debug!(rows, cols, "computed identity");
	Ok(grid)
}

/// Smallest `k >= 1` such that `x` added to itself `k` times is `identity`.
pub fn order(x: &Sandpile, identity: &Sandpile) -> Result<u64> {
	order_bounded(x, identity, DEFAULT_ORDER_LIMIT)
}

pub fn order_bounded(x: &Sandpile, identity: &Sandpile, limit: u64) -> Result<u64> {
	x.check_shape(identity)?;
	let mut a = x.clone();
	let mut count = 1;
	while a != *identity {
		if count >= limit {
			return Err(Error::NonTerminating { limit });
		}
		a.add_assign(x)?;
		count += 1;
	}
	tracing::debug!(order = count, "order found");
	Ok(count)
}

/// The `y` with `x + y == identity`, found as `x` to the power `order(x) - 1`.
///
/// Only meaningful for recurrent `x`. Otherwise the result is unspecified,
/// though in practice the search runs into [`Error::NonTerminating`].
pub fn inverse(x: &Sandpile, identity: &Sandpile) -> Result<Sandpile> {
	inverse_bounded(x, identity, DEFAULT_ORDER_LIMIT)
}

pub fn inverse_bounded(x: &Sandpile, identity: &Sandpile, limit: u64) -> Result<Sandpile> {
	x.check_shape(identity)?;
	let mut a = x.clone();
	let mut count = 1;
	loop {
		let b = a.add(x)?;
		if b == *identity {
			tracing::debug!(power = count, "inverse found");
			return Ok(a);
		}
		if count >= limit {
			return Err(Error::NonTerminating { limit });
		}
		a = b;
		count += 1;
	}
}
