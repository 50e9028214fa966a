//! Identities and recurrent sets keyed by grid shape.

use std::collections::{HashMap, HashSet};

use crate::{enumerate, group, recurrence, Cell, Error, Result, Sandpile};

/// Shapes with more cells than this are not enumerated by
/// [`Registry::recurrent_set`].
pub const MAX_ENUMERATED_CELLS: usize = 12;

fn fixed_tables() -> Vec<Sandpile> {
	let tables: [&[&[Cell]]; 3] = [
		&[&[2, 2], &[2, 2]],
		&[&[2, 1, 2], &[1, 0, 1], &[2, 1, 2]],
		&[&[2, 1, 1, 2], &[1, 0, 0, 1], &[1, 0, 0, 1], &[2, 1, 1, 2]],
	];
	tables
		.iter()
		.map(|rows| Sandpile::from_grid(rows.iter().map(|row| row.to_vec()).collect()))
		.collect()
}

/// Per-shape group data, filled in on demand.
///
/// A registry made with [`Registry::new`] computes the identity of any shape
/// it is asked about; [`Registry::fixed`] only knows the 2×2, 3×3 and 4×4
/// identities and whatever is added with [`Registry::insert_identity`].
#[derive(Debug, Clone)]
pub struct Registry {
	identities: HashMap<(usize, usize), Sandpile>,
	recurrent: HashMap<(usize, usize), HashSet<Sandpile>>,
	compute: bool,
}

impl Default for Registry {
	fn default() -> Registry {
		Registry::new()
	}
}

impl Registry {
	pub fn new() -> Registry {
		Registry::with_tables(true)
	}

	pub fn fixed() -> Registry {
		Registry::with_tables(false)
	}

	fn with_tables(compute: bool) -> Registry {
		let identities = fixed_tables().into_iter().map(|e| (e.shape(), e)).collect();
		Registry {
			identities,
			recurrent: HashMap::new(),
			compute,
		}
	}

	/// Supplies the identity for its shape, replacing any known one.
	pub fn insert_identity(&mut self, identity: Sandpile) {
		self.identities.insert(identity.shape(), identity);
	}

	pub fn identity(&mut self, rows: usize, cols: usize) -> Result<&Sandpile> {
		if !self.identities.contains_key(&(rows, cols)) {
			if !self.compute {
				return Err(Error::NoIdentity { rows, cols });
			}
			let e = group::identity(rows, cols)?;
			self.identities.insert((rows, cols), e);
		}
		Ok(&self.identities[&(rows, cols)])
	}

	/// The whole recurrent set of a shape, enumerated on first use.
	pub fn recurrent_set(&mut self, rows: usize, cols: usize) -> Result<&HashSet<Sandpile>> {
		if !self.recurrent.contains_key(&(rows, cols)) {
			if rows.saturating_mul(cols) > MAX_ENUMERATED_CELLS {
				return Err(Error::TooLarge {
					rows,
					cols,
					max_cells: MAX_ENUMERATED_CELLS,
				});
			}
			let set: HashSet<_> = enumerate::recurrent_configurations(rows, cols)?.collect();
			tracing::debug!(rows, cols, size = set.len(), "enumerated recurrent set");
			self.recurrent.insert((rows, cols), set);
		}
		Ok(&self.recurrent[&(rows, cols)])
	}

	/// Whether `x` is recurrent, using the cached set when there is one.
	pub fn contains(&self, x: &Sandpile) -> bool {
		match self.recurrent.get(&x.shape()) {
			Some(set) => recurrence::is_member(x, set),
			None => recurrence::is_recurrent(x),
		}
	}

	pub fn order(&mut self, x: &Sandpile) -> Result<u64> {
		let (rows, cols) = x.shape();
		group::order(x, self.identity(rows, cols)?)
	}

	pub fn inverse(&mut self, x: &Sandpile) -> Result<Sandpile> {
		let (rows, cols) = x.shape();
		group::inverse(x, self.identity(rows, cols)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fixed_tables_are_identities() {
		for e in fixed_tables() {
			let (rows, cols) = e.shape();
			assert_eq!(e, group::identity(rows, cols).unwrap());
		}
	}

	#[test]
	fn fixed_registry_has_no_other_identities() {
		let mut r = Registry::fixed();
		assert!(r.identity(3, 3).is_ok());
		assert!(matches!(r.identity(2, 3), Err(Error::NoIdentity { rows: 2, cols: 3 })));
		let x = Sandpile::max_stable(2, 3).unwrap();
		assert!(matches!(r.order(&x), Err(Error::NoIdentity { .. })));
		assert!(matches!(r.inverse(&x), Err(Error::NoIdentity { .. })));

		r.insert_identity(group::identity(2, 3).unwrap());
		assert!(r.order(&x).is_ok());
	}

	#[test]
	fn computing_registry_covers_any_shape() {
		let mut r = Registry::new();
		let x = Sandpile::max_stable(2, 3).unwrap();
		let y = r.inverse(&x).unwrap();
		let e = r.identity(2, 3).unwrap().clone();
		assert_eq!(x.add(&y).unwrap(), e);
	}

	#[test]
	fn recurrent_set_is_cached() {
		let mut r = Registry::new();
		assert_eq!(r.recurrent_set(2, 2).unwrap().len(), 192);
		let x = Sandpile::new(vec![vec![2, 2], vec![2, 2]]).unwrap();
		assert!(r.contains(&x));
		assert!(!r.contains(&Sandpile::zero(2, 2).unwrap()));
		assert!(matches!(r.recurrent_set(4, 4), Err(Error::TooLarge { .. })));
	}
}
