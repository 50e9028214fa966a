//! The abelian sandpile group on rectangular grids.
//!
//! A [`Sandpile`] is a grid of sand counts. A cell holding 4 or more grains
//! topples: it loses 4 and each neighbour gains 1, grains falling off the edge
//! are lost to the sink. Stable sandpiles that are reached again after the
//! sink fires once (the recurrent ones) form a finite abelian group under
//! "add cellwise, then stabilize".
//!
//! ```
//! use sandpile_group::{group, Sandpile};
//!
//! let x = Sandpile::new(vec![vec![9; 3]; 3]).unwrap();
//! assert_eq!(x.as_rows(), &[vec![1, 3, 1], vec![3, 1, 3], vec![1, 3, 1]]);
//!
//! let e = group::identity(3, 3).unwrap();
//! assert_eq!(group::order(&x, &e).unwrap(), 16);
//! ```

mod error;
mod grid;
mod topple;

pub mod enumerate;
pub mod group;
pub mod png;
pub mod recurrence;
pub mod registry;

pub use error::{Error, Result};
pub use grid::{Options, Sandpile, THRESHOLD};
pub use registry::Registry;
pub use topple::{StepOrder, Trace};

pub type Cell = i64;
