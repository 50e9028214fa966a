//! PNG export of stable sandpiles, one pixel per cell.

use std::{fs::File, io::Write, path::Path};

use crate::{Error, Result, Sandpile};

const COLORS: [[u8; 4]; 4] = [
	[0, 0, 0, 255],
	[64, 128, 0, 255],
	[118, 8, 170, 255],
	[255, 214, 0, 255],
];

/// RGBA pixels, row-major.
pub fn pixels(pile: &Sandpile) -> Result<Vec<u8>> {
	let mut pixels = Vec::with_capacity(pile.rows() * pile.cols() * 4);
	for row in pile.as_rows() {
		for &el in row {
			let color = usize::try_from(el)
				.ok()
				.and_then(|i| COLORS.get(i))
				.ok_or(Error::Unrenderable { value: el })?;
			pixels.extend_from_slice(color);
		}
	}
	Ok(pixels)
}

pub fn encode<W: Write>(pile: &Sandpile, sink: W) -> Result<()> {
	let pixels = pixels(pile)?;
	repng::encode(sink, pile.cols() as u32, pile.rows() as u32, &pixels)?;
	Ok(())
}

pub fn write_png<P: AsRef<Path>>(pile: &Sandpile, path: P) -> Result<()> {
	encode(pile, File::create(path)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Options;

	#[test]
	fn one_pixel_per_cell() {
		let pile = Sandpile::new(vec![vec![0, 1, 2], vec![3, 2, 1]]).unwrap();
		let p = pixels(&pile).unwrap();
		assert_eq!(p.len(), 6 * 4);
		assert_eq!(&p[12..16], &COLORS[3]);
	}

	#[test]
	fn unstable_cells_have_no_colour() {
		let pile = Sandpile::with_options(vec![vec![5]], Options::deferred()).unwrap();
		assert!(matches!(pixels(&pile), Err(Error::Unrenderable { value: 5 })));
		let neg = Sandpile::new(vec![vec![-1]]).unwrap();
		assert!(matches!(pixels(&neg), Err(Error::Unrenderable { value: -1 })));
	}

	#[test]
	fn encodes_a_png_signature() {
		let pile = Sandpile::max_stable(2, 2).unwrap();
		let mut out = Vec::new();
		encode(&pile, &mut out).unwrap();
		assert_eq!(&out[..8], b"\x89PNG\r\n\x1a\n");
	}
}
