//! Read-only lookup tables shared by the coding modes. All of them are `const`
//! items, so they are baked into the binary and never initialized at run time.

use super::MAX_BLOCK_LEN;

/// The number of characters in the predefined text set.
pub(super) const PREDEFINED_CHAR_COUNT: usize = 16;

/// For each block length, the largest distinct-value count that still yields at
/// least 25% bit savings with fixed bit coding.
///
/// Equivalently, per distinct-value count, the fewest input values needed:
///
/// ```text
/// uniques  1  2  3  4  5   6   7   8   9   10  11  12  13  14  15  16
/// values   2  4  7  9  15  17  19  23  40  44  48  52  56  60  62  64
/// ```
pub(super) const UNIQUE_LIMITS_25: [u8; MAX_BLOCK_LEN + 1] = [
	//       2     4        7     9                 15    17    19
	0, 0, 1, 1, 2, 2, 2, 3, 3, 4, 4, 4, 4, 4, 4, 5, 5, 6, 6, 7, 7, 7, 7,
	//  23
	8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
	//  40          44              48              52
	9, 9, 9, 9, 10, 10, 10, 10, 11, 11, 11, 11, 12, 12, 12, 12,
	//  56              60      62      64
	13, 13, 13, 13, 14, 14, 15, 15, 16
];

/// The 16 most frequent characters of English text (per the Morse code
/// frequency set, with 'g' in place of 'f'), in index order. Text mode encodes
/// these as 4-bit indices into this table.
pub(super) const PREDEFINED_TEXT_CHARS: [u8; PREDEFINED_CHAR_COUNT] = *b" etainoshrdlucmg";

/// Whether a byte value belongs to [`PREDEFINED_TEXT_CHARS`].
pub(super) const IS_TEXT_CHAR: [bool; 256] = build_is_text_char();

/// The index of a byte value within [`PREDEFINED_TEXT_CHARS`], or 16 for any
/// value outside the set.
pub(super) const TEXT_CHAR_INDEX: [u8; 256] = build_text_char_index();

const fn build_is_text_char() -> [bool; 256] {
	let mut table = [false; 256];
	let mut i = 0;
	while i < PREDEFINED_CHAR_COUNT {
		table[PREDEFINED_TEXT_CHARS[i] as usize] = true;
		i += 1;
	}
	table
}

const fn build_text_char_index() -> [u8; 256] {
	let mut table = [PREDEFINED_CHAR_COUNT as u8; 256];
	let mut i = 0;
	while i < PREDEFINED_CHAR_COUNT {
		table[PREDEFINED_TEXT_CHARS[i] as usize] = i as u8;
		i += 1;
	}
	table
}
