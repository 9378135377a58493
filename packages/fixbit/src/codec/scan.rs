//! Single-pass statistics gathering over a block's bytes.

use tinyvec::ArrayVec;

use super::MAX_UNIQUES;
use super::tables::IS_TEXT_CHAR;

/// The per-block statistics every coding mode draws on. One instance lives on
/// the stack for the duration of a single [`encode_block`](super::encode_block)
/// call.
#[derive(Debug)]
pub(super) struct BlockScan {
	/// How many times each byte value has been observed.
	pub count: [u8; 256],
	/// The ordinal of each byte value's first observation. Only meaningful for
	/// values with a nonzero count.
	pub first_seen: [u8; 256],
	/// The distinct values observed so far, in first-appearance order. Filling
	/// stops at [`MAX_UNIQUES`] entries; `unique_count` keeps going.
	pub uniques: ArrayVec<[u8; MAX_UNIQUES]>,
	/// The number of distinct values observed so far, including any past the
	/// capacity of `uniques`.
	pub unique_count: usize,
	/// The bitwise OR of every observed value. A clear high bit over the whole
	/// block qualifies it for 7-bit coding.
	pub or_all: u8,
	/// How many observed bytes belong to the predefined text character set.
	/// Only accumulated over the head of the block.
	pub text_char_count: usize
}

impl Default for BlockScan {
	fn default() -> Self {
		Self {
			count: [0; 256],
			first_seen: [0; 256],
			uniques: ArrayVec::default(),
			unique_count: 0,
			or_all: 0,
			text_char_count: 0
		}
	}
}

impl BlockScan {
	/// Folds one byte into the statistics. Returns `true` when this is the
	/// value's first occurrence in the block.
	pub fn observe(&mut self, value: u8) -> bool {
		self.or_all |= value;
		let slot = &mut self.count[usize::from(value)];
		*slot += 1;
		if *slot == 1 {
			self.first_seen[usize::from(value)] = self.unique_count as u8;
			if self.unique_count < MAX_UNIQUES {
				self.uniques.push(value);
			}
			self.unique_count += 1;
			true
		} else {
			false
		}
	}

	/// Accumulates the predefined-text-character tally for one byte.
	pub fn count_text_char(&mut self, value: u8) {
		self.text_char_count += usize::from(IS_TEXT_CHAR[usize::from(value)]);
	}

	/// The number of times `value` has been observed so far.
	pub fn count_of(&self, value: u8) -> usize {
		usize::from(self.count[usize::from(value)])
	}
}
