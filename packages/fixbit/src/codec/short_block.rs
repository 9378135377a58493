//! Hand-tuned layouts for blocks of 2 to 5 bytes, where the general scheme's
//! fixed overhead (header plus unique table) would eat the savings.
//!
//! The first encoded byte is self-describing. Its low bit distinguishes a
//! single-unique block (1) from a two-unique layout (0):
//!
//! - A single unique value is stored as `(value << 2) | 3` when it fits in six
//!   bits, or as `(value << 2) | 1` followed by `value >> 6` otherwise.
//! - Blocks of 2 or 3 bytes whose nibbles take exactly two distinct values
//!   store the first nibble, a control mask over the remaining nibble
//!   positions, and the other nibble value (12 and 14 bits respectively).
//! - Blocks of 4 or 5 bytes with exactly two distinct byte values store a
//!   control mask over positions 1.. and both values (20 and 21 bits).
//!
//! Anything else is reported incompressible.

use super::{
	BlockCodingError, EncodeOutcome, MIN_BLOCK_LEN, SHORT_BLOCK_MAX_LEN, decode_single_unique,
	write_single_unique
};

/// Compresses one block of 2 to 5 bytes into `output`. The contract matches
/// [`encode_block`](super::encode_block), which dispatches here for these
/// lengths; callers working exclusively with short blocks may call this
/// directly.
pub fn encode_short_block(
	input: &[u8],
	output: &mut [u8]
) -> Result<EncodeOutcome, BlockCodingError> {
	let block_len = input.len();
	if !(MIN_BLOCK_LEN..=SHORT_BLOCK_MAX_LEN).contains(&block_len) {
		return Err(BlockCodingError::UnsupportedBlockLength(block_len));
	}
	if output.len() < block_len {
		return Err(BlockCodingError::OutputBufferTooSmall {
			capacity: output.len(),
			required: block_len
		});
	}

	if input[1..].iter().all(|&value| value == input[0]) {
		return Ok(EncodeOutcome::Compressed {
			bit_count: write_single_unique(input[0], output)
		});
	}

	match block_len {
		2 | 3 => encode_two_nibbles(input, output),
		_ => encode_two_values(input, output)
	}
}

/// Decompresses a block encoded by [`encode_short_block`], given the original
/// block length. Returns the number of input bytes consumed.
pub fn decode_short_block(
	input: &[u8],
	output: &mut [u8],
	block_len: usize
) -> Result<usize, BlockCodingError> {
	if !(MIN_BLOCK_LEN..=SHORT_BLOCK_MAX_LEN).contains(&block_len) {
		return Err(BlockCodingError::UnsupportedBlockLength(block_len));
	}
	if output.len() < block_len {
		return Err(BlockCodingError::OutputBufferTooSmall {
			capacity: output.len(),
			required: block_len
		});
	}

	let first = *input.first().ok_or(BlockCodingError::TruncatedBlock)?;
	if first & 1 != 0 {
		return decode_single_unique(input, output, block_len);
	}

	let second = *input.get(1).ok_or(BlockCodingError::TruncatedBlock)?;
	match block_len {
		2 => {
			// Control bits for nibble positions 1..4 sit in bits 1..3; the
			// first nibble rides in the high nibble of the first byte
			let control = (first >> 1) & 0x7;
			let nibble = first >> 4;
			let other = second & 0xF;
			let pick = |bit: u8| if control & bit != 0 { other } else { nibble };
			output[0] = (nibble << 4) | pick(1);
			output[1] = (pick(2) << 4) | pick(4);
			Ok(2)
		}
		3 => {
			// Five control bits for nibble positions 1..6; the first nibble
			// straddles the byte boundary
			let control = (first >> 1) & 0x1F;
			let nibble = (first >> 6 | second << 2) & 0xF;
			let other = (second >> 2) & 0xF;
			let pick = |bit: u8| if control & bit != 0 { other } else { nibble };
			output[0] = (nibble << 4) | pick(1);
			output[1] = (pick(2) << 4) | pick(4);
			output[2] = (pick(8) << 4) | pick(16);
			Ok(2)
		}
		_ => {
			let third = *input.get(2).ok_or(BlockCodingError::TruncatedBlock)?;
			// Two full byte values packed behind the control mask; the shift
			// differs because five positions need one more control bit
			let (first_value, other_value) = if block_len == 4 {
				(first >> 4 | second << 4, second >> 4 | third << 4)
			} else {
				(first >> 5 | second << 3, second >> 5 | third << 3)
			};
			output[0] = first_value;
			for (position, slot) in output[1..block_len].iter_mut().enumerate() {
				*slot = if first & (2 << position) != 0 {
					other_value
				} else {
					first_value
				};
			}
			Ok(3)
		}
	}
}

/// Encodes a 2- or 3-byte block whose four or six nibbles hold exactly two
/// distinct values.
fn encode_two_nibbles(input: &[u8], output: &mut [u8]) -> Result<EncodeOutcome, BlockCodingError> {
	let mut nibbles = [0u8; 6];
	for (pair, byte) in nibbles.chunks_exact_mut(2).zip(input) {
		pair[0] = byte >> 4;
		pair[1] = byte & 0xF;
	}
	let nibble_count = input.len() * 2;

	let mut control = 0u8;
	let mut other = None;
	for (position, &nibble) in nibbles[..nibble_count].iter().enumerate().skip(1) {
		if nibble != nibbles[0] {
			match other {
				None => other = Some(nibble),
				Some(value) if value == nibble => {}
				Some(_) => return Ok(EncodeOutcome::Incompressible)
			}
			control |= 1 << position;
		}
	}
	let Some(other) = other else {
		// All nibbles equal would mean all bytes equal, which the single-unique
		// path already claimed
		return Err(BlockCodingError::InvariantViolation);
	};

	if input.len() == 2 {
		output[0] = (nibbles[0] << 4) | control;
		output[1] = other;
		Ok(EncodeOutcome::Compressed { bit_count: 12 })
	} else {
		output[0] = (nibbles[0] << 6) | control;
		output[1] = (other << 2) | (nibbles[0] >> 2);
		Ok(EncodeOutcome::Compressed { bit_count: 14 })
	}
}

/// Encodes a 4- or 5-byte block holding exactly two distinct byte values.
fn encode_two_values(input: &[u8], output: &mut [u8]) -> Result<EncodeOutcome, BlockCodingError> {
	let first = input[0];
	let mut control = 0u8;
	let mut other = None;
	for (position, &value) in input.iter().enumerate().skip(1) {
		if value != first {
			match other {
				None => other = Some(value),
				Some(seen) if seen == value => {}
				Some(_) => return Ok(EncodeOutcome::Incompressible)
			}
			control |= 1 << position;
		}
	}
	let Some(other) = other else {
		return Err(BlockCodingError::InvariantViolation);
	};

	if input.len() == 4 {
		output[0] = control | (first << 4);
		output[1] = (first >> 4) | (other << 4);
		output[2] = other >> 4;
		Ok(EncodeOutcome::Compressed { bit_count: 20 })
	} else {
		output[0] = control | (first << 5);
		output[1] = (first >> 3) | (other << 5);
		output[2] = other >> 3;
		Ok(EncodeOutcome::Compressed { bit_count: 21 })
	}
}
