//! Text mode: predefined-character coding for mostly-English blocks.
//!
//! The header byte `0x00` is followed by one control bit per input position,
//! packed into `(N-1)/8 + 1` bytes, then the payload. A clear control bit means
//! the position holds one of the 16 predefined text characters, stored as a
//! 4-bit table index; a set bit means the position's byte is stored raw. Index
//! pairs share a byte, low nibble first, and that byte sits in the payload
//! where the pair's first character occurred, so indices and raw bytes
//! interleave in input order.

use super::tables::{PREDEFINED_CHAR_COUNT, PREDEFINED_TEXT_CHARS, TEXT_CHAR_INDEX};
use super::{BlockCodingError, EncodeOutcome};

pub(super) fn encode(input: &[u8], output: &mut [u8]) -> Result<EncodeOutcome, BlockCodingError> {
	let block_len = input.len();
	let control_len = (block_len - 1) / 8 + 1;

	let mut control = 0u64;
	let mut next_out = control_len + 1;
	// The pending index pair and the payload slot reserved for it. Slot 0 is
	// the header byte: flushing the (empty) pair there for the first text
	// character is what writes the mode header
	let mut pair = 0u8;
	let mut pair_slot = 0;
	let mut pair_pending = false;

	for (position, &value) in input.iter().enumerate() {
		let index = TEXT_CHAR_INDEX[usize::from(value)];
		if usize::from(index) < PREDEFINED_CHAR_COUNT {
			if pair_pending {
				pair |= index << 4;
				pair_pending = false;
			} else {
				output[pair_slot] = pair;
				if next_out >= block_len {
					return Ok(EncodeOutcome::Incompressible);
				}
				pair_slot = next_out;
				next_out += 1;
				pair = index;
				pair_pending = true;
			}
		} else {
			control |= 1 << position;
			if next_out >= block_len {
				return Ok(EncodeOutcome::Incompressible);
			}
			output[next_out] = value;
			next_out += 1;
		}
	}

	if next_out >= block_len {
		// The head scan only guarantees text characters over a fraction of the
		// block; the full pass is what proves the mode pays
		return Ok(EncodeOutcome::Incompressible);
	}

	output[1..=control_len].copy_from_slice(&control.to_le_bytes()[..control_len]);
	output[pair_slot] = pair;

	Ok(EncodeOutcome::Compressed {
		bit_count: next_out * 8
	})
}

pub(super) fn decode(
	input: &[u8],
	output: &mut [u8],
	block_len: usize
) -> Result<usize, BlockCodingError> {
	let control_len = (block_len - 1) / 8 + 1;
	let control_bytes = input
		.get(1..=control_len)
		.ok_or(BlockCodingError::TruncatedBlock)?;
	let mut control = [0u8; 8];
	control[..control_len].copy_from_slice(control_bytes);
	let control = u64::from_le_bytes(control);

	let mut next_in = control_len + 1;
	let mut pending_index = None;
	for (position, slot) in output[..block_len].iter_mut().enumerate() {
		if control >> position & 1 != 0 {
			*slot = *input.get(next_in).ok_or(BlockCodingError::TruncatedBlock)?;
			next_in += 1;
		} else {
			let index = match pending_index.take() {
				Some(high) => high,
				None => {
					let pair = *input.get(next_in).ok_or(BlockCodingError::TruncatedBlock)?;
					next_in += 1;
					pending_index = Some(pair >> 4);
					pair & 0xF
				}
			};
			*slot = PREDEFINED_TEXT_CHARS[usize::from(index)];
		}
	}

	Ok(next_in)
}
