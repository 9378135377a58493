//! Single-value mode: one dominant byte value is elided from the payload and
//! reproduced on decode under control-bit guidance.
//!
//! The header byte `0x20` is followed by one control bit per input position
//! (set where the position holds the dominant value), the dominant value
//! itself, and a raw byte for every other position.

use super::{BlockCodingError, EncodeOutcome, SINGLE_VALUE_MODE_HEADER};

pub(super) fn encode(
	input: &[u8],
	output: &mut [u8],
	single_value: u8,
	occurrences: usize
) -> Result<EncodeOutcome, BlockCodingError> {
	let block_len = input.len();
	let control_len = (block_len - 1) / 8 + 1;

	// Header, control bits, the value itself, and one raw byte per
	// non-matching position; anything longer than the block is no encoding
	let encoded_len = 2 + control_len + (block_len - occurrences);
	if encoded_len > block_len {
		return Ok(EncodeOutcome::Incompressible);
	}

	output[0] = SINGLE_VALUE_MODE_HEADER;
	output[control_len + 1] = single_value;

	let mut control = 0u64;
	let mut next_out = control_len + 2;
	for (position, &value) in input.iter().enumerate() {
		if value == single_value {
			control |= 1 << position;
		} else {
			output[next_out] = value;
			next_out += 1;
		}
	}
	output[1..=control_len].copy_from_slice(&control.to_le_bytes()[..control_len]);

	if next_out != encoded_len {
		return Err(BlockCodingError::InvariantViolation);
	}
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

	let single_value = *input
		.get(control_len + 1)
		.ok_or(BlockCodingError::TruncatedBlock)?;
	let mut next_in = control_len + 2;
	for (position, slot) in output[..block_len].iter_mut().enumerate() {
		if control >> position & 1 != 0 {
			*slot = single_value;
		} else {
			*slot = *input.get(next_in).ok_or(BlockCodingError::TruncatedBlock)?;
			next_in += 1;
		}
	}

	Ok(next_in)
}
