//! 7-bit mode: a raw seven-bits-per-byte layout for ASCII-clean blocks that no
//! other mode can touch.
//!
//! The header byte `0x40` is followed by the block's bytes with their (clear,
//! as the selector verified) high bits dropped: each full group of eight input
//! bytes packs LSB-first into seven output bytes. A trailing group of fewer
//! than eight bytes saves nothing, so its bytes are stored whole, one output
//! byte per input byte, with no bit packing across the group boundary.

use fixbit_bitpack::{BitpackReader, BitpackWriter};

use super::{BlockCodingError, EncodeOutcome, SEVEN_BIT_MODE_HEADER};

/// The input bytes per packed group.
const GROUP_LEN: usize = 8;

pub(super) fn encode(input: &[u8], output: &mut [u8]) -> Result<EncodeOutcome, BlockCodingError> {
	let block_len = input.len();
	if block_len < GROUP_LEN {
		// Without a complete group the mode only adds its header byte
		return Ok(EncodeOutcome::Incompressible);
	}

	let (packed, stored) = input.split_at(block_len - block_len % GROUP_LEN);
	let mut writer = BitpackWriter::new(&mut output[..block_len]);
	writer.write_byte(SEVEN_BIT_MODE_HEADER)?;
	for &value in packed {
		writer.write_bits(value.into(), 7)?;
	}
	for &value in stored {
		writer.write_byte(value)?;
	}

	Ok(EncodeOutcome::Compressed {
		bit_count: writer.bit_position()
	})
}

pub(super) fn decode(
	input: &[u8],
	output: &mut [u8],
	block_len: usize
) -> Result<usize, BlockCodingError> {
	let packed_len = block_len - block_len % GROUP_LEN;
	let mut reader = BitpackReader::new(input);
	reader.read_byte()?; // header
	for slot in output[..packed_len].iter_mut() {
		*slot = reader.read_bits(7)? as u8;
	}
	for slot in output[packed_len..block_len].iter_mut() {
		*slot = reader.read_byte()?;
	}

	Ok(reader.byte_position())
}
