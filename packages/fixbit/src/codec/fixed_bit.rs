//! The general fixed bit coding layout for blocks of 6 to 64 bytes with 1 to 16
//! distinct values.
//!
//! The header byte carries the single-unique flag in bit 0 and the
//! distinct-value count minus one in bits 1..4. Position 0 of the block is
//! implied by the first unique table entry and is never indexed; as many whole
//! indices for positions 1.. as fit are packed into the header byte's remaining
//! bits, any bits left over are discarded to reach a byte boundary, the unique
//! table follows in first-appearance order, and the rest of the positions pack
//! LSB-first at the chosen index width.

use fixbit_bitpack::{BitpackReader, BitpackWriter};

use super::scan::BlockScan;
use super::{BlockCodingError, EncodeOutcome, MAX_UNIQUES, write_single_unique};

/// The index width in bits for a block with `unique_count` distinct values.
/// Blocks with one distinct value use the dedicated single-unique layout and
/// never pack indices.
const fn index_width(unique_count: usize) -> u32 {
	match unique_count {
		2 => 1,
		3..=4 => 2,
		5..=8 => 3,
		_ => 4
	}
}

pub(super) fn encode(
	input: &[u8],
	output: &mut [u8],
	scan: &BlockScan
) -> Result<EncodeOutcome, BlockCodingError> {
	let unique_count = scan.uniques.len();
	if unique_count == 0 || scan.unique_count != unique_count {
		return Err(BlockCodingError::InvariantViolation);
	}

	if unique_count == 1 {
		return Ok(EncodeOutcome::Compressed {
			bit_count: write_single_unique(scan.uniques[0], output)
		});
	}

	let width = index_width(unique_count);
	let mut writer = BitpackWriter::new(&mut output[..input.len()]);
	writer.write_bits(((unique_count - 1) << 1) as u32, 5)?;

	// Indices for the earliest positions ride in the header byte's free bits
	let mut position = 1;
	while writer.bit_position() + width as usize <= 8 {
		writer.write_bits(scan.first_seen[usize::from(input[position])].into(), width)?;
		position += 1;
	}
	writer.align_to_byte();

	for &unique in scan.uniques.iter() {
		writer.write_byte(unique)?;
	}
	for &value in &input[position..] {
		writer.write_bits(scan.first_seen[usize::from(value)].into(), width)?;
	}

	Ok(EncodeOutcome::Compressed {
		bit_count: writer.bit_position()
	})
}

pub(super) fn decode(
	input: &[u8],
	output: &mut [u8],
	block_len: usize,
	unique_count: usize
) -> Result<usize, BlockCodingError> {
	let width = index_width(unique_count);
	let mut reader = BitpackReader::new(input);
	reader.read_bits(5)?; // mode flag and distinct-value count, already decoded

	let mut header_indices = [0u8; 3];
	let mut header_index_count = 0;
	while reader.bit_position() + width as usize <= 8 {
		header_indices[header_index_count] = reader.read_bits(width)? as u8;
		header_index_count += 1;
	}
	reader.align_to_byte();

	// The unique table is sized for the widest index, so indices read from
	// corrupt data stay in bounds
	let mut uniques = [0u8; MAX_UNIQUES];
	for slot in uniques[..unique_count].iter_mut() {
		*slot = reader.read_byte()?;
	}

	output[0] = uniques[0];
	for (slot, &index) in output[1..=header_index_count]
		.iter_mut()
		.zip(&header_indices)
	{
		*slot = uniques[usize::from(index)];
	}
	for slot in output[1 + header_index_count..block_len].iter_mut() {
		*slot = uniques[reader.read_bits(width)? as usize];
	}

	Ok(reader.byte_position())
}
