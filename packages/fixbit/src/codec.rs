//! The per-block compressor/decompressor pair: statistics scanning, coding mode
//! selection, and the encoders and decoders for every mode.
//!
//! A block is a run of 2 to 64 bytes, compressed independently of every other
//! block. [`encode_block`] inspects the block and either writes a bit-packed
//! encoding to the caller's output buffer or reports that no coding mode pays
//! for this block; [`decode_block`] inverts the encoding given the original
//! block length. Blocks of at most [`SHORT_BLOCK_MAX_LEN`] bytes use hand-tuned
//! layouts with their own entry points, [`encode_short_block`] and
//! [`decode_short_block`], to which the generic operations dispatch.

use thiserror::Error;

use crate::codec::scan::BlockScan;
use crate::codec::tables::UNIQUE_LIMITS_25;

mod fixed_bit;
mod scan;
mod seven_bit;
mod short_block;
mod single_value;
mod tables;
mod text_mode;

#[cfg(test)]
mod test;

pub use short_block::{decode_short_block, encode_short_block};

/// The smallest block length the codec supports.
pub const MIN_BLOCK_LEN: usize = 2;
/// The largest block length the codec supports.
pub const MAX_BLOCK_LEN: usize = 64;
/// The largest block length handled by the short-block layouts.
pub const SHORT_BLOCK_MAX_LEN: usize = 5;

/// The largest distinct-value count the fixed-bit layouts can represent.
const MAX_UNIQUES: usize = 16;

/// Header byte for single-value mode: distinct-value bits zero, bit 5 set.
const SINGLE_VALUE_MODE_HEADER: u8 = 0x20;
/// Header byte for 7-bit mode: distinct-value bits zero, bit 6 set.
const SEVEN_BIT_MODE_HEADER: u8 = 0x40;

/// An error reported by the block codec. Every fatal cause gets its own
/// variant, so callers that care can tell them apart, but treating them all as
/// equivalent failures is also fine: the output buffer holds no usable partial
/// result in any of these cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockCodingError {
	/// The block length lies outside the supported range.
	#[error("block length {0} is outside the supported range of 2 to 64 bytes")]
	UnsupportedBlockLength(usize),
	/// The output buffer cannot hold a block of the requested length.
	#[error("output buffer holds {capacity} bytes, but the block needs {required}")]
	OutputBufferTooSmall {
		/// The length of the output buffer that was passed in.
		capacity: usize,
		/// The block length the buffer must be able to hold.
		required: usize
	},
	/// The encoded input ended before the block was fully decoded.
	#[error("encoded block data ends prematurely")]
	TruncatedBlock,
	/// The header byte signals two coding modes at once.
	#[error("header byte {0:#04x} signals both single-value and 7-bit coding")]
	ContradictoryHeader(u8),
	/// The coder reached a state its mode selection logic should rule out.
	#[error("internal coding invariant violated")]
	InvariantViolation
}

impl From<fixbit_bitpack::NotEnoughSpace> for BlockCodingError {
	fn from(_: fixbit_bitpack::NotEnoughSpace) -> Self {
		// Mode selection sizes every encoding to fit the block, so running out
		// of output space mid-encode means the selector and an encoder disagree
		Self::InvariantViolation
	}
}

impl From<fixbit_bitpack::UnexpectedEndOfInput> for BlockCodingError {
	fn from(_: fixbit_bitpack::UnexpectedEndOfInput) -> Self {
		Self::TruncatedBlock
	}
}

/// The outcome of encoding a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
	/// The block was encoded into the output buffer.
	Compressed {
		/// The exact length of the encoding in bits. The encoding occupies the
		/// first `bit_count.div_ceil(8)` output bytes, which is also how many
		/// bytes the decoder will consume; any filler bits in the final byte
		/// are zero.
		bit_count: usize
	},
	/// No coding mode pays for this block. Nothing was committed to the output
	/// buffer; the caller must keep the original bytes and record that this
	/// block was left uncompressed.
	Incompressible
}

impl EncodeOutcome {
	/// Returns the number of output bytes the encoding occupies, or `None` for
	/// an incompressible block.
	pub fn byte_len(&self) -> Option<usize> {
		match self {
			Self::Compressed { bit_count } => Some(bit_count.div_ceil(8)),
			Self::Incompressible => None
		}
	}
}

/// Compresses one block of `input.len()` bytes into `output`.
///
/// The coding mode is chosen from the block's statistics: a single repeated
/// value, few distinct values, mostly-text content, one dominant value, or
/// ASCII-clean data each have a dedicated layout. The choice is deterministic:
/// it depends only on the block's bytes and length.
///
/// `output` must hold at least `input.len()` bytes; a successful encoding never
/// needs more. On [`EncodeOutcome::Incompressible`] and on errors the contents
/// of `output` are unspecified and must not be stored.
pub fn encode_block(input: &[u8], output: &mut [u8]) -> Result<EncodeOutcome, BlockCodingError> {
	let block_len = input.len();
	if !(MIN_BLOCK_LEN..=MAX_BLOCK_LEN).contains(&block_len) {
		return Err(BlockCodingError::UnsupportedBlockLength(block_len));
	}
	if output.len() < block_len {
		return Err(BlockCodingError::OutputBufferTooSmall {
			capacity: output.len(),
			required: block_len
		});
	}

	if block_len <= SHORT_BLOCK_MAX_LEN {
		encode_short_block(input, output)
	} else {
		encode_long_block(input, output)
	}
}

/// Decompresses one block previously produced by [`encode_block`] with the same
/// `block_len`, writing the original bytes to `output[..block_len]`.
///
/// Returns the number of `input` bytes consumed, so a caller walking a
/// concatenation of encoded blocks can position itself past this one. Only
/// compressed data is accepted: blocks the encoder reported incompressible were
/// never encoded, and the caller must track those itself.
pub fn decode_block(
	input: &[u8],
	output: &mut [u8],
	block_len: usize
) -> Result<usize, BlockCodingError> {
	if !(MIN_BLOCK_LEN..=MAX_BLOCK_LEN).contains(&block_len) {
		return Err(BlockCodingError::UnsupportedBlockLength(block_len));
	}
	if output.len() < block_len {
		return Err(BlockCodingError::OutputBufferTooSmall {
			capacity: output.len(),
			required: block_len
		});
	}

	if block_len <= SHORT_BLOCK_MAX_LEN {
		return decode_short_block(input, output, block_len);
	}

	let first = *input.first().ok_or(BlockCodingError::TruncatedBlock)?;
	if first & 1 != 0 {
		return decode_single_unique(input, output, block_len);
	}

	let unique_count = usize::from((first >> 1) & 0xF) + 1;
	if unique_count > 1 {
		return fixed_bit::decode(input, output, block_len, unique_count);
	}

	// A distinct-value field of zero leaves the mode to bits 5 and 6
	match (
		first & SINGLE_VALUE_MODE_HEADER != 0,
		first & SEVEN_BIT_MODE_HEADER != 0
	) {
		(true, true) => Err(BlockCodingError::ContradictoryHeader(first)),
		(true, false) => single_value::decode(input, output, block_len),
		(false, true) => seven_bit::decode(input, output, block_len),
		(false, false) => text_mode::decode(input, output, block_len)
	}
}

/// Encodes a block of 6 to 64 bytes, scanning it in stages so that most random
/// data is rejected after a fraction of the block.
fn encode_long_block(input: &[u8], output: &mut [u8]) -> Result<EncodeOutcome, BlockCodingError> {
	let block_len = input.len();
	let unique_limit = usize::from(UNIQUE_LIMITS_25[block_len]);
	let head_len = block_len * 5 / 16 + 1;

	// Stage A: scan the head of the block, gathering everything every mode
	// needs (value counts, distinct values, text characters, the OR of all
	// values), so the cheap early exits below can fire before the full scan
	let mut scan = BlockScan::default();
	for &value in &input[..head_len] {
		scan.observe(value);
		scan.count_text_char(value);
	}

	if scan.unique_count > unique_limit {
		// Fixed bit coding has already failed; 7-bit coding is the only mode
		// left that does not need the table, so finish the OR fold and try it
		for &value in &input[head_len..] {
			scan.or_all |= value;
		}
		return if scan.or_all & 0x80 == 0 {
			seven_bit::encode(input, output)
		} else {
			Ok(EncodeOutcome::Incompressible)
		};
	}

	// Text mode is worth attempting only when enough of the head is text and
	// the distinct-value count is already too high for fixed bit coding to
	// beat it; the text encoder itself verifies that it actually shortens the
	// block
	if scan.unique_count > usize::from(UNIQUE_LIMITS_25[head_len]) * 3 / 4 + 1
		&& scan.text_char_count > head_len / 2
	{
		return text_mode::encode(input, output);
	}

	// Stage B: keep scanning until some value repeats often enough to be a
	// single-value mode candidate
	let min_dominant_count = block_len / 4 + 1;
	let mut dominant_value = None;
	let mut position = head_len;
	while position < block_len {
		let value = input[position];
		position += 1;
		if !scan.observe(value) && scan.count_of(value) >= min_dominant_count {
			dominant_value = Some(value);
			break;
		}
	}

	// Stage C: finish the scan, now only tracking counts and distinct values
	for &value in &input[position..] {
		scan.observe(value);
	}

	if scan.unique_count > unique_limit {
		// Too many distinct values for fixed bit coding; fall back through the
		// remaining modes
		if let Some(value) = dominant_value {
			let outcome = single_value::encode(input, output, value, scan.count_of(value))?;
			if let EncodeOutcome::Compressed { .. } = outcome {
				return Ok(outcome);
			}
		}
		return if scan.or_all & 0x80 == 0 {
			seven_bit::encode(input, output)
		} else {
			Ok(EncodeOutcome::Incompressible)
		};
	}

	// A sufficiently dominant value beats the widest (4 bits per position)
	// fixed-bit layout
	if scan.unique_count > 8 {
		let dominant_override_count = head_len * 3 / 2;
		if let Some(value) = dominant_value {
			if scan.count_of(value) >= dominant_override_count {
				return single_value::encode(input, output, value, scan.count_of(value));
			}
		}
	}

	fixed_bit::encode(input, output, &scan)
}

/// Writes the layout for a block whose bytes all hold `value`: one byte when
/// the value fits in 6 bits, two bytes otherwise. Returns the encoding's bit
/// count.
fn write_single_unique(value: u8, output: &mut [u8]) -> usize {
	if value < 64 {
		output[0] = (value << 2) | 3;
		8
	} else {
		output[0] = (value << 2) | 1;
		output[1] = value >> 6;
		10
	}
}

/// Expands a single-unique encoding by filling the whole block with the one
/// value. Returns the number of input bytes consumed (one or two).
fn decode_single_unique(
	input: &[u8],
	output: &mut [u8],
	block_len: usize
) -> Result<usize, BlockCodingError> {
	let first = *input.first().ok_or(BlockCodingError::TruncatedBlock)?;
	let mut value = first >> 2;
	let consumed = if first & 2 != 0 {
		1
	} else {
		value |= *input.get(1).ok_or(BlockCodingError::TruncatedBlock)? << 6;
		2
	};
	output[..block_len].fill(value);
	Ok(consumed)
}
