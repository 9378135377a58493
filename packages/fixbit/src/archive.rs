//! The file-level block driver: splits a byte stream into fixed-size blocks,
//! runs each through the block codec, and keeps a sidecar flag map recording
//! which blocks actually compressed.
//!
//! The driver produces two artifacts from one input: the payload (conventionally
//! a `.fbc` file), which concatenates each block's encoding or, for blocks the
//! codec rejected, the original bytes; and the sidecar (a `.cq` file), a
//! [`BlockFlagMap`] with one compressed-or-not bit per block. Decompression
//! consumes both together, since the payload alone does not say where stored
//! blocks begin and end.

use log::{debug, trace};
use thiserror::Error;

use crate::codec::{
	BlockCodingError, EncodeOutcome, MAX_BLOCK_LEN, MIN_BLOCK_LEN, decode_block, encode_block
};

mod flag_map;

#[cfg(test)]
mod test;

pub use flag_map::BlockFlagMap;

/// The block length the driver uses when the caller expresses no preference.
pub const DEFAULT_BLOCK_LEN: usize = MAX_BLOCK_LEN;

/// An error reported by the file-level driver.
#[derive(Debug, Error)]
pub enum ArchiveError {
	/// A block failed to encode or decode.
	#[error(transparent)]
	BlockCoding(#[from] BlockCodingError),
	/// The block length lies outside the supported range.
	#[error("block length {0} is outside the supported range of 2 to 64 bytes")]
	UnsupportedBlockLength(usize),
	/// The sidecar does not hold a whole flag map.
	#[error("sidecar data is malformed: {0}")]
	MalformedSidecar(&'static str),
	/// The flag map ran out before the payload did.
	#[error("payload continues past the last sidecar flag")]
	MissingBlockFlags
}

/// A compressed stream: the block payload plus the sidecar flag map that
/// [`decompress`] needs to take it apart again.
#[derive(Debug, Clone)]
pub struct BlockArchive {
	/// The concatenated per-block outputs: `bit_count.div_ceil(8)` bytes for
	/// each compressed block, the original bytes for each stored block.
	pub payload: Vec<u8>,
	/// One compressed-or-not flag per block, in block order.
	pub flags: BlockFlagMap,
	/// Counters describing how the input compressed.
	pub stats: CompressionStats
}

/// Counters accumulated while compressing one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
	/// Total input length in bytes.
	pub input_len: usize,
	/// Number of blocks the input split into, including a trailing partial
	/// block.
	pub block_count: usize,
	/// Number of blocks the codec compressed.
	pub compressed_block_count: usize,
	/// Input bytes belonging to compressed blocks.
	pub compressed_input_len: usize,
	/// Payload bytes occupied by compressed blocks.
	pub compressed_payload_len: usize
}

/// Compresses `input` as a sequence of `block_len`-byte blocks.
///
/// Blocks the codec reports incompressible are stored verbatim with a clear
/// flag. A trailing block shorter than `block_len` is always stored verbatim:
/// the decoder derives block boundaries from the block length, so only the last
/// block may be short, and it is never worth a header of its own.
pub fn compress(input: &[u8], block_len: usize) -> Result<BlockArchive, ArchiveError> {
	if !(MIN_BLOCK_LEN..=MAX_BLOCK_LEN).contains(&block_len) {
		return Err(ArchiveError::UnsupportedBlockLength(block_len));
	}

	let mut payload = Vec::with_capacity(input.len());
	let mut flags = BlockFlagMap::new(block_len)?;
	let mut stats = CompressionStats {
		input_len: input.len(),
		..Default::default()
	};
	let mut scratch = [0u8; MAX_BLOCK_LEN];

	for block in input.chunks(block_len) {
		stats.block_count += 1;
		if block.len() < block_len {
			payload.extend_from_slice(block);
			flags.push(false);
			break;
		}
		match encode_block(block, &mut scratch)? {
			EncodeOutcome::Compressed { bit_count } => {
				let encoded = &scratch[..bit_count.div_ceil(8)];
				payload.extend_from_slice(encoded);
				flags.push(true);
				stats.compressed_block_count += 1;
				stats.compressed_input_len += block.len();
				stats.compressed_payload_len += encoded.len();
			}
			EncodeOutcome::Incompressible => {
				trace!(
					"Block {} did not compress; storing it verbatim",
					stats.block_count - 1
				);
				payload.extend_from_slice(block);
				flags.push(false);
			}
		}
	}

	debug!(
		"Compressed {} of {} blocks: {} input bytes to {} payload bytes",
		stats.compressed_block_count,
		stats.block_count,
		stats.input_len,
		payload.len()
	);

	Ok(BlockArchive {
		payload,
		flags,
		stats
	})
}

/// Decompresses a payload produced by [`compress`], block by block under the
/// guidance of its flag map.
pub fn decompress(payload: &[u8], flags: &BlockFlagMap) -> Result<Vec<u8>, ArchiveError> {
	let block_len = flags.block_len();
	let mut output = Vec::with_capacity(payload.len() * 2);
	let mut scratch = [0u8; MAX_BLOCK_LEN];
	let mut position = 0;
	let mut block = 0;

	while position < payload.len() {
		let compressed = flags.get(block).ok_or(ArchiveError::MissingBlockFlags)?;
		block += 1;
		if compressed {
			let consumed = decode_block(&payload[position..], &mut scratch, block_len)?;
			output.extend_from_slice(&scratch[..block_len]);
			position += consumed;
		} else {
			// A stored block is block_len bytes, except for the trailing
			// partial block, which is whatever remains
			let stored = block_len.min(payload.len() - position);
			output.extend_from_slice(&payload[position..position + stored]);
			position += stored;
		}
	}

	debug!(
		"Decompressed {} payload bytes back to {} bytes across {} blocks",
		payload.len(),
		output.len(),
		block
	);

	Ok(output)
}
