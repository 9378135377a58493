//! The sidecar flag map: one compressed-or-not bit per block.

use super::ArchiveError;
use crate::codec::{MAX_BLOCK_LEN, MIN_BLOCK_LEN};

/// One compressed-or-not flag per block, plus the block length the stream was
/// split with.
///
/// The serialized sidecar form is one header byte holding the block length,
/// followed by the flags packed 64 per 8-byte little-endian word, most
/// significant bit first within each word. The final partial word is shifted
/// left so that its used bits occupy the high end; the padding bits read as
/// clear flags, which is harmless because decompression stops when the payload
/// runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFlagMap {
	block_len: u8,
	words: Vec<u64>,
	partial: u64,
	partial_len: u32
}

impl BlockFlagMap {
	/// Creates an empty flag map for a stream split into `block_len`-byte
	/// blocks.
	pub fn new(block_len: usize) -> Result<Self, ArchiveError> {
		if !(MIN_BLOCK_LEN..=MAX_BLOCK_LEN).contains(&block_len) {
			return Err(ArchiveError::UnsupportedBlockLength(block_len));
		}
		Ok(Self {
			block_len: block_len as u8,
			words: Vec::new(),
			partial: 0,
			partial_len: 0
		})
	}

	/// The block length of the stream this map describes.
	pub fn block_len(&self) -> usize {
		usize::from(self.block_len)
	}

	/// The number of flags pushed so far.
	pub fn len(&self) -> usize {
		self.words.len() * 64 + self.partial_len as usize
	}

	/// Whether no flags have been pushed.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Appends the flag for the next block.
	pub fn push(&mut self, compressed: bool) {
		self.partial = (self.partial << 1) | u64::from(compressed);
		self.partial_len += 1;
		if self.partial_len == 64 {
			self.words.push(self.partial);
			self.partial = 0;
			self.partial_len = 0;
		}
	}

	/// Returns the flag for block `index`, or `None` past the end of the map.
	pub fn get(&self, index: usize) -> Option<bool> {
		if index >= self.len() {
			return None;
		}
		let word_index = index / 64;
		let flag = if word_index < self.words.len() {
			self.words[word_index] >> (63 - index % 64) & 1
		} else {
			self.partial >> (self.partial_len as usize - 1 - index % 64) & 1
		};
		Some(flag != 0)
	}

	/// Serializes the map to sidecar bytes.
	pub fn to_sidecar_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(1 + (self.words.len() + 1) * 8);
		bytes.push(self.block_len);
		for &word in &self.words {
			bytes.extend_from_slice(&word.to_le_bytes());
		}
		if self.partial_len > 0 {
			let word = self.partial << (64 - self.partial_len);
			bytes.extend_from_slice(&word.to_le_bytes());
		}
		bytes
	}

	/// Parses a map from sidecar bytes.
	///
	/// The exact flag count is not recorded in the sidecar; a parsed map
	/// reports a length rounded up to whole words, with padding bits reading as
	/// clear flags.
	pub fn from_sidecar_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
		let (&block_len, flag_bytes) = bytes
			.split_first()
			.ok_or(ArchiveError::MalformedSidecar("no block length header"))?;
		if !(MIN_BLOCK_LEN..=MAX_BLOCK_LEN).contains(&usize::from(block_len)) {
			return Err(ArchiveError::UnsupportedBlockLength(usize::from(block_len)));
		}
		if flag_bytes.len() % 8 != 0 {
			return Err(ArchiveError::MalformedSidecar(
				"flag data is not a whole number of words"
			));
		}

		let words = flag_bytes
			.chunks_exact(8)
			.map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
			.collect();
		Ok(Self {
			block_len,
			words,
			partial: 0,
			partial_len: 0
		})
	}
}
