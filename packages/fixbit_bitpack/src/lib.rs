//! This crate implements LSB-first bitpacking over borrowed byte slices.
//!
//! # Overview
//!
//! Bitpacking is a simple means of efficiently writing and reading sequences of
//! arbitrary-width integers in byte-oriented buffers: the bits of the binary
//! representations of those integers are stored consecutively, avoiding padding
//! or aligning them to bytes unless explicitly requested.
//!
//! A bitpacked buffer is a sequence of raw, unstructured bits without an
//! intrinsic interpretation, and it is the responsibility of writers and readers
//! to agree on some protocol for interpreting the data. The convention is
//! little-endian: the least significant bits of a value are stored first, and
//! when dealing with complete bytes only, bitpacking is equivalent to reading
//! and writing them in order.
//!
//! Unlike stream-oriented bitpackers, the cursors in this crate operate on
//! caller-owned slices and keep an exact bit position, so client code can learn
//! precisely how many bits a record occupies and how many bytes of a buffer it
//! spans. Formats that mix packed fields with byte-aligned sections (headers,
//! embedded tables, raw byte runs) can call [`BitpackWriter::align_to_byte`] and
//! [`BitpackReader::align_to_byte`] at section boundaries; the skipped filler
//! bits are always zero.
//!
//! # Example
//!
//! ```
//! use fixbit_bitpack::{BitpackReader, BitpackWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut buf = [0u8; 2];
//!
//! let mut writer = BitpackWriter::new(&mut buf);
//! writer.write_bits(0b101, 3)?;
//! writer.write_flag(true)?;
//! writer.write_bits(0xAB, 8)?;
//! writer.write_bits(0x5, 4)?;
//! assert_eq!(writer.bit_position(), 16);
//! assert_eq!(buf, [0b1011_1101, 0b0101_1010]);
//!
//! let mut reader = BitpackReader::new(&buf);
//! assert_eq!(reader.read_bits(3)?, 0b101);
//! assert!(reader.read_flag()?);
//! assert_eq!(reader.read_bits(8)?, 0xAB);
//! assert_eq!(reader.read_bits(4)?, 0x5);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![forbid(rustdoc::broken_intra_doc_links)]

use thiserror::Error;


/// The widest integer that can be packed or unpacked in a single call.
pub const MAX_INTEGER_WIDTH: u32 = 32;

/// The error returned when a bitpacked write does not fit in the space that
/// remains in the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bitpacked write of {width} bits exceeds the {remaining} bits left in the output buffer")]
pub struct NotEnoughSpace {
	/// The width of the rejected write, in bits.
	pub width: u32,
	/// The bits that remained in the output buffer when the write was rejected.
	pub remaining: usize
}

/// The error returned when a bitpacked read runs past the end of the input
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bitpacked read of {width} bits exceeds the {remaining} bits left in the input buffer")]
pub struct UnexpectedEndOfInput {
	/// The width of the rejected read, in bits.
	pub width: u32,
	/// The bits that remained in the input buffer when the read was rejected.
	pub remaining: usize
}

/// Wraps a mutable byte slice to write variable-width unsigned integers to it,
/// packed LSB-first.
///
/// The writer owns no storage: it borrows the buffer and tracks a bit position
/// within it. Bytes are fully overwritten as the position first enters them, so
/// the buffer does not need to be zeroed beforehand.
#[derive(Debug)]
pub struct BitpackWriter<'a> {
	buf: &'a mut [u8],
	bit_position: usize
}

impl<'a> BitpackWriter<'a> {
	/// Constructs a bitpack writer positioned at the first bit of `buf`.
	pub fn new(buf: &'a mut [u8]) -> Self {
		Self { buf, bit_position: 0 }
	}

	/// Writes the `width` least significant bits of `integer` at the current
	/// position, least significant bit first.
	///
	/// `width` may be zero, in which case nothing is written. Any bits of
	/// `integer` above `width` are ignored.
	///
	/// # Panics
	///
	/// Panics if `width` exceeds [`MAX_INTEGER_WIDTH`].
	pub fn write_bits(&mut self, integer: u32, width: u32) -> Result<(), NotEnoughSpace> {
		assert!(width <= MAX_INTEGER_WIDTH, "unsupported bitpack write width");

		if self.bit_position + width as usize > self.buf.len() * 8 {
			return Err(NotEnoughSpace {
				width,
				remaining: self.buf.len() * 8 - self.bit_position
			});
		}

		let mut value = u64::from(integer) & ones_mask(width);
		let mut remaining = width;
		while remaining > 0 {
			let byte_index = self.bit_position / 8;
			let bit_offset = (self.bit_position % 8) as u32;
			let take = (8 - bit_offset).min(remaining);
			let bits = (value & ones_mask(take)) as u8;

			// The first write into a byte lands on its bit 0 and replaces
			// whatever the buffer held there, zeroing the upper bits; later
			// writes into the same byte only add bits above the cursor
			if bit_offset == 0 {
				self.buf[byte_index] = bits;
			} else {
				self.buf[byte_index] |= bits << bit_offset;
			}

			value >>= take;
			self.bit_position += take as usize;
			remaining -= take;
		}

		Ok(())
	}

	/// Writes a whole byte at the current position. The byte occupies exactly
	/// one buffer byte when the writer is byte-aligned.
	pub fn write_byte(&mut self, byte: u8) -> Result<(), NotEnoughSpace> {
		self.write_bits(byte.into(), 8)
	}

	/// Writes a single flag (i.e., boolean) bit: `true` is stored as 1 and
	/// `false` as 0.
	pub fn write_flag(&mut self, flag: bool) -> Result<(), NotEnoughSpace> {
		self.write_bits(flag.into(), 1)
	}

	/// Advances the position to the next byte boundary. The skipped filler bits
	/// are zero. Does nothing when the writer is already byte-aligned.
	pub fn align_to_byte(&mut self) {
		self.bit_position = self.bit_position.next_multiple_of(8);
	}

	/// Returns the number of bits written so far, counting alignment filler.
	pub fn bit_position(&self) -> usize {
		self.bit_position
	}

	/// Returns the number of buffer bytes the written bits span, i.e. the bit
	/// position rounded up to whole bytes.
	pub fn byte_position(&self) -> usize {
		self.bit_position.div_ceil(8)
	}
}

/// Wraps a byte slice to read variable-width unsigned integers from it, packed
/// LSB-first.
#[derive(Debug)]
pub struct BitpackReader<'a> {
	buf: &'a [u8],
	bit_position: usize
}

impl<'a> BitpackReader<'a> {
	/// Constructs a bitpack reader positioned at the first bit of `buf`.
	pub fn new(buf: &'a [u8]) -> Self {
		Self { buf, bit_position: 0 }
	}

	/// Reads a `width`-bit unsigned integer from the current position, least
	/// significant bit first.
	///
	/// Reading a zero-width integer always succeeds and returns 0.
	///
	/// # Panics
	///
	/// Panics if `width` exceeds [`MAX_INTEGER_WIDTH`].
	pub fn read_bits(&mut self, width: u32) -> Result<u32, UnexpectedEndOfInput> {
		assert!(width <= MAX_INTEGER_WIDTH, "unsupported bitpack read width");

		if self.bit_position + width as usize > self.buf.len() * 8 {
			return Err(UnexpectedEndOfInput {
				width,
				remaining: self.buf.len() * 8 - self.bit_position
			});
		}

		let mut value = 0u64;
		let mut shift = 0u32;
		let mut remaining = width;
		while remaining > 0 {
			let byte_index = self.bit_position / 8;
			let bit_offset = (self.bit_position % 8) as u32;
			let take = (8 - bit_offset).min(remaining);
			let bits = u64::from(self.buf[byte_index] >> bit_offset) & ones_mask(take);

			value |= bits << shift;
			shift += take;
			self.bit_position += take as usize;
			remaining -= take;
		}

		Ok(value as u32)
	}

	/// Reads a whole byte from the current position.
	pub fn read_byte(&mut self) -> Result<u8, UnexpectedEndOfInput> {
		Ok(self.read_bits(8)? as u8)
	}

	/// Reads a single flag (i.e., boolean) bit. `true` is returned if that bit
	/// is equal to 1; otherwise, `false` is returned.
	pub fn read_flag(&mut self) -> Result<bool, UnexpectedEndOfInput> {
		Ok(self.read_bits(1)? != 0)
	}

	/// Advances the position to the next byte boundary, discarding any filler
	/// bits in the current byte. Does nothing when the reader is already
	/// byte-aligned.
	pub fn align_to_byte(&mut self) {
		self.bit_position = self.bit_position.next_multiple_of(8);
	}

	/// Returns the number of bits consumed so far, counting alignment filler.
	pub fn bit_position(&self) -> usize {
		self.bit_position
	}

	/// Returns the number of buffer bytes the consumed bits span, i.e. the bit
	/// position rounded up to whole bytes.
	pub fn byte_position(&self) -> usize {
		self.bit_position.div_ceil(8)
	}
}

/// Returns a binary mask with its `width` least significant bits set to 1 and
/// the remaining bits set to 0.
const fn ones_mask(width: u32) -> u64 {
	(1u64 << width) - 1
}
