//! Fixbit is a Rust library for fixed bit coding: block-level lossless
//! compression of short runs of bytes (2 to 64 values per block) in which the
//! alphabet actually observed in a block is a small subset of the 256 possible
//! byte values.
//!
//! For each block, the encoder either emits nothing (the caller keeps the
//! original block and records that it was left uncompressed) or a bit-packed
//! encoding that lists the distinct byte values that occur (the "unique table")
//! and, for every subsequent position, a fixed-width index into that table.
//! Several specialized modes replace the generic table scheme when they beat
//! it:
//!
//! - **Single-unique coding** collapses a block holding one repeated value into
//!   one or two bytes.
//! - **Short-block layouts** handle blocks of 2 to 5 bytes, where the generic
//!   scheme's header and table overhead dominates, with hand-tuned nibble and
//!   two-value encodings.
//! - **Text mode** codes the 16 most frequent characters of English text as
//!   4-bit indices, storing everything else raw under control-bit guidance.
//! - **Single-value mode** elides one dominant byte value from the payload and
//!   reproduces it from control bits.
//! - **7-bit mode** packs eight ASCII-clean bytes into seven, catching
//!   otherwise incompressible blocks whose high bits are all clear.
//!
//! The mode chosen for a block depends only on its bytes and length, and
//! decoding a compressed block always reproduces the original bytes exactly.
//!
//! # Modules
//!
//! The per-block coder lives in [`codec`] and is the heart of the library: pure
//! functions over caller-owned buffers, with no allocation, no I/O and no
//! shared mutable state, so any number of threads may encode or decode disjoint
//! blocks in parallel. The [`archive`] module is the file-level driver: it
//! splits a byte stream into fixed-size blocks and pairs the concatenated block
//! payload with a sidecar flag map recording which blocks compressed.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://crates.io/crates/log) crate for logging
//! status and diagnostic messages to any interested consumers. Executables can
//! customize the verbosity of this logging, and even compile it out, as
//! explained in the `log` crate documentation. The per-block codec itself never
//! logs: it is the hot path.
//!
//! # Examples
//!
//! Compressing and decompressing a single block:
//!
//! ```
//! use fixbit::{EncodeOutcome, decode_block, encode_block};
//!
//! # fn main() -> Result<(), fixbit::BlockCodingError> {
//! let block = *b"tea at ten, tea at two, tea late";
//! let mut encoded = [0u8; 32];
//!
//! match encode_block(&block, &mut encoded)? {
//!     EncodeOutcome::Compressed { bit_count } => {
//!         let encoded = &encoded[..bit_count.div_ceil(8)];
//!         assert!(encoded.len() < block.len());
//!
//!         let mut decoded = [0u8; 32];
//!         let consumed = decode_block(encoded, &mut decoded, block.len())?;
//!         assert_eq!(consumed, encoded.len());
//!         assert_eq!(decoded, block);
//!     }
//!     EncodeOutcome::Incompressible => unreachable!("this block compresses")
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![forbid(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]
#![deny(non_ascii_idents)]
#![deny(clippy::print_stdout)]
#![deny(clippy::unimplemented)]
#![warn(explicit_outlives_requirements)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_qualifications)]
#![warn(clippy::empty_enum)]
#![warn(clippy::enum_glob_use)]
#![warn(clippy::invalid_upcast_comparisons)]
#![warn(clippy::use_self)]
#![warn(clippy::used_underscore_binding)]

pub use codec::{
	BlockCodingError, EncodeOutcome, MAX_BLOCK_LEN, MIN_BLOCK_LEN, SHORT_BLOCK_MAX_LEN,
	decode_block, decode_short_block, encode_block, encode_short_block
};

pub mod archive;
pub mod codec;
