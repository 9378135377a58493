use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::{RngCore, SeedableRng};

use super::tables::{PREDEFINED_TEXT_CHARS, UNIQUE_LIMITS_25};
use super::*;

/// Encodes `block`, and when it compresses, asserts the bit-count honesty and
/// round-trip properties before returning the outcome.
fn encode_checked(block: &[u8]) -> EncodeOutcome {
	let mut encoded = [0u8; MAX_BLOCK_LEN];
	let outcome = encode_block(block, &mut encoded).expect("valid block must encode");

	if let EncodeOutcome::Compressed { bit_count } = outcome {
		let byte_len = bit_count.div_ceil(8);
		assert!(
			byte_len <= block.len(),
			"encoding of {} bytes claims {} bytes",
			block.len(),
			byte_len
		);

		let mut decoded = [0u8; MAX_BLOCK_LEN];
		let consumed = decode_block(&encoded[..byte_len], &mut decoded, block.len())
			.expect("compressed block must decode");
		assert_eq!(
			consumed,
			byte_len,
			"decoder consumed a different byte count than the encoder claimed"
		);
		assert_eq!(&decoded[..block.len()], block, "round trip mismatch");
	}

	outcome
}

fn encode_to_vec(block: &[u8]) -> (EncodeOutcome, Vec<u8>) {
	let mut encoded = [0u8; MAX_BLOCK_LEN];
	let outcome = encode_block(block, &mut encoded).expect("valid block must encode");
	let byte_len = outcome.byte_len().unwrap_or(0);
	(outcome, encoded[..byte_len].to_vec())
}

#[test]
fn single_unique_run_collapses_to_two_bytes() {
	let block = [0xAA; 8];
	let (outcome, encoded) = encode_to_vec(&block);

	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 10 });
	assert_eq!(encoded, [0xA9, 0x02]);

	let mut decoded = [0u8; 8];
	let consumed = decode_block(&encoded, &mut decoded, 8).unwrap();
	assert_eq!(consumed, 2);
	assert_eq!(decoded, block);
}

#[test]
fn single_unique_small_value_fits_one_byte() {
	let block = [0x20; 16];
	let (outcome, encoded) = encode_to_vec(&block);

	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 8 });
	assert_eq!(encoded, [0x83]);

	let mut decoded = [0u8; 16];
	assert_eq!(decode_block(&encoded, &mut decoded, 16).unwrap(), 1);
	assert_eq!(decoded, block);
}

#[test]
fn two_value_alternation_uses_one_bit_indices() {
	let block = [0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01];
	let (outcome, encoded) = encode_to_vec(&block);

	// Header with the indices for positions 1..3 in its top bits, the
	// two-entry unique table, then one bit per remaining position
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 28 });
	assert_eq!(encoded, [0xA2, 0x00, 0x01, 0x0A]);

	let mut decoded = [0u8; 8];
	assert_eq!(decode_block(&encoded, &mut decoded, 8).unwrap(), 4);
	assert_eq!(decoded, block);
}

#[test]
fn three_bit_indices_span_byte_boundaries() {
	let mut block = [0x7F; 20];
	block[15..].copy_from_slice(&[1, 2, 3, 4, 5]);
	let (outcome, encoded) = encode_to_vec(&block);

	// Six distinct values make three-bit indices: 5 header bits, the index
	// for position 1, six table bytes, and 18 more indices
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 110 });
	assert_eq!(encoded[0], 0x0A);
	assert_eq!(encoded[1..7], [0x7F, 1, 2, 3, 4, 5]);

	let mut decoded = [0u8; 20];
	assert_eq!(decode_block(&encoded, &mut decoded, 20).unwrap(), 14);
	assert_eq!(decoded, block);
}

#[test]
fn text_block_packs_predefined_character_indices_in_pairs() {
	let block = *b"eat tea teat eat";
	let (outcome, encoded) = encode_to_vec(&block);

	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 88 });
	assert_eq!(
		encoded,
		// Header, two all-text control bytes, then the index pairs of
		// ' '=0, 'e'=1, 't'=2, 'a'=3, low nibble first
		[0x00, 0x00, 0x00, 0x31, 0x02, 0x12, 0x03, 0x12, 0x23, 0x10, 0x23]
	);

	let mut decoded = [0u8; 16];
	assert_eq!(decode_block(&encoded, &mut decoded, 16).unwrap(), 11);
	assert_eq!(decoded, block);
}

#[test]
fn text_block_stores_unlisted_bytes_raw() {
	let mut block = *b"ratta ratt......";
	block[10..].copy_from_slice(&[0x80, b'0', b'1', b'2', b'3', b'7']);

	let (outcome, encoded) = encode_to_vec(&block);
	assert_eq!(encoded[0], 0x00, "expected the text mode header");
	// Ten 4-bit indices pack into five bytes; the six unlisted bytes stay raw
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 14 * 8 });

	let mut decoded = [0u8; 16];
	assert_eq!(decode_block(&encoded, &mut decoded, 16).unwrap(), 14);
	assert_eq!(decoded, block);
}

#[test]
fn text_mode_refuses_blocks_it_cannot_shorten() {
	// A text-heavy head followed by unlisted bytes everywhere else: the mode
	// is attempted, but one control bit plus a raw byte per position loses
	let mut block = [0u8; 32];
	block[..11].copy_from_slice(b"etain etain");
	for (position, slot) in block[11..].iter_mut().enumerate() {
		*slot = 0x80 + position as u8;
	}

	assert_eq!(encode_checked(&block), EncodeOutcome::Incompressible);
}

#[test]
fn dominant_value_block_uses_single_value_mode() {
	let mut block = [9u8; 24];
	for (position, slot) in block[13..].iter_mut().enumerate() {
		*slot = 0x80 + position as u8;
	}
	let (outcome, encoded) = encode_to_vec(&block);

	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 128 });
	// Header, control bits for positions 0..12, the dominant value, then the
	// eleven literals
	assert_eq!(encoded[..5], [0x20, 0xFF, 0x1F, 0x00, 0x09]);
	assert_eq!(
		encoded[5..],
		[0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A]
	);

	let mut decoded = [0u8; 24];
	assert_eq!(decode_block(&encoded, &mut decoded, 24).unwrap(), 16);
	assert_eq!(decoded, block);
}

#[test]
fn dominant_value_beats_wide_fixed_bit_tables() {
	// Eleven distinct values would fit the four-bit table layout, but the
	// dominant value is frequent enough that eliding it wins
	let mut block = [7u8; 48];
	for (position, slot) in block[25..].iter_mut().enumerate() {
		*slot = 0x10 + (position % 10) as u8;
	}

	let (outcome, encoded) = encode_to_vec(&block);
	assert_eq!(encoded[0], 0x20, "expected the single-value mode header");
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 31 * 8 });

	let mut decoded = [0u8; 48];
	assert_eq!(decode_block(&encoded, &mut decoded, 48).unwrap(), 31);
	assert_eq!(decoded, block);
}

#[test]
fn ascii_soup_falls_back_to_seven_bit_mode() {
	let block: [u8; 16] = core::array::from_fn(|position| 0x41 + position as u8);
	let (outcome, encoded) = encode_to_vec(&block);

	assert_eq!(encoded[0], 0x40, "expected the 7-bit mode header");
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 120 });

	let mut decoded = [0u8; 16];
	assert_eq!(decode_block(&encoded, &mut decoded, 16).unwrap(), 15);
	assert_eq!(decoded, block);
}

#[test]
fn seven_bit_mode_stores_partial_groups_as_whole_bytes() {
	// 20 values: two full groups pack to 14 bytes, the last four bytes are
	// stored whole, one output byte per input byte
	let block: [u8; 20] = core::array::from_fn(|position| 0x41 + position as u8);
	let (outcome, encoded) = encode_to_vec(&block);

	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 152 });
	assert_eq!(&encoded[15..], &block[16..]);

	let mut decoded = [0u8; 20];
	assert_eq!(decode_block(&encoded, &mut decoded, 20).unwrap(), 19);
	assert_eq!(decoded, block);
}

#[test]
fn seven_bit_mode_breaks_even_on_a_lone_group_with_a_stray() {
	// Eight packed values plus one stored byte come out at exactly the input
	// size, which the encoder still reports as a (zero-saving) success
	let block: [u8; 9] = core::array::from_fn(|position| 0x30 + position as u8);
	assert_eq!(
		encode_checked(&block),
		EncodeOutcome::Compressed { bit_count: 72 }
	);
}

#[test]
fn seven_bit_mode_needs_a_complete_group() {
	// Six distinct ASCII bytes: every mode whiffs, and 7-bit coding would
	// only add its header, so the block must be left alone
	let block = *b"abcdef";
	assert_eq!(encode_checked(&block), EncodeOutcome::Incompressible);
}

#[test]
fn high_byte_soup_is_incompressible() {
	// 64 distinct values with high bits in play: too many uniques for any
	// table, no dominant value, and 7-bit coding is out
	let block: [u8; 64] =
		core::array::from_fn(|position| (position as u8).wrapping_mul(19).wrapping_add(3));
	assert_eq!(encode_checked(&block), EncodeOutcome::Incompressible);
}

#[test]
fn mode_selection_is_deterministic() {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x5EED);
	let mut block = [0u8; 64];
	rng.fill_bytes(&mut block);
	// Bound the alphabet so the block actually compresses
	for slot in block.iter_mut() {
		*slot &= 0x07;
	}

	let first_pass = encode_to_vec(&block);
	let second_pass = encode_to_vec(&block);
	assert_eq!(first_pass, second_pass);
}

#[test]
fn round_trip_sweep_over_all_lengths_and_shapes() {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(0xF1B);
	let mut raw = [0u8; MAX_BLOCK_LEN];

	for block_len in MIN_BLOCK_LEN..=MAX_BLOCK_LEN {
		for shape in 0..5 {
			rng.fill_bytes(&mut raw[..block_len]);
			let mut block = raw;
			match shape {
				// One repeated value
				0 => block[..block_len].fill(raw[0]),
				// Two-symbol data
				1 => {
					for slot in block[..block_len].iter_mut() {
						*slot = if *slot & 1 != 0 { raw[0] } else { raw[1] };
					}
				}
				// ASCII-clean data
				2 => {
					for slot in block[..block_len].iter_mut() {
						*slot &= 0x7F;
					}
				}
				// English-ish text with occasional stray bytes
				3 => {
					for slot in block[..block_len].iter_mut() {
						*slot = if *slot & 0xC0 == 0 {
							*slot
						} else {
							PREDEFINED_TEXT_CHARS[usize::from(*slot & 0xF)]
						};
					}
				}
				// Unconstrained bytes
				_ => {}
			}
			encode_checked(&block[..block_len]);
		}
	}
}

#[test]
fn fixed_bit_savings_meet_the_25_percent_bound() {
	for block_len in 6..=MAX_BLOCK_LEN {
		for alphabet_len in [1usize, 2, 3, 4, 5, 8, 9, 12, 15, 16] {
			if alphabet_len > usize::from(UNIQUE_LIMITS_25[block_len]) {
				continue;
			}
			let block: Vec<u8> = (0..block_len)
				.map(|position| 0xE0 + (position % alphabet_len) as u8)
				.collect();

			let EncodeOutcome::Compressed { bit_count } = encode_checked(&block) else {
				panic!(
					"{} values over a {}-value alphabet did not compress",
					block_len, alphabet_len
				);
			};
			if alphabet_len < 16 {
				assert!(
					bit_count <= block_len * 6,
					"{} bits for {} values over a {}-value alphabet",
					bit_count,
					block_len,
					alphabet_len
				);
			} else {
				// The full 16-value table at 64 values lands a hair under a
				// quarter saved; it still has to beat storing the block
				assert!(bit_count < block_len * 8);
			}
		}
	}
}

#[test]
fn unique_limit_table_is_monotone_and_bounded() {
	assert!(
		UNIQUE_LIMITS_25
			.windows(2)
			.all(|pair| pair[0] <= pair[1] && pair[1] <= 16)
	);
	assert_eq!(UNIQUE_LIMITS_25[0], 0);
	assert_eq!(UNIQUE_LIMITS_25[2], 1);
	assert_eq!(UNIQUE_LIMITS_25[9], 4);
	assert_eq!(UNIQUE_LIMITS_25[23], 8);
	assert_eq!(UNIQUE_LIMITS_25[64], 16);
}

#[test]
fn pair_block_single_unique() {
	let (outcome, encoded) = encode_to_vec(&[0x2A, 0x2A]);
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 8 });
	assert_eq!(encoded, [0xAB]);

	let mut decoded = [0u8; 2];
	assert_eq!(decode_short_block(&encoded, &mut decoded, 2).unwrap(), 1);
	assert_eq!(decoded, [0x2A, 0x2A]);
}

#[test]
fn pair_block_with_two_nibble_values() {
	let (outcome, encoded) = encode_to_vec(&[0x11, 0x12]);
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 12 });
	assert_eq!(encoded, [0x18, 0x02]);

	let mut decoded = [0u8; 2];
	assert_eq!(decode_short_block(&encoded, &mut decoded, 2).unwrap(), 2);
	assert_eq!(decoded, [0x11, 0x12]);
}

#[test]
fn pair_block_with_three_nibble_values_is_incompressible() {
	assert_eq!(encode_checked(&[0x12, 0x34]), EncodeOutcome::Incompressible);
}

#[test]
fn triple_block_with_two_nibble_values() {
	let (outcome, encoded) = encode_to_vec(&[0x12, 0x11, 0x22]);
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 14 });
	assert_eq!(encoded, [0x72, 0x08]);

	let mut decoded = [0u8; 3];
	assert_eq!(decode_short_block(&encoded, &mut decoded, 3).unwrap(), 2);
	assert_eq!(decoded, [0x12, 0x11, 0x22]);
}

#[test]
fn triple_block_single_unique_with_a_large_value() {
	let (outcome, encoded) = encode_to_vec(&[0xC7, 0xC7, 0xC7]);
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 10 });
	assert_eq!(encoded, [0x1D, 0x03]);

	let mut decoded = [0u8; 3];
	assert_eq!(decode_short_block(&encoded, &mut decoded, 3).unwrap(), 2);
	assert_eq!(decoded, [0xC7; 3]);
}

#[test]
fn triple_block_with_three_values_is_incompressible() {
	assert_eq!(encode_checked(&[1, 2, 3]), EncodeOutcome::Incompressible);
}

#[test]
fn quad_block_with_two_values() {
	let block = [0xAB, 0xCD, 0xAB, 0xCD];
	let (outcome, encoded) = encode_to_vec(&block);
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 20 });
	assert_eq!(encoded, [0xBA, 0xDA, 0x0C]);

	let mut decoded = [0u8; 4];
	assert_eq!(decode_short_block(&encoded, &mut decoded, 4).unwrap(), 3);
	assert_eq!(decoded, block);
}

#[test]
fn five_byte_block_with_two_values() {
	let block = [5, 5, 9, 5, 9];
	let (outcome, encoded) = encode_to_vec(&block);
	assert_eq!(outcome, EncodeOutcome::Compressed { bit_count: 21 });
	assert_eq!(encoded, [0xB4, 0x20, 0x01]);

	let mut decoded = [0u8; 5];
	assert_eq!(decode_short_block(&encoded, &mut decoded, 5).unwrap(), 3);
	assert_eq!(decoded, block);
}

#[test]
fn rejects_unsupported_block_lengths() {
	let mut output = [0u8; 128];
	assert_eq!(
		encode_block(&[0], &mut output),
		Err(BlockCodingError::UnsupportedBlockLength(1))
	);
	assert_eq!(
		encode_block(&[0; 65], &mut output),
		Err(BlockCodingError::UnsupportedBlockLength(65))
	);
	assert_eq!(
		decode_block(&[0x83], &mut output, 65),
		Err(BlockCodingError::UnsupportedBlockLength(65))
	);
	assert_eq!(
		encode_short_block(&[0; 6], &mut output),
		Err(BlockCodingError::UnsupportedBlockLength(6))
	);
	assert_eq!(
		decode_short_block(&[0x83], &mut output, 6),
		Err(BlockCodingError::UnsupportedBlockLength(6))
	);
}

#[test]
fn rejects_undersized_output_buffers() {
	let mut output = [0u8; 4];
	assert_eq!(
		encode_block(&[0x55; 8], &mut output),
		Err(BlockCodingError::OutputBufferTooSmall {
			capacity: 4,
			required: 8
		})
	);
	assert_eq!(
		decode_block(&[0x83], &mut output, 8),
		Err(BlockCodingError::OutputBufferTooSmall {
			capacity: 4,
			required: 8
		})
	);
}

#[test]
fn truncated_encodings_are_rejected() {
	let mut block = [9u8; 24];
	for (position, slot) in block[13..].iter_mut().enumerate() {
		*slot = 0x80 + position as u8;
	}
	let (_, encoded) = encode_to_vec(&block);

	let mut decoded = [0u8; 24];
	assert_eq!(
		decode_block(&[], &mut decoded, 24),
		Err(BlockCodingError::TruncatedBlock)
	);
	for cut in 1..encoded.len() {
		assert_eq!(
			decode_block(&encoded[..cut], &mut decoded, 24),
			Err(BlockCodingError::TruncatedBlock),
			"a {}-byte prefix of a {}-byte encoding must not decode",
			cut,
			encoded.len()
		);
	}
}

#[test]
fn contradictory_mode_headers_are_rejected() {
	let mut decoded = [0u8; 8];
	assert_eq!(
		decode_block(&[0x60, 0, 0, 0, 0, 0, 0, 0], &mut decoded, 8),
		Err(BlockCodingError::ContradictoryHeader(0x60))
	);
}
