use test_log::test;

use super::*;

/// A kilobyte or so of prose-like input that mixes well-compressing runs,
/// text, and binary noise.
fn sample_input() -> Vec<u8> {
	let mut input = Vec::new();
	input.extend_from_slice(&[0u8; 100]);
	for _ in 0..12 {
		input.extend_from_slice(b"the rain in spain stays mainly on the plain ");
	}
	input.extend((0..200u32).map(|value| (value.wrapping_mul(2654435761) >> 13) as u8));
	input.extend_from_slice(&[0x7F; 64]);
	input
}

#[test]
fn round_trips_across_block_lengths() {
	let input = sample_input();
	for block_len in [2, 3, 5, 17, 64] {
		let archive = compress(&input, block_len).unwrap();
		assert_eq!(archive.stats.input_len, input.len());
		assert_eq!(
			archive.stats.block_count,
			input.len().div_ceil(block_len),
			"wrong block count for {}-byte blocks",
			block_len
		);
		assert_eq!(archive.flags.len(), archive.stats.block_count);

		let decoded = decompress(&archive.payload, &archive.flags).unwrap();
		assert_eq!(decoded, input, "round trip failed for {}-byte blocks", block_len);
	}
}

#[test]
fn round_trips_through_sidecar_serialization() {
	let input = sample_input();
	let archive = compress(&input, 32).unwrap();

	let sidecar = archive.flags.to_sidecar_bytes();
	let flags = BlockFlagMap::from_sidecar_bytes(&sidecar).unwrap();
	assert_eq!(flags.block_len(), 32);

	assert_eq!(decompress(&archive.payload, &flags).unwrap(), input);
}

#[test]
fn trailing_partial_block_is_stored_verbatim() {
	let mut input = vec![0x20u8; 64];
	input.extend_from_slice(b"0123456789");

	let archive = compress(&input, 64).unwrap();
	// The full block of spaces collapses to one byte; the ten-byte tail is
	// appended as-is with a clear flag
	assert_eq!(archive.payload[0], 0x83);
	assert_eq!(&archive.payload[1..], b"0123456789");
	assert_eq!(archive.flags.get(0), Some(true));
	assert_eq!(archive.flags.get(1), Some(false));
	assert_eq!(archive.flags.get(2), None);

	let stats = archive.stats;
	assert_eq!(stats.block_count, 2);
	assert_eq!(stats.compressed_block_count, 1);
	assert_eq!(stats.compressed_input_len, 64);
	assert_eq!(stats.compressed_payload_len, 1);

	assert_eq!(decompress(&archive.payload, &archive.flags).unwrap(), input);
}

#[test]
fn incompressible_blocks_are_stored_verbatim() {
	let input: Vec<u8> = (0..64u8)
		.map(|value| value.wrapping_mul(19).wrapping_add(3))
		.collect();

	let archive = compress(&input, 64).unwrap();
	assert_eq!(archive.payload, input);
	assert_eq!(archive.flags.get(0), Some(false));
	assert_eq!(archive.stats.compressed_block_count, 0);

	assert_eq!(decompress(&archive.payload, &archive.flags).unwrap(), input);
}

#[test]
fn empty_input_yields_an_empty_archive() {
	let archive = compress(&[], 64).unwrap();
	assert!(archive.payload.is_empty());
	assert!(archive.flags.is_empty());
	assert_eq!(archive.stats.block_count, 0);

	assert!(decompress(&archive.payload, &archive.flags).unwrap().is_empty());
}

#[test]
fn sidecar_layout_matches_the_wire_format() {
	let mut flags = BlockFlagMap::new(4).unwrap();
	flags.push(true);
	flags.push(false);
	flags.push(true);

	// Header byte, then one little-endian word with the three flags shifted
	// into its most significant bits
	assert_eq!(
		flags.to_sidecar_bytes(),
		[0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xA0]
	);
}

#[test]
fn flag_maps_answer_indexed_lookups_before_and_after_serialization() {
	let mut flags = BlockFlagMap::new(8).unwrap();
	let pushed: Vec<bool> = (0..100).map(|index| index % 3 == 0).collect();
	for &flag in &pushed {
		flags.push(flag);
	}
	assert_eq!(flags.len(), 100);

	for (index, &flag) in pushed.iter().enumerate() {
		assert_eq!(flags.get(index), Some(flag), "wrong flag at {}", index);
	}
	assert_eq!(flags.get(100), None);

	let parsed = BlockFlagMap::from_sidecar_bytes(&flags.to_sidecar_bytes()).unwrap();
	// The sidecar stores whole words, so the parsed length rounds up and the
	// padding reads as clear flags
	assert_eq!(parsed.len(), 128);
	for (index, &flag) in pushed.iter().enumerate() {
		assert_eq!(parsed.get(index), Some(flag), "wrong parsed flag at {}", index);
	}
	assert_eq!(parsed.get(100), Some(false));
}

#[test]
fn malformed_sidecars_are_rejected() {
	assert!(matches!(
		BlockFlagMap::from_sidecar_bytes(&[]),
		Err(ArchiveError::MalformedSidecar(_))
	));
	assert!(matches!(
		BlockFlagMap::from_sidecar_bytes(&[70]),
		Err(ArchiveError::UnsupportedBlockLength(70))
	));
	assert!(matches!(
		BlockFlagMap::from_sidecar_bytes(&[8, 1, 2, 3]),
		Err(ArchiveError::MalformedSidecar(_))
	));
}

#[test]
fn payload_without_enough_flags_is_rejected() {
	let flags = BlockFlagMap::new(5).unwrap();
	assert!(matches!(
		decompress(&[1, 2, 3, 4, 5], &flags),
		Err(ArchiveError::MissingBlockFlags)
	));
}

#[test]
fn unsupported_block_lengths_are_rejected() {
	assert!(matches!(
		compress(b"abc", 1),
		Err(ArchiveError::UnsupportedBlockLength(1))
	));
	assert!(matches!(
		compress(b"abc", 65),
		Err(ArchiveError::UnsupportedBlockLength(65))
	));
	assert!(matches!(
		BlockFlagMap::new(0),
		Err(ArchiveError::UnsupportedBlockLength(0))
	));
}
