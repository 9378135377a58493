use fixbit::{EncodeOutcome, MAX_BLOCK_LEN, MIN_BLOCK_LEN, decode_block, encode_block};

fn main() {
	afl::fuzz!(|data: &[u8]| {
		// The first byte picks the block length; the rest is block data
		let Some((&length_byte, rest)) = data.split_first() else {
			return;
		};
		let block_len = usize::from(length_byte) % (MAX_BLOCK_LEN - MIN_BLOCK_LEN + 1) + MIN_BLOCK_LEN;

		let mut encoded = [0u8; MAX_BLOCK_LEN];
		let mut decoded = [0u8; MAX_BLOCK_LEN];

		if let Some(block) = rest.get(..block_len) {
			// Whatever the encoder claims to have compressed must decode back
			// to the original bytes from exactly the bytes it occupied
			if let Ok(EncodeOutcome::Compressed { bit_count }) = encode_block(block, &mut encoded)
			{
				let encoded = &encoded[..bit_count.div_ceil(8)];
				assert!(encoded.len() <= block.len());
				let consumed =
					decode_block(encoded, &mut decoded, block_len).expect("round trip decode");
				assert_eq!(consumed, encoded.len());
				assert_eq!(&decoded[..block_len], block);
			}
		}

		// Arbitrary garbage must decode to an error or garbage, never a panic
		decode_block(rest, &mut decoded, block_len).ok();
	})
}
