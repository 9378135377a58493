use std::borrow::Cow;
use std::env;
use std::fs;
use std::process::exit;
use std::time::{Duration, Instant};

use getopts::{Matches, Options, ParsingStyle};
use log::info;
use stderrlog::ColorChoice;

use fixbit::archive::{BlockArchive, BlockFlagMap, DEFAULT_BLOCK_LEN, compress, decompress};
use fixbit::{MAX_BLOCK_LEN, MIN_BLOCK_LEN};

fn main() {
	exit(match run() {
		Ok(_) => 0,
		Err(err) => {
			eprintln!("{}", err);
			1
		}
	})
}

fn run() -> Result<(), Cow<'static, str>> {
	let mut options = Options::new();

	options
		.optflag(
			"h",
			"help",
			"Prints information about the accepted command line arguments and exits."
		)
		.optflag(
			"",
			"version",
			"Prints version and copyright information, then exits."
		)
		.optflag(
			"q",
			"quiet",
			"When enabled, the program will only print error messages, unless -h is specified."
		)
		.optflagmulti(
			"v",
			"verbose",
			"Increases the verbosity of the messages. Can be repeated several times."
		)
		.optopt(
			"b",
			"block-size",
			"The number of bytes compressed as one block, from 2 to 64. \
			Smaller blocks adapt faster to changing data but pay more header overhead. \
			The default value is 64.",
			"BYTES"
		)
		.optopt(
			"n",
			"iterations",
			"Repeats the compression and decompression passes this many times and \
			reports the fastest of each, for benchmarking. The default value is 1.",
			"COUNT"
		)
		.parsing_style(ParsingStyle::StopAtFirstFree);

	match options.parse(env::args().skip(1)) {
		Ok(matches) => {
			if matches.opt_present("h") {
				print_header();
				println!();
				println!("Usage:");
				print!("    {} [OPTION]... <input file>", env!("CARGO_BIN_NAME"));
				println!("{}", options.usage(""));
			} else if matches.opt_present("version") {
				print_header();
			} else {
				let quiet_mode = matches.opt_present("q");

				if !quiet_mode {
					print_header();
					println!();
				}

				if matches.free.len() != 1 {
					return Err(format!(
						"Too many or few file arguments specified. Run {} -h to see command line argument help",
						env!("CARGO_BIN_NAME")
					))?;
				}

				let block_len = match matches.opt_get("block-size") {
					Ok(block_len) => block_len.unwrap_or(DEFAULT_BLOCK_LEN),
					Err(err) => return Err(format!("Invalid block size: {}", err))?
				};
				if !(MIN_BLOCK_LEN..=MAX_BLOCK_LEN).contains(&block_len) {
					return Err(format!(
						"Invalid block size: must be from {} to {}",
						MIN_BLOCK_LEN, MAX_BLOCK_LEN
					))?;
				}

				let iterations = match matches.opt_get("iterations") {
					Ok(iterations) => iterations.unwrap_or(1usize).max(1),
					Err(err) => return Err(format!("Invalid iteration count: {}", err))?
				};

				init_logging(&matches, quiet_mode);

				process_file(&matches.free[0], block_len, iterations)?;
			}

			Ok(())
		}
		Err(parse_err) => Err(format!(
			"{}\nRun {} -h to see command line argument help",
			parse_err,
			env!("CARGO_BIN_NAME")
		))?
	}
}

fn process_file(
	input_path: &str,
	block_len: usize,
	iterations: usize
) -> Result<(), Cow<'static, str>> {
	let input = fs::read(input_path)
		.map_err(|err| format!("Could not read input file {}: {}", input_path, err))?;
	if input.is_empty() {
		return Err("The input file is empty; there is nothing to compress")?;
	}

	info!(
		"Compressing {} ({} bytes) with {}-byte blocks...",
		input_path,
		input.len(),
		block_len
	);

	// Like any benchmark, keep the fastest pass: it is the least disturbed one
	let mut archive = None;
	let mut compress_time = Duration::MAX;
	for _ in 0..iterations {
		let pass_begin = Instant::now();
		let pass_archive =
			compress(&input, block_len).map_err(|err| format!("Compression error: {}", err))?;
		compress_time = compress_time.min(pass_begin.elapsed());
		archive = Some(pass_archive);
	}
	let BlockArchive {
		payload,
		flags,
		stats
	} = archive.expect("at least one compression pass runs");

	let payload_path = format!("{}.fbc", input_path);
	let sidecar_path = format!("{}.cq", payload_path);
	fs::write(&payload_path, &payload)
		.map_err(|err| format!("Could not write {}: {}", payload_path, err))?;
	let sidecar = flags.to_sidecar_bytes();
	fs::write(&sidecar_path, &sidecar)
		.map_err(|err| format!("Could not write {}: {}", sidecar_path, err))?;

	let total_output_len = payload.len() + sidecar.len();
	info!(
		"Compressed byte output: {:.2}%   compressed blocks: {:.2}%",
		100.0 * (1.0 - total_output_len as f64 / input.len() as f64),
		if stats.compressed_input_len > 0 {
			100.0 * (1.0 - stats.compressed_payload_len as f64 / stats.compressed_input_len as f64)
		} else {
			0.0
		}
	);
	info!(
		"{} of {} blocks compressed   {:.2} output bytes per block",
		stats.compressed_block_count,
		stats.block_count,
		total_output_len as f64 / stats.block_count as f64
	);
	info!(
		"Compression time: {:.6} s ({:.0} bytes per second)",
		compress_time.as_secs_f64(),
		input.len() as f64 / compress_time.as_secs_f64()
	);

	// Read the artifacts back and verify the round trip, so a coding problem
	// surfaces here instead of at decompression time on another machine
	let payload = fs::read(&payload_path)
		.map_err(|err| format!("Could not read back {}: {}", payload_path, err))?;
	let sidecar = fs::read(&sidecar_path)
		.map_err(|err| format!("Could not read back {}: {}", sidecar_path, err))?;
	let flags = BlockFlagMap::from_sidecar_bytes(&sidecar)
		.map_err(|err| format!("Could not parse {}: {}", sidecar_path, err))?;

	let mut decoded = Vec::new();
	let mut decompress_time = Duration::MAX;
	for _ in 0..iterations {
		let pass_begin = Instant::now();
		decoded = decompress(&payload, &flags)
			.map_err(|err| format!("Decompression error: {}", err))?;
		decompress_time = decompress_time.min(pass_begin.elapsed());
	}

	if decoded != input {
		return Err(format!(
			"Round trip mismatch: decompressing {} yields {} bytes that differ from the input",
			payload_path,
			decoded.len()
		))?;
	}

	info!(
		"Decompression time: {:.6} s ({:.0} bytes per second)   round trip verified",
		decompress_time.as_secs_f64(),
		decoded.len() as f64 / decompress_time.as_secs_f64()
	);

	Ok(())
}

fn init_logging(option_matches: &Matches, quiet_mode: bool) {
	let verbosity_level = option_matches.opt_count("v");

	stderrlog::new()
		.module("fixbit")
		.verbosity(2 + verbosity_level)
		.show_level(false)
		.quiet(quiet_mode)
		.color(ColorChoice::Never)
		.init()
		.unwrap();
}

fn print_header() {
	println!(
		"{} {}",
		env!("CARGO_BIN_NAME"),
		env!("CARGO_PKG_VERSION")
	);
	println!("{}", env!("CARGO_PKG_DESCRIPTION"));
}
