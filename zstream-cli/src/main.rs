//! zstream CLI
//!
//! Streaming Zstandard compression from the command line.

mod utils;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use utils::{compressed_path, create_progress_bar, decompressed_path, savings_percent};
use zstream::{
    CodecOptions, CompressionLevel, Dictionary, StreamConfig, StreamReader, StreamWriter,
};

#[derive(Parser)]
#[command(name = "zstream")]
#[command(author, version, about = "Streaming Zstandard compression")]
#[command(long_about = "
zstream compresses and decompresses files as a stream, one bounded buffer at a
time, so memory use stays flat regardless of file size.

Examples:
  zstream compress data.log
  zstream compress data.log -o data.zst --best
  zstream decompress data.log.zst
  zstream test data.log.zst
  zstream info data.log.zst --json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: <input>.zst)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level (1-22)
        #[arg(
            short,
            long,
            default_value_t = 3,
            value_parser = clap::value_parser!(i32).range(1..=22),
            conflicts_with_all = ["fast", "best"]
        )]
        level: i32,

        /// Fastest compression
        #[arg(long, conflicts_with = "best")]
        fast: bool,

        /// Best practical compression
        #[arg(long)]
        best: bool,

        /// Append a content checksum to the frame
        #[arg(long)]
        checksum: bool,

        /// Pre-trained dictionary file
        #[arg(short = 'D', long)]
        dict: Option<PathBuf>,

        /// Staging buffer size in bytes
        #[arg(long)]
        buffer_size: Option<usize>,
    },

    /// Decompress a file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: <input> without .zst)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pre-trained dictionary file
        #[arg(short = 'D', long)]
        dict: Option<PathBuf>,

        /// Fail if the output would exceed this many bytes
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Test that a file decompresses cleanly
    #[command(alias = "t")]
    Test {
        /// File to test
        input: PathBuf,

        /// Pre-trained dictionary file
        #[arg(short = 'D', long)]
        dict: Option<PathBuf>,

        /// Fail if the output would exceed this many bytes
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Show frame information
    #[command(alias = "i")]
    Info {
        /// File to inspect
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Show crate and engine versions
    Version,
}

/// Frame facts reported by `info`.
#[derive(Debug, Serialize)]
struct FrameReport {
    file: String,
    file_size: u64,
    content_size: Option<u64>,
    dictionary_id: Option<u32>,
    frame_size: Option<usize>,
    savings_percent: Option<f64>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.quiet, cli.verbose);
    let progress = !cli.quiet;

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            fast,
            best,
            checksum,
            dict,
            buffer_size,
        } => {
            let level = if fast {
                Ok(CompressionLevel::FAST)
            } else if best {
                Ok(CompressionLevel::BEST)
            } else {
                CompressionLevel::new(level)
            };
            level.map_err(Into::into).and_then(|level| {
                let options = CodecOptions::default()
                    .with_level(level)
                    .with_checksum(checksum);
                let output = output.unwrap_or_else(|| compressed_path(&input));
                cmd_compress(
                    &input,
                    &output,
                    options,
                    dict.as_deref(),
                    buffer_size,
                    progress,
                )
            })
        }
        Commands::Decompress {
            input,
            output,
            dict,
            max_size,
        } => {
            let output = output.unwrap_or_else(|| decompressed_path(&input));
            cmd_decompress(&input, &output, dict.as_deref(), max_size, progress)
        }
        Commands::Test {
            input,
            dict,
            max_size,
        } => cmd_test(&input, dict.as_deref(), max_size),
        Commands::Info { input, json } => cmd_info(&input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool, quiet: bool, verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_dictionary(path: Option<&Path>) -> Result<Option<Dictionary>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            let dict = Dictionary::load(&bytes)?;
            debug!(path = %path.display(), id = ?dict.id(), "loaded dictionary");
            Ok(Some(dict))
        }
        None => Ok(None),
    }
}

fn open_reader(
    input: &Path,
    dict: Option<&Path>,
    max_size: Option<usize>,
    progress: bool,
) -> Result<(StreamReader<impl Read>, indicatif::ProgressBar), Box<dyn std::error::Error>> {
    let file = File::open(input)?;
    let pb = create_progress_bar(file.metadata()?.len(), progress);

    let mut options = CodecOptions::default();
    if let Some(limit) = max_size {
        options = options.with_max_decompress_size(limit);
    }
    let source = pb.wrap_read(BufReader::new(file));
    let mut reader = StreamReader::with_config(source, options, StreamConfig::default())?;
    if let Some(dict) = load_dictionary(dict)? {
        reader = reader.dictionary(dict);
    }
    Ok((reader, pb))
}

fn cmd_compress(
    input: &Path,
    output: &Path,
    options: CodecOptions,
    dict: Option<&Path>,
    buffer_size: Option<usize>,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(input)?;
    let original = file.metadata()?.len();
    let pb = create_progress_bar(original, progress);
    let mut source = pb.wrap_read(BufReader::new(file));

    let mut config = StreamConfig::default();
    if let Some(size) = buffer_size {
        config = config.with_capacity(size);
    }

    let sink = BufWriter::new(File::create(output)?);
    let mut writer = StreamWriter::with_config(sink, options, config)?;
    if let Some(dict) = load_dictionary(dict)? {
        writer = writer.dictionary(dict);
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        level = options.level.level(),
        "compressing"
    );
    let copied = io::copy(&mut source, &mut writer)?;
    let compressed = writer.total_out();
    writer.finish()?;
    pb.finish_and_clear();

    if progress {
        println!(
            "{} -> {} ({} -> {} bytes, {:.1}% saved)",
            input.display(),
            output.display(),
            copied,
            compressed,
            savings_percent(copied, compressed)
        );
    }
    Ok(())
}

fn cmd_decompress(
    input: &Path,
    output: &Path,
    dict: Option<&Path>,
    max_size: Option<usize>,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut reader, pb) = open_reader(input, dict, max_size, progress)?;
    let mut sink = BufWriter::new(File::create(output)?);

    info!(input = %input.display(), output = %output.display(), "decompressing");
    let written = io::copy(&mut reader, &mut sink)?;
    io::Write::flush(&mut sink)?;
    reader.close()?;
    pb.finish_and_clear();

    if progress {
        println!(
            "{} -> {} ({} bytes)",
            input.display(),
            output.display(),
            written
        );
    }
    Ok(())
}

fn cmd_test(
    input: &Path,
    dict: Option<&Path>,
    max_size: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut reader, pb) = open_reader(input, dict, max_size, false)?;
    let written = io::copy(&mut reader, &mut io::sink())?;
    let compressed = reader.total_in();
    reader.close()?;
    pb.finish_and_clear();

    println!("{}: OK ({} -> {} bytes)", input.display(), compressed, written);
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let info = zstream_native::frame_info(&data)?;

    let report = FrameReport {
        file: input.display().to_string(),
        file_size: data.len() as u64,
        content_size: info.content_size,
        dictionary_id: info.dictionary_id,
        frame_size: info.compressed_size,
        savings_percent: info
            .content_size
            .map(|size| savings_percent(size, data.len() as u64)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Frame Information");
    println!("=================");
    println!("File: {}", report.file);
    println!("Size: {} bytes", report.file_size);
    match report.content_size {
        Some(size) => println!("Content size: {} bytes", size),
        None => println!("Content size: unknown (streamed frame)"),
    }
    if let Some(id) = report.dictionary_id {
        println!("Dictionary ID: {}", id);
    }
    match report.frame_size {
        Some(size) => println!("First frame: {} bytes", size),
        None => println!("First frame: incomplete"),
    }
    if let Some(saved) = report.savings_percent {
        println!("Compression ratio: {:.1}%", saved);
    }
    Ok(())
}

fn cmd_version() {
    println!("zstream {}", zstream_native::crate_version());
    println!(
        "libzstd {} ({})",
        zstream_native::version_string(),
        zstream_native::version_number()
    );
}
