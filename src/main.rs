//! mpadec Command Line Interface
//!
//! Probe MPEG audio streams and decode them to WAV or raw PCM.

use clap::{Parser, Subcommand};
use log::{debug, info};
use mpa_rs::encoder::{Encoder, RawEncoder, WavEncoder};
use mpa_rs::{AudioResult, Decoder, DecoderSettings};
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::io::{MediaSource, ReadOnlySource};

#[derive(Parser)]
#[command(name = "mpadec")]
#[command(about = "Streaming MPEG audio decoder", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print stream information
    Probe {
        /// Input audio file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Read the input as a non-seekable stream
        #[arg(long)]
        stream: bool,
    },

    /// Decode to 16-bit stereo WAV (or raw PCM)
    Decode {
        /// Input audio file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Write headerless little-endian PCM instead of WAV
        #[arg(long)]
        raw: bool,

        /// Output volume, clamped to 0.0..=1.0
        #[arg(long, default_value = "1.0")]
        volume: f32,

        /// Start at this fraction of the stream (0.0..=1.0)
        #[arg(short, long)]
        start: Option<f64>,

        /// Frames decoded ahead of the start point to prime the decoder
        #[arg(long, default_value = "4")]
        lookback: usize,

        /// Read the input as a non-seekable stream
        #[arg(long)]
        stream: bool,
    },
}

fn print_info<S: MediaSource>(path: &Path, decoder: &Decoder<S>) {
    let info = decoder.info();
    println!("File:            {}", path.display());
    println!("Sample rate:     {} Hz", info.sample_rate);
    println!("Channels:        {}", info.channels.name());
    println!("Bytes per frame: {}", info.bytes_per_frame);
    match (info.frame_count, info.length, info.duration_secs()) {
        (Some(frames), Some(length), Some(secs)) => {
            println!("Frames:          {}", frames);
            println!("Decoded size:    {} bytes", length);
            println!("Duration:        {:.3} s", secs);
        }
        _ => println!("Length:          unknown (not seekable)"),
    }
}

fn decode_to<S: MediaSource>(
    decoder: &Decoder<S>,
    output: &Path,
    raw: bool,
    start: Option<f64>,
) -> AudioResult<u64> {
    if let Some(fraction) = start {
        let pos = decoder.seek_percent(fraction)?;
        info!("Starting at byte {}", pos);
    }

    let mut encoder: Box<dyn Encoder> = if raw {
        Box::new(RawEncoder::create(output)?)
    } else {
        Box::new(WavEncoder::new(output, decoder.sample_rate())?)
    };

    let mut buf = vec![0u8; 16 * 1024];
    let mut total = 0u64;
    loop {
        let n = decoder.read(&mut buf)?;
        if n == 0 {
            break;
        }
        encoder.write_pcm(&buf[..n])?;
        total += n as u64;
    }
    encoder.finalize()?;
    Ok(total)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    debug!("mpadec {}", mpa_rs::VERSION);

    match cli.command {
        Commands::Probe { input, stream } => {
            let file = File::open(&input)?;
            if stream {
                let decoder = Decoder::new(ReadOnlySource::new(file))?;
                print_info(&input, &decoder);
            } else {
                let decoder = Decoder::new(file)?;
                print_info(&input, &decoder);
            }
        }
        Commands::Decode {
            input,
            output,
            raw,
            volume,
            start,
            lookback,
            stream,
        } => {
            let settings = DecoderSettings::default()
                .with_volume(volume)
                .with_lookback_frames(lookback);
            let file = File::open(&input)?;
            let written = if stream {
                let decoder = Decoder::with_settings(ReadOnlySource::new(file), settings)?;
                decode_to(&decoder, &output, raw, start)?
            } else {
                let decoder = Decoder::with_settings(file, settings)?;
                decode_to(&decoder, &output, raw, start)?
            };
            info!("Wrote {} bytes of PCM to {}", written, output.display());
        }
    }

    Ok(())
}
