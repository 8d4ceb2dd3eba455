#[macro_use]
extern crate log;

use anyhow::{Context, Result};
use clap::Parser;
use pcm_fifo::{
    config::{self, Verbosity},
    host::HwParams,
    player::Player,
    ring::RingHost,
    session::Session,
    sink, wav,
};
use std::path::PathBuf;

/// Streams a WAV file into a named pipe through the fifo plugin engine
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Plugin configuration
    #[arg(short, long, default_value = "Config.toml")]
    config: PathBuf,

    /// Create the fifo if it does not exist yet
    #[arg(long)]
    create_fifo: bool,

    /// Ring buffer size in frames
    #[arg(long, default_value_t = 4096)]
    buffer_frames: u64,

    /// Period size in frames
    #[arg(long, default_value_t = 1024)]
    period_frames: u64,

    /// WAV file to stream
    input: PathBuf,
}

fn init_logging(verbosity: Verbosity) {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(verbosity.log_filter());

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = config::load(&args.config)
        .await
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    init_logging(config.verbosity());

    if args.create_fifo && !config.fifo.exists() {
        sink::create_fifo(&config.fifo)?;
        info!("Created fifo {}", config.fifo.display());
    }

    let input = args.input.clone();
    let pcm = tokio::task::spawn_blocking(move || wav::open(input))
        .await?
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;

    let params = HwParams {
        format: pcm.format,
        channels: pcm.channels,
        rate: pcm.rate,
        buffer_size: args.buffer_frames,
        period_size: args.period_frames,
    };

    let session = Session::open(&config)
        .with_context(|| format!("Failed to open fifo {}", config.fifo.display()))?;
    session
        .capabilities()
        .check(&params)
        .context("Unsupported stream parameters")?;

    let host = RingHost::with_default_boundary(params)?;
    let mut player = Player::new(session, host);

    let result = tokio::select! {
        result = player.play(&pcm.data) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, dropping the stream");
            player.stop()
        }
    };

    player.close();
    result?;

    info!("Playback finished");
    Ok(())
}
