//! PCM Sender Application
//!
//! Captures the default input device and writes raw 16-bit
//! little-endian PCM chunks to stdout.
//!
//! Usage: `sender [config.toml] | receiver [config.toml]`

use anyhow::{Context, Result};
use bytes::Bytes;
use crossbeam_channel::bounded;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pcm_stream_bridge::{
    audio::{device, CaptureProcessor},
    config::AppConfig,
    constants::CAPTURE_CHANNEL_CAPACITY,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    // Initialize logging (stderr, stdout carries audio)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting PCM Sender");

    let devices = device::list_devices()?;
    tracing::info!("Input devices: {:?}", devices.inputs);
    tracing::info!("Default input: {:?}", devices.default_input);

    let (chunk_tx, chunk_rx) = bounded::<Bytes>(CAPTURE_CHANNEL_CAPACITY);
    let capture = CaptureProcessor::new(chunk_tx);
    let _stream = device::start_input_stream(capture, &config.audio)?;

    let mut stdout = tokio::io::stdout();
    let mut chunks_sent: u64 = 0;
    let mut bytes_sent: u64 = 0;
    let mut last_stats_time = Instant::now();
    let stats_interval = Duration::from_secs(config.playback.stats_interval_secs.max(1));

    tracing::info!("Streaming - press Ctrl+C to stop");

    loop {
        while let Ok(chunk) = chunk_rx.try_recv() {
            if let Err(e) = stdout.write_all(&chunk).await {
                // Downstream closed the pipe
                tracing::info!("Output closed: {}", e);
                return Ok(());
            }
            chunks_sent += 1;
            bytes_sent += chunk.len() as u64;
        }
        stdout.flush().await?;

        if last_stats_time.elapsed() >= stats_interval {
            last_stats_time = Instant::now();
            tracing::info!(
                "Stats: {} chunks sent, {:.1} KB sent",
                chunks_sent,
                bytes_sent as f64 / 1024.0
            );
        }

        tokio::select! {
            // Small sleep to prevent busy-waiting
            _ = tokio::time::sleep(Duration::from_millis(1)) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping capture");
                return Ok(());
            }
        }
    }
}
