//! PCM Receiver Application
//!
//! Reads raw 16-bit little-endian PCM from stdin and plays it on the
//! default output device.
//!
//! Usage: `receiver [config.toml]`

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pcm_stream_bridge::{
    audio::{create_shared_buffer, device, AudioRenderNode, MessageChannel, PlaybackProcessor},
    config::AppConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    // Initialize logging (stderr, stdin carries audio)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting PCM Receiver");

    let buffer = create_shared_buffer(config.playback_capacity_samples());
    let processor = Arc::new(PlaybackProcessor::new(
        buffer,
        config.audio.samples_per_block(),
    ));

    let render_node: Arc<dyn AudioRenderNode> = processor.clone();
    let _stream = device::start_output_stream(render_node, &config.audio)?;

    tracing::info!(
        "Output block: {} samples ({:.1}ms), buffer cap: {:?}",
        processor.block_size(),
        config.audio.block_latency_ms(),
        config.playback_capacity_samples()
    );

    // Message delivery: stdin reader task posts chunks to the playback side
    let (chunk_tx, mut chunk_rx) = mpsc::channel::<Vec<u8>>(64);
    let chunk_bytes = config.playback.chunk_bytes;
    let reader = tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin());
        loop {
            let mut chunk = vec![0u8; chunk_bytes];
            let n = match stdin.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            };
            chunk.truncate(n);
            if chunk_tx.send(chunk).await.is_err() {
                break;
            }
        }
    });

    let mut stats_interval =
        tokio::time::interval(Duration::from_secs(config.playback.stats_interval_secs.max(1)));
    // Bytes left over when a read ends mid-sample
    let mut carry: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            chunk = chunk_rx.recv() => {
                let Some(chunk) = chunk else {
                    tracing::info!("Input closed");
                    break;
                };

                carry.extend_from_slice(&chunk);
                let whole = carry.len() - carry.len() % 2;
                if let Err(e) = processor.on_message(&carry[..whole]) {
                    tracing::warn!("Dropping chunk: {}", e);
                }
                carry.drain(..whole);
            }
            _ = stats_interval.tick() => {
                let stats = processor.buffer_stats();
                let decoder = processor.decoder_stats();
                tracing::info!(
                    "Playback stats: {:?}, {} buffered, {} underruns, {} dropped, {} chunks ({} rejected)",
                    stats.state,
                    stats.buffered,
                    stats.underruns,
                    stats.dropped,
                    decoder.chunks_decoded,
                    decoder.chunks_rejected
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping playback");
                processor.stop();
                reader.abort();
                return Ok(());
            }
        }
    }

    // Let the buffered tail play out
    while processor.buffer().is_playing() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    processor.stop();

    tracing::info!("Playback finished");
    Ok(())
}
