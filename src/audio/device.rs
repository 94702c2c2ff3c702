//! Audio device host integration
//!
//! Wires processor nodes to cpal streams. The render callback drains an
//! `AudioRenderNode` and the input callback feeds a `CaptureProcessor`;
//! neither callback allocates for the playback path.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::audio::node::{AudioRenderNode, CaptureProcessor, CaptureSink};
use crate::config::AudioConfig;
use crate::error::AudioError;

/// Names of the devices the default host exposes
#[derive(Debug, Clone, Default)]
pub struct DeviceList {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub default_input: Option<String>,
    pub default_output: Option<String>,
}

/// List available audio devices on the default host
pub fn list_devices() -> Result<DeviceList, AudioError> {
    let host = cpal::default_host();

    let inputs = host
        .input_devices()
        .map_err(|e| AudioError::CpalError(format!("Failed to enumerate inputs: {}", e)))?
        .filter_map(|d| d.name().ok())
        .collect();
    let outputs = host
        .output_devices()
        .map_err(|e| AudioError::CpalError(format!("Failed to enumerate outputs: {}", e)))?
        .filter_map(|d| d.name().ok())
        .collect();

    Ok(DeviceList {
        inputs,
        outputs,
        default_input: host.default_input_device().and_then(|d| d.name().ok()),
        default_output: host.default_output_device().and_then(|d| d.name().ok()),
    })
}

/// Build the stream config requested by the application
pub fn stream_config(config: &AudioConfig) -> StreamConfig {
    StreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Fixed(config.block_size),
    }
}

fn device_name(device: &cpal::Device) -> String {
    device.name().unwrap_or_else(|_| "Unknown".to_string())
}

/// Open the default output device and drive `node` from its render callback.
///
/// The returned stream must be kept alive for playback to continue.
pub fn start_output_stream(
    node: Arc<dyn AudioRenderNode>,
    config: &AudioConfig,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::DeviceNotFound("No output device available".into()))?;

    let stream_config = stream_config(config);
    debug!("Output device {}: {:?}", device_name(&device), stream_config);

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                node.on_render_block(data);
            },
            move |err| {
                error!("Audio playback error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(format!("Failed to build output stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| AudioError::StreamError(format!("Failed to start output stream: {}", e)))?;

    info!(
        "Playback started on {}: {}Hz, {} channels, {} frames/block",
        device_name(&device),
        config.sample_rate,
        config.channels,
        config.block_size
    );
    Ok(stream)
}

/// Open the default input device and feed every captured frame to `capture`.
///
/// The returned stream must be kept alive for capture to continue.
pub fn start_input_stream<S>(
    mut capture: CaptureProcessor<S>,
    config: &AudioConfig,
) -> Result<cpal::Stream, AudioError>
where
    S: CaptureSink + 'static,
{
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| AudioError::DeviceNotFound("No input device available".into()))?;

    let stream_config = stream_config(config);
    debug!("Input device {}: {:?}", device_name(&device), stream_config);

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                capture.process(data);
            },
            move |err| {
                error!("Audio capture error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(format!("Failed to build input stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| AudioError::StreamError(format!("Failed to start input stream: {}", e)))?;

    info!(
        "Capture started on {}: {}Hz, {} channels",
        device_name(&device),
        config.sample_rate,
        config.channels
    );
    Ok(stream)
}
