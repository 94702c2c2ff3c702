//! Audio subsystem module

pub mod buffer;
pub mod device;
pub mod node;

pub use buffer::{create_shared_buffer, BufferStats, PlaybackBuffer, PlaybackState, SharedPlaybackBuffer};
pub use device::{list_devices, start_input_stream, start_output_stream, DeviceList};
pub use node::{AudioRenderNode, CaptureProcessor, CaptureSink, MessageChannel, PlaybackProcessor};
