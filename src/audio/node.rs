//! Processor nodes
//!
//! The host audio layer talks to the core through two seams: a render
//! callback that asks for the next output block, and a message channel
//! that delivers received PCM chunks. Processors are constructed
//! explicitly by the host integration and handed to it; nothing is
//! registered globally.

use bytes::Bytes;
use crossbeam_channel::{Sender, TrySendError};
use parking_lot::Mutex;
use tracing::warn;

use crate::audio::buffer::{BufferStats, SharedPlaybackBuffer};
use crate::codec::{DecoderStats, EncoderStats, PcmDecoder, PcmEncoder};
use crate::error::CodecError;

/// Output side of a host render cycle
pub trait AudioRenderNode: Send + Sync {
    /// Block size fixed by the device for the node's lifetime
    fn block_size(&self) -> usize;

    /// Fill one output block
    fn on_render_block(&self, out: &mut [f32]);
}

/// Receives raw chunks from the message-delivery side
pub trait MessageChannel: Send + Sync {
    fn on_message(&self, bytes: &[u8]) -> Result<(), CodecError>;
}

/// Destination for encoded capture chunks
pub trait CaptureSink: Send {
    /// Post a chunk; returns false if it could not be delivered
    fn post(&self, chunk: Bytes) -> bool;
}

impl CaptureSink for Sender<Bytes> {
    fn post(&self, chunk: Bytes) -> bool {
        match self.try_send(chunk) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Capture channel full, dropping chunk");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Playback processor: decodes incoming chunks into the playback buffer
/// and drains it on every render callback
pub struct PlaybackProcessor {
    buffer: SharedPlaybackBuffer,
    decoder: Mutex<PcmDecoder>,
    block_size: usize,
}

impl PlaybackProcessor {
    pub fn new(buffer: SharedPlaybackBuffer, block_size: usize) -> Self {
        Self {
            buffer,
            decoder: Mutex::new(PcmDecoder::new()),
            block_size,
        }
    }

    /// Take one block of exactly `block_size` samples
    pub fn render_block(&self) -> Vec<f32> {
        self.buffer.drain(self.block_size)
    }

    /// Discard pending audio immediately
    pub fn stop(&self) {
        self.buffer.stop();
    }

    pub fn buffer(&self) -> &SharedPlaybackBuffer {
        &self.buffer
    }

    pub fn buffer_stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.lock().stats()
    }
}

impl AudioRenderNode for PlaybackProcessor {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn on_render_block(&self, out: &mut [f32]) {
        self.buffer.drain_into(out);
    }
}

impl MessageChannel for PlaybackProcessor {
    fn on_message(&self, bytes: &[u8]) -> Result<(), CodecError> {
        // Decode outside the buffer lock so the render side is never held up
        let samples = self.decoder.lock().decode(bytes)?;
        self.buffer.enqueue(&samples);
        Ok(())
    }
}

/// Capture processor: encodes each captured frame and posts it
pub struct CaptureProcessor<S: CaptureSink> {
    encoder: PcmEncoder,
    sink: S,
    chunks_dropped: u64,
}

impl<S: CaptureSink> CaptureProcessor<S> {
    pub fn new(sink: S) -> Self {
        Self {
            encoder: PcmEncoder::new(),
            sink,
            chunks_dropped: 0,
        }
    }

    /// Encode one captured frame and hand it to the sink
    pub fn process(&mut self, frame: &[f32]) {
        if frame.is_empty() {
            return;
        }

        let chunk = self.encoder.encode(frame);
        if !self.sink.post(chunk) {
            self.chunks_dropped += 1;
        }
    }

    pub fn encoder_stats(&self) -> EncoderStats {
        self.encoder.stats()
    }

    pub fn chunks_dropped(&self) -> u64 {
        self.chunks_dropped
    }
}
