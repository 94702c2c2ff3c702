//! 16-bit PCM encoder
//!
//! Converts captured f32 frames into little-endian signed 16-bit words,
//! the wire format carried between the capture and playback halves.

use bytes::{BufMut, Bytes, BytesMut};

/// Scale applied to non-positive samples (negative extent of i16)
pub const NEGATIVE_SCALE: f32 = 32768.0;

/// Scale applied to positive samples (positive extent of i16)
pub const POSITIVE_SCALE: f32 = 32767.0;

/// Bytes per encoded sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// Quantize a single float sample to i16.
///
/// NaN maps to silence and out-of-range values (including infinities)
/// are clamped to [-1.0, 1.0] before scaling. Negative values use the
/// larger negative extent so that -1.0 lands exactly on `i16::MIN`.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }

    let s = sample.clamp(-1.0, 1.0);
    let scaled = if s <= 0.0 {
        s * NEGATIVE_SCALE
    } else {
        s * POSITIVE_SCALE
    };

    scaled.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Encode a frame of float samples into a PCM chunk
pub fn encode(frame: &[f32]) -> Bytes {
    let mut out = BytesMut::with_capacity(frame.len() * BYTES_PER_SAMPLE);
    encode_into(frame, &mut out);
    out.freeze()
}

/// Encode a frame, appending the little-endian words to `out`
pub fn encode_into(frame: &[f32], out: &mut BytesMut) {
    out.reserve(frame.len() * BYTES_PER_SAMPLE);
    for &sample in frame {
        out.put_i16_le(sample_to_i16(sample));
    }
}

/// PCM encoder for a single capture stream.
///
/// Conversion is stateless; the struct only keeps counters so the
/// capture side can report what it has produced.
#[derive(Debug, Default)]
pub struct PcmEncoder {
    /// Frames encoded
    frames_encoded: u64,
    /// Total bytes produced
    bytes_produced: u64,
    /// Samples that were NaN or outside [-1.0, 1.0]
    samples_clipped: u64,
}

impl PcmEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a captured frame
    pub fn encode(&mut self, frame: &[f32]) -> Bytes {
        let clipped = frame
            .iter()
            .filter(|s| s.is_nan() || s.abs() > 1.0)
            .count();

        let chunk = encode(frame);

        self.frames_encoded += 1;
        self.bytes_produced += chunk.len() as u64;
        self.samples_clipped += clipped as u64;

        chunk
    }

    /// Get statistics
    pub fn stats(&self) -> EncoderStats {
        EncoderStats {
            frames_encoded: self.frames_encoded,
            bytes_produced: self.bytes_produced,
            samples_clipped: self.samples_clipped,
        }
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.frames_encoded = 0;
        self.bytes_produced = 0;
        self.samples_clipped = 0;
    }
}

/// Encoder statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderStats {
    pub frames_encoded: u64,
    pub bytes_produced: u64,
    pub samples_clipped: u64,
}
