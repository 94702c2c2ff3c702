//! 16-bit PCM decoder
//!
//! Turns received chunks back into f32 samples in device range.

use crate::codec::encoder::{BYTES_PER_SAMPLE, NEGATIVE_SCALE};
use crate::error::CodecError;

/// Convert a single i16 sample to f32.
///
/// Both signs divide by the negative extent, so the result is always
/// within [-1.0, 1.0) and never overshoots on `i16::MAX`.
#[inline]
pub fn sample_to_f32(sample: i16) -> f32 {
    sample as f32 / NEGATIVE_SCALE
}

/// Decode a PCM chunk into float samples
pub fn decode(chunk: &[u8]) -> Result<Vec<f32>, CodecError> {
    let mut out = Vec::with_capacity(chunk.len() / BYTES_PER_SAMPLE);
    decode_into(chunk, &mut out)?;
    Ok(out)
}

/// Decode a PCM chunk, appending the samples to `out`.
///
/// On error nothing is appended.
pub fn decode_into(chunk: &[u8], out: &mut Vec<f32>) -> Result<(), CodecError> {
    if chunk.len() % BYTES_PER_SAMPLE != 0 {
        return Err(CodecError::MalformedChunk { len: chunk.len() });
    }

    out.extend(
        chunk
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|word| sample_to_f32(i16::from_le_bytes([word[0], word[1]]))),
    );
    Ok(())
}

/// PCM decoder for a single playback stream
#[derive(Debug, Default)]
pub struct PcmDecoder {
    /// Chunks decoded
    chunks_decoded: u64,
    /// Total samples produced
    samples_produced: u64,
    /// Chunks rejected as malformed
    chunks_rejected: u64,
}

impl PcmDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a received chunk
    pub fn decode(&mut self, chunk: &[u8]) -> Result<Vec<f32>, CodecError> {
        match decode(chunk) {
            Ok(samples) => {
                self.chunks_decoded += 1;
                self.samples_produced += samples.len() as u64;
                Ok(samples)
            }
            Err(e) => {
                self.chunks_rejected += 1;
                Err(e)
            }
        }
    }

    /// Get statistics
    pub fn stats(&self) -> DecoderStats {
        DecoderStats {
            chunks_decoded: self.chunks_decoded,
            samples_produced: self.samples_produced,
            chunks_rejected: self.chunks_rejected,
        }
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.chunks_decoded = 0;
        self.samples_produced = 0;
        self.chunks_rejected = 0;
    }
}

/// Decoder statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub chunks_decoded: u64,
    pub samples_produced: u64,
    pub chunks_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::encode;
    use proptest::prelude::*;

    const STEP: f32 = 1.0 / 32768.0;

    #[test]
    fn test_decode_words() {
        let bytes: [u8; 8] = [0xFF, 0x7F, 0x00, 0x80, 0x00, 0x00, 0x00, 0x40];
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, vec![32767.0 / 32768.0, -1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_odd_length_rejected() {
        assert_eq!(decode(&[0x00]), Err(CodecError::MalformedChunk { len: 1 }));
        assert_eq!(decode(&[0, 0, 0]), Err(CodecError::MalformedChunk { len: 3 }));
    }

    #[test]
    fn test_decode_into_untouched_on_error() {
        let mut out = vec![0.25];
        assert!(decode_into(&[1, 2, 3], &mut out).is_err());
        assert_eq!(out, vec![0.25]);

        decode_into(&[0x00, 0xC0], &mut out).unwrap();
        assert_eq!(out, vec![0.25, -0.5]);
    }

    #[test]
    fn test_empty_chunk() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_extremes_stay_in_range() {
        let decoded = decode(&encode(&[1.0, -1.0])).unwrap();
        assert!(decoded.iter().all(|s| s.abs() <= 1.0));
        assert_eq!(decoded[1], -1.0);
        assert!((decoded[0] - 0.99997).abs() < 1e-5);
    }

    #[test]
    fn test_decoder_stats() {
        let mut decoder = PcmDecoder::new();
        decoder.decode(&[0, 0, 0, 0]).unwrap();
        assert!(decoder.decode(&[0]).is_err());

        let stats = decoder.stats();
        assert_eq!(stats.chunks_decoded, 1);
        assert_eq!(stats.samples_produced, 2);
        assert_eq!(stats.chunks_rejected, 1);

        decoder.reset_stats();
        assert_eq!(decoder.stats(), DecoderStats::default());
    }

    proptest! {
        #[test]
        fn prop_roundtrip_non_positive(s in -1.0f32..=0.0) {
            let decoded = decode(&encode(&[s])).unwrap();
            prop_assert!((decoded[0] - s).abs() <= STEP);
        }

        // The positive side is scaled by 32767 but decoded by 32768,
        // so the gain mismatch adds up to one step on top of rounding.
        #[test]
        fn prop_roundtrip_positive(s in 0.0f32..=1.0) {
            let decoded = decode(&encode(&[s])).unwrap();
            prop_assert!((decoded[0] - s).abs() <= 1.5 * STEP + f32::EPSILON);
            prop_assert!(decoded[0] <= 1.0);
        }

        #[test]
        fn prop_any_input_decodes_in_range(frame in proptest::collection::vec(any::<f32>(), 0..64)) {
            let encoded = encode(&frame);
            prop_assert_eq!(encoded.len(), frame.len() * 2);
            let decoded = decode(&encoded).unwrap();
            prop_assert!(decoded.iter().all(|s| (-1.0..=1.0).contains(s)));
        }
    }
}
