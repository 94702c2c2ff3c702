//! 16-bit PCM codec
//!
//! Pure sample-format conversion between the f32 frames the audio
//! devices work in and the little-endian i16 chunks sent on the wire.

pub mod encoder;
pub mod decoder;

pub use encoder::{encode, encode_into, sample_to_i16, EncoderStats, PcmEncoder};
pub use decoder::{decode, decode_into, sample_to_f32, DecoderStats, PcmDecoder};
