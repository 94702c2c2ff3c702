//! # PCM Stream Bridge
//!
//! Real-time 16-bit PCM streaming between a capture source and a live
//! output device.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────── CAPTURE ─────────────────────────────┐
//! │  ┌─────────────┐   ┌──────────────────┐   ┌──────────────────┐   │
//! │  │ Input cb    │──▶│ CaptureProcessor │──▶│ CaptureSink      │   │
//! │  │ (f32 frame) │   │  codec::encode   │   │ (i16 LE chunks)  │   │
//! │  └─────────────┘   └──────────────────┘   └────────┬─────────┘   │
//! └────────────────────────────────────────────────────┼─────────────┘
//!                                                      │ external channel
//! ┌──────────────────────────── PLAYBACK ──────────────┼─────────────┐
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌───▼──────────┐  │
//! │  │ Output cb        │◀──│ PlaybackBuffer   │◀──│ on_message   │  │
//! │  │ drain(block)     │   │ FIFO Idle/Playing│   │ codec::decode│  │
//! │  └──────────────────┘   └──────────────────┘   └──────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod codec;
pub mod config;
pub mod error;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Default sample rate for audio processing
    pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

    /// Default channel count (mono)
    pub const DEFAULT_CHANNELS: u16 = 1;

    /// Default device block size in frames
    pub const DEFAULT_BLOCK_SIZE: u32 = 256;

    /// Default bytes read per incoming chunk (10ms of mono 48kHz)
    pub const DEFAULT_CHUNK_BYTES: usize = 960;

    /// Capacity of the capture chunk channel
    pub const CAPTURE_CHANNEL_CAPACITY: usize = 256;
}
