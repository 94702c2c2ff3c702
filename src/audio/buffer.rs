//! Streaming playback buffer
//!
//! A FIFO of decoded f32 samples shared between the message-arrival side
//! (producer, `enqueue`) and the device render callback (consumer,
//! `drain`). The queue and the playing flag live under one short-held
//! mutex; counters are atomics so stats can be read without locking.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Playback state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing buffered, render callbacks produce silence
    Idle,
    /// Draining buffered samples on each render callback
    Playing,
}

struct Inner {
    queue: VecDeque<f32>,
    playing: bool,
}

/// FIFO playback buffer with Idle/Playing state.
///
/// `drain` always fills the whole block: buffered samples first, then
/// silence for any shortfall. The buffer goes Idle exactly when the
/// queue runs empty and resumes on the next non-empty `enqueue`.
pub struct PlaybackBuffer {
    inner: Mutex<Inner>,
    /// Optional cap in samples; oldest samples are dropped beyond it
    capacity_limit: Option<usize>,
    enqueued: AtomicU64,
    drained: AtomicU64,
    dropped: AtomicU64,
    underruns: AtomicU64,
}

impl PlaybackBuffer {
    /// Create an empty, unbounded buffer
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an empty buffer holding at most `limit` samples.
    ///
    /// When an enqueue would exceed the limit the oldest samples are
    /// discarded so latency stays bounded.
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self::build(Some(limit.max(1)))
    }

    fn build(capacity_limit: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                playing: false,
            }),
            capacity_limit,
            enqueued: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            underruns: AtomicU64::new(0),
        }
    }

    /// Append decoded samples to the tail of the queue
    pub fn enqueue(&self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let (resumed, dropped) = {
            let mut inner = self.inner.lock();
            inner.queue.extend(samples.iter().copied());

            let mut dropped = 0;
            if let Some(limit) = self.capacity_limit {
                if inner.queue.len() > limit {
                    dropped = inner.queue.len() - limit;
                    inner.queue.drain(..dropped);
                }
            }

            let resumed = !inner.playing;
            inner.playing = true;
            (resumed, dropped)
        };

        self.enqueued.fetch_add(samples.len() as u64, Ordering::Relaxed);
        if dropped > 0 {
            self.dropped.fetch_add(dropped as u64, Ordering::Relaxed);
            debug!("Playback buffer over limit, dropped {} oldest samples", dropped);
        }
        if resumed {
            debug!("Playback buffer: Idle -> Playing");
        }
    }

    /// Fill `out` with the next samples, padding any shortfall with silence.
    ///
    /// Returns the number of buffered samples written. Never allocates,
    /// so it is safe to call from the render callback.
    pub fn drain_into(&self, out: &mut [f32]) -> usize {
        let mut inner = self.inner.lock();

        if !inner.playing {
            drop(inner);
            out.fill(0.0);
            return 0;
        }

        let n = inner.queue.len().min(out.len());
        for (dst, src) in out[..n].iter_mut().zip(inner.queue.drain(..n)) {
            *dst = src;
        }
        let emptied = inner.queue.is_empty();
        if emptied {
            inner.playing = false;
        }
        drop(inner);

        out[n..].fill(0.0);

        self.drained.fetch_add(n as u64, Ordering::Relaxed);
        if n < out.len() {
            self.underruns.fetch_add(1, Ordering::Relaxed);
            trace!("Playback underrun: {} of {} samples available", n, out.len());
        }
        if emptied {
            trace!("Playback buffer: Playing -> Idle");
        }

        n
    }

    /// Take exactly `block_size` samples, zero-padded on underrun
    pub fn drain(&self, block_size: usize) -> Vec<f32> {
        let mut block = vec![0.0; block_size];
        self.drain_into(&mut block);
        block
    }

    /// Discard everything buffered and go Idle
    pub fn stop(&self) {
        let discarded = {
            let mut inner = self.inner.lock();
            let discarded = inner.queue.len();
            inner.queue.clear();
            inner.playing = false;
            discarded
        };

        if discarded > 0 {
            debug!("Playback stopped, discarded {} samples", discarded);
        }
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        if self.inner.lock().playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Configured sample cap, if any
    pub fn capacity_limit(&self) -> Option<usize> {
        self.capacity_limit
    }

    /// Get statistics
    pub fn stats(&self) -> BufferStats {
        let (state, buffered) = {
            let inner = self.inner.lock();
            let state = if inner.playing {
                PlaybackState::Playing
            } else {
                PlaybackState::Idle
            };
            (state, inner.queue.len())
        };

        BufferStats {
            state,
            buffered,
            enqueued: self.enqueued.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
        }
    }

    /// Reset statistics
    pub fn reset_stats(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.drained.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.underruns.store(0, Ordering::Relaxed);
    }
}

impl Default for PlaybackBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback buffer statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
    pub state: PlaybackState,
    /// Samples currently queued
    pub buffered: usize,
    /// Samples accepted by `enqueue`
    pub enqueued: u64,
    /// Buffered samples handed to the device
    pub drained: u64,
    /// Samples discarded by the capacity limit
    pub dropped: u64,
    /// Drains that had to pad with silence while playing
    pub underruns: u64,
}

/// Thread-safe handle to a playback buffer
pub type SharedPlaybackBuffer = Arc<PlaybackBuffer>;

/// Create a new shared playback buffer
pub fn create_shared_buffer(capacity_limit: Option<usize>) -> SharedPlaybackBuffer {
    Arc::new(match capacity_limit {
        Some(limit) => PlaybackBuffer::with_capacity_limit(limit),
        None => PlaybackBuffer::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn test_drain_scenario() {
        let buffer = PlaybackBuffer::new();
        buffer.enqueue(&[0.5; 10]);
        assert_eq!(buffer.state(), PlaybackState::Playing);

        assert_eq!(buffer.drain(4), vec![0.5; 4]);
        assert!(buffer.is_playing());
        assert_eq!(buffer.drain(4), vec![0.5; 4]);
        assert!(buffer.is_playing());
        assert_eq!(buffer.drain(4), vec![0.5, 0.5, 0.0, 0.0]);
        assert_eq!(buffer.state(), PlaybackState::Idle);
        assert!(buffer.is_empty());

        let stats = buffer.stats();
        assert_eq!(stats.enqueued, 10);
        assert_eq!(stats.drained, 10);
        assert_eq!(stats.underruns, 1);
    }

    #[test]
    fn test_idle_drain_is_silence() {
        let buffer = PlaybackBuffer::new();
        let block = buffer.drain(256);
        assert_eq!(block.len(), 256);
        assert!(block.iter().all(|&s| s == 0.0));
        assert_eq!(buffer.state(), PlaybackState::Idle);
        assert_eq!(buffer.stats().underruns, 0);
    }

    #[test]
    fn test_exact_block_goes_idle() {
        let buffer = PlaybackBuffer::new();
        buffer.enqueue(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(buffer.drain(4), vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(buffer.state(), PlaybackState::Idle);
        assert_eq!(buffer.stats().underruns, 0);
    }

    #[test]
    fn test_resume_after_idle() {
        let buffer = PlaybackBuffer::new();
        buffer.enqueue(&[0.25]);
        buffer.drain(2);
        assert_eq!(buffer.state(), PlaybackState::Idle);

        buffer.enqueue(&[-0.25, 0.75]);
        assert_eq!(buffer.state(), PlaybackState::Playing);
        assert_eq!(buffer.drain(2), vec![-0.25, 0.75]);
    }

    #[test]
    fn test_empty_enqueue_stays_idle() {
        let buffer = PlaybackBuffer::new();
        buffer.enqueue(&[]);
        assert_eq!(buffer.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_stop_idempotent() {
        let buffer = PlaybackBuffer::new();
        buffer.enqueue(&[0.5; 32]);

        buffer.stop();
        assert_eq!(buffer.state(), PlaybackState::Idle);
        assert!(buffer.is_empty());

        buffer.stop();
        assert_eq!(buffer.state(), PlaybackState::Idle);
        assert!(buffer.is_empty());
        assert!(buffer.drain(8).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_capacity_limit_drops_oldest() {
        let buffer = PlaybackBuffer::with_capacity_limit(4);
        buffer.enqueue(&[1.0, 2.0, 3.0]);
        buffer.enqueue(&[4.0, 5.0, 6.0]);

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.stats().dropped, 2);
        assert_eq!(buffer.drain(4), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_drain_into_reports_written() {
        let buffer = PlaybackBuffer::new();
        buffer.enqueue(&[0.5; 3]);

        let mut out = [1.0f32; 5];
        assert_eq!(buffer.drain_into(&mut out), 3);
        assert_eq!(out, [0.5, 0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_reset_stats() {
        let buffer = PlaybackBuffer::new();
        buffer.enqueue(&[0.5; 3]);
        buffer.drain(4);
        buffer.reset_stats();

        let stats = buffer.stats();
        assert_eq!(stats.enqueued, 0);
        assert_eq!(stats.underruns, 0);
    }

    #[test]
    fn test_concurrent_order_preserved() {
        let buffer = create_shared_buffer(None);
        let total = 10_000usize;

        let producer = {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let samples: Vec<f32> = (0..total).map(|i| i as f32).collect();
                for chunk in samples.chunks(37) {
                    buffer.enqueue(chunk);
                    thread::yield_now();
                }
            })
        };

        let mut received = Vec::with_capacity(total);
        let mut block = [0.0f32; 64];
        while received.len() < total {
            let n = buffer.drain_into(&mut block);
            received.extend_from_slice(&block[..n]);
            if n == 0 {
                thread::yield_now();
            }
        }
        producer.join().unwrap();

        let expected: Vec<f32> = (0..total).map(|i| i as f32).collect();
        assert_eq!(received, expected);
    }

    proptest! {
        #[test]
        fn prop_drain_preserves_enqueue_order(
            chunks in proptest::collection::vec(proptest::collection::vec(-1.0f32..1.0, 0..50), 0..20),
            block_size in 1usize..64,
        ) {
            let buffer = PlaybackBuffer::new();
            let expected: Vec<f32> = chunks.iter().flatten().copied().collect();
            for chunk in &chunks {
                buffer.enqueue(chunk);
            }

            let mut received = Vec::new();
            let mut block = vec![0.0f32; block_size];
            loop {
                let n = buffer.drain_into(&mut block);
                received.extend_from_slice(&block[..n]);
                prop_assert!(block[n..].iter().all(|&s| s == 0.0));
                if n < block_size {
                    break;
                }
            }

            prop_assert_eq!(received, expected);
            prop_assert_eq!(buffer.state(), PlaybackState::Idle);
        }
    }
}
