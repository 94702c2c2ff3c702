use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pcm_stream_bridge::audio::PlaybackBuffer;
use pcm_stream_bridge::codec::{decode, encode};

fn sine_frame(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 / 48000.0 * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.8)
        .collect()
}

fn bench_codec(c: &mut Criterion) {
    let frame = sine_frame(480);
    let chunk = encode(&frame);

    c.bench_function("encode 480", |b| b.iter(|| encode(black_box(&frame))));
    c.bench_function("decode 480", |b| b.iter(|| decode(black_box(&chunk))));
}

fn bench_buffer(c: &mut Criterion) {
    let frame = sine_frame(480);
    let buffer = PlaybackBuffer::new();
    let mut block = [0.0f32; 128];

    c.bench_function("enqueue 480 / drain 128", |b| {
        b.iter(|| {
            buffer.enqueue(black_box(&frame));
            while buffer.drain_into(&mut block) == block.len() {}
        })
    });
}

criterion_group!(benches, bench_codec, bench_buffer);
criterion_main!(benches);
