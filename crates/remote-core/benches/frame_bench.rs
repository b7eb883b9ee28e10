//! Criterion benchmarks for the Pi-Remote text protocol and drag throttle.
//!
//! The client renders a frame for every forwarded touch event and the host
//! parses one per message, so both sides sit on the input hot path.
//!
//! Run with:
//! ```bash
//! cargo bench --package remote-core --bench frame_bench
//! ```

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use remote_core::{DragAccumulator, Frame, KeyCode, PointerDelta};

fn fixtures() -> Vec<(&'static str, Frame)> {
    vec![
        ("ApiKey", Frame::ApiKey("0123456789abcdef".to_string())),
        ("Drag", Frame::Drag { dx: 12.5, dy: -3.25 }),
        ("KeyChar", Frame::KeyboardInput(KeyCode::Char('a'))),
        ("KeyBackspace", Frame::KeyboardInput(KeyCode::BACKSPACE)),
        ("LeftClick", Frame::LeftClick),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let frames = fixtures();
    let mut group = c.benchmark_group("encode_frame");
    for (name, frame) in &frames {
        group.bench_with_input(BenchmarkId::new("frame", name), frame, |b, frame| {
            b.iter(|| black_box(frame.to_string()))
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let texts: Vec<(&str, String)> = fixtures()
        .into_iter()
        .map(|(name, frame)| (name, frame.to_string()))
        .collect();
    let mut group = c.benchmark_group("parse_frame");
    for (name, text) in &texts {
        group.bench_with_input(BenchmarkId::new("frame", name), text, |b, text| {
            b.iter(|| black_box(Frame::parse(black_box(text))))
        });
    }
    group.finish();
}

fn bench_drag_throttle(c: &mut Criterion) {
    c.bench_function("drag_throttle_120hz_second", |b| {
        let start = Instant::now();
        b.iter(|| {
            let mut acc = DragAccumulator::default();
            let mut emitted = 0u32;
            for i in 0..120u32 {
                let now = start + Duration::from_micros(u64::from(i) * 8_333);
                if acc.observe(PointerDelta::new(1.0, -1.0), now).is_some() {
                    emitted += 1;
                }
            }
            black_box(emitted)
        })
    });
}

criterion_group!(benches, bench_encode, bench_parse, bench_drag_throttle);
criterion_main!(benches);
