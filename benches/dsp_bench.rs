//! Benchmarks for DSP primitives and complete instruments.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (delay, filter, envelope, blit, reverb)
//!   - scenarios/*  Physical models and a polyphonic voice manager

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

pub const SAMPLE_RATE: f32 = 48_000.0;

criterion_group!(
    benches,
    dsp::bench_delay,
    dsp::bench_filter,
    dsp::bench_envelope,
    dsp::bench_blit,
    dsp::bench_reverb,
    scenarios::bench_instruments,
    scenarios::bench_voices,
);
criterion_main!(benches);
