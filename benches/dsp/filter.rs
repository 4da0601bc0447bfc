//! Benchmarks for one-zero, one-pole, DC blocker and biquad sections.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use waveguide_synth::dsp::filter::{BiQuad, DcBlock, OnePole, OneZero};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut one_zero = OneZero::new();
        group.bench_with_input(BenchmarkId::new("one_zero", size), &size, |b, _| {
            b.iter(|| input.iter().map(|&x| one_zero.tick(black_box(x))).sum::<f32>())
        });

        let mut one_pole = OnePole::with_pole(0.9);
        group.bench_with_input(BenchmarkId::new("one_pole", size), &size, |b, _| {
            b.iter(|| input.iter().map(|&x| one_pole.tick(black_box(x))).sum::<f32>())
        });

        let mut dc_block = DcBlock::new(0.99);
        group.bench_with_input(BenchmarkId::new("dc_block", size), &size, |b, _| {
            b.iter(|| input.iter().map(|&x| dc_block.tick(black_box(x))).sum::<f32>())
        });

        let mut resonator = BiQuad::new();
        resonator.set_resonance(1000.0, 0.99, true, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("biquad_resonance", size), &size, |b, _| {
            b.iter(|| input.iter().map(|&x| resonator.tick(black_box(x))).sum::<f32>())
        });
    }

    group.finish();
}
