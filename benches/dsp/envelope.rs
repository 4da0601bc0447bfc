//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use waveguide_synth::dsp::envelope::{Adsr, Envelope};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_all_times(2.0, 0.1, 0.7, 0.3);
        env.key_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_all_times(0.001, 0.001, 0.7, 0.3);
        env.key_on();
        // Advance past attack/decay
        for _ in 0..200 {
            env.tick();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Linear ramp toward a moving target
        let mut ramp = Envelope::new(SAMPLE_RATE);
        ramp.set_time(1.0);
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| {
                ramp.set_target(1.0);
                (0..size).map(|_| ramp.tick()).sum::<f32>()
            })
        });
    }

    group.finish();
}
