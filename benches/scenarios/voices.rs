//! Benchmarks for polyphonic voice management.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use waveguide_synth::{
    dsp::reverb::JcRev,
    instrument::Mandolin,
    synth::VoiceManager,
    EngineConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);

    for &voice_count in &[4usize, 8, 16] {
        for &size in BLOCK_SIZES {
            let mut instruments: Vec<Mandolin> = (0..voice_count)
                .map(|_| Mandolin::new(config.sample_rate, config.lowest_frequency))
                .collect();
            let mut manager = VoiceManager::new(&config);
            for i in 0..voice_count {
                manager.add_instrument(i, 0);
                manager.note_on(&mut instruments, 48.0 + 3.0 * i as f32, 100.0, 0);
            }
            let mut reverb = JcRev::new(1.0, SAMPLE_RATE);
            let mut buffer = vec![0.0f32; size];

            group.bench_with_input(
                BenchmarkId::new(format!("mandolins_{voice_count}_reverb"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        manager.render(&mut instruments, black_box(&mut buffer));
                        reverb.render(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
