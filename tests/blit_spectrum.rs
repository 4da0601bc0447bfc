use rustfft::{num_complex::Complex, FftPlanner};
use waveguide_synth::dsp::blit::{Blit, BlitSaw};

const SAMPLE_RATE: f32 = 48_000.0;
// 75 samples per period keeps the top harmonic strictly below Nyquist.
const PERIOD: usize = 75;
const PERIODS: usize = 64;
const N: usize = PERIOD * PERIODS;

fn magnitudes(samples: &[f32]) -> Vec<f32> {
    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    FftPlanner::<f32>::new().plan_fft_forward(buffer.len()).process(&mut buffer);
    buffer[..=buffer.len() / 2].iter().map(|c| c.norm()).collect()
}

/// Energy in bins that are not a harmonic in `1..=max_harmonic`, relative to the total.
fn stray_energy(spectrum: &[f32], max_harmonic: usize) -> f32 {
    let total: f32 = spectrum.iter().skip(1).map(|m| m * m).sum();
    let stray: f32 = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(bin, _)| bin % PERIODS != 0 || bin / PERIODS > max_harmonic)
        .map(|(_, m)| m * m)
        .sum();
    stray / total
}

#[test]
fn impulse_train_is_flat_up_to_nyquist() {
    let mut blit = Blit::new(SAMPLE_RATE / PERIOD as f32, SAMPLE_RATE);
    let samples: Vec<f32> = (0..N).map(|_| blit.tick()).collect();
    let spectrum = magnitudes(&samples);

    let top = PERIOD / 2;
    let first = spectrum[PERIODS];
    assert!(first > 0.0);
    for k in 1..=top {
        let ratio = spectrum[k * PERIODS] / first;
        assert!((ratio - 1.0).abs() < 0.05, "harmonic {k} ratio {ratio}");
    }
    assert!(stray_energy(&spectrum, top) < 1e-3);
}

#[test]
fn limited_harmonics_leave_upper_band_empty() {
    let mut blit = Blit::new(SAMPLE_RATE / PERIOD as f32, SAMPLE_RATE);
    blit.set_harmonics(10);
    let samples: Vec<f32> = (0..N).map(|_| blit.tick()).collect();
    let spectrum = magnitudes(&samples);

    assert!(spectrum[10 * PERIODS] > 0.5 * spectrum[PERIODS]);
    assert!(stray_energy(&spectrum, 10) < 1e-3);
}

#[test]
fn sawtooth_has_no_aliased_partials() {
    let mut saw = BlitSaw::new(SAMPLE_RATE / PERIOD as f32, SAMPLE_RATE);
    saw.set_harmonics(10);
    // Skip the integrator's start-up transient.
    for _ in 0..N {
        saw.tick();
    }
    let samples: Vec<f32> = (0..N).map(|_| saw.tick()).collect();
    let spectrum = magnitudes(&samples);

    // Sawtooth partials fall off roughly as 1/k.
    assert!(spectrum[PERIODS] > spectrum[5 * PERIODS]);
    assert!(stray_energy(&spectrum, 10) < 1e-3);
}
