//! Sitar: a plucked string whose length drifts around its target.
//!
//! Each pluck starts the string slightly off pitch, then the delay glides
//! towards the target by a tiny factor per sample, giving the buzzing,
//! bending attack of the jawari bridge. The excitation is noise shaped by a
//! short envelope rather than a preloaded burst.

use crate::dsp::delay::DelayA;
use crate::dsp::envelope::Adsr;
use crate::dsp::filter::OneZero;
use crate::dsp::noise::Noise;
use crate::instrument::{checked_frequency, clamp_amplitude, Instrument};

const MIN_DELAY: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Sitar {
    sample_rate: f32,
    delay_line: DelayA,
    loop_filter: OneZero,
    noise: Noise,
    envelope: Adsr,
    loop_gain: f32,
    am_gain: f32,
    delay: f32,
    target_delay: f32,
    frequency: f32,
    last_out: f32,
}

impl Sitar {
    pub fn new(sample_rate: f32, lowest_frequency: f32) -> Self {
        let lowest = checked_frequency("Sitar", lowest_frequency);
        // Room for the initial detuning.
        let capacity = (1.1 * sample_rate / lowest) as usize + 2;

        let mut loop_filter = OneZero::new();
        loop_filter.set_zero(0.01);

        let mut envelope = Adsr::new(sample_rate);
        envelope.set_all_times(0.001, 0.04, 0.0, 0.5);

        let mut sitar = Self {
            sample_rate,
            delay_line: DelayA::new(capacity),
            loop_filter,
            noise: Noise::new(),
            envelope,
            loop_gain: 0.999,
            am_gain: 0.0,
            delay: 0.0,
            target_delay: 0.0,
            frequency: 220.0,
            last_out: 0.0,
        };
        sitar.set_frequency(220.0);
        sitar
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.reseed(seed);
        self
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Current string delay in samples (drifts towards the target).
    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn target_delay(&self) -> f32 {
        self.target_delay
    }

    pub fn pluck(&mut self, amplitude: f32) {
        self.envelope.key_on();
        self.am_gain = 0.1 * clamp_amplitude("Sitar", amplitude);
    }

    pub fn clear(&mut self) {
        self.delay_line.clear();
        self.loop_filter.clear();
        self.last_out = 0.0;
    }
}

impl Instrument for Sitar {
    fn set_frequency(&mut self, frequency: f32) {
        let frequency = checked_frequency("Sitar", frequency);
        self.frequency = frequency;
        let max_delay = self.delay_line.max_delay();
        let target = self.sample_rate / frequency;
        if target > max_delay {
            log::warn!("Sitar: {frequency} Hz is below the lowest supported pitch; clamping");
        }
        // Both ends stay inside the line so the per-sample drift never clamps.
        self.target_delay = target.clamp(MIN_DELAY, max_delay);
        self.delay = (self.target_delay * (1.0 + 0.05 * self.noise.tick())).clamp(MIN_DELAY, max_delay);
        self.delay_line.set_delay(self.delay);
        self.loop_gain = (0.995 + frequency * 0.0000005).min(0.9995);
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.set_frequency(frequency);
        self.pluck(amplitude);
    }

    fn note_off(&mut self, amplitude: f32) {
        let amplitude = clamp_amplitude("Sitar", amplitude);
        self.loop_gain = (1.0 - amplitude).clamp(0.0, 0.99999);
    }

    fn control_change(&mut self, number: u16, _value: f32) {
        log::warn!("Sitar: undefined control number {number}");
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        if (self.target_delay - self.delay).abs() > 0.001 {
            if self.target_delay < self.delay {
                self.delay = (self.delay * 0.99999).max(self.target_delay);
            } else {
                self.delay = (self.delay * 1.00001).min(self.target_delay);
            }
            self.delay_line.set_delay(self.delay);
        }

        let excitation = self.am_gain * self.envelope.tick() * self.noise.tick();
        let feedback = self.loop_filter.tick(self.delay_line.last_out() * self.loop_gain);
        self.last_out = self.delay_line.tick(feedback + excitation);
        self.last_out
    }

    fn last_out(&self) -> f32 {
        self.last_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_below_lowest_stays_inside_the_line() {
        let mut sitar = Sitar::new(22_050.0, 50.0).with_seed(8);
        sitar.note_on(40.0, 0.8);
        let max_delay = sitar.delay_line.max_delay();
        assert!(sitar.target_delay() <= max_delay);
        for _ in 0..10_000 {
            let sample = sitar.tick();
            assert!(sample.is_finite());
            // The line takes every drift step without clamping.
            assert!((sitar.delay_line.delay() - sitar.delay()).abs() < 1e-4);
            assert!(sitar.delay() <= max_delay);
        }
        assert!((sitar.delay() - sitar.target_delay()).abs() < 0.01);
    }

    #[test]
    fn delay_drifts_towards_target() {
        let mut sitar = Sitar::new(22_050.0, 50.0).with_seed(21);
        sitar.note_on(220.0, 1.0);
        let start_gap = (sitar.delay() - sitar.target_delay()).abs();
        for _ in 0..2_000 {
            sitar.tick();
        }
        let end_gap = (sitar.delay() - sitar.target_delay()).abs();
        // About 0.001 samples of glide per tick at this pitch.
        assert!(end_gap <= (start_gap - 1.5).max(0.002), "{start_gap} -> {end_gap}");
    }

    #[test]
    fn initial_detuning_within_five_percent() {
        let mut sitar = Sitar::new(44_100.0, 50.0);
        for _ in 0..20 {
            sitar.set_frequency(300.0);
            let ratio = sitar.delay() / sitar.target_delay();
            assert!((0.95..=1.05).contains(&ratio), "{ratio}");
        }
    }

    #[test]
    fn pluck_produces_sound() {
        let mut sitar = Sitar::new(22_050.0, 50.0).with_seed(4);
        sitar.note_on(200.0, 0.8);
        let energy: f32 = (0..4_000).map(|_| sitar.tick().powi(2)).sum();
        assert!(energy > 0.0);
    }
}
