//! Drone: a string kept ringing by continuous, slowly enveloped noise.

use crate::dsp::delay::DelayA;
use crate::dsp::envelope::Adsr;
use crate::dsp::filter::OneZero;
use crate::dsp::noise::Noise;
use crate::instrument::{checked_frequency, clamp_amplitude, Instrument};

const MAX_LOOP_GAIN: f32 = 0.99999;

#[derive(Debug, Clone)]
pub struct Drone {
    sample_rate: f32,
    delay: DelayA,
    loop_filter: OneZero,
    noise: Noise,
    envelope: Adsr,
    loop_gain: f32,
    frequency: f32,
    last_out: f32,
}

impl Drone {
    pub fn new(sample_rate: f32, lowest_frequency: f32) -> Self {
        let lowest = checked_frequency("Drone", lowest_frequency);
        let mut envelope = Adsr::new(sample_rate);
        envelope.set_all_times(2.0, 0.5, 0.0, 0.5);

        let mut drone = Self {
            sample_rate,
            delay: DelayA::new((sample_rate / lowest) as usize + 1),
            loop_filter: OneZero::new(),
            noise: Noise::new(),
            envelope,
            loop_gain: 0.999,
            frequency: 220.0,
            last_out: 0.0,
        };
        drone.set_frequency(220.0);
        drone
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.reseed(seed);
        self
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn loop_gain(&self) -> f32 {
        self.loop_gain
    }

    /// Start the excitation envelope. The amplitude only matters through the
    /// loop; the drive level is fixed.
    pub fn pluck(&mut self, _amplitude: f32) {
        self.envelope.key_on();
    }

    pub fn clear(&mut self) {
        self.delay.clear();
        self.loop_filter.clear();
        self.last_out = 0.0;
    }
}

impl Instrument for Drone {
    fn set_frequency(&mut self, frequency: f32) {
        let frequency = checked_frequency("Drone", frequency);
        self.frequency = frequency;
        self.delay.set_delay(self.sample_rate / frequency - 0.5);
        self.loop_gain = (0.997 + frequency * 0.000002).min(MAX_LOOP_GAIN);
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.set_frequency(frequency);
        self.pluck(amplitude);
    }

    fn note_off(&mut self, amplitude: f32) {
        let amplitude = clamp_amplitude("Drone", amplitude);
        self.loop_gain = (1.0 - amplitude).clamp(0.0, MAX_LOOP_GAIN);
    }

    fn control_change(&mut self, number: u16, _value: f32) {
        log::warn!("Drone: undefined control number {number}");
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        let excitation = 0.005 * self.envelope.tick() * self.noise.tick();
        let feedback = self.loop_filter.tick(self.delay.last_out() * self.loop_gain);
        self.last_out = self.delay.tick(feedback + excitation);
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
    fn swells_while_the_envelope_rises() {
        let mut drone = Drone::new(22_050.0, 50.0).with_seed(8);
        drone.note_on(110.0, 1.0);
        let out: Vec<f32> = (0..22_050).map(|_| drone.tick()).collect();
        let first: f32 = out[..2_205].iter().map(|x| x * x).sum();
        let later: f32 = out[19_845..].iter().map(|x| x * x).sum();
        assert!(later > first, "{first} -> {later}");
    }

    #[test]
    fn loop_gain_follows_frequency() {
        let mut drone = Drone::new(22_050.0, 50.0);
        drone.set_frequency(500.0);
        assert!((drone.loop_gain() - 0.998).abs() < 1e-6);
        drone.set_frequency(5_000.0);
        assert_eq!(drone.loop_gain(), MAX_LOOP_GAIN);
    }
}
