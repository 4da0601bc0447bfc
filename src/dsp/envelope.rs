/*
Envelope Generators
===================

Two linear ramp generators live here:

  Envelope    ramps `value` toward `target` at a fixed `rate`. A building
              block for callers that want a control to glide instead of jump;
              none of the bundled instruments use it.

  Adsr        the classic attack/decay/sustain/release state machine used to
              gate excitation in every physical model.


Rates, Not Times
----------------

Both generators move by a raw per-sample increment:

    value += rate            (one tick)

A rate of 0.001 takes 1000 samples to rise from 0 to 1, whatever the sample
rate. The `*_time` setters convert seconds into a rate for the generator's
own sample rate:

    rate = 1.0 / (seconds * sample_rate)

Presets written as legacy rates at 22050 Hz go through `crate::rate_at` first,
so the envelope itself never rescales anything.


The ADSR State Machine
----------------------

    ┌──────┐ key_on ┌────────┐ value >= 1 ┌───────┐ value <= S ┌─────────┐
    │ Idle │ ─────→ │ Attack │ ─────────→ │ Decay │ ─────────→ │ Sustain │
    └──────┘        └────────┘            └───────┘            └─────────┘
        ↑                                                            │
        │  value <= 0  ┌─────────┐       key_off (from any state)     │
        └───────────── │ Release │ ←───────────────────────────────────┘
                       └─────────┘

  Attack   value += attack_rate; on reaching the target, clamp and fall into
           Decay with target = sustain level.
  Decay    value -= decay_rate; on reaching the sustain level, clamp, rate = 0.
  Sustain  hold until the next key event.
  Release  value -= release_rate; on reaching 0, clamp and go Idle.

Release starts from wherever the value is, so releasing mid-attack does not
click.

`set_target` drives the same machine in a two-state mode: it enters Attack
when the target is above the value and Decay when below, with the sustain
level set to the target so the ramp parks there. Breath and bow controllers
use this.
*/

use crate::REFERENCE_SAMPLE_RATE;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The current stage of the ADSR state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsrState {
    Attack,
    Decay,
    Sustain,
    Release,
    Idle,
}

fn non_negative_rate(rate: f32, who: &str) -> f32 {
    if rate < 0.0 {
        log::warn!("{who}: negative rate {rate} rejected; using {}", -rate);
        -rate
    } else {
        rate
    }
}

fn rate_for_time(seconds: f32, sample_rate: f32, who: &str) -> f32 {
    let seconds = if seconds < 0.0 {
        log::warn!("{who}: negative time {seconds} rejected; using {}", -seconds);
        -seconds
    } else {
        seconds
    };
    if seconds == 0.0 {
        // Reach the target in a single tick.
        1.0
    } else {
        1.0 / (seconds * sample_rate)
    }
}

/// Attack/decay/sustain/release generator.
#[derive(Debug, Clone)]
pub struct Adsr {
    state: AdsrState,
    value: f32,
    target: f32,
    rate: f32,
    attack_rate: f32,
    decay_rate: f32,
    sustain_level: f32,
    release_rate: f32,
    sample_rate: f32,
}

impl Adsr {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: AdsrState::Idle,
            value: 0.0,
            target: 0.0,
            rate: 0.0,
            attack_rate: 0.001,
            decay_rate: 0.001,
            sustain_level: 0.5,
            release_rate: 0.01,
            sample_rate,
        }
    }

    /// Start the attack phase from the current value.
    pub fn key_on(&mut self) {
        self.target = 1.0;
        self.rate = self.attack_rate;
        self.state = AdsrState::Attack;
    }

    /// Start the release phase from the current value.
    pub fn key_off(&mut self) {
        self.target = 0.0;
        self.rate = self.release_rate;
        self.state = AdsrState::Release;
    }

    pub fn set_attack_rate(&mut self, rate: f32) {
        self.attack_rate = non_negative_rate(rate, "Adsr attack");
    }

    pub fn set_decay_rate(&mut self, rate: f32) {
        self.decay_rate = non_negative_rate(rate, "Adsr decay");
    }

    pub fn set_release_rate(&mut self, rate: f32) {
        self.release_rate = non_negative_rate(rate, "Adsr release");
    }

    pub fn set_sustain_level(&mut self, level: f32) {
        if !(0.0..=1.0).contains(&level) {
            let clamped = level.clamp(0.0, 1.0);
            log::warn!("Adsr: sustain level {level} out of range; clamping to {clamped}");
            self.sustain_level = clamped;
        } else {
            self.sustain_level = level;
        }
    }

    pub fn set_attack_time(&mut self, seconds: f32) {
        self.attack_rate = rate_for_time(seconds, self.sample_rate, "Adsr attack");
    }

    pub fn set_decay_time(&mut self, seconds: f32) {
        self.decay_rate = rate_for_time(seconds, self.sample_rate, "Adsr decay");
    }

    pub fn set_release_time(&mut self, seconds: f32) {
        self.release_rate = rate_for_time(seconds, self.sample_rate, "Adsr release");
    }

    pub fn set_all_times(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.set_attack_time(attack);
        self.set_decay_time(decay);
        self.set_sustain_level(sustain);
        self.set_release_time(release);
    }

    /// Two-state mode: ramp toward `target` and hold there.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        if self.value < target {
            self.state = AdsrState::Attack;
            self.set_sustain_level(target);
            self.rate = self.attack_rate;
        } else if self.value > target {
            self.set_sustain_level(target);
            self.state = AdsrState::Decay;
            self.rate = self.decay_rate;
        }
    }

    /// Jump to `value` and hold it.
    pub fn set_value(&mut self, value: f32) {
        self.state = AdsrState::Sustain;
        self.target = value;
        self.value = value;
        self.set_sustain_level(value);
        self.rate = 0.0;
    }

    #[inline]
    pub fn tick(&mut self) -> f32 {
        match self.state {
            AdsrState::Attack => {
                self.value += self.rate;
                if self.value >= self.target {
                    self.value = self.target;
                    self.rate = self.decay_rate;
                    self.target = self.sustain_level;
                    self.state = AdsrState::Decay;
                }
            }
            AdsrState::Decay => {
                self.value -= self.decay_rate;
                if self.value <= self.sustain_level {
                    self.value = self.sustain_level;
                    self.rate = 0.0;
                    self.state = AdsrState::Sustain;
                }
            }
            AdsrState::Release => {
                self.value -= self.release_rate;
                if self.value <= 0.0 {
                    self.value = 0.0;
                    self.state = AdsrState::Idle;
                }
            }
            AdsrState::Sustain | AdsrState::Idle => {}
        }
        self.value
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick();
        }
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.value
    }

    pub fn state(&self) -> AdsrState {
        self.state
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.state != AdsrState::Idle
    }
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new(REFERENCE_SAMPLE_RATE)
    }
}

/// Linear ramp toward a target value.
#[derive(Debug, Clone)]
pub struct Envelope {
    value: f32,
    target: f32,
    rate: f32,
    ramping: bool,
    sample_rate: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            value: 0.0,
            target: 0.0,
            rate: 0.001,
            ramping: false,
            sample_rate,
        }
    }

    pub fn key_on(&mut self) {
        self.set_target(1.0);
    }

    pub fn key_off(&mut self) {
        self.set_target(0.0);
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = non_negative_rate(rate, "Envelope");
    }

    /// Rate that covers a full 0 → 1 swing in `seconds`.
    pub fn set_time(&mut self, seconds: f32) {
        self.rate = rate_for_time(seconds, self.sample_rate, "Envelope");
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        self.ramping = self.value != target;
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.ramping = false;
    }

    #[inline]
    pub fn tick(&mut self) -> f32 {
        if self.ramping {
            if self.target > self.value {
                self.value += self.rate;
                if self.value >= self.target {
                    self.value = self.target;
                    self.ramping = false;
                }
            } else {
                self.value -= self.rate;
                if self.value <= self.target {
                    self.value = self.target;
                    self.ramping = false;
                }
            }
        }
        self.value
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.value
    }

    pub fn is_ramping(&self) -> bool {
        self.ramping
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(REFERENCE_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Adsr, samples: usize) -> Vec<f32> {
        (0..samples).map(|_| env.tick()).collect()
    }

    #[test]
    fn two_tick_attack_reaches_decay() {
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_attack_rate(0.5);
        env.key_on();
        env.tick();
        env.tick();
        assert_eq!(env.last_out(), 1.0);
        assert_eq!(env.state(), AdsrState::Decay);
    }

    #[test]
    fn attack_is_monotonic_until_target() {
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_all_times(0.05, 0.05, 0.6, 0.1);
        env.key_on();
        let mut previous = env.last_out();
        while env.state() == AdsrState::Attack {
            let value = env.tick();
            assert!(value >= previous, "attack went down: {previous} -> {value}");
            previous = value;
        }
        assert_eq!(env.state(), AdsrState::Decay);
        assert_eq!(env.last_out(), 1.0);
    }

    #[test]
    fn sustain_holds_target_level() {
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_all_times(0.01, 0.05, 0.6, 0.2);
        env.key_on();
        render_samples(&mut env, 100);
        assert_eq!(env.state(), AdsrState::Sustain);
        assert!((env.last_out() - 0.6).abs() < 1e-6);
        let held = render_samples(&mut env, 50);
        assert!(held.iter().all(|v| (*v - 0.6).abs() < 1e-6));
    }

    #[test]
    fn release_is_monotonic_from_every_state() {
        for ticks_before in [3, 15, 100] {
            let mut env = Adsr::new(SAMPLE_RATE);
            env.set_all_times(0.01, 0.05, 0.5, 0.03);
            env.key_on();
            render_samples(&mut env, ticks_before);
            env.key_off();
            let mut previous = env.last_out();
            while env.state() == AdsrState::Release {
                let value = env.tick();
                assert!(value <= previous);
                previous = value;
            }
            assert_eq!(env.state(), AdsrState::Idle);
            assert_eq!(env.last_out(), 0.0);
        }
    }

    #[test]
    fn negative_rates_are_flipped() {
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_attack_rate(-0.25);
        env.key_on();
        assert_eq!(env.tick(), 0.25);
    }

    #[test]
    fn sustain_level_is_clamped() {
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_sustain_level(1.7);
        env.set_attack_rate(1.0);
        env.set_decay_rate(1.0);
        env.key_on();
        render_samples(&mut env, 3);
        assert_eq!(env.last_out(), 1.0);
    }

    #[test]
    fn set_target_ramps_both_ways() {
        let mut env = Adsr::new(SAMPLE_RATE);
        env.set_attack_rate(0.1);
        env.set_decay_rate(0.1);
        env.set_target(0.5);
        render_samples(&mut env, 10);
        assert!((env.last_out() - 0.5).abs() < 1e-6);
        env.set_target(0.2);
        assert_eq!(env.state(), AdsrState::Decay);
        render_samples(&mut env, 10);
        assert!((env.last_out() - 0.2).abs() < 1e-6);
        assert_eq!(env.state(), AdsrState::Sustain);
    }

    #[test]
    fn envelope_ramps_to_target() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.set_time(0.01);
        env.key_on();
        for _ in 0..10 {
            env.tick();
        }
        assert!((env.last_out() - 1.0).abs() < 1e-5);
        env.key_off();
        for _ in 0..20 {
            env.tick();
        }
        assert_eq!(env.last_out(), 0.0);
        assert!(!env.is_ramping());
    }
}
