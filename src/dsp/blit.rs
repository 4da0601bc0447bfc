//! Band-limited impulse trains and the waveforms integrated from them.
//!
//! A naive impulse train contains every harmonic up to infinity, so anything
//! above Nyquist folds back as aliasing. A band-limited impulse train (BLIT)
//! sums only the first `M` harmonics, which has a closed form:
//!
//! ```text
//!          sin(M θ)
//! y(θ) = ───────────      θ advances by π / p per sample
//!         M sin(θ)        p = samples per period
//! ```
//!
//! At `θ = 0` (and `θ = π` for odd `M`) both sine terms vanish; the limiting
//! value there is 1.
//!
//! `M = 2k + 1` for `k` harmonics. With `k = 0` the generator picks the
//! largest count that stays below Nyquist, `floor(p / 2)`.
//!
//! - [`Blit`]: the impulse train itself.
//! - [`BlitSaw`]: integrates the train through a leaky integrator after
//!   removing its DC component (`1 / p`), giving a sawtooth.
//! - [`BlitSquare`]: an even-`M` bipolar train (alternating-sign impulses
//!   every half period) integrated into a square wave. The integration leaves
//!   a DC bias, so the result goes through a DC blocker.

use std::f32::consts::{PI, TAU};

use crate::dsp::filter::DcBlock;

const GUARD: f32 = f32::EPSILON;

fn harmonic_count(harmonics: u32, period: f32) -> u32 {
    if harmonics == 0 {
        (0.5 * period).floor().max(0.0) as u32
    } else {
        harmonics
    }
}

fn samples_per_period(frequency: f32, sample_rate: f32) -> f32 {
    if frequency <= 0.0 || !frequency.is_finite() {
        log::warn!("Blit: frequency {frequency} must be positive; using 220 Hz");
        sample_rate / 220.0
    } else {
        sample_rate / frequency
    }
}

/// Band-limited impulse train.
#[derive(Debug, Clone)]
pub struct Blit {
    sample_rate: f32,
    harmonics: u32,
    period: f32,
    rate: f32,
    phase: f32,
    m: u32,
    last_out: f32,
}

impl Blit {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut blit = Self {
            sample_rate,
            harmonics: 0,
            period: 1.0,
            rate: 0.0,
            phase: 0.0,
            m: 1,
            last_out: 0.0,
        };
        blit.set_frequency(frequency);
        blit
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.period = samples_per_period(frequency, self.sample_rate);
        self.rate = PI / self.period;
        self.update_harmonics();
    }

    /// Number of harmonics to synthesize; 0 means "as many as fit below Nyquist".
    pub fn set_harmonics(&mut self, harmonics: u32) {
        self.harmonics = harmonics;
        self.update_harmonics();
    }

    fn update_harmonics(&mut self) {
        self.m = 2 * harmonic_count(self.harmonics, self.period) + 1;
    }

    /// Restart at phase 0 (the peak of the impulse).
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.last_out = 0.0;
    }

    /// Set the phase as a fraction of a period in `[0, 1)`.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = PI * phase.rem_euclid(1.0);
    }

    #[inline]
    pub fn tick(&mut self) -> f32 {
        let denominator = self.phase.sin();
        self.last_out = if denominator.abs() <= GUARD {
            1.0
        } else {
            let m = self.m as f32;
            (m * self.phase).sin() / (m * denominator)
        };
        self.phase += self.rate;
        if self.phase >= PI {
            self.phase -= PI;
        }
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }
}

/// Band-limited sawtooth.
#[derive(Debug, Clone)]
pub struct BlitSaw {
    sample_rate: f32,
    harmonics: u32,
    period: f32,
    rate: f32,
    phase: f32,
    m: u32,
    dc: f32,
    peak: f32,
    state: f32,
    last_out: f32,
}

impl BlitSaw {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut saw = Self {
            sample_rate,
            harmonics: 0,
            period: 1.0,
            rate: 0.0,
            phase: 0.0,
            m: 1,
            dc: 0.0,
            peak: 0.0,
            state: 0.0,
            last_out: 0.0,
        };
        saw.set_frequency(frequency);
        saw.reset();
        saw
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.period = samples_per_period(frequency, self.sample_rate);
        self.dc = 1.0 / self.period;
        self.rate = PI * self.dc;
        self.update_harmonics();
    }

    pub fn set_harmonics(&mut self, harmonics: u32) {
        self.harmonics = harmonics;
        self.update_harmonics();
        // Start at the DC-free level so the waveform is centred from the outset.
        self.state = -0.5 * self.peak;
    }

    fn update_harmonics(&mut self) {
        self.m = 2 * harmonic_count(self.harmonics, self.period) + 1;
        self.peak = self.m as f32 / self.period;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.state = -0.5 * self.peak;
        self.last_out = 0.0;
    }

    #[inline]
    pub fn tick(&mut self) -> f32 {
        let denominator = self.phase.sin();
        let mut sample = if denominator.abs() <= GUARD {
            self.peak
        } else {
            (self.m as f32 * self.phase).sin() / (self.period * denominator)
        };
        sample += self.state - self.dc;
        self.state = sample * 0.995;
        self.phase += self.rate;
        if self.phase >= PI {
            self.phase -= PI;
        }
        self.last_out = sample;
        sample
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }
}

/// Band-limited square wave.
#[derive(Debug, Clone)]
pub struct BlitSquare {
    sample_rate: f32,
    harmonics: u32,
    period: f32,
    rate: f32,
    phase: f32,
    m: u32,
    peak: f32,
    last_blit: f32,
    dc_block: DcBlock,
}

/// Pole of the DC blocker after the square's integrator.
const SQUARE_DC_POLE: f32 = 0.999;

impl BlitSquare {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut square = Self {
            sample_rate,
            harmonics: 0,
            period: 1.0,
            rate: 0.0,
            phase: 0.0,
            m: 2,
            peak: 0.0,
            last_blit: 0.0,
            dc_block: DcBlock::new(SQUARE_DC_POLE),
        };
        square.set_frequency(frequency);
        square
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        // The bipolar train has two impulses per period.
        self.period = 0.5 * samples_per_period(frequency, self.sample_rate);
        self.rate = PI / self.period;
        self.update_harmonics();
    }

    pub fn set_harmonics(&mut self, harmonics: u32) {
        self.harmonics = harmonics;
        self.update_harmonics();
    }

    fn update_harmonics(&mut self) {
        self.m = 2 * (harmonic_count(self.harmonics, self.period) + 1);
        self.peak = self.m as f32 / self.period;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.last_blit = 0.0;
        self.dc_block.clear();
    }

    #[inline]
    pub fn tick(&mut self) -> f32 {
        let previous = self.last_blit;
        let denominator = self.phase.sin();
        self.last_blit = if denominator.abs() < GUARD {
            // Positive impulse at θ = 0, negative one at θ = π.
            if self.phase < 0.1 || self.phase > TAU - 0.1 {
                self.peak
            } else {
                -self.peak
            }
        } else {
            (self.m as f32 * self.phase).sin() / (self.period * denominator)
        };
        self.last_blit += previous;

        let out = self.dc_block.tick(self.last_blit);

        self.phase += self.rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.dc_block.last_out()
    }
}
