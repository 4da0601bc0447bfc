//! Table playback with linear interpolation.
//!
//! Used for instrument body impulse responses (one-shot) and for vibrato
//! (a looping sine). The read position advances by `rate` samples per tick;
//! [`WaveTable::set_frequency`] converts a frequency into a rate for looping
//! tables.

use std::f32::consts::TAU;

#[derive(Debug, Clone)]
pub struct WaveTable {
    data: Vec<f32>,
    looping: bool,
    rate: f32,
    time: f32,
    finished: bool,
    last_out: f32,
}

impl WaveTable {
    /// Wrap a table. An empty table produces silence.
    pub fn from_samples(data: Vec<f32>, looping: bool) -> Self {
        let finished = data.is_empty();
        Self {
            data,
            looping,
            rate: 1.0,
            time: 0.0,
            finished,
            last_out: 0.0,
        }
    }

    /// One cycle of a sine, looping.
    pub fn sine(len: usize) -> Self {
        let len = len.max(2);
        let data = (0..len)
            .map(|i| (TAU * i as f32 / len as f32).sin())
            .collect();
        Self::from_samples(data, true)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Playback speed in table samples per output sample.
    pub fn set_rate(&mut self, rate: f32) {
        if !rate.is_finite() {
            log::warn!("WaveTable: ignoring non-finite rate");
            return;
        }
        self.rate = rate;
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Rate such that one pass through the table takes `1 / frequency` seconds.
    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f32) {
        self.set_rate(self.data.len() as f32 * frequency / sample_rate);
    }

    /// Rewind to the start of the table.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.finished = self.data.is_empty();
        self.last_out = 0.0;
    }

    /// A one-shot table that has played to its end.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn tick(&mut self) -> f32 {
        if self.finished {
            self.last_out = 0.0;
            return 0.0;
        }
        let len = self.data.len() as f32;

        if self.looping {
            self.time = self.time.rem_euclid(len);
        } else if self.time < 0.0 {
            self.time = 0.0;
        } else if self.time > len - 1.0 {
            self.time = len - 1.0;
            self.finished = true;
            self.last_out = self.data[self.data.len() - 1];
            return self.last_out;
        }

        let index = self.time as usize;
        let alpha = self.time - index as f32;
        let current = self.data[index];
        let next = if index + 1 < self.data.len() {
            self.data[index + 1]
        } else if self.looping {
            self.data[0]
        } else {
            current
        };
        self.last_out = current + alpha * (next - current);
        self.time += self.rate;
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }
}
