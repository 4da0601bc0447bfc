//! Memoryless nonlinear waveshapers used as excitation mechanisms.
//!
//! # Jet table
//!
//! A cubic sigmoid approximating flow separation at a flute's flue exit:
//!
//! ```text
//! f(x) = clamp(x * (x² - 1), -1, 1)
//! ```
//!
//! # Bow table
//!
//! An empirical friction curve mapping relative bow/string velocity to a
//! friction coefficient. Small velocity differences stick (coefficient near
//! 1), large ones slip:
//!
//! ```text
//! f(x) = min((|x * slope + offset| + 0.75)^-4, 1)
//! ```

/// Cubic jet nonlinearity.
#[derive(Debug, Clone, Default)]
pub struct JetTable {
    last_out: f32,
}

impl JetTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&mut self, input: f32) -> f32 {
        self.last_out = (input * (input * input - 1.0)).clamp(-1.0, 1.0);
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }
}

/// Bow friction curve.
#[derive(Debug, Clone)]
pub struct BowTable {
    slope: f32,
    offset: f32,
    last_out: f32,
}

impl BowTable {
    pub fn new() -> Self {
        Self {
            slope: 0.1,
            offset: 0.0,
            last_out: 0.0,
        }
    }

    pub fn set_slope(&mut self, slope: f32) {
        self.slope = slope;
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    pub fn slope(&self) -> f32 {
        self.slope
    }

    #[inline]
    pub fn lookup(&mut self, input: f32) -> f32 {
        let magnitude = (input * self.slope + self.offset).abs() + 0.75;
        self.last_out = magnitude.powi(-4).min(1.0);
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }
}

impl Default for BowTable {
    fn default() -> Self {
        Self::new()
    }
}
