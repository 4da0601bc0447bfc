//! Control-change numbers understood by the instruments.
//!
//! Values travel in MIDI range `0..=128`; each instrument normalizes them by
//! 1/128 before use. Not every instrument answers every number.

pub const MOD_WHEEL: u16 = 1;
pub const BREATH: u16 = 2;
pub const FOOT: u16 = 4;
pub const BALANCE: u16 = 8;
pub const EXPRESSION: u16 = 11;
pub const GENERAL_1: u16 = 16;
pub const SUSTAIN: u16 = 64;
pub const PORTAMENTO: u16 = 65;
pub const AFTERTOUCH: u16 = 128;

/// Shaker preset selection; outside the 7-bit MIDI controller space.
pub const SHAKER_PRESET: u16 = 1071;

// Names as used by the individual instruments.

pub const DETUNE: u16 = MOD_WHEEL;
pub const BODY_SIZE: u16 = BREATH;
pub const PLUCK_POSITION: u16 = FOOT;
pub const STRING_DAMPING: u16 = EXPRESSION;

pub const JET_DELAY: u16 = BREATH;
pub const NOISE_GAIN: u16 = FOOT;
pub const VIBRATO_FREQUENCY: u16 = EXPRESSION;
pub const VIBRATO_GAIN: u16 = MOD_WHEEL;
pub const BREATH_PRESSURE: u16 = AFTERTOUCH;

pub const BOW_PRESSURE: u16 = BREATH;
pub const BOW_MOTION: u16 = FOOT;
pub const STRIKE_POSITION: u16 = BALANCE;
pub const INTEGRATION: u16 = EXPRESSION;
pub const MODE_GAIN: u16 = MOD_WHEEL;
pub const BAR_PRESET: u16 = GENERAL_1;
pub const BOW_VELOCITY: u16 = AFTERTOUCH;

pub const SHAKE_ENERGY: u16 = BREATH;
pub const OBJECT_COUNT: u16 = FOOT;
pub const SYSTEM_DECAY: u16 = EXPRESSION;
pub const RESONANCE_FREQUENCY: u16 = MOD_WHEEL;
