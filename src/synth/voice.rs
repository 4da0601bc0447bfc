#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Note held
    Releasing, // Note released, still rendering its tail
}

/// Bookkeeping for one instrument slot of a voice manager.
///
/// The instrument itself lives in a caller-owned slice; `instrument` is its
/// index there.
#[derive(Debug, Clone)]
pub struct Voice {
    pub(crate) tag: i64,
    pub(crate) channel: u8,
    pub(crate) note_number: f32,
    pub(crate) frequency: f32,
    /// `> 0` while held, `< 0` counts the mute window up to 0, `0` is free.
    pub(crate) sounding: i64,
    pub(crate) instrument: usize,
}

impl Voice {
    pub fn new(instrument: usize, channel: u8) -> Self {
        Self {
            tag: 0,
            channel,
            note_number: -1.0,
            frequency: 0.0,
            sounding: 0,
            instrument,
        }
    }

    pub(crate) fn start(&mut self, tag: i64, note_number: f32, frequency: f32) {
        self.tag = tag;
        self.note_number = note_number;
        self.frequency = frequency;
        self.sounding = 1;
    }

    pub(crate) fn release(&mut self, mute_time: i64) {
        self.sounding = -mute_time;
    }

    /// Advance the mute countdown by one sample.
    pub(crate) fn advance(&mut self) {
        if self.sounding < 0 {
            self.sounding += 1;
        }
        if self.sounding == 0 {
            self.note_number = -1.0;
        }
    }

    pub fn state(&self) -> VoiceState {
        match self.sounding {
            0 => VoiceState::Free,
            s if s > 0 => VoiceState::Active,
            _ => VoiceState::Releasing,
        }
    }

    pub fn is_free(&self) -> bool {
        self.note_number < 0.0
    }

    pub fn tag(&self) -> i64 {
        self.tag
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn note_number(&self) -> f32 {
        self.note_number
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn instrument(&self) -> usize {
        self.instrument
    }
}
