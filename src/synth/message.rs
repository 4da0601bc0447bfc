use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control message addressed to a [`crate::synth::VoiceManager`].
///
/// Note numbers are fractional MIDI numbers; velocities and control values
/// use the MIDI range `0..=128`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SynthMessage {
    NoteOn { note: f32, velocity: f32, channel: u8 },
    NoteOff { note: f32, velocity: f32, channel: u8 },
    NoteOffTag { tag: i64, velocity: f32 },
    SetFrequency { note: f32, channel: u8 },
    PitchBend { semitones: f32, channel: u8 },
    ControlChange { number: u16, value: f32, channel: u8 },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
