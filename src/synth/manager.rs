use crate::config::EngineConfig;
use crate::instrument::Instrument;
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::voice::{Voice, VoiceState};
use crate::NORM_7;

/// Returned by [`VoiceManager::note_on`] when no voice serves the channel.
pub const NO_VOICE: i64 = -1;

/// Release amplitude sent to a voice that is taken over by a new note.
const STEAL_AMPLITUDE: f32 = 0.5;

/// Frequency of a (fractional) MIDI note number, A3 = 220 Hz at note 57.
#[inline]
pub fn note_to_frequency(note: f32) -> f32 {
    220.0 * 2f32.powf((note - 57.0) / 12.0)
}

/// Polyphonic note router over a caller-owned slice of instruments.
///
/// Each registered voice names an instrument index and a channel. Note-ons go
/// to the first free voice on the channel, or steal the oldest one (lowest
/// tag). After a note-off a voice keeps rendering for the mute window before
/// it becomes free again.
///
/// The manager never owns the instruments, so every call that touches them
/// takes the slice. Indices that fall outside it are skipped with a warning.
#[derive(Debug, Clone)]
pub struct VoiceManager {
    voices: Vec<Voice>,
    mute_time: i64,
    next_tag: i64,
    last_out: f32,
}

impl VoiceManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_mute_time(config.mute_samples())
    }

    /// Mute window given directly in samples.
    pub fn with_mute_time(mute_time: i64) -> Self {
        Self {
            voices: Vec::new(),
            mute_time: mute_time.max(1),
            // Unused voices carry tag 0.
            next_tag: 1,
            last_out: 0.0,
        }
    }

    /// Register instrument `index` as a voice on `channel`.
    pub fn add_instrument(&mut self, index: usize, channel: u8) {
        log::debug!("VoiceManager: voice {} -> instrument {index} on channel {channel}", self.voices.len());
        self.voices.push(Voice::new(index, channel));
    }

    /// Unregister every voice that plays instrument `index`.
    pub fn remove_instrument(&mut self, index: usize) -> bool {
        let before = self.voices.len();
        self.voices.retain(|voice| voice.instrument != index);
        let removed = self.voices.len() != before;
        if !removed {
            log::warn!("VoiceManager: instrument {index} is not registered");
        }
        removed
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|voice| voice.state() != VoiceState::Free).count()
    }

    pub fn mute_time(&self) -> i64 {
        self.mute_time
    }

    fn next_tag(&mut self) -> i64 {
        let tag = self.next_tag;
        self.next_tag += 1;
        tag
    }

    /// Start `note` with MIDI-range `amplitude`; returns the voice tag or [`NO_VOICE`].
    pub fn note_on<I: Instrument>(
        &mut self,
        instruments: &mut [I],
        note: f32,
        amplitude: f32,
        channel: u8,
    ) -> i64 {
        let frequency = note_to_frequency(note);

        let slot = self
            .voices
            .iter()
            .position(|voice| voice.is_free() && voice.channel == channel)
            .or_else(|| {
                // All voices on the channel are busy: take the oldest.
                self.voices
                    .iter()
                    .enumerate()
                    .filter(|(_, voice)| voice.channel == channel)
                    .min_by_key(|(_, voice)| voice.tag)
                    .map(|(slot, _)| slot)
            });

        let Some(slot) = slot else {
            log::warn!("VoiceManager: no voice on channel {channel}");
            return NO_VOICE;
        };

        let tag = self.next_tag();
        let voice = &mut self.voices[slot];
        if !voice.is_free() {
            log::debug!("VoiceManager: stealing voice with tag {}", voice.tag);
            if let Some(instrument) = instruments.get_mut(voice.instrument) {
                instrument.note_off(STEAL_AMPLITUDE);
            }
        }
        voice.start(tag, note, frequency);
        if let Some(instrument) = instruments.get_mut(voice.instrument) {
            instrument.note_on(frequency, amplitude * NORM_7);
        } else {
            log::warn!("VoiceManager: instrument {} missing from slice", voice.instrument);
        }
        tag
    }

    /// Release every voice on `channel` playing `note`.
    pub fn note_off<I: Instrument>(&mut self, instruments: &mut [I], note: f32, amplitude: f32, channel: u8) {
        let mute_time = self.mute_time;
        for voice in &mut self.voices {
            if voice.note_number == note && voice.channel == channel {
                if let Some(instrument) = instruments.get_mut(voice.instrument) {
                    instrument.note_off(amplitude * NORM_7);
                }
                voice.release(mute_time);
            }
        }
    }

    /// Release the voice started with `tag`.
    pub fn note_off_tag<I: Instrument>(&mut self, instruments: &mut [I], tag: i64, amplitude: f32) {
        let mute_time = self.mute_time;
        if let Some(voice) = self.voices.iter_mut().find(|voice| voice.tag == tag && !voice.is_free()) {
            if let Some(instrument) = instruments.get_mut(voice.instrument) {
                instrument.note_off(amplitude * NORM_7);
            }
            voice.release(mute_time);
        }
    }

    /// Retune every sounding voice on `channel` to `note`.
    pub fn set_frequency<I: Instrument>(&mut self, instruments: &mut [I], note: f32, channel: u8) {
        let frequency = note_to_frequency(note);
        for voice in self
            .voices
            .iter_mut()
            .filter(|voice| voice.channel == channel && !voice.is_free())
        {
            voice.note_number = note;
            voice.frequency = frequency;
            if let Some(instrument) = instruments.get_mut(voice.instrument) {
                instrument.set_frequency(frequency);
            }
        }
    }

    /// Retune the voice started with `tag` to `note`.
    pub fn set_frequency_tag<I: Instrument>(&mut self, instruments: &mut [I], tag: i64, note: f32) {
        let frequency = note_to_frequency(note);
        if let Some(voice) = self.voices.iter_mut().find(|voice| voice.tag == tag && !voice.is_free()) {
            voice.note_number = note;
            voice.frequency = frequency;
            if let Some(instrument) = instruments.get_mut(voice.instrument) {
                instrument.set_frequency(frequency);
            }
        }
    }

    /// Bend every sounding voice on `channel` relative to its note frequency.
    pub fn pitch_bend<I: Instrument>(&mut self, instruments: &mut [I], semitones: f32, channel: u8) {
        let scaler = 2f32.powf(semitones / 12.0);
        for voice in self
            .voices
            .iter()
            .filter(|voice| voice.channel == channel && !voice.is_free())
        {
            if let Some(instrument) = instruments.get_mut(voice.instrument) {
                instrument.set_frequency(voice.frequency * scaler);
            }
        }
    }

    pub fn control_change<I: Instrument>(&mut self, instruments: &mut [I], number: u16, value: f32, channel: u8) {
        for voice in self.voices.iter().filter(|voice| voice.channel == channel) {
            if let Some(instrument) = instruments.get_mut(voice.instrument) {
                instrument.control_change(number, value);
            }
        }
    }

    /// Release every held voice.
    pub fn silence<I: Instrument>(&mut self, instruments: &mut [I]) {
        let mute_time = self.mute_time;
        for voice in &mut self.voices {
            if voice.sounding > 0 {
                if let Some(instrument) = instruments.get_mut(voice.instrument) {
                    instrument.note_off(0.5);
                }
                voice.release(mute_time);
            }
        }
    }

    /// Apply every queued message.
    pub fn drain<I: Instrument>(&mut self, rx: &mut impl MessageReceiver, instruments: &mut [I]) {
        while let Some(message) = rx.pop() {
            self.handle_message(instruments, message);
        }
    }

    pub fn handle_message<I: Instrument>(&mut self, instruments: &mut [I], message: SynthMessage) {
        match message {
            SynthMessage::NoteOn {
                note,
                velocity,
                channel,
            } => {
                self.note_on(instruments, note, velocity, channel);
            }
            SynthMessage::NoteOff {
                note,
                velocity,
                channel,
            } => self.note_off(instruments, note, velocity, channel),
            SynthMessage::NoteOffTag { tag, velocity } => self.note_off_tag(instruments, tag, velocity),
            SynthMessage::SetFrequency { note, channel } => self.set_frequency(instruments, note, channel),
            SynthMessage::PitchBend { semitones, channel } => self.pitch_bend(instruments, semitones, channel),
            SynthMessage::ControlChange {
                number,
                value,
                channel,
            } => self.control_change(instruments, number, value, channel),
            SynthMessage::AllNotesOff => self.silence(instruments),
        }
    }

    /// Mix one sample from every sounding voice, averaged over all voices.
    #[inline]
    pub fn tick<I: Instrument>(&mut self, instruments: &mut [I]) -> f32 {
        if self.voices.is_empty() {
            self.last_out = 0.0;
            return 0.0;
        }
        let mut sum = 0.0;
        for voice in &mut self.voices {
            if voice.sounding != 0 {
                if let Some(instrument) = instruments.get_mut(voice.instrument) {
                    sum += instrument.tick();
                }
            }
            voice.advance();
        }
        self.last_out = sum / self.voices.len() as f32;
        self.last_out
    }

    pub fn render<I: Instrument>(&mut self, instruments: &mut [I], out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.tick(instruments);
        }
    }

    pub fn last_out(&self) -> f32 {
        self.last_out
    }
}
