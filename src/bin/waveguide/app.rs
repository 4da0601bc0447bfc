//! Audio stream setup and the realtime render callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use waveguide_synth::{
    dsp::reverb::JcRev,
    instrument::{control, Instrument, Mandolin},
    synth::{SynthMessage, VoiceManager},
    EngineConfig, MAX_BLOCK_SIZE,
};

const QUEUE_CAPACITY: usize = 256;

/// A running output stream plus the control queue feeding it.
pub struct App {
    tx: Producer<SynthMessage>,
    _stream: cpal::Stream,
}

struct AudioState {
    manager: VoiceManager,
    instruments: Vec<Mandolin>,
    reverb: JcRev,
    rx: Consumer<SynthMessage>,
    block: Vec<f32>,
}

impl AudioState {
    fn render_into(&mut self, data: &mut [f32], channels: usize) {
        let total_frames = data.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            self.manager.drain(&mut self.rx, &mut self.instruments);

            let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let block = &mut self.block[..frames];
            self.manager.render(&mut self.instruments, block);

            let out_off = frames_written * channels;
            for (i, &dry) in block.iter().enumerate() {
                self.reverb.tick(dry);
                let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                for (ch, sample) in frame.iter_mut().enumerate() {
                    *sample = if ch % 2 == 0 {
                        self.reverb.last_out_left()
                    } else {
                        self.reverb.last_out_right()
                    };
                }
            }
            frames_written += frames;
        }
    }
}

impl App {
    /// Open the default output device with `voices` mandolins on channel 0.
    pub fn start(voices: usize) -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(eyre!("unsupported sample format {:?}", supported.sample_format()));
        }

        let sample_rate = supported.sample_rate().0 as f32;
        let channels = supported.channels() as usize;
        log::info!("opening output stream: {sample_rate} Hz, {channels} channels, {voices} voices");

        let config = EngineConfig::default().with_sample_rate(sample_rate);
        let mut manager = VoiceManager::new(&config);
        let instruments = (0..voices)
            .map(|i| {
                let mut mandolin = Mandolin::new(config.sample_rate, config.lowest_frequency);
                mandolin.control_change(control::BODY_SIZE, 40.0 + 20.0 * i as f32);
                manager.add_instrument(i, 0);
                mandolin
            })
            .collect();

        let mut reverb = JcRev::new(1.2, sample_rate);
        reverb.set_effect_mix(0.2);

        let (tx, rx) = RingBuffer::new(QUEUE_CAPACITY);
        let mut state = AudioState {
            manager,
            instruments,
            reverb,
            rx,
            block: vec![0.0; MAX_BLOCK_SIZE],
        };

        let stream = device.build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| state.render_into(data, channels),
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play().wrap_err("failed to start output stream")?;

        Ok(Self { tx, _stream: stream })
    }

    pub fn send(&mut self, message: SynthMessage) {
        if self.tx.push(message).is_err() {
            log::warn!("control queue full, dropping {message:?}");
        }
    }
}
