//! Synthesized UI sound cues.
//!
//! Every cue is a handful of [`Tone`]s (an oscillator with an exponential
//! gain envelope and optional exponential pitch sweep) mixed offline into a
//! mono `f32` buffer. Synthesis is pure; only [`SoundBoard::play`] touches a
//! device.
//!
//! | Cue | Sound |
//! |-----|-------|
//! | [`Cue::Click`] | Mechanical square-wave chirp, 800 Hz down to 100 Hz |
//! | [`Cue::Confirm`] | Two sine beeps, 800 Hz and 1200 Hz |
//! | [`Cue::Hover`] | Very short quiet 1200 Hz blip |
//! | [`Cue::Boot`] | Rising five-note arpeggio |
//! | [`Cue::Shutdown`] | Falling five-note arpeggio |
//! | [`Cue::Warning`] | Two 1500 Hz pips |
//!
//! The device is not opened until the first cue plays. The
//! [`SoundBoard`] belongs to whoever created it; there is no global audio
//! context.
//!
//! # Example
//!
//! ```ignore
//! let mut sounds = SoundBoard::rodio();
//! sounds.play(Cue::Boot)?;    // opens the output stream
//! sounds.toggle_mute();
//! sounds.play(Cue::Click)?;   // muted, nothing plays
//! ```

use std::collections::HashMap;
use std::f32::consts::TAU;

use log::warn;

use crate::error::AudioError;

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// One oscillator note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    /// Frequency at the start, Hz.
    pub frequency: f32,
    /// Frequency at the end, Hz. Equal to `frequency` for a steady pitch.
    pub end_frequency: f32,
    pub gain: f32,
    pub end_gain: f32,
    pub duration: f32,
    /// Start time within the cue, seconds.
    pub offset: f32,
}

impl Tone {
    /// Sine beep fading from 0.3 to 0.01 over `duration`.
    pub fn beep(frequency: f32, duration: f32) -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency,
            end_frequency: frequency,
            gain: 0.3,
            end_gain: 0.01,
            duration,
            offset: 0.0,
        }
    }

    pub fn square(mut self) -> Self {
        self.waveform = Waveform::Square;
        self
    }

    pub fn sweep_to(mut self, end_frequency: f32) -> Self {
        self.end_frequency = end_frequency;
        self
    }

    pub fn with_gain(mut self, start: f32, end: f32) -> Self {
        self.gain = start;
        self.end_gain = end;
        self
    }

    pub fn at(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn end(&self) -> f32 {
        self.offset + self.duration
    }

    /// Output at `t` seconds after the tone starts, silent outside
    /// `0..duration`.
    pub fn sample(&self, t: f32) -> f32 {
        if !(t >= 0.0 && t < self.duration) {
            return 0.0;
        }
        let u = t / self.duration;
        let gain = exp_ramp(self.gain, self.end_gain, u);
        let phase = TAU * self.cycles(t);
        let wave = match self.waveform {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        wave * gain
    }

    /// Oscillator cycles completed by `t`: the integral of an exponential
    /// frequency ramp.
    fn cycles(&self, t: f32) -> f32 {
        let ratio = self.end_frequency / self.frequency;
        if !(ratio > 0.0) || (ratio - 1.0).abs() < 1e-6 {
            return self.frequency * t;
        }
        let k = ratio.ln() / self.duration;
        self.frequency * ((k * t).exp() - 1.0) / k
    }
}

/// Web Audio style `exponentialRampToValueAtTime`, `u` in `0..=1`.
fn exp_ramp(from: f32, to: f32, u: f32) -> f32 {
    if from > 0.0 && to > 0.0 {
        from * (to / from).powf(u)
    } else {
        from + (to - from) * u
    }
}

/// Mix tones into one buffer long enough for the last to finish. Samples
/// are clamped to `[-1, 1]`.
pub fn mix(tones: &[Tone], sample_rate: u32) -> Vec<f32> {
    let end = tones.iter().map(Tone::end).fold(0.0f32, f32::max);
    let len = (end * sample_rate as f32).ceil() as usize;
    let rate = sample_rate as f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / rate;
            tones
                .iter()
                .map(|tone| tone.sample(t - tone.offset))
                .sum::<f32>()
                .clamp(-1.0, 1.0)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Click,
    Confirm,
    Hover,
    Boot,
    Shutdown,
    Warning,
}

impl Cue {
    pub fn tones(self) -> Vec<Tone> {
        match self {
            Cue::Click => vec![Tone::beep(800.0, 0.05)
                .square()
                .sweep_to(100.0)
                .with_gain(0.15, 0.01)],
            Cue::Confirm => vec![Tone::beep(800.0, 0.05), Tone::beep(1200.0, 0.1)],
            Cue::Hover => vec![Tone::beep(1200.0, 0.02).with_gain(0.05, 0.01)],
            Cue::Boot => [400.0, 600.0, 800.0, 1000.0, 1200.0]
                .iter()
                .enumerate()
                .map(|(i, f)| Tone::beep(*f, 0.12).at(i as f32 * 0.1))
                .collect(),
            Cue::Shutdown => [1200.0, 1000.0, 800.0, 600.0, 400.0]
                .iter()
                .enumerate()
                .map(|(i, f)| Tone::beep(*f, 0.15).at(i as f32 * 0.15))
                .collect(),
            Cue::Warning => vec![Tone::beep(1500.0, 0.08), Tone::beep(1500.0, 0.08).at(0.15)],
        }
    }

    pub fn render(self, sample_rate: u32) -> Vec<f32> {
        mix(&self.tones(), sample_rate)
    }
}

/// Something that can play a mono buffer.
pub trait AudioBackend {
    fn play(&mut self, samples: Vec<f32>, sample_rate: u32) -> Result<(), AudioError>;
}

type BackendFactory = Box<dyn FnOnce() -> Result<Box<dyn AudioBackend>, AudioError>>;

/// Plays cues through a lazily opened backend.
pub struct SoundBoard {
    factory: Option<BackendFactory>,
    backend: Option<Box<dyn AudioBackend>>,
    cache: HashMap<Cue, Vec<f32>>,
    sample_rate: u32,
    muted: bool,
}

impl SoundBoard {
    /// `factory` runs on the first unmuted [`play`](Self::play).
    pub fn new<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn AudioBackend>, AudioError> + 'static,
    {
        Self {
            factory: Some(Box::new(factory)),
            backend: None,
            cache: HashMap::new(),
            sample_rate: SAMPLE_RATE,
            muted: false,
        }
    }

    /// A board that never makes a sound.
    pub fn silent() -> Self {
        Self {
            factory: None,
            backend: None,
            cache: HashMap::new(),
            sample_rate: SAMPLE_RATE,
            muted: false,
        }
    }

    /// Board on the default output device.
    #[cfg(feature = "audio")]
    pub fn rodio() -> Self {
        Self::new(|| Ok(Box::new(RodioBackend::open()?) as Box<dyn AudioBackend>))
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate.max(1);
        self.cache.clear();
        self
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Whether the backend has been opened.
    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    /// Play `cue`. Muted boards do nothing and do not open the device.
    ///
    /// If the device cannot be opened the error is returned once and the
    /// board stays silent afterwards.
    pub fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        if self.muted {
            return Ok(());
        }
        if self.backend.is_none() {
            let Some(factory) = self.factory.take() else {
                return Ok(());
            };
            match factory() {
                Ok(backend) => self.backend = Some(backend),
                Err(e) => {
                    warn!("audio disabled: {}", e);
                    return Err(e);
                }
            }
        }

        let sample_rate = self.sample_rate;
        let samples = self
            .cache
            .entry(cue)
            .or_insert_with(|| cue.render(sample_rate))
            .clone();
        match &mut self.backend {
            Some(backend) => backend.play(samples, sample_rate),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for SoundBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundBoard")
            .field("open", &self.is_open())
            .field("muted", &self.muted)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// Default output device via `rodio`.
#[cfg(feature = "audio")]
pub struct RodioBackend {
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
}

#[cfg(feature = "audio")]
impl RodioBackend {
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = rodio::OutputStream::try_default()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

#[cfg(feature = "audio")]
impl AudioBackend for RodioBackend {
    fn play(&mut self, samples: Vec<f32>, sample_rate: u32) -> Result<(), AudioError> {
        let source = rodio::buffer::SamplesBuffer::new(1, sample_rate, samples);
        self.handle
            .play_raw(source)
            .map_err(|e| AudioError::Playback(e.to_string()))
    }
}
