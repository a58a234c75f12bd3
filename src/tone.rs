//! Pop tone synthesis
//!
//! The game plays a short decaying sine sweep on every pop. Samples are
//! generated here; an output device is created lazily on the first pop and
//! resumed whenever it reports being suspended.

use crate::error::WellnessError;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Parameters of a sine sweep with exponential pitch and gain ramps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopTone {
    pub start_hz: f32,
    pub end_hz: f32,
    pub start_gain: f32,
    pub end_gain: f32,
    pub duration_secs: f32,
}

impl Default for PopTone {
    fn default() -> Self {
        Self {
            start_hz: 900.0,
            end_hz: 150.0,
            start_gain: 0.2,
            end_gain: 0.01,
            duration_secs: 0.12,
        }
    }
}

impl PopTone {
    /// Instantaneous frequency at `t` seconds
    pub fn frequency_at(&self, t: f32) -> f32 {
        exp_ramp(self.start_hz, self.end_hz, t / self.duration_secs)
    }

    /// Instantaneous gain at `t` seconds
    pub fn gain_at(&self, t: f32) -> f32 {
        exp_ramp(self.start_gain, self.end_gain, t / self.duration_secs)
    }

    /// Render mono samples in -1..1
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration_secs * sample_rate as f32).round() as usize;
        let dt = 1.0 / sample_rate as f32;
        let mut phase = 0.0f32;
        let mut samples = Vec::with_capacity(count);

        for i in 0..count {
            let t = i as f32 * dt;
            samples.push(phase.sin() * self.gain_at(t));
            phase += std::f32::consts::TAU * self.frequency_at(t) * dt;
            if phase > std::f32::consts::TAU {
                phase -= std::f32::consts::TAU;
            }
        }

        samples
    }
}

/// value(progress) = from * (to/from)^progress, progress clamped to 0..1
fn exp_ramp(from: f32, to: f32, progress: f32) -> f32 {
    from * (to / from).powf(progress.clamp(0.0, 1.0))
}

/// Audio device that can play short sample buffers
pub trait ToneSink {
    fn play_samples(&mut self, samples: &[f32], sample_rate: u32) -> Result<(), WellnessError>;

    /// Whether the device is currently suspended and must be resumed first
    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<(), WellnessError> {
        Ok(())
    }
}

/// Sink that discards audio
#[derive(Debug, Default)]
pub struct NullToneSink;

impl ToneSink for NullToneSink {
    fn play_samples(&mut self, _samples: &[f32], _sample_rate: u32) -> Result<(), WellnessError> {
        Ok(())
    }
}

type SinkFactory = Box<dyn FnMut() -> Result<Box<dyn ToneSink>, WellnessError>>;

/// Tone output created on first use.
///
/// Platforms that forbid audio before a user gesture are satisfied by only
/// opening the device from inside a pop.
pub struct LazyToneContext {
    factory: SinkFactory,
    sink: Option<Box<dyn ToneSink>>,
    tone: PopTone,
    samples: Vec<f32>,
    sample_rate: u32,
}

impl LazyToneContext {
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn ToneSink>, WellnessError> + 'static,
    {
        let tone = PopTone::default();
        Self {
            factory: Box::new(factory),
            sink: None,
            tone,
            samples: tone.render(DEFAULT_SAMPLE_RATE),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Context that never produces sound
    pub fn silent() -> Self {
        Self::new(|| Ok(Box::new(NullToneSink) as Box<dyn ToneSink>))
    }

    pub fn is_initialized(&self) -> bool {
        self.sink.is_some()
    }

    pub fn tone(&self) -> &PopTone {
        &self.tone
    }

    /// Create the device if needed and resume it if suspended
    pub fn ensure_ready(&mut self) -> Result<(), WellnessError> {
        if self.sink.is_none() {
            tracing::debug!("opening tone output");
            self.sink = Some((self.factory)()?);
        }
        if let Some(sink) = self.sink.as_mut() {
            if sink.is_suspended() {
                sink.resume()?;
            }
        }
        Ok(())
    }

    /// Play one pop. Failures are logged and otherwise ignored.
    pub fn play_pop(&mut self) {
        if let Err(e) = self.ensure_ready() {
            tracing::debug!(error = %e, "pop tone unavailable");
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.play_samples(&self.samples, self.sample_rate) {
                tracing::debug!(error = %e, "pop tone playback failed");
            }
        }
    }
}
