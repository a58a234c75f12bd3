//! rodio output for ambient loops and pop tones

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;
use std::io::Cursor;

use super::AmbientPlayer;
use crate::error::WellnessError;
use crate::tone::ToneSink;

/// Download a track so it can be looped offline
pub async fn fetch_audio(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, WellnessError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| WellnessError::Audio(format!("fetch {} failed: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(WellnessError::Audio(format!(
            "fetch {} failed: status {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| WellnessError::Audio(format!("read {} failed: {}", url, e)))?;
    Ok(bytes.to_vec())
}

fn open_output() -> Result<(OutputStream, OutputStreamHandle), WellnessError> {
    OutputStream::try_default()
        .map_err(|e| WellnessError::Audio(format!("audio output unavailable: {}", e)))
}

/// Ambient player on the default output device.
///
/// Tracks must be loaded with [`RodioAmbientPlayer::load`] before playing;
/// playing an unloaded URL is refused like any other playback failure.
pub struct RodioAmbientPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    tracks: HashMap<String, Vec<u8>>,
    volume: f32,
}

impl RodioAmbientPlayer {
    pub fn new(volume: f32) -> Result<Self, WellnessError> {
        let (stream, handle) = open_output()?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            tracks: HashMap::new(),
            volume: volume.clamp(0.0, 1.0),
        })
    }

    /// Register encoded audio for `url`
    pub fn load(&mut self, url: &str, bytes: Vec<u8>) {
        self.tracks.insert(url.to_string(), bytes);
    }
}

impl AmbientPlayer for RodioAmbientPlayer {
    fn play(&mut self, url: &str) -> Result<(), WellnessError> {
        self.stop();

        let bytes = self
            .tracks
            .get(url)
            .cloned()
            .ok_or_else(|| WellnessError::Audio(format!("track not loaded: {}", url)))?;
        let source = Decoder::new(Cursor::new(bytes))
            .map_err(|e| WellnessError::Audio(format!("cannot decode {}: {}", url, e)))?;

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| WellnessError::Audio(format!("cannot open sink: {}", e)))?;
        sink.set_volume(self.volume);
        sink.append(source.repeat_infinite());
        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) -> Result<(), WellnessError> {
        match &self.sink {
            Some(sink) => {
                sink.play();
                Ok(())
            }
            None => Err(WellnessError::Audio("nothing to resume".to_string())),
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// Pop tone output on the default device
pub struct RodioToneSink {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioToneSink {
    pub fn new() -> Result<Self, WellnessError> {
        let (stream, handle) = open_output()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl ToneSink for RodioToneSink {
    fn play_samples(&mut self, samples: &[f32], sample_rate: u32) -> Result<(), WellnessError> {
        let buffer = SamplesBuffer::new(1, sample_rate, samples.to_vec());
        self.handle
            .play_raw(buffer)
            .map_err(|e| WellnessError::Audio(format!("tone playback failed: {}", e)))
    }
}
