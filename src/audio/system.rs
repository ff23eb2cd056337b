//! Real-time tone output on the default cpal device.
//!
//! The device is opened lazily on the first tone (or an explicit `resume`),
//! mirroring playback that is only permitted after a user gesture. If opening
//! fails, the error is returned and the next attempt tries again. A stream
//! that reports an error after opening is dropped and reopened on the next
//! tone; tones lost with it are left to the sequencer's completion deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::synth::Mixer;
use super::{Tone, ToneId, ToneSink};
use crate::error::AudioError;
use crate::params::ToneParams;

/// Open device state
struct Engine {
    /// Voices shared with the audio callback
    mixer: Arc<Mutex<Mixer>>,

    /// Finished tone ids sent from the audio callback
    finished: Receiver<ToneId>,

    /// Set by the stream error callback
    failed: Arc<AtomicBool>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

/// Lazily opened real-time output
pub struct AudioOutput {
    params: ToneParams,
    engine: Option<Engine>,
}

impl AudioOutput {
    /// Create the output without touching the device yet
    pub fn new(params: ToneParams) -> Result<Self, AudioError> {
        params.validate().map_err(AudioError::InvalidConfig)?;
        Ok(Self {
            params,
            engine: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    /// Open the default device if it is not open yet (or its stream failed)
    pub fn resume(&mut self) -> Result<(), AudioError> {
        if self
            .engine
            .as_ref()
            .is_some_and(|engine| engine.failed.load(Ordering::Relaxed))
        {
            log::warn!("Audio stream failed, reopening device");
            self.engine = None;
        }
        if self.engine.is_none() {
            self.engine = Some(Self::open(&self.params)?);
        }
        Ok(())
    }

    fn open(params: &ToneParams) -> Result<Engine, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;
        let channels = config.channels() as usize;
        let sample_rate = config.sample_rate().0;

        log::info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let mixer = Arc::new(Mutex::new(Mixer::new(sample_rate, params.clone())));
        let mixer_callback = Arc::clone(&mixer);
        let (finished_tx, finished_rx) = mpsc::channel();
        let failed = Arc::new(AtomicBool::new(false));
        let failed_callback = Arc::clone(&failed);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut mixer) = mixer_callback.lock() else {
                        data.fill(0.0);
                        return;
                    };
                    mixer.render(data, channels);
                    for id in mixer.take_finished() {
                        // Receiver gone means the output is shutting down
                        let _ = finished_tx.send(id);
                    }
                },
                move |err| {
                    log::warn!("Audio stream error: {}", err);
                    failed_callback.store(true, Ordering::Relaxed);
                },
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamStart(e.to_string()))?;

        Ok(Engine {
            mixer,
            finished: finished_rx,
            failed,
            _stream: stream,
        })
    }
}

impl ToneSink for AudioOutput {
    fn play_tone(&mut self, tone: Tone) -> Result<ToneId, AudioError> {
        self.resume()?;
        let engine = self.engine.as_ref().ok_or(AudioError::NoDevice)?;
        let mut mixer = engine.mixer.lock().map_err(|_| AudioError::MixerPoisoned)?;
        Ok(mixer.start(tone))
    }

    fn cancel_tone(&mut self, id: ToneId) {
        if let Some(engine) = &self.engine {
            if let Ok(mut mixer) = engine.mixer.lock() {
                mixer.cancel(id);
            }
        }
    }

    fn poll_finished(&mut self) -> Vec<ToneId> {
        match &self.engine {
            Some(engine) => engine.finished.try_iter().collect(),
            None => Vec::new(),
        }
    }
}
