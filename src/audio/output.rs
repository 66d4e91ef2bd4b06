use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use anyhow::{Result, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{processing, probe, AudioOutput, SoundId, MAX_VOICES};
use crate::resources::ResourceHandle;

struct Voice {
    samples: Arc<Vec<f32>>,
    position: usize,
    volume: f32,
}

/// Mono sounds already converted to the device rate
struct LoadedSound {
    samples: Arc<Vec<f32>>,
    /// Renders per playback rate, keyed by `f32::to_bits`
    by_rate: HashMap<u32, Arc<Vec<f32>>>,
}

/// Plays cues on the default output device.
///
/// The cpal callback mixes up to [`MAX_VOICES`] voices; starting another one
/// steals the oldest.
pub struct CpalOutput {
    voices: Arc<Mutex<Vec<Voice>>>,
    sounds: Vec<LoadedSound>,
    stream: Option<cpal::Stream>,
    device_sample_rate: u32,
}

// Safety: the cpal::Stream is only created, kept alive and dropped; it is never
// used concurrently. CpalOutput is always accessed behind the SharedOutput Mutex.
unsafe impl Send for CpalOutput {}

impl CpalOutput {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()
            .context("No output device available")?;

        let config = device.default_output_config()
            .context("Failed to get default output config")?;

        let device_sample_rate = config.sample_rate().0;
        let stream_config: cpal::StreamConfig = config.into();
        let channels = stream_config.channels as usize;

        let voices: Arc<Mutex<Vec<Voice>>> = Arc::new(Mutex::new(Vec::new()));
        let mixer_voices = Arc::clone(&voices);

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut voices = mixer_voices.lock().unwrap();
                mix_into(&mut voices, data, channels);
            },
            |err| {
                tracing::error!("Audio output error: {}", err);
            },
            None,
        ).context("Failed to build output stream")?;

        stream.play().context("Failed to start audio stream")?;

        tracing::info!("Audio output started (device sample rate: {}Hz, {} channels)", device_sample_rate, channels);

        Ok(Self {
            voices,
            sounds: Vec::new(),
            stream: Some(stream),
            device_sample_rate,
        })
    }

    fn render_for_rate(&mut self, sound: SoundId, rate: f32) -> Result<Arc<Vec<f32>>> {
        let device_rate = self.device_sample_rate;
        let loaded = self.sounds.get_mut(sound.0 as usize)
            .ok_or_else(|| anyhow::anyhow!("Unknown sound {:?}", sound))?;

        if let Some(rendered) = loaded.by_rate.get(&rate.to_bits()) {
            return Ok(Arc::clone(rendered));
        }

        let rendered = Arc::new(processing::change_speed(&loaded.samples, device_rate, rate)?);
        loaded.by_rate.insert(rate.to_bits(), Arc::clone(&rendered));
        Ok(rendered)
    }
}

impl AudioOutput for CpalOutput {
    fn load(&mut self, resource: &ResourceHandle) -> Result<SoundId> {
        if self.stream.is_none() {
            anyhow::bail!("Audio output has been released");
        }

        let buffer = probe::decode_wav(&resource.path)?;
        let mono = processing::downmix_to_mono(&buffer.samples, buffer.channels);
        let samples = processing::resample(&mono, buffer.sample_rate, self.device_sample_rate)?;

        let id = SoundId(self.sounds.len() as u32);
        self.sounds.push(LoadedSound {
            samples: Arc::new(samples),
            by_rate: HashMap::new(),
        });

        tracing::debug!("Loaded '{}' from {:?} as {:?}", resource.name, resource.path, id);
        Ok(id)
    }

    fn play(&mut self, sound: SoundId, rate: f32, volume: f32) -> Result<()> {
        if self.stream.is_none() {
            anyhow::bail!("Audio output has been released");
        }

        let samples = self.render_for_rate(sound, rate)?;
        let mut voices = self.voices.lock().unwrap();
        while voices.len() >= MAX_VOICES {
            voices.remove(0);
        }
        voices.push(Voice {
            samples,
            position: 0,
            volume: volume.clamp(0.0, 1.0),
        });
        Ok(())
    }

    fn release(&mut self) {
        self.voices.lock().unwrap().clear();
        self.stream = None;
        self.sounds.clear();
        tracing::info!("Audio output released");
    }
}

/// Sums active voices into an interleaved output buffer and drops finished ones.
fn mix_into(voices: &mut Vec<Voice>, data: &mut [f32], channels: usize) {
    let channels = channels.max(1);
    for frame in data.chunks_mut(channels) {
        let mut mixed = 0.0f32;
        for voice in voices.iter_mut() {
            if let Some(sample) = voice.samples.get(voice.position) {
                mixed += sample * voice.volume;
                voice.position += 1;
            }
        }
        let mixed = mixed.clamp(-1.0, 1.0);
        for sample in frame.iter_mut() {
            *sample = mixed;
        }
    }
    voices.retain(|v| v.position < v.samples.len());
}
