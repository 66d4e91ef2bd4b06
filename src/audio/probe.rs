use std::path::Path;
use anyhow::{Result, Context};

use super::AudioBuffer;
use super::processing::int_to_f32;
use crate::resources::ResourceHandle;

/// Reads a cue's playable length from the media's own metadata
pub trait MediaProbe: Send + Sync {
    /// `Ok(None)` when the media carries no usable duration.
    fn duration_ms(&self, resource: &ResourceHandle) -> Result<Option<u64>>;
}

/// Probes WAV headers without decoding sample data
#[derive(Debug, Default, Clone, Copy)]
pub struct WavProbe;

impl MediaProbe for WavProbe {
    fn duration_ms(&self, resource: &ResourceHandle) -> Result<Option<u64>> {
        let reader = hound::WavReader::open(&resource.path)
            .with_context(|| format!("Failed to read WAV header: {:?}", resource.path))?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Ok(None);
        }
        // hound reports duration in frames (samples per channel)
        let frames = reader.duration() as u64;
        Ok(Some(frames * 1000 / spec.sample_rate as u64))
    }
}

/// Decodes a WAV file into interleaved f32 samples.
pub fn decode_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to load WAV: {:?}", path))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Corrupt float samples in {:?}", path))?,
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|v| int_to_f32(v, spec.bits_per_sample)))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Corrupt PCM samples in {:?}", path))?,
    };

    Ok(AudioBuffer {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}
