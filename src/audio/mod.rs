pub mod output;
pub mod probe;
pub mod processing;

use std::sync::{Arc, Mutex};
use anyhow::Result;

use crate::resources::ResourceHandle;

pub use output::CpalOutput;
pub use probe::{MediaProbe, WavProbe};

/// Playback speed multiplier applied to every cue (>1 plays faster)
pub const PLAYBACK_RATE: f32 = 1.25;

/// Duration assumed for a cue whose length cannot be probed
pub const FALLBACK_DURATION_MS: u64 = 300;

/// Voices the output subsystem mixes at once
pub const MAX_VOICES: usize = 4;

/// Handle to a sound pre-loaded into an [`AudioOutput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub u32);

/// Decoded audio passed between the decoder, the resampler and the mixer
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}

/// The audio subsystem cues are played through.
///
/// Playback is fire-and-forget: `play` starts a voice and returns, nothing
/// reports back when it ends.
pub trait AudioOutput: Send {
    fn load(&mut self, resource: &ResourceHandle) -> Result<SoundId>;
    fn play(&mut self, sound: SoundId, rate: f32, volume: f32) -> Result<()>;
    fn release(&mut self);
}

pub type SharedOutput = Arc<Mutex<Box<dyn AudioOutput>>>;

pub fn shared(output: impl AudioOutput + 'static) -> SharedOutput {
    let output: Box<dyn AudioOutput> = Box::new(output);
    Arc::new(Mutex::new(output))
}

/// Output used when no device is available: loads succeed, plays are silent
#[derive(Debug, Default)]
pub struct SilentOutput {
    next_id: u32,
}

impl SilentOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for SilentOutput {
    fn load(&mut self, _resource: &ResourceHandle) -> Result<SoundId> {
        let id = SoundId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    fn play(&mut self, _sound: SoundId, _rate: f32, _volume: f32) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) {}
}
