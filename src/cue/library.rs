use std::collections::HashMap;

use super::{Cue, CueKey};
use crate::audio::{AudioOutput, MediaProbe, FALLBACK_DURATION_MS};
use crate::resources::ResourceResolver;

pub type CueTable = HashMap<CueKey, Cue>;

/// Every cue that loaded at startup, read-only afterwards
#[derive(Debug, Default, Clone)]
pub struct CueLibrary {
    table: CueTable,
}

impl CueLibrary {
    /// Resolves, loads and measures every known cue.
    ///
    /// Keys without an asset are left out. Load failures are logged and skip
    /// only that key. Each loaded cue is played once at zero volume at
    /// `warm_rate` so its first audible play does not pay the decode cost.
    pub fn initialize(
        resolver: &ResourceResolver,
        output: &mut dyn AudioOutput,
        probe: &dyn MediaProbe,
        warm_rate: f32,
    ) -> Self {
        let mut table = CueTable::new();

        for key in CueKey::all() {
            let name = key.resource_name();
            let Some(resource) = resolver.resolve(&name) else {
                tracing::debug!("No asset for {:?} ('{}'), skipping", key, name);
                continue;
            };

            let sound = match output.load(&resource) {
                Ok(sound) => sound,
                Err(e) => {
                    tracing::warn!("Failed to load cue '{}' from {:?}: {}", name, resource.path, e);
                    continue;
                }
            };

            let duration_ms = match probe.duration_ms(&resource) {
                Ok(Some(ms)) => ms,
                Ok(None) => {
                    tracing::warn!("No duration for '{}', using {}ms", name, FALLBACK_DURATION_MS);
                    FALLBACK_DURATION_MS
                }
                Err(e) => {
                    tracing::warn!("Failed to probe '{}': {}. Using {}ms", name, e, FALLBACK_DURATION_MS);
                    FALLBACK_DURATION_MS
                }
            };

            if let Err(e) = output.play(sound, warm_rate, 0.0) {
                tracing::warn!("Warm-up play failed for '{}': {}", name, e);
            }

            table.insert(key, Cue { sound, duration_ms });
        }

        tracing::info!("Cue library ready: {}/{} cues loaded", table.len(), CueKey::all().len());
        Self { table }
    }

    pub fn lookup(&self, key: CueKey) -> Option<Cue> {
        self.table.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &CueTable {
        &self.table
    }
}
