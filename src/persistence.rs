use std::path::{Path, PathBuf};
use anyhow::{Result, Context};

use crate::state::Settings;

const SETTINGS_FILE: &str = "settings.json";

/// Default settings location under the user's config directory
pub fn settings_path() -> Result<PathBuf> {
    let config = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?;
    Ok(config.join("KeypadCues").join(SETTINGS_FILE))
}

pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        tracing::info!("No stored settings found at {:?}. Using defaults.", path);
        return Settings::default();
    }

    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("Failed to read settings file {:?}: {}. Using defaults.", path, e);
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to deserialize stored settings: {}. Using defaults.", e);
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
    }
    let data = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write settings to {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("nope.json"));
        assert!(settings.general.sound_feedback);
        assert_eq!(settings.cues.namespaces.base, "base");
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_settings(&path).general.sound_feedback);
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let mut settings = Settings::default();
        settings.general.sound_feedback = false;
        settings.cues.asset_root = dir.path().join("assets");
        settings.cues.namespaces.current = "rebranded.calc".to_string();
        save_settings(&path, &settings).unwrap();

        let loaded = load_settings(&path);
        assert!(!loaded.general.sound_feedback);
        assert_eq!(loaded.cues.asset_root, dir.path().join("assets"));
        assert_eq!(loaded.cues.namespaces.current, "rebranded.calc");
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "general": { "sound_feedback": false } }"#).unwrap();
        let loaded = load_settings(&path);
        assert!(!loaded.general.sound_feedback);
        assert_eq!(loaded.cues.namespaces, crate::state::Namespaces::default());
    }
}
