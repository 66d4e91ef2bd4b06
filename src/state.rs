use std::path::PathBuf;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub cues: CueSettings,
    #[serde(default)]
    pub general: GeneralSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueSettings {
    /// Directory holding `<namespace>/<resource>.wav`
    pub asset_root: PathBuf,
    pub namespaces: Namespaces,
}

impl Default for CueSettings {
    fn default() -> Self {
        let asset_root = dirs::data_dir()
            .map(|dir| dir.join("KeypadCues").join("cues"))
            .unwrap_or_else(|| PathBuf::from("cues"));
        Self {
            asset_root,
            namespaces: Namespaces::default(),
        }
    }
}

/// Asset namespaces, tried in field order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespaces {
    pub current: String,
    pub application: String,
    pub legacy: String,
    pub base: String,
}

impl Namespaces {
    pub fn candidates(&self) -> [&str; 4] {
        [
            self.current.as_str(),
            self.application.as_str(),
            self.legacy.as_str(),
            self.base.as_str(),
        ]
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            current: "keypad.calculator".to_string(),
            application: "keypad.calculator".to_string(),
            legacy: "calculator2".to_string(),
            base: "base".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub sound_feedback: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            sound_feedback: true,
        }
    }
}
