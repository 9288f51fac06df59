use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::bank::Skill;

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 180;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory or base URL holding `questions/{skill}/...`.
    #[serde(default = "default_bank_location")]
    pub bank_location: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_listening_minutes")]
    pub listening_minutes: u32,
    #[serde(default = "default_reading_minutes")]
    pub reading_minutes: u32,
    #[serde(default = "default_writing_minutes")]
    pub writing_minutes: u32,
    #[serde(default = "default_speaking_minutes")]
    pub speaking_minutes: u32,
    /// Platform microphone name, e.g. `hw:1` or `:1`.
    #[serde(default)]
    pub mic_device: Option<String>,
    /// Raw ffmpeg input format and source; both or neither.
    #[serde(default)]
    pub mic_ffmpeg_format: Option<String>,
    #[serde(default)]
    pub mic_ffmpeg_source: Option<String>,
    #[serde(default = "default_recordings_dir")]
    pub recordings_dir: String,
}

fn default_bank_location() -> String {
    ".".to_string()
}
fn default_theme() -> String {
    "midnight".to_string()
}
fn default_listening_minutes() -> u32 {
    Skill::Listening.default_minutes()
}
fn default_reading_minutes() -> u32 {
    Skill::Reading.default_minutes()
}
fn default_writing_minutes() -> u32 {
    Skill::Writing.default_minutes()
}
fn default_speaking_minutes() -> u32 {
    Skill::Speaking.default_minutes()
}
fn default_recordings_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ielts-mock")
        .join("recordings")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_location: default_bank_location(),
            theme: default_theme(),
            listening_minutes: default_listening_minutes(),
            reading_minutes: default_reading_minutes(),
            writing_minutes: default_writing_minutes(),
            speaking_minutes: default_speaking_minutes(),
            mic_device: None,
            mic_ffmpeg_format: None,
            mic_ffmpeg_source: None,
            recordings_dir: default_recordings_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ielts-mock")
            .join("config.toml")
    }

    pub fn duration_minutes(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Listening => self.listening_minutes,
            Skill::Reading => self.reading_minutes,
            Skill::Writing => self.writing_minutes,
            Skill::Speaking => self.speaking_minutes,
        }
    }

    /// Clamp durations into range and fall back to the default theme when
    /// `theme` is not one of `known_themes`.
    pub fn validate(&mut self, known_themes: &[String]) {
        for minutes in [
            &mut self.listening_minutes,
            &mut self.reading_minutes,
            &mut self.writing_minutes,
            &mut self.speaking_minutes,
        ] {
            *minutes = (*minutes).clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);
        }
        if !known_themes.iter().any(|t| *t == self.theme) {
            self.theme = default_theme();
        }
        if self.bank_location.trim().is_empty() {
            self.bank_location = default_bank_location();
        }
    }
}
