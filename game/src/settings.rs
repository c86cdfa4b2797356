use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bomb_core::{INITIAL_BOMB_INTERVAL_MS, INITIAL_TIME_LIMIT_MS, MIN_BOMB_INTERVAL_MS};

/// How the bomb interval shrinks after each defusal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DifficultyDecay {
    /// Multiply by 95/100 per defusal.
    Multiplicative,
    /// Subtract a fixed step per defusal.
    Additive,
}

/// Feature flags and difficulty numbers for one engine.
///
/// The game shipped in several evolutionary renditions; these flags collapse
/// them into one core instead of near-duplicate engines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameplaySettings {
    pub color_ramp: bool,
    pub anti_repeat: bool,
    pub score_display: bool,
    pub plant_tone: bool,
    pub decay: DifficultyDecay,
    pub initial_bomb_interval_ms: u32,
    pub min_bomb_interval_ms: u32,
    pub time_limit_ms: u32,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            color_ramp: true,
            anti_repeat: true,
            score_display: true,
            plant_tone: true,
            decay: DifficultyDecay::Multiplicative,
            initial_bomb_interval_ms: INITIAL_BOMB_INTERVAL_MS,
            min_bomb_interval_ms: MIN_BOMB_INTERVAL_MS,
            time_limit_ms: INITIAL_TIME_LIMIT_MS,
        }
    }
}

impl GameplaySettings {
    /// The earliest rendition: fixed armed color, no anti-repeat, no score
    /// screen, no plant tone, additive difficulty.
    pub fn classic() -> Self {
        Self {
            color_ramp: false,
            anti_repeat: false,
            score_display: false,
            plant_tone: false,
            decay: DifficultyDecay::Additive,
            ..Self::default()
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.time_limit_ms = self.time_limit_ms.max(1);
        self.min_bomb_interval_ms = self.min_bomb_interval_ms.max(1);
        if self.initial_bomb_interval_ms < self.min_bomb_interval_ms {
            self.initial_bomb_interval_ms = self.min_bomb_interval_ms;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub mute_all: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            mute_all: false,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    pub fn effective_sfx_gain(self) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlayerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub gameplay: GameplaySettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            audio: AudioSettings::default(),
            gameplay: GameplaySettings::default(),
        }
    }
}

impl PlayerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.audio = self.audio.clamp();
        self.gameplay = self.gameplay.sanitized();
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("PADBOMB_SETTINGS_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("padbomb");
        path.push("settings.json");
        Self { path }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Missing or unparseable settings fall back to defaults.
    pub fn load(&self) -> PlayerSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerSettings::default();
        };
        serde_json::from_slice::<PlayerSettings>(&bytes)
            .map(PlayerSettings::sanitized)
            .unwrap_or_else(|_| PlayerSettings::default())
    }

    pub fn save(&self, settings: &PlayerSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
