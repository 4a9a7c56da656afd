//! Конфигурация симуляции (RON)
//!
//! Один файл на уровень: игрок, враги, broken враги, smash, bug field, status table.
//! Любое поле можно опустить — берётся default.
//!
//! ```ron
//! (
//!     player: (move_speed: 9.0),
//!     enemy: (attack_distance: 2.5, down_duration: 4.0),
//!     status_table: (entries: [(max_hp: 30, attack: 2), (max_hp: 50, attack: 3)]),
//!     score_enabled: true,
//! )
//! ```

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{HazardConfig, SmashSettings};
use crate::components::{StatusProfile, StatusTable};
use crate::enemy::{BrokenConfig, EnemyConfig};
use crate::player::PlayerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config RON: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub broken: BrokenConfig,
    pub smash: SmashSettings,
    pub hazard: HazardConfig,
    pub status_table: StatusTable,
    pub score_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            broken: BrokenConfig::default(),
            smash: SmashSettings::default(),
            hazard: HazardConfig::default(),
            status_table: StatusTable::default(),
            score_enabled: true,
        }
    }
}

impl SimulationConfig {
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_ron_str(&content)?;
        crate::logger::log_info(&format!(
            "📄 Config loaded from {:?} ({} status entries)",
            path,
            config.status_table.entries.len()
        ));
        Ok(config)
    }

    /// Профиль врага по `status_index` конфига (нет индекса → fallback)
    pub fn enemy_profile(&self, config: &EnemyConfig) -> StatusProfile {
        match config.status_index {
            Some(index) => self.status_table.profile(index),
            None => StatusProfile::FALLBACK,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let profiles = std::iter::once(&self.player.status).chain(self.status_table.entries.iter());
        if let Some(bad) = profiles.into_iter().find(|p| p.max_hp <= 0) {
            return Err(ConfigError::Invalid(format!("max_hp must be positive, got {:?}", bad)));
        }
        if self.player.max_combo == 0 {
            return Err(ConfigError::Invalid("player.max_combo must be at least 1".into()));
        }
        if self.hazard.max_health == 0 {
            return Err(ConfigError::Invalid("hazard.max_health must be at least 1".into()));
        }
        Ok(())
    }
}
