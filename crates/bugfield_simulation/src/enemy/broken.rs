//! "Сломанный" враг: лежит в Down с самого начала, не перезагружается
//!
//! После smash катится `roll_duration` секунд и возвращается на исходную позицию.
//! Попадает в roster когда игрок подходит ближе `detection_radius`.

use bevy::prelude::*;

use super::character::EnemyCharacter;
use super::config::BrokenConfig;
use crate::components::CharacterBody;

#[derive(Component, Debug, Clone)]
pub struct BrokenEnemy {
    config: BrokenConfig,
    home: Vec3,
    rolling: bool,
    roll_timer: f32,
    detected: bool,
}

impl BrokenEnemy {
    pub fn new(config: BrokenConfig, home: Vec3) -> Self {
        Self {
            config,
            home,
            rolling: false,
            roll_timer: 0.0,
            detected: false,
        }
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// Update фаза: true ровно один раз — когда игрок впервые вошёл в радиус
    pub fn detect(&mut self, position: Vec3, players: impl IntoIterator<Item = Vec3>) -> bool {
        if self.detected {
            return false;
        }

        let radius = self.config.detection_radius;
        if players.into_iter().any(|player| position.distance(player) <= radius) {
            self.detected = true;
            return true;
        }
        false
    }

    /// До fixed_update машины: smash этого шага запускает прокатку
    ///
    /// Машина в Down сбрасывает `is_rolled`, поэтому флаг снимается раньше неё.
    pub fn latch_roll(&mut self, enemy: &EnemyCharacter) {
        if enemy.core().is_rolled {
            self.rolling = true;
            self.roll_timer = 0.0;
        }
    }

    /// После fixed_update машины. true — враг вернулся домой на этом шаге.
    pub fn advance_roll(&mut self, dt: f32, enemy: &mut EnemyCharacter, body: &mut CharacterBody) -> bool {
        if !self.rolling {
            return false;
        }

        self.roll_timer += dt;
        if self.roll_timer < self.config.roll_duration {
            return false;
        }

        enemy.return_home(self.home, body);
        self.rolling = false;
        self.roll_timer = 0.0;

        crate::logger::log(&format!("Broken enemy returned home {:?}", self.home));
        true
    }
}
