//! Очки за smash серии
//!
//! Начисление включает/выключает внешний game flow (например на время диалогов).

use bevy::prelude::*;

use crate::events::ScoreChanged;

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Score {
    total: i64,
    enabled: bool,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Score {
    pub fn new(enabled: bool) -> Self {
        Self { total: 0, enabled }
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// false — начисление выключено, total не изменился
    pub fn add(&mut self, amount: i64) -> bool {
        if !self.enabled {
            return false;
        }
        self.total += amount;
        true
    }
}

pub struct ScorePlugin;

impl Plugin for ScorePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ScoreChanged>().init_resource::<Score>();
    }
}
