//! Тюнинг игрока (RON через `SimulationConfig`)

use serde::{Deserialize, Serialize};

use crate::combat::{DamageTuning, HitKind, KnockbackRequest};
use crate::components::StatusProfile;

/// Recast (cooldown) времена действий, секунды
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecastConfig {
    pub skill: f32,
    pub guard: f32,
    pub dodge: f32,
}

impl Default for RecastConfig {
    fn default() -> Self {
        Self {
            skill: 5.0,
            guard: 5.0,
            dodge: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub status: StatusProfile,

    // Движение
    pub move_speed: f32,
    /// Градусы в секунду
    pub rotation_speed: f32,

    // Атака
    pub max_combo: usize,
    pub attack_move_speed: f32,
    pub attack_move_time: f32,
    pub auto_turn_frames: u32,
    pub auto_turn_radius: f32,
    /// Fallback конца шага комбо, если animation driver не прислал AttackEnd
    pub attack_step_time: f32,
    /// Fallback открытия окна комбо (AttackInputWindow)
    pub combo_window_time: f32,
    pub skill_time: f32,

    // Guard
    pub guard_time: f32,
    pub guard_warning_time: f32,

    // Dodge
    pub dodge_time: f32,
    pub dodge_invincible_time: f32,
    pub dodge_move_speed: f32,
    pub dodge_move_duration: f32,

    // После урона
    pub damaged_invincible_time: f32,
    pub blink_interval: f32,

    pub recast: RecastConfig,
    pub damage: DamageTuning,
    /// Визуальный hitstop при попадании по врагу
    pub hit_stop_duration: f32,
    /// Нокбэк, который игрок накладывает на врагов
    pub knockback: KnockbackRequest,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            status: StatusProfile { max_hp: 10, attack: 10 },
            move_speed: 9.0,
            rotation_speed: 1200.0,
            max_combo: 2,
            attack_move_speed: 8.0,
            attack_move_time: 0.08,
            auto_turn_frames: 5,
            auto_turn_radius: 4.0,
            attack_step_time: 0.8,
            combo_window_time: 0.3,
            skill_time: 1.5,
            guard_time: 3.0,
            guard_warning_time: 2.0,
            dodge_time: 1.0,
            dodge_invincible_time: 0.4,
            dodge_move_speed: 8.0,
            dodge_move_duration: 0.7,
            damaged_invincible_time: 2.0,
            blink_interval: 0.05,
            recast: RecastConfig::default(),
            damage: DamageTuning::default(),
            hit_stop_duration: 0.02,
            knockback: KnockbackRequest::new(6.0, 0.5, HitKind::Attack),
        }
    }
}
