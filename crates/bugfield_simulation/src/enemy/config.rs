//! Тюнинг врагов (RON через `SimulationConfig`)

use serde::{Deserialize, Serialize};

use crate::combat::{HitKind, KnockbackRequest};

/// Скорость анимации нокбэка по типу удара
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnockbackAnimRates {
    pub attack: f32,
    pub ball_hit: f32,
    pub guarded: f32,
}

impl Default for KnockbackAnimRates {
    fn default() -> Self {
        Self {
            attack: 0.2,
            ball_hit: 0.5,
            guarded: 0.067,
        }
    }
}

impl KnockbackAnimRates {
    /// None — тип удара не проигрывает анимацию нокбэка (стена)
    pub fn for_kind(&self, kind: HitKind) -> Option<f32> {
        match kind {
            HitKind::Attack => Some(self.attack),
            HitKind::BallHit => Some(self.ball_hit),
            HitKind::Guarded => Some(self.guarded),
            HitKind::WallHit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Индекс в `StatusTable` (None / вне диапазона → fallback профиль)
    pub status_index: Option<usize>,
    /// Battle ↔ Attack порог (строго меньше)
    pub attack_distance: f32,
    /// Обычная скорость навигации
    pub move_speed: f32,
    /// Скорость рывка
    pub attack_speed: f32,
    /// Длина рывка вперёд
    pub attack_move_distance: f32,
    /// Fallback цикла атаки без animation driver'а (CanMove)
    pub attack_cycle_time: f32,
    pub down_duration: f32,
    pub knockback_anim: KnockbackAnimRates,
    /// Урон врага-"мяча"
    pub ball_attack: i32,
    /// Нокбэк, который враг накладывает на игрока
    pub knockback: KnockbackRequest,
    /// Отдача самому себе, если игрок заблокировал удар
    pub guarded: KnockbackRequest,
    /// Нокбэк от удара "мячом"
    pub ball: KnockbackRequest,
    pub hit_stop_duration: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            status_index: None,
            attack_distance: 2.5,
            move_speed: 3.5,
            attack_speed: 5.0,
            attack_move_distance: 3.0,
            attack_cycle_time: 2.0,
            down_duration: 4.0,
            knockback_anim: KnockbackAnimRates::default(),
            ball_attack: 10,
            knockback: KnockbackRequest::new(8.0, 0.6, HitKind::Attack),
            guarded: KnockbackRequest::new(10.0, 0.8, HitKind::Guarded),
            ball: KnockbackRequest::new(12.0, 1.0, HitKind::BallHit),
            hit_stop_duration: 0.02,
        }
    }
}

/// Параметры "сломанного" врага (не перезагружается, лежит с самого начала)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokenConfig {
    /// Сколько катится после smash, потом возвращается домой
    pub roll_duration: f32,
    /// Радиус, в котором игрок "замечает" врага (регистрация в roster)
    pub detection_radius: f32,
}

impl Default for BrokenConfig {
    fn default() -> Self {
        Self {
            roll_duration: 3.0,
            detection_radius: 7.0,
        }
    }
}
