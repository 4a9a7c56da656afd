//! Контракт attacker ↔ defender
//!
//! `DamageReaction` — результат попытки урона (ожидаемые исходы, не ошибки).
//! `KnockbackRequest` — как сильно, куда и на сколько оттолкнуть получателя.
//! Capability traits реализуют оба варианта персонажа (Player, Enemy).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::CharacterBody;

/// Исход `take_damage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum DamageReaction {
    /// Урон прошёл, цель отбрасывается
    Damaged,
    /// Урон прошёл, без нокбэка (цель в атаке)
    DamagedOnly,
    /// Цель лежит в Down → запуск "мячом" вместо урона
    Smash,
    /// Атака заблокирована
    Guarded,
    /// Атака проигнорирована (dodge / post-hit окно)
    Invincible,
    /// HP на нуле → Down/Die
    Down,
}

impl DamageReaction {
    /// Был ли урон применён к ledger'у
    pub fn dealt_damage(&self) -> bool {
        matches!(self, DamageReaction::Damaged | DamageReaction::DamagedOnly | DamageReaction::Down)
    }
}

/// Тип удара: выбирает математику нокбэка и скорость анимации реакции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum HitKind {
    /// Обычная атака персонажа
    #[default]
    Attack,
    /// Удар врагом-"мячом"
    BallHit,
    /// Отдача атакующего после блока
    Guarded,
    /// Импульс от стены bug field (явное направление)
    WallHit,
}

/// Запрос нокбэка
///
/// `source` — позиция атакующего (заполняется при резолве, в шаблонах конфига пусто).
/// `direction` — явное направление (area/environment), имеет приоритет над `source`.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct KnockbackRequest {
    #[serde(skip)]
    pub source: Option<Vec3>,
    #[serde(default)]
    pub direction: Option<Vec3>,
    pub power: f32,
    /// Сколько получатель заперт в Damaged (секунды)
    pub reaction_duration: f32,
    #[serde(default)]
    pub kind: HitKind,
}

impl KnockbackRequest {
    pub fn new(power: f32, reaction_duration: f32, kind: HitKind) -> Self {
        Self {
            source: None,
            direction: None,
            power,
            reaction_duration,
            kind,
        }
    }

    pub fn from_source(mut self, source: Vec3) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Скорость толчка для получателя в `recipient`
    ///
    /// - явное направление: `normalize(direction) × power` (позиции не учитываются)
    /// - иначе: `normalize_xz(recipient − source) × power`
    /// - None: нет валидных данных → толчок пропускается (урон уже применён)
    pub fn push_velocity(&self, recipient: Vec3) -> Option<Vec3> {
        if let Some(direction) = self.direction {
            return direction.try_normalize().map(|dir| dir * self.power);
        }

        let source = self.source?;
        crate::components::planar_direction(source, recipient).map(|dir| dir * self.power)
    }
}

/// Куда пишет hitstop при заморозке физики
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeTarget {
    /// Rigidbody скорость (`go_kinematic` — на время freeze тело становится kinematic)
    Body { go_kinematic: bool },
    /// Скорость navigation агента
    Navigation,
}

/// Может получать урон
pub trait Damageable {
    fn take_damage(&mut self, amount: i32, body: &mut CharacterBody) -> DamageReaction;
}

/// Может быть отброшен
pub trait KnockbackReceiver {
    /// Возвращает false если запрос отклонён (терминальное состояние)
    fn apply_knockback(&mut self, request: &KnockbackRequest, body: &mut CharacterBody) -> bool;
}

/// Может быть заморожен hitstop'ом
pub trait HitStoppable {
    fn freeze_target(&self) -> FreezeTarget;
}
