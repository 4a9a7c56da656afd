//! События между core и внешними коллабораторами
//!
//! Входящие: контакты (физика), animation cues, ввод, назначение целей.
//! Исходящие: эффекты, HP/флаги/состояния (UI, AI), результаты ударов.

use bevy::prelude::*;

use crate::combat::{DamageReaction, HitKind, KnockbackRequest};
use crate::components::EffectCommand;
use crate::player::{ActionButton, RecastAction};

// ============================================================================
// Входящие
// ============================================================================

/// Attack volume `attacker` пересёкся с `target` (spatial overlap query)
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackContact {
    pub attacker: Entity,
    pub target: Entity,
    /// Точка удара (для эффектов)
    pub point: Vec3,
}

/// Фаза контакта с bug field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
}

/// Персонаж касается стены bug field
#[derive(Event, Debug, Clone, Copy)]
pub struct HazardContact {
    pub hazard: Entity,
    pub entity: Entity,
    /// Нормаль контакта (из стены в персонажа не гарантируется — как отдаёт физика)
    pub normal: Vec3,
    pub point: Vec3,
    pub phase: ContactPhase,
}

/// Animation cue игрока (тайминги из анимационного клипа)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCue {
    /// Окно ввода следующего удара комбо
    AttackWindow(bool),
    /// Показать slash эффект фазы атаки
    SlashEffect(usize),
    EnableAttackVolume,
    EnableSkillVolume,
    DisableAttackVolume,
    /// Начало рывка вперёд во время удара
    AttackMoveBegin,
    AttackEnd,
    SkillEnd,
    DodgeFinish,
}

/// Animation cue врага (рывковая атака)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyCue {
    SetupAttack,
    Charge,
    CanMove,
    NotLook,
    /// Начало рывка (агент разгоняется вперёд)
    RushMoveBegin,
    Rush,
    AttackEnd,
    TakeDamage,
    HitBox(bool),
}

#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerCueFired {
    pub entity: Entity,
    pub cue: PlayerCue,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyCueFired {
    pub entity: Entity,
    pub cue: EnemyCue,
}

/// Кнопка действия нажата/отпущена
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerActionInput {
    pub entity: Entity,
    pub button: ActionButton,
    pub pressed: bool,
}

/// Ось движения игрока
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerMoveInput {
    pub entity: Entity,
    pub axis: Vec2,
}

/// Внешняя детекция назначила/сняла цель врага
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetAssigned {
    pub enemy: Entity,
    pub target: Option<Entity>,
}

/// Внешний запрос нокбэка (API `apply_knockback`)
#[derive(Event, Debug, Clone, Copy)]
pub struct KnockbackRequested {
    pub target: Entity,
    pub request: KnockbackRequest,
}

/// Запрос hitstop (API `request_hit_stop`)
#[derive(Event, Debug, Clone, Copy)]
pub struct HitStopRequested {
    pub target: Entity,
    pub duration: f32,
    pub affects_physics: bool,
}

/// Запуск врага в Down "мячом"
#[derive(Event, Debug, Clone, Copy)]
pub struct SmashRequested {
    pub attacker: Entity,
    pub target: Entity,
    pub direction: Vec3,
}

/// Уничтожить всех врагов из roster'а (разрушение bug field)
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct DestroyAllEnemies;

// ============================================================================
// Исходящие
// ============================================================================

/// Fire-and-forget команда эффекта от персонажа
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CharacterEffect {
    pub entity: Entity,
    pub command: EffectCommand,
}

/// HP изменилось (только при реальном изменении)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpChanged {
    pub entity: Entity,
    pub previous: i32,
    pub current: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionFlag {
    Guarding,
    Invincible,
}

/// Флаг окна реакции переключился
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionFlagChanged {
    pub entity: Entity,
    pub flag: ReactionFlag,
    pub active: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    pub entity: Entity,
    pub from: Option<&'static str>,
    pub to: &'static str,
}

/// Результат резолва удара
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageResolved {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: i32,
    pub reaction: DamageReaction,
    pub kind: HitKind,
    pub point: Vec3,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDied {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RecastChanged {
    pub entity: Entity,
    pub action: RecastAction,
    pub timer: f32,
    pub recast: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmashCountChanged {
    pub count: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged {
    pub total: i64,
}

/// Прочность bug field закончилась
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardBroken {
    pub hazard: Entity,
}
