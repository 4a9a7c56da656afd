//! Combat: урон, реакции, нокбэк, hitstop, smash, bug field
//!
//! ECS ответственность:
//! - Контакты attack volume → take_damage → DamageReaction
//! - Follow-up'ы реакции: нокбэк, hitstop, smash (через события)
//! - Bug field стены: pulse урон игроку, отскок/поломка от врагов-"мячей"
//!
//! Движок ответственность:
//! - Коллизии сенсоров (AttackContact / HazardContact)
//! - Проигрывание CharacterEffect

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

pub mod damage;
pub mod hazard;
pub mod hit_registry;
pub mod hitstop;
pub mod knockback;
pub mod reaction;
pub mod resolver;
pub mod smash;

#[cfg(test)]
mod hitstop_tests;

// Re-export основных типов
pub use damage::{player_hit_damage, AttackStep, DamageTuning};
pub use hazard::{spawn_hazard_wall, HazardConfig, HazardField, WallHit};
pub use hit_registry::{AttackVolume, HitRegistry, VolumeMode};
pub use hitstop::{CapturedMotion, HitStop, HitStopTimer};
pub use reaction::{DamageReaction, Damageable, FreezeTarget, HitKind, HitStoppable, KnockbackReceiver, KnockbackRequest};
pub use smash::{PendingLaunch, SmashSettings, SmashTracker};

use crate::components::{BodyMode, NavAgent};
use crate::enemy::EnemyCharacter;
use crate::events::{
    AttackContact, CharacterEffect, DamageResolved, DestroyAllEnemies, HazardBroken, HazardContact, HitStopRequested,
    KnockbackRequested, ScoreChanged, SmashCountChanged, SmashRequested,
};
use crate::player::PlayerCharacter;
use crate::schedule::{FixedPhase, UpdatePhase};

/// Игрок + физические коллабораторы
pub(crate) type PlayerBody = (
    &'static mut PlayerCharacter,
    &'static mut Transform,
    &'static mut Velocity,
    &'static mut BodyMode,
);

/// Враг + физические коллабораторы (навигация опциональна)
pub(crate) type EnemyBody = (
    &'static mut EnemyCharacter,
    &'static mut Transform,
    &'static mut Velocity,
    &'static mut BodyMode,
    Option<&'static mut NavAgent>,
);

/// Combat Plugin
///
/// Порядок выполнения (update фаза):
/// 1. resolve_attack_contacts → tick_hazards → resolve_hazard_contacts — Combat
/// 2. apply_knockback_requests → handle_smash_requests → tick_smash_count
///    → tick_hitstops → apply_hitstop_requests → launch_pending_smashes — Reactions
///
/// tick ДО новых запросов: свежий hitstop держит полную длительность.
/// Fixed фаза: latch_hitstop_motion держит замороженные скорости нулём.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AttackContact>()
            .add_event::<HazardContact>()
            .add_event::<KnockbackRequested>()
            .add_event::<HitStopRequested>()
            .add_event::<SmashRequested>()
            .add_event::<DamageResolved>()
            .add_event::<SmashCountChanged>()
            .add_event::<ScoreChanged>()
            .add_event::<HazardBroken>()
            .add_event::<DestroyAllEnemies>()
            .add_event::<CharacterEffect>()
            .init_resource::<SmashSettings>()
            .init_resource::<SmashTracker>();

        app.add_systems(
            RunFixedMainLoop,
            (
                (
                    resolver::resolve_attack_contacts,
                    hazard::tick_hazards,
                    hazard::resolve_hazard_contacts,
                )
                    .chain()
                    .in_set(UpdatePhase::Combat),
                (
                    knockback::apply_knockback_requests,
                    smash::handle_smash_requests,
                    smash::tick_smash_count,
                    hitstop::tick_hitstops,
                    hitstop::apply_hitstop_requests,
                    smash::launch_pending_smashes,
                )
                    .chain()
                    .in_set(UpdatePhase::Reactions),
            ),
        );

        app.add_systems(FixedUpdate, hitstop::latch_hitstop_motion.in_set(FixedPhase::HitStop));
    }
}
