//! Enemy: state set, roster, broken варианты
//!
//! Update фаза: цели → cues → StateMachine::update (погоня/атака).
//! Fixed фаза: таймеры нокбэка и Down, прокатка broken врагов.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

pub mod broken;
pub mod character;
pub mod config;
pub mod roster;
pub mod states;
pub mod systems;

#[cfg(test)]
mod character_tests;

pub use broken::BrokenEnemy;
pub use character::{EnemyCharacter, EnemyCore, EnemyCtx, EnemyEnv};
pub use config::{BrokenConfig, EnemyConfig, KnockbackAnimRates};
pub use roster::EnemyRoster;
pub use states::EnemyState;

use crate::combat::HitStop;
use crate::components::{AnimationRate, BodyMode, NavAgent, StatusProfile};
use crate::events::{
    CharacterEffect, DestroyAllEnemies, EnemyCueFired, HpChanged, PlayerDied, StateChanged, TargetAssigned,
};
use crate::schedule::{FixedPhase, UpdatePhase};

/// Enemy Plugin
///
/// Порядок выполнения (update фаза):
/// 1. assign_enemy_targets / apply_enemy_cues — Input
/// 2. clear_targets_on_player_death / destroy_all_enemies — Reactions
/// 3. update_enemies — States
/// 4. publish_enemy_changes — Publish (и в конце fixed фазы)
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TargetAssigned>()
            .add_event::<EnemyCueFired>()
            .add_event::<DestroyAllEnemies>()
            .add_event::<PlayerDied>()
            .add_event::<CharacterEffect>()
            .add_event::<HpChanged>()
            .add_event::<StateChanged>()
            .init_resource::<EnemyRoster>();

        app.add_systems(
            RunFixedMainLoop,
            (
                (systems::assign_enemy_targets, systems::apply_enemy_cues)
                    .chain()
                    .in_set(UpdatePhase::Input),
                (systems::clear_targets_on_player_death, systems::destroy_all_enemies)
                    .chain()
                    .in_set(UpdatePhase::Reactions),
                systems::update_enemies.in_set(UpdatePhase::States),
                systems::publish_enemy_changes.in_set(UpdatePhase::Publish),
            ),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::fixed_update_enemies.in_set(FixedPhase::States),
                systems::publish_enemy_changes.in_set(FixedPhase::Publish),
            ),
        );
    }
}

/// Spawn helper: обычный враг (навигация + kinematic тело)
pub fn spawn_enemy(commands: &mut Commands, profile: StatusProfile, config: EnemyConfig, position: Vec3) -> Entity {
    let nav = NavAgent::new(config.move_speed);
    commands
        .spawn((
            Transform::from_translation(position),
            EnemyCharacter::new(profile, config),
            Velocity::default(),
            BodyMode::Kinematic,
            nav,
            AnimationRate::default(),
            HitStop::default(),
        ))
        .id()
}

/// Spawn helper: "сломанный" враг, лежит в Down в `position`
pub fn spawn_broken_enemy(
    commands: &mut Commands,
    profile: StatusProfile,
    config: EnemyConfig,
    broken: BrokenConfig,
    position: Vec3,
) -> Entity {
    let nav = NavAgent::new(config.move_speed);
    commands
        .spawn((
            Transform::from_translation(position),
            EnemyCharacter::broken(profile, config),
            BrokenEnemy::new(broken, position),
            Velocity::default(),
            BodyMode::Kinematic,
            nav,
            AnimationRate::default(),
            HitStop::default(),
        ))
        .id()
}
