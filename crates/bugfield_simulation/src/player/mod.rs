//! Player: state set, ввод, recast
//!
//! Update фаза: ввод → cues → StateMachine::update → публикация.
//! Fixed фаза: движение (Move/Attack lunge/Dodge roll).

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

pub mod character;
pub mod config;
pub mod input;
pub mod recast;
pub mod states;
pub mod systems;

#[cfg(test)]
mod character_tests;

pub use character::{PlayerCharacter, PlayerCore, PlayerCtx, PlayerEnv, PostHitWindow};
pub use config::{PlayerConfig, RecastConfig};
pub use input::{ActionButton, MoveBasis, PlayerInput};
pub use recast::{RecastAction, RecastChange, RecastTimer, RecastTimers};
pub use states::PlayerState;

use crate::combat::HitStop;
use crate::components::{AnimationRate, BodyMode};
use crate::events::{
    CharacterEffect, HpChanged, PlayerActionInput, PlayerCueFired, PlayerDied, PlayerMoveInput, ReactionFlagChanged,
    RecastChanged, StateChanged,
};
use crate::schedule::{FixedPhase, UpdatePhase};

/// Player Plugin
///
/// Порядок выполнения (update фаза):
/// 1. apply_player_input / apply_player_cues — Input
/// 2. update_players — States
/// 3. publish_player_changes — Publish (и в конце fixed фазы)
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerActionInput>()
            .add_event::<PlayerMoveInput>()
            .add_event::<PlayerCueFired>()
            .add_event::<PlayerDied>()
            .add_event::<RecastChanged>()
            .add_event::<CharacterEffect>()
            .add_event::<HpChanged>()
            .add_event::<ReactionFlagChanged>()
            .add_event::<StateChanged>()
            .init_resource::<MoveBasis>();

        app.add_systems(
            RunFixedMainLoop,
            (
                (systems::apply_player_input, systems::apply_player_cues)
                    .chain()
                    .in_set(UpdatePhase::Input),
                systems::update_players.in_set(UpdatePhase::States),
                systems::publish_player_changes.in_set(UpdatePhase::Publish),
            ),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::fixed_update_players.in_set(FixedPhase::States),
                systems::publish_player_changes.in_set(FixedPhase::Publish),
            ),
        );
    }
}

/// Spawn helper: игрок со всеми физическими коллабораторами
pub fn spawn_player(commands: &mut Commands, config: PlayerConfig, position: Vec3) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            PlayerCharacter::new(config),
            Velocity::default(),
            BodyMode::default(),
            AnimationRate::default(),
            HitStop::default(),
        ))
        .id()
}
