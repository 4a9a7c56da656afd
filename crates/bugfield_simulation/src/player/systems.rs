//! Player системы (ввод, cues, обе фазы, публикация изменений)

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

use super::character::{PlayerCharacter, PlayerEnv};
use super::input::MoveBasis;
use crate::components::{BodyMode, CharacterBody};
use crate::enemy::{EnemyCharacter, EnemyRoster};
use crate::fsm::StateId;
use crate::events::{
    CharacterEffect, HpChanged, PlayerActionInput, PlayerCueFired, PlayerDied, PlayerMoveInput, ReactionFlag,
    ReactionFlagChanged, RecastChanged, StateChanged,
};

type PlayerBodyQuery = (
    Entity,
    &'static mut PlayerCharacter,
    &'static mut Transform,
    &'static mut Velocity,
    &'static mut BodyMode,
);

/// Система: события ввода → PlayerInput
pub fn apply_player_input(
    mut actions: EventReader<PlayerActionInput>,
    mut moves: EventReader<PlayerMoveInput>,
    mut players: Query<&mut PlayerCharacter>,
) {
    for event in moves.read() {
        if let Ok(mut player) = players.get_mut(event.entity) {
            player.set_move_axis(event.axis);
        }
    }

    for event in actions.read() {
        let Ok(mut player) = players.get_mut(event.entity) else {
            continue;
        };

        if !player.press(event.button, event.pressed) {
            crate::logger::log(&format!(
                "Player: {:?} press rejected by gate in {}",
                event.button,
                player.current_state_name()
            ));
        }
    }
}

/// Система: animation cues игрока
pub fn apply_player_cues(mut cues: EventReader<PlayerCueFired>, mut players: Query<&mut PlayerCharacter>) {
    for event in cues.read() {
        match players.get_mut(event.entity) {
            Ok(mut player) => player.handle_cue(event.cue),
            Err(_) => crate::logger::log_warning(&format!(
                "PlayerCue {:?}: entity {:?} is not a player",
                event.cue, event.entity
            )),
        }
    }
}

/// Система (update фаза): recast, post-hit окно, StateMachine::update
pub fn update_players(
    time: Res<Time>,
    basis: Res<MoveBasis>,
    roster: Res<EnemyRoster>,
    mut players: Query<PlayerBodyQuery, Without<EnemyCharacter>>,
    enemies: Query<&Transform, (With<EnemyCharacter>, Without<PlayerCharacter>)>,
) {
    let dt = time.delta_secs();
    let move_basis = *basis;

    for (_, mut player, mut transform, mut velocity, mut mode) in players.iter_mut() {
        let radius = player.config().auto_turn_radius;
        let nearest_enemy = roster
            .nearest(transform.translation, radius, |enemy| {
                enemies.get(enemy).ok().map(|t| t.translation)
            })
            .map(|(_, position)| position);

        let env = PlayerEnv {
            dt,
            nearest_enemy,
            move_basis,
        };
        let body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, None);
        player.update(body, env);
    }
}

/// Система (fixed фаза): StateMachine::fixed_update
pub fn fixed_update_players(
    time: Res<Time>,
    basis: Res<MoveBasis>,
    mut players: Query<PlayerBodyQuery, Without<EnemyCharacter>>,
) {
    let env = PlayerEnv {
        dt: time.delta_secs(),
        nearest_enemy: None,
        move_basis: *basis,
    };

    for (_, mut player, mut transform, mut velocity, mut mode) in players.iter_mut() {
        let body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, None);
        player.fixed_update(body, env);
    }
}

/// Система: outbox/журналы игрока → события
#[allow(clippy::too_many_arguments)]
pub fn publish_player_changes(
    mut players: Query<(Entity, &mut PlayerCharacter)>,
    mut effects: EventWriter<CharacterEffect>,
    mut hp_changes: EventWriter<HpChanged>,
    mut flags: EventWriter<ReactionFlagChanged>,
    mut states: EventWriter<StateChanged>,
    mut recasts: EventWriter<RecastChanged>,
    mut deaths: EventWriter<PlayerDied>,
) {
    for (entity, mut player) in players.iter_mut() {
        for transition in player.take_transitions() {
            states.write(StateChanged {
                entity,
                from: transition.from.map(|s| s.name()),
                to: transition.to.name(),
            });
        }

        for change in player.take_hp_changes() {
            hp_changes.write(HpChanged {
                entity,
                previous: change.previous,
                current: change.current,
                max: change.max,
            });
        }

        if let Some((previous, current)) = player.take_flag_changes() {
            if previous.guarding != current.guarding {
                flags.write(ReactionFlagChanged {
                    entity,
                    flag: ReactionFlag::Guarding,
                    active: current.guarding,
                });
            }
            if previous.invincible != current.invincible {
                flags.write(ReactionFlagChanged {
                    entity,
                    flag: ReactionFlag::Invincible,
                    active: current.invincible,
                });
            }
        }

        for change in player.take_recast_changes() {
            recasts.write(RecastChanged {
                entity,
                action: change.action,
                timer: change.timer,
                recast: change.recast,
            });
        }

        for command in player.drain_effects() {
            effects.write(CharacterEffect { entity, command });
        }

        if player.take_death() {
            deaths.write(PlayerDied { entity });
        }
    }
}
