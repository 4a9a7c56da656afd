//! Enemy системы (цели, cues, обе фазы, roster, публикация)

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

use super::broken::BrokenEnemy;
use super::character::{EnemyCharacter, EnemyEnv};
use super::roster::EnemyRoster;
use crate::components::{effects::sfx, BodyMode, CharacterBody, EffectCommand, NavAgent};
use crate::events::{
    CharacterEffect, DestroyAllEnemies, EnemyCueFired, HpChanged, PlayerDied, StateChanged, TargetAssigned,
};
use crate::fsm::StateId;
use crate::player::PlayerCharacter;

type EnemyBodyQuery = (
    Entity,
    &'static mut EnemyCharacter,
    &'static mut Transform,
    &'static mut Velocity,
    &'static mut BodyMode,
    Option<&'static mut NavAgent>,
    Option<&'static mut BrokenEnemy>,
);

type TargetQuery<'w, 's> = Query<'w, 's, &'static Transform, (With<PlayerCharacter>, Without<EnemyCharacter>)>;

/// Позиция цели врага. Цель исчезла → снимаем её.
fn resolve_target(entity: Entity, enemy: &mut EnemyCharacter, targets: &TargetQuery) -> Option<Vec3> {
    let target = enemy.target()?;
    match targets.get(target) {
        Ok(transform) => Some(transform.translation),
        Err(_) => {
            crate::logger::log(&format!("Enemy {:?}: target {:?} is gone, cleared", entity, target));
            enemy.clear_target();
            None
        }
    }
}

/// Система: назначение/снятие целей (внешняя детекция)
pub fn assign_enemy_targets(
    mut assignments: EventReader<TargetAssigned>,
    mut roster: ResMut<EnemyRoster>,
    mut enemies: Query<&mut EnemyCharacter>,
) {
    for event in assignments.read() {
        let Ok(mut enemy) = enemies.get_mut(event.enemy) else {
            crate::logger::log_warning(&format!("TargetAssigned: {:?} is not an enemy", event.enemy));
            continue;
        };

        enemy.set_target(event.target);
        if event.target.is_some() && roster.register(event.enemy) {
            crate::logger::log(&format!("Enemy {:?} joined roster ({} total)", event.enemy, roster.len()));
        }
    }
}

/// Система: смерть игрока → все враги из roster'а теряют цель
pub fn clear_targets_on_player_death(
    mut deaths: EventReader<PlayerDied>,
    roster: Res<EnemyRoster>,
    mut enemies: Query<&mut EnemyCharacter>,
) {
    for death in deaths.read() {
        for enemy_entity in roster.iter() {
            if let Ok(mut enemy) = enemies.get_mut(enemy_entity) {
                enemy.clear_target();
            }
        }
        crate::logger::log_info(&format!("💀 Player {:?} died, {} enemies disengaged", death.entity, roster.len()));
    }
}

/// Система: разрушение bug field → взрыв всех врагов из roster'а
pub fn destroy_all_enemies(
    mut commands: Commands,
    mut requests: EventReader<DestroyAllEnemies>,
    mut roster: ResMut<EnemyRoster>,
    enemies: Query<(), With<EnemyCharacter>>,
    mut effects: EventWriter<CharacterEffect>,
) {
    // Несколько запросов за кадр = один взрыв
    if requests.read().count() == 0 {
        return;
    }

    let destroyed: Vec<Entity> = roster.iter().filter(|e| enemies.contains(*e)).collect();
    for entity in &destroyed {
        effects.write(CharacterEffect {
            entity: *entity,
            command: EffectCommand::Explode,
        });
        if let Ok(mut entity_commands) = commands.get_entity(*entity) {
            entity_commands.despawn();
        }
    }

    // Один звук на весь взрыв
    if let Some(first) = destroyed.first() {
        effects.write(CharacterEffect {
            entity: *first,
            command: EffectCommand::Sound(sfx::EXPLOSION_ENEMY),
        });
    }

    roster.clear();
    crate::logger::log_info(&format!("💥 Destroyed {} enemies", destroyed.len()));
}

/// Система: animation cues врагов
pub fn apply_enemy_cues(
    mut cues: EventReader<EnemyCueFired>,
    mut enemies: Query<
        (&mut EnemyCharacter, &mut Transform, &mut Velocity, &mut BodyMode, Option<&mut NavAgent>),
        Without<PlayerCharacter>,
    >,
) {
    for event in cues.read() {
        let Ok((mut enemy, mut transform, mut velocity, mut mode, nav)) = enemies.get_mut(event.entity) else {
            crate::logger::log_warning(&format!(
                "EnemyCue {:?}: entity {:?} is not an enemy",
                event.cue, event.entity
            ));
            continue;
        };

        let body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        enemy.handle_cue(event.cue, body);
    }
}

/// Система (update фаза): детекция broken врагов + StateMachine::update
pub fn update_enemies(
    time: Res<Time>,
    mut roster: ResMut<EnemyRoster>,
    mut enemies: Query<EnemyBodyQuery, Without<PlayerCharacter>>,
    targets: TargetQuery,
) {
    let dt = time.delta_secs();

    for (entity, mut enemy, mut transform, mut velocity, mut mode, nav, broken) in enemies.iter_mut() {
        if let Some(mut broken) = broken {
            let players = targets.iter().map(|t| t.translation);
            if broken.detect(transform.translation, players) {
                roster.register(entity);
                crate::logger::log(&format!("Broken enemy {:?} detected by player", entity));
            }
        }

        let env = EnemyEnv {
            dt,
            target_position: resolve_target(entity, &mut enemy, &targets),
        };
        let body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        enemy.update(body, env);
    }
}

/// Система (fixed фаза): StateMachine::fixed_update + прокатка broken врагов
pub fn fixed_update_enemies(
    time: Res<Time>,
    mut enemies: Query<EnemyBodyQuery, Without<PlayerCharacter>>,
    targets: TargetQuery,
) {
    let dt = time.delta_secs();

    for (entity, mut enemy, mut transform, mut velocity, mut mode, nav, mut broken) in enemies.iter_mut() {
        let env = EnemyEnv {
            dt,
            target_position: resolve_target(entity, &mut enemy, &targets),
        };

        if let Some(broken) = broken.as_deref_mut() {
            broken.latch_roll(&enemy);
        }

        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        enemy.fixed_update(body.reborrow(), env);

        if let Some(broken) = broken.as_deref_mut() {
            broken.advance_roll(dt, &mut enemy, &mut body);
        }
    }
}

/// Система: журналы/outbox врагов → события
pub fn publish_enemy_changes(
    mut enemies: Query<(Entity, &mut EnemyCharacter)>,
    mut effects: EventWriter<CharacterEffect>,
    mut hp_changes: EventWriter<HpChanged>,
    mut states: EventWriter<StateChanged>,
) {
    for (entity, mut enemy) in enemies.iter_mut() {
        for transition in enemy.take_transitions() {
            states.write(StateChanged {
                entity,
                from: transition.from.map(|s| s.name()),
                to: transition.to.name(),
            });
        }

        for change in enemy.take_hp_changes() {
            hp_changes.write(HpChanged {
                entity,
                previous: change.previous,
                current: change.current,
                max: change.max,
            });
        }

        for command in enemy.drain_effects() {
            effects.write(CharacterEffect { entity, command });
        }
    }
}
