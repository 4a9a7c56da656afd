//! Rapier bridge: контракт физики ↔ core
//!
//! - BodyMode → RigidBody (+ LockedAxes для персонажей без свободного вращения)
//! - attack volume выключен → ColliderDisabled на сенсоре
//! - CollisionEvent сенсора оружия → AttackContact
//! - CollisionEvent стены bug field → HazardContact (Enter, затем Stay каждый кадр касания)
//!
//! Rapier step/sync остаются на хосте (RapierPhysicsPlugin добавляет он).

use std::collections::BTreeSet;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::combat::HazardField;
use crate::components::BodyMode;
use crate::enemy::EnemyCharacter;
use crate::events::{AttackContact, ContactPhase, HazardContact};
use crate::player::PlayerCharacter;
use crate::schedule::UpdatePhase;

/// Сенсор attack volume (дочерний collider персонажа)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackSensor {
    pub owner: Entity,
}

/// Пары (стена, персонаж), которые сейчас касаются (упорядочены для детерминизма)
#[derive(Resource, Debug, Default)]
pub struct HazardTouches {
    pairs: BTreeSet<(Entity, Entity)>,
}

impl HazardTouches {
    pub fn begin(&mut self, hazard: Entity, entity: Entity) -> bool {
        self.pairs.insert((hazard, entity))
    }

    pub fn end(&mut self, hazard: Entity, entity: Entity) -> bool {
        self.pairs.remove(&(hazard, entity))
    }

    pub fn is_touching(&self, hazard: Entity, entity: Entity) -> bool {
        self.pairs.contains(&(hazard, entity))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.pairs.iter().copied()
    }
}

pub fn rigid_body_for(mode: BodyMode) -> (RigidBody, LockedAxes) {
    match mode {
        BodyMode::Kinematic => (RigidBody::KinematicPositionBased, LockedAxes::ROTATION_LOCKED),
        BodyMode::Dynamic { free_rotation: false } => (RigidBody::Dynamic, LockedAxes::ROTATION_LOCKED),
        BodyMode::Dynamic { free_rotation: true } => (RigidBody::Dynamic, LockedAxes::empty()),
    }
}

/// Система: BodyMode → RigidBody
pub fn sync_body_modes(mut commands: Commands, bodies: Query<(Entity, &BodyMode), Changed<BodyMode>>) {
    for (entity, mode) in bodies.iter() {
        commands.entity(entity).insert(rigid_body_for(*mode));
    }
}

/// Система: состояние attack volume → ColliderDisabled
pub fn sync_attack_sensors(
    mut commands: Commands,
    sensors: Query<(Entity, &AttackSensor, Has<ColliderDisabled>)>,
    players: Query<&PlayerCharacter>,
    enemies: Query<&EnemyCharacter>,
) {
    for (entity, sensor, disabled) in sensors.iter() {
        let enabled = if let Ok(player) = players.get(sensor.owner) {
            player.volume().is_enabled()
        } else if let Ok(enemy) = enemies.get(sensor.owner) {
            enemy.volume().is_enabled()
        } else {
            false
        };

        match (enabled, disabled) {
            (true, true) => {
                commands.entity(entity).remove::<ColliderDisabled>();
            }
            (false, false) => {
                commands.entity(entity).insert(ColliderDisabled);
            }
            _ => {}
        }
    }
}

/// Нормаль стены: из персонажа в стену (стена смотрит forward'ом внутрь арены)
fn wall_normal(wall: &GlobalTransform) -> Vec3 {
    -*wall.forward()
}

/// Система (Input): CollisionEvent → AttackContact / HazardContact
pub fn forward_collision_events(
    mut collisions: EventReader<CollisionEvent>,
    mut touches: ResMut<HazardTouches>,
    sensors: Query<&AttackSensor>,
    hazards: Query<&GlobalTransform, With<HazardField>>,
    transforms: Query<&GlobalTransform>,
    mut contacts: EventWriter<AttackContact>,
    mut hazard_contacts: EventWriter<HazardContact>,
) {
    for event in collisions.read() {
        match *event {
            CollisionEvent::Started(a, b, _) => {
                for (first, second) in [(a, b), (b, a)] {
                    let point = transforms.get(second).map(|t| t.translation()).unwrap_or_default();

                    if let Ok(sensor) = sensors.get(first) {
                        if sensor.owner != second {
                            contacts.write(AttackContact {
                                attacker: sensor.owner,
                                target: second,
                                point,
                            });
                        }
                    } else if let Ok(wall) = hazards.get(first) {
                        if touches.begin(first, second) {
                            hazard_contacts.write(HazardContact {
                                hazard: first,
                                entity: second,
                                normal: wall_normal(wall),
                                point,
                                phase: ContactPhase::Enter,
                            });
                        }
                    }
                }
            }
            CollisionEvent::Stopped(a, b, _) => {
                touches.end(a, b);
                touches.end(b, a);
            }
        }
    }
}

/// Система (Input): Stay контакты для всех касающихся пар
pub fn emit_hazard_stays(
    touches: Res<HazardTouches>,
    hazards: Query<&GlobalTransform, With<HazardField>>,
    transforms: Query<&GlobalTransform>,
    mut hazard_contacts: EventWriter<HazardContact>,
) {
    for (hazard, entity) in touches.iter() {
        let (Ok(wall), Ok(body)) = (hazards.get(hazard), transforms.get(entity)) else {
            continue;
        };
        hazard_contacts.write(HazardContact {
            hazard,
            entity,
            normal: wall_normal(wall),
            point: body.translation(),
            phase: ContactPhase::Stay,
        });
    }
}

/// Rapier Bridge Plugin
///
/// Хост добавляет вместе с RapierPhysicsPlugin (вместо HeadlessPhysicsPlugin).
pub struct RapierBridgePlugin;

impl Plugin for RapierBridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CollisionEvent>()
            .add_event::<AttackContact>()
            .add_event::<HazardContact>()
            .init_resource::<HazardTouches>();

        app.add_systems(
            RunFixedMainLoop,
            (
                (emit_hazard_stays, forward_collision_events)
                    .chain()
                    .in_set(UpdatePhase::Input),
                (sync_body_modes, sync_attack_sensors).in_set(UpdatePhase::Publish),
            ),
        );
    }
}
