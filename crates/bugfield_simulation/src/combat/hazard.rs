//! Bug field: стена-ловушка вокруг арены
//!
//! - игрок, касающийся стены, получает pulse урон не чаще `damage_interval`
//!   и отбрасывается от стены (явное направление, не из позиций)
//! - враг в Down отскакивает от стены (отражение скорости до удара)
//! - враг-"мяч" снимает единицу прочности; на нуле поле ломается
//!   и все враги из roster'а взрываются

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::reaction::{DamageReaction, Damageable, HitKind, KnockbackRequest};
use super::{EnemyBody, PlayerBody};
use crate::components::{
    effects::{sfx, vfx},
    planar, CharacterBody, EffectCommand,
};
use crate::enemy::EnemyCharacter;
use crate::events::{
    CharacterEffect, ContactPhase, DestroyAllEnemies, HazardBroken, HazardContact, HitStopRequested,
    KnockbackRequested,
};
use crate::player::PlayerCharacter;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub pulse_damage: i32,
    pub damage_interval: f32,
    /// Physics hitstop игрока после удара током
    pub hit_stop_duration: f32,
    pub knockback: KnockbackRequest,
    pub max_health: u32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            pulse_damage: 3,
            damage_interval: 2.0,
            hit_stop_duration: 0.5,
            knockback: KnockbackRequest::new(10.0, 0.5, HitKind::WallHit),
            max_health: 2,
        }
    }
}

/// Исход удара "мячом" о стену
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallHit {
    /// Прочность снята, поле держится
    Cracked { health: u32 },
    Broken,
    /// Поле уже сломано
    Ignored,
}

#[derive(Component, Debug, Clone)]
pub struct HazardField {
    config: HazardConfig,
    health: u32,
    active: bool,
    /// До следующего pulse'а (стартует полным интервалом)
    cooldown: f32,
}

impl HazardField {
    pub fn new(config: HazardConfig) -> Self {
        Self {
            health: config.max_health,
            active: true,
            cooldown: config.damage_interval,
            config,
        }
    }

    pub fn config(&self) -> &HazardConfig {
        &self.config
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tick(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }

    /// Забрать pulse: true если поле активно и интервал прошёл
    pub fn take_pulse(&mut self) -> bool {
        if !self.active || self.cooldown > 0.0 {
            return false;
        }
        self.cooldown = self.config.damage_interval;
        true
    }

    pub fn ball_hit(&mut self) -> WallHit {
        if !self.active {
            return WallHit::Ignored;
        }

        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.active = false;
            return WallHit::Broken;
        }
        WallHit::Cracked { health: self.health }
    }
}

/// Spawn helper: стена bug field (forward смотрит внутрь арены)
pub fn spawn_hazard_wall(commands: &mut Commands, config: HazardConfig, transform: Transform) -> Entity {
    commands.spawn((transform, HazardField::new(config))).id()
}

/// Система (Combat): отсчёт интервалов pulse'а
pub fn tick_hazards(time: Res<Time>, mut hazards: Query<&mut HazardField>) {
    let dt = time.delta_secs();
    for mut hazard in hazards.iter_mut() {
        hazard.tick(dt);
    }
}

/// Система (Combat): контакты со стенами bug field
#[allow(clippy::too_many_arguments)]
pub fn resolve_hazard_contacts(
    mut contacts: EventReader<HazardContact>,
    mut hazards: Query<&mut HazardField>,
    mut players: Query<PlayerBody, Without<EnemyCharacter>>,
    mut enemies: Query<EnemyBody, Without<PlayerCharacter>>,
    mut knockbacks: EventWriter<KnockbackRequested>,
    mut hitstops: EventWriter<HitStopRequested>,
    mut effects: EventWriter<CharacterEffect>,
    mut broken: EventWriter<HazardBroken>,
    mut destroy: EventWriter<DestroyAllEnemies>,
) {
    for contact in contacts.read() {
        let Ok(mut hazard) = hazards.get_mut(contact.hazard) else {
            crate::logger::log_warning(&format!("HazardContact: {:?} is not a hazard", contact.hazard));
            continue;
        };
        if !hazard.is_active() {
            continue;
        }

        if let Ok((mut player, mut transform, mut velocity, mut mode)) = players.get_mut(contact.entity) {
            if !hazard.take_pulse() {
                continue;
            }

            let config = *hazard.config();
            let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, None);
            let reaction = player.take_damage(config.pulse_damage, &mut body);
            crate::logger::log(&format!("⚡ Bug field pulse on {:?}: {:?}", contact.entity, reaction));

            if reaction != DamageReaction::Damaged {
                continue;
            }

            let request = match planar(contact.normal) {
                Some(normal) => config.knockback.with_direction(-normal),
                None => config.knockback,
            };
            knockbacks.write(KnockbackRequested {
                target: contact.entity,
                request,
            });
            effects.write(CharacterEffect {
                entity: contact.entity,
                command: EffectCommand::Sound(sfx::DAMAGED_PLAYER),
            });
            hitstops.write(HitStopRequested {
                target: contact.entity,
                duration: config.hit_stop_duration,
                affects_physics: true,
            });
            continue;
        }

        let Ok((mut enemy, mut transform, mut velocity, mut mode, nav)) = enemies.get_mut(contact.entity) else {
            continue;
        };
        if contact.phase != ContactPhase::Enter {
            continue;
        }

        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        enemy.reflect_from_wall(contact.normal, &mut body);

        if !enemy.is_ball() {
            continue;
        }

        match hazard.ball_hit() {
            WallHit::Cracked { health } => {
                effects.write(CharacterEffect {
                    entity: contact.entity,
                    command: EffectCommand::PlayParticle(vfx::WALL_HIT),
                });
                effects.write(CharacterEffect {
                    entity: contact.entity,
                    command: EffectCommand::Sound(sfx::WALL_HIT_ENEMY),
                });
                crate::logger::log(&format!("Bug field {:?} cracked, {} left", contact.hazard, health));
            }
            WallHit::Broken => {
                broken.write(HazardBroken { hazard: contact.hazard });
                destroy.write(DestroyAllEnemies);
                crate::logger::log_info(&format!("🧱 Bug field {:?} broken", contact.hazard));
            }
            WallHit::Ignored => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_respects_interval() {
        let mut hazard = HazardField::new(HazardConfig::default());

        // Интервал стартует полным
        assert!(!hazard.take_pulse());
        hazard.tick(2.0);
        assert!(hazard.take_pulse());
        assert!(!hazard.take_pulse());

        hazard.tick(1.0);
        assert!(!hazard.take_pulse());
        hazard.tick(1.0);
        assert!(hazard.take_pulse());
    }

    #[test]
    fn test_ball_hits_break_field() {
        let mut hazard = HazardField::new(HazardConfig::default());

        assert_eq!(hazard.ball_hit(), WallHit::Cracked { health: 1 });
        assert_eq!(hazard.ball_hit(), WallHit::Broken);
        assert!(!hazard.is_active());
        assert_eq!(hazard.ball_hit(), WallHit::Ignored);

        // Сломанное поле больше не бьёт
        hazard.tick(10.0);
        assert!(!hazard.take_pulse());
    }
}
