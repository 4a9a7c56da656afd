//! Combat resolver: AttackContact → урон → реакция → follow-up'ы атакующего
//!
//! Порядок для каждого контакта:
//! 1. тип пары (player → enemy, enemy strike → player, ball → enemy), иначе контакт игнорируется
//! 2. hit registry атакующего (повтор в той же активации → no-op)
//! 3. `take_damage` цели → `DamageReaction`
//! 4. follow-up'ы по реакции: эффект попадания, нокбэк, hitstop, smash
//!
//! Нокбэк/hitstop/smash уходят событиями и применяются в Reactions фазе.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::damage::player_hit_damage;
use super::hit_registry::VolumeMode;
use super::reaction::{DamageReaction, Damageable, HitKind};
use super::{EnemyBody, PlayerBody};
use crate::components::{planar, CharacterBody};
use crate::enemy::EnemyCharacter;
use crate::events::{AttackContact, DamageResolved, HitStopRequested, KnockbackRequested, SmashRequested};
use crate::player::PlayerCharacter;
use crate::DeterministicRng;

type Players<'w, 's> = Query<'w, 's, PlayerBody, Without<EnemyCharacter>>;
type Enemies<'w, 's> = Query<'w, 's, EnemyBody, Without<PlayerCharacter>>;

/// Исходящие события резолва
#[derive(SystemParam)]
pub struct Followups<'w> {
    knockbacks: EventWriter<'w, KnockbackRequested>,
    hitstops: EventWriter<'w, HitStopRequested>,
    smashes: EventWriter<'w, SmashRequested>,
    resolved: EventWriter<'w, DamageResolved>,
}

impl Followups<'_> {
    fn hitstop(&mut self, target: Entity, duration: f32, affects_physics: bool) {
        self.hitstops.write(HitStopRequested {
            target,
            duration,
            affects_physics,
        });
    }
}

/// Система: резолв контактов attack volume
pub fn resolve_attack_contacts(
    mut contacts: EventReader<AttackContact>,
    mut rng: ResMut<DeterministicRng>,
    smash: Res<super::smash::SmashSettings>,
    mut players: Players,
    mut enemies: Enemies,
    mut out: Followups,
) {
    for contact in contacts.read() {
        if contact.attacker == contact.target {
            continue;
        }

        if players.contains(contact.attacker) {
            resolve_player_hit(contact, &mut rng, smash.hit_stop_duration, &mut players, &mut enemies, &mut out);
            continue;
        }

        let Ok((attacker, ..)) = enemies.get(contact.attacker) else {
            crate::logger::log_warning(&format!(
                "AttackContact: attacker {:?} is not a character",
                contact.attacker
            ));
            continue;
        };

        match attacker.volume().mode() {
            VolumeMode::Ball => resolve_ball_hit(contact, &mut enemies, &mut out),
            VolumeMode::Strike | VolumeMode::Skill => resolve_enemy_strike(contact, &mut players, &mut enemies, &mut out),
            VolumeMode::Disabled => crate::logger::log(&format!(
                "AttackContact: {:?} volume is disabled, contact with {:?} refused",
                contact.attacker, contact.target
            )),
        }
    }
}

/// Записать цель в registry атакующего. false — повтор / volume выключен.
fn register(volume: &mut super::AttackVolume, contact: &AttackContact) -> bool {
    if volume.register_hit(contact.target) {
        return true;
    }

    if volume.is_enabled() {
        crate::logger::log(&format!(
            "AttackContact: {:?} already struck by {:?} in this activation",
            contact.target, contact.attacker
        ));
    } else {
        crate::logger::log(&format!(
            "AttackContact: {:?} volume is disabled, contact with {:?} refused",
            contact.attacker, contact.target
        ));
    }
    false
}

fn publish(out: &mut Followups<'_>, contact: &AttackContact, amount: i32, reaction: DamageReaction, kind: HitKind) {
    out.resolved.write(DamageResolved {
        attacker: contact.attacker,
        target: contact.target,
        amount,
        reaction,
        kind,
        point: contact.point,
    });
}

/// Игрок → враг
fn resolve_player_hit(
    contact: &AttackContact,
    rng: &mut DeterministicRng,
    smash_hit_stop: f32,
    players: &mut Players,
    enemies: &mut Enemies,
    out: &mut Followups<'_>,
) {
    if !enemies.contains(contact.target) {
        return;
    }

    let Ok((mut player, transform, ..)) = players.get_mut(contact.attacker) else {
        return;
    };
    if !register(player.volume_mut(), contact) {
        return;
    }

    let step = player.attack_step();
    let config = player.config();
    let amount = player_hit_damage(player.status().attack(), config.damage.roll(&mut rng.rng), step, &config.damage);
    let knockback = config.knockback;
    let hit_stop = config.hit_stop_duration;
    let position = transform.translation;
    let forward = planar(*transform.forward()).unwrap_or(Vec3::NEG_Z);

    let Ok((mut enemy, mut e_transform, mut e_velocity, mut e_mode, e_nav)) = enemies.get_mut(contact.target) else {
        return;
    };
    let mut body = CharacterBody::new(&mut e_transform, &mut e_velocity, &mut e_mode, e_nav.map(|n| n.into_inner()));
    let reaction = enemy.take_damage(amount, &mut body);

    match reaction {
        DamageReaction::Damaged => {
            player.on_attack_hit();
            out.knockbacks.write(KnockbackRequested {
                target: contact.target,
                request: knockback.from_source(position),
            });
            out.hitstop(contact.attacker, hit_stop, false);
            out.hitstop(contact.target, hit_stop, false);
        }
        DamageReaction::DamagedOnly | DamageReaction::Down => player.on_attack_hit(),
        DamageReaction::Smash => {
            out.hitstop(contact.attacker, smash_hit_stop, false);
            out.smashes.write(SmashRequested {
                attacker: contact.attacker,
                target: contact.target,
                direction: forward,
            });
        }
        DamageReaction::Guarded | DamageReaction::Invincible => {}
    }

    crate::logger::log(&format!(
        "⚔ Player {:?} → enemy {:?}: {} dmg ({:?}), reaction {:?}",
        contact.attacker, contact.target, amount, step, reaction
    ));
    publish(out, contact, amount, reaction, knockback.kind);
}

/// Рывок врага → игрок
fn resolve_enemy_strike(contact: &AttackContact, players: &mut Players, enemies: &mut Enemies, out: &mut Followups<'_>) {
    if !players.contains(contact.target) {
        return;
    }

    let (amount, config, position) = {
        let Ok((mut enemy, transform, ..)) = enemies.get_mut(contact.attacker) else {
            return;
        };
        if !register(enemy.volume_mut(), contact) {
            return;
        }
        (enemy.attack(), enemy.config().clone(), transform.translation)
    };

    let Ok((mut player, mut p_transform, mut p_velocity, mut p_mode)) = players.get_mut(contact.target) else {
        return;
    };
    let player_position = p_transform.translation;
    let mut body = CharacterBody::new(&mut p_transform, &mut p_velocity, &mut p_mode, None);
    let reaction = player.take_damage(amount, &mut body);

    match reaction {
        DamageReaction::Damaged => {
            if let Ok((mut enemy, ..)) = enemies.get_mut(contact.attacker) {
                enemy.on_attack_hit(config.knockback.kind);
            }
            out.knockbacks.write(KnockbackRequested {
                target: contact.target,
                request: config.knockback.from_source(position),
            });
            out.hitstop(contact.attacker, config.hit_stop_duration, true);
            out.hitstop(contact.target, config.hit_stop_duration, true);
        }
        DamageReaction::Guarded => {
            // Заблокированный удар отбрасывает самого атакующего
            out.knockbacks.write(KnockbackRequested {
                target: contact.attacker,
                request: config.guarded.from_source(player_position),
            });
        }
        DamageReaction::Down => {
            if let Ok((mut enemy, ..)) = enemies.get_mut(contact.attacker) {
                enemy.on_attack_hit(config.knockback.kind);
            }
        }
        DamageReaction::DamagedOnly | DamageReaction::Smash | DamageReaction::Invincible => {}
    }

    crate::logger::log(&format!(
        "🗡 Enemy {:?} → player {:?}: {} dmg, reaction {:?}",
        contact.attacker, contact.target, amount, reaction
    ));
    publish(out, contact, amount, reaction, config.knockback.kind);
}

/// Враг-"мяч" → другой (не мяч) враг
fn resolve_ball_hit(contact: &AttackContact, enemies: &mut Enemies, out: &mut Followups<'_>) {
    match enemies.get(contact.target) {
        Ok((target, ..)) if !target.is_ball() => {}
        _ => return,
    }

    let (amount, request) = {
        let Ok((mut ball, transform, ..)) = enemies.get_mut(contact.attacker) else {
            return;
        };
        if !register(ball.volume_mut(), contact) {
            return;
        }
        (ball.config().ball_attack, ball.config().ball.from_source(transform.translation))
    };

    let reaction = {
        let Ok((mut enemy, mut transform, mut velocity, mut mode, nav)) = enemies.get_mut(contact.target) else {
            return;
        };
        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        enemy.take_damage(amount, &mut body)
    };

    let hit_effect = matches!(
        reaction,
        DamageReaction::Damaged | DamageReaction::DamagedOnly | DamageReaction::Down
    );
    if hit_effect {
        if let Ok((mut ball, ..)) = enemies.get_mut(contact.attacker) {
            ball.on_attack_hit(request.kind);
        }
    }
    if reaction == DamageReaction::Damaged {
        out.knockbacks.write(KnockbackRequested {
            target: contact.target,
            request,
        });
    }

    crate::logger::log(&format!(
        "⚽ Ball {:?} → enemy {:?}: {} dmg, reaction {:?}",
        contact.attacker, contact.target, amount, reaction
    ));
    publish(out, contact, amount, reaction, request.kind);
}
