//! Tests for enemy state set.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use bevy_rapier3d::prelude::Velocity;

    use super::super::broken::BrokenEnemy;
    use super::super::character::{EnemyCharacter, EnemyEnv};
    use super::super::config::{BrokenConfig, EnemyConfig};
    use super::super::states::EnemyState;
    use crate::combat::{DamageReaction, Damageable, HitKind, KnockbackReceiver, KnockbackRequest, VolumeMode};
    use crate::components::{effects::anim, BodyMode, CharacterBody, EffectCommand, NavAgent, StatusProfile};
    use crate::events::EnemyCue;

    const PROFILE: StatusProfile = StatusProfile { max_hp: 10, attack: 3 };
    const NEAR: Vec3 = Vec3::new(0.0, 0.0, -2.0);
    const FAR: Vec3 = Vec3::new(0.0, 0.0, -6.0);

    struct Rig {
        transform: Transform,
        velocity: Velocity,
        mode: BodyMode,
        nav: NavAgent,
    }

    impl Default for Rig {
        fn default() -> Self {
            Self {
                transform: Transform::default(),
                velocity: Velocity::default(),
                mode: BodyMode::Kinematic,
                nav: NavAgent::new(3.5),
            }
        }
    }

    impl Rig {
        fn body(&mut self) -> CharacterBody<'_> {
            CharacterBody::new(&mut self.transform, &mut self.velocity, &mut self.mode, Some(&mut self.nav))
        }
    }

    fn env(dt: f32, target: Option<Vec3>) -> EnemyEnv {
        EnemyEnv {
            dt,
            target_position: target,
        }
    }

    fn engaged() -> (EnemyCharacter, Rig) {
        let mut rig = Rig::default();
        let mut enemy = EnemyCharacter::new(PROFILE, EnemyConfig::default());
        enemy.set_target(Some(Entity::from_raw(42)));
        enemy.start(rig.body());
        (enemy, rig)
    }

    fn knock_down(enemy: &mut EnemyCharacter, rig: &mut Rig) {
        let reaction = enemy.take_damage(PROFILE.max_hp + 2, &mut rig.body());
        assert_eq!(reaction, DamageReaction::Down);
        assert_eq!(enemy.state(), Some(EnemyState::Down));
    }

    #[test]
    fn test_battle_to_attack_exactly_once() {
        let (mut enemy, mut rig) = engaged();

        for _ in 0..5 {
            enemy.update(rig.body(), env(0.016, Some(NEAR)));
        }

        assert_eq!(enemy.state(), Some(EnemyState::Attack));
        let entries: Vec<_> = enemy.take_transitions().into_iter().map(|t| t.to).collect();
        assert_eq!(entries, vec![EnemyState::Idle, EnemyState::Battle, EnemyState::Attack]);
    }

    #[test]
    fn test_battle_chases_target() {
        let (mut enemy, mut rig) = engaged();

        enemy.update(rig.body(), env(0.016, Some(FAR)));
        enemy.update(rig.body(), env(0.016, Some(FAR)));

        assert_eq!(enemy.state(), Some(EnemyState::Battle));
        assert_eq!(rig.nav.destination, Some(FAR));
        assert!(rig.nav.is_moving());
    }

    #[test]
    fn test_attack_leaves_only_when_can_move() {
        let (mut enemy, mut rig) = engaged();
        enemy.update(rig.body(), env(0.016, Some(NEAR)));
        enemy.update(rig.body(), env(0.016, Some(NEAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Attack));

        // Цель отошла, но цикл атаки не закончен
        enemy.update(rig.body(), env(0.5, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Attack));

        enemy.handle_cue(EnemyCue::CanMove, rig.body());
        enemy.update(rig.body(), env(0.016, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Battle));
    }

    #[test]
    fn test_attack_cycle_fallback_without_cues() {
        let (mut enemy, mut rig) = engaged();
        enemy.update(rig.body(), env(0.016, Some(NEAR)));
        enemy.update(rig.body(), env(0.016, Some(NEAR)));

        enemy.update(rig.body(), env(1.0, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Attack));

        enemy.update(rig.body(), env(1.1, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Battle));
    }

    #[test]
    fn test_lost_target_returns_to_idle() {
        let (mut enemy, mut rig) = engaged();
        enemy.update(rig.body(), env(0.016, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Battle));

        enemy.clear_target();
        enemy.update(rig.body(), env(0.016, None));
        assert_eq!(enemy.state(), Some(EnemyState::Idle));
    }

    #[test]
    fn test_down_turns_damage_into_smash() {
        let (mut enemy, mut rig) = engaged();
        knock_down(&mut enemy, &mut rig);
        assert_eq!(enemy.status().current_hp(), 0);

        let reaction = enemy.take_damage(5, &mut rig.body());

        assert_eq!(reaction, DamageReaction::Smash);
        assert_eq!(enemy.status().current_hp(), 0);
        assert!(!enemy.volume().is_enabled());
    }

    #[test]
    fn test_damage_while_rushing_has_no_knockback() {
        let (mut enemy, mut rig) = engaged();
        enemy.handle_cue(EnemyCue::RushMoveBegin, rig.body());
        assert!(enemy.core().attacking);
        assert_eq!(rig.nav.speed, EnemyConfig::default().attack_speed);

        assert_eq!(enemy.take_damage(2, &mut rig.body()), DamageReaction::DamagedOnly);
        assert_eq!(enemy.status().current_hp(), 8);

        enemy.handle_cue(EnemyCue::AttackEnd, rig.body());
        assert_eq!(enemy.take_damage(2, &mut rig.body()), DamageReaction::Damaged);
    }

    #[test]
    fn test_reboot_restores_hp() {
        let (mut enemy, mut rig) = engaged();
        knock_down(&mut enemy, &mut rig);

        for _ in 0..7 {
            enemy.fixed_update(rig.body(), env(0.5, Some(NEAR)));
        }
        assert_eq!(enemy.state(), Some(EnemyState::Down));

        enemy.fixed_update(rig.body(), env(0.5, Some(NEAR)));

        assert_eq!(enemy.state(), Some(EnemyState::Attack));
        assert_eq!(enemy.status().current_hp(), PROFILE.max_hp);
        assert!(rig.nav.enabled);
        assert_eq!(rig.mode, BodyMode::Kinematic);

        let hp: Vec<_> = enemy.take_hp_changes().iter().map(|c| c.current).collect();
        assert_eq!(hp, vec![0, PROFILE.max_hp]);
    }

    #[test]
    fn test_smash_restarts_down_timer() {
        let (mut enemy, mut rig) = engaged();
        knock_down(&mut enemy, &mut rig);

        enemy.fixed_update(rig.body(), env(3.0, Some(FAR)));
        enemy.on_smashed(Vec3::new(0.0, 0.0, 23.0), &mut rig.body());
        assert!(enemy.is_ball());
        assert_eq!(rig.mode, BodyMode::Dynamic { free_rotation: true });
        assert_eq!(rig.velocity.linvel, Vec3::new(0.0, 0.0, 23.0));

        // Шаг со smash'ем обнуляет отсчёт
        enemy.fixed_update(rig.body(), env(0.5, Some(FAR)));
        assert_eq!(enemy.core().last_velocity, Vec3::new(0.0, 0.0, 23.0));
        enemy.fixed_update(rig.body(), env(3.0, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Down));

        enemy.fixed_update(rig.body(), env(1.0, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Battle));
        assert!(!enemy.volume().is_enabled());
    }

    #[test]
    fn test_broken_enemy_never_reboots() {
        let mut rig = Rig::default();
        let mut enemy = EnemyCharacter::broken(PROFILE, EnemyConfig::default());
        enemy.start(rig.body());
        assert_eq!(enemy.state(), Some(EnemyState::Down));
        assert!(!enemy.reboots());

        for _ in 0..20 {
            enemy.fixed_update(rig.body(), env(1.0, Some(NEAR)));
        }

        assert_eq!(enemy.state(), Some(EnemyState::Down));
        assert_eq!(enemy.take_damage(3, &mut rig.body()), DamageReaction::Smash);
    }

    #[test]
    fn test_broken_enemy_rolls_and_returns_home() {
        let home = Vec3::new(1.0, 0.0, 1.0);
        let mut rig = Rig::default();
        rig.transform.translation = home;
        let mut enemy = EnemyCharacter::broken(PROFILE, EnemyConfig::default());
        let mut broken = BrokenEnemy::new(BrokenConfig::default(), home);
        enemy.start(rig.body());

        enemy.on_smashed(Vec3::X * 10.0, &mut rig.body());
        rig.transform.translation += Vec3::X * 5.0;

        let mut returned = false;
        for _ in 0..4 {
            broken.latch_roll(&enemy);
            enemy.fixed_update(rig.body(), env(1.0, None));
            returned |= broken.advance_roll(1.0, &mut enemy, &mut rig.body());
        }

        assert!(returned);
        assert!(!broken.is_rolling());
        assert_eq!(rig.transform.translation, home);
        assert_eq!(rig.mode, BodyMode::Kinematic);
        assert_eq!(rig.velocity.linvel, Vec3::ZERO);
        assert!(!enemy.is_ball());
    }

    #[test]
    fn test_broken_enemy_detection_fires_once() {
        let mut broken = BrokenEnemy::new(BrokenConfig::default(), Vec3::ZERO);

        assert!(!broken.detect(Vec3::ZERO, [Vec3::new(10.0, 0.0, 0.0)]));
        assert!(broken.detect(Vec3::ZERO, [Vec3::new(5.0, 0.0, 0.0)]));
        assert!(!broken.detect(Vec3::ZERO, [Vec3::new(1.0, 0.0, 0.0)]));
        assert!(broken.is_detected());
    }

    #[test]
    fn test_knockback_speed_by_hit_kind() {
        let (mut enemy, mut rig) = engaged();
        let request = KnockbackRequest::new(12.0, 1.0, HitKind::BallHit).from_source(Vec3::new(0.0, 0.0, 3.0));

        assert!(enemy.apply_knockback(&request, &mut rig.body()));

        assert_eq!(enemy.state(), Some(EnemyState::Damaged));
        assert!(!rig.nav.enabled);
        assert_eq!(rig.mode, BodyMode::Dynamic { free_rotation: false });
        assert!((rig.velocity.linvel - Vec3::new(0.0, 0.0, -12.0)).length() < 1e-4);

        let effects = enemy.drain_effects();
        assert!(effects.contains(&EffectCommand::AnimFloat(anim::FLOAT_KNOCKBACK_SPEED, 0.5)));
        assert!(effects.contains(&EffectCommand::AnimTrigger(anim::TRIGGER_KNOCKBACK)));
    }

    #[test]
    fn test_damaged_recovers_in_fixed_phase() {
        let (mut enemy, mut rig) = engaged();
        let request = KnockbackRequest::new(8.0, 0.6, HitKind::Attack).with_direction(Vec3::Z);
        enemy.apply_knockback(&request, &mut rig.body());

        // update фаза таймер не двигает
        enemy.update(rig.body(), env(1.0, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Damaged));

        enemy.fixed_update(rig.body(), env(0.3, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Damaged));
        enemy.fixed_update(rig.body(), env(0.3, Some(FAR)));
        assert_eq!(enemy.state(), Some(EnemyState::Battle));
        assert!(rig.nav.enabled);
        assert_eq!(rig.mode, BodyMode::Kinematic);
    }

    #[test]
    fn test_knockback_rejected_while_down() {
        let (mut enemy, mut rig) = engaged();
        knock_down(&mut enemy, &mut rig);

        let request = KnockbackRequest::new(8.0, 0.6, HitKind::Attack).with_direction(Vec3::Z);
        assert!(!enemy.apply_knockback(&request, &mut rig.body()));
        assert_eq!(enemy.state(), Some(EnemyState::Down));
    }

    #[test]
    fn test_hitbox_cue_ignored_while_down() {
        let (mut enemy, mut rig) = engaged();
        enemy.handle_cue(EnemyCue::HitBox(true), rig.body());
        assert_eq!(enemy.volume().mode(), VolumeMode::Strike);

        knock_down(&mut enemy, &mut rig);
        assert!(!enemy.volume().is_enabled());

        enemy.handle_cue(EnemyCue::HitBox(true), rig.body());
        assert!(!enemy.volume().is_enabled());
    }

    #[test]
    fn test_wall_reflection_uses_last_velocity() {
        let (mut enemy, mut rig) = engaged();
        knock_down(&mut enemy, &mut rig);
        rig.velocity.linvel = Vec3::new(4.0, 0.0, -3.0);
        enemy.fixed_update(rig.body(), env(0.02, None));

        assert!(enemy.reflect_from_wall(Vec3::Z, &mut rig.body()));
        assert!((rig.velocity.linvel - Vec3::new(4.0, 0.0, 3.0)).length() < 1e-4);
    }
}
