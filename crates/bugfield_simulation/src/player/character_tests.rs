//! Tests for player state set.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use bevy_rapier3d::prelude::Velocity;

    use super::super::character::{PlayerCharacter, PlayerEnv};
    use super::super::config::PlayerConfig;
    use super::super::input::ActionButton;
    use super::super::recast::RecastAction;
    use super::super::states::PlayerState;
    use crate::combat::{DamageReaction, Damageable, HitKind, KnockbackReceiver, KnockbackRequest, VolumeMode};
    use crate::components::{BodyMode, CharacterBody};
    use crate::events::PlayerCue;

    #[derive(Default)]
    struct Rig {
        transform: Transform,
        velocity: Velocity,
        mode: BodyMode,
    }

    impl Rig {
        fn body(&mut self) -> CharacterBody<'_> {
            CharacterBody::new(&mut self.transform, &mut self.velocity, &mut self.mode, None)
        }
    }

    fn started() -> (PlayerCharacter, Rig) {
        let mut rig = Rig::default();
        let mut player = PlayerCharacter::new(PlayerConfig::default());
        player.start(rig.body());
        (player, rig)
    }

    fn update(player: &mut PlayerCharacter, rig: &mut Rig, dt: f32) {
        player.update(rig.body(), PlayerEnv::with_dt(dt));
    }

    fn fixed(player: &mut PlayerCharacter, rig: &mut Rig, dt: f32) {
        player.fixed_update(rig.body(), PlayerEnv::with_dt(dt));
    }

    #[test]
    fn test_starts_idle() {
        let (player, _) = started();
        assert_eq!(player.state(), Some(PlayerState::Idle));
        assert_eq!(player.current_state_name(), "Idle");
    }

    #[test]
    fn test_attack_combo_advances_and_resets() {
        let (mut player, mut rig) = started();

        assert!(player.press(ActionButton::Attack, true));
        update(&mut player, &mut rig, 0.01);
        assert_eq!(player.state(), Some(PlayerState::Attack));
        assert_eq!(player.core().combo, 0);

        // Окно комбо ещё закрыто → нажатие отклоняется
        assert!(!player.press(ActionButton::Attack, true));

        // Fallback окна комбо (нет animation driver'а)
        update(&mut player, &mut rig, 0.35);
        assert!(player.press(ActionButton::Attack, true));
        update(&mut player, &mut rig, 0.01);
        assert_eq!(player.state(), Some(PlayerState::Attack));
        assert_eq!(player.core().combo, 1);

        // Шаг закончился → Idle, комбо сброшено
        update(&mut player, &mut rig, 0.9);
        assert_eq!(player.state(), Some(PlayerState::Idle));
        assert_eq!(player.core().combo, 0);
    }

    #[test]
    fn test_combo_counter_is_bounded() {
        let (mut player, mut rig) = started();
        player.press(ActionButton::Attack, true);
        update(&mut player, &mut rig, 0.01);

        for _ in 0..5 {
            player.handle_cue(PlayerCue::AttackWindow(true));
            player.press(ActionButton::Attack, true);
            update(&mut player, &mut rig, 0.01);
        }

        assert_eq!(player.core().combo, player.config().max_combo);
    }

    #[test]
    fn test_combo_step_clears_registry() {
        let (mut player, mut rig) = started();
        player.press(ActionButton::Attack, true);
        update(&mut player, &mut rig, 0.01);

        player.handle_cue(PlayerCue::EnableAttackVolume);
        assert_eq!(player.volume().mode(), VolumeMode::Strike);
        assert!(player.volume_mut().register_hit(Entity::from_raw(7)));

        player.handle_cue(PlayerCue::AttackWindow(true));
        player.press(ActionButton::Attack, true);
        update(&mut player, &mut rig, 0.01);

        assert!(!player.volume().is_enabled());
        assert!(player.volume().registry().is_empty());
    }

    #[test]
    fn test_guarding_blocks_damage() {
        let (mut player, mut rig) = started();
        player.press(ActionButton::Guard, true);
        update(&mut player, &mut rig, 0.01);
        assert_eq!(player.state(), Some(PlayerState::Guard));

        for amount in [1, 5, 50, 1000] {
            let reaction = player.take_damage(amount, &mut rig.body());
            assert_eq!(reaction, DamageReaction::Guarded);
        }
        assert_eq!(player.status().current_hp(), 10);
        assert!(player.take_hp_changes().is_empty());
    }

    #[test]
    fn test_guard_released_exits_and_starts_recast() {
        let (mut player, mut rig) = started();
        player.press(ActionButton::Guard, true);
        update(&mut player, &mut rig, 0.01);

        player.press(ActionButton::Guard, false);
        update(&mut player, &mut rig, 0.01);

        assert_eq!(player.state(), Some(PlayerState::Idle));
        assert!(!player.is_guarding());
        assert!(!player.core().recast.is_ready(RecastAction::Guard));
    }

    #[test]
    fn test_guard_times_out() {
        let (mut player, mut rig) = started();
        player.press(ActionButton::Guard, true);
        update(&mut player, &mut rig, 0.01);

        update(&mut player, &mut rig, 2.5);
        assert_eq!(player.state(), Some(PlayerState::Guard));
        assert!(player.core().guard_warning);

        update(&mut player, &mut rig, 1.0);
        assert_eq!(player.state(), Some(PlayerState::Idle));
    }

    #[test]
    fn test_lethal_damage_enters_die() {
        let (mut player, mut rig) = started();

        let reaction = player.take_damage(12, &mut rig.body());

        assert_eq!(reaction, DamageReaction::Down);
        assert_eq!(player.status().current_hp(), 0);
        assert_eq!(player.state(), Some(PlayerState::Die));
        assert!(player.take_death());
        assert!(rig.mode.is_kinematic());

        // Die терминальный
        let request = KnockbackRequest::new(5.0, 0.5, HitKind::Attack).from_source(Vec3::X);
        assert!(!player.apply_knockback(&request, &mut rig.body()));
        assert!(!player.change_state(PlayerState::Idle, rig.body()));
        assert_eq!(player.take_damage(3, &mut rig.body()), DamageReaction::Down);
        assert_eq!(player.state(), Some(PlayerState::Die));
    }

    #[test]
    fn test_non_positive_damage_is_noop() {
        let (mut player, mut rig) = started();

        assert_eq!(player.take_damage(-5, &mut rig.body()), DamageReaction::DamagedOnly);
        assert_eq!(player.take_damage(0, &mut rig.body()), DamageReaction::DamagedOnly);

        assert_eq!(player.status().current_hp(), 10);
        assert!(player.take_hp_changes().is_empty());
        assert!(!player.is_invincible());
    }

    #[test]
    fn test_post_hit_invulnerability_window() {
        let (mut player, mut rig) = started();

        assert_eq!(player.take_damage(3, &mut rig.body()), DamageReaction::Damaged);
        assert!(player.is_invincible());
        assert_eq!(player.take_damage(3, &mut rig.body()), DamageReaction::Invincible);

        update(&mut player, &mut rig, 2.1);
        assert!(!player.is_invincible());

        assert_eq!(player.take_damage(3, &mut rig.body()), DamageReaction::Damaged);
        assert_eq!(player.status().current_hp(), 4);
    }

    #[test]
    fn test_knockback_with_explicit_direction() {
        let (mut player, mut rig) = started();
        rig.transform.translation = Vec3::new(10.0, 0.0, 10.0);
        let request = KnockbackRequest::new(6.0, 0.5, HitKind::WallHit).with_direction(Vec3::new(0.0, 0.0, -2.0));

        assert!(player.apply_knockback(&request, &mut rig.body()));

        assert_eq!(player.state(), Some(PlayerState::Damaged));
        assert!((rig.velocity.linvel - Vec3::new(0.0, 0.0, -6.0)).length() < 1e-5);
    }

    #[test]
    fn test_knockback_from_source_faces_attacker() {
        let (mut player, mut rig) = started();
        let request = KnockbackRequest::new(4.0, 0.5, HitKind::Attack).from_source(Vec3::new(-3.0, 2.0, 0.0));

        player.apply_knockback(&request, &mut rig.body());

        assert!((rig.velocity.linvel - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
        let forward = rig.body().forward();
        assert!((forward - Vec3::NEG_X).length() < 1e-4, "forward = {:?}", forward);
    }

    #[test]
    fn test_knockback_without_data_skips_push() {
        let (mut player, mut rig) = started();
        rig.velocity.linvel = Vec3::new(1.0, 0.0, 0.0);
        let request = KnockbackRequest::new(4.0, 0.5, HitKind::Attack);

        assert!(player.apply_knockback(&request, &mut rig.body()));

        assert_eq!(player.state(), Some(PlayerState::Damaged));
        assert_eq!(rig.velocity.linvel, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_repeated_knockback_restarts_damaged_timer() {
        let (mut player, mut rig) = started();
        let request = KnockbackRequest::new(4.0, 0.5, HitKind::Attack).from_source(Vec3::X);

        player.apply_knockback(&request, &mut rig.body());
        update(&mut player, &mut rig, 0.4);
        assert_eq!(player.state(), Some(PlayerState::Damaged));

        player.apply_knockback(&request, &mut rig.body());
        update(&mut player, &mut rig, 0.4);
        assert_eq!(player.state(), Some(PlayerState::Damaged));

        update(&mut player, &mut rig, 0.2);
        assert_eq!(player.state(), Some(PlayerState::Idle));
        // Нокбэк без урона не оставляет неуязвимость
        assert!(!player.is_invincible());
    }

    #[test]
    fn test_knockback_velocity_settles_after_damaged() {
        let (mut player, mut rig) = started();
        let request = KnockbackRequest::new(10.0, 0.5, HitKind::WallHit).with_direction(Vec3::X);
        player.apply_knockback(&request, &mut rig.body());

        // Пока Damaged — тело скользит
        fixed(&mut player, &mut rig, 0.1);
        assert_eq!(rig.velocity.linvel, Vec3::new(10.0, 0.0, 0.0));

        update(&mut player, &mut rig, 0.6);
        assert_eq!(player.state(), Some(PlayerState::Idle));
        assert_eq!(rig.velocity.linvel, Vec3::ZERO);

        // Скорость, вернувшаяся позже (снятие hitstop), гасится в fixed фазе
        rig.velocity.linvel = Vec3::new(10.0, 0.0, 0.0);
        fixed(&mut player, &mut rig, 1.0 / 60.0);
        assert_eq!(rig.velocity.linvel, Vec3::ZERO);
    }

    #[test]
    fn test_dodge_invincibility_ends_before_dodge() {
        let (mut player, mut rig) = started();
        player.press(ActionButton::Dodge, true);
        update(&mut player, &mut rig, 0.01);
        assert_eq!(player.state(), Some(PlayerState::Dodge));

        fixed(&mut player, &mut rig, 0.25);
        assert!(player.is_invincible());

        fixed(&mut player, &mut rig, 0.25);
        assert!(!player.is_invincible());
        assert_eq!(player.state(), Some(PlayerState::Dodge));

        fixed(&mut player, &mut rig, 0.25);
        fixed(&mut player, &mut rig, 0.25);
        assert_eq!(player.state(), Some(PlayerState::Idle));

        // Перекат вперёд (-Z) только первые 0.7с
        assert!((rig.transform.translation.z + 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_skill_exits_only_on_finish() {
        let (mut player, mut rig) = started();
        player.press(ActionButton::Skill, true);
        update(&mut player, &mut rig, 0.01);
        assert_eq!(player.state(), Some(PlayerState::Skill));
        assert!(player.is_invincible());

        player.press(ActionButton::Dodge, true);
        player.press(ActionButton::Guard, true);
        update(&mut player, &mut rig, 0.5);
        assert_eq!(player.state(), Some(PlayerState::Skill));

        player.handle_cue(PlayerCue::SkillEnd);
        update(&mut player, &mut rig, 0.01);
        assert_ne!(player.state(), Some(PlayerState::Skill));
        assert!(!player.core().recast.is_ready(RecastAction::Skill));
    }

    #[test]
    fn test_move_input_walks_in_fixed_phase() {
        let (mut player, mut rig) = started();
        player.set_move_axis(Vec2::new(1.0, 0.0));

        update(&mut player, &mut rig, 0.01);
        assert_eq!(player.state(), Some(PlayerState::Move));

        fixed(&mut player, &mut rig, 0.1);
        assert!(rig.transform.translation.x > 0.8);

        player.set_move_axis(Vec2::ZERO);
        fixed(&mut player, &mut rig, 0.1);
        assert_eq!(player.state(), Some(PlayerState::Idle));
    }

    #[test]
    fn test_cues_outside_their_state_are_ignored() {
        let (mut player, _) = started();

        player.handle_cue(PlayerCue::EnableAttackVolume);
        player.handle_cue(PlayerCue::AttackEnd);

        assert!(!player.volume().is_enabled());
        assert!(!player.core().action_finished);
    }
}
