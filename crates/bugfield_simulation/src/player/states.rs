//! Состояния игрока
//!
//! Граф переходов:
//! - Idle ↔ Move (наличие ввода движения; Move → Idle решается в fixed фазе)
//! - Idle/Move → Attack (gate `can_attack`), Attack → Attack (шаг комбо)
//! - Idle/Move/Attack/Guard → Dodge, Idle/Move/Attack → Guard / Skill (recast)
//! - Guard → Attack, Dodge/Damaged → Attack | Move | Idle
//! - Damaged и Die — только снаружи (нокбэк / HP = 0), Die терминальный

use bevy::prelude::*;

use super::character::PlayerCtx;
use super::recast::RecastAction;
use crate::combat::VolumeMode;
use crate::components::effects::{anim, sfx, vfx};
use crate::components::{BodyMode, EffectCommand};
use crate::fsm::{CharacterState, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PlayerState {
    Idle,
    Move,
    Attack,
    Skill,
    Guard,
    Dodge,
    Damaged,
    Die,
}

impl StateId for PlayerState {
    fn name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Move => "Move",
            PlayerState::Attack => "Attack",
            PlayerState::Skill => "Skill",
            PlayerState::Guard => "Guard",
            PlayerState::Dodge => "Dodge",
            PlayerState::Damaged => "Damaged",
            PlayerState::Die => "Die",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, PlayerState::Die)
    }
}

impl<'a> CharacterState<PlayerCtx<'a>> for PlayerState {
    fn enter(&self, ctx: &mut PlayerCtx<'a>) {
        match self {
            PlayerState::Idle => {
                ctx.core.can_attack = true;
                ctx.core.can_dodge = true;
            }
            PlayerState::Move => {
                ctx.core.effects.set_bool(anim::BOOL_MOVE, true);
                ctx.core.can_attack = true;
                ctx.core.can_dodge = true;
            }
            PlayerState::Attack => enter_attack(ctx),
            PlayerState::Skill => {
                ctx.core.effects.trigger(anim::TRIGGER_SKILL);
                ctx.core.effects.sound(sfx::SKILL_PLAYER);
                ctx.core.action_finished = false;
                ctx.core.invincible = true;
                ctx.core.state_timer = 0.0;
                ctx.core.volume.reset();
            }
            PlayerState::Guard => {
                ctx.core.effects.set_bool(anim::BOOL_GUARD, true);
                ctx.core.effects.push(EffectCommand::PlayParticle(vfx::GUARD));
                ctx.core.effects.sound(sfx::GUARD_ON_PLAYER);
                ctx.core.is_guarding = true;
                ctx.core.can_dodge = true;
                ctx.core.can_attack = true;
                ctx.core.guard_warning = false;
                ctx.core.state_timer = 0.0;
            }
            PlayerState::Dodge => {
                ctx.core.effects.trigger(anim::TRIGGER_DODGE);
                ctx.core.effects.sound(sfx::DODGE_PLAYER);
                ctx.core.action_finished = false;
                ctx.core.invincible = true;
                ctx.core.can_dodge = false;
                ctx.core.can_attack = true;
                ctx.core.state_timer = 0.0;
                if ctx.has_move() {
                    let direction = ctx.move_direction();
                    ctx.body.face_direction(direction);
                }
            }
            PlayerState::Damaged => {
                // state_timer/damaged_duration выставляет apply_knockback
                ctx.core.effects.trigger(anim::TRIGGER_KNOCKBACK);
                ctx.core.effects.sound(sfx::DAMAGED_PLAYER);
                ctx.core.invincible = true;
                ctx.core.can_dodge = false;
            }
            PlayerState::Die => {
                ctx.core.effects.trigger(anim::TRIGGER_DIE);
                ctx.core.effects.push(EffectCommand::DamagedPostEffect(true));
                *ctx.body.mode = BodyMode::Kinematic;
                ctx.body.set_linear_velocity(Vec3::ZERO);
                ctx.core.volume.disable();
                ctx.core.can_attack = false;
                ctx.core.can_dodge = false;
            }
        }
    }

    fn update(&self, ctx: &mut PlayerCtx<'a>) -> Option<Self> {
        match self {
            PlayerState::Idle => {
                let next = ground_action(ctx);
                if next.is_some() {
                    return next;
                }
                ctx.has_move().then_some(PlayerState::Move)
            }
            PlayerState::Move => ground_action(ctx),
            PlayerState::Attack => update_attack(ctx),
            PlayerState::Skill => {
                ctx.core.state_timer += ctx.env.dt;
                if !ctx.core.cue_driven && ctx.core.state_timer >= ctx.config.skill_time {
                    ctx.core.action_finished = true;
                }
                if ctx.core.action_finished {
                    return Some(ctx.idle_or_move());
                }
                None
            }
            PlayerState::Guard => {
                ctx.core.state_timer += ctx.env.dt;

                if !ctx.core.guard_warning && ctx.core.state_timer >= ctx.config.guard_warning_time {
                    ctx.core.guard_warning = true;
                    ctx.core.effects.push(EffectCommand::GuardWarning(true));
                }

                if ctx.input.dodge_pressed && ctx.core.recast.is_ready(RecastAction::Dodge) {
                    return Some(PlayerState::Dodge);
                }
                // Атака приоритетнее выхода по отпусканию
                if ctx.input.attack_pressed {
                    return Some(PlayerState::Attack);
                }
                if !ctx.input.guard_pressed || ctx.core.state_timer >= ctx.config.guard_time {
                    return Some(ctx.idle_or_move());
                }
                None
            }
            PlayerState::Damaged => {
                ctx.core.state_timer += ctx.env.dt;
                if ctx.core.state_timer < ctx.core.damaged_duration {
                    return None;
                }
                Some(after_action(ctx))
            }
            PlayerState::Dodge | PlayerState::Die => None,
        }
    }

    fn fixed_update(&self, ctx: &mut PlayerCtx<'a>) -> Option<Self> {
        let dt = ctx.env.dt;
        match self {
            PlayerState::Move => {
                if !ctx.has_move() {
                    return Some(PlayerState::Idle);
                }
                let direction = ctx.move_direction();
                let max_degrees = ctx.config.rotation_speed * dt;
                ctx.body.rotate_towards(direction, max_degrees);
                ctx.body.translate(direction, ctx.config.move_speed, dt);
                None
            }
            PlayerState::Attack => {
                if ctx.core.attack_move {
                    ctx.core.attack_move_timer += dt;
                    if ctx.core.attack_move_timer < ctx.config.attack_move_time {
                        ctx.body.translate_forward(ctx.config.attack_move_speed, dt);
                    } else {
                        ctx.core.attack_move = false;
                        ctx.core.attack_move_timer = 0.0;
                    }
                }
                None
            }
            PlayerState::Dodge => {
                ctx.core.state_timer += dt;
                if ctx.core.state_timer <= ctx.config.dodge_move_duration {
                    ctx.body.translate_forward(ctx.config.dodge_move_speed, dt);
                }
                if ctx.core.invincible
                    && ctx.core.post_hit.is_none()
                    && ctx.core.state_timer >= ctx.config.dodge_invincible_time
                {
                    ctx.core.invincible = false;
                }
                if !ctx.core.cue_driven && ctx.core.state_timer >= ctx.config.dodge_time {
                    ctx.core.action_finished = true;
                }
                if ctx.core.action_finished {
                    return Some(after_action(ctx));
                }
                None
            }
            _ => None,
        }
    }

    fn exit(&self, ctx: &mut PlayerCtx<'a>) {
        match self {
            PlayerState::Idle => {}
            PlayerState::Move => ctx.core.effects.set_bool(anim::BOOL_MOVE, false),
            PlayerState::Attack => {
                ctx.core.effects.set_bool(anim::BOOL_FIRST_ATTACK, false);
                ctx.core.effects.push(EffectCommand::AnimResetTrigger(anim::TRIGGER_ATTACK));
                ctx.core.volume.disable();
                ctx.core.effects.push(EffectCommand::StopParticle(vfx::SLASH));
                ctx.core.action_finished = false;
                ctx.core.attack_move = false;
                ctx.core.combo = 0;
            }
            PlayerState::Skill => {
                ctx.core.invincible = ctx.core.post_hit.is_some();
                ctx.core.action_finished = false;
                ctx.core.effects.push(EffectCommand::AnimResetTrigger(anim::TRIGGER_SKILL));
                ctx.core.volume.disable();
                ctx.core.effects.push(EffectCommand::StopParticle(vfx::SLASH));
                ctx.core.recast.reset(RecastAction::Skill);
            }
            PlayerState::Guard => {
                ctx.core.effects.set_bool(anim::BOOL_GUARD, false);
                ctx.core.effects.push(EffectCommand::StopParticle(vfx::GUARD));
                if ctx.core.guard_warning {
                    ctx.core.effects.push(EffectCommand::GuardWarning(false));
                }
                ctx.core.is_guarding = false;
                ctx.core.guard_warning = false;
                ctx.core.recast.reset(RecastAction::Guard);
            }
            PlayerState::Dodge => {
                ctx.core.effects.push(EffectCommand::AnimResetTrigger(anim::TRIGGER_DODGE));
                ctx.core.invincible = ctx.core.post_hit.is_some();
                ctx.core.action_finished = false;
                ctx.core.recast.reset(RecastAction::Dodge);
            }
            PlayerState::Damaged => {
                // Без post-hit окна (нокбэк без урона) неуязвимость снимается сразу
                if ctx.core.post_hit.is_none() {
                    ctx.core.invincible = false;
                }
                ctx.core.can_dodge = true;
                ctx.body.set_linear_velocity(Vec3::ZERO);
            }
            PlayerState::Die => {}
        }

        // Guard держится кнопкой, остальное сбрасывается на каждом выходе
        ctx.input.reset_all_pressed();
    }
}

/// Idle/Move: dodge → attack → guard → skill
fn ground_action(ctx: &PlayerCtx<'_>) -> Option<PlayerState> {
    let input = &ctx.input;
    let recast = &ctx.core.recast;

    if input.dodge_pressed && recast.is_ready(RecastAction::Dodge) {
        return Some(PlayerState::Dodge);
    }
    if input.attack_pressed {
        return Some(PlayerState::Attack);
    }
    if input.guard_pressed && recast.is_ready(RecastAction::Guard) {
        return Some(PlayerState::Guard);
    }
    if input.skill_pressed && recast.is_ready(RecastAction::Skill) {
        return Some(PlayerState::Skill);
    }
    None
}

/// Dodge/Damaged: атака приоритетнее движения
fn after_action(ctx: &PlayerCtx<'_>) -> PlayerState {
    if ctx.input.attack_pressed {
        PlayerState::Attack
    } else {
        ctx.idle_or_move()
    }
}

fn enter_attack(ctx: &mut PlayerCtx<'_>) {
    ctx.core.effects.set_bool(anim::BOOL_FIRST_ATTACK, true);
    ctx.core.effects.trigger(anim::TRIGGER_ATTACK);
    ctx.core.effects.sound(sfx::ATTACK_PLAYER);
    ctx.core.can_attack = false;
    ctx.core.can_dodge = true;
    ctx.core.combo = 0;
    begin_combo_step(ctx);
}

/// Общее для входа и каждого следующего шага комбо
fn begin_combo_step(ctx: &mut PlayerCtx<'_>) {
    ctx.core.volume.reset();
    ctx.core.action_finished = false;
    ctx.core.attack_move = false;
    ctx.core.attack_move_timer = 0.0;
    ctx.core.auto_turn_count = 0;
    ctx.core.state_timer = 0.0;
}

fn next_combo_step(ctx: &mut PlayerCtx<'_>) {
    ctx.core.effects.set_bool(anim::BOOL_FIRST_ATTACK, false);
    ctx.core.effects.trigger(anim::TRIGGER_ATTACK);
    ctx.core.effects.sound(sfx::ATTACK_PLAYER);
    ctx.core.combo = (ctx.core.combo + 1).min(ctx.config.max_combo);
    ctx.core.can_attack = false;
    ctx.input.reset_all_pressed();
    begin_combo_step(ctx);

    crate::logger::log(&format!("Player: combo step {}", ctx.core.combo));
}

fn update_attack(ctx: &mut PlayerCtx<'_>) -> Option<PlayerState> {
    if ctx.core.auto_turn_count < ctx.config.auto_turn_frames {
        ctx.auto_turn();
        ctx.core.auto_turn_count += 1;
    }

    ctx.core.state_timer += ctx.env.dt;
    if !ctx.core.cue_driven {
        if !ctx.core.can_attack && ctx.core.state_timer >= ctx.config.combo_window_time {
            ctx.core.can_attack = true;
        }
        if ctx.core.state_timer >= ctx.config.attack_step_time {
            ctx.core.action_finished = true;
        }
    }

    if ctx.input.dodge_pressed && ctx.core.recast.is_ready(RecastAction::Dodge) {
        return Some(PlayerState::Dodge);
    }
    if ctx.input.guard_pressed && ctx.core.recast.is_ready(RecastAction::Guard) {
        return Some(PlayerState::Guard);
    }
    if ctx.input.skill_pressed && ctx.core.recast.is_ready(RecastAction::Skill) {
        return Some(PlayerState::Skill);
    }
    if ctx.input.attack_pressed {
        // Переход в себя — no-op у машины, шаг комбо делаем на месте
        next_combo_step(ctx);
        return None;
    }
    if ctx.core.action_finished {
        return Some(ctx.idle_or_move());
    }
    None
}

/// Режим volume для текущего действия
pub fn volume_mode_for(state: Option<PlayerState>) -> Option<VolumeMode> {
    match state {
        Some(PlayerState::Attack) => Some(VolumeMode::Strike),
        Some(PlayerState::Skill) => Some(VolumeMode::Skill),
        _ => None,
    }
}
