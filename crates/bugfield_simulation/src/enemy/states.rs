//! Состояния врага
//!
//! Граф переходов:
//! - Idle → Battle (появилась цель)
//! - Battle ↔ Attack (дистанция до цели; выход из Attack только при `can_move`)
//! - Battle/Attack/Damaged → Idle (цель пропала)
//! - Damaged → Attack | Battle (по таймеру нокбэка, fixed фаза)
//! - Down → Attack | Battle (по таймеру, только перезагружаемые враги)
//! - Damaged и Down — только снаружи (нокбэк / HP = 0)

use bevy::prelude::*;

use super::character::EnemyCtx;
use crate::components::effects::anim;
use crate::components::{BodyMode, EffectCommand};
use crate::fsm::{CharacterState, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum EnemyState {
    Idle,
    Battle,
    Attack,
    Damaged,
    Down,
}

impl StateId for EnemyState {
    fn name(&self) -> &'static str {
        match self {
            EnemyState::Idle => "Idle",
            EnemyState::Battle => "Battle",
            EnemyState::Attack => "Attack",
            EnemyState::Damaged => "Damaged",
            EnemyState::Down => "Down",
        }
    }
}

impl<'a> CharacterState<EnemyCtx<'a>> for EnemyState {
    fn enter(&self, ctx: &mut EnemyCtx<'a>) {
        ctx.core.state_timer = 0.0;

        match self {
            EnemyState::Idle => ctx.core.effects.set_bool(anim::BOOL_BATTLE, false),
            EnemyState::Battle => {
                ctx.core.effects.set_bool(anim::BOOL_BATTLE, true);
                let speed = ctx.config.move_speed;
                if let Some(nav) = ctx.body.nav.as_deref_mut() {
                    nav.speed = speed;
                    nav.stopped = false;
                }
                ctx.core.can_move = true;
            }
            EnemyState::Attack => {
                if let Some(nav) = ctx.body.nav.as_deref_mut() {
                    nav.stop();
                }
                ctx.core.can_move = false;
                ctx.core.can_look = true;
                ctx.press_attack();
            }
            EnemyState::Damaged => {
                ctx.core.volume.disable();
                ctx.core.attack_effects_off();
                // Нокбэк двигает rigidbody → навигация выключена на время реакции
                if let Some(nav) = ctx.body.nav.as_deref_mut() {
                    nav.enabled = false;
                }
                *ctx.body.mode = BodyMode::Dynamic { free_rotation: false };
                ctx.core.can_move = false;
                ctx.core.can_look = false;
                ctx.core.damaged_timer = 0.0;
            }
            EnemyState::Down => {
                ctx.core.volume.disable();
                ctx.core.attack_effects_off();
                ctx.core.effects.trigger(anim::TRIGGER_DOWN);
                ctx.core.effects.push(EffectCommand::AnimResetTrigger(anim::TRIGGER_REBOOT));
                ctx.core.effects.push(EffectCommand::Trail(true));
                ctx.core.attacking = false;
                ctx.core.can_move = false;
                ctx.core.is_rolled = false;
                ctx.core.down_timer = 0.0;
                if let Some(nav) = ctx.body.nav.as_deref_mut() {
                    nav.enabled = false;
                }
            }
        }
    }

    fn update(&self, ctx: &mut EnemyCtx<'a>) -> Option<Self> {
        match self {
            EnemyState::Idle => ctx.has_target().then_some(EnemyState::Battle),
            EnemyState::Battle => {
                if !ctx.has_target() {
                    return Some(EnemyState::Idle);
                }
                if ctx.in_attack_range() {
                    return Some(EnemyState::Attack);
                }

                let target = ctx.env.target_position;
                if let (Some(nav), Some(target)) = (ctx.body.nav.as_deref_mut(), target) {
                    nav.destination = Some(target);
                }
                None
            }
            EnemyState::Attack => {
                if !ctx.has_target() {
                    return Some(EnemyState::Idle);
                }

                ctx.core.state_timer += ctx.env.dt;
                // Без animation driver'а цикл атаки закрывается по таймеру
                if !ctx.core.cue_driven && ctx.core.state_timer >= ctx.config.attack_cycle_time {
                    ctx.core.can_move = true;
                }

                if ctx.in_attack_range() {
                    ctx.press_attack();
                    return None;
                }
                ctx.core.can_move.then_some(EnemyState::Battle)
            }
            EnemyState::Damaged | EnemyState::Down => None,
        }
    }

    fn fixed_update(&self, ctx: &mut EnemyCtx<'a>) -> Option<Self> {
        match self {
            EnemyState::Damaged => {
                if !ctx.has_target() {
                    return Some(EnemyState::Idle);
                }

                ctx.core.damaged_timer += ctx.env.dt;
                if ctx.core.damaged_timer >= ctx.core.damaged_duration {
                    return Some(ctx.engage_state());
                }
                None
            }
            EnemyState::Down => {
                ctx.core.down_timer += ctx.env.dt;
                ctx.core.last_velocity = ctx.body.linear_velocity();

                // Запущен заново → отсчёт сначала
                if ctx.core.is_rolled {
                    ctx.core.down_timer = 0.0;
                    ctx.core.is_rolled = false;
                }

                if !ctx.core.reboots {
                    return None;
                }
                if ctx.core.down_timer >= ctx.config.down_duration {
                    return Some(ctx.engage_state());
                }
                None
            }
            EnemyState::Idle | EnemyState::Battle | EnemyState::Attack => None,
        }
    }

    fn exit(&self, ctx: &mut EnemyCtx<'a>) {
        match self {
            EnemyState::Attack => {
                ctx.core.effects.set_bool(anim::BOOL_ATTACK, false);
                ctx.core.attack_effects_off();
                ctx.core.can_look = false;
            }
            EnemyState::Damaged => {
                if let Some(nav) = ctx.body.nav.as_deref_mut() {
                    nav.enabled = true;
                }
                *ctx.body.mode = BodyMode::Kinematic;
                ctx.core.can_move = true;
                ctx.core.can_look = true;
            }
            EnemyState::Down => {
                ctx.core.volume.disable();
                if let Some(nav) = ctx.body.nav.as_deref_mut() {
                    nav.enabled = true;
                }
                *ctx.body.mode = BodyMode::Kinematic;
                ctx.body.set_linear_velocity(Vec3::ZERO);
                ctx.core.is_rolled = false;
                ctx.core.effects.trigger(anim::TRIGGER_REBOOT);
                ctx.core.effects.push(EffectCommand::Trail(false));
                ctx.status.restore_full();

                crate::logger::log_info(&format!(
                    "🔄 Enemy reboot: HP restored to {}",
                    ctx.status.current_hp()
                ));
            }
            EnemyState::Idle | EnemyState::Battle => {}
        }
    }
}
