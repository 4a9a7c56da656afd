//! HitStop coordinator
//!
//! Короткая заморозка персонажа для "веса" удара:
//! - всегда: AnimationRate → 0
//! - affects_physics: скорость тела/навигации захватывается, обнуляется и
//!   удерживается нулём каждый fixed шаг; по истечении восстанавливается
//!   РОВНО захваченное значение
//!
//! Повторный запрос = cancel + restart (last writer wins, не суммируется).
//! Не блокирует: остальные персонажи обновляются как обычно.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

use crate::combat::reaction::{FreezeTarget, HitStoppable};
use crate::components::{effects::vfx, AnimationRate, BodyMode, CharacterBody, EffectCommand, NavAgent};
use crate::enemy::EnemyCharacter;
use crate::events::HitStopRequested;
use crate::player::PlayerCharacter;

/// Активный таймер заморозки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitStopTimer {
    pub remaining: f32,
    pub affects_physics: bool,
}

/// Движение, захваченное в момент заморозки
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapturedMotion {
    Body { linvel: Vec3, mode: BodyMode },
    Navigation { velocity: Vec3, stopped: bool },
}

#[derive(Component, Debug, Clone, Default)]
pub struct HitStop {
    timer: Option<HitStopTimer>,
    captured: Option<CapturedMotion>,
    rate_before: f32,
}

impl HitStop {
    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer(&self) -> Option<HitStopTimer> {
        self.timer
    }

    pub fn remaining(&self) -> Option<f32> {
        self.timer.map(|t| t.remaining)
    }

    pub fn captured(&self) -> Option<CapturedMotion> {
        self.captured
    }

    /// Запустить (или перезапустить) заморозку
    pub fn request(
        &mut self,
        duration: f32,
        affects_physics: bool,
        target: FreezeTarget,
        rate: &mut AnimationRate,
        body: &mut CharacterBody,
    ) {
        // Скорость анимации до первой заморозки (повторный запрос не перезаписывает 0)
        if self.timer.is_none() {
            self.rate_before = rate.0;
        }
        rate.0 = 0.0;

        if affects_physics {
            // Уже захваченное значение — pre-freeze, не трогаем
            if self.captured.is_none() {
                self.captured = Some(capture(target, body));
            }
        } else if let Some(captured) = self.captured.take() {
            // Новый таймер только визуальный → физику отпускаем сразу
            restore(captured, body);
        }

        self.timer = Some(HitStopTimer {
            remaining: duration.max(0.0),
            affects_physics,
        });
    }

    /// Продвинуть таймер. Возвращает завершившийся таймер.
    pub fn tick(&mut self, dt: f32, rate: &mut AnimationRate, body: &mut CharacterBody) -> Option<HitStopTimer> {
        let timer = self.timer.as_mut()?;
        timer.remaining -= dt;
        if timer.remaining > 0.0 {
            return None;
        }

        let finished = *timer;
        self.finish(rate, body);
        Some(finished)
    }

    /// Немедленно снять заморозку с восстановлением
    pub fn finish(&mut self, rate: &mut AnimationRate, body: &mut CharacterBody) {
        if self.timer.take().is_none() {
            return;
        }
        rate.0 = self.rate_before;
        if let Some(captured) = self.captured.take() {
            restore(captured, body);
        }
    }

    /// Fixed фаза: держим скорость нулём пока заморожены
    pub fn latch(&self, body: &mut CharacterBody) {
        let Some(timer) = self.timer else {
            return;
        };
        if !timer.affects_physics {
            return;
        }

        match self.captured {
            Some(CapturedMotion::Body { .. }) => body.velocity.linvel = Vec3::ZERO,
            Some(CapturedMotion::Navigation { .. }) => {
                if let Some(nav) = body.nav.as_deref_mut() {
                    nav.stopped = true;
                    nav.velocity = Vec3::ZERO;
                }
            }
            None => {}
        }
    }
}

fn capture(target: FreezeTarget, body: &mut CharacterBody) -> CapturedMotion {
    match (target, body.nav.as_deref_mut()) {
        (FreezeTarget::Navigation, Some(nav)) => {
            let captured = CapturedMotion::Navigation {
                velocity: nav.velocity,
                stopped: nav.stopped,
            };
            nav.stopped = true;
            nav.velocity = Vec3::ZERO;
            captured
        }
        (target, _) => {
            let captured = CapturedMotion::Body {
                linvel: body.velocity.linvel,
                mode: *body.mode,
            };
            match target {
                FreezeTarget::Body { go_kinematic: true } => {
                    body.velocity.linvel = Vec3::ZERO;
                    *body.mode = BodyMode::Kinematic;
                }
                _ => {
                    if !body.mode.is_kinematic() {
                        body.velocity.linvel = Vec3::ZERO;
                    }
                }
            }
            captured
        }
    }
}

fn restore(captured: CapturedMotion, body: &mut CharacterBody) {
    match captured {
        CapturedMotion::Body { linvel, mode } => {
            *body.mode = mode;
            if !mode.is_kinematic() {
                body.velocity.linvel = linvel;
            }
        }
        CapturedMotion::Navigation { velocity, stopped } => {
            if let Some(nav) = body.nav.as_deref_mut() {
                nav.stopped = stopped;
                nav.velocity = velocity;
            }
        }
    }
}

type HitStopQuery = (
    Entity,
    &'static mut HitStop,
    Option<&'static mut AnimationRate>,
    &'static mut Transform,
    &'static mut Velocity,
    &'static mut BodyMode,
    Option<&'static mut NavAgent>,
    Option<&'static mut PlayerCharacter>,
    Option<&'static EnemyCharacter>,
);

/// Система: HitStopRequested → HitStop::request
///
/// Нет AnimationRate (нет animation driver'а) → hitstop пропускается целиком.
pub fn apply_hitstop_requests(mut requests: EventReader<HitStopRequested>, mut targets: Query<HitStopQuery>) {
    for request in requests.read() {
        let Ok((entity, mut hitstop, rate, mut transform, mut velocity, mut mode, nav, player, enemy)) =
            targets.get_mut(request.target)
        else {
            crate::logger::log(&format!("HitStop: {:?} has no HitStop component, skipped", request.target));
            continue;
        };

        let Some(mut rate) = rate else {
            crate::logger::log(&format!("HitStop: {:?} has no animation driver, skipped", entity));
            continue;
        };

        let target = match (&player, enemy) {
            (Some(player), _) => player.freeze_target(),
            (None, Some(enemy)) => enemy.freeze_target(),
            (None, None) => FreezeTarget::Body { go_kinematic: false },
        };

        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        let was_active = hitstop.is_active();
        hitstop.request(request.duration, request.affects_physics, target, &mut rate, &mut body);

        if let Some(mut player) = player {
            let effects = player.effects_mut();
            if request.affects_physics {
                effects.push(EffectCommand::DamagedPostEffect(true));
            } else if !was_active {
                effects.push(EffectCommand::PauseParticle { name: vfx::SLASH, paused: true });
            }
        }

        crate::logger::log(&format!(
            "⏸ HitStop {:?}: {:.3}s (physics: {}, restart: {})",
            entity, request.duration, request.affects_physics, was_active
        ));
    }
}

/// Система (update фаза): отсчёт таймеров и восстановление
pub fn tick_hitstops(time: Res<Time>, mut targets: Query<HitStopQuery>) {
    let dt = time.delta_secs();

    for (_, mut hitstop, rate, mut transform, mut velocity, mut mode, nav, player, _) in targets.iter_mut() {
        if !hitstop.is_active() {
            continue;
        }
        let Some(mut rate) = rate else {
            continue;
        };

        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        let Some(finished) = hitstop.tick(dt, &mut rate, &mut body) else {
            continue;
        };

        if let Some(mut player) = player {
            let effects = player.effects_mut();
            if finished.affects_physics {
                effects.push(EffectCommand::DamagedPostEffect(false));
            } else {
                effects.push(EffectCommand::PauseParticle { name: vfx::SLASH, paused: false });
            }
        }
    }
}

/// Система (fixed фаза): удерживаем скорость нулём
pub fn latch_hitstop_motion(
    mut targets: Query<(&HitStop, &mut Transform, &mut Velocity, &mut BodyMode, Option<&mut NavAgent>)>,
) {
    for (hitstop, mut transform, mut velocity, mut mode, nav) in targets.iter_mut() {
        if !hitstop.is_active() {
            continue;
        }
        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        hitstop.latch(&mut body);
    }
}
