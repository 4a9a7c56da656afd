//! EnemyCharacter: ledger + state machine + per-state данные

use bevy::prelude::*;

use super::config::EnemyConfig;
use super::states::EnemyState;
use crate::combat::{
    AttackVolume, DamageReaction, Damageable, FreezeTarget, HitKind, HitStoppable, KnockbackReceiver,
    KnockbackRequest, VolumeMode,
};
use crate::components::{
    effects::{anim, sfx, vfx},
    BodyMode, CharacterBody, EffectCommand, EffectOutbox, HpChange, StatusLedger, StatusProfile,
};
use crate::events::EnemyCue;
use crate::fsm::{StateMachine, Transition};

/// Данные кадра снаружи врага
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyEnv {
    pub dt: f32,
    /// Позиция цели (None — цели нет или она исчезла)
    pub target_position: Option<Vec3>,
}

#[derive(Debug, Clone)]
pub struct EnemyCore {
    pub target: Option<Entity>,
    /// Может ли выйти из Attack (CanMove cue)
    pub can_move: bool,
    /// Поворот к цели во время атаки
    pub can_look: bool,
    /// Идёт рывок → урон без нокбэка
    pub attacking: bool,
    pub damaged_timer: f32,
    pub damaged_duration: f32,
    pub down_timer: f32,
    /// Ударен в Down (smash) → down таймер перезапускается
    pub is_rolled: bool,
    /// Скорость перед столкновением (отражение от стены bug field)
    pub last_velocity: Vec3,
    /// false — "сломанный" враг, из Down не выходит
    pub reboots: bool,
    pub cue_driven: bool,
    pub state_timer: f32,
    pub volume: AttackVolume,
    pub effects: EffectOutbox,
}

impl EnemyCore {
    fn new(reboots: bool) -> Self {
        Self {
            target: None,
            can_move: false,
            can_look: false,
            attacking: false,
            damaged_timer: 0.0,
            damaged_duration: 0.0,
            down_timer: 0.0,
            is_rolled: false,
            last_velocity: Vec3::ZERO,
            reboots,
            cue_driven: false,
            state_timer: 0.0,
            volume: AttackVolume::default(),
            effects: EffectOutbox::default(),
        }
    }

    /// Погасить charge/rush эффекты
    pub fn attack_effects_off(&mut self) {
        self.effects.push(EffectCommand::StopParticle(vfx::ENEMY_CHARGE));
        self.effects.push(EffectCommand::StopParticle(vfx::ENEMY_RUSH));
    }
}

/// Контекст для hook'ов состояний врага
pub struct EnemyCtx<'a> {
    pub core: &'a mut EnemyCore,
    pub status: &'a mut StatusLedger,
    pub config: &'a EnemyConfig,
    pub body: CharacterBody<'a>,
    pub env: EnemyEnv,
}

impl EnemyCtx<'_> {
    pub fn has_target(&self) -> bool {
        self.core.target.is_some() && self.env.target_position.is_some()
    }

    /// Дистанция до цели строго меньше порога атаки
    pub fn in_attack_range(&self) -> bool {
        match self.env.target_position {
            Some(target) if self.core.target.is_some() => {
                self.body.position().distance(target) < self.config.attack_distance
            }
            _ => false,
        }
    }

    /// Attack | Battle по дистанции
    pub fn engage_state(&self) -> EnemyState {
        if self.in_attack_range() {
            EnemyState::Attack
        } else {
            EnemyState::Battle
        }
    }

    /// Продолжить атаку: навестись на цель (пока разрешено)
    ///
    /// Выключенная навигация (нокбэк/Down) блокирует атаку целиком.
    pub fn press_attack(&mut self) {
        if !self.body.nav.as_deref().is_none_or(|nav| nav.enabled) {
            return;
        }

        if let (true, Some(target)) = (self.core.can_look, self.env.target_position) {
            if let Some(nav) = self.body.nav.as_deref_mut() {
                nav.destination = Some(target);
            }
            self.body.face_point(target);
        }
        self.core.effects.set_bool(anim::BOOL_ATTACK, true);
    }
}

#[derive(Component, Debug, Clone)]
pub struct EnemyCharacter {
    status: StatusLedger,
    machine: StateMachine<EnemyState>,
    core: EnemyCore,
    config: EnemyConfig,
    initial: EnemyState,
}

impl EnemyCharacter {
    pub fn new(profile: StatusProfile, config: EnemyConfig) -> Self {
        Self {
            status: StatusLedger::new(profile),
            machine: StateMachine::new(),
            core: EnemyCore::new(true),
            config,
            initial: EnemyState::Idle,
        }
    }

    /// Неперезагружаемый враг, стартует в Down
    pub fn broken(profile: StatusProfile, config: EnemyConfig) -> Self {
        Self {
            core: EnemyCore::new(false),
            initial: EnemyState::Down,
            ..Self::new(profile, config)
        }
    }

    pub fn status(&self) -> &StatusLedger {
        &self.status
    }

    pub fn core(&self) -> &EnemyCore {
        &self.core
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn state(&self) -> Option<EnemyState> {
        self.machine.current()
    }

    pub fn current_state_name(&self) -> &'static str {
        self.machine.current_name()
    }

    pub fn is_down(&self) -> bool {
        self.machine.is_in(EnemyState::Down)
    }

    pub fn reboots(&self) -> bool {
        self.core.reboots
    }

    /// Враг-"мяч" (запущен smash'ем)
    pub fn is_ball(&self) -> bool {
        self.core.volume.mode() == VolumeMode::Ball
    }

    pub fn target(&self) -> Option<Entity> {
        self.core.target
    }

    pub fn set_target(&mut self, target: Option<Entity>) {
        self.core.target = target;
    }

    pub fn clear_target(&mut self) {
        self.core.target = None;
    }

    pub fn attack(&self) -> i32 {
        self.status.attack()
    }

    pub fn volume(&self) -> &AttackVolume {
        &self.core.volume
    }

    pub fn volume_mut(&mut self) -> &mut AttackVolume {
        &mut self.core.volume
    }

    pub fn effects_mut(&mut self) -> &mut EffectOutbox {
        &mut self.core.effects
    }

    fn with_ctx<R>(
        &mut self,
        body: CharacterBody<'_>,
        env: EnemyEnv,
        f: impl FnOnce(&mut StateMachine<EnemyState>, &mut EnemyCtx<'_>) -> R,
    ) -> R {
        let EnemyCharacter {
            status,
            machine,
            core,
            config,
            initial,
        } = self;
        let mut ctx = EnemyCtx {
            core,
            status,
            config,
            body,
            env,
        };

        if machine.current().is_none() {
            machine.change_state(Some(*initial), &mut ctx);
        }

        f(machine, &mut ctx)
    }

    /// Войти в начальное состояние
    pub fn start(&mut self, body: CharacterBody<'_>) {
        self.with_ctx(body, EnemyEnv::default(), |_, _| ());
    }

    pub fn update(&mut self, body: CharacterBody<'_>, env: EnemyEnv) {
        self.with_ctx(body, env, |machine, ctx| machine.update(ctx));
    }

    pub fn fixed_update(&mut self, body: CharacterBody<'_>, env: EnemyEnv) {
        self.with_ctx(body, env, |machine, ctx| machine.fixed_update(ctx));
    }

    pub fn change_state(&mut self, next: EnemyState, body: CharacterBody<'_>) -> bool {
        self.with_ctx(body, EnemyEnv::default(), |machine, ctx| {
            machine.change_state(Some(next), ctx)
        })
    }

    /// Animation cue рывковой атаки
    pub fn handle_cue(&mut self, cue: EnemyCue, mut body: CharacterBody<'_>) {
        self.core.cue_driven = true;
        if self.is_down() {
            crate::logger::log(&format!("Enemy: cue {:?} ignored while Down", cue));
            return;
        }

        match cue {
            EnemyCue::SetupAttack => {
                if let Some(nav) = body.nav.as_deref_mut() {
                    nav.enabled = true;
                    nav.stopped = true;
                }
                self.core.can_move = false;
            }
            EnemyCue::Charge => {
                self.core.attack_effects_off();
                self.core.effects.push(EffectCommand::PlayParticle(vfx::ENEMY_CHARGE));
                self.core.effects.sound(sfx::CHARGE_ENEMY);
            }
            EnemyCue::CanMove => {
                self.core.can_move = true;
                self.core.can_look = true;
                if let Some(nav) = body.nav.as_deref_mut().filter(|nav| nav.enabled) {
                    nav.stopped = true;
                }
            }
            EnemyCue::NotLook => self.core.can_look = false,
            EnemyCue::RushMoveBegin => {
                self.core.attacking = true;
                let rush_target = body.position() + body.forward() * self.config.attack_move_distance;
                if let Some(nav) = body.nav.as_deref_mut() {
                    nav.speed = self.config.attack_speed;
                    if nav.enabled {
                        nav.move_to(rush_target);
                    }
                }
            }
            EnemyCue::Rush => {
                self.core.attack_effects_off();
                self.core.effects.push(EffectCommand::PlayParticle(vfx::ENEMY_RUSH));
                self.core.effects.sound(sfx::ATTACK_ENEMY);
            }
            EnemyCue::AttackEnd => self.core.attacking = false,
            EnemyCue::TakeDamage => {
                self.core.attacking = false;
                self.core.attack_effects_off();
            }
            EnemyCue::HitBox(true) => self.core.volume.enable(VolumeMode::Strike),
            EnemyCue::HitBox(false) => self.core.volume.disable(),
        }
    }

    /// Эффект попадания собственной атакой
    pub fn on_attack_hit(&mut self, kind: HitKind) {
        self.core.effects.push(EffectCommand::PlayParticle(vfx::ATTACK_HIT));
        match kind {
            HitKind::Attack => self.core.effects.sound(sfx::DAMAGED_PLAYER),
            HitKind::BallHit => self.core.effects.sound(sfx::HIT_ENEMY),
            HitKind::Guarded | HitKind::WallHit => {}
        }
    }

    /// Запуск "мячом" после smash
    pub fn on_smashed(&mut self, velocity: Vec3, body: &mut CharacterBody) {
        self.core.is_rolled = true;
        self.core.volume.enable(VolumeMode::Ball);
        *body.mode = BodyMode::Dynamic { free_rotation: true };
        body.set_linear_velocity(velocity);

        crate::logger::log(&format!("💥 Enemy smashed: velocity {:?}", velocity));
    }

    /// Отражение "мяча" от стены bug field
    pub fn reflect_from_wall(&mut self, normal: Vec3, body: &mut CharacterBody) -> bool {
        if !self.is_down() {
            return false;
        }
        let Some(normal) = normal.try_normalize() else {
            return false;
        };

        let incoming = self.core.last_velocity;
        let reflected = incoming - 2.0 * incoming.dot(normal) * normal;
        body.set_linear_velocity(reflected);
        true
    }

    /// "Сломанный" враг возвращается на исходную позицию после прокатки
    pub fn return_home(&mut self, home: Vec3, body: &mut CharacterBody) {
        body.transform.translation = home;
        body.transform.rotation = Quat::IDENTITY;
        body.set_linear_velocity(Vec3::ZERO);
        *body.mode = BodyMode::Kinematic;
        self.core.volume.disable();
    }

    pub fn take_transitions(&mut self) -> Vec<Transition<EnemyState>> {
        self.machine.take_transitions()
    }

    pub fn take_hp_changes(&mut self) -> Vec<HpChange> {
        self.status.take_changes()
    }

    pub fn drain_effects(&mut self) -> Vec<EffectCommand> {
        self.core.effects.drain().collect()
    }
}

impl Damageable for EnemyCharacter {
    fn take_damage(&mut self, amount: i32, body: &mut CharacterBody) -> DamageReaction {
        // Лежачего не бьют — его запускают
        if self.is_down() {
            return DamageReaction::Smash;
        }

        if amount <= 0 {
            crate::logger::log(&format!("Enemy: non-positive damage {} ignored", amount));
            return DamageReaction::DamagedOnly;
        }

        if self.status.apply_damage(amount) {
            self.change_state(EnemyState::Down, body.reborrow());
            return DamageReaction::Down;
        }

        if self.core.attacking {
            return DamageReaction::DamagedOnly;
        }

        DamageReaction::Damaged
    }
}

impl KnockbackReceiver for EnemyCharacter {
    fn apply_knockback(&mut self, request: &KnockbackRequest, body: &mut CharacterBody) -> bool {
        if self.is_down() {
            return false;
        }

        self.core.damaged_timer = 0.0;
        self.core.damaged_duration = request.reaction_duration;
        self.change_state(EnemyState::Damaged, body.reborrow());

        if request.direction.is_none() {
            if let Some(source) = request.source {
                body.face_point(source);
            }
        }

        if let Some(rate) = self.config.knockback_anim.for_kind(request.kind) {
            self.core.effects.push(EffectCommand::AnimFloat(anim::FLOAT_KNOCKBACK_SPEED, rate));
            self.core.effects.trigger(anim::TRIGGER_KNOCKBACK);
        }

        match request.push_velocity(body.position()) {
            Some(push) => body.set_linear_velocity(push),
            None => crate::logger::log_warning(&format!(
                "Enemy: knockback without source/direction ({:?}), push skipped",
                request.kind
            )),
        }
        true
    }
}

impl HitStoppable for EnemyCharacter {
    fn freeze_target(&self) -> FreezeTarget {
        if self.is_down() {
            FreezeTarget::Body { go_kinematic: false }
        } else {
            FreezeTarget::Navigation
        }
    }
}
