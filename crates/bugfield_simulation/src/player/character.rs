//! PlayerCharacter: ledger + state machine + per-state данные одним компонентом
//!
//! Все части персонажа создаются вместе; состояния видят их через `PlayerCtx`
//! (заимствования на один вызов), без обратных ссылок.

use bevy::prelude::*;

use super::config::PlayerConfig;
use super::input::{ActionButton, MoveBasis, PlayerInput};
use super::recast::{RecastChange, RecastTimers};
use super::states::{volume_mode_for, PlayerState};
use crate::combat::{
    AttackStep, AttackVolume, DamageReaction, Damageable, FreezeTarget, HitStoppable, KnockbackReceiver,
    KnockbackRequest, VolumeMode,
};
use crate::components::{
    effects::{sfx, vfx},
    CharacterBody, EffectCommand, EffectOutbox, HpChange, ReactionFlags, StatusLedger,
};
use crate::events::PlayerCue;
use crate::fsm::{StateMachine, Transition};

/// Данные кадра, которых нет в самом персонаже
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerEnv {
    pub dt: f32,
    /// Ближайший враг в радиусе auto-turn (из roster'а)
    pub nearest_enemy: Option<Vec3>,
    pub move_basis: MoveBasis,
}

impl PlayerEnv {
    pub fn with_dt(dt: f32) -> Self {
        Self { dt, ..Default::default() }
    }
}

/// Окно неуязвимости после полученного урона (с миганием)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostHitWindow {
    pub remaining: f32,
    pub blink_timer: f32,
    pub visible: bool,
}

/// Per-state данные игрока
#[derive(Debug, Clone)]
pub struct PlayerCore {
    pub can_attack: bool,
    pub can_dodge: bool,
    pub is_guarding: bool,
    pub invincible: bool,
    pub combo: usize,
    /// AttackEnd / SkillEnd / DodgeFinish получен (или сработал fallback)
    pub action_finished: bool,
    pub attack_move: bool,
    pub attack_move_timer: f32,
    pub auto_turn_count: u32,
    /// Таймер текущего состояния (guard/dodge/damaged/fallback'и)
    pub state_timer: f32,
    pub damaged_duration: f32,
    pub guard_warning: bool,
    /// Есть animation driver (пришёл хотя бы один cue) → fallback таймеры выключены
    pub cue_driven: bool,
    pub volume: AttackVolume,
    pub recast: RecastTimers,
    pub post_hit: Option<PostHitWindow>,
    pub effects: EffectOutbox,
    pub published_flags: ReactionFlags,
    pub died: bool,
}

impl PlayerCore {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            can_attack: false,
            can_dodge: false,
            is_guarding: false,
            invincible: false,
            combo: 0,
            action_finished: false,
            attack_move: false,
            attack_move_timer: 0.0,
            auto_turn_count: 0,
            state_timer: 0.0,
            damaged_duration: 0.0,
            guard_warning: false,
            cue_driven: false,
            volume: AttackVolume::default(),
            recast: RecastTimers::new(&config.recast),
            post_hit: None,
            effects: EffectOutbox::default(),
            published_flags: ReactionFlags::default(),
            died: false,
        }
    }

    pub fn flags(&self) -> ReactionFlags {
        ReactionFlags {
            guarding: self.is_guarding,
            invincible: self.invincible,
        }
    }
}

/// Контекст для hook'ов состояний
pub struct PlayerCtx<'a> {
    pub core: &'a mut PlayerCore,
    pub input: &'a mut PlayerInput,
    pub config: &'a PlayerConfig,
    pub body: CharacterBody<'a>,
    pub env: PlayerEnv,
}

impl PlayerCtx<'_> {
    pub fn has_move(&self) -> bool {
        self.input.has_move()
    }

    /// Camera-relative направление ввода
    pub fn move_direction(&self) -> Vec3 {
        self.env.move_basis.world_direction(self.input.move_axis)
    }

    /// Куда идти после завершения действия
    pub fn idle_or_move(&self) -> PlayerState {
        if self.has_move() {
            PlayerState::Move
        } else {
            PlayerState::Idle
        }
    }

    /// Повернуться к ближайшему врагу, иначе по вводу
    pub fn auto_turn(&mut self) {
        if let Some(enemy) = self.env.nearest_enemy {
            self.body.face_point(enemy);
        } else if self.has_move() {
            let direction = self.move_direction();
            let max_degrees = self.config.rotation_speed * self.env.dt;
            self.body.rotate_towards(direction, max_degrees);
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct PlayerCharacter {
    status: StatusLedger,
    machine: StateMachine<PlayerState>,
    core: PlayerCore,
    input: PlayerInput,
    config: PlayerConfig,
}

impl PlayerCharacter {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            status: StatusLedger::new(config.status),
            machine: StateMachine::new(),
            core: PlayerCore::new(&config),
            input: PlayerInput::default(),
            config,
        }
    }

    pub fn status(&self) -> &StatusLedger {
        &self.status
    }

    pub fn core(&self) -> &PlayerCore {
        &self.core
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn input(&self) -> &PlayerInput {
        &self.input
    }

    pub fn state(&self) -> Option<PlayerState> {
        self.machine.current()
    }

    pub fn current_state_name(&self) -> &'static str {
        self.machine.current_name()
    }

    pub fn is_guarding(&self) -> bool {
        self.core.is_guarding
    }

    pub fn is_invincible(&self) -> bool {
        self.core.invincible
    }

    pub fn is_dead(&self) -> bool {
        self.machine.is_in(PlayerState::Die)
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

    /// Шаг атаки для формулы урона (skill vs combo)
    pub fn attack_step(&self) -> AttackStep {
        match self.core.volume.mode() {
            VolumeMode::Skill => AttackStep::Skill,
            _ => AttackStep::Combo(self.core.combo),
        }
    }

    /// Собрать контекст и выполнить `f` (первый вызов входит в Idle)
    fn with_ctx<R>(
        &mut self,
        body: CharacterBody<'_>,
        env: PlayerEnv,
        f: impl FnOnce(&mut StateMachine<PlayerState>, &mut PlayerCtx<'_>) -> R,
    ) -> R {
        let PlayerCharacter {
            machine,
            core,
            input,
            config,
            ..
        } = self;
        let mut ctx = PlayerCtx {
            core,
            input,
            config,
            body,
            env,
        };

        if machine.current().is_none() {
            machine.change_state(Some(PlayerState::Idle), &mut ctx);
        }

        f(machine, &mut ctx)
    }

    /// Войти в начальное состояние
    pub fn start(&mut self, body: CharacterBody<'_>) {
        self.with_ctx(body, PlayerEnv::default(), |_, _| ());
    }

    /// Variable-rate фаза
    pub fn update(&mut self, body: CharacterBody<'_>, env: PlayerEnv) {
        self.core.recast.tick(env.dt);
        self.tick_post_hit(env.dt);
        self.with_ctx(body, env, |machine, ctx| machine.update(ctx));
    }

    /// Fixed-rate фаза
    pub fn fixed_update(&mut self, body: CharacterBody<'_>, env: PlayerEnv) {
        self.with_ctx(body, env, |machine, ctx| {
            machine.fixed_update(ctx);
            // Скорость тела игрока — только нокбэк; восстановленная hitstop'ом после Damaged тоже гасится
            if !machine.is_in(PlayerState::Damaged) {
                ctx.body.set_linear_velocity(Vec3::ZERO);
            }
        });
    }

    /// Внешний переход (реакции на урон)
    pub fn change_state(&mut self, next: PlayerState, body: CharacterBody<'_>) -> bool {
        self.with_ctx(body, PlayerEnv::default(), |machine, ctx| {
            machine.change_state(Some(next), ctx)
        })
    }

    /// Нажатие кнопки с gate'ами can_attack/can_dodge
    pub fn press(&mut self, button: ActionButton, pressed: bool) -> bool {
        self.input
            .press(button, pressed, self.core.can_attack, self.core.can_dodge)
    }

    pub fn set_move_axis(&mut self, axis: Vec2) {
        self.input.move_axis = axis;
    }

    /// Animation cue от внешнего драйвера
    pub fn handle_cue(&mut self, cue: PlayerCue) {
        self.core.cue_driven = true;
        let state = self.machine.current();
        let in_attack = state == Some(PlayerState::Attack);
        let in_skill = state == Some(PlayerState::Skill);

        match cue {
            PlayerCue::AttackWindow(open) => self.core.can_attack = open,
            PlayerCue::SlashEffect(_) if in_attack || in_skill => {
                self.core.effects.push(EffectCommand::PlayParticle(vfx::SLASH));
            }
            PlayerCue::EnableAttackVolume if in_attack || in_skill => {
                if let Some(mode) = volume_mode_for(state) {
                    self.core.volume.enable(mode);
                }
            }
            PlayerCue::EnableSkillVolume if in_skill => self.core.volume.enable(VolumeMode::Skill),
            PlayerCue::DisableAttackVolume => self.core.volume.disable(),
            PlayerCue::AttackMoveBegin if in_attack => self.core.attack_move = true,
            PlayerCue::AttackEnd if in_attack => self.core.action_finished = true,
            PlayerCue::SkillEnd if in_skill => self.core.action_finished = true,
            PlayerCue::DodgeFinish if state == Some(PlayerState::Dodge) => self.core.action_finished = true,
            other => {
                crate::logger::log(&format!(
                    "Player: cue {:?} ignored in {}",
                    other,
                    self.current_state_name()
                ));
            }
        }
    }

    /// Эффект попадания собственным ударом
    pub fn on_attack_hit(&mut self) {
        self.core.effects.push(EffectCommand::PlayParticle(vfx::ATTACK_HIT));
        self.core.effects.sound(sfx::HIT_PLAYER);
    }

    /// Мигание и снятие post-hit неуязвимости
    fn tick_post_hit(&mut self, dt: f32) {
        let blink_interval = self.config.blink_interval;
        let Some(window) = self.core.post_hit.as_mut() else {
            return;
        };

        window.remaining -= dt;
        window.blink_timer += dt;
        if window.remaining <= 0.0 {
            self.core.post_hit = None;
            self.core.invincible = false;
            self.core.effects.push(EffectCommand::Blink { visible: true });
            return;
        }

        if blink_interval > 0.0 && window.blink_timer >= blink_interval {
            window.blink_timer = 0.0;
            window.visible = !window.visible;
            let visible = window.visible;
            self.core.effects.push(EffectCommand::Blink { visible });
        }
    }

    pub fn take_transitions(&mut self) -> Vec<Transition<PlayerState>> {
        self.machine.take_transitions()
    }

    pub fn take_hp_changes(&mut self) -> Vec<HpChange> {
        self.status.take_changes()
    }

    pub fn take_recast_changes(&mut self) -> Vec<RecastChange> {
        self.core.recast.take_changes()
    }

    pub fn drain_effects(&mut self) -> Vec<EffectCommand> {
        self.core.effects.drain().collect()
    }

    /// Флаги, изменившиеся с прошлой публикации
    pub fn take_flag_changes(&mut self) -> Option<(ReactionFlags, ReactionFlags)> {
        let current = self.core.flags();
        let previous = self.core.published_flags;
        if current == previous {
            return None;
        }
        self.core.published_flags = current;
        Some((previous, current))
    }

    /// PlayerDied ещё не опубликован
    pub fn take_death(&mut self) -> bool {
        std::mem::take(&mut self.core.died)
    }
}

impl Damageable for PlayerCharacter {
    fn take_damage(&mut self, amount: i32, body: &mut CharacterBody) -> DamageReaction {
        if self.is_dead() {
            return DamageReaction::Down;
        }

        if self.core.is_guarding {
            self.core.effects.push(EffectCommand::PlayParticle(vfx::GUARD_SUCCESS));
            self.core.effects.sound(sfx::GUARD_PLAYER);
            return DamageReaction::Guarded;
        }

        if self.core.invincible {
            return DamageReaction::Invincible;
        }

        if amount <= 0 {
            crate::logger::log(&format!("Player: non-positive damage {} ignored", amount));
            return DamageReaction::DamagedOnly;
        }

        if self.status.apply_damage(amount) {
            self.change_state(PlayerState::Die, body.reborrow());
            self.core.died = true;
            crate::logger::log_info(&format!("💀 Player died (damage {})", amount));
            return DamageReaction::Down;
        }

        // Неуязвимость + мигание на damaged_invincible_time
        self.core.invincible = true;
        self.core.post_hit = Some(PostHitWindow {
            remaining: self.config.damaged_invincible_time,
            blink_timer: 0.0,
            visible: true,
        });
        DamageReaction::Damaged
    }
}

impl KnockbackReceiver for PlayerCharacter {
    fn apply_knockback(&mut self, request: &KnockbackRequest, body: &mut CharacterBody) -> bool {
        if self.is_dead() {
            return false;
        }

        // Повторный нокбэк в Damaged перезапускает таймер реакции
        self.core.damaged_duration = request.reaction_duration;
        self.core.state_timer = 0.0;
        self.change_state(PlayerState::Damaged, body.reborrow());

        if request.direction.is_none() {
            if let Some(source) = request.source {
                body.face_point(source);
            }
        }

        match request.push_velocity(body.position()) {
            Some(push) => body.set_linear_velocity(push),
            None => crate::logger::log_warning(&format!(
                "Player: knockback without source/direction ({:?}), push skipped",
                request.kind
            )),
        }
        true
    }
}

impl HitStoppable for PlayerCharacter {
    fn freeze_target(&self) -> FreezeTarget {
        FreezeTarget::Body { go_kinematic: true }
    }
}
