//! Fire-and-forget команды для presentation слоя
//!
//! Core кладёт команды в outbox персонажа, publish система сливает их
//! в `CharacterEffect` события. Отсутствие подписчика не влияет на логику.

/// Имена звуков (резолвит audio слой)
pub mod sfx {
    pub const HIT_PLAYER: &str = "hit_player";
    pub const ATTACK_PLAYER: &str = "attack_player";
    pub const SKILL_PLAYER: &str = "skill_player";
    pub const GUARD_PLAYER: &str = "guard_player";
    pub const GUARD_ON_PLAYER: &str = "guard_on_player";
    pub const DODGE_PLAYER: &str = "dodge_player";
    pub const DAMAGED_PLAYER: &str = "damaged_player";
    pub const SMASH_PLAYER: &str = "smash_player";

    pub const ATTACK_ENEMY: &str = "attack_enemy";
    pub const CHARGE_ENEMY: &str = "charge_enemy";
    pub const HIT_ENEMY: &str = "hit_enemy";
    pub const WALL_HIT_ENEMY: &str = "wall_hit_enemy";
    pub const EXPLOSION_ENEMY: &str = "explosion_enemy";
}

/// Имена параметров аниматора
pub mod anim {
    pub const TRIGGER_ATTACK: &str = "Attack";
    pub const TRIGGER_DODGE: &str = "Dodge";
    pub const TRIGGER_SKILL: &str = "Skill";
    pub const TRIGGER_KNOCKBACK: &str = "KnockBack";
    pub const TRIGGER_DIE: &str = "Die";
    pub const TRIGGER_DOWN: &str = "Down";
    pub const TRIGGER_REBOOT: &str = "Reboot";
    pub const BOOL_FIRST_ATTACK: &str = "FirstAttack";
    pub const BOOL_GUARD: &str = "Guard";
    pub const BOOL_MOVE: &str = "isMove";
    pub const BOOL_ATTACK: &str = "Attack";
    pub const BOOL_BATTLE: &str = "Battle";
    pub const FLOAT_KNOCKBACK_SPEED: &str = "KnockBackSpeed";
}

/// Имена particle эффектов
pub mod vfx {
    pub const SLASH: &str = "slash";
    pub const GUARD: &str = "guard";
    pub const GUARD_SUCCESS: &str = "guard_success";
    pub const ATTACK_HIT: &str = "attack_hit";
    pub const ENEMY_CHARGE: &str = "enemy_charge";
    pub const ENEMY_RUSH: &str = "enemy_rush";
    pub const SMASH: &str = "smash";
    pub const WALL_HIT: &str = "wall_hit";
    pub const EXPLOSION: &str = "explosion";
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectCommand {
    Sound(&'static str),
    PlayParticle(&'static str),
    StopParticle(&'static str),
    /// Пауза/возобновление текущего slash эффекта (visual hitstop)
    PauseParticle { name: &'static str, paused: bool },
    Vibrate { low: f32, high: f32, duration: f32 },
    AnimTrigger(&'static str),
    AnimResetTrigger(&'static str),
    AnimBool(&'static str, bool),
    AnimFloat(&'static str, f32),
    /// Видимость рендереров (мигание после урона)
    Blink { visible: bool },
    DamagedPostEffect(bool),
    Trail(bool),
    GuardWarning(bool),
    Explode,
}

/// Очередь команд одного персонажа
#[derive(Debug, Clone, Default)]
pub struct EffectOutbox {
    commands: Vec<EffectCommand>,
}

impl EffectOutbox {
    pub fn push(&mut self, command: EffectCommand) {
        self.commands.push(command);
    }

    pub fn sound(&mut self, name: &'static str) {
        self.push(EffectCommand::Sound(name));
    }

    pub fn trigger(&mut self, name: &'static str) {
        self.push(EffectCommand::AnimTrigger(name));
    }

    pub fn set_bool(&mut self, name: &'static str, value: bool) {
        self.push(EffectCommand::AnimBool(name, value));
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, EffectCommand> {
        self.commands.drain(..)
    }

    pub fn contains(&self, command: &EffectCommand) -> bool {
        self.commands.contains(command)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Флаги "окон реакции", которые наблюдают UI/AI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionFlags {
    pub guarding: bool,
    pub invincible: bool,
}
