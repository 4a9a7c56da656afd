//! Входные данные игрока
//!
//! Для headless тестов — заполняется событиями `PlayerActionInput`/`PlayerMoveInput`.
//! Attack/Dodge принимаются только при открытом gate'е (`can_attack`/`can_dodge`).

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ActionButton {
    Attack,
    Guard,
    Dodge,
    Skill,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct PlayerInput {
    /// Ось движения (x — вправо, y — вперёд относительно камеры)
    pub move_axis: Vec2,
    pub attack_pressed: bool,
    pub guard_pressed: bool,
    pub dodge_pressed: bool,
    pub skill_pressed: bool,
}

impl PlayerInput {
    pub fn has_move(&self) -> bool {
        self.move_axis.length() > 0.01
    }

    /// Нажатие/отпускание кнопки. Возвращает true если состояние принято.
    pub fn press(&mut self, button: ActionButton, pressed: bool, can_attack: bool, can_dodge: bool) -> bool {
        match (button, pressed) {
            (ActionButton::Attack, true) if !can_attack => false,
            (ActionButton::Dodge, true) if !can_dodge => false,
            (ActionButton::Attack, value) => {
                self.attack_pressed = value;
                true
            }
            (ActionButton::Dodge, value) => {
                self.dodge_pressed = value;
                true
            }
            (ActionButton::Guard, value) => {
                self.guard_pressed = value;
                true
            }
            (ActionButton::Skill, value) => {
                self.skill_pressed = value;
                true
            }
        }
    }

    /// Сброс attack/dodge/skill. Guard держится кнопкой, не сбрасывается.
    pub fn reset_all_pressed(&mut self) {
        self.attack_pressed = false;
        self.dodge_pressed = false;
        self.skill_pressed = false;
    }
}

/// Базис камеры для camera-relative движения (пишет внешняя камера)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MoveBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for MoveBasis {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}

impl MoveBasis {
    /// Мировое направление из оси ввода (горизонтальное, normalized)
    pub fn world_direction(&self, axis: Vec2) -> Vec3 {
        let forward = Vec3::new(self.forward.x, 0.0, self.forward.z).normalize_or_zero();
        let right = Vec3::new(self.right.x, 0.0, self.right.z).normalize_or_zero();
        (forward * axis.y + right * axis.x).normalize_or_zero()
    }
}
