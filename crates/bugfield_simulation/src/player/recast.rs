//! Recast таймеры (Skill, Guard, Dodge)
//!
//! Таймер растёт от 0 до recast; действие готово когда `timer ≥ recast`.
//! Стартуют полными (всё доступно сразу), сбрасываются в 0 на выходе из состояния.

use serde::{Deserialize, Serialize};

use super::config::RecastConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecastAction {
    Skill,
    Guard,
    Dodge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecastTimer {
    pub timer: f32,
    pub recast: f32,
}

impl RecastTimer {
    pub fn full(recast: f32) -> Self {
        let recast = recast.max(0.0);
        Self { timer: recast, recast }
    }

    pub fn is_ready(&self) -> bool {
        self.timer >= self.recast
    }

    /// 0..1 заполнение (для UI)
    pub fn fraction(&self) -> f32 {
        if self.recast <= 0.0 {
            1.0
        } else {
            (self.timer / self.recast).clamp(0.0, 1.0)
        }
    }
}

/// Изменение recast (публикуется как `RecastChanged`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecastChange {
    pub action: RecastAction,
    pub timer: f32,
    pub recast: f32,
}

#[derive(Debug, Clone)]
pub struct RecastTimers {
    skill: RecastTimer,
    guard: RecastTimer,
    dodge: RecastTimer,
    pending: Vec<RecastChange>,
}

impl RecastTimers {
    pub fn new(config: &RecastConfig) -> Self {
        Self {
            skill: RecastTimer::full(config.skill),
            guard: RecastTimer::full(config.guard),
            dodge: RecastTimer::full(config.dodge),
            pending: Vec::new(),
        }
    }

    pub fn get(&self, action: RecastAction) -> RecastTimer {
        match action {
            RecastAction::Skill => self.skill,
            RecastAction::Guard => self.guard,
            RecastAction::Dodge => self.dodge,
        }
    }

    pub fn is_ready(&self, action: RecastAction) -> bool {
        self.get(action).is_ready()
    }

    /// Уйти на перезарядку
    pub fn reset(&mut self, action: RecastAction) {
        let slot = self.slot_mut(action);
        slot.timer = 0.0;
        let change = RecastChange {
            action,
            timer: slot.timer,
            recast: slot.recast,
        };
        self.pending.push(change);
    }

    /// Прирост таймеров (update фаза). Уведомление — пока таймер растёт.
    pub fn tick(&mut self, dt: f32) {
        for action in [RecastAction::Skill, RecastAction::Guard, RecastAction::Dodge] {
            let slot = self.slot_mut(action);
            if slot.is_ready() {
                continue;
            }
            slot.timer = (slot.timer + dt).clamp(0.0, slot.recast);
            let change = RecastChange {
                action,
                timer: slot.timer,
                recast: slot.recast,
            };
            self.pending.push(change);
        }
    }

    pub fn take_changes(&mut self) -> Vec<RecastChange> {
        std::mem::take(&mut self.pending)
    }

    fn slot_mut(&mut self, action: RecastAction) -> &mut RecastTimer {
        match action {
            RecastAction::Skill => &mut self.skill,
            RecastAction::Guard => &mut self.guard,
            RecastAction::Dodge => &mut self.dodge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recast_starts_ready() {
        let recast = RecastTimers::new(&RecastConfig::default());
        assert!(recast.is_ready(RecastAction::Skill));
        assert!(recast.is_ready(RecastAction::Guard));
        assert!(recast.is_ready(RecastAction::Dodge));
    }

    #[test]
    fn test_reset_and_refill() {
        let mut recast = RecastTimers::new(&RecastConfig::default());
        recast.reset(RecastAction::Skill);
        assert!(!recast.is_ready(RecastAction::Skill));

        recast.tick(2.5);
        assert!(!recast.is_ready(RecastAction::Skill));
        assert_eq!(recast.get(RecastAction::Skill).fraction(), 0.5);

        recast.tick(3.0);
        assert!(recast.is_ready(RecastAction::Skill));
        assert_eq!(recast.get(RecastAction::Skill).timer, 5.0); // clamp

        let changes = recast.take_changes();
        assert_eq!(changes.len(), 3); // reset + 2 тика
        assert!(changes.iter().all(|c| c.action == RecastAction::Skill));
    }

    #[test]
    fn test_zero_recast_is_always_ready() {
        let mut recast = RecastTimers::new(&RecastConfig::default());
        recast.reset(RecastAction::Dodge);
        assert!(recast.is_ready(RecastAction::Dodge));
    }

    #[test]
    fn test_zero_dt_does_not_refill() {
        let mut recast = RecastTimers::new(&RecastConfig::default());
        recast.reset(RecastAction::Guard);
        recast.tick(0.0);
        assert_eq!(recast.get(RecastAction::Guard).timer, 0.0);
    }
}
