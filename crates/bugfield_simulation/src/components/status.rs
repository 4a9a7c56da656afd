//! Status ledger: HP и базовая атака персонажа
//!
//! Инвариант: `0 ≤ current_hp ≤ max_hp` после любой операции.
//! HP меняется только через `apply_damage` (и `restore_full` при reboot'е).
//! Уведомление `HpChange` ставится в очередь ТОЛЬКО при реальном изменении значения.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Профиль статуса (строка status table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct StatusProfile {
    pub max_hp: i32,
    pub attack: i32,
}

impl StatusProfile {
    /// Профиль по умолчанию для отсутствующих записей таблицы
    pub const FALLBACK: StatusProfile = StatusProfile { max_hp: 100, attack: 2 };
}

impl Default for StatusProfile {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Изменение HP (для UI подписчиков)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpChange {
    pub previous: i32,
    pub current: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Reflect)]
pub struct StatusLedger {
    max_hp: i32,
    current_hp: i32,
    attack: i32,
    #[reflect(ignore)]
    pending: Vec<HpChange>,
}

impl StatusLedger {
    pub fn new(profile: StatusProfile) -> Self {
        let max_hp = profile.max_hp.max(0);
        Self {
            max_hp,
            current_hp: max_hp,
            attack: profile.attack,
            pending: Vec::new(),
        }
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> i32 {
        self.current_hp
    }

    pub fn attack(&self) -> i32 {
        self.attack
    }

    pub fn is_depleted(&self) -> bool {
        self.current_hp <= 0
    }

    pub fn percent(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.current_hp as f32 / self.max_hp as f32
        }
    }

    /// Применить урон (clamped subtraction)
    ///
    /// Возвращает true если HP на нуле после вызова.
    /// `amount <= 0` — no-op, возвращает false (не ошибка).
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 {
            return false;
        }

        let next = self.current_hp.saturating_sub(amount).clamp(0, self.max_hp);
        self.set_hp(next);
        self.current_hp <= 0
    }

    /// Reboot: HP → max
    pub fn restore_full(&mut self) {
        self.set_hp(self.max_hp);
    }

    /// Забрать накопленные уведомления (drain для publish системы)
    pub fn take_changes(&mut self) -> Vec<HpChange> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    fn set_hp(&mut self, value: i32) {
        let value = value.clamp(0, self.max_hp);
        if value == self.current_hp {
            return;
        }

        self.pending.push(HpChange {
            previous: self.current_hp,
            current: value,
            max: self.max_hp,
        });
        self.current_hp = value;
    }
}

/// Таблица статусов врагов (индекс = номер врага в уровне)
///
/// Отсутствующий индекс → `StatusProfile::FALLBACK` + warning.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTable {
    pub entries: Vec<StatusProfile>,
}

impl StatusTable {
    pub fn new(entries: Vec<StatusProfile>) -> Self {
        Self { entries }
    }

    pub fn profile(&self, index: usize) -> StatusProfile {
        match self.entries.get(index) {
            Some(profile) => *profile,
            None => {
                crate::logger::log_warning(&format!(
                    "StatusTable: index {} out of range (len {}), using fallback {:?}",
                    index,
                    self.entries.len(),
                    StatusProfile::FALLBACK
                ));
                StatusProfile::FALLBACK
            }
        }
    }
}
