//! Фазы тика симуляции
//!
//! Update фаза (variable rate) выполняется в `RunFixedMainLoop` ДО fixed шагов
//! этого кадра, fixed фаза — в `FixedUpdate` (60Hz).

use bevy::prelude::*;

/// Variable-rate фаза (ввод, резолв ударов, переходы состояний)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatePhase {
    /// Ввод, animation cues, назначение целей
    Input,
    /// Контакты → take_damage
    Combat,
    /// Нокбэк, hitstop, smash
    Reactions,
    /// StateMachine::update
    States,
    /// Outbox'ы → события
    Publish,
}

/// Fixed-rate фаза (движение, удержание hitstop, интеграция)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedPhase {
    /// StateMachine::fixed_update
    States,
    /// Удержание скорости замороженных персонажей
    HitStop,
    /// Интеграция скорости (headless физика)
    Integrate,
    Publish,
}

/// Упорядочить фазы
pub fn configure_phases(app: &mut App) {
    app.configure_sets(
        RunFixedMainLoop,
        (
            UpdatePhase::Input,
            UpdatePhase::Combat,
            UpdatePhase::Reactions,
            UpdatePhase::States,
            UpdatePhase::Publish,
        )
            .chain()
            .in_set(RunFixedMainLoopSystem::BeforeFixedMainLoop),
    );

    app.configure_sets(
        FixedUpdate,
        (
            FixedPhase::States,
            FixedPhase::HitStop,
            FixedPhase::Integrate,
            FixedPhase::Publish,
        )
            .chain(),
    );
}
