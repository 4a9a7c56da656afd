//! StateMachine: текущее состояние + lifecycle hooks
//!
//! Гарантии:
//! - `change_state(None)` и переход в текущее состояние — no-op
//! - exit(old) строго до enter(new), синхронно, без update между ними
//! - update/fixed_update делегируют только текущему состоянию
//! - переход, запрошенный из update, применяется ПОСЛЕ возврата из hook'а
//!   (exit/enter никогда не выполняются внутри update вызова)

use std::fmt::Debug;

/// Идентичность состояния (имя для логов/UI, терминальность)
pub trait StateId: Copy + Eq + Debug {
    fn name(&self) -> &'static str;

    /// Терминальное состояние (выход запрещён)
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Поведение одного состояния персонажа
///
/// `update`/`fixed_update` возвращают `Some(next)` чтобы запросить переход.
pub trait CharacterState<C>: StateId {
    fn enter(&self, ctx: &mut C);

    fn update(&self, ctx: &mut C) -> Option<Self>;

    fn fixed_update(&self, ctx: &mut C) -> Option<Self>;

    fn exit(&self, ctx: &mut C);
}

/// Совершённый переход (журнал для StateChanged уведомлений)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: Option<S>,
    pub to: S,
}

/// Держатель текущего состояния
///
/// `current == None` только до первого перехода.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine<S> {
    current: Option<S>,
    journal: Vec<Transition<S>>,
}

impl<S> Default for StateMachine<S> {
    fn default() -> Self {
        Self {
            current: None,
            journal: Vec::new(),
        }
    }
}

impl<S: StateId> StateMachine<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current == Some(state)
    }

    pub fn current_name(&self) -> &'static str {
        self.current.map(|s| s.name()).unwrap_or("None")
    }

    /// Переход в `next`. Возвращает true если переход реально произошёл.
    ///
    /// Выход из терминального состояния отклоняется (логируется).
    pub fn change_state<C>(&mut self, next: Option<S>, ctx: &mut C) -> bool
    where
        S: CharacterState<C>,
    {
        let Some(next) = next else {
            return false;
        };

        if self.current == Some(next) {
            return false;
        }

        if let Some(old) = self.current {
            if old.is_terminal() {
                crate::logger::log_warning(&format!(
                    "StateMachine: refused {} → {} (terminal state)",
                    old.name(),
                    next.name()
                ));
                return false;
            }

            old.exit(ctx);
        }

        self.journal.push(Transition {
            from: self.current,
            to: next,
        });
        self.current = Some(next);
        next.enter(ctx);
        true
    }

    /// Забрать журнал переходов с прошлого вызова
    pub fn take_transitions(&mut self) -> Vec<Transition<S>> {
        std::mem::take(&mut self.journal)
    }

    /// Variable-rate фаза. Возвращает true если состояние сменилось.
    pub fn update<C>(&mut self, ctx: &mut C) -> bool
    where
        S: CharacterState<C>,
    {
        let Some(state) = self.current else {
            return false;
        };

        let next = state.update(ctx);
        self.change_state(next, ctx)
    }

    /// Fixed-rate фаза. Возвращает true если состояние сменилось.
    pub fn fixed_update<C>(&mut self, ctx: &mut C) -> bool
    where
        S: CharacterState<C>,
    {
        let Some(state) = self.current else {
            return false;
        };

        let next = state.fixed_update(ctx);
        self.change_state(next, ctx)
    }
}
