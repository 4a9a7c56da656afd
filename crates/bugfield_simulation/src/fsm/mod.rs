//! Generic state machine engine
//!
//! Используется обоими наборами состояний (Player, Enemy).
//! Состояния — plain enum'ы, поведение — trait `CharacterState<C>`,
//! где `C` — контекст персонажа (заимствования его компонентов на один вызов).

pub mod machine;


pub use machine::{CharacterState, StateId, StateMachine, Transition};
