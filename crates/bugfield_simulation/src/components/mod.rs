//! Общие ECS компоненты персонажей
//!
//! - status: StatusLedger (HP/ATK) + status tables
//! - body: физические коллабораторы (BodyMode, NavAgent, AnimationRate)
//! - effects: fire-and-forget команды для audio/vfx/animation слоя

pub mod body;
pub mod effects;
pub mod status;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod status_tests;

pub use body::*;
pub use effects::*;
pub use status::*;
