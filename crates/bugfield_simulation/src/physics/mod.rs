//! Physics module
//!
//! Core не шагает физику сам. Два варианта исполнения контракта:
//! - integrate: headless интегратор (тесты, серверная симуляция)
//! - bridge: rapier коллайдеры/сенсоры ↔ события core

pub mod bridge;
pub mod integrate;

// Re-export основных типов
pub use bridge::{AttackSensor, HazardTouches, RapierBridgePlugin};
pub use integrate::{step_agent, HeadlessPhysicsPlugin};
