//! Headless физика (без rapier pipeline)
//!
//! - Dynamic тела: position += linvel * dt (+ angvel если вращение свободно)
//! - NavAgent: шаг к destination со скоростью агента, поворот по ходу
//!
//! Kinematic тела двигает код (состояния), сюда не попадают.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

use crate::components::{rotation_for, BodyMode, NavAgent};
use crate::schedule::FixedPhase;

/// Ближе этого агент считается пришедшим
pub const ARRIVAL_DISTANCE: f32 = 0.05;

/// Система (fixed фаза): интеграция скорости Dynamic тел
pub fn integrate_bodies(time: Res<Time>, mut bodies: Query<(&mut Transform, &Velocity, &BodyMode)>) {
    let dt = time.delta_secs();

    for (mut transform, velocity, mode) in bodies.iter_mut() {
        let BodyMode::Dynamic { free_rotation } = *mode else {
            continue;
        };

        transform.translation += velocity.linvel * dt;
        if free_rotation && velocity.angvel != Vec3::ZERO {
            transform.rotation = Quat::from_scaled_axis(velocity.angvel * dt) * transform.rotation;
        }
    }
}

/// Один шаг агента. Возвращает фактическую скорость шага.
pub fn step_agent(transform: &mut Transform, nav: &NavAgent, dt: f32) -> Vec3 {
    if !nav.enabled || nav.stopped || dt <= 0.0 {
        return Vec3::ZERO;
    }
    let Some(destination) = nav.destination else {
        return Vec3::ZERO;
    };

    let mut offset = destination - transform.translation;
    offset.y = 0.0;
    let distance = offset.length();
    if distance <= ARRIVAL_DISTANCE {
        return Vec3::ZERO;
    }

    // Не проскакиваем точку назначения
    let step = (nav.speed * dt).min(distance);
    let direction = offset / distance;
    transform.translation += direction * step;
    transform.rotation = rotation_for(direction);

    direction * (step / dt)
}

/// Система (fixed фаза): навигационные агенты
pub fn step_nav_agents(time: Res<Time>, mut agents: Query<(&mut Transform, &mut NavAgent)>) {
    let dt = time.delta_secs();

    for (mut transform, mut nav) in agents.iter_mut() {
        let velocity = step_agent(&mut transform, &nav, dt);
        if nav.velocity != velocity {
            nav.velocity = velocity;
        }
    }
}

/// Headless Physics Plugin
///
/// Для тестов/headless симуляции: вместо rapier step'а.
/// Хост с RapierPhysicsPlugin этот plugin не добавляет.
pub struct HeadlessPhysicsPlugin;

impl Plugin for HeadlessPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (step_nav_agents, integrate_bodies)
                .chain()
                .in_set(FixedPhase::Integrate),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chasing(destination: Vec3) -> NavAgent {
        let mut nav = NavAgent::new(2.0);
        nav.stopped = false;
        nav.move_to(destination);
        nav
    }

    #[test]
    fn test_agent_walks_towards_destination() {
        let mut transform = Transform::default();
        let nav = chasing(Vec3::new(0.0, 0.0, -10.0));

        let velocity = step_agent(&mut transform, &nav, 0.5);

        assert!((transform.translation - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((velocity - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
        // Смотрит по ходу движения
        assert!((*transform.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_agent_does_not_overshoot() {
        let mut transform = Transform::default();
        let nav = chasing(Vec3::new(0.5, 0.0, 0.0));

        step_agent(&mut transform, &nav, 1.0);
        assert!((transform.translation - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);

        let velocity = step_agent(&mut transform, &nav, 1.0);
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn test_stopped_agent_stays() {
        let mut transform = Transform::default();
        let mut nav = chasing(Vec3::new(0.0, 0.0, -10.0));
        nav.stop();

        assert_eq!(step_agent(&mut transform, &nav, 0.5), Vec3::ZERO);
        assert_eq!(transform.translation, Vec3::ZERO);
    }
}
