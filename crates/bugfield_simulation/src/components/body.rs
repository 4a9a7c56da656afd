//! Физические коллабораторы персонажа
//!
//! Core не шагает физику: rapier (или headless интегратор) двигает тела,
//! core только пишет velocity/позицию и режим тела.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

/// Режим rigidbody (зеркалится на `RigidBody` в rapier bridge)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum BodyMode {
    /// Позиция задаётся кодом (ходьба, hitstop игрока, reboot врага)
    Kinematic,
    /// Скорость интегрирует физика (нокбэк, полёт "мячом")
    Dynamic { free_rotation: bool },
}

impl Default for BodyMode {
    fn default() -> Self {
        BodyMode::Dynamic { free_rotation: false }
    }
}

impl BodyMode {
    pub fn is_kinematic(&self) -> bool {
        matches!(self, BodyMode::Kinematic)
    }
}

/// Скорость проигрывания анимации (0 = hitstop freeze)
///
/// Отсутствие компонента = нет animation driver'а → визуальный hitstop пропускается.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimationRate(pub f32);

impl Default for AnimationRate {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Контракт movement provider'а (враги)
///
/// Core пишет intent (destination/stop/speed), provider двигает.
/// Pathfinding внутри provider'а непрозрачен.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub enabled: bool,
    pub stopped: bool,
    /// Текущая скорость (m/s), меняется состояниями (погоня/рывок)
    pub speed: f32,
    pub destination: Option<Vec3>,
    /// Фактическая скорость агента (пишет provider, hitstop сохраняет/обнуляет)
    pub velocity: Vec3,
}

impl NavAgent {
    pub fn new(speed: f32) -> Self {
        Self {
            enabled: true,
            stopped: true,
            speed,
            destination: None,
            velocity: Vec3::ZERO,
        }
    }

    pub fn move_to(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.stopped = false;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec3::ZERO;
    }

    pub fn is_moving(&self) -> bool {
        self.enabled && !self.stopped
    }
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(3.5)
    }
}

/// Горизонтальное направление from → to (normalized), None если вырождено
pub fn planar_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let mut delta = to - from;
    delta.y = 0.0;
    delta.try_normalize()
}

/// Горизонтальная проекция вектора (normalized), None если вырождено
pub fn planar(vector: Vec3) -> Option<Vec3> {
    Vec3::new(vector.x, 0.0, vector.z).try_normalize()
}

/// Заимствования физических компонентов одного персонажа на один вызов
pub struct CharacterBody<'a> {
    pub transform: &'a mut Transform,
    pub velocity: &'a mut Velocity,
    pub mode: &'a mut BodyMode,
    pub nav: Option<&'a mut NavAgent>,
}

impl<'a> CharacterBody<'a> {
    pub fn new(
        transform: &'a mut Transform,
        velocity: &'a mut Velocity,
        mode: &'a mut BodyMode,
        nav: Option<&'a mut NavAgent>,
    ) -> Self {
        Self { transform, velocity, mode, nav }
    }

    /// Короткий reborrow (для передачи в hook'и без потери владения)
    pub fn reborrow(&mut self) -> CharacterBody<'_> {
        CharacterBody {
            transform: &mut *self.transform,
            velocity: &mut *self.velocity,
            mode: &mut *self.mode,
            nav: self.nav.as_deref_mut(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// Горизонтальный forward (Bevy: -Z)
    pub fn forward(&self) -> Vec3 {
        planar(*self.transform.forward()).unwrap_or(Vec3::NEG_Z)
    }

    /// Повернуться к точке (вертикаль игнорируется)
    pub fn face_point(&mut self, point: Vec3) {
        if let Some(direction) = planar_direction(self.transform.translation, point) {
            self.face_direction(direction);
        }
    }

    /// Мгновенный поворот в направлении
    pub fn face_direction(&mut self, direction: Vec3) {
        if let Some(direction) = planar(direction) {
            self.transform.rotation = rotation_for(direction);
        }
    }

    /// Плавный поворот не быстрее `max_degrees`
    pub fn rotate_towards(&mut self, direction: Vec3, max_degrees: f32) {
        let Some(direction) = planar(direction) else {
            return;
        };

        let target = rotation_for(direction);
        let current = self.transform.rotation;
        let angle = current.angle_between(target);
        let max_angle = max_degrees.to_radians();

        self.transform.rotation = if angle <= max_angle || angle <= f32::EPSILON {
            target
        } else {
            current.slerp(target, max_angle / angle)
        };
    }

    /// Сдвиг позиции (аналог MovePosition)
    pub fn translate(&mut self, direction: Vec3, speed: f32, dt: f32) {
        self.transform.translation += direction * (speed * dt);
    }

    pub fn translate_forward(&mut self, speed: f32, dt: f32) {
        let forward = self.forward();
        self.translate(forward, speed, dt);
    }

    pub fn set_linear_velocity(&mut self, linvel: Vec3) {
        self.velocity.linvel = linvel;
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.velocity.linvel
    }
}

/// Поворот "смотреть вдоль direction" (Y-up)
pub fn rotation_for(direction: Vec3) -> Quat {
    Transform::IDENTITY.looking_to(direction, Dir3::Y).rotation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_direction_ignores_height() {
        let dir = planar_direction(Vec3::ZERO, Vec3::new(3.0, 10.0, 4.0)).unwrap();
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-5);
    }

    #[test]
    fn test_planar_direction_degenerate() {
        assert!(planar_direction(Vec3::ONE, Vec3::new(1.0, 5.0, 1.0)).is_none());
    }

    #[test]
    fn test_face_point_and_forward() {
        let mut transform = Transform::default();
        let mut velocity = Velocity::default();
        let mut mode = BodyMode::default();
        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, None);

        body.face_point(Vec3::new(5.0, 2.0, 0.0));

        assert!((body.forward() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_rotate_towards_is_capped() {
        let mut transform = Transform::default(); // forward = -Z
        let mut velocity = Velocity::default();
        let mut mode = BodyMode::default();
        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, None);

        body.rotate_towards(Vec3::Z, 90.0);

        // 180° разворот, ограничен 90° за вызов
        let forward = body.forward();
        assert!(forward.z.abs() < 1e-3, "forward = {:?}", forward);
    }

    #[test]
    fn test_nav_agent_stop_clears_velocity() {
        let mut nav = NavAgent::new(4.0);
        nav.move_to(Vec3::X);
        nav.velocity = Vec3::X * 4.0;
        assert!(nav.is_moving());

        nav.stop();
        assert!(!nav.is_moving());
        assert_eq!(nav.velocity, Vec3::ZERO);
    }
}
