//! Tests for HitStop coordinator.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use bevy_rapier3d::prelude::Velocity;

    use super::super::hitstop::{CapturedMotion, HitStop};
    use super::super::reaction::FreezeTarget;
    use crate::components::{AnimationRate, BodyMode, CharacterBody, NavAgent};

    struct Rig {
        transform: Transform,
        velocity: Velocity,
        mode: BodyMode,
        nav: NavAgent,
        rate: AnimationRate,
    }

    impl Rig {
        fn dynamic(linvel: Vec3) -> Self {
            Self {
                transform: Transform::default(),
                velocity: Velocity::linear(linvel),
                mode: BodyMode::Dynamic { free_rotation: false },
                nav: NavAgent::new(3.5),
                rate: AnimationRate(1.0),
            }
        }

        fn request(&mut self, hitstop: &mut HitStop, duration: f32, affects_physics: bool, target: FreezeTarget) {
            let mut body = CharacterBody::new(&mut self.transform, &mut self.velocity, &mut self.mode, Some(&mut self.nav));
            hitstop.request(duration, affects_physics, target, &mut self.rate, &mut body);
        }

        fn tick(&mut self, hitstop: &mut HitStop, dt: f32) -> bool {
            let mut body = CharacterBody::new(&mut self.transform, &mut self.velocity, &mut self.mode, Some(&mut self.nav));
            hitstop.tick(dt, &mut self.rate, &mut body).is_some()
        }

        fn latch(&mut self, hitstop: &HitStop) {
            let mut body = CharacterBody::new(&mut self.transform, &mut self.velocity, &mut self.mode, Some(&mut self.nav));
            hitstop.latch(&mut body);
        }
    }

    const BODY: FreezeTarget = FreezeTarget::Body { go_kinematic: false };

    #[test]
    fn test_physics_freeze_restores_exact_velocity() {
        let mut rig = Rig::dynamic(Vec3::new(4.0, 0.0, -2.0));
        let mut hitstop = HitStop::default();

        rig.request(&mut hitstop, 0.2, true, BODY);
        assert!(hitstop.is_active());
        assert_eq!(rig.velocity.linvel, Vec3::ZERO);
        assert_eq!(rig.rate.0, 0.0);

        // Кто-то толкает тело во время заморозки, latch держит ноль
        rig.velocity.linvel = Vec3::X;
        rig.latch(&hitstop);
        assert_eq!(rig.velocity.linvel, Vec3::ZERO);

        assert!(!rig.tick(&mut hitstop, 0.1));
        assert!(rig.tick(&mut hitstop, 0.1));

        assert!(!hitstop.is_active());
        assert_eq!(rig.velocity.linvel, Vec3::new(4.0, 0.0, -2.0));
        assert_eq!(rig.rate.0, 1.0);
    }

    #[test]
    fn test_restart_keeps_pre_freeze_velocity() {
        let mut rig = Rig::dynamic(Vec3::new(0.0, 0.0, 5.0));
        let mut hitstop = HitStop::default();

        rig.request(&mut hitstop, 0.2, true, BODY);
        assert!(!rig.tick(&mut hitstop, 0.15));

        // Повторный запрос: last writer wins, длительность не суммируется
        rig.request(&mut hitstop, 0.1, true, BODY);
        assert_eq!(hitstop.remaining(), Some(0.1));
        assert_eq!(
            hitstop.captured(),
            Some(CapturedMotion::Body {
                linvel: Vec3::new(0.0, 0.0, 5.0),
                mode: BodyMode::Dynamic { free_rotation: false },
            })
        );

        assert!(!rig.tick(&mut hitstop, 0.05));
        assert!(rig.tick(&mut hitstop, 0.05));
        assert_eq!(rig.velocity.linvel, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(rig.rate.0, 1.0);
    }

    #[test]
    fn test_visual_hitstop_leaves_physics_alone() {
        let mut rig = Rig::dynamic(Vec3::new(1.0, 0.0, 0.0));
        let mut hitstop = HitStop::default();

        rig.request(&mut hitstop, 0.05, false, BODY);
        assert_eq!(rig.rate.0, 0.0);
        assert_eq!(rig.velocity.linvel, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hitstop.captured(), None);

        rig.latch(&hitstop);
        assert_eq!(rig.velocity.linvel, Vec3::new(1.0, 0.0, 0.0));

        assert!(rig.tick(&mut hitstop, 0.05));
        assert_eq!(rig.rate.0, 1.0);
    }

    #[test]
    fn test_visual_restart_releases_physics() {
        let mut rig = Rig::dynamic(Vec3::new(0.0, 0.0, -3.0));
        let mut hitstop = HitStop::default();

        rig.request(&mut hitstop, 0.3, true, BODY);
        assert_eq!(rig.velocity.linvel, Vec3::ZERO);

        rig.request(&mut hitstop, 0.05, false, BODY);
        assert_eq!(rig.velocity.linvel, Vec3::new(0.0, 0.0, -3.0));
        assert!(hitstop.is_active());
        // Скорость анимации до первой заморозки
        assert!(rig.tick(&mut hitstop, 0.05));
        assert_eq!(rig.rate.0, 1.0);
    }

    #[test]
    fn test_navigation_freeze() {
        let mut rig = Rig::dynamic(Vec3::ZERO);
        rig.mode = BodyMode::Kinematic;
        rig.nav.stopped = false;
        rig.nav.velocity = Vec3::new(0.0, 0.0, 3.5);
        let mut hitstop = HitStop::default();

        rig.request(&mut hitstop, 0.1, true, FreezeTarget::Navigation);
        assert!(rig.nav.stopped);
        assert_eq!(rig.nav.velocity, Vec3::ZERO);

        assert!(rig.tick(&mut hitstop, 0.1));
        assert!(!rig.nav.stopped);
        assert_eq!(rig.nav.velocity, Vec3::new(0.0, 0.0, 3.5));
    }

    #[test]
    fn test_go_kinematic_restores_mode() {
        let mut rig = Rig::dynamic(Vec3::new(2.0, 0.0, 0.0));
        let mut hitstop = HitStop::default();

        rig.request(&mut hitstop, 0.1, true, FreezeTarget::Body { go_kinematic: true });
        assert_eq!(rig.mode, BodyMode::Kinematic);

        assert!(rig.tick(&mut hitstop, 0.1));
        assert_eq!(rig.mode, BodyMode::Dynamic { free_rotation: false });
        assert_eq!(rig.velocity.linvel, Vec3::new(2.0, 0.0, 0.0));
    }
}
