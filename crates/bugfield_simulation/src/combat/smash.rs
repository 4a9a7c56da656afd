//! Smash: запуск врага в Down "мячом"
//!
//! SmashRequested → эффекты + вибрация + счётчик/очки + physics hitstop врага,
//! запуск откладывается до конца hitstop (восстановление скорости не должно
//! перетереть скорость запуска).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::hitstop::HitStop;
use super::EnemyBody;
use crate::components::{
    effects::{sfx, vfx},
    CharacterBody, EffectCommand,
};
use crate::events::{CharacterEffect, HitStopRequested, ScoreChanged, SmashCountChanged, SmashRequested};
use crate::player::PlayerCharacter;
use crate::score::Score;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmashSettings {
    pub force: f32,
    pub hit_stop_duration: f32,
    pub vibration_low: f32,
    pub vibration_high: f32,
    pub vibration_duration: f32,
    /// Счётчик серии сбрасывается после стольких секунд без smash'а
    pub count_reset_time: f32,
    pub base_score: i64,
}

impl Default for SmashSettings {
    fn default() -> Self {
        Self {
            force: 23.0,
            hit_stop_duration: 0.2,
            vibration_low: 0.2,
            vibration_high: 0.2,
            vibration_duration: 0.1,
            count_reset_time: 5.0,
            base_score: 1000,
        }
    }
}

/// Отложенный запуск
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingLaunch {
    pub target: Entity,
    pub velocity: Vec3,
    pub wait: f32,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct SmashTracker {
    count: u32,
    reset_timer: Option<f32>,
    pending: Vec<PendingLaunch>,
}

impl SmashTracker {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn pending(&self) -> &[PendingLaunch] {
        &self.pending
    }

    /// +1 к серии, перезапуск таймера сброса. Возвращает новый счётчик.
    pub fn count_up(&mut self, settings: &SmashSettings) -> u32 {
        self.count += 1;
        self.reset_timer = Some(settings.count_reset_time);
        self.count
    }

    /// true — серия только что сброшена
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(timer) = self.reset_timer.as_mut() else {
            return false;
        };

        *timer -= dt;
        if *timer > 0.0 {
            return false;
        }
        self.reset_timer = None;
        self.count = 0;
        true
    }

    pub fn schedule(&mut self, launch: PendingLaunch) {
        // Повторный smash той же цели до запуска — новый вектор
        self.pending.retain(|p| p.target != launch.target);
        self.pending.push(launch);
    }
}

/// Система (Reactions): обработка SmashRequested
#[allow(clippy::too_many_arguments)]
pub fn handle_smash_requests(
    mut requests: EventReader<SmashRequested>,
    settings: Res<SmashSettings>,
    mut tracker: ResMut<SmashTracker>,
    mut score: ResMut<Score>,
    mut effects: EventWriter<CharacterEffect>,
    mut hitstops: EventWriter<HitStopRequested>,
    mut counts: EventWriter<SmashCountChanged>,
    mut scores: EventWriter<ScoreChanged>,
) {
    for request in requests.read() {
        effects.write(CharacterEffect {
            entity: request.target,
            command: EffectCommand::PlayParticle(vfx::SMASH),
        });
        effects.write(CharacterEffect {
            entity: request.attacker,
            command: EffectCommand::Sound(sfx::SMASH_PLAYER),
        });
        effects.write(CharacterEffect {
            entity: request.attacker,
            command: EffectCommand::Vibrate {
                low: settings.vibration_low,
                high: settings.vibration_high,
                duration: settings.vibration_duration,
            },
        });

        let count = tracker.count_up(&settings);
        counts.write(SmashCountChanged { count });

        if score.add(settings.base_score * count as i64) {
            scores.write(ScoreChanged { total: score.total() });
        }

        hitstops.write(HitStopRequested {
            target: request.target,
            duration: settings.hit_stop_duration,
            affects_physics: true,
        });

        tracker.schedule(PendingLaunch {
            target: request.target,
            velocity: request.direction.normalize_or_zero() * settings.force,
            wait: settings.hit_stop_duration,
        });

        crate::logger::log_info(&format!("🏐 SMASH x{} on {:?}", count, request.target));
    }
}

/// Система (Reactions): сброс серии после паузы
pub fn tick_smash_count(time: Res<Time>, mut tracker: ResMut<SmashTracker>, mut counts: EventWriter<SmashCountChanged>) {
    if tracker.tick(time.delta_secs()) {
        counts.write(SmashCountChanged { count: 0 });
    }
}

/// Система (Reactions): запуск после окончания hitstop
pub fn launch_pending_smashes(
    time: Res<Time>,
    mut tracker: ResMut<SmashTracker>,
    mut enemies: Query<(EnemyBody, Option<&HitStop>), Without<PlayerCharacter>>,
) {
    if tracker.pending.is_empty() {
        return;
    }
    let dt = time.delta_secs();

    tracker.pending.retain_mut(|launch| {
        launch.wait -= dt;

        let Ok(((mut enemy, mut transform, mut velocity, mut mode, nav), hitstop)) = enemies.get_mut(launch.target)
        else {
            crate::logger::log(&format!("Smash launch: {:?} is gone", launch.target));
            return false;
        };

        let frozen = hitstop.is_some_and(|h| h.is_active());
        if launch.wait > 0.0 || frozen {
            return true;
        }

        if !enemy.is_down() {
            crate::logger::log(&format!("Smash launch: {:?} left Down, dropped", launch.target));
            return false;
        }

        let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
        enemy.on_smashed(launch.velocity, &mut body);
        false
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_resets_after_idle() {
        let settings = SmashSettings::default();
        let mut tracker = SmashTracker::default();

        assert_eq!(tracker.count_up(&settings), 1);
        assert!(!tracker.tick(3.0));
        // Новый smash перезапускает таймер
        assert_eq!(tracker.count_up(&settings), 2);
        assert!(!tracker.tick(4.0));
        assert!(tracker.tick(1.5));
        assert_eq!(tracker.count(), 0);
        assert!(!tracker.tick(10.0));
    }

    #[test]
    fn test_schedule_replaces_same_target() {
        let mut tracker = SmashTracker::default();
        let target = Entity::from_raw(3);

        tracker.schedule(PendingLaunch {
            target,
            velocity: Vec3::X,
            wait: 0.2,
        });
        tracker.schedule(PendingLaunch {
            target,
            velocity: Vec3::Z,
            wait: 0.2,
        });

        assert_eq!(tracker.pending().len(), 1);
        assert_eq!(tracker.pending()[0].velocity, Vec3::Z);
    }
}
