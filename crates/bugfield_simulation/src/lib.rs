//! BugField Simulation Core
//!
//! ECS-симуляция персонажей на Bevy 0.16:
//! - player: combo/skill/guard/dodge state set, ввод, recast
//! - enemy: погоня, рывковая атака, Down/reboot, "мяч" после smash
//! - combat: урон, нокбэк, hitstop, smash, bug field стены
//!
//! Движок (рендер, анимации, звук, физика коллизий) общается с core событиями:
//! контакты/cues/ввод внутрь, CharacterEffect/HpChanged/StateChanged наружу.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod enemy;
pub mod events;
pub mod fsm;
pub mod logger;
pub mod physics;
pub mod player;
pub mod schedule;
pub mod score;

// Re-export базовых типов для удобства
pub use combat::{spawn_hazard_wall, CombatPlugin, DamageReaction, HazardField, HitKind, HitStop, SmashSettings};
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use enemy::{spawn_broken_enemy, spawn_enemy, EnemyCharacter, EnemyPlugin, EnemyRoster, EnemyState};
pub use logger::init_logger;
pub use physics::{HeadlessPhysicsPlugin, RapierBridgePlugin};
pub use player::{spawn_player, PlayerCharacter, PlayerPlugin, PlayerState};
pub use schedule::{FixedPhase, UpdatePhase};
pub use score::{Score, ScorePlugin};

/// Seed по умолчанию, если хост не вставил свой DeterministicRng
pub const DEFAULT_SEED: u64 = 42;

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Физику не добавляет: headless → HeadlessPhysicsPlugin, движок → RapierBridgePlugin.
/// Если до plugin'а вставлен `SimulationConfig`, из него берутся smash/score/status table.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        schedule::configure_phases(app);

        // Fixed timestep 60Hz для simulation tick
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(DEFAULT_SEED));
        }

        let config = app.world().get_resource::<SimulationConfig>().cloned();
        if let Some(config) = config {
            app.insert_resource(config.smash.clone())
                .insert_resource(config.status_table.clone())
                .insert_resource(Score::new(config.score_enabled));
        } else {
            app.init_resource::<components::StatusTable>();
        }

        app.add_plugins((CombatPlugin, PlayerPlugin, EnemyPlugin, ScorePlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает ровно на один fixed tick за `app.update()` (детерминизм тестов).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_secs_f64(1.0 / 60.0),
        ))
        .add_plugins(HeadlessPhysicsPlugin);

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
