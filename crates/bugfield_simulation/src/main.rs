//! Headless симуляция BugField
//!
//! Арена без движка: игрок бьёт по ритму, контакты считает простой
//! proximity oracle вместо коллайдеров. Первый аргумент — путь к RON конфигу.

use bevy::prelude::*;
use bugfield_simulation::events::{
    AttackContact, ContactPhase, HazardBroken, HazardContact, PlayerActionInput, PlayerCue, PlayerCueFired,
    ScoreChanged, TargetAssigned,
};
use bugfield_simulation::logger::{log, log_error};
use bugfield_simulation::player::ActionButton;
use bugfield_simulation::*;

const TICKS: u32 = 1200;
const ATTACK_PERIOD: u32 = 40;
const ATTACK_REACH: f32 = 1.8;
const WALL_REACH: f32 = 0.6;
const ARENA_HALF: f32 = 12.0;

/// Игрок, за которого "жмёт кнопки" скрипт
#[derive(Resource)]
struct ScriptedPlayer(Entity);

#[derive(Resource, Default)]
struct DemoStats {
    score: i64,
    broken_walls: usize,
}

/// Ритм атак: нажатие → volume on → volume off
fn drive_player(
    mut tick: Local<u32>,
    scripted: Res<ScriptedPlayer>,
    mut actions: EventWriter<PlayerActionInput>,
    mut cues: EventWriter<PlayerCueFired>,
) {
    *tick += 1;
    let entity = scripted.0;
    match *tick % ATTACK_PERIOD {
        0 => {
            actions.write(PlayerActionInput {
                entity,
                button: ActionButton::Attack,
                pressed: true,
            });
        }
        6 => {
            cues.write(PlayerCueFired {
                entity,
                cue: PlayerCue::EnableAttackVolume,
            });
        }
        16 => {
            cues.write(PlayerCueFired {
                entity,
                cue: PlayerCue::DisableAttackVolume,
            });
        }
        _ => {}
    }
}

/// Proximity oracle: включённый volume игрока касается врагов в радиусе,
/// враги-"мячи" касаются стен в полосе WALL_REACH
fn proximity_contacts(
    players: Query<(Entity, &PlayerCharacter, &Transform)>,
    enemies: Query<(Entity, &EnemyCharacter, &Transform)>,
    walls: Query<(Entity, &HazardField, &Transform)>,
    mut touching: Local<std::collections::BTreeSet<(Entity, Entity)>>,
    mut attacks: EventWriter<AttackContact>,
    mut hazards: EventWriter<HazardContact>,
) {
    for (player, character, player_tf) in players.iter() {
        if !character.volume().is_enabled() {
            continue;
        }
        for (enemy, _, enemy_tf) in enemies.iter() {
            if player_tf.translation.distance(enemy_tf.translation) <= ATTACK_REACH {
                attacks.write(AttackContact {
                    attacker: player,
                    target: enemy,
                    point: enemy_tf.translation,
                });
            }
        }
    }

    for (wall, field, wall_tf) in walls.iter() {
        if !field.is_active() {
            continue;
        }
        let normal = (-wall_tf.translation).with_y(0.0).normalize_or_zero();
        for (enemy, character, enemy_tf) in enemies.iter() {
            let depth = (enemy_tf.translation - wall_tf.translation).dot(normal);
            let key = (wall, enemy);
            if character.is_ball() && depth <= WALL_REACH {
                if touching.insert(key) {
                    hazards.write(HazardContact {
                        hazard: wall,
                        entity: enemy,
                        normal,
                        point: enemy_tf.translation,
                        phase: ContactPhase::Enter,
                    });
                }
            } else {
                touching.remove(&key);
            }
        }
    }
}

fn track_stats(
    mut score: EventReader<ScoreChanged>,
    mut broken: EventReader<HazardBroken>,
    mut stats: ResMut<DemoStats>,
) {
    if let Some(last) = score.read().last() {
        stats.score = last.total;
    }
    stats.broken_walls += broken.read().count();
}

fn load_config() -> SimulationConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SimulationConfig::default();
    };
    match SimulationConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("Config {} rejected: {}, using defaults", path, err));
            SimulationConfig::default()
        }
    }
}

fn main() {
    let seed = DEFAULT_SEED;
    println!("Starting BugField headless simulation (seed: {})", seed);

    let config = load_config();

    let mut app = create_headless_app(seed);
    app.insert_resource(config.clone())
        .add_plugins(SimulationPlugin)
        .init_resource::<DemoStats>();

    let player = {
        let mut commands = app.world_mut().commands();
        let player = spawn_player(&mut commands, config.player.clone(), Vec3::ZERO);

        let profile = config.enemy_profile(&config.enemy);
        for x in [-3.0, 0.0, 3.0] {
            spawn_enemy(&mut commands, profile, config.enemy.clone(), Vec3::new(x, 0.0, -6.0));
        }
        spawn_broken_enemy(
            &mut commands,
            profile,
            config.enemy.clone(),
            config.broken,
            Vec3::new(0.0, 0.0, 2.0),
        );

        for position in [
            Vec3::new(0.0, 0.0, -ARENA_HALF),
            Vec3::new(0.0, 0.0, ARENA_HALF),
            Vec3::new(-ARENA_HALF, 0.0, 0.0),
            Vec3::new(ARENA_HALF, 0.0, 0.0),
        ] {
            spawn_hazard_wall(&mut commands, config.hazard, Transform::from_translation(position));
        }
        player
    };
    app.world_mut().flush();

    let enemies: Vec<Entity> = app
        .world_mut()
        .query_filtered::<Entity, (With<EnemyCharacter>, Without<enemy::BrokenEnemy>)>()
        .iter(app.world())
        .collect();
    for enemy in enemies {
        app.world_mut().send_event(TargetAssigned {
            enemy,
            target: Some(player),
        });
    }

    app.insert_resource(ScriptedPlayer(player)).add_systems(
        RunFixedMainLoop,
        (drive_player, proximity_contacts).chain().in_set(UpdatePhase::Input),
    );
    app.add_systems(Last, track_stats);

    for tick in 0..TICKS {
        app.update();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let alive = world.query::<&EnemyCharacter>().iter(world).count();
            let hp = world
                .get::<PlayerCharacter>(player)
                .map(|p| p.status().current_hp())
                .unwrap_or_default();
            let stats = world.resource::<DemoStats>();
            log(&format!(
                "Tick {}: enemies={} player_hp={} score={} broken_walls={}",
                tick, alive, hp, stats.score, stats.broken_walls
            ));
        }
    }

    println!("Simulation complete!");
}
