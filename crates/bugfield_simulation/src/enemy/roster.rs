//! EnemyRoster: враги, участвующие в текущем бою
//!
//! Используется для auto-turn игрока, сброса целей при смерти игрока
//! и массового уничтожения при разрушении bug field.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Default)]
pub struct EnemyRoster {
    enemies: Vec<Entity>,
}

impl EnemyRoster {
    /// false — враг уже в списке
    pub fn register(&mut self, enemy: Entity) -> bool {
        if self.contains(enemy) {
            return false;
        }
        self.enemies.push(enemy);
        true
    }

    pub fn unregister(&mut self, enemy: Entity) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|e| *e != enemy);
        before != self.enemies.len()
    }

    pub fn contains(&self, enemy: Entity) -> bool {
        self.enemies.contains(&enemy)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.enemies.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    /// Ближайший враг строго ближе `max_distance`
    ///
    /// `positions` резолвит позицию (None — враг исчез, пропускаем).
    /// При равной дистанции выигрывает зарегистрированный раньше.
    pub fn nearest(
        &self,
        from: Vec3,
        max_distance: f32,
        positions: impl Fn(Entity) -> Option<Vec3>,
    ) -> Option<(Entity, Vec3)> {
        let mut best: Option<(Entity, Vec3, f32)> = None;

        for enemy in self.iter() {
            let Some(position) = positions(enemy) else {
                continue;
            };
            let distance = from.distance(position);
            if distance >= max_distance {
                continue;
            }
            if best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
                best = Some((enemy, position, distance));
            }
        }

        best.map(|(enemy, position, _)| (enemy, position))
    }
}
