//! Damage magnitude
//!
//! Игрок: `round_half_even(base × U[min, max] × step_multiplier)`,
//! где step_multiplier = combo_multipliers[combo] или skill_multiplier.
//! Враги, мячи и bug field бьют фиксированными значениями.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Шаг атаки игрока, которым нанесён удар
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStep {
    Combo(usize),
    Skill,
}

/// Таблица множителей урона игрока (конфиг, не логика)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageTuning {
    pub random_min: f32,
    pub random_max: f32,
    pub combo_multipliers: Vec<f32>,
    pub skill_multiplier: f32,
}

impl Default for DamageTuning {
    fn default() -> Self {
        Self {
            random_min: 0.8,
            random_max: 1.2,
            combo_multipliers: vec![1.0, 1.3, 1.7],
            skill_multiplier: 2.0,
        }
    }
}

impl DamageTuning {
    pub fn step_multiplier(&self, step: AttackStep) -> f32 {
        match step {
            AttackStep::Skill => self.skill_multiplier,
            AttackStep::Combo(index) => match self.combo_multipliers.get(index) {
                Some(multiplier) => *multiplier,
                None => {
                    // Комбо длиннее таблицы → последний множитель
                    crate::logger::log_warning(&format!(
                        "DamageTuning: combo step {} out of table (len {})",
                        index,
                        self.combo_multipliers.len()
                    ));
                    self.combo_multipliers.last().copied().unwrap_or(1.0)
                }
            },
        }
    }

    /// Случайный множитель U[min, max] (включительно)
    pub fn roll<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.random_max <= self.random_min {
            return self.random_min;
        }
        rng.gen_range(self.random_min..=self.random_max)
    }
}

/// Урон удара игрока при заданном случайном множителе
///
/// Округление half-to-even (1.5 → 2, 2.5 → 2): воспроизводимо в тестах.
pub fn player_hit_damage(base_attack: i32, roll: f32, step: AttackStep, tuning: &DamageTuning) -> i32 {
    let raw = base_attack as f32 * roll * tuning.step_multiplier(step);
    raw.round_ties_even() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_combo_multipliers() {
        let tuning = DamageTuning::default();

        assert_eq!(player_hit_damage(10, 1.0, AttackStep::Combo(0), &tuning), 10);
        assert_eq!(player_hit_damage(10, 1.0, AttackStep::Combo(1), &tuning), 13);
        assert_eq!(player_hit_damage(10, 1.0, AttackStep::Combo(2), &tuning), 17);
        assert_eq!(player_hit_damage(10, 1.0, AttackStep::Skill, &tuning), 20);
    }

    #[test]
    fn test_rounding_half_to_even() {
        let tuning = DamageTuning::default();

        // 5 × 0.5 = 2.5 → 2, 3 × 0.5 = 1.5 → 2
        assert_eq!(player_hit_damage(5, 0.5, AttackStep::Combo(0), &tuning), 2);
        assert_eq!(player_hit_damage(3, 0.5, AttackStep::Combo(0), &tuning), 2);
        assert_eq!(player_hit_damage(7, 0.5, AttackStep::Combo(0), &tuning), 4);
    }

    #[test]
    fn test_combo_out_of_table_uses_last() {
        let tuning = DamageTuning::default();
        assert_eq!(tuning.step_multiplier(AttackStep::Combo(9)), 1.7);
    }

    #[test]
    fn test_roll_within_range_and_deterministic() {
        let tuning = DamageTuning::default();
        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..100 {
            let a = tuning.roll(&mut rng_a);
            let b = tuning.roll(&mut rng_b);
            assert!((0.8..=1.2).contains(&a), "roll = {}", a);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let tuning = DamageTuning {
            random_min: 1.0,
            random_max: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(tuning.roll(&mut rng), 1.0);
    }
}
