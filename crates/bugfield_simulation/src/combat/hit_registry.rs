//! Hit registry: кого уже ударила текущая активация attack volume
//!
//! Инвариант: цель встречается не больше одного раза за активацию.
//! Очищается ровно при переходе volume disabled → enabled.

use bevy::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitRegistry {
    // Vec вместо HashSet: за один взмах бьём единицы целей, порядок детерминирован
    struck: Vec<Entity>,
}

impl HitRegistry {
    pub fn contains(&self, target: Entity) -> bool {
        self.struck.contains(&target)
    }

    /// Записать цель. false — уже была в этой активации.
    pub fn register(&mut self, target: Entity) -> bool {
        if self.contains(target) {
            return false;
        }
        self.struck.push(target);
        true
    }

    pub fn clear(&mut self) {
        self.struck.clear();
    }

    pub fn len(&self) -> usize {
        self.struck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.struck.is_empty()
    }
}

/// Режим attack volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum VolumeMode {
    #[default]
    Disabled,
    /// Обычный удар (комбо игрока / рывок врага)
    Strike,
    /// Skill игрока (множитель skill вместо combo)
    Skill,
    /// Враг-"мяч" после smash
    Ball,
}

/// Attack volume персонажа + его hit registry
///
/// Геометрию держит физика (sensor collider), здесь только enable-флаг и bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AttackVolume {
    mode: VolumeMode,
    registry: HitRegistry,
    activations: u32,
}

impl AttackVolume {
    /// Новая активация: disable → clear → enable
    pub fn enable(&mut self, mode: VolumeMode) {
        if mode == VolumeMode::Disabled {
            self.disable();
            return;
        }
        self.disable();
        self.registry.clear();
        self.mode = mode;
        self.activations = self.activations.wrapping_add(1);
    }

    pub fn disable(&mut self) {
        self.mode = VolumeMode::Disabled;
    }

    /// Disable + явная очистка (вход в шаг комбо)
    pub fn reset(&mut self) {
        self.disable();
        self.registry.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != VolumeMode::Disabled
    }

    pub fn mode(&self) -> VolumeMode {
        self.mode
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub fn registry(&self) -> &HitRegistry {
        &self.registry
    }

    /// Контакт от физики: false если volume выключен или цель уже ударена
    pub fn register_hit(&mut self, target: Entity) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.registry.register(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = HitRegistry::default();

        assert!(registry.register(entity(1)));
        assert!(!registry.register(entity(1)));
        assert!(registry.register(entity(2)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_volume_disabled_ignores_contacts() {
        let mut volume = AttackVolume::default();
        assert!(!volume.register_hit(entity(1)));
        assert!(volume.registry().is_empty());
    }

    #[test]
    fn test_reenable_clears_registry() {
        let mut volume = AttackVolume::default();
        volume.enable(VolumeMode::Strike);

        assert!(volume.register_hit(entity(3)));
        assert!(!volume.register_hit(entity(3)));

        // disable НЕ чистит registry
        volume.disable();
        assert!(volume.registry().contains(entity(3)));

        volume.enable(VolumeMode::Strike);
        assert!(volume.register_hit(entity(3)));
        assert_eq!(volume.activations(), 2);
    }

    #[test]
    fn test_reset_clears_and_disables() {
        let mut volume = AttackVolume::default();
        volume.enable(VolumeMode::Skill);
        volume.register_hit(entity(5));

        volume.reset();

        assert!(!volume.is_enabled());
        assert!(volume.registry().is_empty());
    }
}
