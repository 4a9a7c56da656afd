//! Knockback application: KnockbackRequested → `KnockbackReceiver::apply_knockback`

use bevy::prelude::*;

use super::reaction::KnockbackReceiver;
use super::{EnemyBody, PlayerBody};
use crate::components::CharacterBody;
use crate::enemy::EnemyCharacter;
use crate::events::KnockbackRequested;
use crate::player::PlayerCharacter;

/// Система (Reactions): применить запросы нокбэка
///
/// Повторный нокбэк в том же кадре перезапускает Damaged (last writer wins).
pub fn apply_knockback_requests(
    mut requests: EventReader<KnockbackRequested>,
    mut players: Query<PlayerBody, Without<EnemyCharacter>>,
    mut enemies: Query<EnemyBody, Without<PlayerCharacter>>,
) {
    for event in requests.read() {
        let accepted = if let Ok((mut player, mut transform, mut velocity, mut mode)) = players.get_mut(event.target) {
            let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, None);
            player.apply_knockback(&event.request, &mut body)
        } else if let Ok((mut enemy, mut transform, mut velocity, mut mode, nav)) = enemies.get_mut(event.target) {
            let mut body = CharacterBody::new(&mut transform, &mut velocity, &mut mode, nav.map(|n| n.into_inner()));
            enemy.apply_knockback(&event.request, &mut body)
        } else {
            crate::logger::log_warning(&format!("Knockback: {:?} is not a character", event.target));
            continue;
        };

        if !accepted {
            crate::logger::log(&format!(
                "Knockback {:?} on {:?} refused (terminal/down)",
                event.request.kind, event.target
            ));
        }
    }
}
