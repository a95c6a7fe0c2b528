//! Deterministic melee arithmetic

use crate::domain::value_objects::Attributes;

/// Flat damage bonus for attacking with a carried weapon
pub const WEAPON_BONUS: i64 = 2;

/// Result of one exchange, applied to both combatants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub damage: i64,
    pub attacker: Attributes,
    pub defender: Attributes,
}

/// Resolve a single attack
///
/// attack = strength / 2 (+ weapon bonus), defence = dexterity / 4, at
/// least one point of damage lands. An exhausted attacker (no fatigue left)
/// deals half damage. Each attack costs the attacker one point of fatigue.
pub fn resolve_attack(attacker: Attributes, defender: Attributes, armed: bool) -> AttackOutcome {
    let weapon_bonus = if armed { WEAPON_BONUS } else { 0 };
    let attack = attacker.strength / 2 + weapon_bonus;
    let defence = defender.dexterity / 4;

    let mut damage = (attack - defence).max(1);
    if attacker.fatigue <= 0 {
        damage = (damage / 2).max(1);
    }

    let mut defender_after = defender;
    defender_after.health = (defender.health - damage).max(0);

    let mut attacker_after = attacker;
    attacker_after.fatigue = (attacker.fatigue - 1).max(0);

    AttackOutcome {
        damage,
        attacker: attacker_after,
        defender: defender_after,
    }
}
