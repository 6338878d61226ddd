use crate::types::Role;
use rand::Rng;

/// Deal a fresh role assignment: a permutation of the four roles drawn
/// uniformly from all 24, one role per seat.
///
/// Fisher–Yates over the fixed role set; every call consumes fresh entropy.
pub fn deal() -> [Role; 4] {
    let mut deck = Role::ALL;
    let mut rng = rand::rng();
    for i in (1..deck.len()).rev() {
        let j = rng.random_range(0..=i);
        deck.swap(i, j);
    }
    deck
}
