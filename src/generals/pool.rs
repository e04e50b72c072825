//! Tier-weighted draw over a faction's unhired names

use ahash::AHashSet;
use rand::Rng;

use crate::core::config::NameEntry;
use crate::generals::general::{Tier, TierTable};

/// Names not yet hired, in pool order
pub fn remaining<'a>(pool: &'a [NameEntry], hired: &AHashSet<String>) -> Vec<&'a NameEntry> {
    pool.iter().filter(|e| !hired.contains(&e.name)).collect()
}

/// Draw one unhired name
///
/// A tier is picked with probability proportional to its weight among the
/// tiers that still have names left, then a name uniformly within it.
/// If only zero-weight tiers remain the draw is uniform over what is left.
pub fn draw_name<'a, R: Rng + ?Sized>(
    pool: &'a [NameEntry],
    hired: &AHashSet<String>,
    weights: &TierTable<f64>,
    rng: &mut R,
) -> Option<&'a NameEntry> {
    let left = remaining(pool, hired);
    if left.is_empty() {
        return None;
    }

    let by_tier: Vec<(Tier, Vec<&NameEntry>)> = Tier::ALL
        .iter()
        .map(|&tier| (tier, left.iter().copied().filter(|e| e.tier == tier).collect::<Vec<_>>()))
        .filter(|(_, names)| !names.is_empty())
        .collect();

    let total: f64 = by_tier.iter().map(|(tier, _)| weights.get(*tier).max(0.0)).sum();
    if total <= 0.0 {
        return Some(left[rng.gen_range(0..left.len())]);
    }

    let mut roll = rng.gen::<f64>() * total;
    for (tier, names) in &by_tier {
        let mass = weights.get(*tier).max(0.0);
        if roll < mass {
            return Some(names[rng.gen_range(0..names.len())]);
        }
        roll -= mass;
    }

    // Float slack at the top of the range lands on the last non-empty tier
    let (_, names) = by_tier.iter().rev().find(|(tier, _)| weights.get(*tier) > 0.0)?;
    Some(names[rng.gen_range(0..names.len())])
}
