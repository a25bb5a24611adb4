//! Plate calculator.

use crate::{Error, Result};
use std::fmt;

/// Float noise below this is treated as zero (smallest plate is 1.25)
const EPSILON: f64 = 1e-6;

/// Plates to load on each side of the bar for a target total weight
#[derive(Clone, Debug, PartialEq)]
pub struct PlateLoad {
    pub bar_weight: f64,
    /// Largest first
    pub per_side: Vec<f64>,
    /// Weight per side that the available plates could not make up
    pub remainder: f64,
}

impl PlateLoad {
    /// Total weight actually loaded, bar included
    pub fn loaded_total(&self) -> f64 {
        self.bar_weight + 2.0 * self.per_side.iter().sum::<f64>()
    }

    pub fn is_exact(&self) -> bool {
        self.remainder < EPSILON
    }
}

impl fmt::Display for PlateLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.per_side.is_empty() {
            return f.write_str("No plates needed");
        }
        let plates: Vec<String> = self.per_side.iter().map(|p| format!("{}lb", p)).collect();
        f.write_str(&plates.join(", "))
    }
}

/// Heaviest total the calculator will plan for
pub const MAX_TARGET: f64 = 2000.0;

/// Greedy per-side plate breakdown, heaviest plates first.
///
/// A target at or below the bar needs no plates. Targets that are not
/// finite or exceed [`MAX_TARGET`] are rejected.
pub fn plates_per_side(
    target_total: f64,
    bar_weight: f64,
    available: &[f64],
) -> Result<PlateLoad> {
    if !target_total.is_finite() || target_total > MAX_TARGET {
        return Err(Error::Other(format!(
            "Target weight must be a number up to {}, got {}",
            MAX_TARGET, target_total
        )));
    }
    if !bar_weight.is_finite() || bar_weight < 0.0 {
        return Err(Error::Other(format!("Invalid bar weight {}", bar_weight)));
    }

    let mut plates: Vec<f64> = available
        .iter()
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    plates.sort_by(|a, b| b.total_cmp(a));

    let mut remaining = (target_total - bar_weight).max(0.0) / 2.0;
    let mut per_side = Vec::new();

    for plate in plates {
        let count = ((remaining + EPSILON) / plate).floor() as usize;
        per_side.extend(std::iter::repeat(plate).take(count));
        remaining -= count as f64 * plate;
    }

    let remainder = if remaining < EPSILON { 0.0 } else { remaining };
    if remainder > 0.0 {
        tracing::debug!(
            "{} cannot be loaded exactly, {} per side left over",
            target_total,
            remainder
        );
    }

    Ok(PlateLoad {
        bar_weight,
        per_side,
        remainder,
    })
}
