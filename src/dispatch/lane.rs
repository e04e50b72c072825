//! Unit position as a pure function of time
//!
//! Rendering and collision testing both call `position_at`, so what is
//! drawn is exactly what collides.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::types::{Millis, Vec2};

/// Cosmetic lateral offsets of one unit's path
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneParams {
    /// Peak sideways arc at mid-path
    pub offset: f64,
    /// Amplitude of an S-shaped weave
    pub bow: f64,
}

impl LaneParams {
    pub fn random<R: Rng + ?Sized>(width: f64, bow: f64, rng: &mut R) -> Self {
        Self {
            offset: symmetric(width, rng),
            bow: symmetric(bow, rng),
        }
    }
}

fn symmetric<R: Rng + ?Sized>(half_width: f64, rng: &mut R) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..=half_width)
    } else {
        0.0
    }
}

/// Fraction of the trip covered at `now`, clamped to [0, 1]
pub fn progress(spawn: Millis, duration: Millis, now: Millis) -> f64 {
    if now <= spawn {
        return 0.0;
    }
    if duration == 0 {
        return 1.0;
    }
    ((now - spawn) as f64 / duration as f64).min(1.0)
}

/// Position of a unit at `now`
///
/// Starts exactly at `from`, ends exactly at `to`; lane offsets vanish at
/// both endpoints.
pub fn position_at(from: Vec2, to: Vec2, spawn: Millis, duration: Millis, now: Millis, lane: &LaneParams) -> Vec2 {
    let t = progress(spawn, duration, now);
    let base = from.lerp(&to, t);
    let side = (to - from).perpendicular();
    let lateral = lane.offset * (PI * t).sin() + 0.5 * lane.bow * (2.0 * PI * t).sin();
    base + side * lateral
}
