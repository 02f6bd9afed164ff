//! Precomputed sine/cosine lookup for the per-frame hot path.
//!
//! Angles are quantized to 3600 steps per turn. Setup code that runs once
//! (grid construction, config sanitizing) uses exact `f64::sin`/`cos`.

use std::f64::consts::TAU;
use std::sync::LazyLock;

pub const TABLE_SIZE: usize = 3600;

const STEP: f64 = TAU / TABLE_SIZE as f64;

pub struct TrigTable {
    sin: Box<[f64]>,
    cos: Box<[f64]>,
}

static TABLE: LazyLock<TrigTable> = LazyLock::new(TrigTable::new);

impl TrigTable {
    fn new() -> Self {
        let (sin, cos): (Vec<f64>, Vec<f64>) = (0..TABLE_SIZE)
            .map(|i| {
                let a = i as f64 * STEP;
                (a.sin(), a.cos())
            })
            .unzip();
        Self {
            sin: sin.into_boxed_slice(),
            cos: cos.into_boxed_slice(),
        }
    }

    #[inline]
    fn index(angle: f64) -> usize {
        if !angle.is_finite() {
            return 0;
        }
        let turns = angle.rem_euclid(TAU) / STEP;
        (turns.round() as usize) % TABLE_SIZE
    }
}

/// Table sine. Non-finite angles read as 0.
#[inline]
pub fn sin(angle: f64) -> f64 {
    TABLE.sin[TrigTable::index(angle)]
}

/// Table cosine. Non-finite angles read as 0.
#[inline]
pub fn cos(angle: f64) -> f64 {
    TABLE.cos[TrigTable::index(angle)]
}

#[inline]
pub fn sin_cos(angle: f64) -> (f64, f64) {
    let i = TrigTable::index(angle);
    (TABLE.sin[i], TABLE.cos[i])
}
