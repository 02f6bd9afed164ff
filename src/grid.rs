//! Sphere sample points for the ASCII globe.
//!
//! Built once at mount and never mutated. Each point carries a texture value
//! that depends only on its (phi, theta), so land and ocean stay put across
//! frames and resizes; only the rotated copies change per frame.

use crate::config::GridConfig;
use nalgebra::Vector3;
use std::f64::consts::{PI, TAU};
use std::sync::LazyLock;

#[derive(Clone, Debug)]
pub struct GridPoint {
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub phi: f64,
    pub theta: f64,
    /// Procedural surface value in [0, 1].
    pub texture: f64,
}

impl GridPoint {
    pub fn is_land(&self, threshold: f64) -> bool {
        self.texture > threshold
    }
}

pub fn build_grid(radius: f64, config: &GridConfig) -> Vec<GridPoint> {
    let thetas = steps(PI, config.theta_step);
    let phis = steps(TAU, config.phi_step);

    let mut points = Vec::with_capacity(thetas.len() * phis.len());
    for &theta in &thetas {
        let (sin_t, cos_t) = theta.sin_cos();
        for &phi in &phis {
            let (sin_p, cos_p) = phi.sin_cos();
            let normal = Vector3::new(sin_t * cos_p, cos_t, sin_t * sin_p);
            points.push(GridPoint {
                position: normal * radius,
                normal,
                phi,
                theta,
                texture: surface_texture(phi, theta),
            });
        }
    }
    points
}

/// `0, step, 2*step, ...` strictly below `end`.
fn steps(end: f64, step: f64) -> Vec<f64> {
    (0..)
        .map(|i| i as f64 * step)
        .take_while(|v| *v < end)
        .collect()
}

const OCTAVES: usize = 4;
const FALLOFF: f64 = 0.5;

/// Multi-octave gradient noise sampled at `(2*phi, 2*theta)`, in [0, 1].
pub fn surface_texture(phi: f64, theta: f64) -> f64 {
    let (x, y) = (phi * 2.0, theta * 2.0);
    let mut sum = 0.0;
    let mut amp = FALLOFF;
    let mut norm = 0.0;
    let mut freq = 1.0;
    for _ in 0..OCTAVES {
        sum += amp * gradient_noise(x * freq, y * freq);
        norm += amp;
        amp *= FALLOFF;
        freq *= 2.0;
    }
    ((sum / norm) * 0.5 + 0.5).clamp(0.0, 1.0)
}

static PERM: LazyLock<[u8; 512]> = LazyLock::new(|| {
    let mut perm = [0u8; 512];
    for (i, p) in perm.iter_mut().take(256).enumerate() {
        *p = i as u8;
    }
    let mut state: u32 = 0x2545_f491;
    for i in (1..256).rev() {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let j = (state % (i as u32 + 1)) as usize;
        perm.swap(i, j);
    }
    for i in 0..256 {
        perm[i + 256] = perm[i];
    }
    perm
});

#[inline]
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    let h = hash & 7;
    let (u, v) = if h < 4 { (x, y) } else { (y, x) };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Roughly in [-1, 1]; the final remap clamps the rare overshoot.
fn gradient_noise(x: f64, y: f64) -> f64 {
    let perm = &*PERM;
    let xi = x.floor();
    let yi = y.floor();
    let xf = x - xi;
    let yf = y - yi;
    let u = xf * xf * (3.0 - 2.0 * xf);
    let v = yf * yf * (3.0 - 2.0 * yf);

    let x0 = (xi as i64 & 255) as usize;
    let y0 = (yi as i64 & 255) as usize;
    let x1 = (x0 + 1) & 255;
    let y1 = (y0 + 1) & 255;

    let aa = perm[perm[x0] as usize + y0];
    let ab = perm[perm[x0] as usize + y1];
    let ba = perm[perm[x1] as usize + y0];
    let bb = perm[perm[x1] as usize + y1];

    let g00 = grad(aa, xf, yf);
    let g10 = grad(ba, xf - 1.0, yf);
    let g01 = grad(ab, xf, yf - 1.0);
    let g11 = grad(bb, xf - 1.0, yf - 1.0);

    let top = g00 + u * (g10 - g00);
    let bottom = g01 + u * (g11 - g01);
    top + v * (bottom - top)
}
