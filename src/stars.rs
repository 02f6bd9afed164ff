//! Twinkling background stars.

use crate::config::StarConfig;
use crate::frame::{rgba, StarSprite};
use crate::trig;
use eframe::egui::vec2;
use rand::Rng;
use std::f64::consts::TAU;

#[derive(Clone, Debug)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub brightness: f64,
    pub twinkle_speed: f64,
    pub twinkle_phase: f64,
    /// Brightness as of the last refresh.
    pub current: f64,
}

impl Star {
    /// Base brightness scaled by `0.4 + 0.6·(0.5 + 0.5·sin(ticks·speed + phase))`.
    pub fn twinkle(&self, ticks: f64) -> f64 {
        let wave = 0.5 + 0.5 * trig::sin(ticks * self.twinkle_speed + self.twinkle_phase);
        self.brightness * (0.4 + 0.6 * wave)
    }

    pub fn sprite(&self, opacity: f64) -> StarSprite {
        StarSprite {
            pos: vec2(self.x as f32, self.y as f32),
            radius: (self.size * 0.5) as f32,
            color: rgba(255.0, 255.0, 255.0, self.current * 80.0 * opacity),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    pub fn new(config: &StarConfig, width: f64, height: f64, rng: &mut impl Rng) -> Self {
        let stars = (0..config.count)
            .map(|_| {
                let brightness = uniform(rng, config.brightness_range);
                Star {
                    x: uniform(rng, [0.0, width]),
                    y: uniform(rng, [0.0, height]),
                    size: uniform(rng, config.size_range),
                    brightness,
                    twinkle_speed: uniform(rng, config.twinkle_speed_range),
                    twinkle_phase: uniform(rng, [0.0, TAU]),
                    current: brightness,
                }
            })
            .collect();
        Self { stars }
    }

    pub fn refresh(&mut self, ticks: f64) {
        for star in &mut self.stars {
            star.current = star.twinkle(ticks);
        }
    }

    /// Moves stars that fell outside a shrunken viewport back inside it.
    /// Returns how many were moved.
    pub fn relocate(&mut self, width: f64, height: f64, rng: &mut impl Rng) -> usize {
        let mut moved = 0;
        for star in &mut self.stars {
            let mut hit = false;
            if star.x >= width {
                star.x = uniform(rng, [0.0, width]);
                hit = true;
            }
            if star.y >= height {
                star.y = uniform(rng, [0.0, height]);
                hit = true;
            }
            moved += usize::from(hit);
        }
        moved
    }

    pub fn sprites(&self, opacity: f64) -> Vec<StarSprite> {
        self.stars.iter().map(|s| s.sprite(opacity)).collect()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }
}

/// Uniform in `[lo, hi)`; collapses to `lo` for an empty range.
pub(crate) fn uniform(rng: &mut impl Rng, [lo, hi]: [f64; 2]) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}
