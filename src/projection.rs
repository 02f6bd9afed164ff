//! Projection and lighting pipeline.
//!
//! Pure functions from model data plus clock/view values to render
//! instructions. Nothing here owns state, so identical inputs always give
//! bit-identical output.

use crate::config::LightingConfig;
use crate::frame::{rgba, Beam, GlobeGlyph, SatelliteGlyph, SatelliteSprite, TrailDot, TrailSegment};
use crate::grid::GridPoint;
use crate::math::{globe_matrix, map_clamped};
use crate::satellite::{Projected, Satellite};
use crate::trig;
use eframe::egui::{vec2, Color32};
use nalgebra::{Matrix3, Vector3};

/// Globe points behind this fraction of the radius are culled.
pub const GLOBE_CULL: f64 = -0.3;
/// Satellite points at or behind this fraction of the perspective are hidden.
pub const SATELLITE_CULL: f64 = -0.8;

pub const GLYPH_RAMP: &[char] = &[' ', '.', ',', '-', '~', ':', ';', '=', '!', '*', '#', '$', '@'];

/// Trail segments this close to the head also leave a dot.
const TRAIL_DOT_SPAN: usize = 15;
const DEPTH_RANGE: (f64, f64) = (-200.0, 200.0);
/// Status lights swap every half period, in simulation ticks.
const LIGHT_PERIOD: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Home,
    Away,
}

impl Theme {
    pub fn for_view(is_home: bool) -> Self {
        if is_home { Theme::Home } else { Theme::Away }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub land_base: [f64; 3],
    pub land_gain: [f64; 3],
    pub ocean_base: [f64; 3],
    pub ocean_gain: [f64; 3],
}

pub const HOME_PALETTE: Palette = Palette {
    land_base: [70.0, 90.0, 40.0],
    land_gain: [90.0, 110.0, 60.0],
    ocean_base: [30.0, 70.0, 120.0],
    ocean_gain: [40.0, 90.0, 135.0],
};

pub const AWAY_PALETTE: Palette = Palette {
    land_base: [90.0, 60.0, 30.0],
    land_gain: [90.0, 60.0, 40.0],
    ocean_base: [60.0, 40.0, 20.0],
    ocean_gain: [70.0, 50.0, 30.0],
};

impl Palette {
    pub fn for_theme(theme: Theme) -> &'static Palette {
        match theme {
            Theme::Home => &HOME_PALETTE,
            Theme::Away => &AWAY_PALETTE,
        }
    }

    pub fn color(&self, is_land: bool, luminance: f64, opacity: f64) -> Color32 {
        let (base, gain) = if is_land {
            (self.land_base, self.land_gain)
        } else {
            (self.ocean_base, self.ocean_gain)
        };
        let l = unit(luminance);
        rgba(
            base[0] + l * gain[0],
            base[1] + l * gain[1],
            base[2] + l * gain[2],
            255.0 * unit(opacity),
        )
    }
}

#[derive(Clone, Debug)]
pub struct Lighting {
    pub direction: Vector3<f64>,
    pub ambient: f64,
    pub texture_weight: f64,
    pub land_threshold: f64,
}

impl Lighting {
    pub fn from_config(config: &LightingConfig) -> Self {
        let [x, y, z] = config.direction;
        Self {
            direction: Vector3::new(x, y, z).normalize(),
            ambient: config.ambient,
            texture_weight: config.texture_weight,
            land_threshold: config.land_threshold,
        }
    }

    /// `ambient + (1 - ambient) * max(n·L, 0) + (texture - 0.5) * weight`, in [0, 1].
    pub fn luminance(&self, normal: &Vector3<f64>, texture: f64) -> f64 {
        let diffuse = normal.dot(&self.direction).max(0.0);
        unit(self.ambient + (1.0 - self.ambient) * diffuse + (texture - 0.5) * self.texture_weight)
    }
}

/// A grid point after rotation and lighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub luminance: f64,
    pub land: bool,
}

/// Rotates a grid point into view; `None` when it falls behind the cull plane.
pub fn shade_point(
    point: &GridPoint,
    rotation: &Matrix3<f64>,
    radius: f64,
    lighting: &Lighting,
) -> Option<ShadedPoint> {
    let p = rotation * point.position;
    if !(p.z > radius * GLOBE_CULL) {
        return None;
    }
    let n = rotation * point.normal;
    Some(ShadedPoint {
        x: p.x,
        y: p.y,
        z: p.z,
        luminance: lighting.luminance(&n, point.texture),
        land: point.is_land(lighting.land_threshold),
    })
}

pub fn glyph_for(luminance: f64) -> Option<char> {
    let idx = (unit(luminance) * (GLYPH_RAMP.len() - 1) as f64).floor() as usize;
    match GLYPH_RAMP[idx.min(GLYPH_RAMP.len() - 1)] {
        ' ' => None,
        c => Some(c),
    }
}

pub fn project_globe(
    grid: &[GridPoint],
    earth_rotation: f64,
    tilt: f64,
    radius: f64,
    lighting: &Lighting,
    theme: Theme,
    opacity: f64,
) -> Vec<GlobeGlyph> {
    let rotation = globe_matrix(earth_rotation, tilt);
    let palette = Palette::for_theme(theme);
    grid.iter()
        .filter_map(|point| shade_point(point, &rotation, radius, lighting))
        .filter_map(|s| {
            let glyph = glyph_for(s.luminance)?;
            Some(GlobeGlyph {
                offset: vec2(s.x as f32, s.y as f32),
                glyph,
                color: palette.color(s.land, s.luminance, opacity),
            })
        })
        .collect()
}

/// Perspective projection `x·P/(P+z)`; visible while `z > -0.8·P`.
pub fn project(position: &Vector3<f64>, perspective: f64) -> Projected {
    let (x, y, z) = (position.x, position.y, position.z);
    let visible = x.is_finite() && y.is_finite() && z > perspective * SATELLITE_CULL;
    let (screen_x, screen_y) = if visible {
        let k = perspective / (perspective + z);
        (x * k, y * k)
    } else {
        (0.0, 0.0)
    };
    Projected { x, y, z, screen_x, screen_y, visible }
}

pub fn depth_opacity(z: f64) -> f64 {
    map_clamped(z, DEPTH_RANGE, (0.3, 1.0), 0.1, 1.0)
}

pub fn depth_scale(z: f64) -> f64 {
    map_clamped(z, DEPTH_RANGE, (0.6, 1.4), 0.4, 1.6)
}

pub fn depth_brightness(z: f64) -> f64 {
    map_clamped(z, DEPTH_RANGE, (0.4, 1.0), 0.3, 1.0)
}

/// Fading path through the trail, oldest segment faintest.
///
/// A segment is emitted only when both of its samples are visible.
pub fn trail_segments(
    trail: &std::collections::VecDeque<Projected>,
    color: [u8; 3],
    opacity: f64,
) -> (Vec<TrailSegment>, Vec<TrailDot>) {
    let len = trail.len();
    let mut segments = Vec::with_capacity(len.saturating_sub(1));
    let mut dots = Vec::new();
    if len < 2 {
        return (segments, dots);
    }
    let [r, g, b] = color.map(f64::from);

    for i in 1..len {
        let (prev, cur) = (&trail[i - 1], &trail[i]);
        if !(prev.visible && cur.visible) {
            continue;
        }
        let age = i as f64 / len as f64;
        let alpha = age * age * depth_opacity(cur.z) * opacity;
        let shift = trig::sin(i as f64 * 0.1) * 20.0;
        let (cr, cg, cb) = (r + shift, g + shift * 0.75, b + shift * 0.5);
        let to = vec2(cur.screen_x as f32, cur.screen_y as f32);
        segments.push(TrailSegment {
            from: vec2(prev.screen_x as f32, prev.screen_y as f32),
            to,
            color: rgba(cr, cg, cb, alpha * 120.0),
        });
        if i + TRAIL_DOT_SPAN > len && alpha > 0.3 {
            dots.push(TrailDot { pos: to, color: rgba(cr, cg, cb, alpha * 80.0) });
        }
    }
    (segments, dots)
}

/// Everything drawn for one satellite this frame.
pub fn satellite_sprite<'a>(
    sat: &'a Satellite,
    at: &Projected,
    ticks: f64,
    opacity: f64,
    show_labels: bool,
) -> SatelliteSprite<'a> {
    let (trail, dots) = trail_segments(sat.trail(), sat.color, opacity);
    let mut sprite = SatelliteSprite { name: &sat.name, trail, dots, glyph: None, beam: None };
    if !at.visible {
        return sprite;
    }

    let brightness = depth_brightness(at.z);
    let [r, g, b] = sat.color.map(|c| f64::from(c) * brightness);
    let center = vec2(at.screen_x as f32, at.screen_y as f32);

    let lights = if show_labels {
        let green = ticks.rem_euclid(LIGHT_PERIOD) < LIGHT_PERIOD * 0.5;
        [
            green.then(|| rgba(0.0, 255.0 * brightness, 0.0, 255.0 * brightness * opacity)),
            (!green).then(|| rgba(255.0 * brightness, 0.0, 0.0, 255.0 * brightness * opacity)),
        ]
    } else {
        [None, None]
    };

    sprite.glyph = Some(SatelliteGlyph {
        center,
        scale: depth_scale(at.z) as f32,
        heading: (-at.screen_y).atan2(-at.screen_x) as f32,
        panel_offset: trig::sin(sat.self_rotation) as f32,
        body: rgba(r, g, b, 230.0 * opacity),
        panel: rgba(50.0 * brightness, 90.0 * brightness, 160.0 * brightness, 230.0 * opacity),
        dish: rgba(200.0 * brightness, 200.0 * brightness, 200.0 * brightness, 170.0 * opacity),
        radiator: rgba(60.0, 60.0, 60.0, 240.0 * opacity),
        label: show_labels.then(|| rgba(255.0, 255.0, 255.0, 80.0 * opacity)),
        lights,
    });

    if sat.beam.active {
        let pulse = 0.9 + 0.1 * trig::sin(ticks * 0.15);
        sprite.beam = Some(Beam {
            from: center,
            color: rgba(r, g, b, 50.0 * opacity * brightness * pulse),
            width: 2.0,
        });
    }
    sprite
}

/// Clamp to [0, 1] with NaN mapped to 0.
fn unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, SatelliteConfig};
    use crate::grid::build_grid;
    use approx::assert_abs_diff_eq;
    use std::collections::VecDeque;

    fn flat_lighting() -> Lighting {
        Lighting::from_config(&LightingConfig {
            ambient: 0.0,
            texture_weight: 0.0,
            ..LightingConfig::default()
        })
    }

    fn pole() -> GridPoint {
        GridPoint {
            position: Vector3::new(0.0, 150.0, 0.0),
            normal: Vector3::new(0.0, 1.0, 0.0),
            phi: 0.0,
            theta: 0.0,
            texture: 0.9,
        }
    }

    #[test]
    fn pole_luminance_is_clamped_dot_product() {
        let lighting = flat_lighting();
        let light: Vector3<f64> = Vector3::new(-0.4, -0.3, 0.7).normalize();
        let shaded = shade_point(&pole(), &globe_matrix(0.0, 0.0), 150.0, &lighting).unwrap();
        let expected = Vector3::new(0.0, 1.0, 0.0).dot(&light).max(0.0);
        assert_eq!(expected, 0.0);
        assert_eq!(shaded.luminance, expected);
    }

    #[test]
    fn lit_side_luminance_matches_dot_product() {
        let lighting = flat_lighting();
        let n = Vector3::new(-0.4, -0.3, 0.7).normalize();
        assert_abs_diff_eq!(lighting.luminance(&n, 0.1), 1.0, epsilon = 1e-12);
        let m = Vector3::new(0.0, 0.0, 1.0);
        assert_abs_diff_eq!(lighting.luminance(&m, 0.1), 0.7 / 0.74_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn luminance_stays_in_unit_range() {
        let lighting = Lighting::from_config(&LightingConfig {
            ambient: 0.9,
            texture_weight: 5.0,
            ..LightingConfig::default()
        });
        for p in build_grid(150.0, &GridConfig::default()) {
            let l = lighting.luminance(&p.normal, p.texture);
            assert!((0.0..=1.0).contains(&l));
        }
        let l = lighting.luminance(&Vector3::new(f64::NAN, 0.0, 0.0), f64::NAN);
        assert!((0.0..=1.0).contains(&l));
    }

    #[test]
    fn far_side_points_are_culled() {
        let grid = build_grid(150.0, &GridConfig::default());
        let lighting = Lighting::from_config(&LightingConfig::default());
        for rot in [0.0, 1.3, 4.0] {
            let m = globe_matrix(rot, (-23.5_f64).to_radians());
            for point in &grid {
                let z = (m * point.position).z;
                let shaded = shade_point(point, &m, 150.0, &lighting);
                assert_eq!(shaded.is_some(), z > 150.0 * GLOBE_CULL);
            }
        }
    }

    #[test]
    fn globe_projection_is_deterministic() {
        let grid = build_grid(150.0, &GridConfig::default());
        let lighting = Lighting::from_config(&LightingConfig::default());
        let a = project_globe(&grid, 0.37, -0.41, 150.0, &lighting, Theme::Home, 1.0);
        let b = project_globe(&grid, 0.37, -0.41, 150.0, &lighting, Theme::Home, 1.0);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn theme_changes_color_not_geometry() {
        let grid = build_grid(150.0, &GridConfig::default());
        let lighting = Lighting::from_config(&LightingConfig::default());
        let home = project_globe(&grid, 1.0, -0.41, 150.0, &lighting, Theme::Home, 1.0);
        let away = project_globe(&grid, 1.0, -0.41, 150.0, &lighting, Theme::Away, 0.4);
        assert_eq!(home.len(), away.len());
        for (h, a) in home.iter().zip(&away) {
            assert_eq!(h.offset, a.offset);
            assert_eq!(h.glyph, a.glyph);
            assert_ne!(h.color, a.color);
        }
    }

    #[test]
    fn palette_channels() {
        assert_eq!(HOME_PALETTE.color(true, 1.0, 1.0), Color32::from_rgba_unmultiplied(160, 200, 100, 255));
        assert_eq!(AWAY_PALETTE.color(false, 0.0, 0.4), Color32::from_rgba_unmultiplied(60, 40, 20, 102));
        // out-of-range luminance is clamped before the gain
        assert_eq!(HOME_PALETTE.color(false, 7.0, 2.0), HOME_PALETTE.color(false, 1.0, 1.0));
    }

    #[test]
    fn glyph_ramp_ends() {
        assert_eq!(glyph_for(0.0), None);
        assert_eq!(glyph_for(0.05), None);
        assert_eq!(glyph_for(1.0), Some('@'));
        assert_eq!(glyph_for(0.5), Some(';'));
    }

    #[test]
    fn perspective_formula() {
        let p = project(&Vector3::new(280.0, 10.0, 40.0), 800.0);
        assert!(p.visible);
        assert_abs_diff_eq!(p.screen_x, 280.0 * 800.0 / 840.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.screen_y, 10.0 * 800.0 / 840.0, epsilon = 1e-9);
    }

    #[test]
    fn satellites_behind_the_plane_are_hidden() {
        assert!(!project(&Vector3::new(0.0, 0.0, -640.0), 800.0).visible);
        assert!(project(&Vector3::new(0.0, 0.0, -639.0), 800.0).visible);
        assert!(!project(&Vector3::new(0.0, 0.0, -900.0), 800.0).visible);
    }

    fn sample(z: f64, visible: bool) -> Projected {
        Projected { x: 1.0, y: 2.0, z, screen_x: 1.0, screen_y: 2.0, visible }
    }

    #[test]
    fn trail_fades_toward_the_tail() {
        let trail: VecDeque<Projected> = (0..40).map(|_| sample(0.0, true)).collect();
        let (segments, dots) = trail_segments(&trail, [255, 140, 0], 1.0);
        assert_eq!(segments.len(), 39);
        assert!(segments.first().unwrap().color.a() < segments.last().unwrap().color.a());
        assert!(!dots.is_empty() && dots.len() < 15);
    }

    #[test]
    fn trail_skips_hidden_samples() {
        let trail: VecDeque<Projected> =
            [sample(0.0, true), sample(0.0, false), sample(0.0, false), sample(0.0, true), sample(0.0, true)]
                .into_iter()
                .collect();
        let (segments, _) = trail_segments(&trail, [255, 140, 0], 1.0);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn hidden_satellite_has_no_glyph_or_beam() {
        let cfg = SatelliteConfig::new("X", [255, 0, 0], 0.0, 280.0, 0.0, 0.0, 0.0, 10);
        let mut sat = Satellite::from_config(&cfg, 0.0);
        sat.beam.active = true;
        let hidden = sample(-900.0, false);
        let sprite = satellite_sprite(&sat, &hidden, 0.0, 1.0, true);
        assert!(sprite.glyph.is_none());
        assert!(sprite.beam.is_none());

        let shown = project(&sat.position(15.0), 800.0);
        let sprite = satellite_sprite(&sat, &shown, 0.0, 1.0, true);
        assert!(sprite.glyph.is_some());
        assert!(sprite.beam.is_some());
    }

    #[test]
    fn labels_and_lights_only_at_home() {
        let cfg = SatelliteConfig::new("X", [255, 0, 0], 0.0, 280.0, 0.0, 0.0, 0.0, 10);
        let sat = Satellite::from_config(&cfg, 0.0);
        let at = project(&sat.position(15.0), 800.0);
        let home = satellite_sprite(&sat, &at, 10.0, 1.0, true).glyph.unwrap();
        assert!(home.label.is_some());
        assert!(home.lights[0].is_some() && home.lights[1].is_none());
        let later = satellite_sprite(&sat, &at, 40.0, 1.0, true).glyph.unwrap();
        assert!(later.lights[0].is_none() && later.lights[1].is_some());
        let away = satellite_sprite(&sat, &at, 10.0, 0.4, false).glyph.unwrap();
        assert!(away.label.is_none() && away.lights == [None, None]);
    }

    #[test]
    fn lights_follow_simulation_time() {
        let cfg = SatelliteConfig::new("X", [255, 0, 0], 0.0, 280.0, 0.0, 0.0, 0.0, 10);
        let sat = Satellite::from_config(&cfg, 0.0);
        let at = project(&sat.position(15.0), 800.0);
        let lights = |ticks: f64| satellite_sprite(&sat, &at, ticks, 1.0, true).glyph.unwrap().lights;
        assert!(lights(29.9)[0].is_some());
        assert!(lights(30.0)[1].is_some());
        assert!(lights(59.9)[1].is_some());
        assert!(lights(60.0)[0].is_some());
        assert!(lights(90.5)[1].is_some());
    }
}
