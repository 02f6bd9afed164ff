//! Engine configuration: geometry, lighting, cadences and the satellite roster.
//!
//! Every field has a default so a host can ship a partial JSON file. Values
//! that cannot be used as-is are repaired by [`EngineConfig::validate`];
//! only the ones with no sensible repair are rejected.

use crate::error::BackdropError;
use serde::Deserialize;
use std::f64::consts::PI;

/// Longest trail a satellite may keep.
pub const MAX_TRAIL_LENGTH: usize = 4096;
pub const MAX_STARS: usize = 4000;
/// Smallest grid step; anything finer is raised to this.
pub const MIN_GRID_STEP: f64 = 0.02;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub theta_step: f64,
    pub phi_step: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            theta_step: 0.175,
            phi_step: 0.15,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Light direction, normalized on validate.
    pub direction: [f64; 3],
    /// Luminance floor so the unlit side keeps a faint glyph.
    pub ambient: f64,
    /// Weight of the procedural texture term added to luminance.
    pub texture_weight: f64,
    pub land_threshold: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: [-0.4, -0.3, 0.7],
            ambient: 0.35,
            texture_weight: 0.25,
            land_threshold: 0.53,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub count: usize,
    pub size_range: [f64; 2],
    pub brightness_range: [f64; 2],
    pub twinkle_speed_range: [f64; 2],
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: 100,
            size_range: [2.0, 4.0],
            brightness_range: [0.6, 1.0],
            twinkle_speed_range: [0.0008, 0.002],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Frames between star brightness refreshes.
    pub star_refresh_every: u64,
    /// Simulation ticks between trail samples.
    pub trail_sample_every: f64,
    /// Simulation ticks between beam scheduling passes.
    pub beam_check_every: f64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            star_refresh_every: 8,
            trail_sample_every: 1.0,
            beam_check_every: 30.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    /// Beam passes a beam survives before switching off.
    pub duration_checks: u32,
    pub first_delay: [f64; 2],
    pub interval: [f64; 2],
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            duration_checks: 10,
            first_delay: [90.0, 250.0],
            interval: [100.0, 200.0],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub home_opacity: f64,
    pub away_opacity: f64,
    pub home_offset_fraction: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            home_opacity: 1.0,
            away_opacity: 0.4,
            home_offset_fraction: 0.25,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SatelliteConfig {
    pub name: String,
    pub color: [u8; 3],
    #[serde(default)]
    pub angle: f64,
    pub radius: f64,
    pub speed: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    #[serde(default)]
    pub ascending: f64,
    pub trail_length: usize,
}

impl SatelliteConfig {
    pub fn new(
        name: &str,
        color: [u8; 3],
        angle: f64,
        radius: f64,
        speed: f64,
        inclination_deg: f64,
        ascending: f64,
        trail_length: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            color,
            angle,
            radius,
            speed,
            inclination_deg,
            ascending,
            trail_length,
        }
    }
}

pub fn default_satellites() -> Vec<SatelliteConfig> {
    vec![
        SatelliteConfig::new("QUANTUM", [255, 140, 0], 0.0, 280.0, 0.008, 15.0, 0.0, 800),
        SatelliteConfig::new("SPACE", [255, 165, 0], PI, 350.0, 0.006, -25.0, PI / 3.0, 750),
        SatelliteConfig::new("CYBER-SEC", [255, 100, 0], PI / 2.0, 420.0, 0.005, 35.0, PI / 2.0, 700),
        SatelliteConfig::new("SECURE-NET", [255, 180, 50], 3.0 * PI / 2.0, 320.0, 0.007, -18.0, PI / 6.0, 850),
    ]
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub perspective: f64,
    pub earth_radius: f64,
    pub axial_tilt_deg: f64,
    /// Earth rotation per reference tick (1/60 s).
    pub spin_per_tick: f64,
    pub self_rotation_per_tick: f64,
    /// Amplitude of the out-of-plane oscillation added to satellite z.
    pub wobble: f64,
    /// Longest wall-clock gap integrated in one tick.
    pub max_frame_seconds: f64,
    pub grid: GridConfig,
    pub lighting: LightingConfig,
    pub stars: StarConfig,
    pub cadence: CadenceConfig,
    pub beams: BeamConfig,
    pub view: ViewConfig,
    pub satellites: Vec<SatelliteConfig>,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            perspective: 800.0,
            earth_radius: 150.0,
            axial_tilt_deg: -23.5,
            spin_per_tick: 0.004,
            self_rotation_per_tick: 0.015,
            wobble: 15.0,
            max_frame_seconds: 0.25,
            grid: GridConfig::default(),
            lighting: LightingConfig::default(),
            stars: StarConfig::default(),
            cadence: CadenceConfig::default(),
            beams: BeamConfig::default(),
            view: ViewConfig::default(),
            satellites: default_satellites(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, BackdropError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()
    }

    /// Repairs out-of-range values and rejects the ones that cannot be repaired.
    pub fn validate(mut self) -> Result<Self, BackdropError> {
        if !(self.perspective.is_finite() && self.perspective > 0.0) {
            return Err(BackdropError::InvalidConfig(format!(
                "perspective must be positive, got {}",
                self.perspective
            )));
        }
        if !(self.earth_radius.is_finite() && self.earth_radius > 0.0) {
            return Err(BackdropError::InvalidConfig(format!(
                "earth radius must be positive, got {}",
                self.earth_radius
            )));
        }

        let defaults = EngineConfig::default();
        self.axial_tilt_deg = finite_or("axial_tilt_deg", self.axial_tilt_deg, defaults.axial_tilt_deg);
        self.spin_per_tick = finite_or("spin_per_tick", self.spin_per_tick, defaults.spin_per_tick);
        self.self_rotation_per_tick =
            finite_or("self_rotation_per_tick", self.self_rotation_per_tick, defaults.self_rotation_per_tick);
        self.wobble = finite_or("wobble", self.wobble, defaults.wobble);
        self.max_frame_seconds = positive_or("max_frame_seconds", self.max_frame_seconds, defaults.max_frame_seconds);

        let grid = GridConfig::default();
        self.grid.theta_step = positive_or("grid.theta_step", self.grid.theta_step, grid.theta_step);
        self.grid.phi_step = positive_or("grid.phi_step", self.grid.phi_step, grid.phi_step);
        for (field, step) in [("grid.theta_step", &mut self.grid.theta_step), ("grid.phi_step", &mut self.grid.phi_step)] {
            if *step < MIN_GRID_STEP {
                log::warn!("{} {} is too fine, using {}", field, step, MIN_GRID_STEP);
                *step = MIN_GRID_STEP;
            }
        }

        let lighting = LightingConfig::default();
        let [x, y, z] = self.lighting.direction;
        let len = (x * x + y * y + z * z).sqrt();
        if !(len.is_finite() && len > 1e-9) {
            log::warn!("lighting.direction {:?} is degenerate, using default", self.lighting.direction);
            self.lighting.direction = lighting.direction;
        }
        self.lighting.ambient = finite_or("lighting.ambient", self.lighting.ambient, lighting.ambient).clamp(0.0, 1.0);
        self.lighting.texture_weight =
            finite_or("lighting.texture_weight", self.lighting.texture_weight, lighting.texture_weight);
        self.lighting.land_threshold =
            finite_or("lighting.land_threshold", self.lighting.land_threshold, lighting.land_threshold);

        let stars = StarConfig::default();
        if self.stars.count > MAX_STARS {
            log::warn!("stars.count {} exceeds {}, clamping", self.stars.count, MAX_STARS);
            self.stars.count = MAX_STARS;
        }
        self.stars.size_range = range_or("stars.size_range", self.stars.size_range, stars.size_range);
        self.stars.brightness_range =
            range_or("stars.brightness_range", self.stars.brightness_range, stars.brightness_range);
        self.stars.twinkle_speed_range =
            range_or("stars.twinkle_speed_range", self.stars.twinkle_speed_range, stars.twinkle_speed_range);

        self.cadence.star_refresh_every = self.cadence.star_refresh_every.max(1);
        self.cadence.trail_sample_every = positive_or(
            "cadence.trail_sample_every",
            self.cadence.trail_sample_every,
            CadenceConfig::default().trail_sample_every,
        );
        self.cadence.beam_check_every = positive_or(
            "cadence.beam_check_every",
            self.cadence.beam_check_every,
            CadenceConfig::default().beam_check_every,
        );

        let beams = BeamConfig::default();
        self.beams.first_delay = range_or("beams.first_delay", self.beams.first_delay, beams.first_delay);
        self.beams.interval = range_or("beams.interval", self.beams.interval, beams.interval);

        let view = ViewConfig::default();
        self.view.home_opacity = finite_or("view.home_opacity", self.view.home_opacity, view.home_opacity).clamp(0.0, 1.0);
        self.view.away_opacity = finite_or("view.away_opacity", self.view.away_opacity, view.away_opacity).clamp(0.0, 1.0);
        self.view.home_offset_fraction =
            finite_or("view.home_offset_fraction", self.view.home_offset_fraction, view.home_offset_fraction);

        for sat in &mut self.satellites {
            if sat.trail_length > MAX_TRAIL_LENGTH {
                log::warn!(
                    "satellite {}: trail_length {} exceeds {}, clamping",
                    sat.name,
                    sat.trail_length,
                    MAX_TRAIL_LENGTH
                );
                sat.trail_length = MAX_TRAIL_LENGTH;
            }
        }

        Ok(self)
    }
}

pub(crate) fn finite_or(field: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::warn!("{} is not finite ({}), using {}", field, value, default);
        default
    }
}

pub(crate) fn positive_or(field: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("{} must be positive ({}), using {}", field, value, default);
        default
    }
}

/// Ordered, finite, non-negative `[low, high]`.
fn range_or(field: &str, range: [f64; 2], default: [f64; 2]) -> [f64; 2] {
    let [a, b] = range;
    if a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0 {
        [a.min(b), a.max(b)]
    } else {
        log::warn!("{} {:?} is invalid, using {:?}", field, range, default);
        default
    }
}
