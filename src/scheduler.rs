//! The render/update loop.
//!
//! `Backdrop` owns every piece of mutable state: clock, view, stars and
//! satellites. Each step advances the simulation and composes a [`Frame`];
//! star brightness and beam scheduling run on coarser cadences than the
//! globe and satellites.

use crate::clock::SimulationClock;
use crate::config::{EngineConfig, ViewConfig};
use crate::error::BackdropError;
use crate::frame::{Frame, StarSprite};
use crate::grid::{build_grid, GridPoint};
use crate::projection::{project, project_globe, satellite_sprite, Lighting, Theme};
use crate::satellite::{schedule_beams, Satellite};
use crate::stars::{uniform, StarField};
use eframe::egui::vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

/// Display values derived from the host's page signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    pub is_home: bool,
    pub opacity: f64,
    pub offset_x: f64,
}

impl ViewParams {
    pub fn derive(is_home: bool, width: f64, config: &ViewConfig) -> Self {
        if is_home {
            Self {
                is_home,
                opacity: config.home_opacity,
                offset_x: width * config.home_offset_fraction,
            }
        } else {
            Self {
                is_home,
                opacity: config.away_opacity,
                offset_x: 0.0,
            }
        }
    }
}

pub struct Backdrop {
    config: EngineConfig,
    width: f64,
    height: f64,
    tilt: f64,
    grid: Vec<GridPoint>,
    lighting: Lighting,
    stars: StarField,
    star_layer: Vec<StarSprite>,
    star_layer_opacity: f64,
    satellites: Vec<Satellite>,
    clock: SimulationClock,
    view: ViewParams,
    state: RunState,
    next_trail_sample: f64,
    next_beam_pass: f64,
    rng: SmallRng,
}

impl Backdrop {
    /// Builds the engine for a surface of `width` x `height` points.
    pub fn mount(width: f32, height: f32, config: EngineConfig) -> Result<Self, BackdropError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(BackdropError::SurfaceUnavailable { width, height });
        }
        let config = config.validate()?;
        let (w, h) = (width as f64, height as f64);

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let grid = build_grid(config.earth_radius, &config.grid);
        let stars = StarField::new(&config.stars, w, h, &mut rng);
        let satellites: Vec<Satellite> = config
            .satellites
            .iter()
            .map(|s| Satellite::from_config(s, uniform(&mut rng, config.beams.first_delay)))
            .collect();
        let view = ViewParams::derive(true, w, &config.view);

        log::info!(
            "orbit-backdrop {} ({}) mounted at {}x{}: {} grid points, {} stars, {} satellites",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH"),
            width,
            height,
            grid.len(),
            stars.stars().len(),
            satellites.len()
        );

        Ok(Self {
            tilt: config.axial_tilt_deg.to_radians(),
            lighting: Lighting::from_config(&config.lighting),
            star_layer: stars.sprites(view.opacity),
            star_layer_opacity: view.opacity,
            next_trail_sample: config.cadence.trail_sample_every,
            next_beam_pass: config.cadence.beam_check_every,
            width: w,
            height: h,
            grid,
            stars,
            satellites,
            clock: SimulationClock::new(),
            view,
            state: RunState::Running,
            rng,
            config,
        })
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            log::debug!("backdrop paused at frame {}", self.clock.frame());
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            self.clock.reset_reference();
            log::debug!("backdrop resumed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Applies a new surface size. Non-positive or non-finite sizes are ignored.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::debug!("ignoring resize to {}x{}", width, height);
            return;
        }
        let (w, h) = (width as f64, height as f64);
        if w == self.width && h == self.height {
            return;
        }
        self.width = w;
        self.height = h;
        let moved = self.stars.relocate(w, h, &mut self.rng);
        self.star_layer = self.stars.sprites(self.view.opacity);
        self.star_layer_opacity = self.view.opacity;
        log::debug!("resized to {}x{}, {} stars relocated", width, height, moved);
    }

    /// Advances by the wall time since the previous tick. `now` is in seconds.
    pub fn tick(&mut self, now: f64, is_home: bool) -> Option<Frame<'_>> {
        if self.state == RunState::Paused {
            return None;
        }
        let ticks = self.clock.elapsed_ticks(now, self.config.max_frame_seconds);
        self.step(ticks, is_home)
    }

    /// Advances by `ticks` reference ticks (1/60 s each). `None` while paused.
    pub fn step(&mut self, ticks: f64, is_home: bool) -> Option<Frame<'_>> {
        if self.state == RunState::Paused {
            return None;
        }
        let ticks = if ticks.is_finite() && ticks > 0.0 { ticks } else { 0.0 };

        self.view = ViewParams::derive(is_home, self.width, &self.config.view);

        self.clock.advance(ticks, self.config.spin_per_tick);
        for sat in &mut self.satellites {
            sat.advance(ticks, self.config.self_rotation_per_tick);
        }
        let frame = self.clock.frame();

        if frame % self.config.cadence.star_refresh_every == 0 {
            self.stars.refresh(self.clock.ticks());
            self.star_layer = self.stars.sprites(self.view.opacity);
            self.star_layer_opacity = self.view.opacity;
        } else if self.star_layer_opacity != self.view.opacity {
            self.star_layer = self.stars.sprites(self.view.opacity);
            self.star_layer_opacity = self.view.opacity;
        }

        let now = self.clock.ticks();
        if ticks > 0.0 && is_due(now, self.next_trail_sample) {
            let (wobble, perspective) = (self.config.wobble, self.config.perspective);
            for sat in &mut self.satellites {
                let sample = project(&sat.position(wobble), perspective);
                sat.record(sample);
            }
            self.next_trail_sample = next_due(now, self.config.cadence.trail_sample_every);
        }

        if is_due(now, self.next_beam_pass) {
            let every = self.config.cadence.beam_check_every;
            let interval = self.config.beams.interval;
            let rng = &mut self.rng;
            schedule_beams(&mut self.satellites, now, self.config.beams.duration_checks, || {
                uniform(rng, interval)
            });
            self.next_beam_pass = next_due(now, every);
        }

        Some(self.compose())
    }

    fn compose(&self) -> Frame<'_> {
        let view = self.view;
        let globe = project_globe(
            &self.grid,
            self.clock.earth_rotation(),
            self.tilt,
            self.config.earth_radius,
            &self.lighting,
            Theme::for_view(view.is_home),
            view.opacity,
        );
        let satellites = self
            .satellites
            .iter()
            .map(|sat| {
                let at = project(&sat.position(self.config.wobble), self.config.perspective);
                satellite_sprite(sat, &at, self.clock.ticks(), view.opacity, view.is_home)
            })
            .collect();

        Frame {
            origin: vec2((self.width * 0.5 + view.offset_x) as f32, (self.height * 0.5) as f32),
            opacity: view.opacity as f32,
            stars: &self.star_layer,
            globe,
            satellites,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn view(&self) -> ViewParams {
        self.view
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn grid(&self) -> &[GridPoint] {
        &self.grid
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Absorbs float drift from summing wall-clock deltas.
const CADENCE_SLACK: f64 = 1e-6;

fn is_due(now: f64, due: f64) -> bool {
    now + CADENCE_SLACK >= due
}

/// First multiple of `every` after `now`.
fn next_due(now: f64, every: f64) -> f64 {
    (((now + CADENCE_SLACK) / every).floor() + 1.0) * every
}
