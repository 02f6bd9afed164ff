//! Decorative satellites: circular orbits tilted by inclination and
//! ascending node, a bounded trail of past projections, and a
//! single-flight communication beam.

use crate::config::{finite_or, positive_or, SatelliteConfig, MAX_TRAIL_LENGTH};
use crate::math::{node_matrix, tilt_matrix};
use crate::trig;
use nalgebra::Vector3;
use std::collections::VecDeque;
use std::f64::consts::TAU;

const DEFAULT_RADIUS: f64 = 280.0;

/// A 3D point after perspective projection, relative to the scene origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeamState {
    pub active: bool,
    /// Beam passes seen while active.
    pub checks: u32,
    /// Simulation tick at which the beam may next switch on.
    pub next_at: f64,
}

#[derive(Clone, Debug)]
pub struct Satellite {
    pub name: String,
    pub color: [u8; 3],
    /// Orbital angle, kept in [0, 2π).
    pub angle: f64,
    pub radius: f64,
    /// Radians per reference tick.
    pub speed: f64,
    pub inclination: f64,
    pub ascending: f64,
    pub self_rotation: f64,
    pub beam: BeamState,
    trail: VecDeque<Projected>,
    max_trail: usize,
}

impl Satellite {
    pub fn from_config(config: &SatelliteConfig, first_beam_at: f64) -> Self {
        let field = |f: &str| format!("satellite {}: {}", config.name, f);
        let angle = finite_or(&field("angle"), config.angle, 0.0).rem_euclid(TAU);
        let radius = positive_or(&field("radius"), config.radius, DEFAULT_RADIUS);
        let speed = finite_or(&field("speed"), config.speed, 0.0);
        let inclination = finite_or(&field("inclination_deg"), config.inclination_deg, 0.0).to_radians();
        let ascending = finite_or(&field("ascending"), config.ascending, 0.0);
        let max_trail = config.trail_length.clamp(1, MAX_TRAIL_LENGTH);

        Self {
            name: config.name.clone(),
            color: config.color,
            angle,
            radius,
            speed,
            inclination,
            ascending,
            self_rotation: 0.0,
            beam: BeamState {
                active: false,
                checks: 0,
                next_at: first_beam_at,
            },
            trail: VecDeque::with_capacity(max_trail),
            max_trail,
        }
    }

    /// Moves the satellite along its orbit by `ticks` reference ticks.
    pub fn advance(&mut self, ticks: f64, self_rotation_per_tick: f64) {
        if !(ticks.is_finite() && ticks > 0.0) {
            return;
        }
        self.angle = (self.angle + self.speed * ticks).rem_euclid(TAU);
        self.self_rotation = (self.self_rotation + self_rotation_per_tick * ticks).rem_euclid(TAU);
    }

    /// Orbit position: circle, inclination about x, ascending node about z,
    /// then a small out-of-plane oscillation.
    pub fn position(&self, wobble: f64) -> Vector3<f64> {
        let (s, c) = trig::sin_cos(self.angle);
        let base = Vector3::new(c * self.radius, s * self.radius, 0.0);
        let mut p = node_matrix(self.ascending) * (tilt_matrix(self.inclination) * base);
        p.z += trig::sin(self.angle * 3.0) * wobble;
        p
    }

    /// Appends a sample, evicting the oldest past the maximum length.
    pub fn record(&mut self, sample: Projected) {
        while self.trail.len() >= self.max_trail {
            self.trail.pop_front();
        }
        self.trail.push_back(sample);
    }

    /// Oldest first.
    pub fn trail(&self) -> &VecDeque<Projected> {
        &self.trail
    }

    pub fn max_trail_length(&self) -> usize {
        self.max_trail
    }
}

/// One beam scheduling pass over all satellites.
///
/// At most one beam is active after the pass. A beam that expires here does
/// not free the slot until the next pass.
pub fn schedule_beams(
    satellites: &mut [Satellite],
    now: f64,
    duration_checks: u32,
    mut next_delay: impl FnMut() -> f64,
) {
    let mut active = satellites.iter().filter(|s| s.beam.active).count();

    for sat in satellites.iter_mut() {
        let beam = &mut sat.beam;
        if beam.active {
            if active > 1 {
                beam.active = false;
                beam.checks = 0;
                beam.next_at = now + next_delay();
                active -= 1;
                continue;
            }
            beam.checks += 1;
            if beam.checks > duration_checks {
                beam.active = false;
                beam.checks = 0;
                beam.next_at = now + next_delay();
                log::trace!("beam off: {}", sat.name);
            }
        } else if now >= beam.next_at && active == 0 {
            beam.active = true;
            beam.checks = 0;
            active += 1;
            log::trace!("beam on: {}", sat.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sat(angle: f64, radius: f64, speed: f64, inc_deg: f64, asc: f64, trail: usize) -> Satellite {
        let cfg = SatelliteConfig::new("T", [255, 140, 0], angle, radius, speed, inc_deg, asc, trail);
        Satellite::from_config(&cfg, 100.0)
    }

    fn sample(i: usize) -> Projected {
        Projected {
            x: i as f64,
            y: 0.0,
            z: 0.0,
            screen_x: i as f64,
            screen_y: 0.0,
            visible: true,
        }
    }

    #[test]
    fn trail_length_is_bounded_both_ways() {
        assert_eq!(sat(0.0, 280.0, 0.008, 0.0, 0.0, 0).max_trail_length(), 1);
        assert_eq!(sat(0.0, 280.0, 0.008, 0.0, 0.0, usize::MAX).max_trail_length(), MAX_TRAIL_LENGTH);
    }

    #[test]
    fn one_tick_advances_by_speed() {
        let mut s = sat(0.0, 280.0, 0.008, 0.0, 0.0, 800);
        s.advance(1.0, 0.015);
        assert_abs_diff_eq!(s.angle, 0.008, epsilon = 1e-15);
        assert_abs_diff_eq!(s.self_rotation, 0.015, epsilon = 1e-15);
    }

    #[test]
    fn half_tick_is_half_the_motion() {
        let mut a = sat(0.0, 280.0, 0.008, 0.0, 0.0, 10);
        let mut b = a.clone();
        a.advance(1.0, 0.015);
        b.advance(0.5, 0.015);
        b.advance(0.5, 0.015);
        assert_abs_diff_eq!(a.angle, b.angle, epsilon = 1e-15);
    }

    #[test]
    fn angle_wraps_into_one_turn() {
        let mut s = sat(TAU - 0.001, 280.0, 0.008, 0.0, 0.0, 10);
        s.advance(1.0, 0.0);
        assert!(s.angle >= 0.0 && s.angle < TAU);
        assert_abs_diff_eq!(s.angle, 0.007, epsilon = 1e-12);
    }

    #[test]
    fn bad_ticks_are_ignored() {
        let mut s = sat(1.0, 280.0, 0.008, 0.0, 0.0, 10);
        s.advance(f64::NAN, 0.015);
        s.advance(-3.0, 0.015);
        assert_eq!(s.angle, 1.0);
    }

    #[test]
    fn equatorial_orbit_position() {
        let s = sat(0.0, 280.0, 0.008, 0.0, 0.0, 10);
        let p = s.position(15.0);
        assert_abs_diff_eq!(p.x, 280.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inclination_lifts_the_orbit_out_of_plane() {
        let s = sat(std::f64::consts::FRAC_PI_2, 300.0, 0.0, 30.0, 0.0, 10);
        let p = s.position(0.0);
        assert_abs_diff_eq!(p.z, 300.0 * 0.5, epsilon = 0.6);
        assert_abs_diff_eq!(p.norm(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn malformed_parameters_are_replaced() {
        let s = sat(f64::NAN, -5.0, f64::INFINITY, f64::NAN, f64::NAN, 0);
        assert_eq!(s.angle, 0.0);
        assert_eq!(s.radius, DEFAULT_RADIUS);
        assert_eq!(s.speed, 0.0);
        assert_eq!(s.max_trail_length(), 1);
        assert!(s.position(15.0).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn trail_is_bounded_and_chronological() {
        let mut s = sat(0.0, 280.0, 0.008, 0.0, 0.0, 5);
        for i in 0..12 {
            s.record(sample(i));
            assert!(s.trail().len() <= 5);
        }
        let xs: Vec<f64> = s.trail().iter().map(|p| p.x).collect();
        assert_eq!(xs, [7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn beams_are_single_flight() {
        let mut sats: Vec<Satellite> = (0..4).map(|_| sat(0.0, 280.0, 0.0, 0.0, 0.0, 5)).collect();
        schedule_beams(&mut sats, 150.0, 10, || 150.0);
        assert_eq!(sats.iter().filter(|s| s.beam.active).count(), 1);
        assert!(sats[0].beam.active);
    }

    #[test]
    fn beam_expires_after_duration_and_reschedules() {
        let mut sats = vec![sat(0.0, 280.0, 0.0, 0.0, 0.0, 5), sat(0.0, 280.0, 0.0, 0.0, 0.0, 5)];
        let mut now = 100.0;
        schedule_beams(&mut sats, now, 10, || 150.0);
        assert!(sats[0].beam.active);

        for _ in 0..10 {
            now += 30.0;
            schedule_beams(&mut sats, now, 10, || 150.0);
            assert!(sats[0].beam.active);
            assert!(!sats[1].beam.active);
        }
        now += 30.0;
        schedule_beams(&mut sats, now, 10, || 150.0);
        assert!(!sats[0].beam.active);
        assert_eq!(sats[0].beam.next_at, now + 150.0);
        // slot frees on the following pass
        assert!(!sats[1].beam.active);
        schedule_beams(&mut sats, now + 30.0, 10, || 150.0);
        assert!(sats[1].beam.active);
    }

    #[test]
    fn repairs_multiple_active_beams() {
        let mut sats: Vec<Satellite> = (0..3).map(|_| sat(0.0, 280.0, 0.0, 0.0, 0.0, 5)).collect();
        for s in &mut sats {
            s.beam.active = true;
        }
        schedule_beams(&mut sats, 0.0, 10, || 100.0);
        assert_eq!(sats.iter().filter(|s| s.beam.active).count(), 1);
    }
}
