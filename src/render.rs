//! Paints a composed [`Frame`] with an egui painter.
//!
//! Back to front: stars, globe glyphs, then per satellite its trail, glyph
//! and beam.

use crate::frame::{Frame, SatelliteGlyph, SatelliteSprite};
use eframe::egui;
use egui::emath::Rot2;
use egui::{Align2, Color32, FontId, Pos2, Shape, Stroke, Vec2};

const GLOBE_FONT_SIZE: f32 = 7.0;
const LABEL_FONT_SIZE: f32 = 8.0;
const TRAIL_WIDTH: f32 = 1.0;
const TRAIL_DOT_RADIUS: f32 = 0.8;

pub fn paint(painter: &egui::Painter, rect: egui::Rect, frame: &Frame) {
    for star in frame.stars {
        painter.circle_filled(rect.min + star.pos, star.radius, star.color);
    }

    let origin = rect.min + frame.origin;
    let globe_font = FontId::monospace(GLOBE_FONT_SIZE);
    for g in &frame.globe {
        painter.text(
            origin + g.offset,
            Align2::CENTER_CENTER,
            g.glyph,
            globe_font.clone(),
            g.color,
        );
    }

    for sat in &frame.satellites {
        paint_satellite(painter, origin, sat);
    }
}

fn paint_satellite(painter: &egui::Painter, origin: Pos2, sprite: &SatelliteSprite) {
    for seg in &sprite.trail {
        painter.line_segment(
            [origin + seg.from, origin + seg.to],
            Stroke::new(TRAIL_WIDTH, seg.color),
        );
    }
    for dot in &sprite.dots {
        painter.circle_filled(origin + dot.pos, TRAIL_DOT_RADIUS, dot.color);
    }

    let Some(glyph) = &sprite.glyph else {
        return;
    };
    paint_glyph(painter, origin, glyph, sprite.name);

    if let Some(beam) = &sprite.beam {
        painter.line_segment([origin + beam.from, origin], Stroke::new(beam.width, beam.color));
    }
}

/// Maps glyph-local coordinates (unscaled, +x toward the heading) to the screen.
struct GlyphSpace {
    center: Pos2,
    rot: Rot2,
    scale: f32,
}

impl GlyphSpace {
    fn at(&self, local: Vec2) -> Pos2 {
        self.center + self.rot * (local * self.scale)
    }

    fn quad(&self, center: Vec2, half: Vec2) -> Vec<Pos2> {
        [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
            .into_iter()
            .map(|(sx, sy)| self.at(center + Vec2::new(half.x * sx, half.y * sy)))
            .collect()
    }
}

fn paint_glyph(painter: &egui::Painter, origin: Pos2, g: &SatelliteGlyph, name: &str) {
    let space = GlyphSpace {
        center: origin + g.center,
        rot: Rot2::from_angle(g.heading),
        scale: g.scale,
    };
    let filled = |points: Vec<Pos2>, color: Color32| {
        painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
    };

    filled(space.quad(Vec2::new(-12.0, g.panel_offset), Vec2::new(5.0, 1.5)), g.panel);
    filled(space.quad(Vec2::new(12.0, -g.panel_offset), Vec2::new(5.0, 1.5)), g.panel);
    filled(space.quad(Vec2::ZERO, Vec2::new(4.0, 4.0)), g.body);
    filled(space.quad(Vec2::new(0.0, 2.0), Vec2::new(3.0, 1.2)), g.radiator);
    painter.circle_filled(space.at(Vec2::new(5.0, -5.0)), 2.5 * g.scale, g.dish);

    if let Some(label) = g.label {
        painter.text(
            space.center + Vec2::new(0.0, 25.0 * g.scale),
            Align2::CENTER_CENTER,
            name,
            FontId::monospace(LABEL_FONT_SIZE),
            label,
        );
    }

    let light_offsets = [Vec2::new(-6.0, -5.0), Vec2::new(5.0, -5.0)];
    for (light, offset) in g.lights.iter().zip(light_offsets) {
        if let Some(color) = light {
            painter.circle_filled(space.at(offset), 1.5 * g.scale, *color);
        }
    }
}
