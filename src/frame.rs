//! Render instructions produced by one scheduler step.
//!
//! Globe and satellite coordinates are relative to `Frame::origin`; star
//! positions are relative to the surface's top-left corner.

use eframe::egui::{Color32, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarSprite {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobeGlyph {
    pub offset: Vec2,
    pub glyph: char,
    pub color: Color32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailDot {
    pub pos: Vec2,
    pub color: Color32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SatelliteGlyph {
    pub center: Vec2,
    pub scale: f32,
    /// Radians; the glyph's +x axis points along this heading.
    pub heading: f32,
    pub panel_offset: f32,
    pub body: Color32,
    pub panel: Color32,
    pub dish: Color32,
    pub radiator: Color32,
    pub label: Option<Color32>,
    /// Green and red status lights, `None` while dark.
    pub lights: [Option<Color32>; 2],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Beam {
    pub from: Vec2,
    pub color: Color32,
    pub width: f32,
}

#[derive(Clone, Debug)]
pub struct SatelliteSprite<'a> {
    pub name: &'a str,
    pub trail: Vec<TrailSegment>,
    pub dots: Vec<TrailDot>,
    pub glyph: Option<SatelliteGlyph>,
    pub beam: Option<Beam>,
}

#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub origin: Vec2,
    pub opacity: f32,
    pub stars: &'a [StarSprite],
    pub globe: Vec<GlobeGlyph>,
    pub satellites: Vec<SatelliteSprite<'a>>,
}

/// Channels and alpha clamped into [0, 255]; NaN becomes 0.
pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color32 {
    Color32::from_rgba_unmultiplied(channel(r), channel(g), channel(b), channel(a))
}

pub fn channel(v: f64) -> u8 {
    if v.is_nan() { 0 } else { v.clamp(0.0, 255.0) as u8 }
}
