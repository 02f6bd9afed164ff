//! Application shell and eframe integration.
//!
//! Mounts the backdrop behind a central panel, follows window visibility and
//! size, and emulates page navigation with a row of buttons so the home and
//! away views can be switched by hand.

use eframe::egui;
use orbit_backdrop::{render, Backdrop, EngineConfig};
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Page {
    Home,
    Research,
    Projects,
    Contact,
}

impl Page {
    const ALL: [Page; 4] = [Page::Home, Page::Research, Page::Projects, Page::Contact];

    fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Research => "Research",
            Page::Projects => "Projects",
            Page::Contact => "Contact",
        }
    }
}

pub(crate) struct App {
    config: EngineConfig,
    backdrop: Option<Backdrop>,
    mount_failed: bool,
    page: Page,
    last_size: egui::Vec2,
}

impl App {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            config: load_config(),
            backdrop: None,
            mount_failed: false,
            page: Page::Home,
            last_size: egui::Vec2::ZERO,
        }
    }

    fn mount(&mut self, size: egui::Vec2) {
        if self.backdrop.is_some() || self.mount_failed {
            return;
        }
        match Backdrop::mount(size.x, size.y, self.config.clone()) {
            Ok(backdrop) => {
                self.backdrop = Some(backdrop);
                self.last_size = size;
            }
            Err(e) if e.is_retryable() => {
                log::debug!("backdrop not mounted yet: {}", e);
            }
            Err(e) => {
                log::error!("backdrop disabled: {}", e);
                self.mount_failed = true;
            }
        }
    }

    fn show_nav(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Orbit Backdrop");
                ui.separator();
                for page in Page::ALL {
                    ui.selectable_value(&mut self.page, page, page.label());
                }
            });
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_nav(ctx);

        let hidden = surface_hidden(ctx);
        let now = ctx.input(|i| i.time);
        let is_home = self.page == Page::Home;

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.mount(rect.size());
                let Some(backdrop) = self.backdrop.as_mut() else { return };

                if hidden {
                    backdrop.pause();
                } else {
                    backdrop.resume();
                }
                if rect.size() != self.last_size {
                    backdrop.resize(rect.width(), rect.height());
                    self.last_size = rect.size();
                }
                if let Some(frame) = backdrop.tick(now, is_home) {
                    render::paint(&ui.painter_at(rect), rect, &frame);
                }

                if !is_home {
                    ui.vertical_centered(|ui| {
                        ui.add_space(rect.height() * 0.4);
                        ui.heading(self.page.label());
                    });
                }
            });

        match &self.backdrop {
            Some(b) if b.is_running() => ctx.request_repaint(),
            _ => ctx.request_repaint_after(Duration::from_millis(250)),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn surface_hidden(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.viewport().minimized.unwrap_or(false))
}

#[cfg(target_arch = "wasm32")]
fn surface_hidden(_ctx: &egui::Context) -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .is_some_and(|d| d.hidden())
}

/// Reads `ORBIT_BACKDROP_CONFIG` (a JSON file path) when set. Any failure
/// falls back to the built-in defaults.
#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> EngineConfig {
    let Ok(path) = std::env::var("ORBIT_BACKDROP_CONFIG") else {
        return EngineConfig::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| EngineConfig::from_json(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            log::info!("loaded config from {}", path);
            config
        }
        Err(e) => {
            log::warn!("ignoring config {}: {}", path, e);
            EngineConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_config() -> EngineConfig {
    EngineConfig::default()
}
