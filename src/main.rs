mod app;

use app::App;

#[cfg(not(target_arch = "wasm32"))]
use eframe::egui;

#[cfg(target_arch = "wasm32")]
use eframe::wasm_bindgen::JsCast;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("orbit-backdrop {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Orbit Backdrop",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();
    log::info!("orbit-backdrop {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("no document, backdrop not started");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("no #canvas element, backdrop not started");
            return;
        };

        let web_options = eframe::WebOptions::default();
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(App::new(cc)))),
            )
            .await;
        if let Err(e) = started {
            log::error!("failed to start eframe: {:?}", e);
        }
    });
}
