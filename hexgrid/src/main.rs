#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
// Tell OS to hide the console window when running.
// This attribute is only applied if the target OS is Windows.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod events;
mod loader;
mod ui_button;
mod ui_centralpanel;
mod ui_contextmenu;
mod ui_filedrop;
mod ui_jumpto;
mod ui_menubar;
mod ui_popup;
mod ui_scrollarea;
mod ui_sidepanel;
mod ui_tabs;

use crate::ui_popup::PopupType;
use app::HexGridApp;
use eframe::egui;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> eframe::Result<()> {
    init_tracing();

    let config = config::load_from(None);
    let files: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    info!(files = files.len(), "starting hexgrid");

    let options = eframe::NativeOptions {
        vsync: true,
        viewport: egui::ViewportBuilder::default()
            .with_resizable(true)
            .with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Hexgrid",
        options,
        Box::new(move |_cc| {
            let mut app = HexGridApp::new(config);
            for path in &files {
                app.load_file(path);
            }
            Ok(Box::new(app))
        }),
    )
}

impl eframe::App for HexGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Edits made through one tab reach every other view of the project
        self.pump_all();

        self.show_menu_bar(ctx);

        self.open_pending_popup();
        if self.error.borrow().is_some() {
            self.popup.open(PopupType::Error);
        }

        self.show_side_panel(ctx);
        self.show_tabs(ctx);

        self.handle_drag_and_drop(ctx);

        // If pop active - show it and return (don't display the hex bytes)
        if self.popup.active {
            self.show_popup(ctx);
            return;
        }

        let palette = self.palette;
        let font_size = self.config.layout.font_size;
        if let Some(curr_session) = self.get_curr_session_mut() {
            curr_session.show_central_panel(ctx, &palette, font_size);
        } else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label("Drop a file or click '+' to start hexing!");
                });
            });
        }
    }
}
