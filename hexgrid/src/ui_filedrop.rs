use crate::app::HexGridApp;
use eframe::egui;

impl HexGridApp {
    /// Load dropped files. While files hover over the window, cover the central panel with a
    /// hint. Ignored while a popup is shown.
    pub(crate) fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        if self.popup.active {
            return;
        }

        let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if hovering_files {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.heading("Drop file to open");
                });
            });
        }

        for file in ctx.input(|i| i.raw.dropped_files.clone()) {
            if let Some(path) = file.path {
                self.load_file(&path);
            }
        }
    }
}
