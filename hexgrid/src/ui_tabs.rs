use crate::app::HexGridApp;
use crate::ui_button;
use eframe::egui;

/// Width of each tab after scaling `ideal` widths into `available` pixels
fn fit_tab_widths(ideal: &[f32], available: f32) -> Vec<f32> {
    let total: f32 = ideal.iter().sum();
    let scale = if total > available && total > 0.0 {
        available / total
    } else {
        1.0
    };
    ideal.iter().map(|w| w * scale).collect()
}

impl HexGridApp {
    /// Show tabs with the list of open views.
    /// If the number of tabs does not exceed the maximum allowed, the "Open New File" tab is added.
    pub(crate) fn show_tabs(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("tabs_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut tab_to_close = None;

                let spacing = 2.0;
                ui.spacing_mut().item_spacing.x = spacing;

                // Name width + margins and the "×" button
                let font_id = egui::TextStyle::Body.resolve(ui.style());
                let ideal: Vec<f32> = self
                    .sessions
                    .iter()
                    .map(|s| {
                        ui.painter()
                            .layout_no_wrap(s.name.clone(), font_id.clone(), egui::Color32::WHITE)
                            .size()
                            .x
                            + 32.0
                    })
                    .collect();
                #[allow(clippy::cast_precision_loss)]
                let available =
                    ui.available_width() - 70.0 - spacing * self.sessions.len() as f32;
                let widths = fit_tab_widths(&ideal, available);

                for (i, session) in self.sessions.iter().enumerate() {
                    let is_active = Some(i) == self.active_index;

                    let (response, close_clicked) = ui_button::tab_style_button(
                        ui,
                        ("tab", session.scroll_id),
                        is_active,
                        widths[i],
                        |ui| {
                            ui.add(egui::Label::new(egui::RichText::new(&session.name)).truncate());

                            // Close button (with a transparent background)
                            ui.scope(|ui| {
                                ui.visuals_mut().widgets.inactive.weak_bg_fill =
                                    egui::Color32::TRANSPARENT;
                                ui.button("×").clicked()
                            })
                            .inner
                        },
                    );

                    if close_clicked {
                        tab_to_close = Some(i);
                    } else if response.clicked() {
                        self.active_index = Some(i);
                    }
                }

                // Close after the loop to keep the sessions borrow simple
                if let Some(i) = tab_to_close {
                    self.close_file(i);
                }

                if self.sessions.len() < self.max_tabs {
                    let (response, ()) =
                        ui_button::tab_style_button(ui, "add_tab", false, 0.0, |ui| {
                            ui.label(egui::RichText::new(" + ").strong());
                        });
                    if response.on_hover_text("Open New File").clicked()
                        && let Some(path) =
                            rfd::FileDialog::new().set_title("Open File").pick_file()
                    {
                        self.load_file(&path);
                    }
                }
            });
        });
    }
}
