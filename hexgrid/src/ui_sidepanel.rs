use crate::app::{HexGridApp, HexSession, colors};
use crate::loader::get_last_modified;
use eframe::egui;
use hexgridlib::ViewAction;

/// Hex preview of a patch, cut after `max` bytes
fn preview_bytes(bytes: &[u8], max: usize) -> String {
    let mut text = bytes
        .iter()
        .take(max)
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > max {
        text.push_str(" ...");
    }
    text
}

impl HexSession {
    fn show_file_info(&self, ui: &mut egui::Ui) {
        let filepath = self.path.to_string_lossy().into_owned();

        egui::Grid::new("file_info_grid")
            .num_columns(2)
            .spacing([30.0, 4.0])
            .show(ui, |ui| {
                ui.label("File Name");
                // Wrap the name + show the filepath on hover
                ui.add(
                    egui::Label::new(self.path_name())
                        .wrap()
                        .sense(egui::Sense::hover()),
                )
                .on_hover_text(&filepath);
                ui.end_row();

                ui.label("Payload Size");
                ui.label(format!("{} bytes", self.view.project().memory.len()));
                ui.end_row();

                ui.label("Views");
                ui.label(self.sync.borrow().members().to_string());
                ui.end_row();
            });

        // Warn if the file changed on disk since it was loaded
        if let Ok(t) = get_last_modified(&self.path)
            && t != std::time::SystemTime::UNIX_EPOCH
            && t != self.last_modified
        {
            ui.add_space(3.0);
            ui.label(
                egui::RichText::new("File on disk has been modified!")
                    .color(colors::WARNING)
                    .size(12.0)
                    .strong(),
            )
            .on_hover_text("Close and load the file again to see the changes.");
        }
    }

    fn show_patches_under_cursor(&mut self, ui: &mut egui::Ui) {
        let patches = self.view.patches_under_cursor();
        if patches.is_empty() {
            ui.label(egui::RichText::new("No patch under the cursor").weak());
            return;
        }

        let mut action = None;
        for patch in &patches {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.monospace(format!("{:08x}", patch.addr));
                    ui.label(format!("{} bytes", patch.len()));
                });
                ui.monospace(preview_bytes(&patch.new_bytes, 8));
                if let Some(comment) = &patch.comment {
                    ui.label(egui::RichText::new(comment).italics());
                }
                ui.horizontal(|ui| {
                    if ui.small_button("Comment...").clicked() {
                        action = Some(ViewAction::EditComment(patch.addr));
                    }
                    if ui.small_button("Revert").clicked() {
                        action = Some(ViewAction::Revert(patch.addr));
                    }
                });
            });
        }

        if let Some(action) = action {
            self.run_action(action);
        }
    }
}

impl HexGridApp {
    /// Show the side panel with the file information, status, jump to address, and patches.
    pub(crate) fn show_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("left_panel")
            .exact_width(280.0)
            .show(ctx, |ui| {
                ui.add_space(3.0);

                let Some(curr_session) = self.get_curr_session_mut() else {
                    ui.label(egui::RichText::new("No file open").weak());
                    return;
                };

                egui::CollapsingHeader::new("File Information")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add_space(5.0);
                        curr_session.show_file_info(ui);
                        ui.add_space(5.0);
                    });

                ui.add_space(3.0);

                egui::CollapsingHeader::new("Status")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add_space(5.0);
                        ui.monospace(curr_session.view.status_text());
                        ui.add_space(5.0);
                    });

                ui.add_space(3.0);

                egui::CollapsingHeader::new("Jump To Address")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add_space(5.0);
                        curr_session.show_jumpto_contents(ui);
                        ui.add_space(5.0);
                    });

                ui.add_space(3.0);

                egui::CollapsingHeader::new("Patches")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add_space(5.0);
                        let total = curr_session.view.project().patches.borrow().len();
                        ui.label(format!("{total} patch(es) in project"));
                        ui.add_space(3.0);
                        curr_session.show_patches_under_cursor(ui);
                        ui.add_space(5.0);
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_bytes_truncates() {
        // Arrange
        let bytes = [0xde, 0xad, 0xbe, 0xef, 0x01];

        // Act
        let short = preview_bytes(&bytes[..2], 4);
        let long = preview_bytes(&bytes, 4);

        // Assert
        assert_eq!(short, "de ad");
        assert_eq!(long, "de ad be ef ...");
    }
}
