use crate::app::HexSession;
use eframe::egui;
use hexgridlib::{MenuEntry, ViewAction};

/// Draw menu entries and return the action clicked, if any
fn show_entries(ui: &mut egui::Ui, entries: &[MenuEntry]) -> Option<ViewAction> {
    let mut clicked = None;
    for entry in entries {
        match entry {
            MenuEntry::Action {
                label,
                action,
                enabled,
            } => {
                if ui.add_enabled(*enabled, egui::Button::new(label)).clicked() {
                    clicked = Some(action.clone());
                }
            }
            MenuEntry::Submenu { title, entries } => {
                if let Some(action) = ui.menu_button(title, |ui| show_entries(ui, entries)).inner.flatten() {
                    clicked = Some(action);
                }
            }
            MenuEntry::Separator => {
                ui.separator();
            }
        }
    }
    clicked
}

impl HexSession {
    /// Context menu of the hex canvas, rebuilt from the view every time it opens
    pub(crate) fn show_context_menu(&mut self, ui: &mut egui::Ui) {
        let menu = self.view.context_menu();
        if menu.is_empty() {
            ui.label(egui::RichText::new("No actions").weak());
            return;
        }

        let Some(action) = show_entries(ui, &menu.entries) else {
            return;
        };
        ui.close();

        self.run_action(action);
    }

    /// Perform `action` now, or park it until its popup completes
    pub(crate) fn run_action(&mut self, action: ViewAction) {
        if action.needs_input() || action.needs_confirmation() {
            self.pending_action = Some(action);
            return;
        }
        let result = self.view.activate(action);
        self.report(result);
    }
}
