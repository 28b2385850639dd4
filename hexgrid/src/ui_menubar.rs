use crate::HexGridApp;
use crate::ui_popup::PopupType;
use eframe::egui;
use hexgridlib::ViewAction;

impl HexGridApp {
    /// Displays the top menu bar with File, Edit, View, and About buttons
    pub(crate) fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menubar").show(ctx, |ui| {
            ui.add_space(3.0);

            egui::MenuBar::new().ui(ui, |ui| {
                ui.horizontal(|ui| {
                    // FILE MENU
                    ui.menu_button("File", |ui| {
                        if ui.button("Open file...").clicked()
                            && let Some(path) =
                                rfd::FileDialog::new().set_title("Open File").pick_file()
                        {
                            self.load_file(&path);
                        }

                        if ui.button("Close tab").clicked()
                            && let Some(curr_session_id) = self.active_index
                        {
                            self.close_file(curr_session_id);
                        }
                    });

                    // EDIT MENU
                    ui.menu_button("Edit", |ui| {
                        let Some(curr_session) = self.get_curr_session_mut() else {
                            ui.label(egui::RichText::new("No file open").weak());
                            return;
                        };
                        let view = &curr_session.view;
                        let has_selection = view.grid().selection().is_some();
                        let has_clipboard = view.clipboard().is_some();
                        let can_merge = view.can_merge_selected_patches();
                        let has_patches = view.grid().overlay().active_regions().any(|r| r.is_mutable());

                        let mut action = None;
                        if ui.add_enabled(has_selection, egui::Button::new("Copy")).clicked() {
                            action = Some(ViewAction::Copy);
                        }
                        if ui.add_enabled(has_clipboard, egui::Button::new("Paste")).clicked() {
                            action = Some(ViewAction::Paste);
                        }
                        ui.separator();
                        if ui
                            .add_enabled(can_merge, egui::Button::new("Merge selected patches"))
                            .clicked()
                        {
                            action = Some(ViewAction::MergeSelected);
                        }
                        if ui
                            .add_enabled(has_patches, egui::Button::new("Revert selected patches..."))
                            .clicked()
                        {
                            action = Some(ViewAction::RevertSelected);
                        }

                        if let Some(action) = action {
                            curr_session.run_action(action);
                            ui.close();
                        }
                    });

                    // VIEW MENU
                    ui.menu_button("View", |ui| {
                        let Some(curr_session) = self.get_curr_session_mut() else {
                            ui.label(egui::RichText::new("No file open").weak());
                            return;
                        };

                        let mut smart = curr_session.view.smart_highlighting();
                        if ui.checkbox(&mut smart, "Smart highlighting").changed() {
                            curr_session.view.set_smart_highlighting(smart);
                        }

                        ui.add_space(3.0);

                        if ui.button("New synchronized view").clicked() {
                            self.open_synchronized_view();
                            ui.close();
                        }
                    });

                    // ABOUT BUTTON
                    if ui.button("About").clicked() {
                        self.popup.open(PopupType::About);
                    }
                });
            });

            ui.add_space(2.0);
        });
    }
}
