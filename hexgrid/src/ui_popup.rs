use crate::HexGridApp;
use crate::app::colors;
use crate::events::collect_ui_events;
use eframe::egui;
use hexgridlib::ViewAction;

//  ========================== Popup Type logic ============================= //

#[derive(Clone, PartialEq, Eq)]
pub enum PopupType {
    Error,
    About,
    /// Comment of the patch starting at the address
    Comment(usize),
    ConfirmRevert,
}

impl PopupType {
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::About => "About",
            Self::Comment(_) => "Set Comment",
            Self::ConfirmRevert => "Revert Patches",
        }
    }
}

//  ========================== Popup logic =================================== //

#[derive(Default)]
pub struct Popup {
    /// Is there a pop-up
    pub(crate) active: bool,
    /// Type of the pop-up. Used to determine the title and content of the window.
    pub(crate) ptype: Option<PopupType>,
    /// Text field content in the pop-up, if present
    text_input: String,
}

impl Popup {
    /// Clear (aka remove) the pop-up
    pub fn clear(&mut self) {
        self.active = false;
        self.ptype = None;
        self.text_input.clear();
    }

    pub(crate) fn open(&mut self, ptype: PopupType) {
        self.active = true;
        self.ptype = Some(ptype);
    }
}

//  ========================== Hexgrid logic =============================== //

impl HexGridApp {
    /// Open the popup a parked context action is waiting for
    pub(crate) fn open_pending_popup(&mut self) {
        if self.popup.active {
            return;
        }
        let Some(session) = self.get_curr_session() else {
            return;
        };
        let (ptype, text) = match &session.pending_action {
            Some(ViewAction::EditComment(addr)) => (
                PopupType::Comment(*addr),
                session.view.patch_comment(*addr).unwrap_or_default(),
            ),
            Some(ViewAction::RevertSelected) => (PopupType::ConfirmRevert, String::new()),
            _ => return,
        };
        self.popup.text_input = text;
        self.popup.open(ptype);
    }

    fn display_error(ui: &mut egui::Ui, msg: &str) -> bool {
        ui.label(msg);

        // Add space before close button
        ui.add_space(10.0);

        // Keep the window open
        false
    }

    fn display_about(ui: &mut egui::Ui) -> bool {
        ui.vertical(|ui| {
            ui.add_space(5.0);

            ui.heading("Hexgrid");
            ui.label("Hex view with patch editing and synchronized views");

            ui.add_space(3.0);
            ui.separator();
            ui.add_space(3.0);

            ui.label(
                "The app is built with egui - immediate-mode GUI library. \
            The grid, cursor, highlight and patch logic is handled by the hexgridlib library, \
            built as part of the same project.\n\nEdits never touch the loaded file: every \
            typed byte becomes a patch that can be split, merged, commented, or reverted.",
            );

            ui.add_space(3.0);
            ui.separator();
            ui.add_space(3.0);

            ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
            ui.add_space(5.0);
        });

        // Keep the window open
        false
    }

    fn display_comment(&mut self, ui: &mut egui::Ui, addr: usize) -> bool {
        ui.vertical(|ui| {
            ui.add_space(3.0);
            ui.label(format!("Comment for patch at 0x{addr:x}:"));
            ui.add_space(3.0);

            ui.add(
                egui::TextEdit::singleline(&mut self.popup.text_input)
                    .desired_width(ui.available_width() - 70.0),
            )
            .request_focus();
        });

        ui.add_space(8.0);

        ui.button(" OK ").clicked() || self.events.borrow().enter_released
    }

    fn display_confirm_revert(&self, ui: &mut egui::Ui) -> bool {
        let count = self.get_curr_session().map_or(0, |s| {
            s.view
                .grid()
                .overlay()
                .active_regions()
                .filter(|r| r.is_mutable())
                .count()
        });
        ui.label(format!(
            "Revert {count} selected patch region(s)? This cannot be undone."
        ));

        ui.add_space(8.0);

        ui.button(" Revert ").clicked() || self.events.borrow().enter_released
    }

    /// Run the parked action of the current session once its popup was confirmed
    fn finish_pending(&mut self, ptype: &PopupType, confirmed: bool) {
        let text = std::mem::take(&mut self.popup.text_input);
        let Some(session) = self.get_curr_session_mut() else {
            return;
        };
        let Some(pending) = session.pending_action.take() else {
            return;
        };
        if !confirmed {
            return;
        }
        let action = match (ptype, pending) {
            (PopupType::Comment(addr), ViewAction::EditComment(_)) => ViewAction::SetComment {
                addr: *addr,
                comment: Some(text),
            },
            (PopupType::ConfirmRevert, ViewAction::RevertSelected) => ViewAction::RevertSelected,
            _ => return,
        };
        let result = session.view.activate(action);
        session.report(result);
    }

    /// Show the pop-up
    pub(crate) fn show_popup(&mut self, ctx: &egui::Context) {
        let content_rect = ctx.content_rect();

        // Block interaction with the app
        egui::Area::new(egui::Id::from("modal_blocker"))
            .order(egui::Order::Background)
            .fixed_pos(content_rect.left_top())
            .show(ctx, |ui| {
                ui.allocate_rect(content_rect, egui::Sense::click());

                // Collect input events once per frame and store in the app state
                *self.events.borrow_mut() = collect_ui_events(ui);
            });

        // Darken the background
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("modal_bg"),
        ));
        painter.rect_filled(content_rect, 0.0, colors::SHADOW);

        let mut is_open = self.popup.active;
        let was_open = self.popup.active;

        let Some(popup_type) = self.popup.ptype.clone() else {
            self.popup.clear();
            return;
        };

        let window = egui::Window::new(popup_type.title())
            .open(&mut is_open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0]);

        // Track OK button or Enter press
        let mut close_confirm = false;

        window.show(ctx, |ui| match popup_type {
            PopupType::Error => {
                let error = self.error.borrow().clone().unwrap_or_default();
                close_confirm = Self::display_error(ui, &error);
            }
            PopupType::About => close_confirm = Self::display_about(ui),
            PopupType::Comment(addr) => close_confirm = self.display_comment(ui, addr),
            PopupType::ConfirmRevert => close_confirm = self.display_confirm_revert(ui),
        });

        self.popup.active = !close_confirm && is_open && !self.events.borrow().escape_pressed;

        // If the window got closed this frame
        if was_open && !self.popup.active {
            match popup_type {
                PopupType::Error => *self.error.borrow_mut() = None,
                PopupType::About => {}
                PopupType::Comment(_) | PopupType::ConfirmRevert => {
                    self.finish_pending(&popup_type, close_confirm);
                }
            }
            self.popup.clear();
        }
    }
}
