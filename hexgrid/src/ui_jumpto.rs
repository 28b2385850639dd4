use crate::app::HexSession;
use eframe::egui;

#[derive(Default)]
pub struct JumpTo {
    /// Is the text edit window in focus
    pub(crate) has_focus: bool,
    /// User input string
    input: String,
    /// Force to loose focus from the text field
    loose_focus: bool,
}

impl JumpTo {
    pub(crate) const fn loose_focus(&mut self) {
        self.loose_focus = true;
    }
}

/// Parse a hex address, with or without a `0x` prefix
pub fn parse_addr(input: &str) -> Option<usize> {
    let s = input.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    usize::from_str_radix(s, 16).ok()
}

impl HexSession {
    /// Displays the `JumpTo` panel for jumping to a specific address.
    pub(crate) fn show_jumpto_contents(&mut self, ui: &mut egui::Ui) {
        let textedit = ui.add(
            egui::TextEdit::singleline(&mut self.jump_to.input)
                .hint_text("Address (hex)")
                .desired_width(ui.available_width() - 30.0),
        );

        if self.jump_to.loose_focus {
            textedit.surrender_focus();
            self.jump_to.loose_focus = false;
        }

        if textedit.has_focus() {
            self.jump_to.has_focus = true;

            // Typing here must not edit bytes
            self.has_focus = false;
        }

        if self.events.borrow().enter_released && self.jump_to.has_focus {
            self.jump_to.has_focus = false;
            if let Some(addr) = parse_addr(&self.jump_to.input)
                && !self.view.jump_to(addr)
            {
                self.error
                    .borrow_mut()
                    .replace(format!("Address {addr:08x} is outside of the view"));
            }
        }
    }
}
