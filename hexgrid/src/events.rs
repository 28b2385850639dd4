use eframe::egui;
use hexgridlib::{KeyInput, Modifiers};

#[derive(Default, Clone)]
pub struct EventState {
    /// Grid keys in the order they arrived this frame
    pub(crate) keys: Vec<(KeyInput, Modifiers)>,
    pub(crate) pointer_pressed: bool,
    pub(crate) pointer_down: bool,
    pub(crate) pointer_released: bool,
    pub(crate) double_clicked: bool,
    pub(crate) secondary_clicked: bool,
    pub(crate) pointer_pos: Option<egui::Pos2>,
    pub(crate) shift_down: bool,
    pub(crate) copy: bool,
    pub(crate) paste: bool,
    pub(crate) escape_pressed: bool,
    pub(crate) enter_released: bool,
}

const fn key_to_input(key: egui::Key) -> Option<KeyInput> {
    Some(match key {
        egui::Key::ArrowUp => KeyInput::Up,
        egui::Key::ArrowDown => KeyInput::Down,
        egui::Key::ArrowLeft => KeyInput::Left,
        egui::Key::ArrowRight => KeyInput::Right,
        egui::Key::PageUp => KeyInput::PageUp,
        egui::Key::PageDown => KeyInput::PageDown,
        _ => return None,
    })
}

const fn to_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        ctrl: modifiers.command,
    }
}

/// Collect events once per frame and return an aggregated state
pub fn collect_ui_events(ui: &egui::Ui) -> EventState {
    ui.input(|i| {
        let mut state = EventState {
            pointer_pressed: i.pointer.primary_pressed(),
            pointer_down: i.pointer.primary_down(),
            pointer_released: i.pointer.primary_released(),
            double_clicked: i
                .pointer
                .button_double_clicked(egui::PointerButton::Primary),
            secondary_clicked: i.pointer.secondary_clicked(),
            pointer_pos: i.pointer.interact_pos(),
            shift_down: i.modifiers.shift,
            escape_pressed: i.key_pressed(egui::Key::Escape),
            ..Default::default()
        };

        for event in &i.events {
            match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    let modifiers = to_modifiers(*modifiers);
                    if let Some(input) = key_to_input(*key) {
                        state.keys.push((input, modifiers));
                    } else if *key == egui::Key::Space && modifiers.ctrl {
                        // Plain space arrives as text
                        state.keys.push((KeyInput::Space, modifiers));
                    }
                }
                egui::Event::Key {
                    key: egui::Key::Enter,
                    pressed: false,
                    ..
                } => state.enter_released = true,
                egui::Event::Text(text) => {
                    let modifiers = to_modifiers(i.modifiers);
                    state
                        .keys
                        .extend(text.chars().map(|c| (KeyInput::Text(c), modifiers)));
                }
                egui::Event::Copy => state.copy = true,
                egui::Event::Paste(_) => state.paste = true,
                _ => {}
            }
        }

        state
    })
}
