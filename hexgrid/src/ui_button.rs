use eframe::egui;

/// Frame styled as a tab. Returns the click response of the whole frame and the
/// result of `add_contents`.
pub fn tab_style_button<R>(
    ui: &mut egui::Ui,
    id_source: impl std::hash::Hash,
    is_active: bool,
    fixed_width: f32,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> (egui::Response, R) {
    let (mut fill, text_color) = if is_active {
        (
            ui.visuals().widgets.active.bg_fill,
            ui.visuals().widgets.active.fg_stroke.color,
        )
    } else {
        (
            ui.visuals().widgets.noninteractive.bg_fill,
            ui.visuals().widgets.inactive.fg_stroke.color,
        )
    };

    let id = ui.make_persistent_id(id_source);

    // The frame rect is only known after layout, so hover comes from the last frame
    let hovered = ui.ctx().read_response(id).is_some_and(|r| r.hovered());
    if hovered && !is_active {
        fill = ui.visuals().widgets.hovered.bg_fill;
    }

    let inner = egui::Frame::new()
        .fill(fill)
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(6, 4))
        .show(ui, |ui| {
            if fixed_width > 0.0 {
                // Minus the horizontal inner margin
                ui.set_width(fixed_width - 12.0);
            }

            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 8.0;

                // Text must not steal hover from the frame
                ui.style_mut().interaction.selectable_labels = false;
                ui.visuals_mut().override_text_color = Some(text_color);

                add_contents(ui)
            })
            .inner
        });

    let response = ui.interact(inner.response.rect, id, egui::Sense::click());
    (response, inner.inner)
}
