use crate::app::HexSession;
use eframe::egui;

/// Custom scroll area that scrolls in discrete row steps
pub struct StepScrollArea {
    id: egui::Id,
    /// Row that must end up inside the visible range
    follow_row: Option<usize>,
}

impl StepScrollArea {
    pub const fn new(id: egui::Id) -> Self {
        Self {
            id,
            follow_row: None,
        }
    }

    pub const fn with_follow_row(mut self, row: Option<usize>) -> Self {
        self.follow_row = row;
        self
    }

    /// Lay out `total_rows` rows of `row_height` pixels. `add_contents` receives the clipped
    /// child ui, its top-left corner, and the visible row range.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn show_rows<R>(
        self,
        ui: &mut egui::Ui,
        row_height: f32,
        total_rows: usize,
        add_contents: impl FnOnce(&mut egui::Ui, egui::Rect, std::ops::Range<usize>) -> R,
    ) -> R {
        // Allocate the full available space
        let (rect, _response) = ui.allocate_at_least(ui.available_size(), egui::Sense::hover());

        let mut top_row: usize = ui.data_mut(|d| *d.get_temp_mut_or_default(self.id));

        // One row is a scroll step. Ignore small drifts.
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if ui.rect_contains_pointer(rect) && scroll_delta.abs() > 0.4 {
            let row_delta = if scroll_delta > 0.0 { -3 } else { 3 };
            top_row = top_row.saturating_add_signed(row_delta);
        }

        let visible_rows = ((rect.height() / row_height).floor() as usize).max(1);

        if let Some(row) = self.follow_row {
            if row < top_row {
                top_row = row;
            } else if row >= top_row + visible_rows {
                top_row = row + 1 - visible_rows;
            }
        }

        // Allow 1 empty row at the bottom
        let max_top_row = total_rows.saturating_sub(visible_rows - 1);
        top_row = top_row.min(max_top_row);

        ui.data_mut(|d| d.insert_temp(self.id, top_row));

        draw_custom_scrollbar(ui, rect, top_row, total_rows, visible_rows, self.id);

        let mut child_ui = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(rect)
                .layout(egui::Layout::top_down(egui::Align::Min)),
        );
        child_ui.set_clip_rect(rect);

        let row_range = top_row..(top_row + visible_rows + 1).min(total_rows);
        add_contents(&mut child_ui, rect, row_range)
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]
fn draw_custom_scrollbar(
    ui: &egui::Ui,
    rect: egui::Rect,
    top_row: usize,
    total_rows: usize,
    visible_rows: usize,
    id: egui::Id,
) {
    if total_rows <= visible_rows {
        return;
    }

    let margin = 4.0;
    let scroll_area_rect = egui::Rect::from_min_max(
        egui::pos2(rect.right() - 14.0, rect.top() + margin),
        egui::pos2(rect.right() - 2.0, rect.bottom() - margin),
    );

    // Shrink when not hovered
    let is_hovered = ui.rect_contains_pointer(scroll_area_rect);
    let expansion = ui.ctx().animate_bool(id.with("anim"), is_hovered);
    let bar_width = egui::lerp(4.0..=10.0, expansion);
    let scrollbar_rect = scroll_area_rect.with_min_x(scroll_area_rect.right() - bar_width);

    let max_top_row = total_rows.saturating_sub(visible_rows);
    let handle_height =
        ((visible_rows as f32 / total_rows as f32) * scrollbar_rect.height()).max(20.0);

    let travel_range = scrollbar_rect.height() - handle_height;
    let progress = (top_row as f32 / max_top_row as f32).min(1.0);
    let handle_y_offset = progress * travel_range;

    let response = ui.interact(
        scrollbar_rect,
        id.with("bar"),
        egui::Sense::click_and_drag(),
    );
    if (response.clicked() || response.dragged())
        && let Some(pointer_pos) = ui.input(|i| i.pointer.hover_pos())
    {
        // Center the handle on the pointer
        let click_y = pointer_pos.y - scrollbar_rect.top() - handle_height / 2.0;
        let t = (click_y / travel_range).clamp(0.0, 1.0);

        let new_row = (t * max_top_row as f32).round() as usize;
        ui.data_mut(|d| d.insert_temp(id, new_row));
    }

    let track_color = ui.visuals().extreme_bg_color;
    ui.painter()
        .rect_filled(scrollbar_rect, 2.0, track_color.gamma_multiply(expansion));

    let handle_rect = egui::Rect::from_min_size(
        egui::pos2(
            scrollbar_rect.left(),
            scrollbar_rect.top() + handle_y_offset,
        ),
        egui::vec2(bar_width, handle_height),
    );
    let handle_color = if response.dragged() {
        ui.visuals().widgets.active.bg_fill
    } else if is_hovered {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(handle_rect, 2.0, handle_color);
}

impl HexSession {
    /// Create `StepScrollArea` that follows the cursor whenever it moved since last frame
    pub(crate) fn create_step_scroll(&mut self) -> StepScrollArea {
        let cursor = self.view.grid().cursor();
        let follow_row = (cursor != self.followed_cursor).then(|| {
            self.followed_cursor = cursor;
            self.view.grid().geometry().addr_to_row_col(cursor).0
        });

        StepScrollArea::new(egui::Id::new(("hex_scroll", self.scroll_id))).with_follow_row(follow_row)
    }
}
