use crate::app::{HexSession, Palette, colors};
use crate::events::collect_ui_events;
use eframe::egui;
use hexgridlib::{CellClass, CellMetrics, Geometry, Point, Rect, SelectionPath};
use std::ops::Range;
use std::time::Instant;

/// Fill alpha of an active highlight region
const REGION_ALPHA: u8 = 50;
/// Fill alpha of an inactive highlight region
const REGION_ALPHA_INACTIVE: u8 = 20;
const SELECTION_ALPHA: u8 = 70;

/// Maps grid coordinates into the screen rect of the visible rows
#[derive(Clone, Copy)]
struct Canvas {
    origin: egui::Pos2,
}

impl Canvas {
    #[allow(clippy::cast_precision_loss)]
    fn new(rect: egui::Rect, top_row: usize, row_height: f32) -> Self {
        Self {
            origin: rect.min - egui::vec2(0.0, top_row as f32 * row_height),
        }
    }

    fn pos(self, p: Point) -> egui::Pos2 {
        self.origin + egui::vec2(p.x, p.y)
    }

    fn rect(self, r: Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.pos(r.min), self.pos(r.max))
    }

    fn point(self, pos: egui::Pos2) -> Point {
        let v = pos - self.origin;
        Point::new(v.x, v.y)
    }
}

const fn glyph_color(class: CellClass) -> egui::Color32 {
    match class {
        CellClass::Printable => colors::PRINTABLE,
        CellClass::Unprintable => colors::UNPRINTABLE,
        CellClass::Unknown => colors::UNKNOWN,
    }
}

fn with_alpha(color: egui::Color32, alpha: u8) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn paint_path(
    painter: &egui::Painter,
    canvas: Canvas,
    path: &SelectionPath,
    fill: egui::Color32,
    stroke: egui::Stroke,
) {
    for r in &path.rects {
        painter.rect_filled(canvas.rect(*r), 0.0, fill);
    }
    for subpath in &path.subpaths {
        let points = subpath.iter().map(|p| canvas.pos(*p)).collect();
        painter.add(egui::Shape::closed_line(points, stroke));
    }
}

/// Glyph metrics of the monospace font at `font_size`
fn measure_metrics(ui: &egui::Ui, font: &egui::FontId) -> CellMetrics {
    let galley = ui
        .painter()
        .layout_no_wrap("0".to_owned(), font.clone(), egui::Color32::WHITE);
    CellMetrics {
        char_width: galley.size().x,
        char_height: galley.size().y,
    }
}

/// Inclusive address range covered by `rows`, clamped to the view region
fn visible_span(geometry: &Geometry, rows: &Range<usize>) -> Option<(usize, usize)> {
    if rows.is_empty() || geometry.num_bytes() == 0 {
        return None;
    }
    let min = geometry.row_to_addr(rows.start).max(geometry.start_addr());
    let max = geometry
        .row_to_addr(rows.end)
        .saturating_sub(1)
        .min(geometry.end_addr() - 1);
    (min <= max).then_some((min, max))
}

impl HexSession {
    /// Displays the central panel with the hex grid of the session's view
    pub(crate) fn show_central_panel(&mut self, ctx: &egui::Context, palette: &Palette, font_size: f32) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let font = egui::FontId::monospace(font_size);
            self.view.grid_mut().set_metrics(measure_metrics(ui, &font));

            let row_height = self.view.grid().geometry().layout().row_height;
            let total_rows = self.view.grid().geometry().num_rows();

            self.create_step_scroll().show_rows(
                ui,
                row_height,
                total_rows,
                |ui, rect, row_range| {
                    // Collect input events once per frame and store in the app state
                    *self.events.borrow_mut() = collect_ui_events(ui);

                    let canvas = Canvas::new(rect, row_range.start, row_height);
                    self.handle_canvas_input(ui, rect, canvas);
                    self.draw_main_canvas(ui, canvas, row_range, palette, &font);
                },
            );
        });

        // Keep blinking while the cursor is shown
        let now = Instant::now();
        self.view.tick(now);
        if let Some(wait) = self.view.grid().blink().next_toggle_in(now) {
            ctx.request_repaint_after(wait);
        }
    }

    fn handle_canvas_input(&mut self, ui: &mut egui::Ui, rect: egui::Rect, canvas: Canvas) {
        let response = ui.interact(
            rect,
            egui::Id::new(("hex_canvas", self.scroll_id)),
            egui::Sense::click_and_drag(),
        );
        let events = self.events.borrow().clone();
        let now = Instant::now();

        // Focus follows primary presses
        if events.pointer_pressed
            && let Some(pos) = events.pointer_pos
        {
            if response.hovered() {
                if !self.has_focus {
                    self.has_focus = true;
                    self.view.focus_in(now);
                }
                self.jump_to.loose_focus();
                self.jump_to.has_focus = false;
                self.view.press(canvas.point(pos), events.shift_down);
            } else if !rect.contains(pos) && self.has_focus {
                self.has_focus = false;
                self.view.focus_out();
            }
        }

        if self.view.grid().is_pressed()
            && events.pointer_down
            && let Some(pos) = events.pointer_pos
        {
            self.view.drag(canvas.point(pos));
        }

        if events.pointer_released {
            self.view.release();
        }

        if events.double_clicked && response.hovered() {
            self.view.double_click();
        }

        // Right click moves the cursor unless it would drop a selection
        if events.secondary_clicked
            && response.hovered()
            && self.view.grid().selection().is_none()
            && let Some(pos) = events.pointer_pos
        {
            self.view.press(canvas.point(pos), false);
            self.view.release();
        }

        response.context_menu(|ui| self.show_context_menu(ui));

        if !self.has_focus {
            return;
        }

        for (input, modifiers) in events.keys {
            self.view.key(input, modifiers);
        }

        if events.copy && self.view.copy_selection() > 0 {
            let text = self
                .view
                .clipboard()
                .map(|bytes| bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
                .unwrap_or_default();
            ui.ctx().copy_text(text);
        }

        if events.paste {
            let result = self.view.paste_at_cursor();
            self.report(result);
        }

        if events.escape_pressed {
            self.view.grid_mut().clear_selection();
            self.view.pump();
        }
    }

    fn draw_main_canvas(
        &self,
        ui: &egui::Ui,
        canvas: Canvas,
        row_range: Range<usize>,
        palette: &Palette,
        font: &egui::FontId,
    ) {
        let painter = ui.painter();
        let grid = self.view.grid();
        let geometry = grid.geometry();
        let layout = geometry.layout();
        let text_dy = layout.row_padding / 2.0;

        let rows = grid.visible_rows(row_range.clone());

        // Row background alternation
        for row in rows.iter().filter(|r| r.alternate) {
            let top = geometry.row_to_point(row.row);
            let bg = Rect::from_min_size(top, layout.max_x + layout.char_width, layout.row_height);
            painter.rect_filled(canvas.rect(bg), 0.0, colors::ROW_ALT);
        }

        // Highlight regions, drawn in overlay order
        if let Some((min, max)) = visible_span(geometry, &row_range) {
            for region in grid.overlay().regions() {
                if !region.overlaps(min, max) {
                    continue;
                }
                let color = palette.region(region.category());
                let (fill, stroke) = if region.is_active() {
                    (with_alpha(color, REGION_ALPHA), egui::Stroke::new(1.0, color))
                } else {
                    let dark = color.gamma_multiply(0.6);
                    (
                        with_alpha(dark, REGION_ALPHA_INACTIVE),
                        egui::Stroke::new(1.0, dark),
                    )
                };
                let (lo, hi) = (region.addr().max(min), region.last().min(max));
                for ascii in [false, true] {
                    let path = geometry.selection_path(lo, hi, ascii, 0.5);
                    paint_path(painter, canvas, &path, fill, stroke);
                }
            }

            // Selection, the active column in the primary color
            if let Some(selection) = grid.selection() {
                let (lo, hi) = ((*selection.start()).max(min), (*selection.end()).min(max));
                if lo <= hi {
                    for ascii in [false, true] {
                        let color = if ascii == grid.ascii_column_active() {
                            palette.selection
                        } else {
                            palette.selection_alt
                        };
                        let path = geometry.selection_path(lo, hi, ascii, 0.0);
                        paint_path(
                            painter,
                            canvas,
                            &path,
                            with_alpha(color, SELECTION_ALPHA),
                            egui::Stroke::new(1.0, color),
                        );
                    }
                }
            }
        }

        // Glyphs
        for row in &rows {
            let top = geometry.row_to_point(row.row);
            painter.text(
                canvas.pos(Point::new(layout.addr_offset, top.y + text_dy)),
                egui::Align2::LEFT_TOP,
                &row.addr_text,
                font.clone(),
                colors::ADDRESS,
            );
            for cell in &row.cells {
                let color = glyph_color(cell.class);
                painter.text(
                    canvas.pos(Point::new(layout.byte_columns[cell.col], top.y + text_dy)),
                    egui::Align2::LEFT_TOP,
                    &cell.hex_text,
                    font.clone(),
                    color,
                );
                painter.text(
                    canvas.pos(Point::new(layout.ascii_columns[cell.col], top.y + text_dy)),
                    egui::Align2::LEFT_TOP,
                    cell.ascii,
                    font.clone(),
                    color,
                );
            }
        }

        // Cursor
        if let Some(marks) = grid.cursor_marks() {
            let (active, inactive) = if marks.ascii_active {
                (marks.ascii, marks.byte)
            } else {
                (marks.byte, marks.ascii)
            };
            if marks.phase_on {
                painter.rect_filled(canvas.rect(active), 0.0, palette.selection);
            }
            painter.rect_filled(canvas.rect(inactive), 0.0, palette.selection_alt);
        }
    }
}
