use egui::{
    vec2, Align2, Color32, ColorImage, Context, CursorIcon, FontId, Id, Key, Painter, Pos2, Rect,
    Response, ScrollArea, Sense, Stroke, TextureHandle, TextureOptions, Ui,
};
use tracing::warn;

use crate::annotation::AnnotationId;
use crate::geometry::Point;
use crate::interaction::Modifiers;
use crate::state::EditorState;
use crate::theme;
use crate::transform::Size;

const CANVAS_MARGIN: f32 = 24.0;

/// Owns the GPU copy of the rendered frame and the bits of pointer bookkeeping egui does not
/// keep for us.
#[derive(Default)]
pub struct CanvasView {
    texture: Option<TextureHandle>,
    rendered_ppp: f32,
    hovering: bool,
    focused_edit: Option<AnnotationId>,
}

impl CanvasView {
    pub fn show(&mut self, ui: &mut Ui, state: &mut EditorState) {
        if !state.has_image() {
            empty_canvas(ui);
            return;
        }

        let available = ui.available_size();
        state.set_container_size(Size::new(
            available.x - CANVAS_MARGIN * 2.0,
            available.y - CANVAS_MARGIN * 2.0,
        ));

        let zoomed = state.viewport.zoomed_size();
        let scaled = vec2(zoomed.width, zoomed.height);
        let canvas_size = vec2(
            (scaled.x + CANVAS_MARGIN * 2.0).max(available.x),
            (scaled.y + CANVAS_MARGIN * 2.0).max(available.y),
        );

        ScrollArea::both()
            .id_source("dimmark_canvas_scroll")
            .show(ui, |ui| {
                let (canvas_rect, response) =
                    ui.allocate_exact_size(canvas_size, Sense::click_and_drag());

                let origin = Pos2::new(
                    canvas_rect.center().x - scaled.x * 0.5,
                    canvas_rect.center().y - scaled.y * 0.5,
                );
                let image_rect = Rect::from_min_size(origin, scaled);
                state.viewport.origin = Point::from_pos2(origin);

                self.handle_pointer(ui, state, &response);
                self.refresh_texture(ui.ctx(), state);

                let theme = theme::editor_theme();
                let painter = ui.painter_at(canvas_rect);
                draw_canvas_background(&painter, canvas_rect);
                painter.rect_filled(image_rect.expand(6.0), 10.0, theme.canvas.image_shadow);
                if let Some(texture) = self.texture.as_ref() {
                    painter.image(
                        texture.id(),
                        image_rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }

                draw_instructions(&painter, state, image_rect);
                self.inline_editor(ui, state);
                update_cursor(ui.ctx(), state, &response);
            });
    }

    fn handle_pointer(&mut self, ui: &Ui, state: &mut EditorState, response: &Response) {
        let (modifiers, pressed, released, moving, hover_pos) = ui.input(|input| {
            (
                Modifiers {
                    snap: input.modifiers.shift,
                },
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.is_moving(),
                input.pointer.hover_pos(),
            )
        });
        let hovered = response.hovered();

        if let Some(pos) = hover_pos.map(Point::from_pos2) {
            if hovered && pressed {
                state.pointer_down(pos, modifiers);
            }
            if (hovered || state.is_dragging()) && (moving || pressed) {
                state.pointer_move(pos, modifiers);
            }
            if response.double_clicked() && state.double_click(pos) {
                self.focused_edit = None;
            }
        }
        if released {
            state.pointer_up();
        }
        if self.hovering && !hovered && !state.is_dragging() {
            state.pointer_leave();
        }
        self.hovering = hovered;
    }

    fn refresh_texture(&mut self, ctx: &Context, state: &mut EditorState) {
        let ppp = ctx.pixels_per_point();
        let dirty = state.take_dirty();
        if !dirty && self.texture.is_some() && self.rendered_ppp == ppp {
            return;
        }

        match state.render_frame(ppp) {
            Ok(Some(pixmap)) => {
                let size = [pixmap.width() as usize, pixmap.height() as usize];
                let image = ColorImage::from_rgba_premultiplied(size, pixmap.data());
                match self.texture.as_mut() {
                    Some(texture) => texture.set(image, TextureOptions::LINEAR),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("dimmark_canvas", image, TextureOptions::LINEAR));
                    }
                }
                self.rendered_ppp = ppp;
            }
            Ok(None) => self.texture = None,
            Err(err) => warn!("canvas render failed: {err:#}"),
        }
    }

    /// Single-line value editor floating over the label being edited. Enter or clicking away
    /// commits; Escape is handled with the other global keys.
    fn inline_editor(&mut self, ui: &mut Ui, state: &mut EditorState) {
        let Some(edit) = state.inline_edit().cloned() else {
            self.focused_edit = None;
            return;
        };
        let Some(label_pos) = state.store.get(&edit.id).map(|a| a.label_pos) else {
            return;
        };
        let anchor = state.viewport.canvas_to_screen(label_pos).to_pos2();
        let theme = theme::editor_theme();

        let mut buffer = edit.buffer.clone();
        let mut commit = false;
        egui::Area::new(Id::new("dimmark_inline_edit"))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor - vec2(64.0, 18.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::none()
                    .fill(theme.surfaces.card_bg)
                    .rounding(egui::Rounding::same(theme.controls.chip_rounding))
                    .stroke(Stroke::new(1.0, theme.surfaces.accent))
                    .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                    .show(ui, |ui| {
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut buffer)
                                .desired_width(112.0)
                                .hint_text("Value"),
                        );
                        if self.focused_edit.as_deref() != Some(edit.id.as_str()) {
                            response.request_focus();
                            self.focused_edit = Some(edit.id.clone());
                        }
                        let escaped = ui.input(|input| input.key_pressed(Key::Escape));
                        commit = response.lost_focus() && !escaped;
                    });
            });

        if let Some(current) = state.inline_edit_mut() {
            current.buffer = buffer;
        }
        if commit {
            state.commit_inline_edit();
            self.focused_edit = None;
        }
    }
}

fn update_cursor(ctx: &Context, state: &EditorState, response: &Response) {
    if !response.hovered() {
        return;
    }
    let icon = if state.is_drawing() {
        CursorIcon::Crosshair
    } else if state.is_dragging() {
        CursorIcon::Grabbing
    } else if state
        .pointer
        .and_then(|pos| state.hit_test(pos))
        .is_some()
    {
        CursorIcon::Grab
    } else {
        CursorIcon::Default
    };
    ctx.set_cursor_icon(icon);
}

fn draw_instructions(painter: &Painter, state: &EditorState, image_rect: Rect) {
    let Some(step) = state.drawing_step() else {
        return;
    };
    let theme = theme::editor_theme();
    let anchor = Pos2::new(image_rect.center().x, image_rect.top() + 22.0);
    let galley = painter.layout_no_wrap(
        step.instructions().to_string(),
        FontId::proportional(14.0),
        theme.text.primary,
    );
    let bg = Rect::from_center_size(anchor, galley.size() + vec2(20.0, 10.0));
    painter.rect_filled(bg, 8.0, theme.canvas.banner_bg);
    painter.text(
        anchor,
        Align2::CENTER_CENTER,
        step.instructions(),
        FontId::proportional(14.0),
        theme.text.primary,
    );
}

fn empty_canvas(ui: &mut Ui) {
    let theme = theme::editor_theme();
    let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, theme.canvas.rounding, theme.canvas.backdrop);
    painter.rect_stroke(
        rect,
        theme.canvas.rounding,
        Stroke::new(1.0, theme.surfaces.stroke_soft),
    );
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "Open a product photo (Cmd+O) or paste one (Cmd+V)",
        FontId::proportional(19.0),
        theme.text.secondary,
    );
}

fn draw_canvas_background(painter: &Painter, rect: Rect) {
    let theme = theme::editor_theme();
    painter.rect_filled(rect, theme.canvas.rounding, theme.canvas.backdrop);

    let top = Rect::from_min_max(
        rect.min,
        Pos2::new(rect.max.x, rect.min.y + rect.height() * 0.55),
    );
    painter.rect_filled(top, theme.canvas.rounding, theme.canvas.backdrop_glow);
}
