use egui::{vec2, Align, Color32, Layout, Pos2, Rect, RichText, Stroke, Ui};

use crate::annotation::LineStyle;
use crate::state::{EditorState, MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::style::StyleOptions;
use crate::theme::{self, WidthClass};
use crate::ui_controls;

const PALETTE: [[u8; 4]; 8] = [
    [0x11, 0x18, 0x27, 0xFF],
    [0xE5, 0x3E, 0x3E, 0xFF],
    [0xDD, 0x6B, 0x20, 0xFF],
    [0xD6, 0x9E, 0x2E, 0xFF],
    [0x38, 0xA1, 0x69, 0xFF],
    [0x31, 0x82, 0xCE, 0xFF],
    [0x80, 0x5A, 0xD5, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF],
];

#[derive(Clone, Copy, Debug, Default)]
pub struct ToolbarOutput {
    pub open: bool,
    pub import_suggestions: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct ToolbarPlan {
    pub visible_color_count: usize,
    pub show_line_style_inline: bool,
    pub show_stroke_inline: bool,
    pub show_overflow: bool,
}

/// Palette and line styles only act on a selection, so they give way first when space runs out.
pub fn plan_toolbar_items(width_class: WidthClass, has_selection: bool) -> ToolbarPlan {
    let visible_color_count = match (width_class, has_selection) {
        (_, false) => 0,
        (WidthClass::Compact, true) => 3,
        (WidthClass::Regular, true) => 5,
        (WidthClass::Wide, true) => PALETTE.len(),
    };
    let show_line_style_inline = has_selection && width_class != WidthClass::Compact;
    let show_stroke_inline = width_class != WidthClass::Compact;

    let show_overflow = (has_selection && visible_color_count < PALETTE.len())
        || (has_selection && !show_line_style_inline)
        || !show_stroke_inline;

    ToolbarPlan {
        visible_color_count,
        show_line_style_inline,
        show_stroke_inline,
        show_overflow,
    }
}

pub fn show_toolbar(
    ui: &mut Ui,
    state: &mut EditorState,
    width_class: WidthClass,
) -> ToolbarOutput {
    let theme = theme::editor_theme();
    let selected_line = state
        .selection
        .as_deref()
        .and_then(|id| state.store.get(id))
        .map(|annotation| {
            (
                annotation.line_color_or(state.style.line_color),
                annotation.line_style_or_default(),
            )
        });
    let plan = plan_toolbar_items(width_class, selected_line.is_some());
    let mut out = ToolbarOutput::default();

    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
        ui.spacing_mut().interact_size.y = theme.layout.chip_h;
        ui.spacing_mut().button_padding.y = theme.layout.space_1;
        ui.spacing_mut().item_spacing = vec2(theme.layout.control_gap, 0.0);

        if ui_controls::ghost_button(ui, &theme, "Open", vec2(64.0, theme.layout.chip_h))
            .on_hover_text("Open image (Cmd+O)")
            .clicked()
        {
            out.open = true;
        }

        ui.add_enabled_ui(state.has_image(), |ui| {
            let response = ui_controls::tool_chip(ui, &theme, "", state.is_drawing())
                .on_hover_text("Draw dimension (D)");
            draw_dimension_icon(ui, response.rect, state.is_drawing());
            if response.clicked() {
                state.toggle_drawing();
            }
        });

        if let Some((color, line_style)) = selected_line {
            if plan.visible_color_count > 0 {
                group_separator(ui, &theme);
                for rgba in PALETTE.iter().take(plan.visible_color_count) {
                    palette_chip(ui, state, &theme, *rgba, color == *rgba);
                }
            }
            if plan.show_line_style_inline {
                group_separator(ui, &theme);
                line_style_buttons(ui, state, line_style);
            }
        }

        if plan.show_stroke_inline {
            group_separator(ui, &theme);
            ui.label(RichText::new("Line").color(theme.text.muted).size(12.0));
            stroke_buttons(ui, state);
            label_box_toggle(ui, state);
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            zoom_controls(ui, state);
            ui_controls::vertical_divider(ui, &theme, 18.0);
            style_menu(ui, state, &theme);

            ui.add_enabled_ui(state.has_image(), |ui| {
                if ui_controls::ghost_button(ui, &theme, "Import…", vec2(76.0, theme.layout.chip_h))
                    .on_hover_text("Load suggested annotations from a JSON file")
                    .clicked()
                {
                    out.import_suggestions = true;
                }
            });

            if plan.show_overflow {
                ui.menu_button("…", |ui| {
                    ui.spacing_mut().item_spacing =
                        vec2(theme.layout.control_gap, theme.layout.space_2);

                    if let Some((color, line_style)) = selected_line {
                        if plan.visible_color_count < PALETTE.len() {
                            ui.label(RichText::new("Colors").color(theme.text.muted).size(12.0));
                            ui.horizontal_wrapped(|ui| {
                                ui.spacing_mut().item_spacing =
                                    vec2(theme.layout.control_gap, theme.layout.space_1);
                                for rgba in PALETTE.iter().skip(plan.visible_color_count) {
                                    palette_chip(ui, state, &theme, *rgba, color == *rgba);
                                }
                            });
                        }
                        if !plan.show_line_style_inline {
                            ui.separator();
                            ui.horizontal(|ui| line_style_buttons(ui, state, line_style));
                        }
                    }

                    if !plan.show_stroke_inline {
                        ui.separator();
                        ui.label(RichText::new("Line").color(theme.text.muted).size(12.0));
                        ui.horizontal(|ui| {
                            stroke_buttons(ui, state);
                            label_box_toggle(ui, state);
                        });
                    }
                });
            }
        });
    });

    out
}

fn group_separator(ui: &mut Ui, theme: &theme::AppTheme) {
    ui.separator();
    let extra = (theme.layout.group_gap - theme.layout.control_gap).max(0.0);
    if extra > 0.0 {
        ui.add_space(extra);
    }
}

fn palette_chip(
    ui: &mut Ui,
    state: &mut EditorState,
    theme: &theme::AppTheme,
    rgba: [u8; 4],
    selected: bool,
) {
    let color32 = Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3]);
    if ui_controls::color_chip(ui, theme, color32, selected)
        .on_hover_text("Line color for the selected dimension")
        .clicked()
    {
        state.set_line_color(rgba);
    }
}

fn line_style_buttons(ui: &mut Ui, state: &mut EditorState, current: LineStyle) {
    let theme = theme::editor_theme();
    for line_style in LineStyle::ALL {
        let label = match line_style {
            LineStyle::Solid => "━",
            LineStyle::Dashed => "╍",
            LineStyle::Dotted => "┈",
        };
        if ui_controls::segmented(ui, &theme, label, current == line_style)
            .on_hover_text(line_style.name())
            .clicked()
        {
            state.set_line_style(line_style);
        }
    }
}

fn stroke_buttons(ui: &mut Ui, state: &mut EditorState) {
    let theme = theme::editor_theme();
    for (width, label) in StyleOptions::STROKE_PRESETS.into_iter().zip(["S", "M", "L"]) {
        if ui_controls::segmented(ui, &theme, label, state.style.stroke_width == width)
            .on_hover_text(format!("Stroke width {width}px"))
            .clicked()
        {
            state.set_stroke_width(width);
        }
    }
}

fn label_box_toggle(ui: &mut Ui, state: &mut EditorState) {
    let theme = theme::editor_theme();
    let shown = state.style.show_label_box;
    if ui_controls::segmented(ui, &theme, "▭", shown)
        .on_hover_text("Label background box")
        .clicked()
    {
        state.set_show_label_box(!shown);
    }
}

/// Global defaults: the line color used by annotations without an override, and label text size.
fn style_menu(ui: &mut Ui, state: &mut EditorState, theme: &theme::AppTheme) {
    ui.menu_button("Style", |ui| {
        ui.spacing_mut().item_spacing = vec2(theme.layout.control_gap, theme.layout.space_2);
        ui.label(RichText::new("Default line color").color(theme.text.muted).size(12.0));
        ui.horizontal_wrapped(|ui| {
            for rgba in PALETTE {
                let color32 = Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3]);
                let selected = state.style.line_color == rgba;
                if ui_controls::color_chip(ui, theme, color32, selected).clicked() {
                    state.set_default_line_color(rgba);
                }
            }
        });
        ui.separator();
        let mut font_size = state.style.font_size;
        let response = ui.add(
            egui::Slider::new(&mut font_size, MIN_FONT_SIZE..=MAX_FONT_SIZE)
                .text("Label size")
                .suffix(" px")
                .step_by(1.0),
        );
        if response.changed() {
            state.set_font_size(font_size);
        }
    });
}

fn zoom_controls(ui: &mut Ui, state: &mut EditorState) {
    let theme = theme::editor_theme();
    let size = vec2(theme.layout.chip_h, theme.layout.chip_h);

    ui.add_enabled_ui(state.viewport.can_zoom_in(), |ui| {
        if ui_controls::ghost_button(ui, &theme, "+", size)
            .on_hover_text("Zoom in (Cmd +)")
            .clicked()
        {
            state.zoom_in();
        }
    });
    let percent = format!("{:.0}%", state.viewport.zoom * 100.0);
    if ui_controls::ghost_button(ui, &theme, &percent, vec2(58.0, theme.layout.chip_h))
        .on_hover_text("Reset zoom (Cmd 0)")
        .clicked()
    {
        state.reset_zoom();
    }
    ui.add_enabled_ui(state.viewport.can_zoom_out(), |ui| {
        if ui_controls::ghost_button(ui, &theme, "−", size)
            .on_hover_text("Zoom out (Cmd -)")
            .clicked()
        {
            state.zoom_out();
        }
    });
}

fn draw_dimension_icon(ui: &Ui, rect: Rect, selected: bool) {
    let theme = theme::editor_theme();
    let color = if selected {
        theme.text.primary
    } else {
        theme.text.secondary
    };
    let stroke = Stroke::new(1.65, color);
    let painter = ui.painter();
    let icon_rect = rect.shrink2(vec2(9.0, 7.0));

    let y = icon_rect.center().y;
    let left = Pos2::new(icon_rect.left(), y);
    let right = Pos2::new(icon_rect.right(), y);
    painter.line_segment([left, right], stroke);
    for x in [icon_rect.left(), icon_rect.right()] {
        painter.line_segment(
            [Pos2::new(x, icon_rect.top()), Pos2::new(x, icon_rect.bottom())],
            stroke,
        );
    }
}
