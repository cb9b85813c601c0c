use egui::{vec2, Align, ComboBox, Layout, RichText, Ui};

use crate::state::EditorState;
use crate::theme::{self, WidthClass};
use crate::ui_controls;

const QUALITY_CHOICES: [f32; 5] = [1.0, 0.92, 0.85, 0.75, 0.6];

#[derive(Clone, Copy, Debug, Default)]
pub struct ActionBarOutput {
    pub undo: bool,
    pub redo: bool,
    pub clear: bool,
    pub copy: bool,
    pub save: bool,
    pub quality: Option<f32>,
}

/// Transient message shown at the left of the action bar.
#[derive(Clone, Debug)]
pub struct StatusLine<'a> {
    pub text: &'a str,
    pub is_error: bool,
}

pub fn should_show_shortcut_label(width_class: WidthClass, available_width: f32) -> bool {
    match width_class {
        WidthClass::Compact => available_width >= 420.0,
        WidthClass::Regular | WidthClass::Wide => true,
    }
}

pub fn quality_label(quality: f32) -> String {
    format!("JPEG {:.0}%", quality * 100.0)
}

pub fn show_action_bar(
    ui: &mut Ui,
    state: &EditorState,
    status: Option<StatusLine<'_>>,
    width_class: WidthClass,
) -> ActionBarOutput {
    let theme = theme::editor_theme();
    let action_h = theme.controls.action_height;
    let button_gap = theme.layout.space_3 + 2.0;
    let group_gap = theme.layout.space_4 + 4.0;
    let compact = width_class == WidthClass::Compact;
    let undo_w = if compact { 88.0 } else { 98.0 };
    let copy_w = if compact { 96.0 } else { 108.0 };
    let save_w = if compact { 92.0 } else { 108.0 };
    let undo_redo_w = undo_w * 3.0 + button_gap * 2.0;
    let copy_save_w = copy_w + save_w + button_gap + 120.0;
    let shortcut_visible = should_show_shortcut_label(
        width_class,
        ui.available_width() - undo_redo_w - copy_save_w,
    );

    let mut out = ActionBarOutput::default();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing = vec2(button_gap, 0.0);

        let undo_button = ui.add_enabled_ui(state.store.can_undo(), |ui| {
            ui_controls::ghost_button(ui, &theme, "↩ Undo", vec2(undo_w, action_h))
        });
        if undo_button.inner.on_hover_text("Cmd+Z").clicked() {
            out.undo = true;
        }

        let redo_button = ui.add_enabled_ui(state.store.can_redo(), |ui| {
            ui_controls::ghost_button(ui, &theme, "↪ Redo", vec2(undo_w, action_h))
        });
        if redo_button.inner.on_hover_text("Cmd+Shift+Z").clicked() {
            out.redo = true;
        }

        let clear_button = ui.add_enabled_ui(!state.store.is_empty(), |ui| {
            ui_controls::ghost_button(ui, &theme, "Clear all", vec2(undo_w, action_h))
        });
        if clear_button.inner.clicked() {
            out.clear = true;
        }

        ui.add_space(group_gap);

        if let Some(status) = status.as_ref().filter(|_| !compact) {
            if status.is_error {
                ui.label(RichText::new(status.text).color(theme.text.error).size(12.0));
            } else {
                ui_controls::subtle_badge(ui, &theme, status.text);
            }
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.add_space(theme.layout.space_2);

            if shortcut_visible {
                ui_controls::keycap(ui, &theme, "S");
                ui.add_space(theme.layout.space_2);
                ui_controls::keycap(ui, &theme, "⌘");
                ui.add_space(theme.layout.space_3);
                ui_controls::vertical_divider(ui, &theme, 16.0);
                ui.add_space(theme.layout.space_3);
            }

            let save_button = ui.add_enabled_ui(state.has_image(), |ui| {
                ui_controls::primary_button(ui, &theme, "Save JPG", vec2(save_w, action_h))
            });
            let mut save_response = save_button.inner;
            if !shortcut_visible {
                save_response = save_response.on_hover_text("⌘S");
            }
            if save_response.clicked() {
                out.save = true;
            }

            let copy_button = ui.add_enabled_ui(state.has_image(), |ui| {
                ui_controls::ghost_button(ui, &theme, "Copy", vec2(copy_w, action_h))
            });
            if copy_button.inner.on_hover_text("⌘C").clicked() {
                out.copy = true;
            }

            let mut quality = state.export_quality;
            ComboBox::from_id_source("dimmark_export_quality")
                .selected_text(quality_label(quality))
                .width(104.0)
                .show_ui(ui, |ui| {
                    for choice in QUALITY_CHOICES {
                        ui.selectable_value(&mut quality, choice, quality_label(choice));
                    }
                });
            if quality != state.export_quality {
                out.quality = Some(quality);
            }
        });
    });

    out
}

#[cfg(test)]
mod tests {
    use super::{quality_label, should_show_shortcut_label};
    use crate::theme::WidthClass;

    #[test]
    fn action_bar_compact_hides_shortcut_label_first() {
        assert!(!should_show_shortcut_label(WidthClass::Compact, 320.0));
        assert!(should_show_shortcut_label(WidthClass::Compact, 420.0));
        assert!(should_show_shortcut_label(WidthClass::Regular, 320.0));
    }

    #[test]
    fn quality_label_is_a_percentage() {
        assert_eq!(quality_label(1.0), "JPEG 100%");
        assert_eq!(quality_label(0.85), "JPEG 85%");
    }
}
