use std::path::PathBuf;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context as EguiContext, Key, TopBottomPanel};
use eframe::{App, Frame};
use tracing::{info, warn};

use crate::action_bar::{self, StatusLine};
use crate::canvas::CanvasView;
use crate::clipboard;
use crate::export;
use crate::interaction::EditorKey;
use crate::prefs::{FilePreferences, MemoryPreferences, PreferenceStore};
use crate::state::{EditorImage, EditorState};
use crate::theme;
use crate::toolbar;
use crate::ui_controls;

const STATUS_SECONDS: f64 = 3.0;
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "gif"];

struct Status {
    text: String,
    is_error: bool,
    until: f64,
}

pub struct DimMarkApp {
    pub state: EditorState,
    canvas: CanvasView,
    theme: theme::AppTheme,
    status: Option<Status>,
}

impl DimMarkApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = theme::editor_theme();
        theme::apply_theme(&cc.egui_ctx, &theme);

        let prefs: Box<dyn PreferenceStore> = match FilePreferences::open_default() {
            Some(prefs) => Box::new(prefs),
            None => {
                warn!("no config directory available, preferences will not persist");
                Box::new(MemoryPreferences::default())
            }
        };

        Self {
            state: EditorState::new(prefs),
            canvas: CanvasView::default(),
            theme,
            status: None,
        }
    }

    fn set_status(&mut self, ctx: &EguiContext, text: impl Into<String>, is_error: bool) {
        let until = ctx.input(|input| input.time) + STATUS_SECONDS;
        self.status = Some(Status {
            text: text.into(),
            is_error,
            until,
        });
    }

    fn report(&mut self, ctx: &EguiContext, what: &str, result: Result<()>) {
        if let Err(err) = result {
            warn!("{what} failed: {err:#}");
            self.set_status(ctx, format!("{what} failed: {err}"), true);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        let text_focus = ctx.wants_keyboard_input();
        let (cmd, shift) = ctx.input(|input| {
            (
                input.modifiers.command || input.modifiers.ctrl,
                input.modifiers.shift,
            )
        });

        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            self.state.key_pressed(EditorKey::Escape, text_focus);
        }

        if !cmd {
            if text_focus {
                return;
            }
            if ctx.input(|input| input.key_pressed(Key::D)) && self.state.has_image() {
                self.state.toggle_drawing();
            }
            if ctx.input(|input| input.key_pressed(Key::Delete)) {
                self.state.key_pressed(EditorKey::Delete, text_focus);
            }
            if ctx.input(|input| input.key_pressed(Key::Backspace)) {
                self.state.key_pressed(EditorKey::Backspace, text_focus);
            }
            return;
        }

        if ctx.input(|input| input.key_pressed(Key::O)) {
            let result = self.open_image();
            self.report(ctx, "Open", result);
        }

        if ctx.input(|input| input.key_pressed(Key::S)) {
            let result = self.save_to_file(ctx);
            self.report(ctx, "Save", result);
        }

        if !text_focus {
            if ctx.input(|input| input.key_pressed(Key::V)) {
                let result = self.paste_image(ctx);
                self.report(ctx, "Paste", result);
            }

            if ctx.input(|input| input.key_pressed(Key::C)) {
                let result = self.copy_to_clipboard(ctx);
                self.report(ctx, "Copy", result);
            }

            if ctx.input(|input| input.key_pressed(Key::Z)) {
                if shift {
                    self.state.redo();
                } else {
                    self.state.undo();
                }
            }
        }

        if ctx.input(|input| input.key_pressed(Key::Plus) || input.key_pressed(Key::Equals)) {
            self.state.zoom_in();
        }

        if ctx.input(|input| input.key_pressed(Key::Minus)) {
            self.state.zoom_out();
        }

        if ctx.input(|input| input.key_pressed(Key::Num0)) {
            self.state.reset_zoom();
        }
    }

    fn open_image(&mut self) -> Result<()> {
        let file = rfd::FileDialog::new()
            .set_title("Open product photo")
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file();
        let Some(path) = file else {
            return Ok(());
        };
        self.load_image_file(path)
    }

    fn load_image_file(&mut self, path: PathBuf) -> Result<()> {
        let image = EditorImage::open(&path)?;
        self.state.set_image(image);
        Ok(())
    }

    fn paste_image(&mut self, ctx: &EguiContext) -> Result<()> {
        let Some(image) = clipboard::read_image_from_clipboard()? else {
            self.set_status(ctx, "No image on the clipboard", false);
            return Ok(());
        };
        self.state.set_image(EditorImage::new(image, None)?);
        Ok(())
    }

    fn copy_to_clipboard(&mut self, ctx: &EguiContext) -> Result<()> {
        let Some(image) = self.state.export_image()? else {
            return Ok(());
        };
        clipboard::write_image_to_clipboard(&image)?;
        info!(
            width = image.width(),
            height = image.height(),
            "copied annotated image"
        );
        self.set_status(ctx, "Copied", false);
        Ok(())
    }

    fn save_to_file(&mut self, ctx: &EguiContext) -> Result<()> {
        if !self.state.has_image() {
            return Ok(());
        }

        let file = rfd::FileDialog::new()
            .set_title("Save annotated image")
            .set_file_name(self.state.export_file_name())
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("PNG", &["png"])
            .save_file();
        let Some(path) = file else {
            return Ok(());
        };

        let Some(image) = self.state.export_image()? else {
            return Ok(());
        };
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        let bytes = if is_png {
            export::encode_png(&image)?
        } else {
            export::encode_jpeg(&image, self.state.export_quality)?
        };
        std::fs::write(&path, bytes)
            .with_context(|| format!("cannot write {}", path.display()))?;

        info!(path = %path.display(), "saved annotated image");
        self.set_status(ctx, "Saved", false);
        Ok(())
    }

    fn import_suggestions(&mut self, ctx: &EguiContext) -> Result<()> {
        let file = rfd::FileDialog::new()
            .set_title("Import suggested dimensions")
            .add_filter("JSON", &["json"])
            .pick_file();
        let Some(path) = file else {
            return Ok(());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let summary = self.state.ingest_candidates(&raw)?;
        let message = match (summary.accepted, summary.rejected) {
            (0, _) => "No usable suggestions in file".to_string(),
            (accepted, 0) => format!("Imported {accepted} dimensions"),
            (accepted, rejected) => format!("Imported {accepted} dimensions, skipped {rejected}"),
        };
        self.set_status(ctx, message, summary.accepted == 0);
        Ok(())
    }
}

impl App for DimMarkApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        self.handle_shortcuts(ctx);

        let now = ctx.input(|input| input.time);
        if self.status.as_ref().is_some_and(|status| status.until < now) {
            self.status = None;
        }

        let toolbar_output = TopBottomPanel::top("toolbar")
            .exact_height(self.theme.layout.toolbar_height)
            .frame(ui_controls::toolbar_frame(&self.theme))
            .show(ctx, |ui| {
                let width_class = self.theme.width_class(ui.available_width());
                toolbar::show_toolbar(ui, &mut self.state, width_class)
            })
            .inner;

        let status = self.status.as_ref().map(|status| StatusLine {
            text: &status.text,
            is_error: status.is_error,
        });
        let action_output = TopBottomPanel::bottom("action_bar")
            .exact_height(self.theme.layout.action_bar_height)
            .frame(ui_controls::action_bar_frame(&self.theme))
            .show(ctx, |ui| {
                let width_class = self.theme.width_class(ui.available_width());
                action_bar::show_action_bar(ui, &self.state, status, width_class)
            })
            .inner;

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surfaces.app_bg)
                    .inner_margin(egui::Margin::symmetric(
                        self.theme.layout.panel_padding_x,
                        self.theme.layout.panel_padding_y + 2.0,
                    )),
            )
            .show(ctx, |ui| {
                self.canvas.show(ui, &mut self.state);
            });

        if toolbar_output.open {
            let result = self.open_image();
            self.report(ctx, "Open", result);
        }
        if toolbar_output.import_suggestions {
            let result = self.import_suggestions(ctx);
            self.report(ctx, "Import", result);
        }

        if action_output.undo {
            self.state.undo();
        }
        if action_output.redo {
            self.state.redo();
        }
        if action_output.clear {
            self.state.clear_annotations();
        }
        if let Some(quality) = action_output.quality {
            self.state.set_export_quality(quality);
        }
        if action_output.copy {
            let result = self.copy_to_clipboard(ctx);
            self.report(ctx, "Copy", result);
        }
        if action_output.save {
            let result = self.save_to_file(ctx);
            self.report(ctx, "Save", result);
        }

        if self.status.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(
                self.theme.motion.slow_ms as u64,
            ));
        }
    }
}
