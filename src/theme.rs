use egui::epaint::Shadow;
use egui::style::WidgetVisuals;
use egui::{vec2, Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthClass {
    Compact,
    Regular,
    Wide,
}

#[derive(Clone, Debug)]
pub struct AppTheme {
    pub surfaces: SurfaceTokens,
    pub text: TextTokens,
    pub controls: ControlTokens,
    pub layout: LayoutTokens,
    pub breakpoints: Breakpoints,
    pub shadows: ShadowTokens,
    pub canvas: CanvasTokens,
    pub motion: MotionTokens,
}

#[derive(Clone, Debug)]
pub struct SurfaceTokens {
    pub app_bg: Color32,
    pub panel_bg: Color32,
    pub card_bg: Color32,
    pub card_bg_alt: Color32,
    pub stroke_soft: Color32,
    pub stroke_strong: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
}

#[derive(Clone, Debug)]
pub struct TextTokens {
    pub primary: Color32,
    pub secondary: Color32,
    pub muted: Color32,
    pub accent: Color32,
    pub error: Color32,
}

#[derive(Clone, Debug)]
pub struct ControlTokens {
    pub panel_rounding: f32,
    pub chip_rounding: f32,
    pub button_rounding: f32,
    pub toolbar_icon_size: f32,
    pub action_height: f32,
}

#[derive(Clone, Debug)]
pub struct LayoutTokens {
    pub space_1: f32,
    pub space_2: f32,
    pub space_3: f32,
    pub space_4: f32,
    pub panel_padding_x: f32,
    pub panel_padding_y: f32,
    pub control_gap: f32,
    pub group_gap: f32,
    pub toolbar_height: f32,
    pub action_bar_height: f32,
    pub chip_h: f32,
    pub chip_w_tool: f32,
    pub chip_w_segment: f32,
}

#[derive(Clone, Debug)]
pub struct Breakpoints {
    pub compact_max: f32,
    pub regular_max: f32,
}

#[derive(Clone, Debug)]
pub struct ShadowTokens {
    pub ambient: Color32,
    pub elevation: Color32,
    pub focus_ring: Color32,
}

/// Colors for the area around the photo and the overlays egui paints on top of it.
#[derive(Clone, Debug)]
pub struct CanvasTokens {
    pub backdrop: Color32,
    pub backdrop_glow: Color32,
    pub image_shadow: Color32,
    pub banner_bg: Color32,
    pub rounding: f32,
}

#[derive(Clone, Debug)]
pub struct MotionTokens {
    pub normal_ms: u32,
    pub slow_ms: u32,
}

impl AppTheme {
    pub fn width_class(&self, width: f32) -> WidthClass {
        width_class(width, &self.breakpoints)
    }
}

pub fn width_class(width: f32, breakpoints: &Breakpoints) -> WidthClass {
    if width <= breakpoints.compact_max {
        WidthClass::Compact
    } else if width <= breakpoints.regular_max {
        WidthClass::Regular
    } else {
        WidthClass::Wide
    }
}

pub fn editor_theme() -> AppTheme {
    AppTheme {
        surfaces: SurfaceTokens {
            app_bg: Color32::from_rgb(0x16, 0x17, 0x1D),
            panel_bg: Color32::from_rgb(0x1B, 0x1D, 0x24),
            card_bg: Color32::from_rgb(0x22, 0x24, 0x2D),
            card_bg_alt: Color32::from_rgb(0x1F, 0x21, 0x2A),
            stroke_soft: Color32::from_rgba_unmultiplied(255, 255, 255, 26),
            stroke_strong: Color32::from_rgba_unmultiplied(255, 255, 255, 48),
            accent: Color32::from_rgb(0x63, 0x5B, 0xF0),
            accent_soft: Color32::from_rgba_unmultiplied(99, 91, 240, 84),
        },
        text: TextTokens {
            primary: Color32::from_rgb(0xF4, 0xF5, 0xFB),
            secondary: Color32::from_rgb(0xB8, 0xBD, 0xD3),
            muted: Color32::from_rgb(0x88, 0x8F, 0xA8),
            accent: Color32::from_rgb(0xA5, 0xA0, 0xFF),
            error: Color32::from_rgb(0xFF, 0x8A, 0x80),
        },
        controls: ControlTokens {
            panel_rounding: 10.0,
            chip_rounding: 8.0,
            button_rounding: 8.0,
            toolbar_icon_size: 18.0,
            action_height: 28.0,
        },
        layout: LayoutTokens {
            space_1: 4.0,
            space_2: 8.0,
            space_3: 12.0,
            space_4: 16.0,
            panel_padding_x: 12.0,
            panel_padding_y: 8.0,
            control_gap: 8.0,
            group_gap: 12.0,
            toolbar_height: 44.0,
            action_bar_height: 48.0,
            chip_h: 28.0,
            chip_w_tool: 40.0,
            chip_w_segment: 36.0,
        },
        breakpoints: Breakpoints {
            compact_max: 820.0,
            regular_max: 1120.0,
        },
        shadows: ShadowTokens {
            ambient: Color32::from_rgba_unmultiplied(0, 0, 0, 56),
            elevation: Color32::from_rgba_unmultiplied(0, 0, 0, 110),
            focus_ring: Color32::from_rgba_unmultiplied(139, 132, 255, 210),
        },
        canvas: CanvasTokens {
            backdrop: Color32::from_rgb(0x11, 0x12, 0x18),
            backdrop_glow: Color32::from_rgba_unmultiplied(0x22, 0x24, 0x2D, 64),
            image_shadow: Color32::from_rgba_unmultiplied(0, 0, 0, 90),
            banner_bg: Color32::from_rgba_unmultiplied(20, 22, 28, 220),
            rounding: 16.0,
        },
        motion: MotionTokens {
            normal_ms: 180,
            slow_ms: 280,
        },
    }
}

fn widget_visuals(
    visuals: &mut WidgetVisuals,
    fill: Color32,
    border: Color32,
    text: Color32,
    rounding: f32,
) {
    visuals.bg_fill = fill;
    visuals.weak_bg_fill = fill;
    visuals.bg_stroke = Stroke::new(1.0, border);
    visuals.fg_stroke = Stroke::new(1.0, text);
    visuals.rounding = Rounding::same(rounding);
}

pub fn apply_theme(ctx: &Context, theme: &AppTheme) {
    let mut style: Style = (*ctx.style()).clone();

    style.spacing.item_spacing = vec2(theme.layout.control_gap, theme.layout.space_2);
    style.spacing.button_padding = vec2(theme.layout.space_3, theme.layout.space_2);
    style.spacing.menu_margin = egui::Margin::same(theme.layout.space_2);
    style.spacing.window_margin = egui::Margin::same(theme.layout.space_3);
    style.animation_time = theme.motion.normal_ms as f32 / 1000.0;

    style.visuals = Visuals::dark();
    style.visuals.override_text_color = Some(theme.text.primary);
    style.visuals.panel_fill = theme.surfaces.panel_bg;
    style.visuals.window_fill = theme.surfaces.panel_bg;
    style.visuals.faint_bg_color = theme.surfaces.panel_bg;
    style.visuals.extreme_bg_color = theme.surfaces.app_bg;
    style.visuals.window_rounding = Rounding::same(theme.controls.panel_rounding);

    let rounding = theme.controls.button_rounding;
    let widgets = &mut style.visuals.widgets;
    widget_visuals(
        &mut widgets.noninteractive,
        theme.surfaces.panel_bg,
        theme.surfaces.stroke_soft,
        theme.text.secondary,
        rounding,
    );
    widget_visuals(
        &mut widgets.inactive,
        theme.surfaces.card_bg_alt,
        theme.surfaces.stroke_soft,
        theme.text.secondary,
        rounding,
    );
    widget_visuals(
        &mut widgets.hovered,
        theme.surfaces.card_bg,
        theme.surfaces.stroke_strong,
        theme.text.primary,
        rounding,
    );
    widget_visuals(
        &mut widgets.active,
        theme.surfaces.accent_soft,
        theme.surfaces.accent,
        theme.text.primary,
        rounding,
    );
    widget_visuals(
        &mut widgets.open,
        theme.surfaces.card_bg,
        theme.surfaces.stroke_strong,
        theme.text.primary,
        rounding,
    );

    style.visuals.selection.bg_fill = theme.surfaces.accent_soft;
    style.visuals.selection.stroke = Stroke::new(1.0, theme.surfaces.accent);
    style.visuals.popup_shadow = Shadow {
        offset: vec2(0.0, 10.0),
        blur: 22.0,
        spread: 0.0,
        color: theme.shadows.ambient,
    };
    style.visuals.window_shadow = Shadow {
        offset: vec2(0.0, 14.0),
        blur: 28.0,
        spread: 0.0,
        color: theme.shadows.elevation,
    };

    for (text_style, size) in [
        (TextStyle::Heading, 24.0),
        (TextStyle::Body, 15.0),
        (TextStyle::Button, 14.0),
        (TextStyle::Small, 12.0),
    ] {
        style
            .text_styles
            .insert(text_style, FontId::new(size, FontFamily::Proportional));
    }

    ctx.set_style(style);
}
