use egui::style::{Selection, WidgetVisuals, Widgets};
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

const BACKGROUND: Color32 = Color32::from_rgb(32, 33, 36);

fn widget(bg_fill: Color32, border: Color32, text: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill,
        weak_bg_fill: bg_fill,
        bg_stroke: Stroke::new(1.0, border),
        fg_stroke: Stroke::new(1.0, text),
        rounding: Rounding::same(4.0),
        expansion,
    }
}

/// Dark style for the toolbar and the controls floated over the map.
pub fn dark_style(ctx: &egui::Context) -> Style {
    let mut style = (*ctx.style()).clone();

    style.text_styles = [
        (TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
    ]
    .into();

    style.visuals = Visuals::dark();
    style.visuals.override_text_color = Some(Color32::LIGHT_GRAY);
    style.visuals.widgets = Widgets {
        noninteractive: widget(BACKGROUND, Color32::from_gray(60), Color32::LIGHT_GRAY, 0.0),
        inactive: widget(Color32::from_gray(45), Color32::from_gray(75), Color32::LIGHT_GRAY, 0.0),
        hovered: widget(Color32::from_gray(55), Color32::WHITE, Color32::WHITE, 0.5),
        active: widget(Color32::from_gray(65), Color32::WHITE, Color32::WHITE, 1.0),
        open: widget(Color32::from_gray(40), Color32::WHITE, Color32::WHITE, 0.0),
    };
    style.visuals.selection = Selection {
        bg_fill: Color32::from_rgb(52, 101, 164),
        stroke: Stroke::new(1.0, Color32::WHITE),
    };

    style.visuals.window_rounding = Rounding::same(6.0);
    style.visuals.window_fill = BACKGROUND;
    style.visuals.window_stroke = Stroke::new(1.0, Color32::from_gray(60));
    style.visuals.panel_fill = BACKGROUND;
    style.spacing.window_margin = egui::Margin::same(6.0);

    style
}
