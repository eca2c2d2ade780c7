//! Controls floated over the map: base layer switcher, zoom buttons and the
//! attribution line of the layer being shown.

use egui::{Align2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::map::base_layer::BaseLayerId;
use crate::map::view::MapView;

#[derive(Default, Clone, Serialize, Deserialize)]
pub struct LayerControlState {
    expanded: bool,
}

impl LayerControlState {
    pub fn load(ctx: &egui::Context, id: egui::Id) -> Self {
        ctx.data_mut(|d| d.get_persisted::<Self>(id).unwrap_or_default())
    }

    pub fn store(self, ctx: &egui::Context, id: egui::Id) {
        ctx.data_mut(|d| d.insert_persisted(id, self));
    }
}

pub fn layer_control(ctx: &egui::Context, map_rect: Rect, view: &mut MapView) {
    let id = view.container_id().with("layer_control");
    let mut state = LayerControlState::load(ctx, id);

    egui::Area::new(id)
        .fixed_pos(map_rect.right_top() + Vec2::new(-10.0, 10.0))
        .pivot(Align2::RIGHT_TOP)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                if !state.expanded {
                    if ui.button("Layers").clicked() {
                        state.expanded = true;
                    }
                    return;
                }

                let mut selected = view.base_layer();
                for layer in BaseLayerId::ALL {
                    ui.radio_value(&mut selected, layer, layer.name());
                }
                view.set_base_layer(selected);

                ui.separator();
                if ui.small_button("Hide").clicked() {
                    state.expanded = false;
                }
            });
        });

    state.store(ctx, id);
}

pub fn zoom_buttons(ctx: &egui::Context, map_rect: Rect, view: &mut MapView) {
    egui::Area::new(view.container_id().with("zoom_buttons"))
        .fixed_pos(map_rect.left_top() + Vec2::new(10.0, 10.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                let size = Vec2::splat(26.0);
                let can_zoom_in = view.zoom() < view.max_zoom();
                let can_zoom_out = view.zoom() > 0.0;

                if ui
                    .add_enabled(can_zoom_in, egui::Button::new("+").min_size(size))
                    .on_hover_text("Zoom in")
                    .clicked()
                {
                    view.zoom_by(1.0, Vec2::ZERO);
                }
                if ui
                    .add_enabled(can_zoom_out, egui::Button::new("−").min_size(size))
                    .on_hover_text("Zoom out")
                    .clicked()
                {
                    view.zoom_by(-1.0, Vec2::ZERO);
                }
            });
        });
}

pub fn attribution(ctx: &egui::Context, map_rect: Rect, view: &MapView) {
    let layer = view.base_layer().layer();

    egui::Area::new(view.container_id().with("attribution"))
        .fixed_pos(map_rect.right_bottom())
        .pivot(Align2::RIGHT_BOTTOM)
        .interactable(true)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(ui.visuals().window_fill.gamma_multiply(0.8))
                .inner_margin(egui::Margin::symmetric(6.0, 2.0))
                .show(ui, |ui| {
                    ui.style_mut().override_text_style = Some(egui::TextStyle::Small);
                    ui.hyperlink_to(layer.attribution, layer.attribution_url);
                });
        });
}
