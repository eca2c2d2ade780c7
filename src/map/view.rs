use egui::Vec2;

use super::base_layer::BaseLayerId;
use super::map_tile::{project, unproject, Coordinate, WorldPoint};
use super::popup::Popup;

/// The state a map widget draws: what it is centred on, how far it is zoomed
/// in, which base layer is showing and which popup (if any) is open.
#[derive(Debug, Clone)]
pub struct MapView {
    container_id: Option<egui::Id>,
    center: Coordinate,
    zoom: f64,
    base_layer: BaseLayerId,
    popup: Option<Popup>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            container_id: None,
            center: Coordinate::default(),
            zoom: 0.0,
            base_layer: BaseLayerId::default(),
            popup: None,
        }
    }
}

impl MapView {
    pub fn initialize(
        &mut self,
        container_id: impl std::hash::Hash,
        initial_center: Coordinate,
        initial_zoom: f64,
        default_layer: BaseLayerId,
    ) {
        self.container_id = Some(egui::Id::new(container_id));
        self.base_layer = default_layer;
        self.popup = None;
        self.set_view(initial_center, initial_zoom);
        log::info!(
            "map initialized at ({}, {}) zoom {} with {}",
            self.center.latitude(),
            self.center.longitude(),
            self.zoom,
            self.base_layer
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.container_id.is_some()
    }

    /// Id of the widget this view is bound to. Uninitialized views fall back
    /// to a fixed id so they still render.
    pub fn container_id(&self) -> egui::Id {
        self.container_id.unwrap_or_else(|| egui::Id::new("map"))
    }

    pub fn set_view(&mut self, center: Coordinate, zoom: f64) {
        self.center = center;
        self.zoom = self.clamp_zoom(zoom);
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn base_layer(&self) -> BaseLayerId {
        self.base_layer
    }

    /// Switch the visible base layer, pulling the zoom back in range if the
    /// new layer does not go as deep.
    pub fn set_base_layer(&mut self, layer: BaseLayerId) {
        if layer != self.base_layer {
            log::info!("base layer switched to {}", layer);
            self.base_layer = layer;
            self.zoom = self.clamp_zoom(self.zoom);
        }
    }

    pub fn max_zoom(&self) -> f64 {
        self.base_layer.layer().max_zoom as f64
    }

    pub fn open_popup(&mut self, popup: Popup) {
        self.popup = Some(popup);
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Move the map so content under the pointer follows a drag of `delta`
    /// screen points.
    pub fn pan_by(&mut self, delta: Vec2) {
        let center = project(self.center, self.zoom).offset(-delta.x as f64, -delta.y as f64);
        self.center = wrap_longitude(unproject(center, self.zoom));
    }

    /// Change zoom by `delta` levels keeping the point `focus` (an offset from
    /// the widget centre, in screen points) fixed on screen.
    pub fn zoom_by(&mut self, delta: f64, focus: Vec2) {
        let new_zoom = self.clamp_zoom(self.zoom + delta);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let focus_world = project(self.center, self.zoom).offset(focus.x as f64, focus.y as f64);
        let focus_coordinate = unproject(focus_world, self.zoom);
        let new_center = project(focus_coordinate, new_zoom).offset(-focus.x as f64, -focus.y as f64);

        self.zoom = new_zoom;
        self.center = wrap_longitude(unproject(new_center, new_zoom));
    }

    /// Screen offset of `coordinate` from the widget centre.
    pub fn screen_offset(&self, coordinate: Coordinate) -> Vec2 {
        let center = project(self.center, self.zoom);
        let point = project(coordinate, self.zoom);
        Vec2::new((point.x - center.x) as f32, (point.y - center.y) as f32)
    }

    /// World-space position of the widget centre.
    pub fn center_world(&self) -> WorldPoint {
        project(self.center, self.zoom)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(0.0, self.max_zoom())
    }
}

fn wrap_longitude(coordinate: Coordinate) -> Coordinate {
    let longitude = (coordinate.longitude() + 180.0).rem_euclid(360.0) - 180.0;
    Coordinate::new(coordinate.latitude(), longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::popup::PopupContent;
    use approx::assert_abs_diff_eq;

    const JOGJA: Coordinate = Coordinate::new(-7.770939335714962, 110.37761533840921);

    fn initialized() -> MapView {
        let mut view = MapView::default();
        view.initialize("mapId", JOGJA, 11.0, BaseLayerId::Street);
        view
    }

    #[test]
    fn initialize_sets_view_and_layer() {
        let mut view = MapView::default();
        assert!(!view.is_initialized());
        view.initialize("mapId", JOGJA, 11.0, BaseLayerId::Positron);

        assert!(view.is_initialized());
        assert_eq!(view.container_id(), egui::Id::new("mapId"));
        assert_eq!(view.center(), JOGJA);
        assert_eq!(view.zoom(), 11.0);
        assert_eq!(view.base_layer(), BaseLayerId::Positron);
        assert!(view.popup().is_none());
    }

    #[test]
    fn zoom_is_clamped_to_layer_range() {
        let mut view = initialized();
        view.set_view(JOGJA, 25.0);
        assert_eq!(view.zoom(), 19.0);
        view.set_view(JOGJA, -3.0);
        assert_eq!(view.zoom(), 0.0);
    }

    #[test]
    fn switching_to_a_shallower_layer_pulls_zoom_back() {
        let mut view = initialized();
        view.set_base_layer(BaseLayerId::Positron);
        view.set_view(JOGJA, 20.0);
        view.set_base_layer(BaseLayerId::Topographic);
        assert_eq!(view.zoom(), 17.0);
    }

    #[test]
    fn close_popup_dismisses_it() {
        let mut view = initialized();
        view.open_popup(Popup::at(
            JOGJA,
            PopupContent {
                label: "here",
                image_url: None,
            },
        ));
        assert!(view.popup().is_some());
        view.close_popup();
        assert!(view.popup().is_none());
    }

    #[test]
    fn center_projects_to_the_middle() {
        let view = initialized();
        assert_eq!(view.screen_offset(JOGJA), Vec2::ZERO);
    }

    #[test]
    fn panning_moves_content_with_the_pointer() {
        let mut view = initialized();
        let east = Coordinate::new(JOGJA.latitude(), JOGJA.longitude() + 0.05);
        let before = view.screen_offset(east);

        view.pan_by(Vec2::new(-40.0, 10.0));

        let after = view.screen_offset(east);
        assert_abs_diff_eq!(after.x, before.x - 40.0, epsilon = 1e-2);
        assert_abs_diff_eq!(after.y, before.y + 10.0, epsilon = 1e-2);
    }

    #[test]
    fn zooming_keeps_the_focus_point_fixed() {
        let mut view = initialized();
        let focus = Vec2::new(120.0, -80.0);
        let under_pointer = unproject(view.center_world().offset(120.0, -80.0), view.zoom());

        view.zoom_by(1.5, focus);

        assert_abs_diff_eq!(view.zoom(), 12.5, epsilon = 1e-12);
        let offset = view.screen_offset(under_pointer);
        assert_abs_diff_eq!(offset.x, focus.x, epsilon = 1e-2);
        assert_abs_diff_eq!(offset.y, focus.y, epsilon = 1e-2);
    }

    #[test]
    fn panning_across_the_antimeridian_wraps() {
        let mut view = MapView::default();
        view.initialize("mapId", Coordinate::new(0.0, 179.9), 3.0, BaseLayerId::Street);
        view.pan_by(Vec2::new(-20.0, 0.0));
        assert!(view.center().longitude() < -170.0);
    }
}
