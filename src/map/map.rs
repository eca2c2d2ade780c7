use egui::epaint::{Color32, Pos2, Rect, Shape, Stroke};
use egui::{pos2, vec2, Align2, CursorIcon, Response, Sense, Ui, Vec2, Widget};
use lru::LruCache;

use super::map_tile::{project, MapTile, TileId, TileKey, TILE_SIZE};
use super::marker::{Marker, MarkerIcon, MarkerId};
use super::popup::POPUP_WIDTH;
use super::view::MapView;

/// Scroll distance, in points, that zooms by one level.
const SCROLL_PER_ZOOM_LEVEL: f32 = 200.0;

/// What happened on the map during one frame.
#[derive(Debug, Default)]
pub struct MapOutput {
    /// Tiles that were needed but not cached, in draw order.
    pub missing_tiles: Vec<TileKey>,
    pub clicked_marker: Option<MarkerId>,
    /// The bare map (not a marker or the popup) was clicked.
    pub background_clicked: bool,
    pub popup_closed: bool,
}

/// A tile to draw and where, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub id: TileId,
    pub rect: Rect,
}

pub struct Map<'a> {
    view: &'a mut MapView,
    markers: &'a [Marker],
    tile_cache: &'a mut LruCache<TileKey, MapTile>,
    marker_icon: Option<&'a egui::TextureHandle>,
    popup_image: Option<&'a egui::TextureHandle>,
    output: &'a mut MapOutput,
}

impl<'a> Map<'a> {
    pub fn new(
        view: &'a mut MapView,
        markers: &'a [Marker],
        tile_cache: &'a mut LruCache<TileKey, MapTile>,
        output: &'a mut MapOutput,
    ) -> Self {
        Self {
            view,
            markers,
            tile_cache,
            marker_icon: None,
            popup_image: None,
            output,
        }
    }

    /// Image drawn for every marker. Without one a plain pin is painted.
    pub fn marker_icon(mut self, texture: Option<&'a egui::TextureHandle>) -> Self {
        self.marker_icon = texture;
        self
    }

    /// Loaded image for the open popup, if it has one and it has arrived.
    pub fn popup_image(mut self, texture: Option<&'a egui::TextureHandle>) -> Self {
        self.popup_image = texture;
        self
    }

    fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if response.dragged() {
            self.view.pan_by(response.drag_delta());
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        }

        let Some(pointer) = response.hover_pos() else {
            return;
        };
        let focus = pointer - rect.center();

        // Pinch, or ctrl + scroll.
        let zoom_delta = ui.input(|i| i.zoom_delta());
        if (zoom_delta - 1.0).abs() > f32::EPSILON {
            self.view.zoom_by(zoom_delta.log2() as f64, focus);
            return;
        }

        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > f32::EPSILON {
            self.view.zoom_by((scroll / SCROLL_PER_ZOOM_LEVEL) as f64, focus);
        }
    }

    fn paint_tiles(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let layer = self.view.base_layer();
        let full_uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

        for tile in visible_tiles(self.view, rect) {
            let key = (layer, tile.id);
            match self.tile_cache.get_mut(&key) {
                Some(map_tile) => {
                    let texture = map_tile.texture(ui.ctx());
                    painter.image(texture.id(), tile.rect, full_uv, Color32::WHITE);
                }
                None => {
                    painter.rect_filled(tile.rect.shrink(0.5), 0.0, Color32::from_gray(58));
                    if !self.output.missing_tiles.contains(&key) {
                        self.output.missing_tiles.push(key);
                    }
                }
            }
        }
    }

    fn markers_ui(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);

        for marker in self.markers {
            let tip = rect.center() + self.view.screen_offset(marker.location.coordinates);
            let icon_rect = icon_rect(tip, marker.icon);
            if !rect.intersects(icon_rect) {
                continue;
            }

            let response = ui
                .interact(icon_rect, self.view.container_id().with(marker.id), Sense::click())
                .on_hover_cursor(CursorIcon::PointingHand)
                .on_hover_text(marker.location.label);
            if response.clicked() {
                self.output.clicked_marker = Some(marker.id);
            }

            match self.marker_icon {
                Some(texture) => {
                    painter.image(
                        texture.id(),
                        icon_rect,
                        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                None => paint_pin(&painter, icon_rect, marker.icon),
            }
        }
    }

    fn popup_ui(&mut self, ui: &Ui, rect: Rect) {
        let Some(popup) = self.view.popup().cloned() else {
            return;
        };

        let tip = rect.center() + self.view.screen_offset(popup.coordinates) + popup.offset;
        if !rect.contains(tip) {
            return;
        }

        let popup_image = self.popup_image;
        let output = &mut *self.output;
        egui::Area::new(self.view.container_id().with("popup").with(popup.content.label))
            .order(egui::Order::Foreground)
            .fixed_pos(tip - vec2(0.0, 6.0))
            .pivot(Align2::CENTER_BOTTOM)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(POPUP_WIDTH);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        if ui.small_button("×").clicked() {
                            output.popup_closed = true;
                        }
                    });
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new(popup.content.label).strong().size(12.0));
                        if let Some(texture) = popup_image {
                            let [w, h] = texture.size();
                            let height = POPUP_WIDTH * h as f32 / (w as f32).max(1.0);
                            ui.add_space(6.0);
                            ui.add(
                                egui::Image::from_texture((texture.id(), vec2(POPUP_WIDTH, height)))
                                    .rounding(4.0),
                            );
                        }
                    });
                });
            });
    }
}

impl<'a> Widget for Map<'a> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        self.handle_input(ui, rect, &response);

        ui.painter().rect_filled(rect, 0.0, Color32::from_gray(40));
        self.paint_tiles(ui, rect);
        self.markers_ui(ui, rect);
        self.popup_ui(ui, rect);

        if response.clicked() {
            self.output.background_clicked = true;
        }

        response
    }
}

/// Screen rectangle of a marker icon whose anchor sits on `tip`.
pub fn icon_rect(tip: Pos2, icon: MarkerIcon) -> Rect {
    Rect::from_min_size(tip - icon.anchor(), icon.size())
}

/// Tiles covering `viewport` for the current view. Tiles are taken from the
/// nearest whole zoom the layer serves and scaled to the fractional zoom;
/// x wraps around the antimeridian, rows outside the world are skipped.
pub fn visible_tiles(view: &MapView, viewport: Rect) -> Vec<VisibleTile> {
    let max_tile_zoom = view.base_layer().layer().max_zoom;
    let tile_zoom = (view.zoom().floor().max(0.0) as u8).min(max_tile_zoom);
    let scale = 2.0_f64.powf(view.zoom() - tile_zoom as f64);
    let tiles_per_axis = TileId::tiles_per_axis(tile_zoom) as i64;

    let center = project(view.center(), tile_zoom as f64);
    let half_width = viewport.width() as f64 / 2.0 / scale;
    let half_height = viewport.height() as f64 / 2.0 / scale;

    let min_x = ((center.x - half_width) / TILE_SIZE).floor() as i64;
    let max_x = ((center.x + half_width) / TILE_SIZE).ceil() as i64 - 1;
    let min_y = (((center.y - half_height) / TILE_SIZE).floor() as i64).max(0);
    let max_y = (((center.y + half_height) / TILE_SIZE).ceil() as i64 - 1).min(tiles_per_axis - 1);

    let origin = viewport.center();
    let tile_extent = (TILE_SIZE * scale) as f32;
    let mut tiles = Vec::new();

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let min = pos2(
                origin.x + ((x as f64 * TILE_SIZE - center.x) * scale) as f32,
                origin.y + ((y as f64 * TILE_SIZE - center.y) * scale) as f32,
            );
            tiles.push(VisibleTile {
                id: TileId::new(tile_zoom, x.rem_euclid(tiles_per_axis) as u32, y as u32),
                rect: Rect::from_min_size(min, Vec2::splat(tile_extent)),
            });
        }
    }

    tiles
}

fn paint_pin(painter: &egui::Painter, rect: Rect, icon: MarkerIcon) {
    let fill = match icon {
        MarkerIcon::Normal => Color32::from_rgb(220, 60, 50),
        MarkerIcon::Active => Color32::from_rgb(245, 120, 30),
    };
    let stroke = Stroke::new(1.5, Color32::from_black_alpha(180));
    let radius = rect.width() * 0.32;
    let head = pos2(rect.center().x, rect.top() + radius + 1.0);

    painter.add(Shape::convex_polygon(
        vec![
            head + vec2(-radius * 0.8, radius * 0.6),
            pos2(rect.center().x, rect.bottom()),
            head + vec2(radius * 0.8, radius * 0.6),
        ],
        fill,
        Stroke::NONE,
    ));
    painter.circle(head, radius, fill, stroke);
    painter.circle_filled(head, radius * 0.4, Color32::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LOCATIONS;
    use crate::map::base_layer::BaseLayerId;
    use crate::map::map_tile::Coordinate;
    use crate::map::marker::MarkerManager;
    use approx::assert_abs_diff_eq;
    use std::num::NonZeroUsize;

    const JOGJA: Coordinate = Coordinate::new(-7.770939335714962, 110.37761533840921);

    fn view(center: Coordinate, zoom: f64) -> MapView {
        let mut view = MapView::default();
        view.initialize("test", center, zoom, BaseLayerId::Street);
        view
    }

    #[test]
    fn tiles_cover_the_viewport() {
        let viewport = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let tiles = visible_tiles(&view(JOGJA, 11.0), viewport);

        assert!(tiles.iter().all(|t| t.id.zoom == 11));
        for t in &tiles {
            assert_abs_diff_eq!(t.rect.width(), 256.0, epsilon = 1e-3);
        }

        let covered = tiles
            .iter()
            .map(|t| t.rect)
            .reduce(|a, b| a.union(b))
            .unwrap();
        assert!(covered.contains_rect(viewport));
        // 800 px needs 4 or 5 columns, 600 px 3 or 4 rows.
        assert!(tiles.len() <= 5 * 4);
        assert!(tiles.iter().any(|t| t.id == TileId::containing(JOGJA, 11)));
    }

    #[test]
    fn fractional_zoom_scales_the_lower_tiles() {
        let viewport = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 400.0));
        let tiles = visible_tiles(&view(JOGJA, 12.5), viewport);

        assert!(tiles.iter().all(|t| t.id.zoom == 12));
        assert_abs_diff_eq!(tiles[0].rect.width(), 256.0 * 2.0_f32.sqrt(), epsilon = 1e-3);
    }

    #[test]
    fn tile_zoom_never_exceeds_the_layer() {
        let mut v = view(JOGJA, 11.0);
        v.set_base_layer(BaseLayerId::Topographic);
        v.set_view(JOGJA, 17.0);
        let tiles = visible_tiles(&v, Rect::from_min_size(pos2(0.0, 0.0), vec2(300.0, 300.0)));
        assert!(tiles.iter().all(|t| t.id.zoom == 17));
    }

    #[test]
    fn columns_wrap_and_rows_stop_at_the_poles() {
        let viewport = Rect::from_min_size(pos2(0.0, 0.0), vec2(1024.0, 1024.0));
        let tiles = visible_tiles(&view(Coordinate::new(0.0, 0.0), 0.0), viewport);

        assert!(tiles.iter().all(|t| t.id == TileId::new(0, 0, 0)));
        // The single world tile repeats left and right of the centre.
        assert_eq!(tiles.len(), 5);
    }

    #[test]
    fn icon_rect_keeps_the_tip_on_the_coordinates() {
        let tip = pos2(100.0, 100.0);
        let normal = icon_rect(tip, MarkerIcon::Normal);
        let active = icon_rect(tip, MarkerIcon::Active);

        assert_eq!(normal, Rect::from_min_size(pos2(86.0, 72.0), vec2(28.0, 28.0)));
        assert_eq!(active, Rect::from_min_size(pos2(82.0, 64.0), vec2(36.0, 36.0)));
        assert_eq!(normal.center_bottom(), tip);
        assert_eq!(active.center_bottom(), tip);
    }

    fn draw_frame(icon: Option<&egui::TextureHandle>, ctx: &egui::Context) -> MapOutput {
        let mut markers = MarkerManager::new();
        for location in &LOCATIONS {
            markers.add_marker(location);
        }
        let mut view = view(JOGJA, 11.0);
        let mut cache = LruCache::new(NonZeroUsize::new(8).unwrap());
        let mut output = MapOutput::default();

        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.add(Map::new(&mut view, markers.markers(), &mut cache, &mut output).marker_icon(icon));
            });
        });
        output
    }

    #[test]
    fn markers_draw_with_and_without_an_icon_texture() {
        let ctx = egui::Context::default();
        let icon = ctx.load_texture(
            "marker",
            egui::ColorImage::new([4, 4], Color32::RED),
            egui::TextureOptions::LINEAR,
        );

        for texture in [Some(&icon), None] {
            let output = draw_frame(texture, &ctx);
            assert!(!output.missing_tiles.is_empty());
            assert!(output.missing_tiles.iter().all(|(layer, _)| *layer == BaseLayerId::Street));
            assert_eq!(output.clicked_marker, None);
            assert!(!output.background_clicked);
        }
    }
}
