use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::base_layer::BaseLayerId;
use crate::maps_api::DecodedImage;

/// Edge length of one tile in screen points.
pub const TILE_SIZE: f64 = 256.0;

/// Web Mercator stops being square past this latitude.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A position in Web Mercator pixel space at a given zoom. The origin is the
/// north-west corner of the world, y grows southwards.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Size of the whole world in pixels at `zoom`. Fractional zooms are allowed.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2.0_f64.powf(zoom)
}

/// Project a coordinate onto the Web Mercator pixel plane.
pub fn project(coordinate: Coordinate, zoom: f64) -> WorldPoint {
    let size = world_size(zoom);
    let lat = coordinate
        .latitude
        .clamp(-MAX_LATITUDE, MAX_LATITUDE)
        .to_radians();
    let sin = lat.sin();

    WorldPoint {
        x: (coordinate.longitude + 180.0) / 360.0 * size,
        y: (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size,
    }
}

/// Inverse of [`project`].
pub fn unproject(point: WorldPoint, zoom: f64) -> Coordinate {
    let size = world_size(zoom);
    let n = PI - 2.0 * PI * point.y / size;

    Coordinate {
        latitude: n.sinh().atan().to_degrees(),
        longitude: point.x / size * 360.0 - 180.0,
    }
}

/// XYZ tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Number of tiles along one axis at this tile's zoom.
    pub fn tiles_per_axis(zoom: u8) -> u32 {
        1u32 << zoom
    }

    /// Tile containing `coordinate` at `zoom`.
    pub fn containing(coordinate: Coordinate, zoom: u8) -> Self {
        let point = project(coordinate, zoom as f64);
        let max = Self::tiles_per_axis(zoom) - 1;
        let x = ((point.x / TILE_SIZE).floor().max(0.0) as u32).min(max);
        let y = ((point.y / TILE_SIZE).floor().max(0.0) as u32).min(max);
        Self { zoom, x, y }
    }
}

/// Cache key for a tile of a particular base layer.
pub type TileKey = (BaseLayerId, TileId);

pub struct MapTile {
    pub id: TileId,
    pub layer: BaseLayerId,
    image: Option<DecodedImage>,
    // Uploaded lazily the first time the tile is drawn.
    texture: Option<egui::TextureHandle>,
}

impl MapTile {
    pub fn new(layer: BaseLayerId, id: TileId, image: DecodedImage) -> Self {
        Self {
            id,
            layer,
            image: Some(image),
            texture: None,
        }
    }

    pub fn texture(&mut self, ctx: &egui::Context) -> &egui::TextureHandle {
        let Self {
            id,
            layer,
            image,
            texture,
        } = self;
        texture.get_or_insert_with(|| {
            let color_image = image
                .take()
                .map(|image| image.to_color_image())
                .unwrap_or_else(|| egui::ColorImage::new([1, 1], egui::Color32::GRAY));
            ctx.load_texture(
                format!("tile_{:?}_{}_{}_{}", layer, id.zoom, id.x, id.y),
                color_image,
                egui::TextureOptions::LINEAR,
            )
        })
    }
}
