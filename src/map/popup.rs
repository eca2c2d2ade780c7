use egui::Vec2;

use super::map_tile::Coordinate;
use crate::location::Location;

/// Fixed width of the popup body, in points.
pub const POPUP_WIDTH: f32 = 200.0;

/// What a popup shows: a bold label line with an optional image below it.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub label: &'static str,
    pub image_url: Option<&'static str>,
}

impl PopupContent {
    pub fn for_location(location: &Location) -> Self {
        Self {
            label: location.label,
            image_url: location.image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub coordinates: Coordinate,
    pub content: PopupContent,
    /// Shift of the popup tip from the projected coordinates.
    pub offset: Vec2,
}

impl Popup {
    /// A free-standing popup pointing straight at `coordinates`.
    pub fn at(coordinates: Coordinate, content: PopupContent) -> Self {
        Self {
            coordinates,
            content,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}
