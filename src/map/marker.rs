use egui::Vec2;

use super::popup::{Popup, PopupContent};
use crate::location::Location;

/// Normal and enlarged look of a marker. Both use the same image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerIcon {
    #[default]
    Normal,
    Active,
}

impl MarkerIcon {
    pub fn size(self) -> Vec2 {
        match self {
            MarkerIcon::Normal => Vec2::splat(28.0),
            MarkerIcon::Active => Vec2::splat(36.0),
        }
    }

    /// Point of the icon (from its top-left) that sits on the coordinates:
    /// the middle of the bottom edge, so the tip stays put when the icon grows.
    pub fn anchor(self) -> Vec2 {
        let size = self.size();
        Vec2::new(size.x / 2.0, size.y)
    }

    /// Where a bound popup points, relative to the anchor: the top of the icon.
    pub fn popup_anchor(self) -> Vec2 {
        Vec2::new(0.0, -self.size().y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

/// Returned by [`MarkerManager::add_marker`].
pub type MarkerHandle = MarkerId;

#[derive(Debug, Clone)]
pub struct Marker {
    pub id: MarkerId,
    pub location: Location,
    pub icon: MarkerIcon,
    pub popup: PopupContent,
}

impl Marker {
    /// The popup this marker opens when clicked, using its current icon.
    pub fn bound_popup(&self) -> Popup {
        Popup::at(self.location.coordinates, self.popup.clone()).with_offset(self.icon.popup_anchor())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveMarker {
    #[default]
    None,
    Active(MarkerId),
}

#[derive(Debug, Default)]
pub struct MarkerManager {
    markers: Vec<Marker>,
    active: ActiveMarker,
    next_id: u64,
}

impl MarkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_marker(&mut self, location: &Location) -> MarkerHandle {
        let id = MarkerId(self.next_id);
        self.next_id += 1;

        self.markers.push(Marker {
            id,
            location: *location,
            icon: MarkerIcon::Normal,
            popup: PopupContent::for_location(location),
        });
        log::trace!("added marker {:?} for {}", id, location.label);
        id
    }

    /// Make `id` the single active marker and return the popup it opens.
    /// Unknown ids (e.g. a click that raced a reset) are ignored.
    pub fn click(&mut self, id: MarkerId) -> Option<Popup> {
        let Some(index) = self.index_of(id) else {
            log::debug!("click on unknown marker {:?} ignored", id);
            return None;
        };

        if let ActiveMarker::Active(previous) = self.active {
            if previous != id {
                match self.index_of(previous) {
                    Some(prev_index) => self.markers[prev_index].icon = MarkerIcon::Normal,
                    None => log::debug!("previously active marker {:?} is gone", previous),
                }
            }
        }

        let marker = &mut self.markers[index];
        marker.icon = MarkerIcon::Active;
        self.active = ActiveMarker::Active(id);
        log::debug!("marker {:?} ({}) is now active", id, marker.location.label);

        Some(marker.bound_popup())
    }

    /// Take every marker off the map. The caller re-adds them.
    pub fn remove_all(&mut self) {
        log::debug!("removing {} markers", self.markers.len());
        self.markers.clear();
        self.active = ActiveMarker::None;
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.index_of(id).map(|index| &self.markers[index])
    }

    pub fn active(&self) -> ActiveMarker {
        self.active
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn index_of(&self, id: MarkerId) -> Option<usize> {
        self.markers.iter().position(|marker| marker.id == id)
    }
}
