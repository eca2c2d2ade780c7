//! The map screen's behaviour, independent of how it is drawn: which markers
//! exist, which one is active, what the map is looking at, and what the
//! location dropdown currently shows.

use crate::location::{find_by_label, Location, INITIAL_CENTER, INITIAL_ZOOM, LOCATIONS, SELECTION_ZOOM};
use crate::map::base_layer::BaseLayerId;
use crate::map::marker::{Marker, MarkerId, MarkerManager};
use crate::map::popup::{Popup, PopupContent};
use crate::map::view::MapView;

pub const MAP_CONTAINER_ID: &str = "mapId";

pub struct HomeScreen {
    locations: &'static [Location],
    default_layer: BaseLayerId,
    map: MapView,
    markers: MarkerManager,
    selected_label: Option<String>,
}

impl HomeScreen {
    pub fn new(default_layer: BaseLayerId) -> Self {
        Self::with_locations(&LOCATIONS, default_layer)
    }

    pub fn with_locations(locations: &'static [Location], default_layer: BaseLayerId) -> Self {
        Self {
            locations,
            default_layer,
            map: MapView::default(),
            markers: MarkerManager::new(),
            selected_label: None,
        }
    }

    /// Set the map up the first time the screen is shown. Later calls are
    /// ignored so returning to the screen keeps the user's view.
    pub fn on_view_entered(&mut self) {
        if self.map.is_initialized() {
            return;
        }

        self.map
            .initialize(MAP_CONTAINER_ID, INITIAL_CENTER, INITIAL_ZOOM, self.default_layer);
        self.place_markers();
    }

    /// Centre on the location labelled `label` and point a popup at it.
    /// Returns whether a location matched; an unknown label changes nothing.
    pub fn select_by_label(&mut self, label: &str) -> bool {
        let Some(location) = find_by_label(self.locations, label) else {
            log::warn!("no location labelled {:?}, selection ignored", label);
            return false;
        };

        log::info!("selected {}", location.label);
        self.selected_label = Some(location.label.to_string());
        self.map.set_view(location.coordinates, SELECTION_ZOOM);
        self.map
            .open_popup(Popup::at(location.coordinates, PopupContent::for_location(location)));
        true
    }

    pub fn click_marker(&mut self, id: MarkerId) {
        if let Some(popup) = self.markers.click(id) {
            self.map.open_popup(popup);
        }
    }

    /// Back to the initial view with a fresh set of markers.
    pub fn reset(&mut self) {
        log::info!("resetting map");
        self.selected_label = None;
        self.map.close_popup();
        self.place_markers();
        self.map.set_view(INITIAL_CENTER, INITIAL_ZOOM);
    }

    /// Replace whatever markers exist with one per location.
    fn place_markers(&mut self) {
        self.markers.remove_all();
        for location in self.locations {
            self.markers.add_marker(location);
        }
    }

    pub fn locations(&self) -> &'static [Location] {
        self.locations
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected_label.as_deref()
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapView {
        &mut self.map
    }

    pub fn markers(&self) -> &MarkerManager {
        &self.markers
    }

    /// The view to draw and mutate alongside the markers drawn on it.
    pub fn parts_mut(&mut self) -> (&mut MapView, &[Marker]) {
        (&mut self.map, self.markers.markers())
    }
}
