//! The fixed set of venues plotted on the map.

use crate::map::map_tile::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub coordinates: Coordinate,
    /// Unique, doubles as the dropdown entry.
    pub label: &'static str,
    /// Relative to the asset directory, or an absolute http(s) URL.
    pub image_url: Option<&'static str>,
}

impl Location {
    const fn new(latitude: f64, longitude: f64, label: &'static str, image_url: &'static str) -> Self {
        Self {
            coordinates: Coordinate::new(latitude, longitude),
            label,
            image_url: Some(image_url),
        }
    }
}

pub static LOCATIONS: [Location; 10] = [
    Location::new(-7.796853597267914, 110.38358168970846, "Lapangan Parkir Stadion Mandala Krida", "icon/mandala_krida.png"),
    Location::new(-7.787665675876384, 110.37416389325318, "Stadion Kridosono", "icon/kridosono.jpg"),
    Location::new(-7.799987166978024, 110.36763643901223, "Taman Budaya Yogyakarta (TBY)", "icon/tby.jpg"),
    Location::new(-7.753732145444133, 110.49109188744116, "Candi Prambanan", "icon/prambanan.jpg"),
    Location::new(-7.843863653792203, 110.36231136136207, "Pyramid Cafe, Jl. Parangtritis KM 5.5", "icon/pyramid.jpg"),
    Location::new(-7.798032759114464, 110.38770776202496, "Lapangan Panahan Kenari", "icon/kenari.jpg"),
    Location::new(-7.808425716102209, 110.36310751202505, "Bale Raos, Keraton Yogyakarta", "icon/raos.jpg"),
    Location::new(-7.79935777810306, 110.40443972024039, "Jogja Expo Center (JEC)", "icon/jec.jpg"),
    Location::new(-7.750556792293714, 110.418875045112, "Lapangan Parkir Barat Stadion Maguwoharjo", "icon/maguwo.jpg"),
    Location::new(-7.719614173573038, 110.35909122480773, "Lapangan Denggung Sleman", "icon/denggung.jpg"),
];

/// Where the map opens, and where a reset returns to.
pub const INITIAL_CENTER: Coordinate = Coordinate::new(-7.770939335714962, 110.37761533840921);
pub const INITIAL_ZOOM: f64 = 11.0;
/// Zoom used when jumping to a location picked from the list.
pub const SELECTION_ZOOM: f64 = 14.0;

/// First location whose label is exactly `label`.
pub fn find_by_label<'a>(locations: &'a [Location], label: &str) -> Option<&'a Location> {
    locations.iter().find(|location| location.label == label)
}
