pub mod base_layer;
pub mod map;
pub mod map_tile;
pub mod marker;
pub mod popup;
pub mod view;
