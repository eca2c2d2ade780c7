pub mod home;
pub mod layer_control;
pub mod theme;
