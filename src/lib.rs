// Public library interface for treemap-flip
// The driver CLI and the layout diagnostic both build on these modules

pub mod config;
pub mod data;
pub mod layout;
pub mod normalize;
pub mod render;
pub mod tree;
pub mod ui;
