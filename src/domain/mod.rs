pub mod actor;
pub mod grid;
pub mod rules;
pub mod tile;
