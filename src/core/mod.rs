pub mod confidence;
pub mod geometry;
pub mod model;
pub mod strategy;
