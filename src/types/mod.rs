pub mod asset;
pub mod ids;
pub mod series;
pub mod timestamp;
