pub mod angle;
pub mod config;
pub mod consts;
pub mod error;
pub mod frame;
pub mod piezo;
pub mod spectrum;
pub mod tolerance;
