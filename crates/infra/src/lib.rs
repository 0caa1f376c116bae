pub mod camera;
pub mod config;
pub mod firebase;
pub mod logging;
pub mod seed;
