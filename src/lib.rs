pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod grid_map;
pub mod level;
pub mod movement;
pub mod pathfinder;
pub mod rng;
pub mod targeting;
pub mod timer;
pub mod types;
