//! Headless core of the pheromone flocking simulator.
//!
//! The core owns boids and alarm pheromones and advances them one tick at a
//! time. Rendering, input and scheduling live in the binary.

pub mod boid;
pub mod config;
pub mod error;
pub mod signal;
pub mod vector_math;
pub mod world;

pub use boid::Boid;
pub use config::{AlarmParams, BoidParams, PheromoneTier, SimulationConfig};
pub use error::ConfigError;
pub use signal::Pheromone;
pub use world::{World, WorldStats};
