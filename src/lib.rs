//! Evolving dodgers: a population of agents learns to avoid ballistic
//! projectiles through a genetic algorithm.

pub mod ai;
pub mod config;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod game;
pub mod heatmap;
pub mod physics;
pub mod shooter;
pub mod trainer;

pub use ai::{Agent, Genome};
pub use config::SimConfig;
pub use error::{ConfigError, EvolutionError};
pub use evolution::{EvolutionEngine, GenerationStats};
pub use game::{Population, RoundController, RoundState, TickReport};
pub use heatmap::ShotDensityField;
pub use physics::{Projectile, Vec2};
pub use shooter::AutoShooter;
pub use trainer::Trainer;
