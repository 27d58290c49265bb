pub mod catalog;
pub mod challenges;
pub mod config;
pub mod engine;
pub mod history;
pub mod indicators;
pub mod placement;
pub mod planner;
pub mod progression;
pub mod rng;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod web;

pub use catalog::{BuildingKind, Catalog};
pub use config::Rules;
pub use engine::{Engine, EngineBuilder, Intent, Transition};
pub use placement::{PlacementError, PlacementIntent};
pub use scenario::{Scenario, ScenarioLoader};
pub use session::Session;
pub use state::GameState;
