//! Seats people in capacity-limited tents so that tentmates like each other
//! as much as possible, using random-restart hill climbing.

pub mod action;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod problem;
pub mod score;
pub mod search;

pub use config::{BaselineMode, Budget, Climber, SearchConfig};
pub use error::{Result, TentError};
pub use model::entity::Roster;
pub use model::preference::{PreferenceEntry, Score};
pub use model::slot::TentCapacity;
pub use problem::Problem;
pub use search::{SearchOutcome, Solution};

/// Runs the restart search for `people` over the given preferences and tents.
pub fn search(
    config: &SearchConfig,
    people: Roster,
    preferences: &[PreferenceEntry],
    capacities: &[TentCapacity],
) -> Result<SearchOutcome> {
    Problem::new(people, preferences, capacities)?.search(config)
}
