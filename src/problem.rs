use rand::rngs::SmallRng;
use tracing::info;

use crate::config::SearchConfig;
use crate::error::{Result, TentError};
use crate::model::entity::Roster;
use crate::model::group::Assignment;
use crate::model::preference::{PreferenceEntry, PreferenceModel};
use crate::model::slot::{SlotPool, TentCapacity};
use crate::search::{RestartSearch, SearchOutcome};

/// Validated search input: the people, their preference table and the seats.
#[derive(Debug, Clone)]
pub struct Problem {
    roster: Roster,
    prefs: PreferenceModel,
    slots: SlotPool,
}

impl Problem {
    pub fn new(
        roster: Roster,
        preferences: &[PreferenceEntry],
        capacities: &[TentCapacity],
    ) -> Result<Problem> {
        if roster.is_empty() {
            return Err(TentError::EmptyRoster);
        }
        let slots = SlotPool::build_for(capacities, roster.len())?;
        let prefs = PreferenceModel::build(preferences, &roster);
        info!(
            "Loaded {} people, {} preferences and {} tents",
            roster.len(),
            preferences.len(),
            slots.labels().len()
        );
        Ok(Problem { roster, prefs, slots })
    }

    /// Uses everyone mentioned in `preferences` as the roster.
    pub fn from_preferences(
        preferences: &[PreferenceEntry],
        capacities: &[TentCapacity],
    ) -> Result<Problem> {
        Problem::new(Roster::from_preferences(preferences), preferences, capacities)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn prefs(&self) -> &PreferenceModel {
        &self.prefs
    }

    pub fn slots(&self) -> &SlotPool {
        &self.slots
    }

    pub fn search(&self, config: &SearchConfig) -> Result<SearchOutcome> {
        self.search_with_rng(config, config.rng())
    }

    pub fn search_with_rng(&self, config: &SearchConfig, rng: SmallRng) -> Result<SearchOutcome> {
        RestartSearch::with_rng(config, &self.roster, &self.prefs, self.slots.clone(), rng)?.run()
    }

    /// Tent names with their members' names, in first-appearance order.
    pub fn tents<'p>(&'p self, assignment: &Assignment) -> Vec<(&'p str, Vec<&'p str>)> {
        assignment
            .group_by()
            .into_iter()
            .map(|group| {
                let members: Vec<&str> = group.members.iter().map(|&id| self.roster.name(id)).collect();
                (self.slots.label(group.tent), members)
            })
            .collect()
    }
}
