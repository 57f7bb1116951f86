use std::time::Instant;

use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, info, instrument, trace};

use crate::action::{ActionError, Swap};
use crate::config::{BaselineMode, Climber, SearchConfig};
use crate::error::{Result, TentError};
use crate::model::entity::Roster;
use crate::model::group::Assignment;
use crate::model::preference::{PreferenceModel, Score};
use crate::model::slot::SlotPool;
use crate::score::total_value;

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborOutcome {
    pub value: Score,
    pub assignment: Assignment,
    /// Whether the climber accepted a new arrangement.
    pub improved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub value: Score,
    pub assignment: Assignment,
    pub restarts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    GoalMet(Solution),
    /// The budget ran out. Holds the best arrangement seen and the number of
    /// restarts actually performed.
    Exhausted(Solution),
}

impl SearchOutcome {
    pub fn goal_met(&self) -> bool {
        matches!(self, SearchOutcome::GoalMet(_))
    }

    pub fn solution(&self) -> &Solution {
        match self {
            SearchOutcome::GoalMet(solution) | SearchOutcome::Exhausted(solution) => solution,
        }
    }

    pub fn into_solution(self) -> Solution {
        match self {
            SearchOutcome::GoalMet(solution) | SearchOutcome::Exhausted(solution) => solution,
        }
    }
}

fn evaluate(roster: &Roster, slots: &SlotPool, prefs: &PreferenceModel) -> Result<(Score, Assignment)> {
    let assignment = Assignment::assign(roster, slots)?;
    Ok((total_value(&assignment, prefs), assignment))
}

/// Applies the first slot swap, scanning `(i, j)` with `i < j` in
/// lexicographic order, whose arrangement scores strictly above `baseline`.
/// Failed trials are swapped back, so an unimproved call leaves `slots` as it
/// found them.
///
/// Every trial rescores the whole assignment: O(n^3) per call, meant for tens
/// of people.
#[instrument(level = "trace", skip(slots, roster, prefs))]
pub fn swap_up(
    slots: &mut SlotPool,
    roster: &Roster,
    prefs: &PreferenceModel,
    baseline: Score,
) -> Result<NeighborOutcome> {
    for (i, j) in (0..slots.len()).tuple_combinations() {
        let swap = Swap(i, j);
        swap.apply(slots)?;
        let (value, assignment) = evaluate(roster, slots, prefs)?;
        if value > baseline {
            trace!(i, j, value, "Swap beats baseline");
            return Ok(NeighborOutcome { value, assignment, improved: true });
        }
        swap.apply(slots)?;
    }
    let (value, assignment) = evaluate(roster, slots, prefs)?;
    Ok(NeighborOutcome { value, assignment, improved: false })
}

/// Random differing-tent swaps until one scores strictly above `baseline`.
/// After `max_tries` misses the starting arrangement is put back.
pub fn random_probe<R: Rng + ?Sized>(
    slots: &mut SlotPool,
    roster: &Roster,
    prefs: &PreferenceModel,
    baseline: Score,
    max_tries: usize,
    rng: &mut R,
) -> Result<NeighborOutcome> {
    let start = slots.clone();
    for _ in 0..max_tries {
        let swap = match Swap::random(slots, rng) {
            Ok(swap) => swap,
            Err(ActionError::NoDistinctLabels) => break,
            Err(e) => return Err(e.into()),
        };
        swap.apply(slots)?;
        let (value, assignment) = evaluate(roster, slots, prefs)?;
        if value > baseline {
            return Ok(NeighborOutcome { value, assignment, improved: true });
        }
    }
    *slots = start;
    let (value, assignment) = evaluate(roster, slots, prefs)?;
    Ok(NeighborOutcome { value, assignment, improved: false })
}

/// Random differing-tent swaps until the arrangement reaches `target`. Unlike
/// [`random_probe`] the last arrangement is kept when `max_tries` runs out.
pub fn random_hill<R: Rng + ?Sized>(
    slots: &mut SlotPool,
    roster: &Roster,
    prefs: &PreferenceModel,
    target: Score,
    max_tries: usize,
    rng: &mut R,
) -> Result<NeighborOutcome> {
    for _ in 0..max_tries {
        match Swap::random(slots, rng) {
            Ok(swap) => swap.apply(slots)?,
            Err(ActionError::NoDistinctLabels) => break,
            Err(e) => return Err(e.into()),
        }
        let (value, assignment) = evaluate(roster, slots, prefs)?;
        if value >= target {
            return Ok(NeighborOutcome { value, assignment, improved: true });
        }
    }
    let (value, assignment) = evaluate(roster, slots, prefs)?;
    Ok(NeighborOutcome { value, assignment, improved: value >= target })
}

/// Random-restart hill climbing over a single slot buffer.
///
/// The buffer is never reset: each restart randomizes whatever arrangement the
/// previous climb left behind.
pub struct RestartSearch<'a> {
    config: &'a SearchConfig,
    roster: &'a Roster,
    prefs: &'a PreferenceModel,
    slots: SlotPool,
    rng: SmallRng,
}

impl<'a> RestartSearch<'a> {
    pub fn new(
        config: &'a SearchConfig,
        roster: &'a Roster,
        prefs: &'a PreferenceModel,
        slots: SlotPool,
    ) -> Result<RestartSearch<'a>> {
        Self::with_rng(config, roster, prefs, slots, config.rng())
    }

    pub fn with_rng(
        config: &'a SearchConfig,
        roster: &'a Roster,
        prefs: &'a PreferenceModel,
        slots: SlotPool,
        rng: SmallRng,
    ) -> Result<RestartSearch<'a>> {
        if roster.len() != slots.len() {
            return Err(TentError::CapacityMismatch {
                seats: slots.len(),
                people: roster.len(),
            });
        }
        Ok(RestartSearch { config, roster, prefs, slots, rng })
    }

    pub fn slots(&self) -> &SlotPool {
        &self.slots
    }

    fn randomize(&mut self) -> Result<()> {
        match Swap::random(&self.slots, &mut self.rng) {
            Ok(swap) => swap.apply(&mut self.slots)?,
            Err(ActionError::NoDistinctLabels) => {
                debug!("Only one tent has seats, nothing to shuffle");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn climb(&mut self, baseline: Score, started: Instant) -> Result<()> {
        let mut floor = match self.config.baseline {
            BaselineMode::Frozen => baseline,
            BaselineMode::Live => evaluate(self.roster, &self.slots, self.prefs)?.0,
        };
        for step in 0..self.config.swaps {
            if self.config.budget.is_out_of_time(started.elapsed()) {
                debug!(step, "Time limit reached mid-climb");
                break;
            }
            let outcome = match self.config.climber {
                Climber::SwapUp => swap_up(&mut self.slots, self.roster, self.prefs, floor)?,
                Climber::RandomProbe { max_tries } => random_probe(
                    &mut self.slots,
                    self.roster,
                    self.prefs,
                    floor,
                    max_tries,
                    &mut self.rng,
                )?,
                Climber::RandomHill { max_tries } => random_hill(
                    &mut self.slots,
                    self.roster,
                    self.prefs,
                    self.config.goal,
                    max_tries,
                    &mut self.rng,
                )?,
            };
            if self.config.baseline == BaselineMode::Live {
                floor = outcome.value;
                // a failed deterministic scan would fail again
                if !outcome.improved && self.config.climber == Climber::SwapUp {
                    trace!(step, "Local optimum reached");
                    break;
                }
            }
        }
        Ok(())
    }

    #[instrument(skip_all, name = "restart_search", fields(goal = self.config.goal, swaps = self.config.swaps))]
    pub fn run(&mut self) -> Result<SearchOutcome> {
        let started = Instant::now();
        let (mut baseline, assignment) = evaluate(self.roster, &self.slots, self.prefs)?;
        let mut best = Solution { value: baseline, assignment, restarts: 0 };
        let mut restarts = 0;
        info!(
            "Searching {} people for a value of at least {} (starting at {})",
            self.roster.len(),
            self.config.goal,
            baseline
        );

        loop {
            restarts += 1;
            self.randomize()?;
            self.climb(baseline, started)?;
            let (value, assignment) = evaluate(self.roster, &self.slots, self.prefs)?;
            debug!(restarts, value, baseline, "Restart finished");

            if value >= self.config.goal {
                info!("Goal met with value {} after {} restarts", value, restarts);
                return Ok(SearchOutcome::GoalMet(Solution { value, assignment, restarts }));
            }
            if value > best.value {
                best = Solution { value, assignment, restarts };
            }
            baseline = value;

            if self.config.budget.is_exhausted(restarts, started.elapsed()) {
                info!(
                    "Budget exhausted after {} restarts, best value {}",
                    restarts, best.value
                );
                best.restarts = restarts;
                return Ok(SearchOutcome::Exhausted(best));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::preference::PreferenceEntry;
    use crate::model::slot::TentCapacity;
    use rand::SeedableRng;

    fn setup(tents: &[i64]) -> (Roster, PreferenceModel, SlotPool) {
        let entries = vec![
            PreferenceEntry::new("A", "B", 5),
            PreferenceEntry::new("B", "A", 5),
            PreferenceEntry::new("C", "D", 3),
            PreferenceEntry::new("D", "C", 3),
        ];
        let roster = Roster::from_preferences(&entries);
        let prefs = PreferenceModel::build(&entries, &roster);
        let records: Vec<TentCapacity> = tents
            .iter()
            .enumerate()
            .map(|(i, &capacity)| TentCapacity::new(format!("t{}", i), capacity))
            .collect();
        (roster, prefs, SlotPool::build(&records).unwrap())
    }

    fn arranged(slots: &mut SlotPool, swaps: &[(usize, usize)]) {
        for &(a, b) in swaps {
            Swap(a, b).apply(slots).unwrap();
        }
    }

    #[test]
    fn swap_up_takes_the_first_improvement() {
        let (roster, prefs, mut slots) = setup(&[2, 2]);
        // [t0, t1, t0, t1]: A and C share a tent, B and D share the other
        arranged(&mut slots, &[(1, 2)]);
        let outcome = swap_up(&mut slots, &roster, &prefs, 0).unwrap();
        assert!(outcome.improved);
        assert_eq!(outcome.value, 16);
        // (0, 1) and (0, 2) do not help, (0, 3) does
        assert_eq!(slots.as_slice(), [1, 1, 0, 0]);
        assert_eq!(outcome.assignment, Assignment::assign(&roster, &slots).unwrap());
    }

    #[test]
    fn swap_up_restores_slots_when_nothing_helps() {
        let (roster, prefs, mut slots) = setup(&[2, 2]);
        arranged(&mut slots, &[(1, 2)]);
        let before = slots.clone();
        let outcome = swap_up(&mut slots, &roster, &prefs, 16).unwrap();
        assert!(!outcome.improved);
        assert_eq!(outcome.value, 0);
        assert_eq!(slots, before);
    }

    #[test]
    fn swap_up_result_beats_baseline() {
        let (roster, prefs, mut slots) = setup(&[1, 2, 1]);
        for baseline in [-1, 0, 5, 9, 10, 15, 16] {
            let before = slots.clone();
            let outcome = swap_up(&mut slots, &roster, &prefs, baseline).unwrap();
            if outcome.improved {
                assert!(outcome.value > baseline);
            } else {
                assert_eq!(slots, before);
            }
        }
    }

    #[test]
    fn random_probe_gives_up_and_restores() {
        let (roster, prefs, mut slots) = setup(&[2, 2]);
        let before = slots.clone();
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome = random_probe(&mut slots, &roster, &prefs, 16, 50, &mut rng).unwrap();
        assert!(!outcome.improved);
        assert_eq!(outcome.value, 16);
        assert_eq!(slots, before);
    }

    #[test]
    fn random_probe_finds_an_improvement() {
        let (roster, prefs, mut slots) = setup(&[2, 2]);
        arranged(&mut slots, &[(1, 2)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let outcome = random_probe(&mut slots, &roster, &prefs, 0, 10_000, &mut rng).unwrap();
        assert!(outcome.improved);
        assert_eq!(outcome.value, 16);
    }

    #[test]
    fn random_hill_keeps_last_arrangement() {
        let (roster, prefs, mut slots) = setup(&[2, 2]);
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = random_hill(&mut slots, &roster, &prefs, 17, 7, &mut rng).unwrap();
        assert!(!outcome.improved);
        assert_eq!(outcome.assignment, Assignment::assign(&roster, &slots).unwrap());
        assert_eq!(slots.label_counts()[&0], 2);
    }

    #[test]
    fn frozen_baseline_needs_two_restarts() {
        // The start already scores 16, so the first climb cannot beat it and
        // the shuffled arrangement (which always scores 0) is kept.
        let (roster, prefs, slots) = setup(&[2, 2]);
        for seed in 0..20 {
            let config = SearchConfig::builder().goal(16).swaps(1).seed(seed).build().unwrap();
            let outcome = RestartSearch::new(&config, &roster, &prefs, slots.clone())
                .unwrap()
                .run()
                .unwrap();
            assert!(outcome.goal_met());
            assert_eq!(outcome.solution().value, 16);
            assert_eq!(outcome.solution().restarts, 2);
        }
    }

    #[test]
    fn live_baseline_climbs_within_one_restart() {
        let (roster, prefs, slots) = setup(&[2, 2]);
        for seed in 0..20 {
            let config = SearchConfig::builder()
                .goal(16)
                .swaps(3)
                .baseline(BaselineMode::Live)
                .seed(seed)
                .build()
                .unwrap();
            let outcome = RestartSearch::new(&config, &roster, &prefs, slots.clone())
                .unwrap()
                .run()
                .unwrap();
            assert_eq!(outcome.solution().restarts, 1);
            assert_eq!(outcome.solution().value, 16);
        }
    }

    #[test]
    fn zero_goal_returns_after_one_restart() {
        let (roster, prefs, slots) = setup(&[2, 2]);
        let config = SearchConfig::builder().goal(0).swaps(0).seed(9).build().unwrap();
        let outcome = RestartSearch::new(&config, &roster, &prefs, slots).unwrap().run().unwrap();
        assert!(outcome.goal_met());
        assert_eq!(outcome.solution().restarts, 1);
    }

    #[test]
    fn zero_swaps_is_pure_random_restart() {
        let (roster, prefs, slots) = setup(&[2, 2]);
        let config = SearchConfig::builder().goal(16).swaps(0).seed(4).max_restarts(10_000).build().unwrap();
        let mut search = RestartSearch::new(&config, &roster, &prefs, slots).unwrap();
        let outcome = search.run().unwrap();
        assert!(outcome.goal_met());
        // the final arrangement is exactly the one the last random swap produced
        assert_eq!(
            outcome.solution().assignment,
            Assignment::assign(&roster, search.slots()).unwrap()
        );
    }

    #[test]
    fn unreachable_goal_exhausts_budget_with_best_seen() {
        let (roster, prefs, slots) = setup(&[2, 2]);
        let config = SearchConfig::builder().goal(17).swaps(2).seed(1).max_restarts(25).build().unwrap();
        let outcome = RestartSearch::new(&config, &roster, &prefs, slots).unwrap().run().unwrap();
        match outcome {
            SearchOutcome::Exhausted(best) => {
                assert_eq!(best.value, 16);
                assert_eq!(best.restarts, 25);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn time_limit_cuts_a_long_climb_short() {
        // Frozen at 16, no climb step can ever succeed, so every one of the
        // steps would run without the mid-climb deadline.
        let (roster, prefs, slots) = setup(&[2, 2]);
        let config = SearchConfig::builder()
            .goal(17)
            .swaps(100_000_000)
            .time_limit(std::time::Duration::from_millis(30))
            .seed(6)
            .build()
            .unwrap();
        let started = Instant::now();
        let outcome = RestartSearch::new(&config, &roster, &prefs, slots).unwrap().run().unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        match outcome {
            SearchOutcome::Exhausted(best) => {
                assert_eq!(best.restarts, 1);
                assert_eq!(best.value, 16);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn single_tent_is_already_optimal() {
        let (roster, prefs, slots) = setup(&[4]);
        let config = SearchConfig::builder().goal(16).seed(2).build().unwrap();
        let outcome = RestartSearch::new(&config, &roster, &prefs, slots).unwrap().run().unwrap();
        assert!(outcome.goal_met());
        assert_eq!(outcome.solution().restarts, 1);
    }

    #[test]
    fn mismatched_pool_is_rejected() {
        let (roster, prefs, slots) = setup(&[2, 1]);
        let config = SearchConfig::builder().goal(0).build().unwrap();
        assert!(matches!(
            RestartSearch::new(&config, &roster, &prefs, slots),
            Err(TentError::CapacityMismatch { seats: 3, people: 4 })
        ));
    }
}
