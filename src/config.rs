use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::model::preference::Score;

pub const DEFAULT_SWAPS: usize = 1;
pub const DEFAULT_PROBE_TRIES: usize = 10_000;
pub const DEFAULT_HILL_TRIES: usize = 100;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Which score a climb step has to beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselineMode {
    /// Every step in a restart is measured against the score the previous
    /// restart ended with.
    #[default]
    Frozen,
    /// Each step is measured against the score the previous step produced.
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Climber {
    /// Deterministic first-improvement scan over every slot pair.
    #[default]
    SwapUp,
    /// Random swaps until the baseline is beaten; the arrangement is restored
    /// when `max_tries` runs out.
    RandomProbe { max_tries: usize },
    /// Random swaps until the goal is reached or `max_tries` runs out.
    RandomHill { max_tries: usize },
}

/// Optional limits on the restart loop. With neither set an unreachable goal
/// never returns.
///
/// The restart limit is checked after each restart. The time limit is also
/// checked between climb steps, so a run can overshoot it by at most one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Budget {
    pub max_restarts: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl Budget {
    pub fn unbounded() -> Budget {
        Budget::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.max_restarts.is_some() || self.time_limit.is_some()
    }

    pub fn is_exhausted(&self, restarts: usize, elapsed: Duration) -> bool {
        self.max_restarts.is_some_and(|max| restarts >= max) || self.is_out_of_time(elapsed)
    }

    pub fn is_out_of_time(&self, elapsed: Duration) -> bool {
        self.time_limit.is_some_and(|limit| elapsed >= limit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub goal: Score,
    pub swaps: usize,
    pub baseline: BaselineMode,
    pub climber: Climber,
    pub budget: Budget,
    pub seed: Option<u64>,
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    goal: Option<Score>,
    swaps: Option<usize>,
    baseline: Option<BaselineMode>,
    climber: Option<Climber>,
    max_restarts: Option<usize>,
    time_limit: Option<Duration>,
    seed: Option<u64>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goal(mut self, goal: Score) -> Self {
        self.goal = Some(goal);
        self
    }
    pub fn swaps(mut self, swaps: usize) -> Self {
        self.swaps = Some(swaps);
        self
    }
    pub fn baseline(mut self, mode: BaselineMode) -> Self {
        self.baseline = Some(mode);
        self
    }
    pub fn climber(mut self, climber: Climber) -> Self {
        self.climber = Some(climber);
        self
    }
    pub fn max_restarts(mut self, restarts: usize) -> Self {
        self.max_restarts = Some(restarts);
        self
    }
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let goal = self.goal.ok_or(ConfigError::MissingParameter("goal"))?;
        if self.max_restarts == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "max_restarts",
                reason: "must allow at least one restart".to_string(),
            });
        }
        let climber = self.climber.unwrap_or_default();
        if let Climber::RandomProbe { max_tries: 0 } | Climber::RandomHill { max_tries: 0 } = climber {
            return Err(ConfigError::InvalidParameter {
                name: "max_tries",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(SearchConfig {
            goal,
            swaps: self.swaps.unwrap_or(DEFAULT_SWAPS),
            baseline: self.baseline.unwrap_or_default(),
            climber,
            budget: Budget {
                max_restarts: self.max_restarts,
                time_limit: self.time_limit,
            },
            seed: self.seed,
        })
    }
}
