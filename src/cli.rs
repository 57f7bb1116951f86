use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tentmates::config::{ConfigError, DEFAULT_HILL_TRIES, DEFAULT_PROBE_TRIES, DEFAULT_SWAPS};
use tentmates::{BaselineMode, Climber, Score, SearchConfig};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Assigns people to tents so that tentmates are as happy as possible."
)]
pub struct Cli {
    /// CSV of `from,to,score` preference rows.
    #[arg(short, long, value_name = "PATH")]
    pub prefs: PathBuf,

    /// CSV of `label,capacity` tent rows.
    #[arg(short, long, value_name = "PATH")]
    pub tents: PathBuf,

    /// Stop as soon as an assignment scores at least this much.
    #[arg(short, long, allow_negative_numbers = true)]
    pub goal: Score,

    /// Climb steps per restart.
    #[arg(short, long, default_value_t = DEFAULT_SWAPS)]
    pub swaps: usize,

    /// Give up after this many restarts and report the best assignment seen.
    #[arg(long, value_name = "NUM")]
    pub max_restarts: Option<usize>,

    /// Give up after this many seconds and report the best assignment seen.
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<f64>,

    /// Seed for the random generator. Runs with the same seed are identical.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Measure each climb step against the previous step instead of the previous restart.
    #[arg(long)]
    pub live_baseline: bool,

    #[arg(long, value_enum, default_value_t = ClimberKind::SwapUp)]
    pub climber: ClimberKind,

    /// Attempts per step for the random climbers.
    #[arg(long, value_name = "NUM")]
    pub max_tries: Option<usize>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClimberKind {
    SwapUp,
    RandomProbe,
    RandomHill,
}

impl Cli {
    pub fn search_config(&self) -> Result<SearchConfig, ConfigError> {
        let climber = match self.climber {
            ClimberKind::SwapUp => Climber::SwapUp,
            ClimberKind::RandomProbe => Climber::RandomProbe {
                max_tries: self.max_tries.unwrap_or(DEFAULT_PROBE_TRIES),
            },
            ClimberKind::RandomHill => Climber::RandomHill {
                max_tries: self.max_tries.unwrap_or(DEFAULT_HILL_TRIES),
            },
        };
        let baseline = if self.live_baseline {
            BaselineMode::Live
        } else {
            BaselineMode::Frozen
        };

        let mut builder = SearchConfig::builder()
            .goal(self.goal)
            .swaps(self.swaps)
            .baseline(baseline)
            .climber(climber);
        if let Some(restarts) = self.max_restarts {
            builder = builder.max_restarts(restarts);
        }
        if let Some(secs) = self.time_limit {
            let limit = Duration::try_from_secs_f64(secs).map_err(|e| {
                ConfigError::InvalidParameter {
                    name: "time_limit",
                    reason: e.to_string(),
                }
            })?;
            builder = builder.time_limit(limit);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }
}
