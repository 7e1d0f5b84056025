//! Episode State Machine
//!
//! An [`Episode`] is one run over one instrument, owned by whoever drives it.
//! The [`Simulator`] holds only the configured rules and mutates episodes
//! passed to it, so several episodes can run side by side over shared series.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::action::Action;
use super::ledger::Ledger;
use super::observation::{encode, Observation};
use crate::config::EnvConfig;
use crate::data::InstrumentSeries;
use crate::error::{GymError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeStatus {
    Running,
    Done,
}

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A close-out loss breached `sudden_death * lots`
    SuddenDeath,
    /// Ran out of dates or reached `end_date`
    Horizon,
    /// History lookup failed mid-step; ended without fabricating data
    DataFault,
}

/// Auxiliary step information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Date at the advanced cursor (last date once the series is exhausted)
    pub date: String,
    /// Buy-and-hold index of the instrument since reset
    pub cum: f64,
    /// Instrument code
    pub instrument: String,
}

/// Result of taking a step in the environment
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    /// `None` for steps taken after the episode ended
    pub info: Option<StepInfo>,
}

/// Mutable state of one simulated run
#[derive(Debug, Clone)]
pub struct Episode {
    series: Arc<InstrumentSeries>,
    dates: Vec<String>,
    cursor: usize,
    ledger: Ledger,
    cum: f64,
    status: EpisodeStatus,
    termination: Option<Termination>,
    observation: Observation,
    reward: f64,
    steps: usize,
}

impl Episode {
    pub fn instrument(&self) -> &str {
        self.series.code()
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn cum(&self) -> f64 {
        self.cum
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status == EpisodeStatus::Done
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    /// Reward of the last step
    pub fn last_reward(&self) -> f64 {
        self.reward
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn info(&self) -> StepInfo {
        let date = self
            .dates
            .get(self.cursor)
            .or_else(|| self.dates.last())
            .cloned()
            .unwrap_or_default();

        StepInfo {
            date,
            cum: self.cum,
            instrument: self.instrument().to_string(),
        }
    }
}

/// Episode rules taken from the environment configuration
#[derive(Debug, Clone)]
pub struct Simulator {
    scope: usize,
    end_date: String,
    sudden_death: f64,
    penalty: f64,
    cumulative_reward: bool,
    allow_accumulation: bool,
}

impl Simulator {
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            scope: config.scope,
            end_date: config.end_date.clone(),
            sudden_death: config.sudden_death,
            penalty: config.penalty,
            cumulative_reward: config.cumulative_reward,
            allow_accumulation: config.allow_accumulation,
        }
    }

    pub fn scope(&self) -> usize {
        self.scope
    }

    /// Start a fresh episode on `series` with the cursor at `scope`
    pub fn begin(&self, series: Arc<InstrumentSeries>) -> Result<Episode> {
        if self.scope == 0 {
            return Err(GymError::InvalidConfig("scope must be at least 1".into()));
        }

        let dates = series.dates();
        if !series.is_admissible(self.scope) {
            return Err(GymError::WindowOutOfRange {
                instrument: series.code().to_string(),
                end_index: self.scope,
                scope: self.scope,
                available: dates.len(),
            });
        }

        let ledger = Ledger::new(self.cumulative_reward, self.allow_accumulation);
        let observation = encode(&ledger, &series, &dates, self.scope - 1, self.scope)?;

        debug!(
            "Episode reset on {} ({} dates, starting {})",
            series.code(),
            dates.len(),
            dates[self.scope]
        );

        Ok(Episode {
            series,
            dates,
            cursor: self.scope,
            ledger,
            cum: 1.0,
            status: EpisodeStatus::Running,
            termination: None,
            observation,
            reward: 0.0,
            steps: 0,
        })
    }

    /// Advance `episode` by one day with the agent taking `action`
    pub fn step(&self, episode: &mut Episode, action: Action) -> StepResult {
        if episode.is_done() {
            return StepResult {
                observation: episode.observation.clone(),
                reward: 0.0,
                done: true,
                info: None,
            };
        }

        episode.steps += 1;
        let mut reward = 0.0;
        let mut termination = None;

        if let Some(close_out) = episode.ledger.open(action) {
            reward += close_out.reward;
            if self.sudden_death * close_out.lots as f64 > close_out.reward {
                debug!(
                    "Sudden death on {}: close-out {:.4} over {} lots",
                    episode.instrument(),
                    close_out.reward,
                    close_out.lots
                );
                termination = Some(Termination::SuddenDeath);
            }
        }

        match self.advance_day(episode) {
            Ok(observation) => episode.observation = observation,
            Err(e) => {
                error!("Ending episode on {}: {}", episode.instrument(), e);
                termination = Some(Termination::DataFault);
            }
        }

        episode.cursor += 1;
        let exhausted = episode
            .dates
            .get(episode.cursor)
            .map_or(true, |date| date.as_str() >= self.end_date.as_str());
        if exhausted && termination.is_none() {
            termination = Some(Termination::Horizon);
        }

        if termination.is_some() {
            reward += episode.ledger.settle_final();
            episode.status = EpisodeStatus::Done;
            episode.termination = termination;
        }

        episode.reward = reward;

        StepResult {
            observation: episode.observation.clone(),
            reward,
            done: episode.is_done(),
            info: Some(episode.info()),
        }
    }

    /// Apply the cursor day's move and encode the window ending on it
    fn advance_day(&self, episode: &mut Episode) -> Result<Observation> {
        let record = episode
            .dates
            .get(episode.cursor)
            .and_then(|date| episode.series.get(date))
            .copied()
            .ok_or_else(|| GymError::WindowOutOfRange {
                instrument: episode.instrument().to_string(),
                end_index: episode.cursor,
                scope: self.scope,
                available: episode.dates.len(),
            })?;

        episode.cum *= 1.0 + record.close_return;
        episode
            .ledger
            .apply_daily_move(record.close_return, self.penalty);

        encode(
            &episode.ledger,
            &episode.series,
            &episode.dates,
            episode.cursor,
            self.scope,
        )
    }
}
