pub mod cli;
pub mod config;
pub mod data;
pub mod env;
pub mod error;
pub mod policy;
pub mod runner;

pub use config::{AppConfig, EnvConfig};
pub use data::{load_universe, InstrumentSeries, ReturnRecord, Universe};
pub use env::{
    Action, Episode, Ledger, MarketEnv, Observation, ObservationSpace, Simulator, StepInfo,
    StepResult, Termination,
};
pub use error::{GymError, Result};
pub use policy::{AlternatingPolicy, FixedPolicy, Policy, RandomPolicy};
pub use runner::{run_episode, run_episodes, summarize_results, EpisodeResult, RunSummary};
