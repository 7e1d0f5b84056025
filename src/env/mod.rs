//! Simulated Trading Environment
//!
//! Gym-like step/reset interface over historical daily return series.

pub mod action;
pub mod episode;
pub mod ledger;
pub mod market;
pub mod observation;

pub use action::{Action, ActionSpace, NUM_ACTIONS};
pub use episode::{Episode, EpisodeStatus, Simulator, StepInfo, StepResult, Termination};
pub use ledger::{CloseOut, Ledger};
pub use market::MarketEnv;
pub use observation::{encode, Observation, ObservationSpace, NUM_SCALARS};
