//! Market Environment
//!
//! Gym-like wrapper: draws a random target instrument on every reset and
//! drives the current [`Episode`] with the configured [`Simulator`] rules.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::action::{Action, ActionSpace};
use super::episode::{Episode, Simulator, StepResult};
use super::observation::{Observation, ObservationSpace};
use crate::config::EnvConfig;
use crate::data::{load_universe, Universe};
use crate::error::{GymError, Result};

/// Episodic trading environment over historical daily returns
pub struct MarketEnv {
    universe: Arc<Universe>,
    simulator: Simulator,
    rng: StdRng,
    episode: Episode,
    num_auxiliaries: usize,
}

impl MarketEnv {
    /// Validate `config`, load its instruments and start the first episode
    pub fn new(config: &EnvConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|errors| GymError::InvalidConfig(errors.join("; ")))?;

        let universe = load_universe(config)?;
        Self::from_universe(Arc::new(universe), config)
    }

    /// Build on an already loaded universe (shared read-only between envs)
    pub fn from_universe(universe: Arc<Universe>, config: &EnvConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(universe, config, rng)
    }

    /// Build with an explicit random source
    pub fn with_rng(universe: Arc<Universe>, config: &EnvConfig, mut rng: StdRng) -> Result<Self> {
        let simulator = Simulator::new(config);
        let episode = Self::draw_episode(&universe, &simulator, &mut rng, config.scope)?;

        info!(
            "Market environment ready: {} targets, scope {}, sudden death {}, cumulative reward {}",
            universe.targets().len(),
            config.scope,
            config.sudden_death,
            config.cumulative_reward
        );

        Ok(Self {
            universe,
            simulator,
            rng,
            episode,
            num_auxiliaries: config.auxiliaries.len(),
        })
    }

    fn draw_episode(
        universe: &Universe,
        simulator: &Simulator,
        rng: &mut StdRng,
        scope: usize,
    ) -> Result<Episode> {
        let targets = universe.targets();
        if targets.is_empty() {
            return Err(GymError::NoInstruments { scope });
        }

        let code = &targets[rng.gen_range(0..targets.len())];
        let series = universe
            .get(code)
            .ok_or_else(|| GymError::Other(anyhow::anyhow!("target {code} missing from universe")))?;

        simulator.begin(series)
    }

    /// Start a new episode on a uniformly drawn target instrument
    pub fn reset(&mut self) -> Result<Observation> {
        self.episode = Self::draw_episode(
            &self.universe,
            &self.simulator,
            &mut self.rng,
            self.simulator.scope(),
        )?;
        Ok(self.episode.observation().clone())
    }

    /// Take a step in the environment
    pub fn step(&mut self, action: Action) -> StepResult {
        self.simulator.step(&mut self.episode, action)
    }

    /// Take a step by action index (0 = LONG, 1 = SHORT)
    pub fn step_index(&mut self, action: usize) -> Result<StepResult> {
        let action = Action::try_from(action)?;
        Ok(self.step(action))
    }

    /// Current observation
    pub fn render(&self) -> &Observation {
        self.episode.observation()
    }

    /// Reseed instrument selection
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::discrete()
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::new(self.simulator.scope(), self.num_auxiliaries)
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{InstrumentSeries, ReturnRecord};

    fn universe(codes: &[&str], days: usize) -> Arc<Universe> {
        let mut universe = Universe::new();
        for code in codes {
            let series = InstrumentSeries::from_records(
                *code,
                (0..days).map(|i| {
                    (
                        format!("2020-01-{:02}", i + 1),
                        ReturnRecord {
                            close_return: 0.01,
                            high_return: 0.0,
                            low_return: 0.0,
                            volume_return: 0.0,
                        },
                    )
                }),
            );
            universe.admit(series, true, false);
        }
        Arc::new(universe)
    }

    fn config(scope: usize) -> EnvConfig {
        let mut config = EnvConfig::new("data", vec!["A".into(), "B".into()], "2020-01-01", "2099-01-01");
        config.scope = scope;
        config.seed = Some(7);
        config
    }

    #[test]
    fn test_env_reset() {
        let mut env = MarketEnv::from_universe(universe(&["A", "B"], 10), &config(3)).unwrap();

        env.step(Action::Long);
        let obs = env.reset().unwrap();

        assert_eq!(obs.window.len(), 3);
        assert_eq!(env.episode().cursor(), 3);
        assert!(env.episode().ledger().is_empty());
        assert_eq!(env.episode().cum(), 1.0);
        assert_eq!(env.render(), &obs);
    }

    #[test]
    fn test_episode_runs_to_completion() {
        let mut env = MarketEnv::from_universe(universe(&["A"], 6), &config(2)).unwrap();

        let mut steps = 0;
        loop {
            let result = env.step(Action::Short);
            steps += 1;
            if result.done {
                break;
            }
        }
        // cursor walks from 2 through the last index 5
        assert_eq!(steps, 4);
    }

    #[test]
    fn test_invalid_action_index_fails_loudly() {
        let mut env = MarketEnv::from_universe(universe(&["A"], 6), &config(2)).unwrap();

        assert!(matches!(env.step_index(2), Err(GymError::InvalidAction(2))));
        assert!(env.step_index(1).is_ok());
    }

    #[test]
    fn test_seed_makes_draws_repeatable() {
        let shared = universe(&["A", "B", "C", "D"], 6);
        let mut first = MarketEnv::from_universe(shared.clone(), &config(2)).unwrap();
        let mut second = MarketEnv::from_universe(shared, &config(2)).unwrap();

        first.seed(42);
        second.seed(42);
        for _ in 0..20 {
            first.reset().unwrap();
            second.reset().unwrap();
            assert_eq!(first.episode().instrument(), second.episode().instrument());
        }
    }

    #[test]
    fn test_spaces() {
        let mut cfg = config(4);
        cfg.auxiliaries = vec!["X".into(), "Y".into()];
        let env = MarketEnv::from_universe(universe(&["A"], 6), &cfg).unwrap();

        assert_eq!(env.action_space().n, 2);
        assert_eq!(env.observation_space().window_dim, 12);
    }

    #[test]
    fn test_empty_universe_is_rejected() {
        let result = MarketEnv::from_universe(Arc::new(Universe::new()), &config(2));
        assert!(matches!(result, Err(GymError::NoInstruments { .. })));
    }

    #[test]
    fn test_env_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<MarketEnv>();
    }
}
