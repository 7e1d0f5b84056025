//! Episode runner
//!
//! Drives a [`Policy`] through full episodes and aggregates the results.

use serde::Serialize;
use tracing::info;

use crate::env::{Action, MarketEnv, Termination};
use crate::error::Result;
use crate::policy::Policy;

/// Outcome of one episode
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeResult {
    pub instrument: String,
    /// Sum of step rewards
    pub total_reward: f64,
    /// Steps taken until done
    pub length: usize,
    /// Buy-and-hold index at the end
    pub final_cum: f64,
    /// Date reached when the episode ended
    pub end_date: String,
    pub termination: Option<Termination>,
}

/// Run one episode from a fresh reset
pub fn run_episode(env: &mut MarketEnv, policy: &mut dyn Policy) -> Result<EpisodeResult> {
    let mut observation = env.reset()?;
    policy.on_reset();

    let mut total_reward = 0.0;
    let mut final_cum = 1.0;
    let mut end_date = String::new();

    loop {
        let action = Action::try_from(policy.act(&observation))?;
        let result = env.step(action);
        total_reward += result.reward;
        if let Some(info) = result.info {
            final_cum = info.cum;
            end_date = info.date;
        }
        observation = result.observation;

        if result.done {
            break;
        }
    }

    let episode = env.episode();
    Ok(EpisodeResult {
        instrument: episode.instrument().to_string(),
        total_reward,
        length: episode.steps(),
        final_cum,
        end_date,
        termination: episode.termination(),
    })
}

/// Run `num_episodes` episodes back to back
pub fn run_episodes(
    env: &mut MarketEnv,
    policy: &mut dyn Policy,
    num_episodes: usize,
    verbose: bool,
) -> Result<Vec<EpisodeResult>> {
    let mut results = Vec::with_capacity(num_episodes);

    for episode in 0..num_episodes {
        let result = run_episode(env, policy)?;

        if verbose {
            info!(
                "Episode {}/{}: {} reward={:.4}, steps={}, cum={:.4}, end={:?}",
                episode + 1,
                num_episodes,
                result.instrument,
                result.total_reward,
                result.length,
                result.final_cum,
                result.termination
            );
        }

        results.push(result);
    }

    Ok(results)
}

/// Aggregate statistics over many episodes
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub num_episodes: usize,
    pub total_reward: f64,
    pub avg_reward: f64,
    pub avg_length: f64,
    /// Share of episodes with positive total reward
    pub episode_win_rate: f64,
    /// Mean buy-and-hold return (`cum - 1`) over the same episodes
    pub avg_buy_and_hold: f64,
    pub sudden_deaths: usize,
}

/// Calculate summary statistics
pub fn summarize_results(results: &[EpisodeResult]) -> RunSummary {
    if results.is_empty() {
        return RunSummary::default();
    }

    let n = results.len() as f64;
    let total_reward: f64 = results.iter().map(|r| r.total_reward).sum();
    let avg_length = results.iter().map(|r| r.length as f64).sum::<f64>() / n;
    let winning = results.iter().filter(|r| r.total_reward > 0.0).count();
    let avg_buy_and_hold = results.iter().map(|r| r.final_cum - 1.0).sum::<f64>() / n;
    let sudden_deaths = results
        .iter()
        .filter(|r| r.termination == Some(Termination::SuddenDeath))
        .count();

    RunSummary {
        num_episodes: results.len(),
        total_reward,
        avg_reward: total_reward / n,
        avg_length,
        episode_win_rate: winning as f64 / n,
        avg_buy_and_hold,
        sudden_deaths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;
    use crate::data::{InstrumentSeries, ReturnRecord, Universe};
    use crate::error::GymError;
    use crate::policy::MockPolicy;
    use std::sync::Arc;

    fn env(closes: &[f64], scope: usize) -> MarketEnv {
        let series = InstrumentSeries::from_records(
            "TEST",
            closes.iter().enumerate().map(|(i, c)| {
                (
                    format!("2020-02-{:02}", i + 1),
                    ReturnRecord {
                        close_return: *c,
                        high_return: 0.0,
                        low_return: 0.0,
                        volume_return: 0.0,
                    },
                )
            }),
        );
        let mut universe = Universe::new();
        universe.admit(series, true, false);

        let mut config = EnvConfig::new("data", vec!["TEST".into()], "2020-01-01", "2099-01-01");
        config.scope = scope;
        config.seed = Some(3);
        MarketEnv::from_universe(Arc::new(universe), &config).unwrap()
    }

    #[test]
    fn test_run_episode_with_mock_policy() {
        let mut env = env(&[0.0, 0.1, 0.1, 0.0], 1);
        let mut policy = MockPolicy::new();
        policy.expect_on_reset().times(1).return_const(());
        policy.expect_act().times(3).return_const(0usize);

        let result = run_episode(&mut env, &mut policy).unwrap();

        assert_eq!(result.length, 3);
        assert_eq!(result.termination, Some(Termination::Horizon));
        // one long lot compounded 1.1 * 1.1 * 1.0, settled at the end
        assert!((result.total_reward - (1.1 * 1.1 - 1.0)).abs() < 1e-12);
        assert!((result.final_cum - 1.21).abs() < 1e-12);
        assert_eq!(result.end_date, "2020-02-04");
    }

    #[test]
    fn test_run_episode_rejects_bad_policy_output() {
        let mut env = env(&[0.0, 0.1, 0.1], 1);
        let mut policy = MockPolicy::new();
        policy.expect_on_reset().return_const(());
        policy.expect_act().return_const(5usize);

        assert!(matches!(
            run_episode(&mut env, &mut policy),
            Err(GymError::InvalidAction(5))
        ));
    }

    #[test]
    fn test_summarize_results() {
        let result = |reward: f64, cum: f64, termination| EpisodeResult {
            instrument: "TEST".into(),
            total_reward: reward,
            length: 10,
            final_cum: cum,
            end_date: "2020-01-10".into(),
            termination: Some(termination),
        };
        let results = vec![
            result(0.5, 1.5, Termination::Horizon),
            result(-0.25, 0.5, Termination::SuddenDeath),
        ];

        let summary = summarize_results(&results);
        assert_eq!(summary.num_episodes, 2);
        assert_eq!(summary.total_reward, 0.25);
        assert_eq!(summary.avg_reward, 0.125);
        assert_eq!(summary.avg_length, 10.0);
        assert_eq!(summary.episode_win_rate, 0.5);
        assert_eq!(summary.avg_buy_and_hold, 0.0);
        assert_eq!(summary.sudden_deaths, 1);

        assert_eq!(summarize_results(&[]).num_episodes, 0);
    }
}
