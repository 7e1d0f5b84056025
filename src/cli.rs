use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::env::{Action, MarketEnv};
use crate::error::Result;
use crate::policy::{AlternatingPolicy, FixedPolicy, Policy, RandomPolicy};
use crate::runner::{run_episodes, summarize_results, RunSummary};

#[derive(Parser)]
#[command(name = "marketgym")]
#[command(version = "0.1.0")]
#[command(about = "Episodic daily-bar trading environment", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, <MARKETGYM_ENV>.toml)
    #[arg(short, long, default_value = "config")]
    pub config: PathBuf,

    /// Override env.data_dir
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Override env.scope
    #[arg(long)]
    pub scope: Option<usize>,

    /// Override env.seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show admitted instruments and the environment's spaces
    Info,
    /// Run a baseline policy through full episodes
    Run {
        /// Number of episodes
        #[arg(short, long, default_value = "10")]
        episodes: usize,
        /// Baseline policy to drive the environment
        #[arg(short, long, value_enum, default_value = "random")]
        policy: PolicyKind,
        /// Log every episode
        #[arg(short, long)]
        verbose: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Random,
    Long,
    Short,
    Alternate,
}

impl PolicyKind {
    pub fn build(self, seed: Option<u64>) -> Box<dyn Policy> {
        match self {
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Long => Box::new(FixedPolicy(Action::Long)),
            Self::Short => Box::new(FixedPolicy(Action::Short)),
            Self::Alternate => Box::new(AlternatingPolicy::default()),
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.env.data_dir = dir.clone();
        }
        if let Some(scope) = self.scope {
            config.env.scope = scope;
        }
        if let Some(seed) = self.seed {
            config.env.seed = Some(seed);
        }
    }
}

/// Print admitted instruments and spaces
pub fn show_info(env: &MarketEnv) {
    let universe = env.universe();
    let observation_space = env.observation_space();

    println!("Targets ({}):     {}", universe.targets().len(), universe.targets().join(", "));
    println!(
        "Auxiliaries ({}): {}",
        universe.auxiliaries().len(),
        universe.auxiliaries().join(", ")
    );
    for code in universe.targets() {
        if let Some(series) = universe.get(code) {
            let dates = series.dates();
            println!(
                "  {:<10} {:>6} days  {} .. {}",
                code,
                series.len(),
                dates.first().map(String::as_str).unwrap_or("-"),
                dates.last().map(String::as_str).unwrap_or("-")
            );
        }
    }
    println!("Action space:      Discrete({})", env.action_space().n);
    println!(
        "Observation space: {} scalars + Box[{}, {}] x {}",
        observation_space.scalar_dim,
        observation_space.low,
        observation_space.high,
        observation_space.window_dim
    );
}

/// Run a baseline policy and report the summary
pub fn run_baseline(
    env: &mut MarketEnv,
    kind: PolicyKind,
    seed: Option<u64>,
    episodes: usize,
    verbose: bool,
    json: bool,
) -> Result<RunSummary> {
    let mut policy = kind.build(seed);
    let results = run_episodes(env, policy.as_mut(), episodes, verbose)?;
    let summary = summarize_results(&results);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Policy:            {:?}", kind);
        println!("Episodes:          {}", summary.num_episodes);
        println!("Avg reward:        {:.4}", summary.avg_reward);
        println!("Total reward:      {:.4}", summary.total_reward);
        println!("Avg length:        {:.1}", summary.avg_length);
        println!("Episode win rate:  {:.1}%", summary.episode_win_rate * 100.0);
        println!("Avg buy-and-hold:  {:.4}", summary.avg_buy_and_hold);
        println!("Sudden deaths:     {}", summary.sudden_deaths);
    }

    Ok(summary)
}
