use anyhow::{anyhow, Context, Result};
use clap::Parser;
use marketgym::cli::{self, Cli, Commands};
use marketgym::config::{AppConfig, LoggingConfig};
use marketgym::env::MarketEnv;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);

    init_logging(&config.logging);

    config
        .validate()
        .map_err(|errors| anyhow!("invalid configuration:\n  {}", errors.join("\n  ")))?;

    let mut env = MarketEnv::new(&config.env)?;

    match cli.command {
        Commands::Info => cli::show_info(&env),
        Commands::Run {
            episodes,
            policy,
            verbose,
            json,
        } => {
            info!("Running {} episodes with {:?} policy", episodes, policy);
            cli::run_baseline(&mut env, policy, config.env.seed, episodes, verbose, json)?;
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},marketgym={}", logging.level, logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
