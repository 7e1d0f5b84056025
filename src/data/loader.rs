//! Raw daily bar loading
//!
//! Expected format per line: `date,open,high,low,close,volume`. Open is
//! ignored; empty high/low fall back to close. Bad lines are logged and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::series::{InstrumentSeries, ReturnRecord, Universe};
use crate::config::EnvConfig;
use crate::error::{GymError, LineError, Result};

/// One parsed raw line (open is dropped)
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: String,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl DailyBar {
    /// Parse one `date,open,high,low,close,volume` line
    pub fn parse(line: &str) -> std::result::Result<Self, LineError> {
        let parts: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if parts.len() != 6 {
            return Err(LineError::ColumnCount { found: parts.len() });
        }

        let close = parse_number("close", parts[4])?;
        let high = if parts[2].is_empty() {
            close
        } else {
            parse_number("high", parts[2])?
        };
        let low = if parts[3].is_empty() {
            close
        } else {
            parse_number("low", parts[3])?
        };
        let volume = parse_number("volume", parts[5])?;

        Ok(Self {
            date: parts[0].to_string(),
            high,
            low,
            close,
            volume,
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> std::result::Result<f64, LineError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LineError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Turn a raw bar stream into a return series.
///
/// Lines dated before `start_date` are ignored and do not seed the previous
/// close/volume. Every parsed bar on or after it becomes the new "previous"
/// even when no record could be derived for it.
pub fn parse_series<R: BufRead>(code: &str, reader: R, start_date: &str) -> InstrumentSeries {
    let mut series = InstrumentSeries::new(code);
    let mut prev_close = 0.0;
    let mut prev_volume = 0.0;

    for (i, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("{}: failed to read line {}: {}", code, i + 1, e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let bar = match DailyBar::parse(&line) {
            Ok(bar) => bar,
            Err(e) => {
                warn!("{}: skipping line {} ({}): {:?}", code, i + 1, e, line.trim());
                continue;
            }
        };

        if bar.date.as_str() < start_date {
            continue;
        }

        if let Some(record) = ReturnRecord::derive(
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
            prev_close,
            prev_volume,
        ) {
            series.insert(bar.date, record);
        }

        prev_close = bar.close;
        prev_volume = bar.volume;
    }

    series
}

/// Path of an instrument's CSV inside the data directory
pub fn series_path(data_dir: &Path, code: &str) -> PathBuf {
    data_dir.join(format!("{code}.csv"))
}

/// Load one instrument file
pub fn load_series(data_dir: &Path, code: &str, start_date: &str) -> Result<InstrumentSeries> {
    let file = File::open(series_path(data_dir, code))?;
    Ok(parse_series(code, BufReader::new(file), start_date))
}

/// Load every configured instrument and keep those with more than `scope` records.
///
/// Unreadable files and short histories only drop the instrument; an empty
/// target pool is fatal since no episode could ever be drawn.
pub fn load_universe(config: &EnvConfig) -> Result<Universe> {
    let mut universe = Universe::new();

    let mut codes: Vec<&String> = Vec::new();
    for code in config.targets.iter().chain(config.auxiliaries.iter()) {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    for code in codes {
        let series = match load_series(&config.data_dir, code, &config.start_date) {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    "{}: cannot load {}: {}",
                    code,
                    series_path(&config.data_dir, code).display(),
                    e
                );
                continue;
            }
        };

        if !series.is_admissible(config.scope) {
            debug!(
                "{}: dropped, {} records <= scope {}",
                code,
                series.len(),
                config.scope
            );
            continue;
        }

        let is_target = config.targets.contains(code);
        let is_auxiliary = config.auxiliaries.contains(code);
        universe.admit(series, is_target, is_auxiliary);
    }

    if universe.targets().is_empty() {
        return Err(GymError::NoInstruments {
            scope: config.scope,
        });
    }

    info!(
        "Loaded {} instruments ({} targets, {} auxiliaries) from {}",
        universe.len(),
        universe.targets().len(),
        universe.auxiliaries().len(),
        config.data_dir.display()
    );

    Ok(universe)
}
