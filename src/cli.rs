//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::console_signal_adapter::{ConsoleSignalAdapter, OutputFormat};
use crate::adapters::csv_adapter::CsvQuoteAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_strategy_adapter::FileStrategyAdapter;
use crate::domain::config_validation::{validate_scan_config, validate_strategies};
use crate::domain::context::EvaluationContext;
use crate::domain::error::StratscriptError;
use crate::domain::preset::{PRESETS, PresetTemplate};
use crate::domain::runner;
use crate::domain::scan::{self, SignalRecord};
use crate::domain::script_cache::ScriptCache;
use crate::domain::series::PriceSeries;
use crate::domain::strategy::StrategyDefinition;
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::signal_port::SignalSink;
use crate::ports::strategy_port::StrategyStorePort;

#[derive(Parser, Debug)]
#[command(name = "stratscript", about = "Trading signal script engine")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a script against one CSV price history
    Eval {
        /// Buy (or lone) script
        #[arg(short, long)]
        script: String,
        /// Optional sell script
        #[arg(long)]
        sell: Option<String>,
        #[arg(short, long)]
        data: PathBuf,
        /// Defaults to the CSV file stem
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
    /// Evaluate every configured strategy against its symbols
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
        /// Evaluate pairs one at a time instead of on the thread pool
        #[arg(long)]
        sequential: bool,
    },
    /// List preset strategy templates
    Presets {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
    /// Validate a scan configuration and its strategies
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let log_level = cli.log_level.as_deref();
    let outcome = match cli.command {
        Command::Eval {
            script,
            sell,
            data,
            symbol,
            format,
        } => {
            init_logging(log_level);
            run_eval(&script, sell.as_deref(), &data, symbol.as_deref(), format)
        }
        Command::Scan {
            config,
            format,
            sequential,
        } => run_scan(&config, log_level, format, sequential),
        Command::Presets { format } => {
            init_logging(log_level);
            run_presets(format)
        }
        Command::Validate { config } => run_validate(&config, log_level),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

/// Load the scan config and install logging at its `[log] level`.
fn load_config(
    path: &Path,
    log_level: Option<&str>,
) -> Result<FileConfigAdapter, StratscriptError> {
    let config = FileConfigAdapter::from_file(path);
    let configured = config
        .as_ref()
        .ok()
        .and_then(|c| c.get_string("log", "level"));
    init_logging(log_level.or(configured.as_deref()));
    config
}

fn load_strategies(path: &Path) -> Result<Vec<StrategyDefinition>, StratscriptError> {
    let strategies = FileStrategyAdapter::from_file(path)?.load_strategies()?;
    validate_strategies(&strategies)?;
    Ok(strategies)
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "?".to_string())
}

/// Evaluate `script` (and optional `sell`) against one CSV history.
pub fn eval_file(
    script: &str,
    sell: Option<&str>,
    data: &Path,
    symbol: Option<&str>,
) -> Result<SignalRecord, StratscriptError> {
    let symbol = symbol.map_or_else(|| symbol_from_path(data), str::to_string);
    let bars = CsvQuoteAdapter::read_bars(data)?;
    let mut ctx = EvaluationContext::from_history(symbol.as_str(), PriceSeries::from_bars(&bars))
        .ok_or_else(|| StratscriptError::NoData {
            symbol: symbol.clone(),
        })?;
    info!(%symbol, bars = bars.len(), "evaluating");

    let result = runner::evaluate_pair(Some(script), sell, &mut ctx);

    Ok(SignalRecord {
        strategy_id: "eval".to_string(),
        strategy_name: "eval".to_string(),
        symbol,
        result,
    })
}

fn run_eval(
    script: &str,
    sell: Option<&str>,
    data: &Path,
    symbol: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode, StratscriptError> {
    let record = eval_file(script, sell, data, symbol)?;
    ConsoleSignalAdapter::stdout(format).publish(&record)?;
    Ok(if record.result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(4)
    })
}

/// Validated strategies plus the quote source named by `[data] dir`.
pub fn load_scan(
    config: &FileConfigAdapter,
    config_path: &Path,
) -> Result<(Vec<StrategyDefinition>, CsvQuoteAdapter), StratscriptError> {
    validate_scan_config(config)?;
    let strategies = load_strategies(config_path)?;
    let dir = config.get_string("data", "dir").unwrap_or_default();
    Ok((
        strategies,
        CsvQuoteAdapter::new(resolve_data_dir(config_path, &dir)),
    ))
}

fn run_scan(
    config_path: &Path,
    log_level: Option<&str>,
    format: OutputFormat,
    sequential: bool,
) -> Result<ExitCode, StratscriptError> {
    let config = load_config(config_path, log_level)?;
    let (strategies, quotes) = load_scan(&config, config_path)?;
    let cache = ScriptCache::new();

    let parallel = !sequential && config.get_bool("scan", "parallel", true);
    let threads = config.get_int("scan", "threads", 0);
    if parallel && threads > 0 {
        if let Err(err) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .build_global()
        {
            warn!(%err, "could not size the scan thread pool");
        }
    }

    let records = if parallel {
        scan::scan_parallel(&strategies, &quotes, &cache)
    } else {
        scan::scan(&strategies, &quotes, &cache)
    };
    let failures = records.iter().filter(|r| !r.result.is_ok()).count();
    info!(
        records = records.len(),
        signals = records.iter().filter(|r| r.has_signal()).count(),
        failures,
        "scan complete"
    );

    ConsoleSignalAdapter::stdout(format).publish_all(&records)?;
    Ok(ExitCode::SUCCESS)
}

/// Relative data directories are resolved against the config file's directory.
fn resolve_data_dir(config_path: &Path, dir: &str) -> PathBuf {
    let dir = Path::new(dir.trim());
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    config_path
        .parent()
        .map(|parent| parent.join(dir))
        .unwrap_or_else(|| dir.to_path_buf())
}

fn run_presets(format: OutputFormat) -> Result<ExitCode, StratscriptError> {
    let mut out = io::stdout().lock();
    write_presets(&mut out, format)?;
    Ok(ExitCode::SUCCESS)
}

pub fn write_presets<W: Write>(out: &mut W, format: OutputFormat) -> Result<(), StratscriptError> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(PRESETS).map_err(io::Error::other)?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Text => {
            for PresetTemplate {
                key,
                name,
                description,
                buy_script,
                sell_script,
            } in PRESETS
            {
                writeln!(out, "{} - {}", key, name)?;
                writeln!(out, "  {}", description)?;
                writeln!(out, "  buy:  {}", buy_script)?;
                writeln!(out, "  sell: {}", sell_script)?;
            }
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path, log_level: Option<&str>) -> Result<ExitCode, StratscriptError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path, log_level)?;
    let (strategies, _) = load_scan(&config, config_path)?;

    let mut out = io::stdout().lock();
    for strategy in &strategies {
        writeln!(
            out,
            "[{}] {} ({}, {} symbol(s))",
            strategy.id,
            strategy.name,
            strategy.kind,
            strategy.symbols.len()
        )?;
        let pair = strategy.compile()?;
        if let Some(buy) = &pair.buy {
            writeln!(out, "  buy:  {}", buy)?;
        }
        if let Some(sell) = &pair.sell {
            writeln!(out, "  sell: {}", sell)?;
        }
    }
    writeln!(out, "ok: {} strateg(ies)", strategies.len())?;
    Ok(ExitCode::SUCCESS)
}
