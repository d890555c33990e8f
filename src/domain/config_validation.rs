//! Configuration validation.
//!
//! Checks the scan configuration and every strategy definition before any
//! data is loaded, so a bad file fails fast with the offending key.

use crate::domain::error::StratscriptError;
use crate::domain::runner::compile;
use crate::domain::strategy::{StrategyDefinition, StrategyKind};
use crate::ports::config_port::ConfigPort;

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), StratscriptError> {
    validate_data_dir(config)?;
    validate_log_level(config)?;
    validate_threads(config)?;
    Ok(())
}

pub fn validate_strategies(strategies: &[StrategyDefinition]) -> Result<(), StratscriptError> {
    for strategy in strategies {
        validate_strategy(strategy)?;
    }
    Ok(())
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), StratscriptError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StratscriptError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), StratscriptError> {
    match config.get_string("log", "level") {
        Some(level) if !LOG_LEVELS.contains(&level.trim().to_lowercase().as_str()) => {
            Err(StratscriptError::ConfigInvalid {
                section: "log".to_string(),
                key: "level".to_string(),
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            })
        }
        _ => Ok(()),
    }
}

fn validate_threads(config: &dyn ConfigPort) -> Result<(), StratscriptError> {
    match config.get_string("scan", "threads") {
        Some(raw) if raw.trim().parse::<usize>().is_err() => Err(StratscriptError::ConfigInvalid {
            section: "scan".to_string(),
            key: "threads".to_string(),
            reason: format!("expected a non-negative integer, got '{}'", raw.trim()),
        }),
        _ => Ok(()),
    }
}

fn validate_strategy(strategy: &StrategyDefinition) -> Result<(), StratscriptError> {
    if strategy.kind != StrategyKind::Script {
        return Ok(());
    }

    if strategy.symbols.is_empty() {
        return Err(StratscriptError::ScriptInvalid {
            strategy: strategy.id.clone(),
            reason: "script strategy has no symbols".to_string(),
        });
    }

    let Some(script) = &strategy.script else {
        return Err(StratscriptError::ScriptInvalid {
            strategy: strategy.id.clone(),
            reason: "script strategy has no buy_script or sell_script".to_string(),
        });
    };

    for (key, text) in [
        ("buy_script", &script.buy_script),
        ("sell_script", &script.sell_script),
    ] {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if let Err(err) = compile(text) {
            return Err(StratscriptError::ScriptInvalid {
                strategy: strategy.id.clone(),
                reason: format!("{}:\n{}", key, err.display_with_context(text)),
            });
        }
    }

    if script.buy_script.trim().is_empty() && script.sell_script.trim().is_empty() {
        return Err(StratscriptError::ScriptInvalid {
            strategy: strategy.id.clone(),
            reason: "script strategy has no buy_script or sell_script".to_string(),
        });
    }
    Ok(())
}
