//! Batch evaluation of strategies across their symbols.
//!
//! Every (strategy, symbol) pair gets its own `EvaluationContext`, so pairs
//! share nothing but the compile cache. A failure in one pair is recorded in
//! that pair's result and the scan moves on.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::context::EvaluationContext;
use crate::domain::runner::{EvaluationResult, StrategyScriptPair};
use crate::domain::script_cache::ScriptCache;
use crate::domain::strategy::StrategyDefinition;
use crate::ports::quote_port::QuotePort;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub strategy_id: String,
    pub strategy_name: String,
    pub symbol: String,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

impl SignalRecord {
    pub fn has_signal(&self) -> bool {
        self.result.buy_signal || self.result.sell_signal
    }
}

/// A compiled strategy paired with one of its symbols.
struct Job<'a> {
    strategy: &'a StrategyDefinition,
    scripts: Result<StrategyScriptPair, String>,
    symbol: &'a str,
}

fn plan<'a>(strategies: &'a [StrategyDefinition], cache: &ScriptCache) -> Vec<Job<'a>> {
    let mut jobs = Vec::new();
    for strategy in strategies {
        let Some(script) = strategy.active_script() else {
            continue;
        };
        let scripts = StrategyScriptPair::compile_cached(
            Some(script.buy_script.as_str()),
            Some(script.sell_script.as_str()),
            cache,
        )
        .map_err(|e| e.to_string());

        for symbol in &strategy.symbols {
            jobs.push(Job {
                strategy,
                scripts: scripts.clone(),
                symbol,
            });
        }
    }
    jobs
}

fn run_job(job: &Job<'_>, quotes: &dyn QuotePort) -> SignalRecord {
    let result = match &job.scripts {
        Ok(scripts) => evaluate_symbol(scripts, job.symbol, quotes),
        Err(err) => EvaluationResult::failed(err.clone()),
    };
    if let Some(error) = &result.error {
        warn!(
            strategy = %job.strategy.id,
            symbol = job.symbol,
            %error,
            "evaluation failed"
        );
    }
    SignalRecord {
        strategy_id: job.strategy.id.clone(),
        strategy_name: job.strategy.name.clone(),
        symbol: job.symbol.to_string(),
        result,
    }
}

fn evaluate_symbol(
    scripts: &StrategyScriptPair,
    symbol: &str,
    quotes: &dyn QuotePort,
) -> EvaluationResult {
    match quotes.fetch_snapshot(symbol) {
        Ok((quote, history)) => {
            let mut ctx = EvaluationContext::new(symbol, quote, history);
            scripts.run(&mut ctx)
        }
        Err(err) => EvaluationResult::failed(err.to_string()),
    }
}

/// Evaluate every enabled script strategy against each of its symbols, in order.
pub fn scan(
    strategies: &[StrategyDefinition],
    quotes: &dyn QuotePort,
    cache: &ScriptCache,
) -> Vec<SignalRecord> {
    let jobs = plan(strategies, cache);
    info!(pairs = jobs.len(), "scanning");
    jobs.iter().map(|job| run_job(job, quotes)).collect()
}

/// `scan` with pairs evaluated on the rayon pool; output order matches `scan`.
pub fn scan_parallel(
    strategies: &[StrategyDefinition],
    quotes: &(dyn QuotePort + Sync),
    cache: &ScriptCache,
) -> Vec<SignalRecord> {
    let jobs = plan(strategies, cache);
    info!(pairs = jobs.len(), "scanning in parallel");
    jobs.par_iter().map(|job| run_job(job, quotes)).collect()
}
