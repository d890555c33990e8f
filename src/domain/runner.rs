//! Strategy script runner.
//!
//! Runs a strategy's buy and sell expressions against one context and folds
//! the outcomes into an `EvaluationResult`. Errors are reported inside the
//! result; nothing here aborts a caller's batch.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::context::EvaluationContext;
use crate::domain::error::{EvalError, ParseError};
use crate::domain::expr::Expr;
use crate::domain::expr_eval;
use crate::domain::expr_parser::parse;
use crate::domain::script_cache::ScriptCache;
use crate::domain::value::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub buy_signal: bool,
    pub sell_signal: bool,
    /// Numeric result, surfaced only when exactly one expression ran.
    pub value: Option<f64>,
    pub error: Option<String>,
}

impl EvaluationResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub fn compile(script: &str) -> Result<Expr, ParseError> {
    parse(script)
}

/// Compiled buy/sell pair; blank scripts compile to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyScriptPair {
    pub buy: Option<Arc<Expr>>,
    pub sell: Option<Arc<Expr>>,
}

fn non_blank(script: Option<&str>) -> Option<&str> {
    script.map(str::trim).filter(|s| !s.is_empty())
}

impl StrategyScriptPair {
    pub fn compile(buy: Option<&str>, sell: Option<&str>) -> Result<Self, ParseError> {
        let compile = |s: &str| parse(s).map(Arc::new);
        Ok(Self {
            buy: non_blank(buy).map(compile).transpose()?,
            sell: non_blank(sell).map(compile).transpose()?,
        })
    }

    /// Like `compile`, reusing ASTs from `cache`.
    pub fn compile_cached(
        buy: Option<&str>,
        sell: Option<&str>,
        cache: &ScriptCache,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            buy: non_blank(buy)
                .map(|s| cache.get_or_compile(s))
                .transpose()?,
            sell: non_blank(sell)
                .map(|s| cache.get_or_compile(s))
                .transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.buy.is_none() && self.sell.is_none()
    }

    pub fn run(&self, ctx: &mut EvaluationContext) -> EvaluationResult {
        let buy = self.buy.as_deref().map(|expr| run_one(expr, ctx));
        let sell = self.sell.as_deref().map(|expr| run_one(expr, ctx));

        let error = [&buy, &sell]
            .into_iter()
            .flatten()
            .find_map(|outcome| outcome.as_ref().err())
            .map(ToString::to_string);

        if let Some(error) = error {
            debug!(symbol = ctx.symbol(), %error, "script evaluation failed");
            return EvaluationResult::failed(error);
        }

        let value = match (&buy, &sell) {
            (Some(Ok(outcome)), None) | (None, Some(Ok(outcome))) => outcome.number,
            _ => None,
        };
        let signal = |outcome: &Option<Result<Outcome, EvalError>>| {
            matches!(outcome, Some(Ok(Outcome { signal: true, .. })))
        };

        EvaluationResult {
            buy_signal: signal(&buy),
            sell_signal: signal(&sell),
            value,
            error: None,
        }
    }
}

struct Outcome {
    signal: bool,
    number: Option<f64>,
}

fn run_one(expr: &Expr, ctx: &mut EvaluationContext) -> Result<Outcome, EvalError> {
    let value = expr_eval::evaluate(expr, ctx)?;
    let signal = value.truthy("signal")?.unwrap_or(false);
    let number = match value {
        Value::Number(_) | Value::Series(_) => value.as_number(),
        _ => None,
    };
    Ok(Outcome { signal, number })
}

/// Compile one side, rendering a parse error against that side's text.
fn compile_side(script: Option<&str>) -> Result<Option<Arc<Expr>>, String> {
    non_blank(script)
        .map(|s| {
            parse(s)
                .map(Arc::new)
                .map_err(|err| err.display_with_context(s))
        })
        .transpose()
}

/// Compile and run a buy/sell pair from source text.
pub fn evaluate_pair(
    buy: Option<&str>,
    sell: Option<&str>,
    ctx: &mut EvaluationContext,
) -> EvaluationResult {
    let pair = compile_side(buy).and_then(|buy| {
        Ok(StrategyScriptPair {
            buy,
            sell: compile_side(sell)?,
        })
    });
    match pair {
        Ok(pair) => pair.run(ctx),
        Err(error) => EvaluationResult::failed(error),
    }
}

/// Compile and run `script` as a lone buy condition.
pub fn evaluate(script: &str, ctx: &mut EvaluationContext) -> EvaluationResult {
    evaluate_pair(Some(script), None, ctx)
}
