#![allow(dead_code)]

use chrono::NaiveDate;
pub use stratscript::domain::price_bar::PriceBar;
use stratscript::domain::context::EvaluationContext;
use stratscript::domain::error::StratscriptError;
use stratscript::domain::series::{PriceSeries, Quote};
use stratscript::domain::strategy::{ScriptConfig, StrategyDefinition, StrategyKind};
use stratscript::ports::quote_port::QuotePort;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockQuotePort {
    pub bars: HashMap<String, Vec<PriceBar>>,
    pub quotes: HashMap<String, Quote>,
    pub errors: HashMap<String, String>,
    pub fetches: AtomicUsize,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            quotes: HashMap::new(),
            errors: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_closes(self, symbol: &str, closes: &[f64]) -> Self {
        self.with_bars(symbol, bars_from_closes("2024-01-01", closes))
    }

    /// Overrides the quote implied by the history.
    pub fn with_quote(mut self, symbol: &str, quote: Quote) -> Self {
        self.quotes.insert(symbol.to_string(), quote);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self, symbol: &str) -> Result<(), StratscriptError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.errors.get(symbol) {
            Some(reason) => Err(StratscriptError::DataSource {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_quote(&self, symbol: &str) -> Result<Quote, StratscriptError> {
        self.check(symbol)?;
        if let Some(quote) = self.quotes.get(symbol) {
            return Ok(*quote);
        }
        self.fetch_history(symbol)?
            .implied_quote()
            .ok_or_else(|| StratscriptError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn fetch_history(&self, symbol: &str) -> Result<PriceSeries, StratscriptError> {
        self.check(symbol)?;
        self.bars
            .get(symbol)
            .map(|bars| PriceSeries::from_bars(bars))
            .ok_or_else(|| StratscriptError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn fetch_snapshot(&self, symbol: &str) -> Result<(Quote, PriceSeries), StratscriptError> {
        let history = self.fetch_history(symbol)?;
        let quote = match self.quotes.get(symbol) {
            Some(quote) => *quote,
            None => history
                .implied_quote()
                .ok_or_else(|| StratscriptError::NoData {
                    symbol: symbol.to_string(),
                })?,
        };
        Ok((quote, history))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars with high = close + 1 and low = close - 1.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            high: close + 1.0,
            low: close - 1.0,
            close,
        })
        .collect()
}

pub fn rising(count: usize, start: f64) -> Vec<f64> {
    (0..count).map(|i| start + i as f64).collect()
}

pub fn falling(count: usize, start: f64) -> Vec<f64> {
    (0..count).map(|i| start - i as f64).collect()
}

pub fn context(closes: &[f64]) -> EvaluationContext {
    EvaluationContext::from_history(
        "TEST",
        PriceSeries::from_bars(&bars_from_closes("2024-01-01", closes)),
    )
    .unwrap()
}

pub fn close_only_context(closes: &[f64]) -> EvaluationContext {
    EvaluationContext::from_history("TEST", PriceSeries::from_closes(closes.to_vec())).unwrap()
}

pub fn script_strategy(id: &str, symbols: &[&str], buy: &str, sell: &str) -> StrategyDefinition {
    StrategyDefinition {
        id: id.to_string(),
        name: id.to_uppercase(),
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        kind: StrategyKind::Script,
        script: Some(ScriptConfig {
            buy_script: buy.to_string(),
            sell_script: sell.to_string(),
            enabled: true,
        }),
    }
}
