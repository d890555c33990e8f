//! Per-evaluation context.
//!
//! An `EvaluationContext` owns the quote and history for one symbol plus an
//! `IndicatorCache` memoizing indicator calls over those series. Contexts are
//! built fresh per symbol and per cycle, so cached values never cross symbols.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::indicator::{IndicatorOutput, IndicatorType};
use crate::domain::series::{PriceSeries, Quote, SeriesSource};

#[derive(Debug, Default)]
pub struct IndicatorCache {
    entries: HashMap<(IndicatorType, SeriesSource), IndicatorOutput>,
    hits: usize,
    misses: usize,
}

impl IndicatorCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn contains(&self, indicator: IndicatorType, source: SeriesSource) -> bool {
        self.entries.contains_key(&(indicator, source))
    }
}

#[derive(Debug)]
pub struct EvaluationContext {
    symbol: String,
    quote: Quote,
    series: PriceSeries,
    cache: IndicatorCache,
}

impl EvaluationContext {
    pub fn new(symbol: impl Into<String>, quote: Quote, series: PriceSeries) -> Self {
        Self {
            symbol: symbol.into(),
            quote,
            series,
            cache: IndicatorCache::default(),
        }
    }

    /// Context whose quote is implied by the last two closes of `series`.
    pub fn from_history(symbol: impl Into<String>, series: PriceSeries) -> Option<Self> {
        let quote = series.implied_quote()?;
        Some(Self::new(symbol, quote, series))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn cache(&self) -> &IndicatorCache {
        &self.cache
    }

    /// Indicator over one of this context's series, computed at most once.
    ///
    /// Range indicators ignore `source` and read the high/low/close view.
    /// Returns `None` when the series it needs is absent.
    pub fn indicator(
        &mut self,
        indicator: IndicatorType,
        source: SeriesSource,
    ) -> Option<IndicatorOutput> {
        let source = if indicator.requires_high_low() {
            SeriesSource::Close
        } else {
            source
        };
        let key = (indicator, source);

        if let Some(output) = self.cache.entries.get(&key) {
            self.cache.hits += 1;
            return Some(output.clone());
        }

        let values = self.series.source(source)?;
        let output = indicator.compute(values, self.series.hlc())?;
        self.cache.misses += 1;
        debug!(
            symbol = %self.symbol,
            indicator = %indicator,
            source = %source,
            points = values.len(),
            "computed indicator"
        );
        self.cache.entries.insert(key, output.clone());
        Some(output)
    }
}
