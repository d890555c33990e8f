//! Quote and aligned price series.
//!
//! `PriceSeries` bundles the close series with optional high/low companions.
//! The companions are checked for equal length at construction so that
//! indicators consuming several series never slice ad hoc.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::price_bar::PriceBar;

/// Current price and fractional change versus the previous close (0.05 = +5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
}

impl Quote {
    pub fn new(price: f64, change: f64) -> Self {
        Self { price, change }
    }

    pub fn change_percent(&self) -> f64 {
        self.change * 100.0
    }
}

/// Which context series a value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesSource {
    Close,
    High,
    Low,
}

impl fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesSource::Close => write!(f, "prices"),
            SeriesSource::High => write!(f, "highs"),
            SeriesSource::Low => write!(f, "lows"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name} series has {found} points, expected {expected}")]
pub struct SeriesLengthMismatch {
    pub name: &'static str,
    pub expected: usize,
    pub found: usize,
}

/// High and low series aligned with the closes.
#[derive(Debug, Clone, PartialEq)]
pub struct HighLow {
    pub highs: Arc<[f64]>,
    pub lows: Arc<[f64]>,
}

/// Borrowed high/low/close view with equal lengths, as consumed by range
/// indicators (KDJ, Williams %R).
#[derive(Debug, Clone, Copy)]
pub struct Hlc<'a> {
    highs: &'a [f64],
    lows: &'a [f64],
    closes: &'a [f64],
}

impl<'a> Hlc<'a> {
    pub fn new(
        highs: &'a [f64],
        lows: &'a [f64],
        closes: &'a [f64],
    ) -> Result<Self, SeriesLengthMismatch> {
        for (name, len) in [("highs", highs.len()), ("lows", lows.len())] {
            if len != closes.len() {
                return Err(SeriesLengthMismatch {
                    name,
                    expected: closes.len(),
                    found: len,
                });
            }
        }
        Ok(Self {
            highs,
            lows,
            closes,
        })
    }

    pub fn highs(&self) -> &'a [f64] {
        self.highs
    }

    pub fn lows(&self) -> &'a [f64] {
        self.lows
    }

    pub fn closes(&self) -> &'a [f64] {
        self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Highest high and lowest low over `[start, end)`.
    pub fn range_extremes(&self, start: usize, end: usize) -> (f64, f64) {
        let highest = self.highs[start..end]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest = self.lows[start..end]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        (highest, lowest)
    }
}

/// Chronological close prices (oldest first) with optional aligned highs/lows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    closes: Arc<[f64]>,
    high_low: Option<HighLow>,
}

impl PriceSeries {
    pub fn from_closes(closes: Vec<f64>) -> Self {
        Self {
            closes: closes.into(),
            high_low: None,
        }
    }

    pub fn with_high_low(
        closes: Vec<f64>,
        highs: Vec<f64>,
        lows: Vec<f64>,
    ) -> Result<Self, SeriesLengthMismatch> {
        if highs.len() != closes.len() {
            return Err(SeriesLengthMismatch {
                name: "highs",
                expected: closes.len(),
                found: highs.len(),
            });
        }
        if lows.len() != closes.len() {
            return Err(SeriesLengthMismatch {
                name: "lows",
                expected: closes.len(),
                found: lows.len(),
            });
        }
        Ok(Self {
            closes: closes.into(),
            high_low: Some(HighLow {
                highs: highs.into(),
                lows: lows.into(),
            }),
        })
    }

    /// Build from bars; bars are expected in chronological order.
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        let closes: Arc<[f64]> = bars.iter().map(|b| b.close).collect();
        let highs: Arc<[f64]> = bars.iter().map(|b| b.high).collect();
        let lows: Arc<[f64]> = bars.iter().map(|b| b.low).collect();
        Self {
            closes,
            high_low: Some(HighLow { highs, lows }),
        }
    }

    pub fn closes(&self) -> &Arc<[f64]> {
        &self.closes
    }

    pub fn highs(&self) -> Option<&Arc<[f64]>> {
        self.high_low.as_ref().map(|hl| &hl.highs)
    }

    pub fn lows(&self) -> Option<&Arc<[f64]>> {
        self.high_low.as_ref().map(|hl| &hl.lows)
    }

    pub fn high_low(&self) -> Option<&HighLow> {
        self.high_low.as_ref()
    }

    /// Aligned high/low/close view, when highs and lows were supplied.
    pub fn hlc(&self) -> Option<Hlc<'_>> {
        self.high_low.as_ref().map(|hl| Hlc {
            highs: &hl.highs,
            lows: &hl.lows,
            closes: &self.closes,
        })
    }

    pub fn source(&self, source: SeriesSource) -> Option<&Arc<[f64]>> {
        match source {
            SeriesSource::Close => Some(&self.closes),
            SeriesSource::High => self.highs(),
            SeriesSource::Low => self.lows(),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Quote implied by the last two closes, if there are any.
    pub fn implied_quote(&self) -> Option<Quote> {
        let last = *self.closes.last()?;
        let change = match self.closes.len() {
            n if n >= 2 => {
                let prev = self.closes[n - 2];
                if prev == 0.0 { 0.0 } else { (last - prev) / prev }
            }
            _ => 0.0,
        };
        Some(Quote::new(last, change))
    }
}
