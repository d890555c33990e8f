//! Technical indicator implementations.
//!
//! Every indicator is a pure function over `f64` slices returning a series
//! aligned to the tail of its input: warmup points are omitted rather than
//! zero-filled, and too little input yields an empty series.
//!
//! - `IndicatorType`: indicator identity + parameters (serves as cache key)
//! - `IndicatorOutput`: single- or multi-line result of one indicator call
//! - `IndicatorField`: which line of a multi-line result to read

pub mod bollinger;
pub mod crossover;
pub mod ema;
pub mod kdj;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod williams_r;
pub mod wma;

pub use bollinger::{BollingerBands, calculate_bollinger};
pub use crossover::{Crossover, calculate_crossover};
pub use ema::calculate_ema;
pub use kdj::{Kdj, calculate_kdj};
pub use macd::{Macd, calculate_macd};
pub use roc::calculate_roc;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;
pub use williams_r::calculate_williams_r;
pub use wma::calculate_wma;

use std::fmt;
use std::sync::Arc;

use crate::domain::series::Hlc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Wma(usize),
    Rsi(usize),
    Roc(usize),
    Stddev(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// The multiplier is stored as raw `f64` bits so the type stays hashable.
    Bollinger {
        period: usize,
        multiplier_bits: u64,
    },
    Kdj {
        period: usize,
        k_smooth: usize,
        d_smooth: usize,
    },
    WilliamsR(usize),
}

impl IndicatorType {
    pub fn bollinger(period: usize, multiplier: f64) -> Self {
        IndicatorType::Bollinger {
            period,
            multiplier_bits: multiplier.to_bits(),
        }
    }

    /// KDJ and Williams %R read highs and lows as well as closes.
    pub fn requires_high_low(&self) -> bool {
        matches!(self, IndicatorType::Kdj { .. } | IndicatorType::WilliamsR(_))
    }

    /// Run the indicator over `values`, or over `hlc` for range indicators.
    ///
    /// Returns `None` when a range indicator is asked for without high/low data.
    pub fn compute(&self, values: &[f64], hlc: Option<Hlc<'_>>) -> Option<IndicatorOutput> {
        let output = match *self {
            IndicatorType::Sma(period) => IndicatorOutput::line(calculate_sma(values, period)),
            IndicatorType::Ema(period) => IndicatorOutput::line(calculate_ema(values, period)),
            IndicatorType::Wma(period) => IndicatorOutput::line(calculate_wma(values, period)),
            IndicatorType::Rsi(period) => IndicatorOutput::line(calculate_rsi(values, period)),
            IndicatorType::Roc(period) => IndicatorOutput::line(calculate_roc(values, period)),
            IndicatorType::Stddev(period) => {
                IndicatorOutput::line(calculate_stddev(values, period))
            }
            IndicatorType::Macd { fast, slow, signal } => {
                let macd = calculate_macd(values, fast, slow, signal);
                IndicatorOutput::Macd {
                    line: macd.line.into(),
                    signal: macd.signal.into(),
                    histogram: macd.histogram.into(),
                }
            }
            IndicatorType::Bollinger {
                period,
                multiplier_bits,
            } => {
                let bands = calculate_bollinger(values, period, f64::from_bits(multiplier_bits));
                IndicatorOutput::Bollinger {
                    upper: bands.upper.into(),
                    middle: bands.middle.into(),
                    lower: bands.lower.into(),
                }
            }
            IndicatorType::Kdj {
                period,
                k_smooth,
                d_smooth,
            } => {
                let kdj = calculate_kdj(hlc?, period, k_smooth, d_smooth);
                IndicatorOutput::Kdj {
                    k: kdj.k.into(),
                    d: kdj.d.into(),
                    j: kdj.j.into(),
                }
            }
            IndicatorType::WilliamsR(period) => {
                IndicatorOutput::line(calculate_williams_r(hlc?, period))
            }
        };
        Some(output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
    KdjK,
    KdjD,
    KdjJ,
}

/// Computed indicator lines, shared cheaply between cache and evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutput {
    Simple(Arc<[f64]>),
    Macd {
        line: Arc<[f64]>,
        signal: Arc<[f64]>,
        histogram: Arc<[f64]>,
    },
    Bollinger {
        upper: Arc<[f64]>,
        middle: Arc<[f64]>,
        lower: Arc<[f64]>,
    },
    Kdj {
        k: Arc<[f64]>,
        d: Arc<[f64]>,
        j: Arc<[f64]>,
    },
}

impl IndicatorOutput {
    fn line(values: Vec<f64>) -> Self {
        IndicatorOutput::Simple(values.into())
    }

    pub fn field(&self, field: IndicatorField) -> Option<&Arc<[f64]>> {
        match (self, field) {
            (IndicatorOutput::Simple(v), IndicatorField::Value) => Some(v),
            (IndicatorOutput::Macd { line, .. }, IndicatorField::MacdLine) => Some(line),
            (IndicatorOutput::Macd { signal, .. }, IndicatorField::MacdSignal) => Some(signal),
            (IndicatorOutput::Macd { histogram, .. }, IndicatorField::MacdHistogram) => {
                Some(histogram)
            }
            (IndicatorOutput::Bollinger { upper, .. }, IndicatorField::BollingerUpper) => {
                Some(upper)
            }
            (IndicatorOutput::Bollinger { middle, .. }, IndicatorField::BollingerMiddle) => {
                Some(middle)
            }
            (IndicatorOutput::Bollinger { lower, .. }, IndicatorField::BollingerLower) => {
                Some(lower)
            }
            (IndicatorOutput::Kdj { k, .. }, IndicatorField::KdjK) => Some(k),
            (IndicatorOutput::Kdj { d, .. }, IndicatorField::KdjD) => Some(d),
            (IndicatorOutput::Kdj { j, .. }, IndicatorField::KdjJ) => Some(j),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "sma({})", period),
            IndicatorType::Ema(period) => write!(f, "ema({})", period),
            IndicatorType::Wma(period) => write!(f, "wma({})", period),
            IndicatorType::Rsi(period) => write!(f, "rsi({})", period),
            IndicatorType::Roc(period) => write!(f, "roc({})", period),
            IndicatorType::Stddev(period) => write!(f, "stddev({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "macd({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                multiplier_bits,
            } => write!(f, "boll({},{})", period, f64::from_bits(*multiplier_bits)),
            IndicatorType::Kdj {
                period,
                k_smooth,
                d_smooth,
            } => write!(f, "kdj({},{},{})", period, k_smooth, d_smooth),
            IndicatorType::WilliamsR(period) => write!(f, "williams_r({})", period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "sma(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "macd(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        assert_eq!(IndicatorType::bollinger(20, 2.0).to_string(), "boll(20,2)");
        assert_eq!(IndicatorType::bollinger(20, 2.5).to_string(), "boll(20,2.5)");
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(20), "sma20");
        map.insert(IndicatorType::Sma(50), "sma50");
        map.insert(IndicatorType::bollinger(20, 2.0), "boll");

        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"sma20"));
        assert_eq!(map.get(&IndicatorType::bollinger(20, 2.0)), Some(&"boll"));
        assert_eq!(map.get(&IndicatorType::bollinger(20, 2.5)), None);
    }

    #[test]
    fn range_indicators_need_high_low() {
        let kdj = IndicatorType::Kdj {
            period: 9,
            k_smooth: 3,
            d_smooth: 3,
        };
        assert!(kdj.requires_high_low());
        assert!(IndicatorType::WilliamsR(14).requires_high_low());
        assert!(!IndicatorType::Rsi(14).requires_high_low());

        assert!(kdj.compute(&[1.0, 2.0, 3.0], None).is_none());
        assert!(IndicatorType::WilliamsR(2).compute(&[1.0, 2.0], None).is_none());
    }

    #[test]
    fn compute_selects_fields() {
        let prices: Vec<f64> = (1..=40).map(|i| i as f64).collect();
        let out = IndicatorType::Macd {
            fast: 3,
            slow: 6,
            signal: 3,
        }
        .compute(&prices, None)
        .unwrap();

        assert!(out.field(IndicatorField::MacdLine).is_some());
        assert!(out.field(IndicatorField::MacdSignal).is_some());
        assert!(out.field(IndicatorField::MacdHistogram).is_some());
        assert!(out.field(IndicatorField::Value).is_none());
        assert!(out.field(IndicatorField::KdjK).is_none());
    }

    #[test]
    fn compute_range_indicator_with_hlc() {
        let highs = [11.0, 12.0, 13.0];
        let lows = [9.0, 10.0, 11.0];
        let closes = [10.0, 11.0, 12.0];
        let hlc = Hlc::new(&highs, &lows, &closes).unwrap();
        let out = IndicatorType::WilliamsR(2)
            .compute(&closes, Some(hlc))
            .unwrap();
        assert_eq!(out.field(IndicatorField::Value).unwrap().len(), 2);
    }
}
