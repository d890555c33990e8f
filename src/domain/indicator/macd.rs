//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow), aligned to the shorter tail
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line, aligned to the signal tail
//!
//! Default parameters: fast=12, slow=26, signal=9

use crate::domain::indicator::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}

pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize, signal_period: usize) -> Macd {
    let ema_fast = calculate_ema(prices, fast);
    let ema_slow = calculate_ema(prices, slow);
    if ema_fast.is_empty() || ema_slow.is_empty() {
        return Macd::default();
    }

    let len = ema_fast.len().min(ema_slow.len());
    let fast_tail = &ema_fast[ema_fast.len() - len..];
    let slow_tail = &ema_slow[ema_slow.len() - len..];
    let line: Vec<f64> = fast_tail
        .iter()
        .zip(slow_tail)
        .map(|(f, s)| f - s)
        .collect();

    let signal = calculate_ema(&line, signal_period);
    let line_tail = &line[line.len() - signal.len()..];
    let histogram = line_tail
        .iter()
        .zip(&signal)
        .map(|(m, s)| m - s)
        .collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(prices: &[f64]) -> Macd {
    calculate_macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
