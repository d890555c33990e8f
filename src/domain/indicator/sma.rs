//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Output holds one value per full window: `len - n + 1` points.

pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    prices
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}
