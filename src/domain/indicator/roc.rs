//! ROC (Rate of Change) indicator.
//!
//! ROC(n)[i] = ((P[i] - P[i-n]) / P[i-n]) * 100
//! If P[i-n] == 0: ROC = 0
//! Warmup: first n points produce no value.

pub fn calculate_roc(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() <= period {
        return Vec::new();
    }

    prices
        .iter()
        .zip(&prices[period..])
        .map(|(&prev, &curr)| {
            if prev == 0.0 {
                0.0
            } else {
                ((curr - prev) / prev) * 100.0
            }
        })
        .collect()
}
