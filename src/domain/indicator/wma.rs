//! Weighted Moving Average indicator.
//!
//! O(n) sliding window: the weighted sum is advanced by adding n×P[i] and
//! subtracting the previous window's plain sum.
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! Warmup: first (n-1) points produce no value.

pub fn calculate_wma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let mut values = Vec::with_capacity(prices.len() - period + 1);
    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum: f64 = 0.0;
    let mut window_sum: f64 = 0.0;

    for (i, &price) in prices.iter().enumerate() {
        if i < period {
            weighted_sum += (i + 1) as f64 * price;
            window_sum += price;
        } else {
            weighted_sum += period as f64 * price - window_sum;
            window_sum += price - prices[i - period];
        }

        if i + 1 >= period {
            values.push(weighted_sum / divisor);
        }
    }

    values
}
