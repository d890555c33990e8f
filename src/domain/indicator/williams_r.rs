//! Williams %R oscillator.
//!
//! %R = (HighestHigh(n) - C) / (HighestHigh(n) - LowestLow(n)) * -100
//! Defined as -50 when the window's range is flat.
//! Warmup: first (n-1) points produce no value.

use crate::domain::series::Hlc;

pub const DEFAULT_PERIOD: usize = 14;

const FLAT_RANGE: f64 = -50.0;

pub fn calculate_williams_r(hlc: Hlc<'_>, period: usize) -> Vec<f64> {
    if period == 0 || hlc.len() < period {
        return Vec::new();
    }

    (period..=hlc.len())
        .map(|end| {
            let (highest, lowest) = hlc.range_extremes(end - period, end);
            let close = hlc.closes()[end - 1];
            if highest == lowest {
                FLAT_RANGE
            } else {
                (highest - close) / (highest - lowest) * -100.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn williams_r_close_at_high_is_zero() {
        let highs = [10.0, 12.0, 14.0];
        let lows = [8.0, 9.0, 10.0];
        let closes = [9.0, 11.0, 14.0];
        let wr = calculate_williams_r(Hlc::new(&highs, &lows, &closes).unwrap(), 3);
        assert_eq!(wr.len(), 1);
        assert!(wr[0].abs() < f64::EPSILON);
    }

    #[test]
    fn williams_r_close_at_low_is_minus_100() {
        let highs = [10.0, 12.0, 14.0];
        let lows = [8.0, 9.0, 10.0];
        let closes = [9.0, 11.0, 8.0];
        let wr = calculate_williams_r(Hlc::new(&highs, &lows, &closes).unwrap(), 3);
        assert!((wr[0] + 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn williams_r_midpoint() {
        let highs = [20.0, 20.0];
        let lows = [10.0, 10.0];
        let closes = [15.0, 17.5];
        let wr = calculate_williams_r(Hlc::new(&highs, &lows, &closes).unwrap(), 2);
        assert_eq!(wr.len(), 1);
        assert!((wr[0] + 25.0).abs() < 1e-12);
    }

    #[test]
    fn williams_r_flat_range() {
        let v = [5.0; 4];
        let wr = calculate_williams_r(Hlc::new(&v, &v, &v).unwrap(), 2);
        assert_eq!(wr, vec![-50.0, -50.0, -50.0]);
    }

    #[test]
    fn williams_r_insufficient_data() {
        let v = [5.0; 4];
        assert!(calculate_williams_r(Hlc::new(&v, &v, &v).unwrap(), 14).is_empty());
        assert!(calculate_williams_r(Hlc::new(&v, &v, &v).unwrap(), 0).is_empty());
    }
}
