//! KDJ stochastic oscillator.
//!
//! RSV = (C - LowestLow(n)) / (HighestHigh(n) - LowestLow(n)) * 100, 50 on a flat range
//! K[t] = (RSV[t] + (k_smooth - 1) * K[t-1]) / k_smooth, K seeded at 50
//! D[t] = (K[t] + (d_smooth - 1) * D[t-1]) / d_smooth, D seeded at 50
//! J = 3K - 2D
//!
//! Default parameters: period=9, k_smooth=3, d_smooth=3
//! Warmup: first (n-1) points produce no value.

use crate::domain::series::Hlc;

pub const DEFAULT_PERIOD: usize = 9;
pub const DEFAULT_K_SMOOTH: usize = 3;
pub const DEFAULT_D_SMOOTH: usize = 3;

/// Seed for the K and D recursions, and RSV on a flat range.
const MIDPOINT: f64 = 50.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kdj {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

pub fn calculate_kdj(hlc: Hlc<'_>, period: usize, k_smooth: usize, d_smooth: usize) -> Kdj {
    if period == 0 || k_smooth == 0 || d_smooth == 0 || hlc.len() < period {
        return Kdj::default();
    }

    let count = hlc.len() - period + 1;
    let mut kdj = Kdj {
        k: Vec::with_capacity(count),
        d: Vec::with_capacity(count),
        j: Vec::with_capacity(count),
    };

    let ks = k_smooth as f64;
    let ds = d_smooth as f64;
    let mut k = MIDPOINT;
    let mut d = MIDPOINT;

    for end in period..=hlc.len() {
        let (highest, lowest) = hlc.range_extremes(end - period, end);
        let close = hlc.closes()[end - 1];
        let rsv = if highest == lowest {
            MIDPOINT
        } else {
            (close - lowest) / (highest - lowest) * 100.0
        };

        k = (rsv + (ks - 1.0) * k) / ks;
        d = (k + (ds - 1.0) * d) / ds;
        kdj.k.push(k);
        kdj.d.push(d);
        kdj.j.push(3.0 * k - 2.0 * d);
    }

    kdj
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kdj_flat_range_stays_at_midpoint() {
        let v = [10.0; 12];
        let kdj = calculate_kdj(Hlc::new(&v, &v, &v).unwrap(), 9, 3, 3);
        assert_eq!(kdj.k.len(), 4);
        for i in 0..4 {
            assert!((kdj.k[i] - 50.0).abs() < f64::EPSILON);
            assert!((kdj.d[i] - 50.0).abs() < f64::EPSILON);
            assert!((kdj.j[i] - 50.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn kdj_single_window_flat() {
        let v = [7.0];
        let kdj = calculate_kdj(Hlc::new(&v, &v, &v).unwrap(), 1, 3, 3);
        assert_eq!(kdj.k, vec![50.0]);
        assert_eq!(kdj.d, vec![50.0]);
        assert_eq!(kdj.j, vec![50.0]);
    }

    #[test]
    fn kdj_first_point_from_seed() {
        // window: high 12, low 8, close 11 -> RSV 75
        let highs = [10.0, 12.0];
        let lows = [8.0, 9.0];
        let closes = [9.0, 11.0];
        let kdj = calculate_kdj(Hlc::new(&highs, &lows, &closes).unwrap(), 2, 3, 3);

        let k = (75.0 + 2.0 * 50.0) / 3.0;
        let d = (k + 2.0 * 50.0) / 3.0;
        assert_eq!(kdj.k.len(), 1);
        assert!((kdj.k[0] - k).abs() < 1e-12);
        assert!((kdj.d[0] - d).abs() < 1e-12);
        assert!((kdj.j[0] - (3.0 * k - 2.0 * d)).abs() < 1e-12);
    }

    #[test]
    fn kdj_close_at_high_pushes_k_up() {
        let highs: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let lows: Vec<f64> = (0..20).map(|i| 98.0 + i as f64).collect();
        let closes = highs.clone();
        let kdj = calculate_kdj(Hlc::new(&highs, &lows, &closes).unwrap(), 9, 3, 3);
        let last = kdj.k.len() - 1;
        assert!(kdj.k[last] > 90.0);
        assert!(kdj.k[last] <= 100.0);
        assert!(kdj.j[last] > kdj.d[last]);
    }

    #[test]
    fn kdj_insufficient_data() {
        let v = [1.0, 2.0];
        assert!(calculate_kdj(Hlc::new(&v, &v, &v).unwrap(), 9, 3, 3).k.is_empty());
    }

    #[test]
    fn kdj_zero_smoothing() {
        let v = [1.0; 10];
        assert!(calculate_kdj(Hlc::new(&v, &v, &v).unwrap(), 3, 0, 3).k.is_empty());
        assert!(calculate_kdj(Hlc::new(&v, &v, &v).unwrap(), 3, 3, 0).k.is_empty());
    }
}
