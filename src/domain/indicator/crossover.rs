//! Crossover detection between two series.
//!
//! Compares the last two points of each series:
//! - bullish: prevA <= prevB and currA > currB
//! - bearish: prevA >= prevB and currA < currB
//!
//! Either series with fewer than two points yields no cross.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crossover {
    pub bullish: bool,
    pub bearish: bool,
}

pub fn calculate_crossover(a: &[f64], b: &[f64]) -> Crossover {
    let (Some(&[prev_a, curr_a]), Some(&[prev_b, curr_b])) = (last_two(a), last_two(b)) else {
        return Crossover::default();
    };

    Crossover {
        bullish: prev_a <= prev_b && curr_a > curr_b,
        bearish: prev_a >= prev_b && curr_a < curr_b,
    }
}

fn last_two(series: &[f64]) -> Option<&[f64; 2]> {
    series
        .len()
        .checked_sub(2)
        .and_then(|start| series[start..].try_into().ok())
}
