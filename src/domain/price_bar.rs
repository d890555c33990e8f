//! Dated price bar as loaded from a data source.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// True when the bar's close lies within its own high/low range.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high && self.close >= self.low && self.close <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            high: 110.0,
            low: 90.0,
            close: 105.0,
        }
    }

    #[test]
    fn range() {
        assert!((sample_bar().range() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn consistent_bar() {
        assert!(sample_bar().is_consistent());
    }

    #[test]
    fn close_outside_range_is_inconsistent() {
        let mut bar = sample_bar();
        bar.close = 120.0;
        assert!(!bar.is_consistent());
    }
}
