//! CSV price history adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with a header row naming at
//! least `date`, `high`, `low` and `close`. Other columns are ignored.

use crate::domain::error::StratscriptError;
use crate::domain::price_bar::PriceBar;
use crate::domain::series::{PriceSeries, Quote};
use crate::ports::quote_port::QuotePort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug)]
pub struct CsvQuoteAdapter {
    dir: PathBuf,
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, StratscriptError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| StratscriptError::DataSource {
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Self {
            date: find("date")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
        })
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, StratscriptError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| StratscriptError::DataSource {
            reason: format!("line {}: missing {} value", line, name),
        })
}

fn price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<f64, StratscriptError> {
    field(record, index, name, line)?
        .parse()
        .map_err(|e| StratscriptError::DataSource {
            reason: format!("line {}: invalid {} value: {}", line, name, e),
        })
}

impl CsvQuoteAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    /// Read one CSV file into bars sorted by date.
    pub fn read_bars(path: &Path) -> Result<Vec<PriceBar>, StratscriptError> {
        let content = fs::read_to_string(path).map_err(|e| StratscriptError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::parse_bars(&content)
    }

    pub fn parse_bars(content: &str) -> Result<Vec<PriceBar>, StratscriptError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| StratscriptError::DataSource {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::resolve(headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| StratscriptError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = field(&record, columns.date, "date", line)?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                StratscriptError::DataSource {
                    reason: format!("line {}: invalid date '{}': {}", line, date_str, e),
                }
            })?;

            bars.push(PriceBar {
                date,
                high: price(&record, columns.high, "high", line)?,
                low: price(&record, columns.low, "low", line)?,
                close: price(&record, columns.close, "close", line)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Load a symbol's bars; an absent or empty file is `NoData`.
    fn load(&self, symbol: &str) -> Result<Vec<PriceBar>, StratscriptError> {
        let path = self.csv_path(symbol);
        if !path.is_file() {
            return Err(StratscriptError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let bars = Self::read_bars(&path)?;
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded price history");
        if bars.is_empty() {
            return Err(StratscriptError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}

fn implied_quote(symbol: &str, history: &PriceSeries) -> Result<Quote, StratscriptError> {
    history.implied_quote().ok_or_else(|| StratscriptError::NoData {
        symbol: symbol.to_string(),
    })
}

impl QuotePort for CsvQuoteAdapter {
    fn fetch_quote(&self, symbol: &str) -> Result<Quote, StratscriptError> {
        implied_quote(symbol, &self.fetch_history(symbol)?)
    }

    fn fetch_history(&self, symbol: &str) -> Result<PriceSeries, StratscriptError> {
        Ok(PriceSeries::from_bars(&self.load(symbol)?))
    }

    fn fetch_snapshot(&self, symbol: &str) -> Result<(Quote, PriceSeries), StratscriptError> {
        let history = self.fetch_history(symbol)?;
        Ok((implied_quote(symbol, &history)?, history))
    }
}
