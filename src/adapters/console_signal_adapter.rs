//! Signal sink writing one line per record.

use crate::domain::error::StratscriptError;
use crate::domain::scan::SignalRecord;
use crate::ports::signal_port::SignalSink;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("expected 'text' or 'json', got '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub struct ConsoleSignalAdapter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl ConsoleSignalAdapter<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ConsoleSignalAdapter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `SYMBOL strategy BUY|SELL|-` followed by value or error when present.
pub fn format_text(record: &SignalRecord) -> String {
    let signal = match (record.result.buy_signal, record.result.sell_signal) {
        (true, true) => "BUY+SELL",
        (true, false) => "BUY",
        (false, true) => "SELL",
        (false, false) => "-",
    };
    let mut line = format!("{:<8} {:<20} {}", record.symbol, record.strategy_id, signal);
    if let Some(value) = record.result.value {
        line.push_str(&format!(" value={}", value));
    }
    if let Some(error) = &record.result.error {
        line.push_str(&format!(" error={}", error.replace('\n', " | ")));
    }
    line
}

impl<W: Write> SignalSink for ConsoleSignalAdapter<W> {
    fn publish(&mut self, record: &SignalRecord) -> Result<(), StratscriptError> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", format_text(record))?,
            OutputFormat::Json => {
                let json = serde_json::to_string(record).map_err(io::Error::other)?;
                writeln!(self.out, "{}", json)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::runner::EvaluationResult;

    fn record(buy: bool, value: Option<f64>, error: Option<&str>) -> SignalRecord {
        SignalRecord {
            strategy_id: "rsi".into(),
            strategy_name: "RSI dip".into(),
            symbol: "AAPL".into(),
            result: EvaluationResult {
                buy_signal: buy,
                sell_signal: false,
                value,
                error: error.map(str::to_string),
            },
        }
    }

    fn publish(format: OutputFormat, records: &[SignalRecord]) -> String {
        let mut sink = ConsoleSignalAdapter::new(Vec::new(), format);
        sink.publish_all(records).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn text_lines() {
        let out = publish(
            OutputFormat::Text,
            &[record(true, None, None), record(false, None, Some("bad\nthing"))],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("AAPL"));
        assert!(lines[0].ends_with("BUY"));
        assert!(lines[1].contains("error=bad | thing"));
    }

    #[test]
    fn text_includes_value() {
        assert!(format_text(&record(true, Some(42.5), None)).contains("value=42.5"));
    }

    #[test]
    fn json_lines() {
        let out = publish(OutputFormat::Json, &[record(true, Some(1.5), None)]);
        let parsed: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(parsed["symbol"], "AAPL");
        assert_eq!(parsed["buy_signal"], true);
        assert_eq!(parsed["value"], 1.5);
        assert!(parsed["error"].is_null());
    }

    #[test]
    fn format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
