//! Signal output port trait.

use crate::domain::error::StratscriptError;
use crate::domain::scan::SignalRecord;

/// Consumer of evaluated signals (console, notifier, dashboard).
pub trait SignalSink {
    fn publish(&mut self, record: &SignalRecord) -> Result<(), StratscriptError>;

    fn publish_all(&mut self, records: &[SignalRecord]) -> Result<(), StratscriptError> {
        records.iter().try_for_each(|record| self.publish(record))
    }
}
