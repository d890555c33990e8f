//! Quote and price history access port trait.

use crate::domain::error::StratscriptError;
use crate::domain::series::{PriceSeries, Quote};

pub trait QuotePort {
    fn fetch_quote(&self, symbol: &str) -> Result<Quote, StratscriptError>;

    /// Chronological history, oldest first.
    fn fetch_history(&self, symbol: &str) -> Result<PriceSeries, StratscriptError>;

    /// Quote and history together. Sources that derive the quote from the
    /// history override this to load the symbol once.
    fn fetch_snapshot(&self, symbol: &str) -> Result<(Quote, PriceSeries), StratscriptError> {
        Ok((self.fetch_quote(symbol)?, self.fetch_history(symbol)?))
    }
}
