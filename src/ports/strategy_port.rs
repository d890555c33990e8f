//! Strategy definition storage port trait.

use crate::domain::error::StratscriptError;
use crate::domain::strategy::StrategyDefinition;

pub trait StrategyStorePort {
    fn load_strategies(&self) -> Result<Vec<StrategyDefinition>, StratscriptError>;

    fn save_strategy(&mut self, definition: &StrategyDefinition) -> Result<(), StratscriptError>;
}
