//! Concrete adapter implementations for ports.

pub mod console_signal_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod file_strategy_adapter;
