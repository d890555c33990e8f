//! Port traits for the collaborators around the engine.

pub mod config_port;
pub mod quote_port;
pub mod signal_port;
pub mod strategy_port;
