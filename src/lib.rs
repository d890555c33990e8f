//! stratscript: trading-signal script engine.
//!
//! Hexagonal architecture: the indicator library, expression engine and
//! script runner live in [`domain`], collaborator traits in [`ports`], and
//! file/console implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
