//! Core domain types and logic.

pub mod builtins;
pub mod config_validation;
pub mod context;
pub mod error;
pub mod expr;
pub mod expr_eval;
pub mod expr_parser;
pub mod indicator;
pub mod lexer;
pub mod preset;
pub mod price_bar;
pub mod runner;
pub mod scan;
pub mod script_cache;
pub mod series;
pub mod strategy;
pub mod value;
