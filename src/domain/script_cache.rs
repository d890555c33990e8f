//! Compile cache for script text.
//!
//! Append-only map from script text to its AST. Readers share entries through
//! `Arc`; two threads compiling the same text race harmlessly since the parser
//! is deterministic. Parse failures are not cached.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::domain::error::ParseError;
use crate::domain::expr::Expr;
use crate::domain::expr_parser::parse;

#[derive(Debug, Default)]
pub struct ScriptCache {
    entries: RwLock<HashMap<String, Arc<Expr>>>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&self, script: &str) -> Result<Arc<Expr>, ParseError> {
        let key = script.trim();
        if let Some(expr) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(Arc::clone(expr));
        }

        let expr = Arc::new(parse(key)?);
        debug!(script = key, "compiled script");
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key.to_string()).or_insert(expr)))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
