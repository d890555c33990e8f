//! Persisted strategy records.
//!
//! The engine reads the `script` block of script-mode strategies only;
//! simple (threshold) strategies are evaluated elsewhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::ParseError;
use crate::domain::runner::StrategyScriptPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Simple,
    Script,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Simple => write!(f, "simple"),
            StrategyKind::Script => write!(f, "script"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(StrategyKind::Simple),
            "script" => Ok(StrategyKind::Script),
            other => Err(format!("expected 'simple' or 'script', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub buy_script: String,
    pub sell_script: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    pub id: String,
    pub name: String,
    pub symbols: Vec<String>,
    pub kind: StrategyKind,
    pub script: Option<ScriptConfig>,
}

impl StrategyDefinition {
    /// Script block of an enabled script-mode strategy.
    pub fn active_script(&self) -> Option<&ScriptConfig> {
        match (self.kind, &self.script) {
            (StrategyKind::Script, Some(script)) if script.enabled => Some(script),
            _ => None,
        }
    }

    pub fn compile(&self) -> Result<StrategyScriptPair, ParseError> {
        match &self.script {
            Some(script) => StrategyScriptPair::compile(
                Some(script.buy_script.as_str()),
                Some(script.sell_script.as_str()),
            ),
            None => Ok(StrategyScriptPair::default()),
        }
    }
}
