//! Strategy definitions stored as `[strategy.<id>]` INI sections.
//!
//! Section names are lowercased by the INI reader, so ids are lowercase.

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::StratscriptError;
use crate::domain::strategy::{ScriptConfig, StrategyDefinition, StrategyKind};
use crate::ports::strategy_port::StrategyStorePort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};
use tracing::debug;

const SECTION_PREFIX: &str = "strategy.";

pub struct FileStrategyAdapter {
    ini: Ini,
    path: Option<PathBuf>,
}

impl FileStrategyAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StratscriptError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| StratscriptError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self {
            ini,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut ini = Ini::new();
        ini.read(content.to_string())?;
        Ok(Self { ini, path: None })
    }

    fn strategy_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .ini
            .sections()
            .into_iter()
            .filter_map(|s| s.strip_prefix(SECTION_PREFIX).map(str::to_string))
            .filter(|id| !id.is_empty())
            .collect();
        ids.sort();
        ids
    }

    fn read_definition(&self, id: &str) -> Result<StrategyDefinition, StratscriptError> {
        let section = format!("{}{}", SECTION_PREFIX, id);
        let get = |key: &str| self.ini.get(&section, key);

        let kind = match get("type") {
            Some(raw) => raw
                .parse::<StrategyKind>()
                .map_err(|reason| StratscriptError::ConfigInvalid {
                    section: section.clone(),
                    key: "type".to_string(),
                    reason,
                })?,
            None => StrategyKind::Script,
        };

        let enabled = match get("enabled") {
            Some(raw) => FileConfigAdapter::parse_bool(&raw).ok_or_else(|| {
                StratscriptError::ConfigInvalid {
                    section: section.clone(),
                    key: "enabled".to_string(),
                    reason: format!("expected a boolean, got '{}'", raw),
                }
            })?,
            None => true,
        };

        let buy_script = get("buy_script").unwrap_or_default();
        let sell_script = get("sell_script").unwrap_or_default();
        let script = (!buy_script.is_empty() || !sell_script.is_empty()).then(|| ScriptConfig {
            buy_script,
            sell_script,
            enabled,
        });

        Ok(StrategyDefinition {
            id: id.to_string(),
            name: get("name").unwrap_or_else(|| id.to_string()),
            symbols: parse_symbols(get("symbols").as_deref().unwrap_or("")),
            kind,
            script,
        })
    }
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl StrategyStorePort for FileStrategyAdapter {
    fn load_strategies(&self) -> Result<Vec<StrategyDefinition>, StratscriptError> {
        let strategies = self
            .strategy_ids()
            .iter()
            .map(|id| self.read_definition(id))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = strategies.len(), "loaded strategies");
        Ok(strategies)
    }

    fn save_strategy(&mut self, definition: &StrategyDefinition) -> Result<(), StratscriptError> {
        let section = format!("{}{}", SECTION_PREFIX, definition.id.to_lowercase());
        let script = definition.script.clone().unwrap_or_default();
        let enabled = definition.script.as_ref().is_none_or(|s| s.enabled);

        let fields = [
            ("name", definition.name.clone()),
            ("symbols", definition.symbols.join(", ")),
            ("type", definition.kind.to_string()),
            ("buy_script", script.buy_script),
            ("sell_script", script.sell_script),
            ("enabled", enabled.to_string()),
        ];
        for (key, value) in fields {
            self.ini.set(&section, key, Some(value));
        }

        if let Some(path) = &self.path {
            self.ini
                .write(path)
                .map_err(|e| StratscriptError::StrategyStore {
                    reason: format!("failed to write {}: {}", path.display(), e),
                })?;
        }
        debug!(id = %definition.id, "saved strategy");
        Ok(())
    }
}
