//! INI file configuration adapter.

use crate::domain::error::StratscriptError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StratscriptError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| StratscriptError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Section names, lowercased by the INI reader.
    pub fn sections(&self) -> Vec<String> {
        self.config.sections()
    }

    pub(crate) fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCAN_CONFIG: &str = r#"
[data]
dir = ./prices

[log]
level = debug

[strategy.rsi]
symbols = AAPL, MSFT
buy_script = rsi(14) < 30
enabled = yes
"#;

    #[test]
    fn reads_scan_config() {
        let adapter = FileConfigAdapter::from_string(SCAN_CONFIG).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("./prices".to_string()));
        assert_eq!(adapter.get_string("log", "level"), Some("debug".to_string()));
        assert_eq!(
            adapter.get_string("strategy.rsi", "buy_script"),
            Some("rsi(14) < 30".to_string())
        );
        assert!(adapter.get_bool("strategy.rsi", "enabled", false));
    }

    #[test]
    fn sections_are_listed() {
        let adapter = FileConfigAdapter::from_string(SCAN_CONFIG).unwrap();
        let sections = adapter.sections();
        assert!(sections.contains(&"data".to_string()));
        assert!(sections.contains(&"strategy.rsi".to_string()));
    }

    #[test]
    fn missing_keys_are_none() {
        let adapter = FileConfigAdapter::from_string("[data]\ndir = x\n").unwrap();
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "dir"), None);
    }

    #[test]
    fn int_getter_falls_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[scan]\nthreads = 4\nbad = abc\n").unwrap();
        assert_eq!(adapter.get_int("scan", "threads", 0), 4);
        assert_eq!(adapter.get_int("scan", "bad", 42), 42);
        assert_eq!(adapter.get_int("scan", "missing", 7), 7);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[s]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\ng = maybe\n",
        )
        .unwrap();
        for key in ["a", "b", "c"] {
            assert!(adapter.get_bool("s", key, false), "{}", key);
        }
        for key in ["d", "e", "f"] {
            assert!(!adapter.get_bool("s", key, true), "{}", key);
        }
        assert!(adapter.get_bool("s", "g", true));
        assert!(!adapter.get_bool("s", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[data]\ndir = /var/prices\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("/var/prices".to_string()));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/scan.ini").unwrap_err();
        match err {
            StratscriptError::ConfigParse { file, .. } => assert!(file.contains("scan.ini")),
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }
}
