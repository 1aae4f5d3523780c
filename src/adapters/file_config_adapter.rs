//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

pub struct FileConfigAdapter {
    config: Ini,
    base_dir: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self {
            config,
            base_dir: path.parent().map(Path::to_path_buf),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self {
            config,
            base_dir: None,
        })
    }

    /// Resolve a configured path. Relative paths are taken relative to the
    /// config file's directory when loaded from disk.
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        let raw = self.get_string(section, key)?;
        let path = PathBuf::from(raw.trim());
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path),
        }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
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

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[allocation]
total_investment = 2500.0
n_stocks = 15

[data]
instruments = stocks.csv
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "instruments"),
            Some("stocks.csv".to_string())
        );
        assert_eq!(adapter.get_double("allocation", "total_investment", 0.0), 2500.0);
        assert_eq!(adapter.get_int("allocation", "n_stocks", 0), 15);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[data]\ninstruments = a.csv\n").unwrap();
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[allocation]\nn_stocks = abc\n").unwrap();
        assert_eq!(adapter.get_int("allocation", "n_stocks", 42), 42);
        assert_eq!(adapter.get_int("allocation", "missing", 7), 7);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[allocation]\ntotal_investment = lots\n").unwrap();
        assert_eq!(adapter.get_double("allocation", "total_investment", 99.9), 99.9);
    }

    #[test]
    fn get_bool_values() {
        let adapter =
            FileConfigAdapter::from_string("[x]\na = yes\nb = FALSE\nc = maybe\n").unwrap();
        assert!(adapter.get_bool("x", "a", false));
        assert!(!adapter.get_bool("x", "b", true));
        assert!(adapter.get_bool("x", "c", true));
        assert!(!adapter.get_bool("x", "missing", false));
    }

    #[test]
    fn get_choice_normalises() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource =  SQLite \n").unwrap();
        assert_eq!(adapter.get_choice("data", "source", "csv"), "sqlite");
        assert_eq!(adapter.get_choice("output", "sink", "csv"), "csv");
    }

    #[test]
    fn from_string_paths_are_unchanged() {
        let adapter = FileConfigAdapter::from_string("[data]\nhistory_dir = history\n").unwrap();
        assert_eq!(
            adapter.get_path("data", "history_dir"),
            Some(PathBuf::from("history"))
        );
    }

    #[test]
    fn from_file_resolves_relative_paths() {
        let file = create_temp_config("[data]\nhistory_dir = history\nfundamentals = /abs/f.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let base = file.path().parent().unwrap();
        assert_eq!(
            adapter.get_path("data", "history_dir"),
            Some(base.join("history"))
        );
        assert_eq!(
            adapter.get_path("data", "fundamentals"),
            Some(PathBuf::from("/abs/f.csv"))
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
