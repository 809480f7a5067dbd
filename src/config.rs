//! Taskboard configuration.
//!
//! Loaded from `~/.taskboard/config.toml`. Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Taskboard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Path to the `SQLite` database.
    /// Defaults to `~/.taskboard/taskboard.sqlite`.
    pub database: Option<PathBuf>,

    /// Members holding this role see every task in listings.
    pub admin_role: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            admin_role: "admin".to_string(),
        }
    }
}

impl Config {
    /// Load config from `~/.taskboard/config.toml`, or defaults if there is none.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.admin_role.trim().is_empty() {
            return Err(format!("admin-role is empty in {}", path.display()));
        }

        Ok(config)
    }

    /// The config file path: `~/.taskboard/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".taskboard").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.database, None);
        assert_eq!(config.admin_role, "admin");
    }

    #[test]
    fn reads_kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "database = \"/srv/taskboard.sqlite\"\nadmin-role = \"ROLE_ADMIN\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.database, Some(PathBuf::from("/srv/taskboard.sqlite")));
        assert_eq!(config.admin_role, "ROLE_ADMIN");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database = \"tb.sqlite\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.admin_role, "admin");
    }

    #[test]
    fn empty_admin_role_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "admin-role = \"  \"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("admin-role"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database = [").unwrap();

        assert!(Config::load_from(&path).unwrap_err().starts_with("invalid config"));
    }
}
