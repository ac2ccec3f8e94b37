//! Browser configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use lynx_navigation::SearchProvider;
use lynx_privacy::PolicyRules;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Provider used until the user picks one
    pub search_provider: SearchProvider,
    /// Enable tracking protection
    pub tracking_protection: bool,
    /// New sessions load the search provider's home page
    pub load_start_page: bool,
    /// Tracker patterns and app-link table
    pub policy_rules: PolicyRules,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("lynx.db"),
            search_provider: SearchProvider::default(),
            tracking_protection: true,
            load_start_page: true,
            policy_rules: PolicyRules::default(),
        }
    }

    /// Read a JSON config file. A missing file yields the defaults; fields
    /// absent from the file keep their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;

        tracing::info!(path = %path.display(), "Loaded config");

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(CoreError::Config("database_path is empty".to_string()));
        }
        Ok(())
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("LibreLynx"))
            .unwrap_or_else(|| PathBuf::from(".librelynx"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Platform data directory from the environment
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(
            target_os = "windows",
            target_os = "macos",
            target_os = "linux",
            target_os = "android"
        )))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("/tmp/lynx"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/lynx/lynx.db"));
        assert_eq!(config.search_provider, SearchProvider::Mojeek);
        assert!(config.tracking_protection);
        assert!(config.load_start_page);
        assert_eq!(config.policy_rules, PolicyRules::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{ "database_path": "/data/lynx.db", "search_provider": "brave", "tracking_protection": false }}"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/data/lynx.db"));
        assert_eq!(config.search_provider, SearchProvider::Brave);
        assert!(!config.tracking_protection);
        assert!(config.load_start_page);
    }

    #[test]
    fn test_invalid_files() {
        let dir = tempfile::tempdir().unwrap();

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(Config::load(&garbage), Err(CoreError::Json(_))));

        let empty_db = dir.path().join("empty_db.json");
        std::fs::write(&empty_db, r#"{ "database_path": "" }"#).unwrap();
        assert!(matches!(Config::load(&empty_db), Err(CoreError::Config(_))));
    }
}
