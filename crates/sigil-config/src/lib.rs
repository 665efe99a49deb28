//! Configuration types for sigil tools.
//!
//! The configuration is stored in `Sigil.toml` files at project roots and
//! names check targets: sets of JSON documents validated against one schema.
//!
//! # Features
//!
//! - `cli` - Include CLI configuration
//! - `all` - Include all configuration types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The standard configuration filename.
pub const CONFIG_FILENAME: &str = "Sigil.toml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

impl From<glob::GlobError> for ConfigError {
    fn from(err: glob::GlobError) -> Self {
        ConfigError::Io(err.into_error())
    }
}

/// A check target definition.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
pub struct Target {
    /// Glob patterns for files to include in this target.
    pub globs: Vec<String>,
    /// Schema file path (relative to config file).
    pub schema: String,
}

impl Target {
    /// Schema path resolved against the config directory.
    pub fn schema_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.schema)
    }

    /// Expand the globs relative to `config_dir`. Files matched by several
    /// patterns are listed once, in sorted order.
    pub fn files(&self, config_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = Vec::new();
        for glob_pattern in &self.globs {
            let full_pattern = config_dir.join(glob_pattern);
            let full_pattern = full_pattern.to_string_lossy();
            let paths = glob::glob(&full_pattern).map_err(|source| ConfigError::Pattern {
                pattern: glob_pattern.clone(),
                source,
            })?;
            for path in paths {
                let path = path?;
                if path.is_file() {
                    files.push(path);
                }
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Whether `file_path` is matched by one of the globs.
    pub fn matches(&self, file_path: &Path, config_dir: &Path) -> bool {
        // Use explicit options for consistent cross-platform behavior
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.globs.iter().any(|glob_pattern| {
            let full_pattern = config_dir.join(glob_pattern);
            glob::Pattern::new(&full_pattern.to_string_lossy())
                .is_ok_and(|pattern| pattern.matches_path_with(file_path, options))
        })
    }
}

/// CLI-specific configuration.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    /// Default targets to check when running `sigil check` without arguments.
    #[serde(default)]
    pub default_targets: Vec<String>,
}

/// The main sigil configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SigilConfig {
    /// Check targets (name -> target definition).
    #[serde(default)]
    pub targets: BTreeMap<String, Target>,

    /// CLI-specific configuration.
    #[cfg(feature = "cli")]
    #[serde(default)]
    pub cli: Option<CliConfig>,
}

impl SigilConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse configuration from a string.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Find the configuration file by searching upward from the given directory.
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILENAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration by searching upward from the given directory.
    pub fn load_from_dir(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        if let Some(config_path) = Self::find_config_file(start_dir) {
            let config = Self::load(&config_path)?;
            Ok(Some((config_path, config)))
        } else {
            Ok(None)
        }
    }

    /// Get the default targets for CLI check command.
    #[cfg(feature = "cli")]
    pub fn default_targets(&self) -> &[String] {
        self.cli
            .as_ref()
            .map(|c| c.default_targets.as_slice())
            .unwrap_or(&[])
    }

    /// Get a target by name.
    pub fn get_target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Get all target names, sorted.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(|s| s.as_str())
    }

    /// Find the schema for a file path by matching against target globs.
    ///
    /// Returns the first matching target's schema path (in name order).
    pub fn schema_for_path(&self, file_path: &Path, config_dir: &Path) -> Option<PathBuf> {
        self.targets
            .values()
            .find(|target| target.matches(file_path, config_dir))
            .map(|target| target.schema_path(config_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[targets.users]
globs = ["data/users/**/*.json"]
schema = "schemas/user.json"

[targets.orders]
globs = ["data/orders/*.json", "data/archive/orders-*.json"]
schema = "schemas/order.json"

[cli]
default-targets = ["users"]
"#;

    #[test]
    fn test_parse_config() {
        let config = SigilConfig::parse_str(CONFIG).unwrap();
        assert_eq!(config.targets.len(), 2);

        let users = config.get_target("users").unwrap();
        assert_eq!(users.globs, vec!["data/users/**/*.json"]);
        assert_eq!(users.schema, "schemas/user.json");

        let names: Vec<_> = config.target_names().collect();
        assert_eq!(names, vec!["orders", "users"]);

        #[cfg(feature = "cli")]
        assert_eq!(config.default_targets(), ["users".to_string()]);
    }

    #[test]
    fn test_empty_config() {
        let config = SigilConfig::parse_str("").unwrap();
        assert!(config.targets.is_empty());
        #[cfg(feature = "cli")]
        assert!(config.default_targets().is_empty());
    }

    #[test]
    fn test_target_without_schema_is_rejected() {
        let result = SigilConfig::parse_str("[targets.a]\nglobs = [\"*.json\"]\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_schema_for_path() {
        let config = SigilConfig::parse_str(CONFIG).unwrap();
        let root = Path::new("/project");
        assert_eq!(
            config.schema_for_path(Path::new("/project/data/users/a/b.json"), root),
            Some(PathBuf::from("/project/schemas/user.json"))
        );
        assert_eq!(
            config.schema_for_path(Path::new("/project/data/orders/nested/x.json"), root),
            None
        );
    }

    #[test]
    fn test_find_and_expand() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join(CONFIG_FILENAME), CONFIG).unwrap();
        std::fs::create_dir_all(root.join("data/users/nested")).unwrap();
        std::fs::write(root.join("data/users/a.json"), "{}").unwrap();
        std::fs::write(root.join("data/users/nested/b.json"), "{}").unwrap();
        std::fs::write(root.join("data/users/notes.txt"), "").unwrap();

        let (path, config) = SigilConfig::load_from_dir(&root.join("data/users"))
            .unwrap()
            .unwrap();
        assert_eq!(path, root.join(CONFIG_FILENAME));

        let files = config.get_target("users").unwrap().files(root).unwrap();
        assert_eq!(
            files,
            vec![root.join("data/users/a.json"), root.join("data/users/nested/b.json")]
        );
        assert!(config.get_target("orders").unwrap().files(root).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_glob() {
        let target = Target {
            globs: vec!["[".to_string()],
            schema: "s.json".to_string(),
        };
        assert!(matches!(
            target.files(Path::new(".")),
            Err(ConfigError::Pattern { .. })
        ));
    }
}
