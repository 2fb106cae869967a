use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use netra_db::DatasetStore;
use netra_parser::ParserConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings read from `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub parser: ParserSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

fn config_dir() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("Netra")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".netra")
    }
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

impl NetraConfig {
    /// Load the config file.
    ///
    /// An explicitly given path must exist. The default path is optional:
    /// when it is missing, defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = default_config_path();
                if !path.exists() {
                    debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Library location: `--db`, then the config file, then the default.
    pub fn database_path(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(DatasetStore::default_path)
    }

    /// Parser settings with command-line overrides applied on top.
    pub fn parser_config(&self, script: Option<&Path>, timeout_secs: Option<u64>) -> ParserConfig {
        let mut config = ParserConfig::default();
        if let Some(interpreter) = &self.parser.interpreter {
            config.interpreter = interpreter.clone();
        }
        if let Some(script) = script.map(Path::to_path_buf).or_else(|| self.parser.script.clone()) {
            config.script = script;
        }
        if let Some(secs) = timeout_secs.or(self.parser.timeout_secs) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(extensions) = &self.parser.extensions {
            config.extensions = extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }
        config
    }
}
