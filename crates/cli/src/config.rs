//! Configuration loading for the `cubesolve` binary.
//!
//! Precedence, highest first: environment variables, the TOML file, defaults.
//! The file is either the `--config` path (which must exist) or
//! `cubesolve.toml` in the working directory when present.

use std::path::{Path, PathBuf};
use std::time::Duration;

use llm::GeminiConfig;
use pipeline::{UploadPolicy, ValidationOptions};
use serde::Deserialize;
use solver_service::{CommandSolvingOracle, HttpSolvingOracle};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cubesolve.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No solver configured: set solver.url / CUBESOLVE_SOLVER_URL or solver.command / CUBESOLVE_SOLVER_COMMAND")]
    NoSolver,

    #[error("Both a solver URL and a solver command are configured; choose one")]
    ConflictingSolvers,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Diagnostic output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSection {
    /// Solver service endpoint.
    pub url: Option<String>,
    /// Solver program and arguments, whitespace separated.
    pub command: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadSection {
    /// Overrides the 20 MiB image limit.
    pub max_bytes: Option<u64>,
    /// Delete image files once they have been read.
    pub remove_after: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
    /// Makes fallback grids reproducible.
    pub fallback_seed: Option<u64>,
    pub gemini: GeminiSection,
    pub solver: SolverSection,
    pub upload: UploadSection,
    pub validation: ValidationOptions,
}

/// The solving oracle selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverBackend {
    Http { url: String, timeout: Option<Duration> },
    Command { command_line: String, timeout: Option<Duration> },
}

impl CliConfig {
    /// Loads the file (if any) and applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies environment overrides read through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = get("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.gemini.model = Some(model);
        }
        if let Some(base_url) = get("GEMINI_BASE_URL") {
            self.gemini.base_url = Some(base_url);
        }
        if let Some(url) = get("CUBESOLVE_SOLVER_URL") {
            self.solver.url = Some(url);
        }
        if let Some(command) = get("CUBESOLVE_SOLVER_COMMAND") {
            self.solver.command = Some(command);
        }
        if let Some(endpoint) = get("OTEL_EXPORTER_OTLP_ENDPOINT") {
            self.otlp_endpoint = Some(endpoint);
        }
    }

    /// Gemini settings, or `None` when no API key is configured.
    pub fn gemini_config(&self) -> Option<GeminiConfig> {
        let key = self.gemini.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        let mut config = GeminiConfig::new(key);
        if let Some(model) = &self.gemini.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &self.gemini.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(secs) = self.gemini.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Some(config)
    }

    /// Selects exactly one solver backend.
    pub fn solver_backend(&self) -> Result<SolverBackend, ConfigError> {
        let timeout = self.solver.timeout_secs.map(Duration::from_secs);
        match (&self.solver.url, &self.solver.command) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSolvers),
            (Some(url), None) => Ok(SolverBackend::Http {
                url: url.clone(),
                timeout,
            }),
            (None, Some(command_line)) => Ok(SolverBackend::Command {
                command_line: command_line.clone(),
                timeout,
            }),
            (None, None) => Err(ConfigError::NoSolver),
        }
    }

    pub fn upload_policy(&self) -> Result<UploadPolicy, ConfigError> {
        let mut policy = UploadPolicy::default();
        if let Some(max_bytes) = self.upload.max_bytes {
            if max_bytes == 0 {
                return Err(ConfigError::Invalid(
                    "upload.max_bytes must be greater than zero".to_string(),
                ));
            }
            policy.max_bytes = max_bytes;
        }
        Ok(policy)
    }
}

impl SolverBackend {
    /// Builds the configured oracle.
    pub fn build(&self) -> Result<std::sync::Arc<dyn pipeline::SolvingOracle>, ConfigError> {
        match self {
            Self::Http { url, timeout } => {
                let mut oracle = HttpSolvingOracle::new(url.as_str())
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                if let Some(timeout) = timeout {
                    oracle = oracle.with_timeout(*timeout);
                }
                Ok(std::sync::Arc::new(oracle))
            }
            Self::Command {
                command_line,
                timeout,
            } => {
                let mut oracle = CommandSolvingOracle::from_command_line(command_line)
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                if let Some(timeout) = timeout {
                    oracle = oracle.with_timeout(*timeout);
                }
                Ok(std::sync::Arc::new(oracle))
            }
        }
    }
}
