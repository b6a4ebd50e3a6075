use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detector::DEFAULT_SENTINEL;
use crate::error::WiggumError;

/// Placeholder in `agent.args` replaced by the `@path` context references
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Directory holding one subdirectory per work group
    pub work_root: PathBuf,
    pub files: FilesConfig,
    pub agent: AgentConfig,
    #[serde(rename = "loop")]
    pub run: RunConfig,
    pub sentinel: String,
}

/// File names inside a work group directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub ledger: String,
    pub progress: String,
    pub prompt: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            ledger: "prd.json".to_string(),
            progress: "progress.txt".to_string(),
            prompt: "prompt.md".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Unset means wait for the agent indefinitely
    pub timeout_ms: Option<u64>,
    /// Unset means keep all captured output
    pub max_output_bytes: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            args: vec![
                "--permission-mode".to_string(),
                "acceptEdits".to_string(),
                "-p".to_string(),
                CONTEXT_PLACEHOLDER.to_string(),
            ],
            working_dir: None,
            timeout_ms: None,
            max_output_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_iterations: u32,
    pub iteration_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            iteration_delay_ms: 2000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            work_root: PathBuf::from(".wiggum"),
            files: FilesConfig::default(),
            agent: AgentConfig::default(),
            run: RunConfig::default(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let project_config = PathBuf::from(format!("{}.yml", project_name));
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", project_config.display(), e);
                }
            }
        }

        // Try user location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values that would make a run meaningless
    pub fn validate(&self) -> std::result::Result<(), WiggumError> {
        if self.run.max_iterations == 0 {
            return Err(WiggumError::InvalidConfig("loop.max_iterations must be at least 1".to_string()));
        }
        if self.sentinel.is_empty() {
            // An empty needle matches every output
            return Err(WiggumError::InvalidConfig("sentinel must not be empty".to_string()));
        }
        if self.agent.command.trim().is_empty() {
            return Err(WiggumError::InvalidConfig("agent.command must not be empty".to_string()));
        }
        Ok(())
    }
}
