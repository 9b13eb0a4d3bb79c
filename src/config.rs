//! Run configuration.
//!
//! Read from `interop.toml` in the model directory when present. Every field
//! has a default, so a partial file only overrides what it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluator::EvalSettings;
use crate::search::{Checks, SearchSettings};

/// Name of the optional config file inside the model directory.
pub const CONFIG_FILE_NAME: &str = "interop.toml";

/// Configuration of one evaluation run, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Model document to evaluate, relative to the model directory.
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// Where the model is written back with updated `satisfied` flags.
    #[serde(default = "default_saved_model_file")]
    pub saved_model_file: String,
    /// Plain-text results log.
    #[serde(default = "default_results_file")]
    pub results_file: String,
    /// JSON report.
    #[serde(default = "default_report_file")]
    pub report_file: String,
    /// Graphviz rendering of the witnessing paths.
    #[serde(default = "default_dot_file")]
    pub dot_file: String,
    /// Candidate hops examined per pair search before giving up.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Classify unsatisfied pairs.
    #[serde(default = "default_true")]
    pub diagnostics: bool,
    /// Evaluate needs in parallel.
    #[serde(default)]
    pub parallel: bool,
    /// Write the saved model document.
    #[serde(default = "default_true")]
    pub save_model: bool,
    /// Write the DOT rendering.
    #[serde(default = "default_true")]
    pub write_dot: bool,
}

fn default_model_file() -> String {
    "scadamodel.json".into()
}
fn default_saved_model_file() -> String {
    "savedmodel.json".into()
}
fn default_results_file() -> String {
    "results.txt".into()
}
fn default_report_file() -> String {
    "report.json".into()
}
fn default_dot_file() -> String {
    "paths.dot".into()
}
fn default_max_steps() -> usize {
    1_000_000
}
fn default_true() -> bool {
    true
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            model_file: default_model_file(),
            saved_model_file: default_saved_model_file(),
            results_file: default_results_file(),
            report_file: default_report_file(),
            dot_file: default_dot_file(),
            max_steps: default_max_steps(),
            diagnostics: true,
            parallel: false,
            save_model: true,
            write_dot: true,
        }
    }
}

impl EvalConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `interop.toml` from `dir`, or defaults if there is none.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid {
                message: "max_steps must be greater than zero".into(),
            });
        }
        let files = [
            ("model_file", &self.model_file),
            ("saved_model_file", &self.saved_model_file),
            ("results_file", &self.results_file),
            ("report_file", &self.report_file),
            ("dot_file", &self.dot_file),
        ];
        if let Some((field, _)) = files.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                message: format!("{field} must not be empty"),
            });
        }
        if self.save_model && self.saved_model_file == self.model_file {
            return Err(ConfigError::Invalid {
                message: "saved_model_file must differ from model_file".into(),
            });
        }
        Ok(())
    }

    pub fn to_settings(&self) -> EvalSettings {
        EvalSettings {
            search: SearchSettings {
                checks: Checks::FULL,
                max_steps: self.max_steps,
            },
            diagnostics: self.diagnostics,
            parallel: self.parallel,
        }
    }

    /// Resolve a configured file name against the model directory.
    pub fn resolve(dir: &Path, file: &str) -> PathBuf {
        dir.join(file)
    }
}
