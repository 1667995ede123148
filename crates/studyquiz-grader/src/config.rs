//! Grader configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studyquiz_core::model::{default_difficulty, InteractionKind};
use studyquiz_core::traits::Grader;

use crate::http::HttpGrader;

/// Which grading collaborator to use.
///
/// The Debug impl masks the API key.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraderConfig {
    /// No remote grader; answers are graded by the local heuristic.
    #[default]
    Local,
    Http {
        base_url: String,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

impl std::fmt::Debug for GraderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraderConfig::Local => f.write_str("Local"),
            GraderConfig::Http {
                base_url,
                path,
                api_key,
                timeout_secs,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("path", path)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

/// Top-level studyquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyquizConfig {
    /// Grading collaborator.
    #[serde(default)]
    pub grader: GraderConfig,
    /// Difficulty label used when a question set has none.
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Session-wide default question type (e.g. "mcq", "essay").
    #[serde(default)]
    pub default_kind: Option<String>,
}

impl Default for StudyquizConfig {
    fn default() -> Self {
        Self {
            grader: GraderConfig::default(),
            difficulty: default_difficulty(),
            default_kind: None,
        }
    }
}

impl StudyquizConfig {
    /// The configured default kind, parsed.
    pub fn default_kind(&self) -> Result<Option<InteractionKind>> {
        self.default_kind
            .as_deref()
            .map(|k| k.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
            .transpose()
            .context("invalid default_kind in config")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_grader_config(config: &GraderConfig) -> GraderConfig {
    match config {
        GraderConfig::Local => GraderConfig::Local,
        GraderConfig::Http {
            base_url,
            path,
            api_key,
            timeout_secs,
        } => GraderConfig::Http {
            base_url: resolve_env_vars(base_url),
            path: path.as_ref().map(|p| resolve_env_vars(p)),
            api_key: api_key.as_ref().map(|k| resolve_env_vars(k)),
            timeout_secs: *timeout_secs,
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studyquiz.toml` in the current directory
/// 2. `~/.config/studyquiz/config.toml`
///
/// Environment variable overrides: `STUDYQUIZ_GRADER_URL`, `STUDYQUIZ_GRADER_KEY`.
pub fn load_config() -> Result<StudyquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("studyquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StudyquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudyquizConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("STUDYQUIZ_GRADER_URL") {
        match &mut config.grader {
            GraderConfig::Http { base_url, .. } => *base_url = url,
            GraderConfig::Local => {
                config.grader = GraderConfig::Http {
                    base_url: url,
                    path: None,
                    api_key: None,
                    timeout_secs: None,
                }
            }
        }
    }

    if let Ok(key) = std::env::var("STUDYQUIZ_GRADER_KEY") {
        if let GraderConfig::Http { api_key, .. } = &mut config.grader {
            *api_key = Some(key);
        }
    }

    config.grader = resolve_grader_config(&config.grader);
    tracing::debug!(grader = ?config.grader, "loaded config");

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studyquiz"))
}

/// Create the grader described by `config`; `None` for local grading.
pub fn create_grader(config: &GraderConfig) -> Result<Option<Arc<dyn Grader>>> {
    match config {
        GraderConfig::Local => Ok(None),
        GraderConfig::Http {
            base_url,
            path,
            api_key,
            timeout_secs,
        } => {
            anyhow::ensure!(!base_url.trim().is_empty(), "grader base_url is empty");
            let grader = HttpGrader::new(base_url, path.as_deref(), api_key.clone(), *timeout_secs)?;
            Ok(Some(Arc::new(grader)))
        }
    }
}
