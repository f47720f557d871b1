//! Layered configuration for javalens.
//!
//! Precedence, lowest to highest: built-in defaults, a config file, the
//! `JAVALENS_*` environment variables, then CLI flags (applied by the caller).
//! Every section is `#[serde(default)]`, so a file only has to name the keys
//! it changes; nested mappings merge while lists replace.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scan::Category;

/// Config files looked for in the working directory when no path is given.
pub const DISCOVERY_FILES: &[&str] = &["javalens.yaml", "javalens.yml", "javalens.json"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: String, value: String },
    #[error("unknown LLM provider {0:?} (expected none, local, openai or anthropic)")]
    UnknownProvider(String),
    #[error("unknown category {0:?} (expected entry-point, service, data-access, model or unknown)")]
    UnknownCategory(String),
    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Top-level configuration tree.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub reader: ReaderConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

/// Source discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReaderConfig {
    /// Glob patterns matched against root-relative paths.
    pub exclude_globs: Vec<String>,
    /// Files above this size are skipped.
    pub max_file_size_kb: u64,
    /// First matching rule wins.
    pub categorization_rules: Vec<CategorizationRule>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            exclude_globs: [
                "**/build/**",
                "**/out/**",
                "**/target/**",
                "**/.mvn/**",
                "**/.idea/**",
                "**/.git/**",
                "**/node_modules/**",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_file_size_kb: 512,
            categorization_rules: default_rules(),
        }
    }
}

fn default_rules() -> Vec<CategorizationRule> {
    [
        ("Controller", Category::EntryPoint),
        ("Resource", Category::EntryPoint),
        ("Service", Category::Service),
        ("Repository", Category::DataAccess),
        ("Dao", Category::DataAccess),
        ("DAO", Category::DataAccess),
        ("Mapper", Category::DataAccess),
        ("Model", Category::Model),
        ("Entity", Category::Model),
        ("Dto", Category::Model),
    ]
    .into_iter()
    .map(|(pattern, category)| CategorizationRule {
        pattern: pattern.to_string(),
        category,
    })
    .collect()
}

/// File-name substring to category mapping.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CategorizationRule {
    pub pattern: String,
    pub category: Category,
}

impl FromStr for CategorizationRule {
    type Err = ConfigError;

    /// Parses `PATTERN=CATEGORY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pattern, category) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::Invalid(format!("expected PATTERN=CATEGORY, got {s:?}")))?;
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ConfigError::Invalid(format!("empty pattern in {s:?}")));
        }
        Ok(Self {
            pattern: pattern.to_string(),
            category: category.trim().parse()?,
        })
    }
}

/// Enrichment backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    None,
    Local,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::None => "none",
            LlmProvider::Local => "local",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(LlmProvider::None),
            "local" => Ok(LlmProvider::Local),
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Enrichment settings. Token budgets are approximated by characters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Provider default when unset.
    pub model: Option<String>,
    /// Override for the provider's API endpoint.
    pub base_url: Option<String>,
    pub max_input_tokens: usize,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Maximum in-flight class requests.
    pub concurrency: usize,
    pub max_signatures_per_class: usize,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::None,
            model: None,
            base_url: None,
            max_input_tokens: 12000,
            max_output_tokens: 1500,
            temperature: 0.1,
            concurrency: 4,
            max_signatures_per_class: 20,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Also write logs to this file.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
        }
    }
}

impl AppConfig {
    /// Parse a config file. `.json` is read as JSON, `.yaml`/`.yml` as YAML,
    /// anything else as YAML then JSON.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        Self::parse_str(&content, &ext).map_err(|message| ConfigError::Parse {
            path: display,
            message,
        })
    }

    fn parse_str(content: &str, ext: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        match ext {
            "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            _ => serde_yaml::from_str(content)
                .or_else(|yaml_err| {
                    serde_json::from_str(content).map_err(|_| yaml_err.to_string())
                }),
        }
    }

    /// Load defaults, then `explicit` or the first discovered file in `dir`,
    /// then the process environment.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::parse_file(path)?,
            None => match discover(dir) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "using discovered config");
                    Self::parse_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `JAVALENS_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("JAVALENS_LLM_PROVIDER") {
            self.llm.provider = v.parse()?;
        }
        if let Some(v) = get("JAVALENS_LLM_MODEL") {
            self.llm.model = Some(v);
        }
        if let Some(v) = get("JAVALENS_LLM_MAX_INPUT_TOKENS") {
            self.llm.max_input_tokens = parse_env("JAVALENS_LLM_MAX_INPUT_TOKENS", &v)?;
        }
        if let Some(v) = get("JAVALENS_LLM_MAX_OUTPUT_TOKENS") {
            self.llm.max_output_tokens = parse_env("JAVALENS_LLM_MAX_OUTPUT_TOKENS", &v)?;
        }
        if let Some(v) = get("JAVALENS_LLM_TEMPERATURE") {
            self.llm.temperature = parse_env("JAVALENS_LLM_TEMPERATURE", &v)?;
        }
        if let Some(v) = get("JAVALENS_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = get("JAVALENS_LOG_FILE") {
            self.logging.file_path = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.reader.exclude_globs {
            globset::Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
        }
        if self.llm.concurrency == 0 {
            return Err(ConfigError::Invalid("llm.concurrency must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature {} is outside 0.0..=2.0",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// First existing discovery file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DISCOVERY_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}
