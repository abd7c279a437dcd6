use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::alignment::SimilarityScorer;
use crate::errors::AlignError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Alignment cost model
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Embedding collaborator settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Screenplay layout parsing
    #[serde(default)]
    pub script: ScriptParserConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Cost model for the alignment engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlignmentConfig {
    /// Weight of the normalized edit distance
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f64,

    /// Weight of the embedding cosine distance
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,

    /// Cost of a script line with no subtitle counterpart
    #[serde(default = "default_gap_script_cost")]
    pub gap_script_cost: f64,

    /// Cost of a subtitle cue with no script counterpart
    #[serde(default = "default_gap_subtitle_cost")]
    pub gap_subtitle_cost: f64,

    /// Diagonal band half-width; derived from the input sizes when unset
    #[serde(default)]
    pub band_width: Option<usize>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            lexical_weight: default_lexical_weight(),
            semantic_weight: default_semantic_weight(),
            gap_script_cost: default_gap_script_cost(),
            gap_subtitle_cost: default_gap_subtitle_cost(),
            band_width: None,
        }
    }
}

impl AlignmentConfig {
    /// Weights must be non-negative and sum to one, gap costs non-negative
    pub fn validate(&self) -> Result<(), AlignError> {
        let values = [
            ("lexical_weight", self.lexical_weight),
            ("semantic_weight", self.semantic_weight),
            ("gap_script_cost", self.gap_script_cost),
            ("gap_subtitle_cost", self.gap_subtitle_cost),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(AlignError::invalid_input(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let weight_sum = self.lexical_weight + self.semantic_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(AlignError::invalid_input(format!(
                "lexical_weight + semantic_weight must equal 1, got {}",
                weight_sum
            )));
        }

        Ok(())
    }

    /// Configured band width, or `max(20, |N-M| * 2)`
    pub fn effective_band_width(&self, script_len: usize, subtitle_len: usize) -> usize {
        self.band_width
            .unwrap_or_else(|| (script_len.abs_diff(subtitle_len) * 2).max(20))
    }

    /// Scorer matching the configured weight split
    pub fn scorer(&self) -> SimilarityScorer {
        SimilarityScorer::blended(self.lexical_weight, self.semantic_weight)
    }

    /// Same weights with the semantic share moved to the lexical term
    pub fn lexical_only(&self) -> Self {
        Self {
            lexical_weight: 1.0,
            semantic_weight: 0.0,
            ..self.clone()
        }
    }
}

/// Embedding provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    // @provider: Ollama embeddings endpoint
    #[default]
    Ollama,
    // @provider: In-process character trigram hashing
    Hashing,
}

impl EmbeddingProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Hashing => "Hashing",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Hashing => "hashing".to_string(),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hashing" => Ok(Self::Hashing),
            _ => Err(anyhow!("Invalid embedding provider: {}", s)),
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// Whether semantic scoring is used at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Which embedder to use
    #[serde(default)]
    pub provider: EmbeddingProvider,

    /// Service endpoint URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub max_retries: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub backoff_base_ms: u64,

    /// Maximum number of concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Vector size for the hashing embedder
    #[serde(default = "default_hashing_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: EmbeddingProvider::default(),
            endpoint: default_ollama_endpoint(),
            model: default_embedding_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_retry_count(),
            backoff_base_ms: default_retry_backoff_ms(),
            concurrent_requests: default_concurrent_requests(),
            dimensions: default_hashing_dimensions(),
        }
    }
}

/// Screenplay layout tolerances
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScriptParserConfig {
    /// Left whitespace tolerance; auto-detected when unset
    #[serde(default)]
    pub ltol: Option<usize>,

    /// Right whitespace tolerance
    #[serde(default = "default_rtol")]
    pub rtol: usize,

    /// Minimum share of lines for a leading-whitespace bin to count during auto-detection
    #[serde(default = "default_auto_tolerance")]
    pub auto_tolerance: f64,
}

impl Default for ScriptParserConfig {
    fn default() -> Self {
        Self {
            ltol: None,
            rtol: default_rtol(),
            auto_tolerance: default_auto_tolerance(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_lexical_weight() -> f64 {
    0.5
}

fn default_semantic_weight() -> f64 {
    0.5
}

fn default_gap_script_cost() -> f64 {
    0.1
}

fn default_gap_subtitle_cost() -> f64 {
    0.3
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_hashing_dimensions() -> usize {
    256
}

fn default_rtol() -> usize {
    6
}

fn default_auto_tolerance() -> f64 {
    0.01
}

impl Config {
    /// Load a configuration file, writing the defaults first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        log::warn!(
            "Config file not found at '{}', creating default config.",
            path.display()
        );
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json).with_context(|| {
            format!("Failed to write default config to file: {}", path.display())
        })?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.alignment
            .validate()
            .context("Invalid alignment settings")?;

        if self.embedding.enabled {
            match self.embedding.provider {
                EmbeddingProvider::Ollama => {
                    url::Url::parse(&self.embedding.endpoint).with_context(|| {
                        format!("Invalid embedding endpoint: {}", self.embedding.endpoint)
                    })?;
                    if self.embedding.model.trim().is_empty() {
                        return Err(anyhow!("An embedding model is required for Ollama"));
                    }
                }
                EmbeddingProvider::Hashing => {
                    if self.embedding.dimensions == 0 {
                        return Err(anyhow!("Hashing embedder needs at least one dimension"));
                    }
                }
            }
            if self.embedding.concurrent_requests == 0 {
                return Err(anyhow!("concurrent_requests must be at least 1"));
            }
        }

        if !(0.0..=1.0).contains(&self.script.auto_tolerance) {
            return Err(anyhow!(
                "auto_tolerance must be between 0 and 1, got {}",
                self.script.auto_tolerance
            ));
        }

        Ok(())
    }
}
