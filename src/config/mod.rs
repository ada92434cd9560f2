// src/config/mod.rs

//! Layered configuration
//!
//! Configuration is assembled from prioritized layers:
//! - Files (YAML, JSON or TOML, picked by extension)
//! - Environment variables (`PREFIX_SECTION__FIELD=value`)
//! - In-memory values
//!
//! Layers are deep-merged from lowest to highest priority and then read
//! into a typed [`StorefrontConfig`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{Error, ErrorKind, Result};
use crate::facets::{FacetScope, Vocabulary, DEFAULT_PRICE_RANGE};
use crate::filter::PriceRange;

pub const DEFAULT_ENV_PREFIX: &str = "STOREFRONT";

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error for '{}': {}", self.key, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parses a document in this format into a JSON value tree
    pub fn parse(&self, content: &str) -> Result<Value> {
        match self {
            Self::Json => serde_json::from_str(content)
                .map_err(|e| Error::config(format!("Failed to parse JSON: {}", e))),
            Self::Yaml => serde_yaml::from_str(content)
                .map_err(|e| Error::config(format!("Failed to parse YAML: {}", e))),
            Self::Toml => toml::from_str(content)
                .map_err(|e| Error::config(format!("Failed to parse TOML: {}", e))),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigSource {
    File { path: PathBuf, format: ConfigFormat },
    Environment { prefix: String },
    Memory { data: Value },
}

#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub name: String,
    pub source: ConfigSource,
    pub priority: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub query: QueryConfig,
    pub vocabulary: Vocabulary,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.query.default_page_size == 0 {
            errors.push(ValidationError {
                key: "query.default_page_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.query.max_page_size < self.query.default_page_size {
            errors.push(ValidationError {
                key: "query.max_page_size".to_string(),
                message: "must not be smaller than query.default_page_size".to_string(),
            });
        }
        if let Err(e) = self.query.default_price_range.validate() {
            errors.push(ValidationError {
                key: "query.default_price_range".to_string(),
                message: e.message,
            });
        }
        for message in self.vocabulary.validate() {
            errors.push(ValidationError {
                key: "vocabulary".to_string(),
                message,
            });
        }
        if self.catalog.fetch_timeout_ms == 0 {
            errors.push(ValidationError {
                key: "catalog.fetch_timeout_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }

        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub facet_scope: FacetScope,
    /// Price facet reported when nothing matches
    pub default_price_range: PriceRange,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 12,
            max_page_size: 100,
            facet_scope: FacetScope::FullyFiltered,
            default_price_range: DEFAULT_PRICE_RANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog document (JSON, YAML or TOML)
    pub path: Option<PathBuf>,
    /// Where the last good snapshot is kept for offline fallback
    pub cache_path: Option<PathBuf>,
    pub fetch_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            cache_path: None,
            fetch_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub console: ConsoleLogConfig,
    pub file: Option<FileLogConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            console: ConsoleLogConfig::default(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleLogConfig {
    pub enabled: bool,
    pub colored: bool,
}

impl Default for ConsoleLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    pub path: PathBuf,
    pub rotation: LogRotation,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./logs/storefront.log"),
            rotation: LogRotation::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

#[derive(Debug, Default)]
pub struct ConfigManager {
    layers: Vec<ConfigLayer>,
    merged_config: Value,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            merged_config: Value::Object(Map::new()),
        }
    }

    /// File layer at priority 0 plus the `STOREFRONT` environment layer on top
    pub fn with_config_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut manager = Self::new();
        manager.add_file_layer("default", config_path, 0)?;
        manager.add_env_layer("env", DEFAULT_ENV_PREFIX, 100);
        Ok(manager)
    }

    pub fn add_file_layer<P: AsRef<Path>>(
        &mut self,
        name: impl Into<String>,
        path: P,
        priority: u32,
    ) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let format = ConfigFormat::from_extension(&path)
            .ok_or_else(|| Error::config("Unsupported configuration file format"))?;

        self.push_layer(ConfigLayer {
            name: name.into(),
            source: ConfigSource::File { path, format },
            priority,
        });
        Ok(())
    }

    pub fn add_env_layer(&mut self, name: impl Into<String>, prefix: impl Into<String>, priority: u32) {
        self.push_layer(ConfigLayer {
            name: name.into(),
            source: ConfigSource::Environment {
                prefix: prefix.into(),
            },
            priority,
        });
    }

    pub fn add_memory_layer(&mut self, name: impl Into<String>, data: Value, priority: u32) {
        self.push_layer(ConfigLayer {
            name: name.into(),
            source: ConfigSource::Memory { data },
            priority,
        });
    }

    fn push_layer(&mut self, layer: ConfigLayer) {
        self.layers.push(layer);
        self.layers.sort_by_key(|l| l.priority);
    }

    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    /// Merges every layer and returns the validated, typed configuration.
    pub fn load(&mut self) -> Result<StorefrontConfig> {
        self.merge_configurations()?;

        let config: StorefrontConfig = serde_json::from_value(self.merged_config.clone())
            .map_err(|e| Error::config(format!("Invalid configuration: {}", e)))?;

        let errors = config.validate();
        if !errors.is_empty() {
            return Err(Error::invalid_config(
                errors.iter().map(ToString::to_string).collect(),
            ));
        }

        tracing::debug!(layers = self.layers.len(), "configuration loaded");
        Ok(config)
    }

    /// Typed access to a dotted key of the merged configuration
    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = get_nested_value(&self.merged_config, key).ok_or_else(|| {
            Error::new(
                ErrorKind::Configuration {
                    key: Some(key.to_string()),
                    validation_errors: vec![format!("Configuration key '{}' not found", key)],
                },
                "Configuration key not found",
            )
        })?;

        serde_json::from_value(value.clone()).map_err(|e| {
            Error::new(
                ErrorKind::Configuration {
                    key: Some(key.to_string()),
                    validation_errors: vec![format!("Failed to deserialize config value: {}", e)],
                },
                format!("Failed to deserialize config value: {}", e),
            )
        })
    }

    fn merge_configurations(&mut self) -> Result<()> {
        let mut merged = Value::Object(Map::new());

        // Lowest priority first
        for layer in &self.layers {
            let layer_config = load_layer_config(layer)?;
            merge_values(&mut merged, layer_config);
        }

        self.merged_config = merged;
        Ok(())
    }
}

fn load_layer_config(layer: &ConfigLayer) -> Result<Value> {
    match &layer.source {
        ConfigSource::File { path, format } => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::config(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            format.parse(&content)
        }
        ConfigSource::Environment { prefix } => {
            let mut env_config = Map::new();
            let prefix = format!("{}_", prefix);

            for (key, value) in std::env::vars() {
                if let Some(config_key) = key.strip_prefix(&prefix) {
                    let config_key = config_key.to_lowercase();
                    let nested_keys: Vec<&str> = config_key.split("__").collect();
                    set_nested_env_value(&mut env_config, &nested_keys, value);
                }
            }

            Ok(Value::Object(env_config))
        }
        ConfigSource::Memory { data } => Ok(data.clone()),
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(&key) {
                    Some(target_value) => merge_values(target_value, source_value),
                    None => {
                        target_map.insert(key, source_value);
                    }
                }
            }
        }
        (target, source) => {
            *target = source;
        }
    }
}

fn get_nested_value<'a>(config: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(config, |current, k| current.get(k))
}

fn set_nested_env_value(config: &mut Map<String, Value>, keys: &[&str], value: String) {
    let Some((first, rest)) = keys.split_first() else {
        return;
    };

    if rest.is_empty() {
        let parsed_value = if let Ok(bool_val) = value.parse::<bool>() {
            Value::Bool(bool_val)
        } else if let Ok(int_val) = value.parse::<i64>() {
            Value::Number(Number::from(int_val))
        } else if let Some(float_val) = value.parse::<f64>().ok().and_then(Number::from_f64) {
            Value::Number(float_val)
        } else {
            Value::String(value)
        };

        config.insert(first.to_string(), parsed_value);
    } else {
        let nested = config
            .entry(first.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !nested.is_object() {
            *nested = Value::Object(Map::new());
        }
        if let Value::Object(nested_map) = nested {
            set_nested_env_value(nested_map, rest, value);
        }
    }
}
