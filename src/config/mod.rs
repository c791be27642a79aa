pub mod cli;

#[cfg(feature = "lambda")]
pub mod lambda;

use crate::core::persister::{KeyScheme, DEFAULT_KEY_ATTRIBUTE};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_ENV: &str = "ETL_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub input: InputConfig,
    pub store: StoreConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: String,
    pub window: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "test_data.csv".to_string(),
            window: crate::core::orchestrator::DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Jsonl,
    Memory,
    Dynamodb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub table: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub output_path: String,
    pub key_scheme: KeyScheme,
    pub key_attribute: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            table: "ETLDB".to_string(),
            region: "us-west-2".to_string(),
            endpoint_url: None,
            output_path: "./output/ETLDB.jsonl".to_string(),
            key_scheme: KeyScheme::default(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    #[default]
    Direct,
    Narrated,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub mode: DispatchMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

impl EtlConfig {
    /// Defaults, then the file named by `ETL_CONFIG`, then `ETL_*` overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ETL_INPUT_PATH") {
            self.input.path = path;
        }
        if let Some(window) = lookup("ETL_WINDOW") {
            self.input.window = window.trim().parse().map_err(|_| {
                EtlError::InvalidConfigValueError {
                    field: "ETL_WINDOW".to_string(),
                    value: window.clone(),
                    reason: "must be a whole number".to_string(),
                }
            })?;
        }
        if let Some(backend) = lookup("ETL_STORE_BACKEND") {
            self.store.backend = parse_enum("ETL_STORE_BACKEND", &backend)?;
        }
        if let Some(table) = lookup("ETL_TABLE") {
            self.store.table = table;
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.store.region = region;
        }
        if let Some(endpoint) = lookup("ETL_STORE_ENDPOINT") {
            self.store.endpoint_url = Some(endpoint);
        }
        if let Some(output) = lookup("ETL_OUTPUT_PATH") {
            self.store.output_path = output;
        }
        if let Some(mode) = lookup("ETL_DISPATCH_MODE") {
            self.dispatch.mode = parse_enum("ETL_DISPATCH_MODE", &mode)?;
        }
        if let Some(verbose) = lookup("ETL_VERBOSE") {
            self.logging.verbose = is_truthy(&verbose);
        }
        if let Some(json) = lookup("ETL_LOG_JSON") {
            self.logging.json = is_truthy(&json);
        }
        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extension("input.path", &self.input.path, &["csv"])?;
        validation::validate_positive_number("input.window", self.input.window, 1)?;

        match self.store.backend {
            StoreBackend::Jsonl => {
                validation::validate_path("store.output_path", &self.store.output_path)?;
            }
            StoreBackend::Memory => {}
            StoreBackend::Dynamodb => {
                if !cfg!(feature = "aws") {
                    return Err(EtlError::InvalidConfigValueError {
                        field: "store.backend".to_string(),
                        value: "dynamodb".to_string(),
                        reason: "this build does not include the `aws` feature".to_string(),
                    });
                }
                validation::validate_non_empty_string("store.table", &self.store.table)?;
                validation::validate_non_empty_string("store.region", &self.store.region)?;
                validation::validate_non_empty_string(
                    "store.key_attribute",
                    &self.store.key_attribute,
                )?;
                if let Some(url) = &self.store.endpoint_url {
                    validation::validate_url("store.endpoint_url", url)?;
                }
            }
        }

        Ok(())
    }
}

impl Validate for EtlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn parse_enum<T: serde::de::DeserializeOwned>(field: &str, value: &str) -> Result<T> {
    let normalized = value.trim().to_ascii_lowercase();
    serde_json::from_value(serde_json::Value::String(normalized)).map_err(|_| {
        EtlError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "unrecognised option".to_string(),
        }
    })
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
