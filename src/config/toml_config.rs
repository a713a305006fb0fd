use crate::core::catalog::DEFAULT_CONCURRENT_REQUESTS;
use crate::core::registry::{
    FieldKind, FieldSpec, PriceShape, PriceUnit, SchemaDescriptor, SchemaRegistry,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub catalog: CatalogInfo,
    pub store: StoreConfig,
    pub fan_out: Option<FanOutConfig>,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(rename = "type")]
    pub kind: StoreKind,
    pub base_url: Option<String>,
    pub seed_file: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutConfig {
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

/// A category declared in configuration instead of code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub key: String,
    pub label: Option<String>,
    pub price_shape: PriceShape,
    #[serde(default)]
    pub price_unit: PriceUnit,
    pub required_fields: Option<Vec<String>>,
    #[serde(default)]
    pub filters: Vec<FieldSpec>,
}

impl CategoryDefinition {
    pub fn to_descriptor(&self) -> SchemaDescriptor {
        let label = self.label.as_deref().unwrap_or(&self.key);
        let mut descriptor = SchemaDescriptor::new(&self.key, label, self.price_shape, self.price_unit);
        if let Some(required) = &self.required_fields {
            descriptor.required_fields = required.clone();
        }
        for spec in &self.filters {
            descriptor.add_filter(spec.clone());
        }
        descriptor
    }
}

impl CatalogConfig {
    /// Loads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses config from a TOML string, after env substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with its environment value. Unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("catalog.name", &self.catalog.name)?;

        match self.store.kind {
            StoreKind::Rest => {
                let base_url = validation::validate_required_field("store.base_url", &self.store.base_url)?;
                validation::validate_url("store.base_url", base_url)?;
            }
            StoreKind::Memory => {
                if let Some(seed_file) = &self.store.seed_file {
                    validation::validate_path("store.seed_file", seed_file)?;
                    validation::validate_file_extension("store.seed_file", seed_file, &["json"])?;
                }
            }
        }

        if let Some(timeout) = self.store.timeout_seconds {
            validation::validate_positive_number("store.timeout_seconds", timeout as usize, 1)?;
        }

        if let Some(concurrent) = self.fan_out.as_ref().and_then(|f| f.concurrent_requests) {
            validation::validate_positive_number("fan_out.concurrent_requests", concurrent, 1)?;
        }

        for (index, category) in self.categories.iter().enumerate() {
            validation::validate_non_empty_string(&format!("categories[{}].key", index), &category.key)?;
            for spec in &category.filters {
                validation::validate_non_empty_string(
                    &format!("categories[{}].filters.param", index),
                    &spec.param,
                )?;
                // sort takes its field from the requested order; the rest need a target
                if spec.kind != FieldKind::Sort {
                    validation::validate_non_empty_string(
                        &format!("categories[{}].filters.path", index),
                        &spec.path,
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Built-in categories plus the ones declared in `[[categories]]`. A
    /// declared key that matches a built-in replaces it.
    pub fn build_registry(&self) -> SchemaRegistry {
        let mut registry = SchemaRegistry::with_builtin_categories();
        for definition in &self.categories {
            if registry.register(definition.to_descriptor()).is_some() {
                tracing::info!("Category '{}' overridden by configuration", definition.key);
            }
        }
        registry
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for CatalogConfig {
    fn store_base_url(&self) -> Option<&str> {
        self.store.base_url.as_deref()
    }

    fn seed_file(&self) -> Option<&str> {
        self.store.seed_file.as_deref()
    }

    fn concurrent_requests(&self) -> usize {
        self.fan_out
            .as_ref()
            .and_then(|f| f.concurrent_requests)
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
