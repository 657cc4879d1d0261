//! Template variable configuration.

use crate::template::TemplateVars;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;
use thiserror::Error;

/// Variable that receives the generation timestamp
pub const GENERATION_DATE_VAR: &str = "GENERATION_DATE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Variable {0} must be a string, number, boolean or null")]
    UnsupportedValue(String),

    #[error("Invalid date format {0:?}")]
    InvalidDateFormat(String),
}

/// Variables file schema
///
/// ```yaml
/// date_format: "%B %d, %Y at %H:%M UTC"
/// variables:
///   TITLE: My Book
///   GIT_REPO_URL: https://github.com/owner/repo
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub variables: BTreeMap<String, serde_yaml::Value>,
}

fn default_date_format() -> String {
    String::from("%B %d, %Y at %H:%M UTC")
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            variables: BTreeMap::new(),
        }
    }
}

impl TemplateConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to null
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject date formats chrono cannot render
    pub fn validate(&self) -> Result<(), ConfigError> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidDateFormat(self.date_format.clone()));
        }
        Ok(())
    }

    /// Scalar variables as template strings; `null` becomes the empty string
    pub fn template_vars(&self) -> Result<TemplateVars, ConfigError> {
        let mut vars = TemplateVars::new();
        for (name, value) in &self.variables {
            let text = match value {
                serde_yaml::Value::Null => String::new(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::String(s) => s.clone(),
                _ => return Err(ConfigError::UnsupportedValue(name.clone())),
            };
            vars.insert(name.clone(), text);
        }
        Ok(vars)
    }

    /// Format a timestamp with the configured date format
    pub fn format_date(&self, at: DateTime<Utc>) -> Result<String, ConfigError> {
        let mut out = String::new();
        write!(out, "{}", at.format(&self.date_format))
            .map_err(|_| ConfigError::InvalidDateFormat(self.date_format.clone()))?;
        Ok(out)
    }

    /// Set `GENERATION_DATE` unless it is already provided
    pub fn stamp_generation_date(
        &self,
        vars: &mut TemplateVars,
        at: DateTime<Utc>,
    ) -> Result<(), ConfigError> {
        if !vars.contains(GENERATION_DATE_VAR) {
            vars.insert(GENERATION_DATE_VAR, self.format_date(at)?);
        }
        Ok(())
    }
}
