use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::coverage::ThresholdConfig;
use crate::report::ReportOptions;
use crate::scope::{ScopeConfig, DEFAULT_EXTENSIONS, DEFAULT_SOURCE_ROOT};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub report: Report,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thresholds {
    /// Minimum total coverage of the project
    #[serde(default)]
    pub project: f64,
    /// Minimum coverage of every class without a more specific entry
    #[serde(default)]
    pub class: Option<f64>,
    /// Class name regex → percentage, first match wins
    #[serde(default)]
    pub classes: toml::Table,
    /// Package prefix → percentage, longest prefix wins
    #[serde(default)]
    pub packages: toml::Table,
}

#[derive(Debug, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub only_new_files: bool,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            only_new_files: false,
            source_root: default_source_root(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub link_base_url: Option<String>,
    #[serde(default)]
    pub fail_on_no_data: Option<bool>,
}

fn default_source_root() -> String {
    DEFAULT_SOURCE_ROOT.to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        check_percentage("thresholds.project", t.project)?;
        if let Some(class) = t.class {
            check_percentage("thresholds.class", class)?;
        }
        for (key, value) in t.classes.iter().chain(t.packages.iter()) {
            check_percentage(key, percentage_value(key, value)?)?;
        }
        Ok(())
    }

    /// Compile the threshold section; fails on an invalid class pattern
    pub fn threshold_config(&self) -> Result<ThresholdConfig> {
        let t = &self.thresholds;
        let mut config = ThresholdConfig::new(t.project);
        config.minimum_class = t.class;

        for (pattern, value) in &t.classes {
            config.add_class_threshold(pattern, percentage_value(pattern, value)?)?;
        }
        for (prefix, value) in &t.packages {
            config.add_package_threshold(prefix, percentage_value(prefix, value)?);
        }

        Ok(config)
    }

    pub fn scope_config(&self) -> Result<ScopeConfig> {
        let scope = ScopeConfig::new(
            self.scope.only_new_files,
            &self.scope.source_root,
            self.scope.extensions.clone(),
        )?;
        Ok(scope)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            link_base_url: self.report.link_base_url.clone(),
            fail_on_no_data: self.report.fail_on_no_data,
        }
    }
}

fn percentage_value(key: &str, value: &toml::Value) -> Result<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
        .with_context(|| format!("Threshold for '{}' must be a number", key))
}

fn check_percentage(key: &str, value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        anyhow::bail!("Threshold for '{}' must be between 0 and 100, got {}", key, value);
    }
    Ok(())
}
