//! Coverage threshold resolution

use regex::Regex;
use serde::Serialize;

use super::package_path;
use crate::error::{Result, ReviewError};

/// Per-class override, matched as an unanchored regular expression
#[derive(Debug, Clone)]
pub struct ClassThreshold {
    pub pattern: Regex,
    pub percentage: f64,
}

/// Per-package override, matched as a prefix of the class's package path
#[derive(Debug, Clone)]
pub struct PackageThreshold {
    pub prefix: String,
    pub percentage: f64,
}

/// Minimum coverage requirements for a review
///
/// Class patterns are compiled as they are added so an invalid one fails
/// before any report is looked at.
#[derive(Debug, Clone, Default)]
pub struct ThresholdConfig {
    pub project: f64,
    pub minimum_class: Option<f64>,
    classes: Vec<ClassThreshold>,
    packages: Vec<PackageThreshold>,
}

impl ThresholdConfig {
    pub fn new(project: f64) -> Self {
        Self {
            project,
            ..Default::default()
        }
    }

    pub fn with_minimum_class(mut self, percentage: f64) -> Self {
        self.minimum_class = Some(percentage);
        self
    }

    pub fn with_class_threshold(mut self, pattern: &str, percentage: f64) -> Result<Self> {
        self.add_class_threshold(pattern, percentage)?;
        Ok(self)
    }

    pub fn with_package_threshold(mut self, prefix: &str, percentage: f64) -> Self {
        self.add_package_threshold(prefix, percentage);
        self
    }

    pub fn add_class_threshold(&mut self, pattern: &str, percentage: f64) -> Result<()> {
        // An empty pattern would match every class
        if pattern.is_empty() {
            return Ok(());
        }
        let compiled = Regex::new(pattern).map_err(|source| ReviewError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.classes.push(ClassThreshold {
            pattern: compiled,
            percentage,
        });
        Ok(())
    }

    pub fn add_package_threshold(&mut self, prefix: &str, percentage: f64) {
        if prefix.is_empty() {
            return;
        }
        self.packages.push(PackageThreshold {
            prefix: prefix.to_string(),
            percentage,
        });
    }

    pub fn class_thresholds(&self) -> &[ClassThreshold] {
        &self.classes
    }

    pub fn package_thresholds(&self) -> &[PackageThreshold] {
        &self.packages
    }

    /// Scalar class minimum, 0 when not configured
    pub fn minimum_class_percentage(&self) -> f64 {
        self.minimum_class.unwrap_or(0.0)
    }

    /// Required coverage for a class
    ///
    /// Precedence: first declared matching class pattern, then the longest
    /// matching package prefix (later entries win ties), then the scalar
    /// class minimum.
    pub fn resolve(&self, qualified_name: &str) -> f64 {
        let resolved = self
            .class_match(qualified_name)
            .or_else(|| self.package_match(package_path(qualified_name)))
            .unwrap_or_else(|| self.minimum_class_percentage());

        tracing::trace!(class = qualified_name, required = resolved, "Resolved threshold");
        resolved
    }

    fn class_match(&self, qualified_name: &str) -> Option<f64> {
        self.classes
            .iter()
            .find(|entry| entry.pattern.is_match(qualified_name))
            .map(|entry| entry.percentage)
    }

    fn package_match(&self, package: &str) -> Option<f64> {
        let mut best: Option<&PackageThreshold> = None;
        for entry in &self.packages {
            if !package.starts_with(&entry.prefix) {
                continue;
            }
            match best {
                Some(current) if current.prefix.len() > entry.prefix.len() => {}
                _ => best = Some(entry),
            }
        }
        best.map(|entry| entry.percentage)
    }
}

/// Outcome of one coverage check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Passed,
    BelowThreshold,
    /// Less than half of the required coverage
    FarBelowThreshold,
}

impl CoverageStatus {
    pub fn evaluate(actual: f64, required: f64) -> Self {
        if actual < required / 2.0 {
            CoverageStatus::FarBelowThreshold
        } else if actual < required {
            CoverageStatus::BelowThreshold
        } else {
            CoverageStatus::Passed
        }
    }

    pub fn passed(&self) -> bool {
        *self == CoverageStatus::Passed
    }

    /// Markdown emoji shortcode
    pub fn icon(&self) -> &'static str {
        match self {
            CoverageStatus::Passed => ":white_check_mark:",
            CoverageStatus::BelowThreshold => ":warning:",
            CoverageStatus::FarBelowThreshold => ":skull:",
        }
    }
}
