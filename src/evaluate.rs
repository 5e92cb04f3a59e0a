//! Coverage evaluation
//!
//! Turns a parsed report, the resolved thresholds and the review scope into a
//! verdict. Shortfalls are findings, not errors.

use serde::Serialize;

use crate::coverage::{format_percentage, ClassCoverage, CoverageStatus, ProjectCoverage, ThresholdConfig};
use crate::error::{Result, ReviewError};

/// What to do when the report has no classes at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoDataPolicy {
    #[default]
    Fail,
    Warn,
}

impl NoDataPolicy {
    /// `fail_on_no_data` as passed by callers; unset means fail
    pub fn from_flag(fail_on_no_data: Option<bool>) -> Self {
        match fail_on_no_data {
            Some(false) => NoDataPolicy::Warn,
            _ => NoDataPolicy::Fail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A message for the review host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassResult {
    pub qualified_name: String,
    pub actual_percentage: f64,
    pub required_percentage: f64,
    pub status: CoverageStatus,
    pub link: Option<String>,
}

impl ClassResult {
    pub fn passed(&self) -> bool {
        self.status.passed()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub project_percentage: f64,
    pub project_threshold: f64,
    pub project_status: CoverageStatus,
    /// Every in-scope class met its requirement
    pub classes_passed: bool,
    pub class_results: Vec<ClassResult>,
    pub findings: Vec<Finding>,
    /// False when the report had no classes and the no-data policy was `Warn`
    pub has_data: bool,
}

impl Verdict {
    pub fn project_passed(&self) -> bool {
        self.project_status.passed()
    }

    pub fn passed(&self) -> bool {
        self.findings.iter().all(|f| f.severity != Severity::Error)
    }

    /// Fill in report links for every class result
    pub fn attach_links(&mut self, base_url: &str) {
        for result in &mut self.class_results {
            result.link = Some(class_report_url(base_url, &result.qualified_name));
        }
    }
}

/// Evaluate a report against the thresholds for the given scope
///
/// `scope` holds the in-scope classes in report order.
pub fn evaluate(
    project: &ProjectCoverage,
    config: &ThresholdConfig,
    scope: &[&ClassCoverage],
    policy: NoDataPolicy,
) -> Result<Verdict> {
    let project_percentage = project.covered_percentage();
    let project_status = CoverageStatus::evaluate(project_percentage, config.project);

    if project.is_empty() {
        let error = ReviewError::NoCoverageData(project.name.clone());
        match policy {
            NoDataPolicy::Fail => return Err(error),
            NoDataPolicy::Warn => {
                let message = error.to_string();
                tracing::warn!("{}", message);
                return Ok(Verdict {
                    project_percentage,
                    project_threshold: config.project,
                    project_status,
                    classes_passed: true,
                    class_results: Vec::new(),
                    findings: vec![Finding::warning(message)],
                    has_data: false,
                });
            }
        }
    }

    let class_results: Vec<ClassResult> = scope
        .iter()
        .map(|class| {
            let actual = class.covered_percentage();
            let required = config.resolve(&class.qualified_name);
            ClassResult {
                qualified_name: class.qualified_name.clone(),
                actual_percentage: actual,
                required_percentage: required,
                status: CoverageStatus::evaluate(actual, required),
                link: None,
            }
        })
        .collect();
    let classes_passed = class_results.iter().all(|r| r.passed());

    let mut findings = Vec::new();
    if project_percentage < config.project {
        findings.push(Finding::error(format!(
            "Total coverage of {}%. Improve this to at least {}%",
            format_percentage(project_percentage),
            format_percentage(config.project)
        )));
    }
    if !classes_passed {
        findings.push(Finding::error(format!(
            "Class coverage is below minimum. Improve to at least {}%",
            format_percentage(config.minimum_class_percentage())
        )));
    }

    tracing::debug!(
        project = project_percentage,
        classes = class_results.len(),
        failing = class_results.iter().filter(|r| !r.passed()).count(),
        "Evaluated coverage"
    );

    Ok(Verdict {
        project_percentage,
        project_threshold: config.project,
        project_status,
        classes_passed,
        class_results,
        findings,
        has_data: true,
    })
}

/// `com/example/CachedRepository` → `{base}com.example/CachedRepository.html`
pub fn class_report_url(base_url: &str, qualified_name: &str) -> String {
    let page = match qualified_name.rsplit_once('/') {
        Some((package, class)) => format!("{}/{}.html", package.replace('/', "."), class),
        None => format!("{}.html", qualified_name),
    };
    if base_url.is_empty() || base_url.ends_with('/') {
        format!("{}{}", base_url, page)
    } else {
        format!("{}/{}", base_url, page)
    }
}
