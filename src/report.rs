//! Markdown coverage report and the review-host feedback channel

use std::path::Path;

use crate::coverage::{format_percentage, parse_report, ThresholdConfig};
use crate::error::Result;
use crate::evaluate::{class_report_url, evaluate, NoDataPolicy, Severity, Verdict};
use crate::scope::{filter_scope, ChangedFiles, ScopeConfig};

/// Where review feedback goes (PR comment, CI log, test recorder...)
pub trait FeedbackSink {
    fn report_error(&mut self, message: &str);
    fn report_warning(&mut self, message: &str);
    fn report_markdown(&mut self, markdown: &str);
}

/// Sink that keeps every message, in order of arrival per kind
#[derive(Debug, Default, Clone)]
pub struct CollectedFeedback {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub markdowns: Vec<String>,
}

impl FeedbackSink for CollectedFeedback {
    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn report_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn report_markdown(&mut self, markdown: &str) {
        self.markdowns.push(markdown.to_string());
    }
}

/// Second argument of [`CoverageReview::report`]
///
/// A bare string is taken as the link base URL.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub link_base_url: Option<String>,
    /// `None` and `Some(true)` abort on a report without classes, `Some(false)` warns
    pub fail_on_no_data: Option<bool>,
}

impl From<&str> for ReportOptions {
    fn from(link_base_url: &str) -> Self {
        Self {
            link_base_url: Some(link_base_url.to_string()),
            fail_on_no_data: None,
        }
    }
}

impl From<String> for ReportOptions {
    fn from(link_base_url: String) -> Self {
        Self {
            link_base_url: Some(link_base_url),
            fail_on_no_data: None,
        }
    }
}

/// Coverage check for one review
#[derive(Debug, Clone, Default)]
pub struct CoverageReview {
    pub thresholds: ThresholdConfig,
    pub scope: ScopeConfig,
    pub changes: ChangedFiles,
}

impl CoverageReview {
    pub fn new(thresholds: ThresholdConfig, scope: ScopeConfig, changes: ChangedFiles) -> Self {
        Self {
            thresholds,
            scope,
            changes,
        }
    }

    /// Parse, evaluate and publish the report at `path`
    ///
    /// Shortfalls go to `sink` as errors followed by the markdown table.
    /// Unreadable or malformed reports, and reports without classes under
    /// the failing no-data policy, are returned as errors.
    pub fn report<S: FeedbackSink>(
        &self,
        path: &Path,
        options: impl Into<ReportOptions>,
        sink: &mut S,
    ) -> Result<Verdict> {
        let options = options.into();
        let project = parse_report(path)?;
        let scope = filter_scope(&project.classes, &self.changes, &self.scope);

        let mut verdict = evaluate(
            &project,
            &self.thresholds,
            &scope,
            NoDataPolicy::from_flag(options.fail_on_no_data),
        )?;

        if let Some(base_url) = options.link_base_url.as_deref().filter(|url| !url.is_empty()) {
            verdict.attach_links(base_url);
        }

        publish(&verdict, sink);
        Ok(verdict)
    }
}

/// Forward findings, then the table when there is one
pub fn publish<S: FeedbackSink>(verdict: &Verdict, sink: &mut S) {
    for finding in &verdict.findings {
        match finding.severity {
            Severity::Error => sink.report_error(&finding.message),
            Severity::Warning => sink.report_warning(&finding.message),
        }
    }

    if verdict.has_data {
        sink.report_markdown(&render(verdict, None));
    }
}

/// Render the verdict as a markdown table
///
/// Class cells link to the HTML report when the result carries a link or a
/// base URL is given.
pub fn render(verdict: &Verdict, link_base_url: Option<&str>) -> String {
    let mut markdown = format!(
        "### JaCoCo Code Coverage {}% {}\n",
        format_percentage(verdict.project_percentage),
        verdict.project_status.icon()
    );
    markdown.push_str("| Class | Covered | Required | Status |\n");
    markdown.push_str("|:---|:---:|:---:|:---:|\n");

    for result in &verdict.class_results {
        let link = result
            .link
            .clone()
            .or_else(|| link_base_url.map(|base| class_report_url(base, &result.qualified_name)));
        let class_cell = match link {
            Some(url) => format!("[`{}`]({})", result.qualified_name, url),
            None => format!("`{}`", result.qualified_name),
        };

        markdown.push_str(&format!(
            "| {} | {}% | {}% | {} |\n",
            class_cell,
            format_percentage(result.actual_percentage),
            format_percentage(result.required_percentage),
            result.status.icon()
        ));
    }

    markdown
}
