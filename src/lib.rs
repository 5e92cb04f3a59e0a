//! jacoco-review - JaCoCo coverage gate for code review
//!
//! A library for checking JaCoCo XML coverage reports with:
//! - Project, package and per-class minimum coverage
//! - Optional restriction to the classes a change touches
//! - A markdown summary table for the review host

pub mod config;
pub mod coverage;
pub mod error;
pub mod evaluate;
pub mod git;
pub mod report;
pub mod scope;

pub use coverage::{
    format_percentage, parse_report, parse_report_str, ClassCoverage, Counter, CounterType, CoverageStatus,
    ProjectCoverage, ThresholdConfig,
};
pub use error::{Result, ReviewError};
pub use evaluate::{evaluate, ClassResult, Finding, NoDataPolicy, Severity, Verdict};
pub use report::{render, CollectedFeedback, CoverageReview, FeedbackSink, ReportOptions};
pub use scope::{filter_scope, ChangedFiles, ScopeConfig};
