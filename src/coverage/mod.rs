//! Coverage module
//!
//! Provides:
//! - The JaCoCo coverage data model (counters, classes, packages, project)
//! - JaCoCo XML parsing
//! - Threshold resolution

mod jacoco;
mod threshold;

pub use jacoco::*;
pub use threshold::*;

use serde::Serialize;

/// JaCoCo counter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterType {
    Instruction,
    Branch,
    Line,
    Complexity,
    Method,
    Class,
}

impl CounterType {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "INSTRUCTION" => Some(CounterType::Instruction),
            "BRANCH" => Some(CounterType::Branch),
            "LINE" => Some(CounterType::Line),
            "COMPLEXITY" => Some(CounterType::Complexity),
            "METHOD" => Some(CounterType::Method),
            "CLASS" => Some(CounterType::Class),
            _ => None,
        }
    }
}

/// Covered/missed pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counter {
    pub covered: u64,
    pub missed: u64,
}

impl Counter {
    pub fn new(covered: u64, missed: u64) -> Self {
        Self { covered, missed }
    }

    pub fn total(&self) -> u64 {
        self.covered.saturating_add(self.missed)
    }

    /// Sum of two counters, `None` on overflow
    pub fn checked_add(self, other: Counter) -> Option<Counter> {
        Some(Counter::new(
            self.covered.checked_add(other.covered)?,
            self.missed.checked_add(other.missed)?,
        ))
    }

    /// Covered share in percent, 0 when the counter is empty
    pub fn percentage(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.covered as f64 / self.total() as f64) * 100.0
    }
}

/// Counters attached to one report node, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Counters(Vec<(CounterType, Counter)>);

impl Counters {
    pub fn push(&mut self, kind: CounterType, counter: Counter) {
        self.0.push((kind, counter));
    }

    pub fn get(&self, kind: CounterType) -> Option<Counter> {
        self.0.iter().find(|(k, _)| *k == kind).map(|(_, c)| *c)
    }

    pub fn first(&self) -> Option<Counter> {
        self.0.first().map(|(_, c)| *c)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// LINE counter, else the first counter recorded, else empty
    pub fn line_or_first(&self) -> Counter {
        self.get(CounterType::Line)
            .or_else(|| self.first())
            .unwrap_or_default()
    }
}

/// Coverage for a single class
#[derive(Debug, Clone, Serialize)]
pub struct ClassCoverage {
    /// Slash separated package path plus class name, e.g. `com/example/CachedRepository`
    pub qualified_name: String,
    pub line_counter: Counter,
    pub counters: Counters,
}

impl ClassCoverage {
    /// Package path including the trailing separator, empty for the default package
    pub fn package_path(&self) -> &str {
        package_path(&self.qualified_name)
    }

    /// Whole line coverage percentage, rounded down
    pub fn covered_percentage(&self) -> f64 {
        self.line_counter.percentage().floor()
    }
}

/// Aggregate counters of a package
#[derive(Debug, Clone, Serialize)]
pub struct PackageCoverage {
    pub name: String,
    pub line_counter: Counter,
    pub counters: Counters,
}

/// Everything parsed out of one report
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectCoverage {
    pub name: String,
    pub classes: Vec<ClassCoverage>,
    pub packages: Vec<PackageCoverage>,
    pub total_line_counter: Counter,
    pub counters: Counters,
}

impl ProjectCoverage {
    /// Total line coverage rounded to two decimals
    pub fn covered_percentage(&self) -> f64 {
        round2(self.total_line_counter.percentage())
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Package part of a qualified name, trailing separator included
pub(crate) fn package_path(qualified_name: &str) -> &str {
    match qualified_name.rfind('/') {
        Some(idx) => &qualified_name[..=idx],
        None => "",
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a percentage with at most two decimals, dropping trailing zeros
pub fn format_percentage(value: f64) -> String {
    let formatted = format!("{:.2}", round2(value));
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
