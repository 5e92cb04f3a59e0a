//! Review scope
//!
//! Maps the files touched by a change onto JaCoCo class names and decides
//! which classes of a report are reported on.

use regex::Regex;
use std::collections::HashSet;

use crate::coverage::ClassCoverage;
use crate::error::{Result, ReviewError};

pub const DEFAULT_SOURCE_ROOT: &str = "/java/|/kotlin/";
pub const DEFAULT_EXTENSIONS: &[&str] = &[".java", ".kt"];

/// Files touched by the change under review
#[derive(Debug, Clone, Default)]
pub struct ChangedFiles {
    pub modified: Vec<String>,
    pub added: Vec<String>,
}

impl ChangedFiles {
    pub fn new(modified: Vec<String>, added: Vec<String>) -> Self {
        Self { modified, added }
    }

    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.modified.iter().chain(self.added.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty()
    }
}

/// Which classes of a report are in scope
#[derive(Debug, Clone)]
pub struct ScopeConfig {
    /// Restrict the report to classes whose source file changed
    pub only_new_files: bool,
    /// Separates the source directory from the package path in a file path
    pub source_root: Regex,
    pub extensions: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            only_new_files: false,
            source_root: Regex::new(DEFAULT_SOURCE_ROOT).expect("default source root is a valid regex"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ScopeConfig {
    pub fn new(only_new_files: bool, source_root: &str, extensions: Vec<String>) -> Result<Self> {
        let source_root = Regex::new(source_root).map_err(|source| ReviewError::InvalidPattern {
            pattern: source_root.to_string(),
            source,
        })?;
        Ok(Self {
            only_new_files,
            source_root,
            extensions,
        })
    }

    /// Qualified class name for a changed source file, if it is one
    ///
    /// `src/java/com/example/CachedRepository.java` → `com/example/CachedRepository`
    pub fn qualified_name_for(&self, path: &str) -> Option<String> {
        let extension = self.extensions.iter().find(|ext| path.ends_with(ext.as_str()))?;
        let stem = path[..path.len() - extension.len()].replace('\\', "/");

        let root = self.source_root.find(&stem)?;
        let name = &stem[root.end()..];
        if name.is_empty() {
            return None;
        }
        Some(name.to_string())
    }
}

/// Classes to report on, in report order
pub fn filter_scope<'a>(
    classes: &'a [ClassCoverage],
    changes: &ChangedFiles,
    config: &ScopeConfig,
) -> Vec<&'a ClassCoverage> {
    if !config.only_new_files {
        return classes.iter().collect();
    }

    // Modified files are informational only; new files define the scope
    let changed: HashSet<String> = changes
        .added
        .iter()
        .filter_map(|path| config.qualified_name_for(path))
        .collect();

    let scoped: Vec<&ClassCoverage> = classes
        .iter()
        .filter(|class| is_changed(&class.qualified_name, &changed))
        .collect();

    tracing::debug!(
        modified_files = changes.modified.len(),
        added_files = changes.added.len(),
        new_classes = changed.len(),
        in_scope = scoped.len(),
        "Restricted report to new files"
    );

    scoped
}

/// Exact match, or an inner class (`Outer$Inner`) of a changed file
fn is_changed(qualified_name: &str, changed: &HashSet<String>) -> bool {
    if changed.contains(qualified_name) {
        return true;
    }
    match qualified_name.split_once('$') {
        Some((outer, _)) => changed.contains(outer),
        None => false,
    }
}
