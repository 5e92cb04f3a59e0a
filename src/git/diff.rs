//! Changed files of the working tree relative to a base reference

use anyhow::{Context, Result};
use git2::{Delta, DiffOptions, Repository};
use std::path::Path;

use crate::scope::ChangedFiles;

/// Git diff operations
pub struct GitDiff {
    repo: Repository,
}

impl GitDiff {
    /// Open the repository containing the given path
    pub fn new(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to find git repository at {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Files modified or added since `base` (commit, branch, or tag)
    ///
    /// Compares against the working tree, so staged, unstaged and untracked
    /// files count. Deleted files are left out.
    pub fn changed_files(&self, base: &str) -> Result<ChangedFiles> {
        let obj = self
            .repo
            .revparse_single(base)
            .with_context(|| format!("Failed to resolve reference: {}", base))?;
        let base_tree = obj.peel_to_commit()?.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(true);
        diff_opts.recurse_untracked_dirs(true);

        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&base_tree), Some(&mut diff_opts))?;

        let mut changes = ChangedFiles::default();
        for delta in diff.deltas() {
            let Some(path) = delta.new_file().path() else {
                continue;
            };
            let path = path.to_string_lossy().to_string();
            match delta.status() {
                Delta::Added | Delta::Untracked => changes.added.push(path),
                Delta::Modified | Delta::Renamed | Delta::Copied | Delta::Typechange => {
                    changes.modified.push(path)
                }
                _ => {}
            }
        }

        changes.modified.sort();
        changes.added.sort();

        tracing::debug!(
            base,
            modified = changes.modified.len(),
            added = changes.added.len(),
            "Collected changed files"
        );

        Ok(changes)
    }
}
