//! Git operations module
//!
//! Provides the modified/added file sets of a change when no review host
//! supplies them.

pub mod diff;

pub use diff::GitDiff;
