//! Engine and store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What single-result lookups do when more than one record matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipleMatchPolicy {
    /// Fail with `CrudError::Ambiguous`
    #[default]
    Reject,
    /// Return the match with the lowest record key
    FirstByKey,
}

/// Engine and store configuration.
#[derive(Debug, Clone)]
pub struct CrudConfig {
    /// Behaviour of `find_by_example` on multiple matches
    pub multiple_match_policy: MultipleMatchPolicy,
    /// Reject updates whose version differs from the stored version
    pub optimistic_locking: bool,
    /// Page size applied to list queries without an explicit limit (None = unbounded)
    pub default_max_results: Option<usize>,
    /// Directory relative dataset paths are resolved against
    pub dataset_dir: PathBuf,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            multiple_match_policy: MultipleMatchPolicy::Reject,
            optimistic_locking: false,
            default_max_results: None,
            dataset_dir: PathBuf::from("./datasets"),
        }
    }
}
