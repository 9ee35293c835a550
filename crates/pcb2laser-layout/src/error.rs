use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("board outline needs at least 3 points (found {found})")]
    BoardOutlineTooShort { found: usize },

    #[error("board outline is invalid: {0}")]
    BoardOutlineInvalid(pcb2laser_geometry::ContourProblem),
}

/// Why a single element was left out of the job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    #[error("{what} {index}: {reason}")]
    Invalid {
        what: &'static str,
        index: usize,
        reason: String,
    },
}

impl ElementError {
    pub(crate) fn invalid(what: &'static str, index: usize, reason: impl Into<String>) -> Self {
        ElementError::Invalid {
            what,
            index,
            reason: reason.into(),
        }
    }
}
