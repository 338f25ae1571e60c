// Numan Thabit 2025
use std::{io, path::PathBuf};

/// Errors raised while assembling or writing a dashboard document.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("graph {title:?} has no targets")]
    EmptyTargets { title: String },
    #[error("graph {title:?} has {count} targets (max 26)")]
    TooManyTargets { title: String, count: usize },
    #[error("target index {index} has no reference letter")]
    RefIdOutOfRange { index: usize },
    #[error("template variable {name:?} has no options")]
    EmptyOptions { name: String },
    #[error("template variable {name:?} lists option {option:?} more than once")]
    DuplicateOption { name: String, option: String },
    #[error("template variable {name:?}: default {default:?} is not one of its options")]
    DefaultNotInOptions { name: String, default: String },
    #[error("no current row")]
    NoCurrentRow,
    #[error("row handle {index} does not belong to this dashboard")]
    UnknownRow { index: usize },
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
