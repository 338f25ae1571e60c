// Numan Thabit 2025
//! pdns-dashboards: builds Grafana dashboard documents for PowerDNS
//! statistics and writes them as sorted, diff-friendly JSON.

/// Dashboard builder and serialization.
pub mod dashboard;
/// The dnsdist dashboard definition.
pub mod dnsdist;
/// Error type shared by the builder and the writers.
pub mod error;
/// Small text helpers used while assembling queries.
pub mod format;
/// Serializable document fragments.
pub mod model;
/// Writing and freshness checking of generated files.
pub mod output;
/// Template variable builders.
pub mod templating;
/// Command-line and TOML configuration.
pub mod config;

pub use dashboard::{Dashboard, Document, Graph, RowHandle, RowOptions};
pub use error::DashboardError;
pub use format::{compact, ref_id};
pub use output::{find_stale, generate_all, write_all, GeneratedDashboard};
pub use templating::{ChoiceVar, QueryVar};
