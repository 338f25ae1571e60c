// Numan Thabit 2025
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{dnsdist, Dashboard, DashboardError};

/// A dashboard paired with the file name it is stored under.
#[derive(Debug, Clone)]
pub struct GeneratedDashboard {
    pub file_name: &'static str,
    pub dashboard: Dashboard,
}

/// Every dashboard this crate knows how to generate.
pub fn generate_all(datasource: &str) -> Result<Vec<GeneratedDashboard>, DashboardError> {
    Ok(vec![GeneratedDashboard {
        file_name: dnsdist::FILE_NAME,
        dashboard: dnsdist::build(datasource)?,
    }])
}

/// Write each dashboard into `dir`, creating the directory if needed.
pub fn write_all(
    dir: &Path,
    dashboards: &[GeneratedDashboard],
) -> Result<Vec<PathBuf>, DashboardError> {
    fs::create_dir_all(dir).map_err(|source| DashboardError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(dashboards.len());
    for generated in dashboards {
        let path = dir.join(generated.file_name);
        generated.dashboard.save(&path)?;
        written.push(path);
    }
    Ok(written)
}

/// Paths under `dir` whose contents differ from what would be generated,
/// including files that do not exist yet.
pub fn find_stale(
    dir: &Path,
    dashboards: &[GeneratedDashboard],
) -> Result<Vec<PathBuf>, DashboardError> {
    let mut stale = Vec::new();
    for generated in dashboards {
        let path = dir.join(generated.file_name);
        let expected = generated.dashboard.to_json_string()?;
        match fs::read_to_string(&path) {
            Ok(current) if current == expected => {
                info!(path = %path.display(), "dashboard up to date");
            }
            Ok(_) => {
                warn!(path = %path.display(), "dashboard is stale");
                stale.push(path);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "dashboard is missing");
                stale.push(path);
            }
            Err(source) => return Err(DashboardError::Io { path, source }),
        }
    }
    Ok(stale)
}
