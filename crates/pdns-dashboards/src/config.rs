// Numan Thabit 2025
use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;

use crate::model::DEFAULT_DATASOURCE;

const DEFAULT_CONFIG_PATH: &str = "pdns-dashboards.toml";

#[derive(Parser, Debug, Clone, Default)]
#[command(
    author,
    version,
    about = "Generate Grafana dashboards for PowerDNS statistics",
    rename_all = "kebab-case"
)]
pub struct CliArgs {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH", env = "PDNS_DASHBOARDS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory the dashboard files are written to.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Datasource referenced by every panel, variable and annotation.
    #[arg(long)]
    pub datasource: Option<String>,

    /// Compare the files on disk with freshly generated output instead of writing.
    #[arg(long, default_value_t = false)]
    pub check: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub output_dir: PathBuf,
    pub datasource: String,
    pub check: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    output_dir: Option<PathBuf>,
    datasource: Option<String>,
}

impl Config {
    pub fn from_cli(cli: &CliArgs) -> Result<Self> {
        let file_cfg =
            load_file_config(cli.config.as_deref()).context("failed to load config file")?;
        let config = merge(cli, file_cfg);
        config.validate()?;
        config.log_summary();
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.datasource.trim().is_empty() {
            bail!("datasource must not be empty");
        }
        if self.output_dir.as_os_str().is_empty() {
            bail!("output_dir must not be empty");
        }
        Ok(())
    }

    fn log_summary(&self) {
        info!(
            output_dir = %self.output_dir.display(),
            datasource = %self.datasource,
            check = self.check,
            config = ?self.config_path,
            "pdns-dashboards configuration"
        );
    }
}

/// Directory next to this crate's manifest, where the generated files are
/// checked in.
///
/// The path is fixed at compile time; a binary run from another checkout or
/// after installation still points at the source tree it was built from, so
/// pass `--output-dir` there.
pub fn default_output_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("dashboards")
}

fn merge(cli: &CliArgs, file_cfg: Option<(PathBuf, FileConfig)>) -> Config {
    let (cfg_path, file_cfg) = file_cfg.unzip();
    let file_cfg = file_cfg.unwrap_or_default();

    let output_dir = pick(
        cli.output_dir.clone(),
        file_cfg.output_dir,
        default_output_dir(),
    );
    let datasource = pick(
        cli.datasource.clone(),
        file_cfg.datasource,
        DEFAULT_DATASOURCE.to_string(),
    );

    Config {
        output_dir,
        datasource,
        check: cli.check,
        config_path: cfg_path,
    }
}

fn pick<T>(cli: Option<T>, file: Option<T>, default: T) -> T {
    cli.or(file).unwrap_or(default)
}

fn load_file_config(path: Option<&Path>) -> Result<Option<(PathBuf, FileConfig)>> {
    if let Some(path) = path {
        return read_config(path).map(|cfg| Some((path.to_path_buf(), cfg)));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        return read_config(&default_path).map(|cfg| Some((default_path, cfg)));
    }

    Ok(None)
}

fn read_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        bail!("config file {} does not exist", path.display());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg: FileConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(cfg)
}
