// Numan Thabit 2025
use anyhow::{bail, Context, Result};
use clap::Parser;
use pdns_dashboards::{
    config::{CliArgs, Config},
    find_stale, generate_all, write_all,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = CliArgs::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_cli(&cli)?;
    let dashboards =
        generate_all(&config.datasource).context("failed to assemble dashboards")?;

    if config.check {
        let stale = find_stale(&config.output_dir, &dashboards)
            .context("failed to compare generated dashboards")?;
        if !stale.is_empty() {
            let paths: Vec<String> = stale.iter().map(|p| p.display().to_string()).collect();
            bail!(
                "{} dashboard(s) out of date, rerun pdns-dashboards: {}",
                stale.len(),
                paths.join(", ")
            );
        }
        info!(count = dashboards.len(), "all dashboards up to date");
        return Ok(());
    }

    let written = write_all(&config.output_dir, &dashboards)
        .with_context(|| format!("failed to write dashboards to {}", config.output_dir.display()))?;
    info!(count = written.len(), dir = %config.output_dir.display(), "dashboards generated");
    Ok(())
}
