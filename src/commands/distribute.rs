use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use flagshard::config::DistributorConfig;
use flagshard::distributor::{DispatchError, Distributor};
use flagshard::manifest::Manifest;

/// Parameters for the distribute command
pub struct DistributeParams {
    pub manifest: PathBuf,
    pub timeout_secs: u64,
    pub json: bool,
    pub allow_partial: bool,
}

/// Run one distribution round and print the report
pub async fn distribute(params: DistributeParams) -> Result<()> {
    let manifest = Manifest::load(&params.manifest)
        .with_context(|| format!("Failed to load manifest {}", params.manifest.display()))?;

    let config = DistributorConfig::default().with_timeout(Duration::from_secs(params.timeout_secs));
    let distributor = Distributor::new(&config).context("Invalid distributor settings")?;

    let round = distributor.distribute_to(&manifest.flag, &manifest.nodes);
    let report = match round.await {
        Ok(report) => report,
        Err(DispatchError::NoTargets) => {
            println!("No nodes configured, nothing to distribute.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Distribution failed"),
    };

    if params.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_table());
    }

    let failed = report.failed();
    if failed > 0 && !params.allow_partial {
        bail!("{failed} of {} nodes failed", report.results.len());
    }

    Ok(())
}
