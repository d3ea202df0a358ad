//! Boot artifact build functionality.

use crate::cargo::CargoCommand;
use crate::config::Config;
use crate::verbose::Timer;
use anyhow::Result;
use rayos_harness::Catalog;

/// Run every `[[build]]` step of the catalog, in order.
pub fn build(config: &Config, catalog: &Catalog) -> Result<()> {
    if catalog.build.is_empty() {
        tracing::info!("catalog has no build steps");
        return Ok(());
    }

    let _t = Timer::start("build");
    for step in &catalog.build {
        let target = step.target.as_deref().unwrap_or("host");
        tracing::info!(package = %step.package, target, "building");
        CargoCommand::from(step).run(config)?;
    }

    for (name, artifact) in &catalog.artifacts {
        let path = config.workspace_root.join(&artifact.path);
        if path.is_file() {
            tracing::debug!(artifact = %name, path = %path.display(), "artifact present");
        } else if artifact.required {
            tracing::warn!(artifact = %name, path = %path.display(), "required artifact missing after build");
        }
    }
    Ok(())
}
