//! Stage a boot volume without launching anything.

use crate::config::Config;
use anyhow::{Context, Result};
use rayos_harness::{CancelToken, Catalog, HarnessConfig, Runner};
use std::path::Path;

/// Stage one phase of `scenario` (default: the first scenario in the
/// catalog) into `out` and print the tree digest.
pub fn stage(
    config: &Config,
    catalog: &Catalog,
    harness: HarnessConfig,
    scenario: Option<&str>,
    phase: Option<&str>,
    out: &Path,
) -> Result<()> {
    let name = match scenario {
        Some(name) => name,
        None => catalog.names().next().context("Catalog has no scenarios")?,
    };
    let scenario = catalog.scenario(name, &config.workspace_root)?;
    let spec = match phase {
        Some(phase) => scenario
            .phases
            .iter()
            .find(|p| p.phase.name == phase)
            .with_context(|| format!("Scenario `{name}` has no phase `{phase}`"))?,
        None => scenario
            .phases
            .first()
            .with_context(|| format!("Scenario `{name}` has no phases"))?,
    };

    let runner = Runner::new(harness, catalog.qemu.clone(), CancelToken::new());
    let tree = runner
        .stage(spec, out)
        .with_context(|| format!("Failed to stage {name}/{}", spec.phase.name))?;
    for file in &tree.files {
        tracing::info!(file = %file.display(), "staged");
    }
    println!("{} {}", tree.digest()?, tree.root.display());
    Ok(())
}
