//! Common cargo invocation for the boot artifacts.

use crate::config::Config;
use anyhow::{Context, Result};
use rayos_harness::scenario::BuildStep;
use std::path::PathBuf;
use xshell::{Shell, cmd};

/// One `cargo build` of a boot artifact.
pub struct CargoCommand {
    /// Package to operate on (-p flag).
    pub package: String,
    /// Target triple, e.g. "x86_64-unknown-uefi". If `None`, the host.
    pub target: Option<String>,
    /// Manifest of the workspace containing the package.
    pub manifest_path: Option<PathBuf>,
    /// Whether to pass --release.
    pub release: bool,
    /// Cargo features.
    pub features: Vec<String>,
}

impl From<&BuildStep> for CargoCommand {
    fn from(step: &BuildStep) -> Self {
        Self {
            package: step.package.clone(),
            target: step.target.clone(),
            manifest_path: step.manifest_path.clone(),
            release: step.release,
            features: step.features.clone(),
        }
    }
}

impl CargoCommand {
    /// The argument vector after `cargo`.
    pub fn args(&self, config: &Config) -> Result<Vec<String>> {
        let mut args: Vec<String> = vec!["build".into(), "-p".into(), self.package.clone()];

        if let Some(ref manifest) = self.manifest_path {
            let manifest = config.workspace_root.join(manifest);
            let manifest = manifest
                .to_str()
                .context("Manifest path is not valid UTF-8")?;
            args.push("--manifest-path".into());
            args.push(manifest.to_string());
        }

        if let Some(ref target) = self.target {
            args.push("--target".into());
            args.push(target.clone());
        }

        if !self.features.is_empty() {
            args.push("--features".into());
            args.push(self.features.join(","));
        }

        if self.release {
            args.push("--release".into());
        }

        Ok(args)
    }

    /// Execute the build.
    pub fn run(&self, config: &Config) -> Result<()> {
        let sh = Shell::new()?;
        sh.change_dir(&config.workspace_root);

        let args = self.args(config)?;
        tracing::debug!(args = %args.join(" "), "running cargo");
        cmd!(sh, "cargo {args...}")
            .run()
            .with_context(|| format!("cargo build -p {} failed", self.package))?;

        Ok(())
    }
}
