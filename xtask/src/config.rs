//! Configuration loading from workspace metadata, the catalog and the
//! environment.

use anyhow::{Context, Result};
use rayos_harness::{Arch, Catalog, HarnessConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Harness workspace metadata from Cargo.toml.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct HarnessMetadata {
    /// Catalog path, relative to the workspace root.
    catalog: Option<PathBuf>,
    /// Guest architecture when neither `--arch` nor `RAYOS_ARCH` is given.
    default_arch: Option<String>,
}

/// Workspace configuration.
#[derive(Debug, Deserialize)]
struct WorkspaceConfig {
    workspace: WorkspaceSection,
}

#[derive(Debug, Deserialize)]
struct WorkspaceSection {
    metadata: Option<MetadataSection>,
}

#[derive(Debug, Deserialize)]
struct MetadataSection {
    #[serde(rename = "rayos-harness")]
    harness: Option<HarnessMetadata>,
}

/// Workspace-level settings for xtask commands.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub workspace_root: PathBuf,
    /// Scenario catalog file.
    pub catalog_path: PathBuf,
    /// Default guest architecture.
    pub default_arch: Arch,
}

/// Command-line overrides, the highest-precedence layer.
#[derive(Debug, Default)]
pub struct Overrides {
    pub arch: Option<Arch>,
    pub timeout_secs: Option<u64>,
    pub work_dir: Option<PathBuf>,
    pub no_build: bool,
}

impl Config {
    /// Load configuration from workspace.
    pub fn load() -> Result<Self> {
        let workspace_root = find_workspace_root()?;
        let cargo_toml = workspace_root.join("Cargo.toml");
        let content = std::fs::read_to_string(&cargo_toml)
            .with_context(|| format!("Failed to read {}", cargo_toml.display()))?;

        let config: WorkspaceConfig =
            toml::from_str(&content).context("Failed to parse Cargo.toml")?;
        let metadata = config
            .workspace
            .metadata
            .and_then(|m| m.harness)
            .unwrap_or_default();

        let default_arch = match metadata.default_arch {
            Some(arch) => arch
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid default-arch in workspace metadata: {e}"))?,
            None => Arch::default(),
        };
        let catalog_path =
            workspace_root.join(metadata.catalog.unwrap_or_else(|| PathBuf::from("harness.toml")));

        Ok(Self {
            workspace_root,
            catalog_path,
            default_arch,
        })
    }

    /// Parse the scenario catalog.
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.catalog_path)
            .with_context(|| format!("Failed to load catalog {}", self.catalog_path.display()))
    }

    /// Harness settings: defaults, then workspace metadata, then the
    /// environment, then the command line.
    pub fn harness(&self, overrides: &Overrides) -> Result<HarnessConfig> {
        let mut config = HarnessConfig {
            arch: self.default_arch,
            ..HarnessConfig::default()
        };
        config
            .apply_overrides(|key| std::env::var(key).ok())
            .context("Invalid environment override")?;

        if let Some(arch) = overrides.arch {
            config.arch = arch;
        }
        if let Some(secs) = overrides.timeout_secs {
            config.phase_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = &overrides.work_dir {
            config.work_dir.clone_from(dir);
        }
        if overrides.no_build {
            config.build = false;
        }

        config.work_dir = self.resolve(&config.work_dir);
        config.serial_log = config.serial_log.map(|p| self.resolve(&p));
        config.monitor_sock = config.monitor_sock.map(|p| self.resolve(&p));
        Ok(config)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}

/// Find the workspace root by looking for Cargo.toml with [workspace].
fn find_workspace_root() -> Result<PathBuf> {
    let mut dir = std::env::current_dir().context("Failed to get current directory")?;

    loop {
        let cargo_toml = dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = std::fs::read_to_string(&cargo_toml)?;
            if content.contains("[workspace]") {
                return Ok(dir);
            }
        }

        if !dir.pop() {
            anyhow::bail!("Could not find workspace root (no Cargo.toml with [workspace] found)");
        }
    }
}
