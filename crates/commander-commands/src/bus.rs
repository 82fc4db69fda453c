//! Host system integration behind a single explicit seam.
//!
//! Commands never reach for ambient global connections; they are handed a
//! `SystemBus` when constructed. The shipped implementation shells out to the
//! host's `notify-send` and `systemctl` binaries.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command as ProcessCommand;
use tracing::debug;

/// One row of the host's service-unit listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStatus {
    pub unit: String,
    pub load: String,
    pub active: String,
    pub sub: String,
    pub description: String,
}

/// Capabilities commands borrow from the host.
#[async_trait]
pub trait SystemBus: Send + Sync {
    /// Raises a desktop notification with the given expiry.
    async fn notify(&self, title: &str, message: &str, timeout_ms: u32) -> Result<()>;

    /// Lists the service units known to the service manager.
    async fn list_units(&self) -> Result<Vec<UnitStatus>>;

    /// Reloads the unit if it supports it, restarts it otherwise.
    async fn reload_or_restart(&self, unit: &str) -> Result<()>;
}

/// `SystemBus` backed by the host's command-line tools.
pub struct CommandLineBus;

impl CommandLineBus {
    async fn run(program: &str, args: &[&str]) -> Result<Vec<u8>> {
        debug!(program, ?args, "invoking host binary");
        let output = ProcessCommand::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to launch {program}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} exited with {}: {}", output.status, stderr.trim());
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl SystemBus for CommandLineBus {
    async fn notify(&self, title: &str, message: &str, timeout_ms: u32) -> Result<()> {
        let expire = format!("--expire-time={timeout_ms}");
        Self::run("notify-send", &[expire.as_str(), title, message]).await?;
        Ok(())
    }

    async fn list_units(&self) -> Result<Vec<UnitStatus>> {
        let stdout = Self::run(
            "systemctl",
            &["list-units", "--type=service", "--output=json", "--no-pager"],
        )
        .await?;
        serde_json::from_slice(&stdout).context("systemctl produced an unparseable unit listing")
    }

    async fn reload_or_restart(&self, unit: &str) -> Result<()> {
        Self::run("systemctl", &["reload-or-restart", unit]).await?;
        Ok(())
    }
}
