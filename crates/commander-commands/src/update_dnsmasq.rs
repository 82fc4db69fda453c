//! Regenerates the dnsmasq configuration and bounces its unit.

use std::sync::Arc;

use async_trait::async_trait;
use commander_core::{Command, CommandDescription, CommandResult, HandlerError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::bus::SystemBus;
use crate::render::{self, RenderTarget};

pub struct UpdateDnsmasqCommand {
    target: RenderTarget,
    unit: String,
    bus: Arc<dyn SystemBus>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateDnsmasqParams {
    pub dhcp_begin: String,
    pub dhcp_end: String,
    pub dhcp_lease: String,
    pub dhcp_servers: Vec<String>,
}

impl UpdateDnsmasqCommand {
    pub fn new(target: RenderTarget, unit: String, bus: Arc<dyn SystemBus>) -> Self {
        Self { target, unit, bus }
    }
}

#[async_trait]
impl Command for UpdateDnsmasqCommand {
    type Params = UpdateDnsmasqParams;

    fn identifier(&self) -> &str {
        "update-dnsmasq"
    }

    fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: "Update DNSMasq".to_string(),
            command: "update-dnsmasq".to_string(),
            description: "Updates DHCP and DNS settings, and restarts the dnsmasq service"
                .to_string(),
        }
    }

    async fn handle(&self, params: Self::Params) -> CommandResult {
        let values = render::parameter_values(&params)
            .map_err(|_| HandlerError::new("unable to update configuration file"))?;

        if let Err(err) = render::render_to_file(&self.target, &values).await {
            warn!("dnsmasq template rendering failed: {err}");
            return Err(HandlerError::new("unable to update configuration file"));
        }

        if let Err(err) = self.bus.reload_or_restart(&self.unit).await {
            warn!("dnsmasq restart failed: {err:#}");
            return Err(HandlerError::new("unable to restart the dnsmasq service"));
        }

        Ok(json!({
            "file_updated": self.target.output.display().to_string(),
            "new_values": params,
        }))
    }
}
