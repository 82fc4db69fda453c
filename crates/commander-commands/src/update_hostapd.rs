//! Regenerates the hostapd configuration and bounces its unit.

use std::sync::Arc;

use async_trait::async_trait;
use commander_core::{Command, CommandDescription, CommandResult, HandlerError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::bus::SystemBus;
use crate::render::{self, RenderTarget};

pub struct UpdateHostapdCommand {
    target: RenderTarget,
    unit: String,
    bus: Arc<dyn SystemBus>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateHostapdParams {
    pub ssid: String,
    pub channel: i64,
    pub filter_mac: bool,
    pub broadcast_ssid: bool,
    pub wpa_passphrase: String,
}

impl UpdateHostapdCommand {
    pub fn new(target: RenderTarget, unit: String, bus: Arc<dyn SystemBus>) -> Self {
        Self { target, unit, bus }
    }
}

#[async_trait]
impl Command for UpdateHostapdCommand {
    type Params = UpdateHostapdParams;

    fn identifier(&self) -> &str {
        "update-hostapd"
    }

    fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: "Update HostAPD".to_string(),
            command: "update-hostapd".to_string(),
            description:
                "Updates WiFi network broadcast settings, including SSID and authentication"
                    .to_string(),
        }
    }

    async fn handle(&self, params: Self::Params) -> CommandResult {
        let values = render::parameter_values(&params)
            .map_err(|_| HandlerError::new("unable to update configuration file"))?;

        if let Err(err) = render::render_to_file(&self.target, &values).await {
            warn!("hostapd template rendering failed: {err}");
            return Err(HandlerError::new("unable to update configuration file"));
        }

        if let Err(err) = self.bus.reload_or_restart(&self.unit).await {
            warn!("hostapd restart failed: {err:#}");
            return Err(HandlerError::new("unable to restart the hostapd service"));
        }

        Ok(json!({
            "file_updated": self.target.output.display().to_string(),
            "new_values": params,
        }))
    }
}
