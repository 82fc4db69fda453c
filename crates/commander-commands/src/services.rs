//! Lists the host's service units.

use std::sync::Arc;

use async_trait::async_trait;
use commander_core::{Command, CommandDescription, CommandResult, HandlerError};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::bus::SystemBus;

pub struct ServicesCommand {
    bus: Arc<dyn SystemBus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServicesParams {}

impl ServicesCommand {
    pub fn new(bus: Arc<dyn SystemBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Command for ServicesCommand {
    type Params = ServicesParams;

    fn identifier(&self) -> &str {
        "services"
    }

    fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: "Services".to_string(),
            command: "services".to_string(),
            description: "Lists the service units known to the service manager".to_string(),
        }
    }

    async fn handle(&self, _params: Self::Params) -> CommandResult {
        let units = match self.bus.list_units().await {
            Ok(units) => units,
            Err(err) => {
                warn!("unit listing failed: {err:#}");
                return Err(HandlerError::new("unable to query the service manager"));
            }
        };

        Ok(json!({
            "count": units.len(),
            "services": units,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{unit, BusCall, RecordingBus};
    use commander_core::RegisteredCommand;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn reports_units_from_the_bus() {
        let bus = Arc::new(RecordingBus::with_units(vec![
            unit("dnsmasq.service"),
            unit("hostapd.service"),
        ]));
        let command = ServicesCommand::new(bus.clone());

        let outcome = RegisteredCommand::invoke(&command, json!({}))
            .await
            .expect("dispatch")
            .expect("handler success");

        assert_eq!(outcome["count"], 2);
        assert_eq!(outcome["services"][0]["unit"], "dnsmasq.service");
        assert_eq!(bus.calls(), vec![BusCall::ListUnits]);
    }

    #[tokio::test]
    async fn parameterless_envelope_is_accepted() {
        let bus = Arc::new(RecordingBus::new());
        let command = ServicesCommand::new(bus);

        let outcome = RegisteredCommand::invoke(&command, Value::Null)
            .await
            .expect("dispatch")
            .expect("handler success");
        assert_eq!(outcome["count"], 0);
    }

    #[tokio::test]
    async fn bus_failure_surfaces_as_handler_error() {
        let bus = Arc::new(RecordingBus::failing());
        let command = ServicesCommand::new(bus);

        let err = RegisteredCommand::invoke(&command, json!({}))
            .await
            .expect("dispatch")
            .expect_err("handler failure");
        assert_eq!(err.to_string(), "unable to query the service manager");
    }
}
