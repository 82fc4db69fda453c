//! Raises a desktop notification through the system bus.

use std::sync::Arc;

use async_trait::async_trait;
use commander_core::{Command, CommandDescription, CommandResult, HandlerError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::bus::SystemBus;

pub struct NotifyCommand {
    bus: Arc<dyn SystemBus>,
    timeout_ms: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyParams {
    pub title: String,
    pub message: String,
}

impl NotifyCommand {
    pub fn new(bus: Arc<dyn SystemBus>, timeout_ms: u32) -> Self {
        Self { bus, timeout_ms }
    }
}

#[async_trait]
impl Command for NotifyCommand {
    type Params = NotifyParams;

    fn identifier(&self) -> &str {
        "notify"
    }

    fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: "Notify".to_string(),
            command: "notify".to_string(),
            description: "Displays a system notification via the desktop environment".to_string(),
        }
    }

    async fn handle(&self, params: Self::Params) -> CommandResult {
        if let Err(err) = self
            .bus
            .notify(&params.title, &params.message, self.timeout_ms)
            .await
        {
            warn!("notification delivery failed: {err:#}");
            return Err(HandlerError::new("unable to create notification"));
        }

        Ok(json!({
            "title": params.title,
            "message": params.message,
            "notified_via": "system bus",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BusCall, RecordingBus};
    use commander_core::RegisteredCommand;
    use serde_json::json;

    #[tokio::test]
    async fn forwards_title_and_message_to_the_bus() {
        let bus = Arc::new(RecordingBus::new());
        let command = NotifyCommand::new(bus.clone(), 5000);

        let outcome = RegisteredCommand::invoke(
            &command,
            json!({ "title": "Disk", "message": "almost full" }),
        )
        .await
        .expect("dispatch")
        .expect("handler success");

        assert_eq!(outcome["notified_via"], "system bus");
        assert_eq!(
            bus.calls(),
            vec![BusCall::Notify {
                title: "Disk".to_string(),
                message: "almost full".to_string(),
                timeout_ms: 5000,
            }]
        );
    }

    #[tokio::test]
    async fn bus_failure_surfaces_as_handler_error() {
        let bus = Arc::new(RecordingBus::failing());
        let command = NotifyCommand::new(bus, 5000);

        let outcome = RegisteredCommand::invoke(&command, json!({ "title": "x", "message": "y" }))
            .await
            .expect("dispatch");
        let err = outcome.expect_err("handler failure");
        assert_eq!(err.to_string(), "unable to create notification");
    }
}
