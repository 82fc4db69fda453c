//! The request lifecycle: decode envelope, resolve command, decode
//! parameters, invoke, tally.

use commander_core::{CommandResult, DispatchError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::Registry;
use crate::status::StatusTracker;

/// Top-level body of a dispatch request. `parameters` is opaque here; the
/// resolved command decodes it into its own container.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub command: String,
    #[serde(default)]
    pub parameters: Value,
}

/// Runs one raw request body through the full dispatch sequence.
///
/// Exactly one counter is bumped per call: a success for any request that
/// reached the handler (the handler's own in-band failure is still a
/// dispatch success), a failure when the dispatcher could not get that far.
pub async fn dispatch(
    registry: &Registry,
    status: &StatusTracker,
    body: &[u8],
) -> Result<CommandResult, DispatchError> {
    let result = run(registry, body).await;
    match &result {
        Ok(_) => status.record_success(),
        Err(err) => {
            warn!("dispatch rejected: {err}");
            status.record_failure();
        }
    }
    result
}

async fn run(registry: &Registry, body: &[u8]) -> Result<CommandResult, DispatchError> {
    let envelope: RequestEnvelope =
        serde_json::from_slice(body).map_err(DispatchError::EnvelopeDecode)?;

    let command = registry
        .lookup(&envelope.command)
        .ok_or_else(|| DispatchError::UnknownCommand(envelope.command.clone()))?;

    debug!(command = %envelope.command, "dispatching");
    command.invoke(envelope.parameters).await
}
