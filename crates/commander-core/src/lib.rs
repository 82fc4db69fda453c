use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Outcome of a command handler. A failed handler is ordinary data that ends
/// up in the response body, not a transport-level fault.
pub type CommandResult = Result<Value, HandlerError>;

/// Command-level failure, reported in-band inside the dispatch response.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures the dispatcher recovers at its boundary and turns into structured
/// error responses. None of these may take the serving process down.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed request envelope: {0}")]
    EnvelopeDecode(serde_json::Error),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid parameters for '{command}': {source}")]
    ParameterDecode {
        command: String,
        source: serde_json::Error,
    },
}

/// Self-description of a command, served by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescription {
    pub name: String,
    pub command: String,
    pub description: String,
}

/// A pluggable unit of behaviour invoked through the dispatch API.
///
/// The parameter container is statically typed per command;
/// `Params::default()` is the fresh, zero-valued container that an empty or
/// absent `parameters` field decodes into.
#[async_trait]
pub trait Command: Send + Sync + 'static {
    type Params: DeserializeOwned + Default + Send;

    /// Stable routing key, unique within a registry.
    fn identifier(&self) -> &str;

    fn describe(&self) -> CommandDescription;

    /// One-time setup, run before the command becomes reachable. An error
    /// here is fatal to startup.
    async fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle(&self, params: Self::Params) -> CommandResult;
}

/// Object-safe face of [`Command`] stored in the registry. The registry table
/// is homogeneous while each entry keeps its own parameter type internally.
#[async_trait]
pub trait RegisteredCommand: Send + Sync {
    fn identifier(&self) -> &str;

    fn describe(&self) -> CommandDescription;

    /// Decodes the opaque envelope parameters and runs the handler.
    async fn invoke(&self, parameters: Value) -> Result<CommandResult, DispatchError>;
}

#[async_trait]
impl<C: Command> RegisteredCommand for C {
    fn identifier(&self) -> &str {
        Command::identifier(self)
    }

    fn describe(&self) -> CommandDescription {
        Command::describe(self)
    }

    async fn invoke(&self, parameters: Value) -> Result<CommandResult, DispatchError> {
        let params = decode_parameters::<C::Params>(Command::identifier(self), parameters)?;
        Ok(self.handle(params).await)
    }
}

/// `Null` (an absent `parameters` field) yields the zero-valued container;
/// anything else must match the command's expected shape.
pub fn decode_parameters<P>(command: &str, parameters: Value) -> Result<P, DispatchError>
where
    P: DeserializeOwned + Default,
{
    match parameters {
        Value::Null => Ok(P::default()),
        other => serde_json::from_value(other).map_err(|source| DispatchError::ParameterDecode {
            command: command.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct GreetParams {
        name: String,
        shout: bool,
    }

    struct GreetCommand;

    #[async_trait]
    impl Command for GreetCommand {
        type Params = GreetParams;

        fn identifier(&self) -> &str {
            "greet"
        }

        fn describe(&self) -> CommandDescription {
            CommandDescription {
                name: "Greet".to_string(),
                command: "greet".to_string(),
                description: "Greets the caller".to_string(),
            }
        }

        async fn handle(&self, params: Self::Params) -> CommandResult {
            if params.name.is_empty() {
                return Err(HandlerError::new("nobody to greet"));
            }
            let greeting = if params.shout {
                format!("HELLO {}", params.name.to_uppercase())
            } else {
                format!("hello {}", params.name)
            };
            Ok(json!({ "greeting": greeting }))
        }
    }

    #[test]
    fn null_parameters_decode_to_default_container() {
        let params: GreetParams = decode_parameters("greet", Value::Null).expect("decode");
        assert_eq!(params, GreetParams::default());
    }

    #[test]
    fn empty_object_decodes_to_default_container() {
        let params: GreetParams = decode_parameters("greet", json!({})).expect("decode");
        assert_eq!(params, GreetParams::default());
    }

    #[test]
    fn mismatched_parameters_are_a_parameter_decode_error() {
        let err = decode_parameters::<GreetParams>("greet", json!({ "name": 42 }))
            .expect_err("decode must fail");
        match err {
            DispatchError::ParameterDecode { command, .. } => assert_eq!(command, "greet"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn erased_invoke_decodes_and_runs_the_handler() {
        let command: &dyn RegisteredCommand = &GreetCommand;
        let outcome = command
            .invoke(json!({ "name": "world", "shout": true }))
            .await
            .expect("dispatch")
            .expect("handler success");
        assert_eq!(outcome, json!({ "greeting": "HELLO WORLD" }));
    }

    #[tokio::test]
    async fn handler_failure_is_data_not_a_dispatch_error() {
        let command: &dyn RegisteredCommand = &GreetCommand;
        let outcome = command.invoke(Value::Null).await.expect("dispatch");
        let err = outcome.expect_err("handler failure");
        assert_eq!(err.to_string(), "nobody to greet");
    }

    #[test]
    fn description_round_trips_through_json() {
        let description = Command::describe(&GreetCommand);
        let encoded = serde_json::to_string(&description).expect("encode");
        let decoded: CommandDescription = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, description);
    }
}
