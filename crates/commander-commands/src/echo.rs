//! The smallest possible command: echoes its parameters back verbatim.

use async_trait::async_trait;
use commander_core::{Command, CommandDescription, CommandResult};
use serde_json::{Map, Value};

pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    type Params = Map<String, Value>;

    fn identifier(&self) -> &str {
        "echo"
    }

    fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: "Echo".to_string(),
            command: "echo".to_string(),
            description: "Echoes back a message from the daemon".to_string(),
        }
    }

    async fn handle(&self, params: Self::Params) -> CommandResult {
        Ok(Value::Object(params))
    }
}
