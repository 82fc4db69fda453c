//! Renders a configured template with values from the request.

use async_trait::async_trait;
use commander_core::{Command, CommandDescription, CommandResult, HandlerError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::render::{self, RenderTarget};

pub struct TemplateCommand {
    target: RenderTarget,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParams {
    pub connections: i64,
    pub webroot: String,
}

impl TemplateCommand {
    pub fn new(target: RenderTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl Command for TemplateCommand {
    type Params = TemplateParams;

    fn identifier(&self) -> &str {
        "template"
    }

    fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: "Template".to_string(),
            command: "template".to_string(),
            description: "Populates the configured template with request values".to_string(),
        }
    }

    async fn handle(&self, params: Self::Params) -> CommandResult {
        let values = render::parameter_values(&params)
            .map_err(|_| HandlerError::new("unable to update configuration file"))?;

        if let Err(err) = render::render_to_file(&self.target, &values).await {
            warn!("template rendering failed: {err}");
            return Err(HandlerError::new("unable to update configuration file"));
        }

        Ok(json!({
            "file_updated": self.target.output.display().to_string(),
            "new_values": params,
        }))
    }
}
