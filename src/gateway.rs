//! Tool dispatch boundary.
//!
//! [`Gateway::dispatch`] takes a tool name and its arguments and always
//! produces a [`CallResult`]. Failures are reported as `isError` results and
//! never escape to the transport.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::backend::ClientProvider;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::richtext::{MarkdownConverter, RichTextConverter};
use crate::tools::{CallResult, ToolContext, ToolDef, ToolRegistry};

/// Routes tool calls to the resource handlers.
pub struct Gateway {
    config: GatewayConfig,
    registry: ToolRegistry,
    clients: Arc<dyn ClientProvider>,
    converter: Arc<dyn RichTextConverter>,
}

impl Gateway {
    /// Create a gateway. The advertised tool set is computed here, once.
    pub fn new(config: GatewayConfig, clients: Arc<dyn ClientProvider>) -> Self {
        let registry = ToolRegistry::new(&config);
        Self {
            config,
            registry,
            clients,
            converter: Arc::new(MarkdownConverter),
        }
    }

    /// Replace the markdown converter used for rich-text fields.
    pub fn with_converter(mut self, converter: Arc<dyn RichTextConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Advertised tools, in order.
    pub fn tools(&self) -> &[ToolDef] {
        self.registry.tools()
    }

    /// Configuration the gateway was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Execute one tool call.
    pub async fn dispatch(&self, name: &str, args: Map<String, JsonValue>) -> CallResult {
        tracing::debug!(tool = %name, "dispatching tool call");

        match self.try_dispatch(name, args).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(tool = %name, error = %err, "tool call failed");
                CallResult::error(&err)
            }
        }
    }

    async fn try_dispatch(&self, name: &str, args: Map<String, JsonValue>) -> Result<CallResult> {
        let tool = self.registry.lookup(name)?;
        let backend = self.clients.connect().await?;
        let ctx = ToolContext {
            backend: backend.as_ref(),
            config: &self.config,
            converter: self.converter.as_ref(),
        };
        self.registry.dispatch(&ctx, tool, args).await
    }
}
