//! # contentful-mcp
//!
//! MCP (Model Context Protocol) server for the Contentful Management API.
//!
//! This crate exposes spaces, environments, content types, entries and assets
//! as tools for AI agents. It implements the MCP protocol over stdin/stdout
//! using JSON-RPC 2.0.
//!
//! ## Features
//!
//! - **27 tools** covering CRUD and publish/unpublish for every resource kind
//! - **Pinned scope**: a configured space/environment overrides caller input
//!   and is dropped from the advertised schemas
//! - **Bounded pages**: list results are windowed with a continuation offset
//! - **Rich text**: markdown supplied for `RichText` fields becomes a document
//! - **Prompts**: a small catalogue of canned API-help prompts
//!
//! ## Usage
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "contentful": {
//!       "command": "/path/to/contentful-mcp",
//!       "env": { "CONTENTFUL_MANAGEMENT_ACCESS_TOKEN": "<token>" }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use contentful_mcp::{Credentials, Gateway, GatewayConfig, HttpClientProvider, McpServer, PinnedScope};
//!
//! # async fn run() -> contentful_mcp::Result<()> {
//! let pinned = PinnedScope::default();
//! let credentials = Credentials::resolve(Some("token".into()), None, None, &pinned)?;
//! let clients = Arc::new(HttpClientProvider::new("api.contentful.com", credentials));
//! let gateway = Gateway::new(GatewayConfig::new(pinned), clients);
//! McpServer::new(gateway).run().await
//! # }
//! ```

#![warn(missing_docs)]

pub mod args;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prompts;
pub mod richtext;
pub mod server;
pub mod summarize;
pub mod tools;

pub use auth::HttpClientProvider;
pub use backend::{ClientProvider, ContentBackend, HttpBackend, SharedClient};
pub use config::{Credentials, GatewayConfig, PinnedScope, ProcessingPolicy, Scope};
pub use error::{McpError, Result};
pub use gateway::Gateway;
pub use richtext::{MarkdownConverter, RichTextConverter};
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use tools::{CallResult, Tool, ToolDef, ToolRegistry};
