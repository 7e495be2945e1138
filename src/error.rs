//! Error types for the MCP server.
//!
//! Maps backend, transport and configuration failures to MCP-friendly errors.

use serde::{Deserialize, Serialize};

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum McpError {
    /// Unknown tool requested.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Space or environment id neither pinned nor supplied by the caller.
    #[error("{0} is required: it is not configured for this server and was not supplied")]
    MissingScope(String),

    /// The backend reports that the referenced resource does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Backend message
        message: String,
    },

    /// A mutation was submitted against a stale version.
    #[error("version conflict: {message}")]
    VersionConflict {
        /// Backend message
        message: String,
    },

    /// Any other non-success backend response.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Backend message
        message: String,
    },

    /// Network or HTTP client failure.
    #[error("http error: {0}")]
    Http(String),

    /// Credential exchange failure.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Missing or inconsistent configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Asset files were not processed in time.
    #[error("asset processing failed: {0}")]
    AssetProcessing(String),

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        McpError::Http(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for McpError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        McpError::Auth(format!("failed to sign app token: {}", err))
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_)
            | McpError::InvalidArg { .. }
            | McpError::MissingScope(_)
            | McpError::NotFound { .. } => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;
