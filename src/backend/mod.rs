//! Content backend abstraction.
//!
//! The gateway talks to the CMS through [`ContentBackend`]. Representations are
//! passed through as JSON; the only thing the gateway interprets is the
//! `sys.version` stamp, which every preconditioned write requires as a
//! [`Version`] argument.

pub mod http;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::Scope;
use crate::error::{McpError, Result};

pub use http::HttpBackend;

/// Version stamp read from a backend representation's `sys.version`.
///
/// Only obtainable by reading a resource, so a write can never be issued with
/// a caller-invented version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u64);

impl Version {
    /// Read the version stamp of a representation.
    pub fn read(body: &JsonValue) -> Result<Self> {
        body.pointer("/sys/version")
            .and_then(|v| v.as_u64())
            .map(Version)
            .ok_or_else(|| McpError::Internal("backend representation has no sys.version".to_string()))
    }

    /// The raw counter.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A representation together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    /// Version at read time
    pub version: Version,
    /// Full representation
    pub body: JsonValue,
}

impl Versioned {
    /// Wrap a freshly read representation.
    pub fn from_body(body: JsonValue) -> Result<Self> {
        Ok(Self {
            version: Version::read(&body)?,
            body,
        })
    }
}

/// Resource kinds living inside an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Content type
    ContentType,
    /// Entry
    Entry,
    /// Asset
    Asset,
}

impl ResourceKind {
    /// Collection path segment.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::ContentType => "content_types",
            ResourceKind::Entry => "entries",
            ResourceKind::Asset => "assets",
        }
    }

    /// Human-readable name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::ContentType => "Content type",
            ResourceKind::Entry => "Entry",
            ResourceKind::Asset => "Asset",
        }
    }
}

/// Collection query: window plus free-form filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Page size
    pub limit: u64,
    /// Offset
    pub skip: u64,
    /// Extra query parameters (`content_type`, `order`, `query`, ...)
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Create a query for one window.
    pub fn window(limit: u64, skip: u64) -> Self {
        Self {
            limit,
            skip,
            filters: BTreeMap::new(),
        }
    }

    /// Add a filter.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// All parameters as key/value pairs.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .filter(|(k, _)| k.as_str() != "limit" && k.as_str() != "skip")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        params.push(("limit".to_string(), self.limit.to_string()));
        params.push(("skip".to_string(), self.skip.to_string()));
        params
    }
}

/// Authenticated access to the CMS.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// List spaces visible to the credentials.
    async fn list_spaces(&self) -> Result<JsonValue>;

    /// Get one space.
    async fn get_space(&self, space_id: &str) -> Result<JsonValue>;

    /// List environments of a space.
    async fn list_environments(&self, space_id: &str) -> Result<JsonValue>;

    /// Get one environment.
    async fn get_environment(&self, scope: &Scope) -> Result<Versioned>;

    /// Create the environment named by `scope.environment_id`.
    async fn create_environment(&self, scope: &Scope, name: &str) -> Result<JsonValue>;

    /// Delete an environment.
    async fn delete_environment(&self, scope: &Scope, version: Version) -> Result<()>;

    /// Query a collection. Returns the backend's `{items, total, skip, limit}` envelope.
    async fn list(&self, scope: &Scope, kind: ResourceKind, query: &ListQuery) -> Result<JsonValue>;

    /// Read one resource.
    async fn get(&self, scope: &Scope, kind: ResourceKind, id: &str) -> Result<Versioned>;

    /// Create a content type or asset with a backend-assigned id.
    async fn create(&self, scope: &Scope, kind: ResourceKind, body: JsonValue) -> Result<JsonValue>;

    /// Create an entry of the given content type.
    async fn create_entry(&self, scope: &Scope, content_type_id: &str, body: JsonValue)
        -> Result<JsonValue>;

    /// Replace a resource, failing if it is no longer at `version`.
    async fn update(
        &self,
        scope: &Scope,
        kind: ResourceKind,
        id: &str,
        body: JsonValue,
        version: Version,
    ) -> Result<JsonValue>;

    /// Delete a resource at `version`.
    async fn delete(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version) -> Result<()>;

    /// Publish a resource at `version`.
    async fn publish(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version)
        -> Result<JsonValue>;

    /// Unpublish a resource at `version`.
    async fn unpublish(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version)
        -> Result<JsonValue>;

    /// Get a content type's editor interface.
    async fn get_editor_interface(&self, scope: &Scope, content_type_id: &str) -> Result<Versioned>;

    /// Replace a content type's editor interface at `version`.
    async fn update_editor_interface(
        &self,
        scope: &Scope,
        content_type_id: &str,
        body: JsonValue,
        version: Version,
    ) -> Result<JsonValue>;

    /// Ask the backend to process an asset's file for one locale.
    async fn process_asset(&self, scope: &Scope, asset_id: &str, locale: &str, version: Version)
        -> Result<()>;
}

/// Produces an authenticated backend for one tool call.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Obtain a client. Called once per dispatched tool call.
    async fn connect(&self) -> Result<Arc<dyn ContentBackend>>;
}

/// Provider that hands out one shared backend.
pub struct SharedClient(pub Arc<dyn ContentBackend>);

#[async_trait]
impl ClientProvider for SharedClient {
    async fn connect(&self) -> Result<Arc<dyn ContentBackend>> {
        Ok(Arc::clone(&self.0))
    }
}
