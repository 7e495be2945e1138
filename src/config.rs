//! Process-wide configuration.
//!
//! Everything here is built once at startup and passed explicitly to the
//! schema builder and the handlers.

use std::time::Duration;

use serde_json::{Map, Value as JsonValue};

use crate::args::get_optional_string;
use crate::error::{McpError, Result};

/// Default Contentful Management API host.
pub const DEFAULT_HOST: &str = "api.contentful.com";

/// Default locale used when wrapping single-locale tool arguments.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Space and environment ids fixed for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedScope {
    /// Pinned space id
    pub space_id: Option<String>,
    /// Pinned environment id
    pub environment_id: Option<String>,
}

impl PinnedScope {
    /// Create a pinned scope from optional ids. Empty strings count as absent.
    pub fn new(space_id: Option<String>, environment_id: Option<String>) -> Self {
        Self {
            space_id: space_id.filter(|s| !s.is_empty()),
            environment_id: environment_id.filter(|s| !s.is_empty()),
        }
    }

    /// True when at least one of space or environment is pinned.
    ///
    /// Resource tool schemas drop `spaceId`/`environmentId` in this case.
    pub fn any(&self) -> bool {
        self.space_id.is_some() || self.environment_id.is_some()
    }

    /// True when both space and environment are pinned (single-tenant mode).
    pub fn both(&self) -> bool {
        self.space_id.is_some() && self.environment_id.is_some()
    }

    /// Effective space id: pinned value, else the caller's `spaceId`.
    pub fn space(&self, args: &Map<String, JsonValue>) -> Result<String> {
        resolve(&self.space_id, args, "spaceId")
    }

    /// Effective environment id: pinned value, else the caller's `environmentId`.
    pub fn environment(&self, args: &Map<String, JsonValue>) -> Result<String> {
        resolve(&self.environment_id, args, "environmentId")
    }

    /// Resolve both ids into a [`Scope`].
    pub fn resolve(&self, args: &Map<String, JsonValue>) -> Result<Scope> {
        Ok(Scope {
            space_id: self.space(args)?,
            environment_id: self.environment(args)?,
        })
    }
}

fn resolve(pinned: &Option<String>, args: &Map<String, JsonValue>, field: &str) -> Result<String> {
    if let Some(id) = pinned {
        return Ok(id.clone());
    }
    match get_optional_string(args, field) {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(McpError::MissingScope(field.to_string())),
    }
}

/// Effective space/environment pair for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Space id
    pub space_id: String,
    /// Environment id
    pub environment_id: String,
}

impl Scope {
    /// Create a scope from explicit ids.
    pub fn new(space_id: impl Into<String>, environment_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            environment_id: environment_id.into(),
        }
    }
}

/// How long `upload_asset` waits for backend-side file processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingPolicy {
    /// Number of re-reads before giving up
    pub checks: u32,
    /// Delay before each re-read
    pub wait: Duration,
}

impl Default for ProcessingPolicy {
    fn default() -> Self {
        Self {
            checks: 5,
            wait: Duration::from_millis(500),
        }
    }
}

/// Gateway configuration shared by the schema builder and the handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Pinned space/environment
    pub pinned: PinnedScope,
    /// Locale used for `title`/`description`/`file` on assets
    pub locale: String,
    /// Asset processing wait policy
    pub processing: ProcessingPolicy,
}

impl GatewayConfig {
    /// Create a configuration with the given pinned scope and defaults elsewhere.
    pub fn new(pinned: PinnedScope) -> Self {
        Self {
            pinned,
            locale: DEFAULT_LOCALE.to_string(),
            processing: ProcessingPolicy::default(),
        }
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the asset processing policy.
    pub fn with_processing(mut self, processing: ProcessingPolicy) -> Self {
        self.processing = processing;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(PinnedScope::default())
    }
}

/// How the server authenticates against the Management API.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Static management access token.
    Token(String),
    /// App installation: a signed one-time token is exchanged for an access token.
    AppInstallation {
        /// RSA private key of the app, PEM or bare base64
        private_key: String,
        /// App definition id
        app_id: String,
        /// Space the app is installed in
        space_id: String,
        /// Environment the app is installed in
        environment_id: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Credentials::Token(..)"),
            Credentials::AppInstallation { app_id, space_id, environment_id, .. } => f
                .debug_struct("Credentials::AppInstallation")
                .field("app_id", app_id)
                .field("space_id", space_id)
                .field("environment_id", environment_id)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Validate the credential inputs.
    ///
    /// A management token takes precedence. Without one, a private key plus
    /// app id, space id and environment id are required.
    pub fn resolve(
        token: Option<String>,
        private_key: Option<String>,
        app_id: Option<String>,
        scope: &PinnedScope,
    ) -> Result<Self> {
        let token = token.filter(|t| !t.is_empty());
        let private_key = private_key.filter(|k| !k.is_empty());

        if let Some(token) = token {
            return Ok(Credentials::Token(token));
        }

        let private_key = private_key.ok_or_else(|| {
            McpError::Config(
                "either CONTENTFUL_MANAGEMENT_ACCESS_TOKEN or PRIVATE_KEY must be set".to_string(),
            )
        })?;

        let app_id = app_id
            .filter(|a| !a.is_empty())
            .ok_or_else(|| McpError::Config("APP_ID is required when using PRIVATE_KEY".to_string()))?;
        let space_id = scope
            .space_id
            .clone()
            .ok_or_else(|| McpError::Config("SPACE_ID is required when using PRIVATE_KEY".to_string()))?;
        let environment_id = scope.environment_id.clone().ok_or_else(|| {
            McpError::Config("ENVIRONMENT_ID is required when using PRIVATE_KEY".to_string())
        })?;

        Ok(Credentials::AppInstallation {
            private_key,
            app_id,
            space_id,
            environment_id,
        })
    }
}

/// Normalise a host argument into a base URL.
///
/// Bare hosts get `https://`; explicit `http://` or `https://` URLs are kept.
pub fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
