//! Contentful Management API over HTTP.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::{json, Value as JsonValue};

use super::{ContentBackend, ListQuery, ResourceKind, Version, Versioned};
use crate::config::Scope;
use crate::error::{McpError, Result};

/// Media type of Management API request bodies.
pub const CMA_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

const VERSION_HEADER: &str = "X-Contentful-Version";
const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";

/// [`ContentBackend`] speaking the Management REST API.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    /// Create a backend for `base_url` (e.g. `https://api.contentful.com`).
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| McpError::Config(format!("invalid host '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| McpError::Config(format!("host '{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn env_url(&self, scope: &Scope, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["spaces", scope.space_id.as_str(), "environments", scope.environment_id.as_str()];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.token)
    }

    fn with_body(builder: RequestBuilder, body: &JsonValue) -> Result<RequestBuilder> {
        Ok(builder
            .header(CONTENT_TYPE, CMA_CONTENT_TYPE)
            .body(serde_json::to_vec(body)?))
    }

    async fn json(&self, builder: RequestBuilder) -> Result<JsonValue> {
        let response = check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn versioned(&self, builder: RequestBuilder) -> Result<Versioned> {
        Versioned::from_body(self.json(builder).await?)
    }

    async fn empty(&self, builder: RequestBuilder) -> Result<()> {
        check(builder.send().await?).await?;
        Ok(())
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<JsonValue>(&text)
        .ok()
        .and_then(|body| {
            let id = body.pointer("/sys/id").and_then(|v| v.as_str()).map(str::to_string);
            let message = body.get("message").and_then(|v| v.as_str()).map(str::to_string);
            match (id, message) {
                (Some(id), Some(message)) => Some(format!("{}: {}", id, message)),
                (None, Some(message)) => Some(message),
                (Some(id), None) => Some(id),
                (None, None) => None,
            }
        })
        .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text });

    Err(match status {
        StatusCode::NOT_FOUND => McpError::NotFound { message },
        StatusCode::CONFLICT => McpError::VersionConflict { message },
        _ => McpError::Backend {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl ContentBackend for HttpBackend {
    async fn list_spaces(&self) -> Result<JsonValue> {
        let url = self.url(&["spaces"])?;
        self.json(self.request(Method::GET, url)).await
    }

    async fn get_space(&self, space_id: &str) -> Result<JsonValue> {
        let url = self.url(&["spaces", space_id])?;
        self.json(self.request(Method::GET, url)).await
    }

    async fn list_environments(&self, space_id: &str) -> Result<JsonValue> {
        let url = self.url(&["spaces", space_id, "environments"])?;
        self.json(self.request(Method::GET, url)).await
    }

    async fn get_environment(&self, scope: &Scope) -> Result<Versioned> {
        let url = self.env_url(scope, &[])?;
        self.versioned(self.request(Method::GET, url)).await
    }

    async fn create_environment(&self, scope: &Scope, name: &str) -> Result<JsonValue> {
        let url = self.env_url(scope, &[])?;
        let builder = Self::with_body(self.request(Method::PUT, url), &json!({ "name": name }))?;
        self.json(builder).await
    }

    async fn delete_environment(&self, scope: &Scope, version: Version) -> Result<()> {
        let url = self.env_url(scope, &[])?;
        let builder = self
            .request(Method::DELETE, url)
            .header(VERSION_HEADER, version.get().to_string());
        self.empty(builder).await
    }

    async fn list(&self, scope: &Scope, kind: ResourceKind, query: &ListQuery) -> Result<JsonValue> {
        let url = self.env_url(scope, &[kind.collection()])?;
        let builder = self.request(Method::GET, url).query(&query.params());
        self.json(builder).await
    }

    async fn get(&self, scope: &Scope, kind: ResourceKind, id: &str) -> Result<Versioned> {
        let url = self.env_url(scope, &[kind.collection(), id])?;
        self.versioned(self.request(Method::GET, url)).await
    }

    async fn create(&self, scope: &Scope, kind: ResourceKind, body: JsonValue) -> Result<JsonValue> {
        let url = self.env_url(scope, &[kind.collection()])?;
        let builder = Self::with_body(self.request(Method::POST, url), &body)?;
        self.json(builder).await
    }

    async fn create_entry(
        &self,
        scope: &Scope,
        content_type_id: &str,
        body: JsonValue,
    ) -> Result<JsonValue> {
        let url = self.env_url(scope, &[ResourceKind::Entry.collection()])?;
        let builder = Self::with_body(
            self.request(Method::POST, url)
                .header(CONTENT_TYPE_HEADER, content_type_id),
            &body,
        )?;
        self.json(builder).await
    }

    async fn update(
        &self,
        scope: &Scope,
        kind: ResourceKind,
        id: &str,
        body: JsonValue,
        version: Version,
    ) -> Result<JsonValue> {
        let url = self.env_url(scope, &[kind.collection(), id])?;
        let builder = Self::with_body(
            self.request(Method::PUT, url).header(VERSION_HEADER, version.get().to_string()),
            &body,
        )?;
        self.json(builder).await
    }

    async fn delete(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version) -> Result<()> {
        let url = self.env_url(scope, &[kind.collection(), id])?;
        let builder = self
            .request(Method::DELETE, url)
            .header(VERSION_HEADER, version.get().to_string());
        self.empty(builder).await
    }

    async fn publish(
        &self,
        scope: &Scope,
        kind: ResourceKind,
        id: &str,
        version: Version,
    ) -> Result<JsonValue> {
        let url = self.env_url(scope, &[kind.collection(), id, "published"])?;
        let builder = self
            .request(Method::PUT, url)
            .header(VERSION_HEADER, version.get().to_string());
        self.json(builder).await
    }

    async fn unpublish(
        &self,
        scope: &Scope,
        kind: ResourceKind,
        id: &str,
        version: Version,
    ) -> Result<JsonValue> {
        let url = self.env_url(scope, &[kind.collection(), id, "published"])?;
        let builder = self
            .request(Method::DELETE, url)
            .header(VERSION_HEADER, version.get().to_string());
        self.json(builder).await
    }

    async fn get_editor_interface(&self, scope: &Scope, content_type_id: &str) -> Result<Versioned> {
        let url = self.env_url(scope, &["content_types", content_type_id, "editor_interface"])?;
        self.versioned(self.request(Method::GET, url)).await
    }

    async fn update_editor_interface(
        &self,
        scope: &Scope,
        content_type_id: &str,
        body: JsonValue,
        version: Version,
    ) -> Result<JsonValue> {
        let url = self.env_url(scope, &["content_types", content_type_id, "editor_interface"])?;
        let builder = Self::with_body(
            self.request(Method::PUT, url).header(VERSION_HEADER, version.get().to_string()),
            &body,
        )?;
        self.json(builder).await
    }

    async fn process_asset(
        &self,
        scope: &Scope,
        asset_id: &str,
        locale: &str,
        version: Version,
    ) -> Result<()> {
        let url = self.env_url(scope, &["assets", asset_id, "files", locale, "process"])?;
        let builder = self
            .request(Method::PUT, url)
            .header(VERSION_HEADER, version.get().to_string());
        self.empty(builder).await
    }
}
