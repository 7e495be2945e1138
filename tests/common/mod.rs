//! Shared test fixtures: an in-memory backend and gateway helpers.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};

use contentful_mcp::backend::{ListQuery, ResourceKind, Version, Versioned};
use contentful_mcp::{
    CallResult, ContentBackend, Gateway, GatewayConfig, McpError, PinnedScope, ProcessingPolicy,
    Result, Scope, SharedClient,
};

type ResourceKey = (String, String, &'static str, String);

#[derive(Default)]
struct Store {
    spaces: BTreeMap<String, JsonValue>,
    environments: BTreeMap<(String, String), JsonValue>,
    resources: BTreeMap<ResourceKey, JsonValue>,
    editor_interfaces: BTreeMap<(String, String, String), JsonValue>,
    next_id: u64,
    process_calls: u64,
    bump_after_next_get: bool,
}

/// [`ContentBackend`] keeping everything in memory, with the same version
/// rules as the real API: every write bumps `sys.version` and stale writes fail.
#[derive(Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
}

fn not_found(what: &str, id: &str) -> McpError {
    McpError::NotFound {
        message: format!("{} {} does not exist", what, id),
    }
}

fn check_version(body: &JsonValue, version: Version) -> Result<()> {
    let current = Version::read(body)?;
    if current != version {
        return Err(McpError::VersionConflict {
            message: format!("expected version {}, found {}", version, current),
        });
    }
    Ok(())
}

fn bump(body: &mut JsonValue) {
    let next = body.pointer("/sys/version").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
    body["sys"]["version"] = json!(next);
}

fn sys(id: &str, sys_type: &str) -> JsonValue {
    json!({ "id": id, "type": sys_type, "version": 1 })
}

fn sys_type(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::ContentType => "ContentType",
        ResourceKind::Entry => "Entry",
        ResourceKind::Asset => "Asset",
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a space with one environment.
    pub fn with_space(self, space_id: &str, environment_id: &str) -> Self {
        {
            let mut store = self.store.lock().unwrap();
            store.spaces.insert(
                space_id.to_string(),
                json!({ "sys": sys(space_id, "Space"), "name": space_id }),
            );
            store.environments.insert(
                (space_id.to_string(), environment_id.to_string()),
                json!({ "sys": sys(environment_id, "Environment"), "name": environment_id }),
            );
        }
        self
    }

    /// Seed a resource under a fixed id. Returns the stored representation.
    pub fn seed(&self, scope: &Scope, kind: ResourceKind, id: &str, body: JsonValue) -> JsonValue {
        let mut body = body;
        let mut sys_value = sys(id, sys_type(kind));
        if let Some(extra) = body.get("sys").and_then(|s| s.as_object()) {
            for (key, value) in extra {
                sys_value[key] = value.clone();
            }
        }
        body["sys"] = sys_value;

        let mut store = self.store.lock().unwrap();
        if kind == ResourceKind::ContentType {
            store.editor_interfaces.insert(
                (scope.space_id.clone(), scope.environment_id.clone(), id.to_string()),
                json!({
                    "sys": sys("default", "EditorInterface"),
                    "controls": [],
                }),
            );
        }
        store.resources.insert(key(scope, kind, id), body.clone());
        body
    }

    /// Seed an entry of `content_type_id`.
    pub fn seed_entry(&self, scope: &Scope, id: &str, content_type_id: &str, fields: JsonValue) -> JsonValue {
        self.seed(
            scope,
            ResourceKind::Entry,
            id,
            json!({
                "sys": { "contentType": link("ContentType", content_type_id) },
                "fields": fields,
                "metadata": { "tags": [] },
            }),
        )
    }

    /// Current stored representation.
    pub fn stored(&self, scope: &Scope, kind: ResourceKind, id: &str) -> Option<JsonValue> {
        self.store.lock().unwrap().resources.get(&key(scope, kind, id)).cloned()
    }

    /// Simulate a concurrent writer: the next `get` returns the current
    /// representation, then the stored version moves on.
    pub fn bump_after_next_get(&self) {
        self.store.lock().unwrap().bump_after_next_get = true;
    }

    /// Whether an environment exists.
    pub fn has_environment(&self, space_id: &str, environment_id: &str) -> bool {
        self.store
            .lock()
            .unwrap()
            .environments
            .contains_key(&(space_id.to_string(), environment_id.to_string()))
    }

    /// Number of asset processing requests received.
    pub fn process_calls(&self) -> u64 {
        self.store.lock().unwrap().process_calls
    }

    fn resource(&self, scope: &Scope, kind: ResourceKind, id: &str) -> Result<JsonValue> {
        self.stored(scope, kind, id)
            .ok_or_else(|| not_found(kind.label(), id))
    }

    fn write<F>(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version, f: F) -> Result<JsonValue>
    where
        F: FnOnce(&mut JsonValue),
    {
        let mut store = self.store.lock().unwrap();
        let body = store
            .resources
            .get_mut(&key(scope, kind, id))
            .ok_or_else(|| not_found(kind.label(), id))?;
        check_version(body, version)?;
        f(body);
        bump(body);
        Ok(body.clone())
    }
}

fn key(scope: &Scope, kind: ResourceKind, id: &str) -> ResourceKey {
    (
        scope.space_id.clone(),
        scope.environment_id.clone(),
        kind.collection(),
        id.to_string(),
    )
}

fn link(link_type: &str, id: &str) -> JsonValue {
    json!({ "sys": { "type": "Link", "linkType": link_type, "id": id } })
}

fn params(query: &ListQuery) -> BTreeMap<String, String> {
    query.params().into_iter().collect()
}

#[async_trait]
impl ContentBackend for MemoryBackend {
    async fn list_spaces(&self) -> Result<JsonValue> {
        let store = self.store.lock().unwrap();
        let items: Vec<JsonValue> = store.spaces.values().cloned().collect();
        Ok(json!({ "total": items.len(), "items": items }))
    }

    async fn get_space(&self, space_id: &str) -> Result<JsonValue> {
        let store = self.store.lock().unwrap();
        store
            .spaces
            .get(space_id)
            .cloned()
            .ok_or_else(|| not_found("Space", space_id))
    }

    async fn list_environments(&self, space_id: &str) -> Result<JsonValue> {
        let store = self.store.lock().unwrap();
        let items: Vec<JsonValue> = store
            .environments
            .iter()
            .filter(|((space, _), _)| space == space_id)
            .map(|(_, env)| env.clone())
            .collect();
        Ok(json!({ "total": items.len(), "items": items }))
    }

    async fn get_environment(&self, scope: &Scope) -> Result<Versioned> {
        let store = self.store.lock().unwrap();
        let env = store
            .environments
            .get(&(scope.space_id.clone(), scope.environment_id.clone()))
            .cloned()
            .ok_or_else(|| not_found("Environment", &scope.environment_id))?;
        Versioned::from_body(env)
    }

    async fn create_environment(&self, scope: &Scope, name: &str) -> Result<JsonValue> {
        let mut store = self.store.lock().unwrap();
        if !store.spaces.contains_key(&scope.space_id) {
            return Err(not_found("Space", &scope.space_id));
        }
        let env = json!({ "sys": sys(&scope.environment_id, "Environment"), "name": name });
        store
            .environments
            .insert((scope.space_id.clone(), scope.environment_id.clone()), env.clone());
        Ok(env)
    }

    async fn delete_environment(&self, scope: &Scope, version: Version) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let env_key = (scope.space_id.clone(), scope.environment_id.clone());
        let env = store
            .environments
            .get(&env_key)
            .ok_or_else(|| not_found("Environment", &scope.environment_id))?;
        check_version(env, version)?;
        store.environments.remove(&env_key);
        Ok(())
    }

    async fn list(&self, scope: &Scope, kind: ResourceKind, query: &ListQuery) -> Result<JsonValue> {
        let params = params(query);
        let content_type = params.get("content_type").cloned();

        let store = self.store.lock().unwrap();
        let matching: Vec<JsonValue> = store
            .resources
            .iter()
            .filter(|((space, env, collection, _), _)| {
                *space == scope.space_id && *env == scope.environment_id && *collection == kind.collection()
            })
            .map(|(_, body)| body.clone())
            .filter(|body| match &content_type {
                Some(ct) => body.pointer("/sys/contentType/sys/id").and_then(|v| v.as_str()) == Some(ct.as_str()),
                None => true,
            })
            .collect();

        let total = matching.len();
        let items: Vec<JsonValue> = matching
            .into_iter()
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .collect();
        Ok(json!({
            "sys": { "type": "Array" },
            "total": total,
            "skip": query.skip,
            "limit": query.limit,
            "items": items,
        }))
    }

    async fn get(&self, scope: &Scope, kind: ResourceKind, id: &str) -> Result<Versioned> {
        let mut store = self.store.lock().unwrap();
        let bump_now = std::mem::take(&mut store.bump_after_next_get);
        let body = store
            .resources
            .get_mut(&key(scope, kind, id))
            .ok_or_else(|| not_found(kind.label(), id))?;
        let read = body.clone();
        if bump_now {
            bump(body);
        }
        Versioned::from_body(read)
    }

    async fn create(&self, scope: &Scope, kind: ResourceKind, body: JsonValue) -> Result<JsonValue> {
        let id = {
            let mut store = self.store.lock().unwrap();
            store.next_id += 1;
            format!("generated-{}", store.next_id)
        };
        Ok(self.seed(scope, kind, &id, body))
    }

    async fn create_entry(&self, scope: &Scope, content_type_id: &str, body: JsonValue) -> Result<JsonValue> {
        self.resource(scope, ResourceKind::ContentType, content_type_id)?;
        let mut body = body;
        body["sys"] = json!({ "contentType": link("ContentType", content_type_id) });
        self.create(scope, ResourceKind::Entry, body).await
    }

    async fn update(
        &self,
        scope: &Scope,
        kind: ResourceKind,
        id: &str,
        body: JsonValue,
        version: Version,
    ) -> Result<JsonValue> {
        self.write(scope, kind, id, version, |current| {
            let sys = current["sys"].clone();
            *current = body;
            current["sys"] = sys;
        })
    }

    async fn delete(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let resource_key = key(scope, kind, id);
        let body = store
            .resources
            .get(&resource_key)
            .ok_or_else(|| not_found(kind.label(), id))?;
        check_version(body, version)?;
        store.resources.remove(&resource_key);
        Ok(())
    }

    async fn publish(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version) -> Result<JsonValue> {
        self.write(scope, kind, id, version, |current| {
            current["sys"]["publishedVersion"] = json!(version.get());
        })
    }

    async fn unpublish(&self, scope: &Scope, kind: ResourceKind, id: &str, version: Version) -> Result<JsonValue> {
        self.write(scope, kind, id, version, |current| {
            if let Some(sys) = current["sys"].as_object_mut() {
                sys.remove("publishedVersion");
            }
        })
    }

    async fn get_editor_interface(&self, scope: &Scope, content_type_id: &str) -> Result<Versioned> {
        let store = self.store.lock().unwrap();
        let body = store
            .editor_interfaces
            .get(&(scope.space_id.clone(), scope.environment_id.clone(), content_type_id.to_string()))
            .cloned()
            .ok_or_else(|| not_found("EditorInterface", content_type_id))?;
        Versioned::from_body(body)
    }

    async fn update_editor_interface(
        &self,
        scope: &Scope,
        content_type_id: &str,
        body: JsonValue,
        version: Version,
    ) -> Result<JsonValue> {
        let mut store = self.store.lock().unwrap();
        let current = store
            .editor_interfaces
            .get_mut(&(scope.space_id.clone(), scope.environment_id.clone(), content_type_id.to_string()))
            .ok_or_else(|| not_found("EditorInterface", content_type_id))?;
        check_version(current, version)?;
        let sys = current["sys"].clone();
        *current = body;
        current["sys"] = sys;
        bump(current);
        Ok(current.clone())
    }

    async fn process_asset(&self, scope: &Scope, asset_id: &str, locale: &str, version: Version) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.process_calls += 1;
        let body = store
            .resources
            .get_mut(&key(scope, ResourceKind::Asset, asset_id))
            .ok_or_else(|| not_found("Asset", asset_id))?;
        check_version(body, version)?;
        let file = body
            .pointer_mut(&format!("/fields/file/{}", locale))
            .ok_or_else(|| not_found("File for locale", locale))?;
        let file_name = file.get("fileName").and_then(|v| v.as_str()).unwrap_or("file").to_string();
        if let Some(file) = file.as_object_mut() {
            file.remove("upload");
            file.insert("url".to_string(), json!(format!("//assets.example.test/{}", file_name)));
        }
        Ok(())
    }
}

/// Scope used throughout the tests.
pub fn scope() -> Scope {
    Scope::new("space1", "master")
}

/// Arguments carrying the test scope.
pub fn scoped(args: JsonValue) -> JsonValue {
    let mut args = args;
    args["spaceId"] = json!("space1");
    args["environmentId"] = json!("master");
    args
}

/// Gateway over `backend` with a zero-wait processing policy.
pub fn gateway(backend: Arc<MemoryBackend>, pinned: PinnedScope) -> Gateway {
    let config = GatewayConfig::new(pinned).with_processing(ProcessingPolicy {
        checks: 3,
        wait: Duration::ZERO,
    });
    Gateway::new(config, Arc::new(SharedClient(backend)))
}

/// Dispatch a call with object arguments.
pub async fn call(gateway: &Gateway, name: &str, args: JsonValue) -> CallResult {
    let args: Map<String, JsonValue> = match args {
        JsonValue::Object(m) => m,
        _ => Map::new(),
    };
    gateway.dispatch(name, args).await
}

/// Dispatch a call that must succeed and parse its JSON text.
pub async fn call_json(gateway: &Gateway, name: &str, args: JsonValue) -> JsonValue {
    let result = call(gateway, name, args).await;
    assert!(!result.is_error(), "tool {} failed: {:?}", name, result.first_text());
    let text = result.first_text().unwrap_or_default();
    serde_json::from_str(text).unwrap_or_else(|e| panic!("tool {} returned non-JSON text {:?}: {}", name, text, e))
}

/// Dispatch a call that must fail and return its error text.
pub async fn call_err(gateway: &Gateway, name: &str, args: JsonValue) -> String {
    let result = call(gateway, name, args).await;
    assert!(result.is_error(), "expected tool {} to fail, got {:?}", name, result.first_text());
    result.first_text().unwrap_or_default().to_string()
}
