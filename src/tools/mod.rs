//! Tool registry and category definitions.
//!
//! Provides the closed set of tools, the advertised schema table and the
//! routing from a tool to its resource handler.

pub mod asset;
pub mod content_type;
pub mod entry;
pub mod space;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::backend::{ContentBackend, ResourceKind};
use crate::config::{GatewayConfig, PinnedScope, Scope};
use crate::error::{McpError, Result};
use crate::richtext::RichTextConverter;

macro_rules! define_tools {
    ($($variant:ident => $name:literal in $group:ident,)*) => {
        /// Every operation the gateway can perform.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Tool {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl Tool {
            /// All tools in advertisement order.
            pub const ALL: &'static [Tool] = &[$(Tool::$variant,)*];

            /// Wire name of the tool.
            pub fn name(self) -> &'static str {
                match self {
                    $(Tool::$variant => $name,)*
                }
            }

            /// Look a tool up by wire name.
            pub fn from_name(name: &str) -> Option<Tool> {
                match name {
                    $($name => Some(Tool::$variant),)*
                    _ => None,
                }
            }

            /// Resource group handling the tool.
            pub fn group(self) -> ToolGroup {
                match self {
                    $(Tool::$variant => ToolGroup::$group,)*
                }
            }
        }
    };
}

define_tools! {
    SearchEntries => "search_entries" in Entry,
    CreateEntry => "create_entry" in Entry,
    GetEntry => "get_entry" in Entry,
    UpdateEntry => "update_entry" in Entry,
    DeleteEntry => "delete_entry" in Entry,
    PublishEntry => "publish_entry" in Entry,
    UnpublishEntry => "unpublish_entry" in Entry,
    ListAssets => "list_assets" in Asset,
    UploadAsset => "upload_asset" in Asset,
    GetAsset => "get_asset" in Asset,
    UpdateAsset => "update_asset" in Asset,
    DeleteAsset => "delete_asset" in Asset,
    PublishAsset => "publish_asset" in Asset,
    UnpublishAsset => "unpublish_asset" in Asset,
    ListContentTypes => "list_content_types" in ContentType,
    GetContentType => "get_content_type" in ContentType,
    GetEditorInterface => "get_editor_interface" in ContentType,
    UpdateEditorInterface => "update_editor_interface" in ContentType,
    CreateContentType => "create_content_type" in ContentType,
    UpdateContentType => "update_content_type" in ContentType,
    DeleteContentType => "delete_content_type" in ContentType,
    PublishContentType => "publish_content_type" in ContentType,
    ListSpaces => "list_spaces" in SpaceEnvironment,
    GetSpace => "get_space" in SpaceEnvironment,
    ListEnvironments => "list_environments" in SpaceEnvironment,
    CreateEnvironment => "create_environment" in SpaceEnvironment,
    DeleteEnvironment => "delete_environment" in SpaceEnvironment,
}

/// Resource groups, one handler module each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolGroup {
    /// Entries
    Entry,
    /// Assets
    Asset,
    /// Content types and editor interfaces
    ContentType,
    /// Spaces and environments
    SpaceEnvironment,
}

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "create_entry")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(tool: Tool, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: tool.name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// One item of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Text content
    Text {
        /// The text
        text: String,
    },
}

/// Result of a `tools/call`, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    /// Ordered content items
    pub content: Vec<Content>,
    /// Set to `true` on failure
    #[serde(rename = "isError", default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallResult {
    /// A single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// A value rendered as pretty-printed JSON (two-space indentation).
    pub fn json(value: &JsonValue) -> Result<Self> {
        Ok(Self::text(serde_json::to_string_pretty(value)?))
    }

    /// Failure result carrying `Error: <message>`.
    pub fn error(err: &McpError) -> Self {
        Self {
            content: vec![Content::Text {
                text: format!("Error: {}", err),
            }],
            is_error: Some(true),
        }
    }

    /// Whether this is a failure result.
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content item.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            Content::Text { text } => text.as_str(),
        })
    }
}

/// Everything a handler needs for one call.
pub struct ToolContext<'a> {
    /// Authenticated backend for this call
    pub backend: &'a dyn ContentBackend,
    /// Process configuration
    pub config: &'a GatewayConfig,
    /// Markdown converter for rich-text fields
    pub converter: &'a dyn RichTextConverter,
}

impl ToolContext<'_> {
    /// Effective space/environment for the call.
    pub fn scope(&self, args: &Map<String, JsonValue>) -> Result<Scope> {
        self.config.pinned.resolve(args)
    }
}

/// Registry of advertised tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Build the advertised tool set for `config`.
    pub fn new(config: &GatewayConfig) -> Self {
        let pinned = &config.pinned;
        let mut tools = Vec::new();

        tools.extend(entry::tools(pinned));
        tools.extend(asset::tools(pinned));
        tools.extend(content_type::tools(pinned));
        if !pinned.both() {
            tools.extend(space::tools());
        }

        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Resolve an advertised tool by name.
    pub fn lookup(&self, name: &str) -> Result<Tool> {
        Tool::from_name(name)
            .filter(|_| self.tools.iter().any(|t| t.name == name))
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))
    }

    /// Dispatch a tool call to the appropriate handler.
    ///
    /// Tools left out of the advertised set are rejected as unknown.
    pub async fn dispatch(
        &self,
        ctx: &ToolContext<'_>,
        tool: Tool,
        args: Map<String, JsonValue>,
    ) -> Result<CallResult> {
        let tool = self.lookup(tool.name())?;
        match tool.group() {
            ToolGroup::Entry => entry::dispatch(ctx, tool, args).await,
            ToolGroup::Asset => asset::dispatch(ctx, tool, args).await,
            ToolGroup::ContentType => content_type::dispatch(ctx, tool, args).await,
            ToolGroup::SpaceEnvironment => space::dispatch(ctx, tool, args).await,
        }
    }
}

/// Add `spaceId`/`environmentId` as required properties unless either is pinned.
pub fn with_scope(mut schema: JsonValue, pinned: &PinnedScope) -> JsonValue {
    if pinned.any() {
        return schema;
    }

    if let Some(props) = schema.get_mut("properties").and_then(|p| p.as_object_mut()) {
        props.insert(
            "spaceId".to_string(),
            serde_json::json!({
                "type": "string",
                "description": "The ID of the Contentful space. This must be the space's ID, not its name, ask for this ID if it's unclear."
            }),
        );
        props.insert(
            "environmentId".to_string(),
            serde_json::json!({
                "type": "string",
                "description": "The ID of the environment within the space, by default this will be called Master",
                "default": "master"
            }),
        );
    }

    match schema.get_mut("required").and_then(|r| r.as_array_mut()) {
        Some(required) => {
            required.push(JsonValue::from("spaceId"));
            required.push(JsonValue::from("environmentId"));
        }
        None => {
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("required".to_string(), serde_json::json!(["spaceId", "environmentId"]));
            }
        }
    }

    schema
}

/// Overlay caller-supplied fields on the current ones.
///
/// Locale maps are merged locale by locale; fields and locales the caller did
/// not mention keep their current value.
pub fn merge_fields(
    mut current: Map<String, JsonValue>,
    supplied: Map<String, JsonValue>,
) -> Map<String, JsonValue> {
    for (field, value) in supplied {
        match (current.get_mut(&field), value) {
            (Some(JsonValue::Object(locales)), JsonValue::Object(updates)) => {
                locales.extend(updates);
            }
            (_, value) => {
                current.insert(field, value);
            }
        }
    }
    current
}

/// `fields` object of a representation, or an empty map.
pub(crate) fn fields_of(body: &JsonValue) -> Map<String, JsonValue> {
    body.get("fields")
        .and_then(|f| f.as_object())
        .cloned()
        .unwrap_or_default()
}

/// Read, then delete at the version just read.
pub(crate) async fn delete_resource(
    ctx: &ToolContext<'_>,
    scope: &Scope,
    kind: ResourceKind,
    id: &str,
) -> Result<CallResult> {
    let current = ctx.backend.get(scope, kind, id).await?;
    ctx.backend.delete(scope, kind, id, current.version).await?;
    Ok(CallResult::text(format!("{} {} deleted successfully", kind.label(), id)))
}

/// Read, then publish at the version just read.
pub(crate) async fn publish_resource(
    ctx: &ToolContext<'_>,
    scope: &Scope,
    kind: ResourceKind,
    id: &str,
) -> Result<CallResult> {
    let current = ctx.backend.get(scope, kind, id).await?;
    let published = ctx.backend.publish(scope, kind, id, current.version).await?;
    CallResult::json(&published)
}

/// Read, then unpublish at the version just read.
pub(crate) async fn unpublish_resource(
    ctx: &ToolContext<'_>,
    scope: &Scope,
    kind: ResourceKind,
    id: &str,
) -> Result<CallResult> {
    let current = ctx.backend.get(scope, kind, id).await?;
    let unpublished = ctx.backend.unpublish(scope, kind, id, current.version).await?;
    CallResult::json(&unpublished)
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type number) => { serde_json::json!({"type": "number"}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type object) => { serde_json::json!({"type": "object"}) };
    (@type array_object) => { serde_json::json!({"type": "array", "items": {"type": "object"}}) };
    (@type { $($json:tt)* }) => { serde_json::json!({ $($json)* }) };
}

/// Paging properties shared by the list tools.
pub(crate) fn window_properties(default_limit: u64, ceiling: u64) -> JsonValue {
    serde_json::json!({
        "limit": {
            "type": "number",
            "default": default_limit,
            "maximum": ceiling,
            "description": format!("Maximum number of items to return (max: {})", ceiling)
        },
        "skip": {
            "type": "number",
            "default": 0,
            "description": "Number of items to skip for pagination"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(schema: &JsonValue) -> Vec<String> {
        schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_with_scope_injects_when_unpinned() {
        let schema = with_scope(
            schema!(object { required: { "entryId": string } }),
            &PinnedScope::default(),
        );
        assert_eq!(required(&schema), vec!["entryId", "spaceId", "environmentId"]);
        assert_eq!(schema["properties"]["environmentId"]["default"], "master");
    }

    #[test]
    fn test_with_scope_untouched_when_any_pinned() {
        let base = schema!(object { required: { "entryId": string } });
        let pinned = PinnedScope::new(None, Some("master".into()));
        let schema = with_scope(base.clone(), &pinned);
        assert_eq!(schema, base);
    }

    #[test]
    fn test_merge_fields_keeps_unmentioned() {
        let current = serde_json::json!({
            "title": {"en-US": "Old", "de-DE": "Alt"},
            "description": {"en-US": "kept"}
        });
        let supplied = serde_json::json!({"title": {"en-US": "New"}, "slug": {"en-US": "new"}});
        let merged = merge_fields(
            current.as_object().cloned().unwrap(),
            supplied.as_object().cloned().unwrap(),
        );
        assert_eq!(merged["title"]["en-US"], "New");
        assert_eq!(merged["title"]["de-DE"], "Alt");
        assert_eq!(merged["description"]["en-US"], "kept");
        assert_eq!(merged["slug"]["en-US"], "new");
    }

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(*tool));
        }
        assert_eq!(Tool::ALL.len(), 27);
        assert_eq!(Tool::from_name("not_a_tool"), None);
    }

    #[test]
    fn test_call_result_shapes() {
        let ok = CallResult::json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(ok.first_text(), Some("{\n  \"a\": 1\n}"));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"content": [{"type": "text", "text": "{\n  \"a\": 1\n}"}]})
        );

        let err = CallResult::error(&McpError::UnknownTool("x".into()));
        assert!(err.is_error());
        assert_eq!(serde_json::to_value(&err).unwrap()["isError"], true);
        assert_eq!(err.first_text(), Some("Error: Unknown tool: x"));
    }
}
