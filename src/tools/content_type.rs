//! Content type tools.
//!
//! Tools: list_content_types, get_content_type, get_editor_interface,
//!        update_editor_interface, create_content_type, update_content_type,
//!        delete_content_type, publish_content_type

use serde_json::{json, Map, Value as JsonValue};

use crate::args::{get_object_arg, get_optional_array, get_optional_string, get_string_arg, get_window};
use crate::backend::{ListQuery, ResourceKind};
use crate::config::PinnedScope;
use crate::error::{McpError, Result};
use crate::schema;
use crate::summarize::{summarize, SummarizeOptions};
use crate::tools::{
    delete_resource, publish_resource, with_scope, window_properties, CallResult, Tool,
    ToolContext, ToolDef,
};

/// Default content types per page.
pub const CONTENT_TYPE_DEFAULT_LIMIT: u64 = 10;

/// Hard ceiling on content types returned per call.
pub const CONTENT_TYPE_PAGE_LIMIT: u64 = 20;

const REMAINING_MESSAGE: &str =
    "To see more content types, please ask me to retrieve the next page.";

fn field_definition_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": "The ID of the field" },
            "name": { "type": "string", "description": "Display name of the field" },
            "type": {
                "type": "string",
                "description": "Type of the field (Text, Number, Date, Location, Media, Boolean, JSON, Link, Array, etc)",
                "enum": ["Symbol", "Text", "RichText", "Integer", "Number", "Date", "Location", "Object", "Boolean", "Link", "Array"]
            },
            "required": { "type": "boolean", "description": "Whether this field is required", "default": false },
            "localized": { "type": "boolean", "description": "Whether this field can be localized", "default": false },
            "linkType": {
                "type": "string",
                "description": "Required for Link fields. Specifies what type of resource this field links to",
                "enum": ["Entry", "Asset"]
            },
            "items": {
                "type": "object",
                "description": "Required for Array fields. Specifies the type of items in the array",
                "properties": {
                    "type": { "type": "string", "enum": ["Symbol", "Link"] },
                    "linkType": { "type": "string", "enum": ["Entry", "Asset"] },
                    "validations": { "type": "array", "items": { "type": "object" } }
                }
            },
            "validations": {
                "type": "array",
                "description": "Array of validation rules for the field",
                "items": { "type": "object" }
            }
        },
        "required": ["id", "name", "type"]
    })
}

/// Get all content type tool definitions.
pub fn tools(pinned: &PinnedScope) -> Vec<ToolDef> {
    let content_type_id = || schema!(object { required: { "contentTypeId": string } });

    vec![
        ToolDef::new(
            Tool::ListContentTypes,
            "List content types in a space. Returns a maximum of 20 items per request (10 by default). \
             Use skip parameter to paginate through results.",
            with_scope(
                json!({
                    "type": "object",
                    "properties": window_properties(CONTENT_TYPE_DEFAULT_LIMIT, CONTENT_TYPE_PAGE_LIMIT),
                    "required": ["limit", "skip"]
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::GetContentType,
            "Get details of a specific content type",
            with_scope(content_type_id(), pinned),
        ),
        ToolDef::new(
            Tool::GetEditorInterface,
            "Get the editor interface configuration for a specific content type",
            with_scope(
                schema!(object {
                    required: {
                        "contentTypeId": { "type": "string", "description": "The ID of the content type to get the editor interface for" }
                    }
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::UpdateEditorInterface,
            "Update the editor interface configuration for a specific content type. \
             The content type is re-published afterwards so the change becomes visible.",
            with_scope(
                schema!(object {
                    required: {
                        "contentTypeId": { "type": "string", "description": "The ID of the content type to update the editor interface for" },
                        "editorInterface": {
                            "type": "object",
                            "description": "The editor interface configuration to update. This can include controls, sidebar, and editors properties."
                        }
                    }
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::CreateContentType,
            "Create a new content type",
            with_scope(
                schema!(object {
                    required: {
                        "name": string,
                        "fields": {
                            "type": "array",
                            "description": "Array of field definitions for the content type",
                            "items": field_definition_schema()
                        }
                    },
                    optional: { "description": string, "displayField": string }
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::UpdateContentType,
            "Update an existing content type. Field definitions are merged by id; \
             omitted properties keep their current value.",
            with_scope(
                schema!(object {
                    required: { "contentTypeId": string, "name": string, "fields": array_object },
                    optional: { "description": string, "displayField": string }
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::DeleteContentType,
            "Delete a content type",
            with_scope(content_type_id(), pinned),
        ),
        ToolDef::new(
            Tool::PublishContentType,
            "Publish a content type",
            with_scope(content_type_id(), pinned),
        ),
    ]
}

/// Dispatch a content type tool call.
pub async fn dispatch(
    ctx: &ToolContext<'_>,
    tool: Tool,
    args: Map<String, JsonValue>,
) -> Result<CallResult> {
    let scope = ctx.scope(&args)?;

    match tool {
        Tool::ListContentTypes => {
            let (limit, skip) = get_window(&args, CONTENT_TYPE_DEFAULT_LIMIT, CONTENT_TYPE_PAGE_LIMIT);
            let mut envelope = ctx
                .backend
                .list(&scope, ResourceKind::ContentType, &ListQuery::window(limit, skip))
                .await?;

            if let Some(items) = envelope.get_mut("items").and_then(|i| i.as_array_mut()) {
                for item in items.iter_mut() {
                    *item = json!({
                        "id": item.pointer("/sys/id").cloned().unwrap_or(JsonValue::Null),
                        "name": item.get("name").cloned().unwrap_or(JsonValue::Null),
                        "description": item.get("description").and_then(|d| d.as_str()).unwrap_or(""),
                    });
                }
            }

            let summarized = summarize(
                envelope,
                &SummarizeOptions::new(CONTENT_TYPE_PAGE_LIMIT as usize, REMAINING_MESSAGE),
            );
            CallResult::json(&summarized)
        }

        Tool::GetContentType => {
            let content_type_id = get_string_arg(&args, "contentTypeId")?;
            let content_type = ctx
                .backend
                .get(&scope, ResourceKind::ContentType, &content_type_id)
                .await?;
            CallResult::json(&content_type.body)
        }

        Tool::GetEditorInterface => {
            let content_type_id = get_string_arg(&args, "contentTypeId")?;
            let editor_interface = ctx
                .backend
                .get_editor_interface(&scope, &content_type_id)
                .await?;
            CallResult::json(&editor_interface.body)
        }

        Tool::UpdateEditorInterface => {
            let content_type_id = get_string_arg(&args, "contentTypeId")?;
            let updates = get_object_arg(&args, "editorInterface")?;

            let current = ctx
                .backend
                .get_editor_interface(&scope, &content_type_id)
                .await?;
            let mut body = current.body.as_object().cloned().unwrap_or_default();
            for (key, value) in updates {
                if key != "sys" {
                    body.insert(key, value);
                }
            }

            let updated = ctx
                .backend
                .update_editor_interface(
                    &scope,
                    &content_type_id,
                    JsonValue::Object(body),
                    current.version,
                )
                .await?;

            // editor interface changes only show up once the content type is re-published
            let content_type = ctx
                .backend
                .get(&scope, ResourceKind::ContentType, &content_type_id)
                .await?;
            ctx.backend
                .publish(&scope, ResourceKind::ContentType, &content_type_id, content_type.version)
                .await?;

            CallResult::json(&updated)
        }

        Tool::CreateContentType => {
            let name = get_string_arg(&args, "name")?;
            let fields = get_optional_array(&args, "fields")?
                .ok_or_else(|| McpError::MissingArg("fields".to_string()))?;
            let description = get_optional_string(&args, "description").unwrap_or_default();
            let display_field = get_optional_string(&args, "displayField")
                .filter(|d| !d.is_empty())
                .or_else(|| {
                    fields
                        .first()
                        .and_then(|f| f.get("id"))
                        .and_then(|id| id.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_default();

            let content_type = ctx
                .backend
                .create(
                    &scope,
                    ResourceKind::ContentType,
                    json!({
                        "name": name,
                        "fields": fields,
                        "description": description,
                        "displayField": display_field,
                    }),
                )
                .await?;
            CallResult::json(&content_type)
        }

        Tool::UpdateContentType => {
            let content_type_id = get_string_arg(&args, "contentTypeId")?;
            let current = ctx
                .backend
                .get(&scope, ResourceKind::ContentType, &content_type_id)
                .await?;

            let mut body = Map::new();
            for key in ["name", "description", "displayField"] {
                let value = get_optional_string(&args, key)
                    .filter(|v| !v.is_empty())
                    .map(JsonValue::String)
                    .or_else(|| current.body.get(key).cloned());
                if let Some(value) = value {
                    body.insert(key.to_string(), value);
                }
            }
            let current_fields = current
                .body
                .get("fields")
                .and_then(|f| f.as_array())
                .cloned()
                .unwrap_or_default();
            let fields = match get_optional_array(&args, "fields")? {
                Some(supplied) => merge_field_definitions(current_fields, supplied),
                None => current_fields,
            };
            body.insert("fields".to_string(), JsonValue::Array(fields));

            let content_type = ctx
                .backend
                .update(
                    &scope,
                    ResourceKind::ContentType,
                    &content_type_id,
                    JsonValue::Object(body),
                    current.version,
                )
                .await?;
            CallResult::json(&content_type)
        }

        Tool::DeleteContentType => {
            let content_type_id = get_string_arg(&args, "contentTypeId")?;
            delete_resource(ctx, &scope, ResourceKind::ContentType, &content_type_id).await
        }

        Tool::PublishContentType => {
            let content_type_id = get_string_arg(&args, "contentTypeId")?;
            publish_resource(ctx, &scope, ResourceKind::ContentType, &content_type_id).await
        }

        _ => Err(McpError::UnknownTool(tool.name().to_string())),
    }
}

/// Replace definitions with matching ids, keep the rest, append new ones.
fn merge_field_definitions(current: Vec<JsonValue>, supplied: Vec<JsonValue>) -> Vec<JsonValue> {
    let id_of = |field: &JsonValue| field.get("id").and_then(|v| v.as_str()).map(str::to_string);

    let mut merged = current;
    for field in supplied {
        let existing = id_of(&field)
            .and_then(|id| merged.iter().position(|f| id_of(f).as_deref() == Some(id.as_str())));
        match existing {
            Some(index) => merged[index] = field,
            None => merged.push(field),
        }
    }
    merged
}
