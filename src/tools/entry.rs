//! Entry tools.
//!
//! Tools: search_entries, create_entry, get_entry, update_entry, delete_entry,
//!        publish_entry, unpublish_entry

use serde_json::{json, Map, Value as JsonValue};

use crate::args::{get_object_arg, get_string_arg, get_window};
use crate::backend::{ListQuery, ResourceKind};
use crate::config::{PinnedScope, Scope};
use crate::error::{McpError, Result};
use crate::richtext::process_fields;
use crate::schema;
use crate::summarize::{summarize, SummarizeOptions};
use crate::tools::{
    delete_resource, fields_of, merge_fields, publish_resource, unpublish_resource, with_scope,
    CallResult, Tool, ToolContext, ToolDef,
};

/// Hard ceiling on entries returned per call.
pub const ENTRY_PAGE_LIMIT: u64 = 3;

const REMAINING_MESSAGE: &str = "To see more entries, please ask me to retrieve the next page.";

/// Get all entry tool definitions.
pub fn tools(pinned: &PinnedScope) -> Vec<ToolDef> {
    let entry_id = || schema!(object { required: { "entryId": string } });

    vec![
        ToolDef::new(
            Tool::SearchEntries,
            "Search for entries using query parameters. Returns a maximum of 3 items per request. \
             Use skip parameter to paginate through results.",
            with_scope(
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "object",
                            "description": "Query parameters for searching entries",
                            "properties": {
                                "content_type": { "type": "string" },
                                "select": { "type": "string" },
                                "limit": {
                                    "type": "number",
                                    "default": ENTRY_PAGE_LIMIT,
                                    "maximum": ENTRY_PAGE_LIMIT,
                                    "description": "Maximum number of items to return (max: 3)"
                                },
                                "skip": {
                                    "type": "number",
                                    "default": 0,
                                    "description": "Number of items to skip for pagination"
                                },
                                "order": { "type": "string" },
                                "query": { "type": "string" }
                            },
                            "required": ["limit", "skip"]
                        }
                    },
                    "required": ["query"]
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::CreateEntry,
            "Create a new entry in Contentful, before executing this function, you need to know \
             the contentTypeId (not the content type NAME) and the fields of that contentType, \
             you can get the fields definition by using the get_content_type tool. RichText \
             fields may be given as markdown strings.",
            with_scope(
                schema!(object {
                    required: {
                        "contentTypeId": { "type": "string", "description": "The ID of the content type for the new entry" },
                        "fields": { "type": "object", "description": "The fields of the entry, keyed by field id then locale" }
                    }
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::GetEntry,
            "Retrieve an existing entry",
            with_scope(entry_id(), pinned),
        ),
        ToolDef::new(
            Tool::UpdateEntry,
            "Update an existing entry. Only the supplied fields and locales are changed; \
             everything else keeps its current value.",
            with_scope(
                schema!(object {
                    required: { "entryId": string, "fields": object }
                }),
                pinned,
            ),
        ),
        ToolDef::new(Tool::DeleteEntry, "Delete an entry", with_scope(entry_id(), pinned)),
        ToolDef::new(Tool::PublishEntry, "Publish an entry", with_scope(entry_id(), pinned)),
        ToolDef::new(Tool::UnpublishEntry, "Unpublish an entry", with_scope(entry_id(), pinned)),
    ]
}

/// Dispatch an entry tool call.
pub async fn dispatch(
    ctx: &ToolContext<'_>,
    tool: Tool,
    args: Map<String, JsonValue>,
) -> Result<CallResult> {
    let scope = ctx.scope(&args)?;

    match tool {
        Tool::SearchEntries => {
            let query = get_object_arg(&args, "query")?;
            let (limit, skip) = get_window(&query, ENTRY_PAGE_LIMIT, ENTRY_PAGE_LIMIT);

            let mut list_query = ListQuery::window(limit, skip);
            for (key, value) in &query {
                if let Some(value) = query_param(value) {
                    list_query = list_query.filter(key.as_str(), value);
                }
            }

            let entries = ctx.backend.list(&scope, ResourceKind::Entry, &list_query).await?;
            let summarized = summarize(
                entries,
                &SummarizeOptions::new(ENTRY_PAGE_LIMIT as usize, REMAINING_MESSAGE),
            );
            CallResult::json(&summarized)
        }

        Tool::CreateEntry => {
            let content_type_id = get_string_arg(&args, "contentTypeId")?;
            let fields = get_object_arg(&args, "fields")?;

            let fields = convert_rich_text(ctx, &scope, &content_type_id, fields).await?;
            let entry = ctx
                .backend
                .create_entry(&scope, &content_type_id, json!({ "fields": fields }))
                .await?;
            CallResult::json(&entry)
        }

        Tool::GetEntry => {
            let entry_id = get_string_arg(&args, "entryId")?;
            let entry = ctx.backend.get(&scope, ResourceKind::Entry, &entry_id).await?;
            CallResult::json(&entry.body)
        }

        Tool::UpdateEntry => {
            let entry_id = get_string_arg(&args, "entryId")?;
            let supplied = get_object_arg(&args, "fields")?;

            let current = ctx.backend.get(&scope, ResourceKind::Entry, &entry_id).await?;
            let supplied = match current
                .body
                .pointer("/sys/contentType/sys/id")
                .and_then(|v| v.as_str())
            {
                Some(content_type_id) => {
                    convert_rich_text(ctx, &scope, content_type_id, supplied).await?
                }
                None => supplied,
            };

            let mut body = json!({ "fields": merge_fields(fields_of(&current.body), supplied) });
            if let Some(metadata) = current.body.get("metadata") {
                body["metadata"] = metadata.clone();
            }

            let entry = ctx
                .backend
                .update(&scope, ResourceKind::Entry, &entry_id, body, current.version)
                .await?;
            CallResult::json(&entry)
        }

        Tool::DeleteEntry => {
            let entry_id = get_string_arg(&args, "entryId")?;
            delete_resource(ctx, &scope, ResourceKind::Entry, &entry_id).await
        }

        Tool::PublishEntry => {
            let entry_id = get_string_arg(&args, "entryId")?;
            publish_resource(ctx, &scope, ResourceKind::Entry, &entry_id).await
        }

        Tool::UnpublishEntry => {
            let entry_id = get_string_arg(&args, "entryId")?;
            unpublish_resource(ctx, &scope, ResourceKind::Entry, &entry_id).await
        }

        _ => Err(McpError::UnknownTool(tool.name().to_string())),
    }
}

/// Convert markdown strings in `RichText` fields of `content_type_id`.
async fn convert_rich_text(
    ctx: &ToolContext<'_>,
    scope: &Scope,
    content_type_id: &str,
    fields: Map<String, JsonValue>,
) -> Result<Map<String, JsonValue>> {
    let content_type = ctx
        .backend
        .get(scope, ResourceKind::ContentType, content_type_id)
        .await?;
    let definitions = content_type
        .body
        .get("fields")
        .and_then(|f| f.as_array())
        .cloned()
        .unwrap_or_default();
    Ok(process_fields(fields, &definitions, ctx.converter))
}

/// Render a scalar query value as a query-string parameter.
fn query_param(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
