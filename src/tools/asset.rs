//! Asset tools.
//!
//! Tools: list_assets, upload_asset, get_asset, update_asset, delete_asset,
//!        publish_asset, unpublish_asset

use serde_json::{json, Map, Value as JsonValue};

use crate::args::{get_optional_object, get_optional_string, get_string_arg, get_window};
use crate::backend::{ListQuery, ResourceKind, Version};
use crate::config::{PinnedScope, Scope};
use crate::error::{McpError, Result};
use crate::schema;
use crate::summarize::{summarize, SummarizeOptions};
use crate::tools::{
    delete_resource, fields_of, merge_fields, publish_resource, unpublish_resource, with_scope,
    window_properties, CallResult, Tool, ToolContext, ToolDef,
};

/// Hard ceiling on assets returned per call.
pub const ASSET_PAGE_LIMIT: u64 = 3;

const REMAINING_MESSAGE: &str = "To see more assets, please ask me to retrieve the next page.";

/// Get all asset tool definitions.
pub fn tools(pinned: &PinnedScope) -> Vec<ToolDef> {
    let asset_id = || schema!(object { required: { "assetId": string } });

    vec![
        ToolDef::new(
            Tool::ListAssets,
            "List assets in a space. Returns a maximum of 3 items per request. \
             Use skip parameter to paginate through results.",
            with_scope(
                json!({
                    "type": "object",
                    "properties": window_properties(ASSET_PAGE_LIMIT, ASSET_PAGE_LIMIT),
                    "required": ["limit", "skip"]
                }),
                pinned,
            ),
        ),
        ToolDef::new(
            Tool::UploadAsset,
            "Upload a new asset. The file is processed for all locales before the asset is returned.",
            with_scope(
                schema!(object {
                    required: {
                        "title": string,
                        "file": {
                            "type": "object",
                            "properties": {
                                "upload": { "type": "string" },
                                "fileName": { "type": "string" },
                                "contentType": { "type": "string" }
                            },
                            "required": ["upload", "fileName", "contentType"]
                        }
                    },
                    optional: { "description": string }
                }),
                pinned,
            ),
        ),
        ToolDef::new(Tool::GetAsset, "Retrieve an asset", with_scope(asset_id(), pinned)),
        ToolDef::new(
            Tool::UpdateAsset,
            "Update an asset. Omitted title, description or file keep their current value.",
            with_scope(
                schema!(object {
                    required: { "assetId": string },
                    optional: {
                        "title": string,
                        "description": string,
                        "file": {
                            "type": "object",
                            "properties": {
                                "url": { "type": "string" },
                                "fileName": { "type": "string" },
                                "contentType": { "type": "string" }
                            },
                            "required": ["url", "fileName", "contentType"]
                        }
                    }
                }),
                pinned,
            ),
        ),
        ToolDef::new(Tool::DeleteAsset, "Delete an asset", with_scope(asset_id(), pinned)),
        ToolDef::new(Tool::PublishAsset, "Publish an asset", with_scope(asset_id(), pinned)),
        ToolDef::new(Tool::UnpublishAsset, "Unpublish an asset", with_scope(asset_id(), pinned)),
    ]
}

/// Dispatch an asset tool call.
pub async fn dispatch(
    ctx: &ToolContext<'_>,
    tool: Tool,
    args: Map<String, JsonValue>,
) -> Result<CallResult> {
    let scope = ctx.scope(&args)?;

    match tool {
        Tool::ListAssets => {
            let (limit, skip) = get_window(&args, ASSET_PAGE_LIMIT, ASSET_PAGE_LIMIT);
            let assets = ctx
                .backend
                .list(&scope, ResourceKind::Asset, &ListQuery::window(limit, skip))
                .await?;
            let summarized = summarize(
                assets,
                &SummarizeOptions::new(ASSET_PAGE_LIMIT as usize, REMAINING_MESSAGE),
            );
            CallResult::json(&summarized)
        }

        Tool::UploadAsset => {
            let fields = supplied_fields(ctx, &args)?;
            if !fields.contains_key("title") {
                return Err(McpError::MissingArg("title".to_string()));
            }
            if !fields.contains_key("file") {
                return Err(McpError::MissingArg("file".to_string()));
            }

            let created = ctx
                .backend
                .create(&scope, ResourceKind::Asset, json!({ "fields": fields }))
                .await?;
            let processed = process_for_all_locales(ctx, &scope, created).await?;
            CallResult::json(&processed)
        }

        Tool::GetAsset => {
            let asset_id = get_string_arg(&args, "assetId")?;
            let asset = ctx.backend.get(&scope, ResourceKind::Asset, &asset_id).await?;
            CallResult::json(&asset.body)
        }

        Tool::UpdateAsset => {
            let asset_id = get_string_arg(&args, "assetId")?;
            let supplied = supplied_fields(ctx, &args)?;

            let current = ctx.backend.get(&scope, ResourceKind::Asset, &asset_id).await?;
            let mut body = json!({ "fields": merge_fields(fields_of(&current.body), supplied) });
            if let Some(metadata) = current.body.get("metadata") {
                body["metadata"] = metadata.clone();
            }

            let asset = ctx
                .backend
                .update(&scope, ResourceKind::Asset, &asset_id, body, current.version)
                .await?;
            CallResult::json(&asset)
        }

        Tool::DeleteAsset => {
            let asset_id = get_string_arg(&args, "assetId")?;
            delete_resource(ctx, &scope, ResourceKind::Asset, &asset_id).await
        }

        Tool::PublishAsset => {
            let asset_id = get_string_arg(&args, "assetId")?;
            publish_resource(ctx, &scope, ResourceKind::Asset, &asset_id).await
        }

        Tool::UnpublishAsset => {
            let asset_id = get_string_arg(&args, "assetId")?;
            unpublish_resource(ctx, &scope, ResourceKind::Asset, &asset_id).await
        }

        _ => Err(McpError::UnknownTool(tool.name().to_string())),
    }
}

/// Localised `title`/`description`/`file` fields from the caller's arguments.
fn supplied_fields(ctx: &ToolContext<'_>, args: &Map<String, JsonValue>) -> Result<Map<String, JsonValue>> {
    let locale = ctx.config.locale.as_str();
    let mut fields = Map::new();

    if let Some(title) = get_optional_string(args, "title").filter(|t| !t.is_empty()) {
        fields.insert("title".to_string(), json!({ locale: title }));
    }
    if let Some(description) = get_optional_string(args, "description").filter(|d| !d.is_empty()) {
        fields.insert("description".to_string(), json!({ locale: description }));
    }
    if let Some(file) = get_optional_object(args, "file")? {
        fields.insert("file".to_string(), json!({ locale: file }));
    }
    Ok(fields)
}

/// Locales whose file has not been processed yet (no `url`).
fn unprocessed_locales(asset: &JsonValue) -> Vec<String> {
    asset
        .pointer("/fields/file")
        .and_then(|f| f.as_object())
        .map(|files| {
            files
                .iter()
                .filter(|(_, file)| file.get("url").and_then(|u| u.as_str()).is_none())
                .map(|(locale, _)| locale.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Submit every locale's file for processing and wait until all have a URL.
async fn process_for_all_locales(
    ctx: &ToolContext<'_>,
    scope: &Scope,
    created: JsonValue,
) -> Result<JsonValue> {
    let asset_id = created
        .pointer("/sys/id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| McpError::Internal("created asset has no sys.id".to_string()))?;
    let version = Version::read(&created)?;

    let locales = unprocessed_locales(&created);
    if locales.is_empty() {
        return Ok(created);
    }
    for locale in &locales {
        ctx.backend.process_asset(scope, &asset_id, locale, version).await?;
    }

    let policy = ctx.config.processing;
    for check in 1..=policy.checks {
        tokio::time::sleep(policy.wait).await;
        let asset = ctx.backend.get(scope, ResourceKind::Asset, &asset_id).await?;
        if unprocessed_locales(&asset.body).is_empty() {
            tracing::debug!(asset_id = %asset_id, check, "asset processed");
            return Ok(asset.body);
        }
    }

    Err(McpError::AssetProcessing(format!(
        "asset {} was not processed after {} checks",
        asset_id, policy.checks
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unprocessed_locales() {
        let asset = json!({
            "fields": {
                "file": {
                    "en-US": {"fileName": "a.jpg", "url": "//images/a.jpg"},
                    "de-DE": {"fileName": "a.jpg", "upload": "https://example.com/a.jpg"}
                }
            }
        });
        assert_eq!(unprocessed_locales(&asset), vec!["de-DE".to_string()]);
        assert!(unprocessed_locales(&json!({"fields": {}})).is_empty());
    }
}
