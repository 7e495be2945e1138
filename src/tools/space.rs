//! Space and environment management tools.
//!
//! Tools: list_spaces, get_space, list_environments, create_environment,
//!        delete_environment
//!
//! The whole group is left out of the advertised set when both space and
//! environment are pinned.

use serde_json::{Map, Value as JsonValue};

use crate::args::get_string_arg;
use crate::config::Scope;
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::{CallResult, Tool, ToolContext, ToolDef};

/// Get all space and environment tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            Tool::ListSpaces,
            "List all available spaces",
            schema!(object {}),
        ),
        ToolDef::new(
            Tool::GetSpace,
            "Get details of a space",
            schema!(object {
                required: { "spaceId": string }
            }),
        ),
        ToolDef::new(
            Tool::ListEnvironments,
            "List all environments in a space",
            schema!(object {
                required: { "spaceId": string }
            }),
        ),
        ToolDef::new(
            Tool::CreateEnvironment,
            "Create a new environment",
            schema!(object {
                required: { "spaceId": string, "environmentId": string, "name": string }
            }),
        ),
        ToolDef::new(
            Tool::DeleteEnvironment,
            "Delete an environment",
            schema!(object {
                required: { "spaceId": string, "environmentId": string }
            }),
        ),
    ]
}

/// Dispatch a space or environment tool call.
pub async fn dispatch(
    ctx: &ToolContext<'_>,
    tool: Tool,
    args: Map<String, JsonValue>,
) -> Result<CallResult> {
    let pinned = &ctx.config.pinned;

    match tool {
        Tool::ListSpaces => {
            let spaces = ctx.backend.list_spaces().await?;
            CallResult::json(&spaces)
        }

        Tool::GetSpace => {
            let space_id = pinned.space(&args)?;
            let space = ctx.backend.get_space(&space_id).await?;
            CallResult::json(&space)
        }

        Tool::ListEnvironments => {
            let space_id = pinned.space(&args)?;
            let environments = ctx.backend.list_environments(&space_id).await?;
            CallResult::json(&environments)
        }

        Tool::CreateEnvironment => {
            let scope = target_environment(ctx, &args)?;
            let name = get_string_arg(&args, "name")?;
            let environment = ctx.backend.create_environment(&scope, &name).await?;
            CallResult::json(&environment)
        }

        Tool::DeleteEnvironment => {
            let scope = target_environment(ctx, &args)?;
            let current = ctx.backend.get_environment(&scope).await?;
            ctx.backend.delete_environment(&scope, current.version).await?;
            Ok(CallResult::text(format!(
                "Environment {} deleted successfully",
                scope.environment_id
            )))
        }

        _ => Err(McpError::UnknownTool(tool.name().to_string())),
    }
}

/// Space from the pinned scope, environment always from the caller.
///
/// `environmentId` names the environment being created or deleted here, so a
/// pinned environment does not apply.
fn target_environment(ctx: &ToolContext<'_>, args: &Map<String, JsonValue>) -> Result<Scope> {
    let space_id = ctx.config.pinned.space(args)?;
    let environment_id = get_string_arg(args, "environmentId")?;
    Ok(Scope::new(space_id, environment_id))
}
