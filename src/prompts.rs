//! Canned prompt catalogue served over `prompts/list` and `prompts/get`.

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::args::get_string_arg;
use crate::error::{McpError, Result};

/// One prompt argument.
#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    /// Argument name
    pub name: &'static str,
    /// Argument description
    pub description: &'static str,
    /// Whether the argument must be supplied
    pub required: bool,
}

/// A prompt advertised by `prompts/list`.
#[derive(Debug, Clone, Serialize)]
pub struct PromptDef {
    /// Prompt name
    pub name: &'static str,
    /// Prompt description
    pub description: &'static str,
    /// Accepted arguments
    pub arguments: Vec<PromptArgument>,
}

fn required(name: &'static str, description: &'static str) -> PromptArgument {
    PromptArgument {
        name,
        description,
        required: true,
    }
}

/// All prompts, in advertisement order.
pub fn prompts() -> Vec<PromptDef> {
    vec![
        PromptDef {
            name: "explain-api-concepts",
            description: "Explain Contentful API concepts and relationships",
            arguments: vec![required(
                "concept",
                "Contentful concept (Space/Environment/ContentType/Entry/Asset)",
            )],
        },
        PromptDef {
            name: "space-identification",
            description: "Guide for identifying the correct Contentful space for operations",
            arguments: vec![required("operation", "Operation you want to perform")],
        },
        PromptDef {
            name: "content-modeling-guide",
            description: "Guide through content modeling decisions and best practices",
            arguments: vec![required("useCase", "Description of the content modeling scenario")],
        },
        PromptDef {
            name: "api-operation-help",
            description: "Get detailed help for specific Contentful API operations",
            arguments: vec![
                required("operation", "Type of operation (CRUD, publish, archive, etc)"),
                required("resourceType", "Type of resource (Entry/Asset/ContentType)"),
            ],
        },
    ]
}

fn text_message(role: &str, text: String) -> JsonValue {
    json!({
        "role": role,
        "content": { "type": "text", "text": text }
    })
}

/// Render a prompt's messages.
pub fn get_prompt(name: &str, args: &Map<String, JsonValue>) -> Result<JsonValue> {
    let (assistant, user) = match name {
        "explain-api-concepts" => (
            "I am a Contentful API expert. I'll explain key concepts and their relationships.",
            format!(
                "Please explain the Contentful concept: {}",
                get_string_arg(args, "concept")?
            ),
        ),
        "space-identification" => (
            "I am a Contentful space expert. I'll help you identify the space and environment an operation should target.",
            format!(
                "Help me identify the correct space for this operation: {}",
                get_string_arg(args, "operation")?
            ),
        ),
        "content-modeling-guide" => (
            "I am a Contentful content modeling expert. I'll help you design your content structure.",
            format!(
                "Help me design a content model for this use case: {}",
                get_string_arg(args, "useCase")?
            ),
        ),
        "api-operation-help" => (
            "I am a Contentful API operations expert. I'll help you understand and implement API operations.",
            format!(
                "Explain how to perform a {} operation on a {}",
                get_string_arg(args, "operation")?,
                get_string_arg(args, "resourceType")?
            ),
        ),
        _ => {
            return Err(McpError::InvalidArg {
                name: "name".to_string(),
                reason: format!("unknown prompt: {}", name),
            })
        }
    };

    let description = prompts()
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.description)
        .unwrap_or_default();

    Ok(json!({
        "description": description,
        "messages": [
            text_message("assistant", assistant.to_string()),
            text_message("user", user),
        ]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_prompt_renders() {
        let mut args = Map::new();
        for key in ["concept", "operation", "useCase", "resourceType"] {
            args.insert(key.to_string(), json!("Entry"));
        }
        for prompt in prompts() {
            let rendered = get_prompt(prompt.name, &args).unwrap();
            assert_eq!(rendered["messages"].as_array().unwrap().len(), 2);
            assert_eq!(rendered["messages"][0]["role"], "assistant");
        }
    }

    #[test]
    fn test_api_operation_help_text() {
        let mut args = Map::new();
        args.insert("operation".to_string(), json!("publish"));
        args.insert("resourceType".to_string(), json!("Asset"));
        let rendered = get_prompt("api-operation-help", &args).unwrap();
        assert_eq!(
            rendered["messages"][1]["content"]["text"],
            "Explain how to perform a publish operation on a Asset"
        );
    }

    #[test]
    fn test_unknown_prompt_and_missing_argument() {
        let err = get_prompt("nope", &Map::new()).unwrap_err();
        assert!(matches!(err, McpError::InvalidArg { .. }));

        let err = get_prompt("explain-api-concepts", &Map::new()).unwrap_err();
        assert!(matches!(err, McpError::MissingArg(_)));
    }
}
