//! Rich-text field conversion.
//!
//! Entry fields declared as `RichText` must be sent to the backend as a
//! structured document. Callers usually supply markdown strings, so those are
//! converted here. Conversion never fails from the caller's point of view: a
//! string that cannot be converted becomes a single plain paragraph.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};
use serde_json::{json, Map, Value as JsonValue};

/// Field type that carries a rich-text document.
pub const RICH_TEXT: &str = "RichText";

/// Attempts made before falling back to a plain paragraph.
const CONVERSION_ATTEMPTS: usize = 2;

/// Markdown could not be turned into a document.
#[derive(Debug, Clone, thiserror::Error)]
#[error("rich text conversion failed: {0}")]
pub struct ConversionError(pub String);

/// Converts markdown text into a rich-text document.
pub trait RichTextConverter: Send + Sync {
    /// Convert `markdown` into a `{nodeType: "document", ...}` value.
    fn to_document(&self, markdown: &str) -> Result<JsonValue, ConversionError>;
}

/// [`RichTextConverter`] backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl RichTextConverter for MarkdownConverter {
    fn to_document(&self, markdown: &str) -> Result<JsonValue, ConversionError> {
        let mut builder = DocumentBuilder::new();
        for event in Parser::new(markdown) {
            builder.push(event)?;
        }
        builder.finish()
    }
}

/// True if `value` is already a rich-text document.
pub fn is_document(value: &JsonValue) -> bool {
    value.get("nodeType").and_then(|v| v.as_str()) == Some("document")
}

/// Minimal valid document holding `text` as one plain paragraph.
pub fn fallback_document(text: &str) -> JsonValue {
    json!({
        "nodeType": "document",
        "data": {},
        "content": [{
            "nodeType": "paragraph",
            "data": {},
            "content": [text_node(text, &[])]
        }]
    })
}

/// Convert one locale value for a field of type `field_type`.
///
/// Only `RichText` string values are touched; documents and everything else
/// pass through unchanged.
pub fn convert_value(value: JsonValue, field_type: &str, converter: &dyn RichTextConverter) -> JsonValue {
    if field_type != RICH_TEXT || is_document(&value) {
        return value;
    }
    let text = match value.as_str() {
        Some(text) => text,
        None => return value,
    };

    for attempt in 1..=CONVERSION_ATTEMPTS {
        match converter.to_document(text) {
            Ok(doc) => return doc,
            Err(e) => tracing::warn!(attempt, error = %e, "rich text conversion failed"),
        }
    }
    tracing::warn!("falling back to a plain paragraph document");
    fallback_document(text)
}

/// Convert every `RichText` field in `fields`, locale by locale.
///
/// `content_type_fields` is the `fields` array of the entry's content type;
/// only its `id` and `type` members are read.
pub fn process_fields(
    mut fields: Map<String, JsonValue>,
    content_type_fields: &[JsonValue],
    converter: &dyn RichTextConverter,
) -> Map<String, JsonValue> {
    for definition in content_type_fields {
        let id = match definition.get("id").and_then(|v| v.as_str()) {
            Some(id) => id,
            None => continue,
        };
        if definition.get("type").and_then(|v| v.as_str()) != Some(RICH_TEXT) {
            continue;
        }
        if let Some(JsonValue::Object(locales)) = fields.get_mut(id) {
            for value in locales.values_mut() {
                *value = convert_value(value.take(), RICH_TEXT, converter);
            }
        }
    }
    fields
}

fn text_node(value: &str, marks: &[&str]) -> JsonValue {
    let marks: Vec<JsonValue> = marks.iter().map(|m| json!({"type": m})).collect();
    json!({
        "nodeType": "text",
        "value": value,
        "marks": marks,
        "data": {}
    })
}

fn is_inline(node: &JsonValue) -> bool {
    matches!(
        node.get("nodeType").and_then(|v| v.as_str()),
        Some("text") | Some("hyperlink")
    )
}

/// Wrap runs of inline nodes in paragraphs so block containers only hold blocks.
fn wrap_inline(content: Vec<JsonValue>) -> Vec<JsonValue> {
    let mut blocks = Vec::with_capacity(content.len());
    let mut run = Vec::new();
    for node in content {
        if is_inline(&node) {
            run.push(node);
            continue;
        }
        if !run.is_empty() {
            blocks.push(json!({"nodeType": "paragraph", "data": {}, "content": std::mem::take(&mut run)}));
        }
        blocks.push(node);
    }
    if !run.is_empty() {
        blocks.push(json!({"nodeType": "paragraph", "data": {}, "content": run}));
    }
    blocks
}

struct Node {
    node_type: String,
    data: JsonValue,
    content: Vec<JsonValue>,
}

impl Node {
    fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            data: json!({}),
            content: Vec::new(),
        }
    }

    fn into_value(self) -> JsonValue {
        let content = match self.node_type.as_str() {
            "document" | "list-item" | "blockquote" => wrap_inline(self.content),
            _ => self.content,
        };
        json!({
            "nodeType": self.node_type,
            "data": self.data,
            "content": content
        })
    }
}

enum Frame {
    Node(Node),
    Mark,
    Code,
    Transparent,
}

struct DocumentBuilder {
    frames: Vec<Frame>,
    marks: Vec<&'static str>,
}

impl DocumentBuilder {
    fn new() -> Self {
        Self {
            frames: vec![Frame::Node(Node::new("document"))],
            marks: Vec::new(),
        }
    }

    fn push(&mut self, event: Event<'_>) -> Result<(), ConversionError> {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close()?,
            Event::Text(text) => self.text(&text, None),
            Event::Code(text) => self.text(&text, Some("code")),
            Event::Html(text) | Event::InlineHtml(text) => self.text(&text, None),
            Event::SoftBreak => self.text(" ", None),
            Event::HardBreak => self.text("\n", None),
            Event::Rule => self.attach(Node::new("hr").into_value()),
            _ => {}
        }
        Ok(())
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Node(Node::new("paragraph")),
            Tag::Heading { level, .. } => Frame::Node(Node::new(heading_type(level))),
            Tag::BlockQuote(_) => Frame::Node(Node::new("blockquote")),
            Tag::CodeBlock(_) => {
                self.marks.push("code");
                self.frames.push(Frame::Code);
                Frame::Node(Node::new("paragraph"))
            }
            Tag::List(Some(_)) => Frame::Node(Node::new("ordered-list")),
            Tag::List(None) => Frame::Node(Node::new("unordered-list")),
            Tag::Item => Frame::Node(Node::new("list-item")),
            Tag::Emphasis => {
                self.marks.push("italic");
                Frame::Mark
            }
            Tag::Strong => {
                self.marks.push("bold");
                Frame::Mark
            }
            Tag::Link { dest_url, .. } => {
                let mut node = Node::new("hyperlink");
                node.data = json!({"uri": dest_url.to_string()});
                Frame::Node(node)
            }
            _ => Frame::Transparent,
        };
        self.frames.push(frame);
    }

    fn close(&mut self) -> Result<(), ConversionError> {
        if self.frames.len() <= 1 {
            return Err(ConversionError("unbalanced markdown structure".to_string()));
        }
        match self.frames.pop() {
            Some(Frame::Node(node)) => {
                self.attach(node.into_value());
                // a code block closes its paragraph and the code frame together
                if let Some(Frame::Code) = self.frames.last() {
                    self.frames.pop();
                    self.marks.pop();
                }
            }
            Some(Frame::Mark) => {
                self.marks.pop();
            }
            Some(Frame::Code) | Some(Frame::Transparent) | None => {}
        }
        Ok(())
    }

    fn text(&mut self, value: &str, extra_mark: Option<&'static str>) {
        let mut marks = self.marks.clone();
        if let Some(mark) = extra_mark {
            marks.push(mark);
        }
        self.attach(text_node(value, &marks));
    }

    fn attach(&mut self, node: JsonValue) {
        for frame in self.frames.iter_mut().rev() {
            if let Frame::Node(parent) = frame {
                parent.content.push(node);
                return;
            }
        }
    }

    fn finish(mut self) -> Result<JsonValue, ConversionError> {
        if self.frames.len() != 1 {
            return Err(ConversionError("unterminated markdown structure".to_string()));
        }
        match self.frames.pop() {
            Some(Frame::Node(doc)) => Ok(doc.into_value()),
            _ => Err(ConversionError("missing document root".to_string())),
        }
    }
}

fn heading_type(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "heading-1",
        HeadingLevel::H2 => "heading-2",
        HeadingLevel::H3 => "heading-3",
        HeadingLevel::H4 => "heading-4",
        HeadingLevel::H5 => "heading-5",
        HeadingLevel::H6 => "heading-6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingConverter {
        calls: AtomicUsize,
    }

    impl RichTextConverter for FailingConverter {
        fn to_document(&self, _markdown: &str) -> Result<JsonValue, ConversionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ConversionError("forced".to_string()))
        }
    }

    fn node_types(doc: &JsonValue) -> Vec<String> {
        doc["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["nodeType"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_paragraph_and_heading() {
        let doc = MarkdownConverter.to_document("# Title\n\nHello world").unwrap();
        assert!(is_document(&doc));
        assert_eq!(node_types(&doc), vec!["heading-1", "paragraph"]);
        assert_eq!(doc["content"][1]["content"][0]["value"], "Hello world");
    }

    #[test]
    fn test_marks() {
        let doc = MarkdownConverter.to_document("**bold** and *it* and `code`").unwrap();
        let texts = doc["content"][0]["content"].as_array().unwrap();
        assert_eq!(texts[0]["marks"], json!([{"type": "bold"}]));
        assert_eq!(texts[2]["marks"], json!([{"type": "italic"}]));
        assert_eq!(texts[4]["marks"], json!([{"type": "code"}]));
        assert_eq!(texts[1]["marks"], json!([]));
    }

    #[test]
    fn test_lists_wrap_items_in_paragraphs() {
        let doc = MarkdownConverter.to_document("- one\n- two\n\n1. first").unwrap();
        assert_eq!(node_types(&doc), vec!["unordered-list", "ordered-list"]);
        let item = &doc["content"][0]["content"][0];
        assert_eq!(item["nodeType"], "list-item");
        assert_eq!(item["content"][0]["nodeType"], "paragraph");
        assert_eq!(item["content"][0]["content"][0]["value"], "one");
    }

    #[test]
    fn test_link_rule_and_quote() {
        let doc = MarkdownConverter
            .to_document("[site](https://example.com)\n\n---\n\n> quoted")
            .unwrap();
        assert_eq!(node_types(&doc), vec!["paragraph", "hr", "blockquote"]);
        let link = &doc["content"][0]["content"][0];
        assert_eq!(link["nodeType"], "hyperlink");
        assert_eq!(link["data"]["uri"], "https://example.com");
        assert_eq!(link["content"][0]["value"], "site");
    }

    #[test]
    fn test_code_block_is_code_marked_paragraph() {
        let doc = MarkdownConverter.to_document("```\nlet x = 1;\n```").unwrap();
        assert_eq!(node_types(&doc), vec!["paragraph"]);
        assert_eq!(doc["content"][0]["content"][0]["marks"], json!([{"type": "code"}]));
    }

    #[test]
    fn test_non_rich_text_untouched() {
        let value = json!("plain");
        assert_eq!(convert_value(value.clone(), "Text", &MarkdownConverter), value);
    }

    #[test]
    fn test_document_not_converted_twice() {
        let doc = fallback_document("already");
        let converter = FailingConverter { calls: AtomicUsize::new(0) };
        assert_eq!(convert_value(doc.clone(), RICH_TEXT, &converter), doc);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failing_conversion_falls_back() {
        let converter = FailingConverter { calls: AtomicUsize::new(0) };
        let result = convert_value(json!("some *text*"), RICH_TEXT, &converter);
        assert_eq!(result, fallback_document("some *text*"));
        assert_eq!(converter.calls.load(Ordering::SeqCst), CONVERSION_ATTEMPTS);
    }

    #[test]
    fn test_process_fields_per_locale() {
        let fields = json!({
            "body": {"en-US": "# Hi", "de-DE": "Hallo"},
            "title": {"en-US": "# not rich"}
        });
        let definitions = vec![
            json!({"id": "body", "type": "RichText"}),
            json!({"id": "title", "type": "Symbol"}),
        ];
        let out = process_fields(fields.as_object().cloned().unwrap(), &definitions, &MarkdownConverter);
        assert!(is_document(&out["body"]["en-US"]));
        assert!(is_document(&out["body"]["de-DE"]));
        assert_eq!(out["title"]["en-US"], "# not rich");
    }
}
