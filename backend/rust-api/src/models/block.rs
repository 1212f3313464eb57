use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Discriminator of an authored content block, stored as the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    Text,
    Image,
    Video,
    MultipleChoice,
    OpenQuestion,
    InteractiveChat,
    Other(String),
}

impl BlockKind {
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::MultipleChoice => "multiple-choice",
            BlockKind::OpenQuestion => "open-question",
            BlockKind::InteractiveChat => "interactive-chat",
            BlockKind::Other(kind) => kind.as_str(),
        }
    }
}

impl From<String> for BlockKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => BlockKind::Text,
            "image" => BlockKind::Image,
            "video" => BlockKind::Video,
            "multiple-choice" => BlockKind::MultipleChoice,
            "open-question" => BlockKind::OpenQuestion,
            "interactive-chat" => BlockKind::InteractiveChat,
            _ => BlockKind::Other(value),
        }
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaContent {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultipleChoiceContent {
    pub question: String,
    /// `None` when the field is missing altogether, as opposed to an empty list.
    #[serde(
        deserialize_with = "lenient_string_list_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenQuestionContent {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_answer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractiveChatContent {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_message: Option<String>,
}

/// Payload of a block, one variant per [`BlockKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(TextContent),
    Image(MediaContent),
    Video(MediaContent),
    MultipleChoice(MultipleChoiceContent),
    OpenQuestion(OpenQuestionContent),
    InteractiveChat(InteractiveChatContent),
    Other(Value),
}

impl BlockContent {
    fn from_value(kind: &BlockKind, value: Value) -> Self {
        match kind {
            BlockKind::Text => BlockContent::Text(TextContent {
                text: text_from_value(&value),
            }),
            BlockKind::Image => BlockContent::Image(lenient(value)),
            BlockKind::Video => BlockContent::Video(lenient(value)),
            BlockKind::MultipleChoice => BlockContent::MultipleChoice(lenient(value)),
            BlockKind::OpenQuestion => BlockContent::OpenQuestion(lenient(value)),
            BlockKind::InteractiveChat => BlockContent::InteractiveChat(lenient(value)),
            BlockKind::Other(_) => BlockContent::Other(value),
        }
    }

    fn to_value(&self) -> Value {
        let value = match self {
            BlockContent::Text(text) => return Value::String(text.text.clone()),
            BlockContent::Image(media) | BlockContent::Video(media) => serde_json::to_value(media),
            BlockContent::MultipleChoice(mc) => serde_json::to_value(mc),
            BlockContent::OpenQuestion(open) => serde_json::to_value(open),
            BlockContent::InteractiveChat(chat) => serde_json::to_value(chat),
            BlockContent::Other(raw) => return raw.clone(),
        };
        value.unwrap_or(Value::Null)
    }

    /// Question or instruction text shown to the learner.
    pub fn prompt_text(&self) -> &str {
        match self {
            BlockContent::Text(text) => &text.text,
            BlockContent::Image(media) | BlockContent::Video(media) => {
                media.caption.as_deref().unwrap_or("")
            }
            BlockContent::MultipleChoice(mc) => &mc.question,
            BlockContent::OpenQuestion(open) => &open.question,
            BlockContent::InteractiveChat(chat) => {
                if chat.description.trim().is_empty() {
                    &chat.title
                } else {
                    &chat.description
                }
            }
            BlockContent::Other(raw) => ["question", "instruction", "instructions", "text"]
                .iter()
                .find_map(|key| raw.get(*key).and_then(Value::as_str))
                .unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cefr_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readability_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockMetadata {
    #[serde(deserialize_with = "lenient_string_list")]
    pub progressive_hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_correct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_incorrect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_validation: Option<AiValidation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An authored activity block as persisted by the course-authoring layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawActivityBlock", into = "RawActivityBlock")]
pub struct ActivityBlock {
    pub id: String,
    pub kind: BlockKind,
    pub content: Option<BlockContent>,
    pub metadata: BlockMetadata,
}

impl ActivityBlock {
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        let kind = match &content {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Image(_) => BlockKind::Image,
            BlockContent::Video(_) => BlockKind::Video,
            BlockContent::MultipleChoice(_) => BlockKind::MultipleChoice,
            BlockContent::OpenQuestion(_) => BlockKind::OpenQuestion,
            BlockContent::InteractiveChat(_) => BlockKind::InteractiveChat,
            BlockContent::Other(_) => BlockKind::Other("unknown".to_string()),
        };
        Self {
            id: id.into(),
            kind,
            content: Some(content),
            metadata: BlockMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: BlockMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Wire shape: `{ id, type, content, metadata }` with any field possibly absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawActivityBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    content: Value,
    metadata: Value,
}

impl From<RawActivityBlock> for ActivityBlock {
    fn from(raw: RawActivityBlock) -> Self {
        let kind = BlockKind::from(raw.kind);
        let content = if is_blank(&raw.content) {
            None
        } else {
            Some(BlockContent::from_value(&kind, raw.content))
        };
        let metadata = match raw.metadata {
            Value::Null => BlockMetadata::default(),
            value => lenient(value),
        };
        Self {
            id: raw.id,
            kind,
            content,
            metadata,
        }
    }
}

impl From<ActivityBlock> for RawActivityBlock {
    fn from(block: ActivityBlock) -> Self {
        Self {
            id: block.id,
            kind: block.kind.into(),
            content: block
                .content
                .as_ref()
                .map(BlockContent::to_value)
                .unwrap_or(Value::Null),
            metadata: serde_json::to_value(&block.metadata).unwrap_or(Value::Null),
        }
    }
}

/// `null`, whitespace-only strings and `{}` all mean "no content yet".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Malformed shapes fall back to defaults rather than rejecting the block.
fn lenient<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::debug!("Tolerating malformed block field: {}", e);
        T::default()
    })
}

fn text_from_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => ["text", "body", "html"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Accepts strings, or objects carrying a `text`/`hint` field.
fn string_items(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text),
            Value::Object(map) => ["text", "hint", "label"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string_list_opt(deserializer)?.unwrap_or_default())
}

fn lenient_string_list_opt<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(string_items(items)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_multiple_choice_block() {
        let block: ActivityBlock = serde_json::from_value(json!({
            "id": "b1",
            "type": "multiple-choice",
            "content": {
                "question": "What is 2+2?",
                "options": ["3", {"text": "4"}],
                "correctAnswer": 1
            },
            "metadata": {
                "progressiveHints": ["Count on your fingers"],
                "bloomLevel": "apply"
            }
        }))
        .unwrap();

        assert_eq!(block.kind, BlockKind::MultipleChoice);
        match block.content {
            Some(BlockContent::MultipleChoice(mc)) => {
                assert_eq!(mc.question, "What is 2+2?");
                assert_eq!(mc.options, Some(vec!["3".to_string(), "4".to_string()]));
            }
            other => panic!("unexpected content: {:?}", other),
        }
        assert_eq!(block.metadata.progressive_hints.len(), 1);
        assert_eq!(block.metadata.bloom_level.as_deref(), Some("apply"));
    }

    #[test]
    fn missing_content_and_metadata_default() {
        let block: ActivityBlock =
            serde_json::from_value(json!({"id": "b2", "type": "open-question"})).unwrap();
        assert!(block.content.is_none());
        assert!(block.metadata.progressive_hints.is_empty());
    }

    #[test]
    fn empty_string_or_object_content_is_missing() {
        for content in [json!(""), json!("   "), json!({})] {
            let block: ActivityBlock = serde_json::from_value(json!({
                "id": "b4",
                "type": "text",
                "content": content
            }))
            .unwrap();
            assert!(block.content.is_none(), "content {:?} should be missing", content);
        }
    }

    #[test]
    fn malformed_metadata_is_tolerated() {
        let block: ActivityBlock = serde_json::from_value(json!({
            "id": "b3",
            "type": "open-question",
            "content": {"question": "Why?"},
            "metadata": {"bloomLevel": 7}
        }))
        .unwrap();
        assert!(block.metadata.bloom_level.is_none());
    }

    #[test]
    fn null_hints_become_empty() {
        let metadata: BlockMetadata =
            serde_json::from_value(json!({"progressiveHints": null})).unwrap();
        assert!(metadata.progressive_hints.is_empty());
    }

    #[test]
    fn text_content_accepts_string_or_object() {
        let plain: ActivityBlock =
            serde_json::from_value(json!({"id": "t", "type": "text", "content": "hello"})).unwrap();
        let wrapped: ActivityBlock = serde_json::from_value(
            json!({"id": "t", "type": "text", "content": {"text": "hello"}}),
        )
        .unwrap();
        assert_eq!(plain.content, wrapped.content);
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let block: ActivityBlock = serde_json::from_value(json!({
            "id": "x",
            "type": "drag-and-drop",
            "content": {"instruction": "Sort the items"}
        }))
        .unwrap();
        assert_eq!(block.kind, BlockKind::Other("drag-and-drop".to_string()));
        assert_eq!(block.content.unwrap().prompt_text(), "Sort the items");

        let back = serde_json::to_value(ActivityBlock::new(
            "y",
            BlockContent::Text(TextContent {
                text: "intro".to_string(),
            }),
        ))
        .unwrap();
        assert_eq!(back["type"], "text");
        assert_eq!(back["content"], "intro");
    }
}
