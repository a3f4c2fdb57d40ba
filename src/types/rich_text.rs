use super::Color;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// The kind of rich text content, tagged by the API's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextContent {
    Text { text: TextContent },
    /// Mentions are kept verbatim; their shape varies by mention type.
    Mention { mention: Value },
    Equation { equation: EquationData },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationData {
    pub expression: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

impl Annotations {
    fn is_plain(&self) -> bool {
        !self.bold
            && !self.italic
            && !self.strikethrough
            && !self.underline
            && !self.code
            && !self.color.is_significant()
    }
}

/// One formatted segment of a rich text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    #[serde(flatten)]
    pub content: RichTextContent,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

impl RichTextItem {
    /// Create a plain text item — the most common rich text variant.
    pub fn plain_text(text: &str) -> Self {
        Self {
            content: RichTextContent::Text {
                text: TextContent {
                    content: text.to_string(),
                    link: None,
                },
            },
            annotations: Annotations::default(),
            plain_text: text.to_string(),
            href: None,
        }
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if let RichTextContent::Text { text } = &mut self.content {
            text.link = Some(Link { url: url.clone() });
        }
        self.href = Some(url);
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// The visible text of this segment.
    ///
    /// Falls back to the text content when `plain_text` is absent, which is
    /// the case for items built locally rather than returned by the API.
    pub fn text(&self) -> &str {
        match &self.content {
            RichTextContent::Text { text } if self.plain_text.is_empty() => &text.content,
            RichTextContent::Equation { equation } if self.plain_text.is_empty() => {
                &equation.expression
            }
            _ => &self.plain_text,
        }
    }

    /// Link target of a text segment, if any.
    pub fn link(&self) -> Option<&str> {
        match &self.content {
            RichTextContent::Text {
                text: TextContent {
                    link: Some(link), ..
                },
            } => Some(&link.url),
            _ => None,
        }
    }

    /// Request-body shape of this segment.
    ///
    /// Read-only fields (`plain_text`, `href`) are never sent, and
    /// annotations are emitted only when they carry formatting.
    pub fn to_request_json(&self) -> Value {
        let mut item = match &self.content {
            RichTextContent::Text { text } => {
                let mut body = json!({ "content": text.content });
                if let Some(link) = &text.link {
                    body["link"] = json!({ "url": link.url });
                }
                json!({ "type": "text", "text": body })
            }
            RichTextContent::Mention { mention } => json!({ "type": "mention", "mention": mention }),
            RichTextContent::Equation { equation } => {
                json!({ "type": "equation", "equation": { "expression": equation.expression } })
            }
        };

        if !self.annotations.is_plain() {
            let mut annotations = Map::new();
            let flags = [
                ("bold", self.annotations.bold),
                ("italic", self.annotations.italic),
                ("strikethrough", self.annotations.strikethrough),
                ("underline", self.annotations.underline),
                ("code", self.annotations.code),
            ];
            for (name, on) in flags {
                if on {
                    annotations.insert(name.to_string(), Value::Bool(true));
                }
            }
            if self.annotations.color.is_significant() {
                annotations.insert(
                    "color".to_string(),
                    Value::String(self.annotations.color.as_str().to_string()),
                );
            }
            item["annotations"] = Value::Object(annotations);
        }

        item
    }
}

/// A rich text value: an ordered list of formatted segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<RichTextItem>);

impl RichText {
    pub fn new(items: Vec<RichTextItem>) -> Self {
        Self(items)
    }

    /// A single unformatted segment; empty input yields an empty value.
    pub fn plain(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if text.is_empty() {
            Self::default()
        } else {
            Self(vec![RichTextItem::plain_text(text)])
        }
    }

    /// Concatenated text of all segments.
    pub fn plain_text(&self) -> String {
        self.0.iter().map(RichTextItem::text).collect()
    }

    pub fn items(&self) -> &[RichTextItem] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_request_json(&self) -> Value {
        Value::Array(self.0.iter().map(RichTextItem::to_request_json).collect())
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plain_text())
    }
}

impl From<&str> for RichText {
    fn from(s: &str) -> Self {
        Self::plain(s)
    }
}

impl From<String> for RichText {
    fn from(s: String) -> Self {
        Self::plain(s)
    }
}
