//! Outbound LINE message objects.

use serde::{Deserialize, Serialize};

pub const MAX_COLUMNS: usize = 5;
pub const MAX_TITLE_CHARS: usize = 40;
pub const MAX_COLUMN_TEXT_CHARS: usize = 60;
pub const MAX_CONFIRM_TEXT_CHARS: usize = 240;
pub const MAX_ALT_TEXT_CHARS: usize = 400;
pub const MAX_ACTION_LABEL_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Template {
        alt_text: String,
        template: Template,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn carousel(alt_text: &str, columns: Vec<CarouselColumn>) -> Self {
        Self::Template {
            alt_text: truncate_chars(alt_text, MAX_ALT_TEXT_CHARS),
            template: Template::Carousel { columns },
        }
    }

    pub fn confirm(alt_text: &str, text: &str, actions: [Action; 2]) -> Self {
        Self::Template {
            alt_text: truncate_chars(alt_text, MAX_ALT_TEXT_CHARS),
            template: Template::Confirm {
                text: truncate_chars(text, MAX_CONFIRM_TEXT_CHARS),
                actions: actions.into(),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Template { .. } => None,
        }
    }

    pub fn columns(&self) -> Option<&[CarouselColumn]> {
        match self {
            Self::Template {
                template: Template::Carousel { columns },
                ..
            } => Some(columns),
            _ => None,
        }
    }

    pub fn alt_text(&self) -> Option<&str> {
        match self {
            Self::Template { alt_text, .. } => Some(alt_text),
            Self::Text { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Template {
    Carousel { columns: Vec<CarouselColumn> },
    Confirm { text: String, actions: Vec<Action> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselColumn {
    pub thumbnail_image_url: String,
    pub title: String,
    pub text: String,
    pub actions: Vec<Action>,
}

impl CarouselColumn {
    pub fn new(thumbnail_image_url: String, title: &str, text: &str, actions: Vec<Action>) -> Self {
        Self {
            thumbnail_image_url,
            title: truncate_chars(title, MAX_TITLE_CHARS),
            text: truncate_chars(text, MAX_COLUMN_TEXT_CHARS),
            actions,
        }
    }

    /// One line of the carousel's alternative text.
    pub fn summary_line(&self) -> String {
        format!("{} [{}]", self.title, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Uri { label: String, uri: String },
    Postback { label: String, data: String },
    Message { label: String, text: String },
}

impl Action {
    pub fn uri(label: &str, uri: impl Into<String>) -> Self {
        Self::Uri {
            label: truncate_chars(label, MAX_ACTION_LABEL_CHARS),
            uri: uri.into(),
        }
    }

    pub fn postback(label: &str, data: impl Into<String>) -> Self {
        Self::Postback {
            label: truncate_chars(label, MAX_ACTION_LABEL_CHARS),
            data: data.into(),
        }
    }

    pub fn message(label: &str, text: impl Into<String>) -> Self {
        Self::Message {
            label: truncate_chars(label, MAX_ACTION_LABEL_CHARS),
            text: text.into(),
        }
    }
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_serialization() {
        let value = serde_json::to_value(OutboundMessage::text("hi")).expect("serialize");
        assert_eq!(value, json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn test_carousel_serialization() {
        let column = CarouselColumn::new(
            "https://bot.example.com/image?key=k".into(),
            "Alice",
            "93.10",
            vec![Action::uri("@alice", "https://twitter.com/alice")],
        );
        let value = serde_json::to_value(OutboundMessage::carousel("Alice [93.10]", vec![column]))
            .expect("serialize");

        assert_eq!(
            value,
            json!({
                "type": "template",
                "altText": "Alice [93.10]",
                "template": {
                    "type": "carousel",
                    "columns": [{
                        "thumbnailImageUrl": "https://bot.example.com/image?key=k",
                        "title": "Alice",
                        "text": "93.10",
                        "actions": [{"type": "uri", "label": "@alice", "uri": "https://twitter.com/alice"}]
                    }]
                }
            })
        );
    }

    #[test]
    fn test_confirm_serialization() {
        let message = OutboundMessage::confirm(
            "updated",
            "id:4 updated",
            [Action::postback("No", "reject:4,9"), Action::message("OK", "OK")],
        );
        let value = serde_json::to_value(message).expect("serialize");

        assert_eq!(value["template"]["type"], "confirm");
        assert_eq!(value["template"]["actions"][0]["data"], "reject:4,9");
        assert_eq!(value["template"]["actions"][1]["type"], "message");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("顔認識ボット", 2), "顔認");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn test_column_fields_truncated() {
        let long = "x".repeat(100);
        let column = CarouselColumn::new(String::new(), &long, &long, vec![]);

        assert_eq!(column.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(column.text.chars().count(), MAX_COLUMN_TEXT_CHARS);
    }
}
