//! Decide whether a raw AI response envelope is worth rendering.
//!
//! Classification is total: any JSON value (or none at all) yields either a
//! renderable [`ResponsePayload`] or a [`SkipReason`], never a panic.

use serde_json::Value;

use crate::payload::{DisplayType, ResponsePayload, unwrap_data};

/// Outcome of classifying one envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Render(ResponsePayload),
    Skip(SkipReason),
}

impl Classification {
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

/// Why an envelope was judged non-renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No envelope, or a JSON `null`.
    Missing,
    /// Not an object, or no string `display_type`.
    NoDisplayType,
    /// A `text_message` whose content is not a string with visible characters.
    BlankText,
    /// A structured payload whose data is not a non-empty array or object.
    EmptyData,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing envelope",
            Self::NoDisplayType => "no display_type",
            Self::BlankText => "blank text message",
            Self::EmptyData => "empty structured data",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(envelope: Option<&Value>) -> Classification {
    let envelope = match envelope {
        None | Some(Value::Null) => return Classification::Skip(SkipReason::Missing),
        Some(envelope) => envelope,
    };
    let Some(display_type) = envelope.get("display_type").and_then(Value::as_str) else {
        return Classification::Skip(SkipReason::NoDisplayType);
    };
    let content = envelope.get("content").cloned().unwrap_or(Value::Null);

    match DisplayType::parse(display_type) {
        DisplayType::TextMessage => match content {
            Value::String(text) if !text.trim().is_empty() => {
                Classification::Render(ResponsePayload::TextMessage { content: text })
            }
            _ => Classification::Skip(SkipReason::BlankText),
        },
        DisplayType::ExamQuestions if has_data(&content) => {
            Classification::Render(ResponsePayload::ExamQuestions { content })
        }
        DisplayType::SummaryReport if has_data(&content) => {
            Classification::Render(ResponsePayload::SummaryReport { content })
        }
        DisplayType::ExamQuestions | DisplayType::SummaryReport => {
            Classification::Skip(SkipReason::EmptyData)
        }
        DisplayType::Other(display_type) => Classification::Render(ResponsePayload::Other {
            display_type,
            content,
        }),
    }
}

/// `true` when [`classify`] would produce a renderable payload.
pub fn should_render(envelope: Option<&Value>) -> bool {
    classify(envelope).is_render()
}

fn has_data(content: &Value) -> bool {
    match unwrap_data(content) {
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        _ => false,
    }
}
