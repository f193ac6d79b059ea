//! AI response payloads, keyed by their `display_type` discriminant.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// The `display_type` discriminant of an AI response envelope.
///
/// Unrecognized discriminants are kept verbatim in [`DisplayType::Other`] so
/// newer payload shapes still flow through instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayType {
    TextMessage,
    ExamQuestions,
    SummaryReport,
    Other(String),
}

impl DisplayType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "text_message" => Self::TextMessage,
            "exam_questions" => Self::ExamQuestions,
            "summary_report" => Self::SummaryReport,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::TextMessage => "text_message",
            Self::ExamQuestions => "exam_questions",
            Self::SummaryReport => "summary_report",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for DisplayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, renderable AI response.
///
/// Only [`crate::classify`] builds these from raw envelopes, so a
/// `ResponsePayload` always satisfies the render predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    TextMessage { content: String },
    ExamQuestions { content: Value },
    SummaryReport { content: Value },
    /// Pass-through for discriminants this client does not know yet.
    Other { display_type: String, content: Value },
}

impl ResponsePayload {
    pub fn display_type(&self) -> DisplayType {
        match self {
            Self::TextMessage { .. } => DisplayType::TextMessage,
            Self::ExamQuestions { .. } => DisplayType::ExamQuestions,
            Self::SummaryReport { .. } => DisplayType::SummaryReport,
            Self::Other { display_type, .. } => DisplayType::Other(display_type.clone()),
        }
    }

    /// The structured body of the payload, i.e. `content.data` when the
    /// backend wrapped it, otherwise `content` itself. Text payloads have none.
    pub fn structured_data(&self) -> Option<&Value> {
        match self {
            Self::TextMessage { .. } => None,
            Self::ExamQuestions { content }
            | Self::SummaryReport { content }
            | Self::Other { content, .. } => Some(unwrap_data(content)),
        }
    }
}

/// `content.data` when present and non-null, otherwise `content`.
pub(crate) fn unwrap_data(content: &Value) -> &Value {
    match content.get("data") {
        Some(data) if !data.is_null() => data,
        _ => content,
    }
}

impl Serialize for ResponsePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResponsePayload", 2)?;
        match self {
            Self::TextMessage { content } => {
                state.serialize_field("display_type", "text_message")?;
                state.serialize_field("content", content)?;
            }
            Self::ExamQuestions { content } => {
                state.serialize_field("display_type", "exam_questions")?;
                state.serialize_field("content", content)?;
            }
            Self::SummaryReport { content } => {
                state.serialize_field("display_type", "summary_report")?;
                state.serialize_field("content", content)?;
            }
            Self::Other {
                display_type,
                content,
            } => {
                state.serialize_field("display_type", display_type)?;
                state.serialize_field("content", content)?;
            }
        }
        state.end()
    }
}
