use cookai_core::{ChatMessage, ResponsePayload};
use serde_json::Value;

/// Render one transcript entry as terminal text.
pub fn render_message(message: &ChatMessage) -> String {
    match message {
        ChatMessage::User { text } => format!("> {text}"),
        ChatMessage::Ai { payload } => render_payload(payload),
        ChatMessage::Error { text } => format!("Error: {text}"),
        ChatMessage::Info { text } => format!("[{text}]"),
    }
}

pub fn render_payload(payload: &ResponsePayload) -> String {
    match payload {
        ResponsePayload::TextMessage { content } => content.clone(),
        ResponsePayload::ExamQuestions { .. } => {
            let data = payload.structured_data().unwrap_or(&Value::Null);
            format!("Exam questions:\n{}", render_list(data))
        }
        ResponsePayload::SummaryReport { .. } => {
            let data = payload.structured_data().unwrap_or(&Value::Null);
            format!("Summary:\n{}", render_value(data))
        }
        ResponsePayload::Other { display_type, .. } => {
            let data = payload.structured_data().unwrap_or(&Value::Null);
            format!("[{display_type}]\n{}", render_value(data))
        }
    }
}

/// Numbered list for arrays; anything else falls back to [`render_value`].
fn render_list(data: &Value) -> String {
    let Value::Array(items) = data else {
        return render_value(data);
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let body = render_value(item);
            let mut lines = body.lines();
            let first = lines.next().unwrap_or_default();
            let mut out = format!("{:>3}. {first}", i + 1);
            for line in lines {
                out.push_str("\n     ");
                out.push_str(line);
            }
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_entries() {
        assert_eq!(render_message(&ChatMessage::user("Q1")), "> Q1");
        assert_eq!(
            render_message(&ChatMessage::error("Could not reach the server.")),
            "Error: Could not reach the server."
        );
        assert_eq!(
            render_message(&ChatMessage::info("Generation cancelled.")),
            "[Generation cancelled.]"
        );
    }

    #[test]
    fn text_answer_is_printed_verbatim() {
        let message = ChatMessage::ai(ResponsePayload::TextMessage {
            content: "Chapter 2 covers recursion.".to_string(),
        });
        assert_eq!(render_message(&message), "Chapter 2 covers recursion.");
    }

    #[test]
    fn exam_questions_are_numbered() {
        let payload = ResponsePayload::ExamQuestions {
            content: json!({"data": ["What is a stack?", "Define recursion."]}),
        };
        assert_eq!(
            render_payload(&payload),
            "Exam questions:\n  1. What is a stack?\n  2. Define recursion."
        );
    }

    #[test]
    fn structured_questions_are_indented() {
        let payload = ResponsePayload::ExamQuestions {
            content: json!([{"q": "A?"}]),
        };
        let rendered = render_payload(&payload);
        assert!(rendered.starts_with("Exam questions:\n  1. {"));
        assert!(rendered.contains("\n       \"q\": \"A?\""));
    }

    #[test]
    fn unknown_display_type_is_labelled() {
        let payload = ResponsePayload::Other {
            display_type: "flashcards".to_string(),
            content: json!({"data": "front/back"}),
        };
        assert_eq!(render_payload(&payload), "[flashcards]\nfront/back");
    }
}
