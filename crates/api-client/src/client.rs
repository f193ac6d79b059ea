use std::future::Future;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use cookai_api::*;

use crate::error::ApiError;

/// Typed HTTP client for the cookai backend.
///
/// No request timeout is configured: a hung generation stays pending until
/// the caller cancels it through the token passed to [`ApiClient::generate`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let resp = self.client.get(self.url(HEALTH_PATH)).send().await?;
        parse_response(resp).await
    }

    // ── Generation ────────────────────────────────────────────────────────

    /// Ask the teaching agent to answer `req`.
    ///
    /// Cancelling `cancel` drops the in-flight HTTP exchange, which closes
    /// the connection, and resolves to [`ApiError::Aborted`].
    pub async fn generate(
        &self,
        req: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ApiError> {
        let call = async {
            let resp = self
                .client
                .post(self.url(GENERATE_PATH))
                .json(req)
                .send()
                .await?;
            parse_response(resp).await
        };
        abortable(call, cancel).await
    }

    // ── Ingestion ─────────────────────────────────────────────────────────

    /// Upload a document for ingestion and return its new content id.
    pub async fn ingest_file(
        &self,
        path: &Path,
        form: &IngestForm,
    ) -> Result<IngestResponse, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let multipart = Form::new()
            .text("course_id", form.course_id.to_string())
            .text("uploader_id", form.uploader_id.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let resp = self
            .client
            .post(self.url(INGEST_PATH))
            .multipart(multipart)
            .send()
            .await?;
        parse_response(resp).await
    }
}

/// Race `call` against `cancel`; cancellation wins ties.
async fn abortable<T>(
    call: impl Future<Output = Result<T, ApiError>>,
    cancel: &CancellationToken,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("request aborted by caller");
            Err(ApiError::Aborted)
        }
        result = call => result,
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error carrying the status and the backend's `detail` message.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            detail: error_detail(status, &body),
        });
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// The backend's `detail` string when it sent one, otherwise a generic line.
/// Raw bodies (proxy pages, validation arrays) only go to the debug log.
fn error_detail(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => {
                Some(detail.trim().to_string())
            }
            _ => None,
        });
    detail.unwrap_or_else(|| {
        debug!(status = status.as_u16(), body = body.trim(), "error response without detail");
        format!("request failed with status {}", status.as_u16())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn error_detail_prefers_json_detail() {
        assert_eq!(
            error_detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"detail":"Failed to process the document."}"#
            ),
            "Failed to process the document."
        );
    }

    #[test]
    fn raw_payloads_never_become_detail() {
        let cases = [
            (StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":[{"msg":"field required"}]}"#),
            (StatusCode::BAD_REQUEST, r#"{"detail":"   "}"#),
            (StatusCode::BAD_REQUEST, r#"{"detail":null}"#),
            (StatusCode::NOT_FOUND, r#"{"error":"nope"}"#),
            (StatusCode::BAD_GATEWAY, "<html><body>502 Bad Gateway</body></html>"),
            (StatusCode::BAD_GATEWAY, ""),
        ];
        for (status, body) in cases {
            assert_eq!(
                error_detail(status, body),
                format!("request failed with status {}", status.as_u16()),
                "body: {body}"
            );
        }
    }

    #[test]
    fn base_url_trailing_slashes_are_trimmed() {
        let client = ApiClient::with_client(reqwest::Client::new(), "http://localhost:8000//");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url(GENERATE_PATH),
            "http://localhost:8000/api/generate_exam"
        );
    }

    #[tokio::test]
    async fn abortable_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = abortable(async { Ok::<_, ApiError>(1) }, &cancel).await;
        assert!(matches!(result, Err(ApiError::Aborted)));
    }
}
