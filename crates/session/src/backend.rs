use std::future::Future;
use std::sync::Arc;

use cookai_api::{GenerateRequest, GenerateResponse};
use cookai_api_client::{ApiClient, ApiError};
use tokio_util::sync::CancellationToken;

/// Where chat queries are sent. [`ApiClient`] is the production backend.
pub trait QueryBackend: Send + Sync {
    /// Issue one query. Implementations should stop work and resolve to
    /// [`ApiError::Aborted`] once `cancel` fires, if they can.
    fn query(
        &self,
        request: GenerateRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<GenerateResponse, ApiError>> + Send;
}

impl QueryBackend for ApiClient {
    async fn query(
        &self,
        request: GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<GenerateResponse, ApiError> {
        self.generate(&request, &cancel).await
    }
}

impl<B: QueryBackend> QueryBackend for Arc<B> {
    fn query(
        &self,
        request: GenerateRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<GenerateResponse, ApiError>> + Send {
        self.as_ref().query(request, cancel)
    }
}
