use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use coffee_llm::LanguageModelError;
use thiserror::Error;

use crate::envelope;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The call to the language model failed (network, auth, quota).
    #[error("failed to call language model: {0}")]
    Upstream(#[from] LanguageModelError),
    /// The model answered without calling the required tool, called another
    /// one, or sent arguments that do not match the contract.
    #[error("malformed model response: {0}")]
    MalformedUpstreamResponse(String),
    /// The model set the contract's failure flag.
    #[error("model could not complete the task: {0}")]
    ModelDeclinedTask(String),
    #[error("model returned only ingredients or invalid results")]
    NoValidResult,
    #[error("model returned incomplete or invalid recipe data")]
    IncompleteResult,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Validation(message) => tracing::debug!(%message, "rejected request"),
            Self::Gateway(error) => tracing::error!(%error, "gateway call failed"),
        }
        envelope::failure(status, self.to_string())
    }
}
