//! Uniform JSON bodies for every response the service writes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// 200 with `data` as the JSON body.
pub fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// `status` with `{"error": message}` as the JSON body.
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse json")
    }

    #[tokio::test]
    async fn success_wraps_payload_with_ok() {
        let response = success(json!({ "possible_coffees": ["Latte"] }));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "possible_coffees": ["Latte"] })
        );
    }

    #[tokio::test]
    async fn failure_wraps_message_in_error_field() {
        let response = failure(StatusCode::BAD_REQUEST, "missing field `coffee_type`");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "missing field `coffee_type`" })
        );
    }
}
