use axum::http::StatusCode;

/// Handler for `GET /healthz`: liveness only, touches no dependencies.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
