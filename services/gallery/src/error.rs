use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Gallery service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum GalleryServiceError {
    #[error("event not found")]
    EventNotFound,
    #[error("album not found")]
    AlbumNotFound,
    #[error("no verification code pending")]
    ChallengeNotFound,
    #[error("share not found")]
    ShareNotFound,
    #[error("verification code expired")]
    Expired,
    #[error("too many attempts, request a new code")]
    RateLimited,
    #[error("too many requests, try again later")]
    TooManyRequests,
    #[error("invalid verification code")]
    Invalid { remaining_attempts: u32 },
    #[error("not authenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("this email is not on the guest list for this event")]
    NotEligible,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("failed to deliver verification code")]
    DeliveryError,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl GalleryServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::AlbumNotFound => "ALBUM_NOT_FOUND",
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::ShareNotFound => "SHARE_NOT_FOUND",
            Self::Expired => "EXPIRED",
            Self::RateLimited => "RATE_LIMITED",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::Invalid { .. } => "INVALID",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotEligible => "NOT_ELIGIBLE",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::DeliveryError => "DELIVERY_ERROR",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::EventNotFound
            | Self::AlbumNotFound
            | Self::ChallengeNotFound
            | Self::ShareNotFound => StatusCode::NOT_FOUND,
            Self::Expired => StatusCode::GONE,
            Self::RateLimited | Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Invalid { .. } | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotEligible => StatusCode::FORBIDDEN,
            Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::DeliveryError => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<utsave_domain::email::InvalidEmail> for GalleryServiceError {
    fn from(_: utsave_domain::email::InvalidEmail) -> Self {
        Self::InvalidEmail
    }
}

impl IntoResponse for GalleryServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client outcomes and TraceLayer already records them.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "error": self.to_string(),
        });
        if let Self::Invalid { remaining_attempts } = self {
            body["remaining_attempts"] = remaining_attempts.into();
        }
        (status, axum::Json(body)).into_response()
    }
}
