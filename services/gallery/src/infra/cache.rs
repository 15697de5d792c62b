use deadpool_redis::Pool;
use deadpool_redis::redis;

use crate::domain::repository::SendRateLimiter;
use crate::domain::types::{OTP_SEND_LIMIT, OTP_SEND_WINDOW_SECS};
use crate::error::GalleryServiceError;

/// Fixed-window OTP send counter keyed by client IP.
#[derive(Clone)]
pub struct RedisSendRateLimiter {
    pub pool: Pool,
}

fn send_key(client_key: &str) -> String {
    format!("otp_send:{client_key}")
}

/// `SET key 0 NX EX window` then `INCRBY key 1` inside one MULTI, so a counter
/// never exists without its expiry. The window starts with the first request.
fn window_hit(key: &str) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("NX")
        .arg("EX")
        .arg(OTP_SEND_WINDOW_SECS)
        .ignore()
        .incr(key, 1);
    pipe
}

impl SendRateLimiter for RedisSendRateLimiter {
    async fn allow(&self, client_key: &str) -> Result<bool, GalleryServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| GalleryServiceError::Internal(e.into()))?;
        let key = send_key(client_key);
        let (count,): (u64,) = window_hit(&key)
            .query_async(&mut conn)
            .await
            .map_err(|e| GalleryServiceError::Internal(e.into()))?;
        Ok(count <= OTP_SEND_LIMIT)
    }
}
