use axum::{Json, extract::State, http::HeaderMap};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::metrics::{LOGIN_CHECKS, REQUEST_TOTAL};
use crate::models::LoginAllowed;
use crate::rate_limit::fingerprint;
use crate::state::AppState;

// Client address as reported by the edge proxy
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded.or(real_ip).unwrap_or("unknown").to_string()
}

// POST /api/auth/login-check
// Any limiter error lets the attempt through: availability wins over throttling here.
pub async fn login_check_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LoginAllowed>, AppError> {
    REQUEST_TOTAL.inc();
    let key = format!("login:{}", client_ip(&headers));

    let decision = match state
        .rate_limiter
        .check(&key, state.login_limit, state.login_window)
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            LOGIN_CHECKS.with_label_values(&["fail_open"]).inc();
            warn!(error = %e, "Rate limit check failed, allowing attempt");
            return Ok(Json(LoginAllowed {
                allowed: true,
                remaining: None,
                reset_time: None,
            }));
        }
    };

    if decision.limited {
        LOGIN_CHECKS.with_label_values(&["limited"]).inc();
        info!(identifier_hash = %fingerprint(&key), "Login attempts throttled");

        let wait_ms = (decision.reset_time - Utc::now().timestamp_millis()).max(0);
        let minutes = (wait_ms + 59_999) / 60_000;
        let message = format!(
            "Please try again in {} minute{}",
            minutes,
            if minutes > 1 { "s" } else { "" }
        );
        return Err(AppError::RateLimited {
            message,
            retry_after: decision.reset_time,
            retry_after_secs: ((wait_ms + 999) / 1000) as u64,
        });
    }

    LOGIN_CHECKS.with_label_values(&["allowed"]).inc();
    Ok(Json(LoginAllowed {
        allowed: true,
        remaining: Some(decision.remaining),
        reset_time: Some(decision.reset_time),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_wins_and_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));
        assert_eq!(client_ip(&headers), "1.2.3.4");
    }

    #[test]
    fn falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));
        assert_eq!(client_ip(&headers), "5.6.7.8");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
