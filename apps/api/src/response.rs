//! # Response Envelope
//!
//! Successful responses are `{"message": .., "data": ..}`. Failures use
//! [`ErrorEnvelope`](crate::error::ErrorEnvelope).

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Success envelope body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

/// A successful handler result, optionally setting a cookie.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: String,
    data: T,
    cookie: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status,
            message: message.into(),
            data,
            cookie: None,
        }
    }

    /// Attaches an HttpOnly, Secure cookie living `max_age_secs`.
    pub fn with_cookie(mut self, name: &str, value: &str, max_age_secs: i64) -> Self {
        self.cookie = Some(format!(
            "{name}={value}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
            max_age_secs.max(0)
        ));
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        tracing::info!(status = self.status.as_u16(), message = %self.message, "request handled");

        let mut response = (
            self.status,
            Json(Envelope {
                message: self.message,
                data: self.data,
            }),
        )
            .into_response();

        if let Some(cookie) = self.cookie {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(error = %e, "dropping unencodable cookie"),
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header() {
        let response = ApiResponse::ok("signed in", ())
            .with_cookie("jwt_token", "abc.def", 60)
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("jwt_token=abc.def;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=60"));
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created("made", 1).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
