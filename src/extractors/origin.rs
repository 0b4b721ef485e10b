//! Extract the requesting origin (scheme and host) for building absolute URLs.

use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, uri::Authority},
};
use std::str::FromStr;

/// Header set by reverse proxies that terminate TLS. Only read when trusted.
pub const FORWARDED_PROTO_HEADER: &str = "X-Forwarded-Proto";

/// Scheme and host of the incoming request, e.g. `http` + `127.0.0.1:8000`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        RequestOrigin {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Join an absolute path (starting with `/`) onto this origin.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.host, path)
    }

    fn from_parts(parts: &Parts, state: &AppState) -> Result<Self, AppError> {
        let header_str = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        // The bind address is our own; anything the client sent is checked.
        let client_host = header_str(header::HOST.as_str())
            .map(String::from)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));
        let host = match client_host {
            Some(raw) => checked_host(&raw, state)?,
            None => state.settings.bind_addr.to_string(),
        };

        let forwarded = if state.settings.trust_forwarded_proto {
            header_str(FORWARDED_PROTO_HEADER)
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_ascii_lowercase())
                .filter(|v| v == "http" || v == "https")
        } else {
            None
        };
        let scheme = forwarded
            .or_else(|| parts.uri.scheme_str().map(String::from))
            .unwrap_or_else(|| "http".into());

        Ok(RequestOrigin { scheme, host })
    }
}

/// Accept `host[:port]` only, with the host listed in `ALLOWED_HOSTS`.
fn checked_host(raw: &str, state: &AppState) -> Result<String, AppError> {
    let invalid = || AppError::BadRequest(format!("invalid Host header '{}'", raw.escape_default()));
    let authority = Authority::from_str(raw).map_err(|_| invalid())?;
    if authority.as_str().contains('@') || authority.host().is_empty() {
        return Err(invalid());
    }
    if !state.settings.is_allowed_host(authority.host()) {
        tracing::warn!(host = %authority, "rejected Host header");
        return Err(invalid());
    }
    Ok(authority.as_str().to_ascii_lowercase())
}

#[async_trait]
impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        RequestOrigin::from_parts(parts, state)
    }
}
