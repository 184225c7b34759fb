use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};
use std::str::FromStr;

use crate::model::access::AccessMask;
use crate::model::{Id, UserContext};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ACCESS_HEADER: &str = "x-user-access";

/// Axum extractor for UserContext from request headers
///
/// - X-User-Id: numeric user identifier
/// - X-User-Access: granted capabilities as a decimal bitmask
///
/// Requests without an identity are anonymous and hold no capabilities.
/// A header that is present but not a number is rejected with 400.
#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let Some(user_id) = parse_header::<Id>(headers, USER_ID_HEADER)? else {
            return Ok(UserContext::anonymous());
        };
        let access = parse_header::<AccessMask>(headers, USER_ACCESS_HEADER)?.unwrap_or(0);

        Ok(UserContext::new(user_id, access))
    }
}

/// Extract header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
}

fn parse_header<T: FromStr>(headers: &HeaderMap, header_name: &str) -> Result<Option<T>, StatusCode> {
    match extract_header_value(headers, header_name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            log::debug!("Rejecting malformed {} header: {:?}", header_name, raw);
            StatusCode::BAD_REQUEST
        }),
    }
}
