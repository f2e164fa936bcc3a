//! Shared route helpers.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::error::{AppError, AppResult};

/// Extract the session token from `Authorization: Bearer <token>`.
///
/// A missing header is unauthorized; any other scheme is a bad request.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(AppError::Unauthorized);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::BadRequest("authorization header is not valid text".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::BadRequest("expected a Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc123")).unwrap(), "abc123");
    }

    #[test]
    fn missing_header_is_unauthorized() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn empty_token_is_unauthorized() {
        assert!(matches!(
            bearer_token(&headers("Bearer   ")),
            Err(AppError::Unauthorized)
        ));
    }
}
