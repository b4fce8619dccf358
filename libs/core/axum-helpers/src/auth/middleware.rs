use super::jwt::JwtAuth;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

const TOKEN_COOKIE: &str = "access_token";

/// Extract the token from `Authorization: Bearer` or the `access_token` cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == TOKEN_COOKIE).then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// JWT authentication middleware.
///
/// Runs before any extractor of the wrapped handlers, so an unauthenticated
/// request is rejected with 401 before its body is looked at. Verified
/// claims are inserted into the request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token_from_request(&headers) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized("Unauthorized".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def"),
        );
        assert_eq!(
            extract_token_from_request(&headers).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn test_extract_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=xyz; other=1"),
        );
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_token_from_request(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_token_from_request(&headers).is_none());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcg=="),
        );
        assert!(extract_token_from_request(&headers).is_none());
    }
}
