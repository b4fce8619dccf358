use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build a CORS layer for an explicit list of origins.
///
/// Allows the note verbs, `Content-Type`/`Authorization`/`Accept` headers and
/// credentials, with a one hour preflight cache.
pub fn create_cors_layer(origins: &[String]) -> io::Result<CorsLayer> {
    let allowed_origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    if allowed_origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_origin_list() {
        assert!(create_cors_layer(&[]).is_err());
    }

    #[test]
    fn test_rejects_invalid_origin() {
        assert!(create_cors_layer(&["http://bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn test_accepts_origins() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "https://notes.example.com".to_string(),
        ];
        assert!(create_cors_layer(&origins).is_ok());
    }
}
