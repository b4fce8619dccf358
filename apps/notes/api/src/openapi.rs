use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer scheme referenced by every notes operation
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Notes API",
        version = "0.1.0",
        description = "Personal notes with owner-scoped semantic search"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/notes", api = domain_notes::handlers::ApiDoc)
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_paths_are_documented() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/notes"));
        assert!(doc.paths.paths.contains_key("/notes/search"));
        assert!(doc.paths.paths.contains_key("/notes/{id}"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
