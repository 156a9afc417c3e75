//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the whole service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog API",
        version = "0.1.0",
        description = "Document-store backed REST API for blogs, embedded comments and comment analytics",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/blogs", api = domain_blogs::handlers::ApiDoc)
    ),
    tags(
        (name = "blogs", description = "Blog and comment management endpoints")
    )
)]
pub struct ApiDoc;
