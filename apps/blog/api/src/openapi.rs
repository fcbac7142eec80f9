use utoipa::OpenApi;

/// Main API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog API",
        version = "0.1.0",
        description = "User account management for the blog platform"
    ),
    nest(
        (path = "/user", api = domain_users::ApiDoc),
    )
)]
pub struct ApiDoc;
