use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
///
/// Paths are collected from the router, so only metadata lives here.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token refresh and the current user"),
        (name = "Reservations", description = "Booking, decisions and the PDF report"),
        (name = "Spaces", description = "Bookable spaces and their availability"),
        (name = "Users", description = "Account administration"),
        (name = "Health", description = "Service status"),
    ),
    info(
        title = "Space Reservations API",
        version = "1.0.0",
        description = "Reserve library spaces and manage approvals",
    )
)]
pub struct ApiDoc;
