pub mod auth;
pub mod health;
pub mod reservation;
pub mod space;
pub mod user;

use crate::{doc::ApiDoc, state::AppState};
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::login))
        .routes(routes!(auth::refresh))
        .routes(routes!(auth::me))
        .routes(routes!(reservation::list, reservation::create))
        .routes(routes!(reservation::mine))
        .routes(routes!(reservation::report))
        .routes(routes!(
            reservation::detail,
            reservation::update,
            reservation::replace
        ))
        .routes(routes!(reservation::cancel))
        .routes(routes!(reservation::approve))
        .routes(routes!(reservation::reject))
        .routes(routes!(space::list, space::create))
        .routes(routes!(
            space::detail,
            space::update,
            space::replace,
            space::delete
        ))
        .routes(routes!(space::availability))
        .routes(routes!(user::list, user::create))
        .routes(routes!(user::detail, user::update, user::replace, user::delete))
}

/// The whole HTTP surface: `/health`, the API under `/api` and its docs
pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::health))
        .nest("/api", api_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", api))
        .with_state(state)
}
