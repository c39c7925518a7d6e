//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing,
//! request ids) and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderName,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request bodies are small JSON documents.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api_v1 = Router::new()
        // Accounts
        .route("/auth/register", post(handlers::register))
        .route("/account", get(handlers::current_account))
        .route("/account/password", post(handlers::change_password))
        .route("/account/email", post(handlers::change_email))
        // Profiles
        .route(
            "/players/profile",
            put(handlers::upsert_player_profile).get(handlers::own_player_profile),
        )
        .route("/players/{user_id}/profile", get(handlers::player_profile))
        .route(
            "/owners/profile",
            put(handlers::upsert_owner_profile).get(handlers::own_owner_profile),
        )
        .route("/owners/{user_id}/profile", get(handlers::owner_profile))
        .route("/owners/courts", get(handlers::owner_courts))
        // Courts and holidays
        .route(
            "/courts",
            post(handlers::create_court).get(handlers::list_courts),
        )
        .route("/courts/{court_id}", get(handlers::get_court))
        .route(
            "/courts/{court_id}/available-slots",
            get(handlers::available_slots),
        )
        .route(
            "/holidays",
            post(handlers::create_holiday).get(handlers::list_holidays),
        )
        // Reservations
        .route(
            "/reservations",
            post(handlers::create_reservation).get(handlers::list_reservations),
        )
        .route("/reservations/occupied", get(handlers::occupied_slots))
        .route("/reservations/booked", get(handlers::booked_on_date))
        .route("/reservations/check", get(handlers::check_court_booking))
        .route(
            "/reservations/{reservation_id}",
            delete(handlers::cancel_reservation),
        )
        // Posts
        .route(
            "/posts",
            post(handlers::create_post).get(handlers::list_posts),
        )
        .route("/posts/mine", get(handlers::my_posts))
        .route("/posts/liked", get(handlers::liked_posts))
        .route(
            "/posts/{post_id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/posts/{post_id}/comments",
            post(handlers::add_comment).get(handlers::list_comments),
        )
        .route("/posts/{post_id}/like", post(handlers::toggle_post_like))
        .route(
            "/comments/{comment_id}/like",
            post(handlers::toggle_comment_like),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}
