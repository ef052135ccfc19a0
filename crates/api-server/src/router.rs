//! Route table and middleware layering.

use crate::state::AppState;
use crate::{
    analytics_rest, auth_rest, blacklist_rest, campaigns_rest, contacts_rest, guard, press_rest,
    rest, upload_rest, users_rest,
};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

fn cors_layer(state: &AppState) -> CorsLayer {
    let origin = match state.config.cors.allowed_origin.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            warn!(
                origin = %state.config.cors.allowed_origin,
                "Invalid allowed origin, falling back to any"
            );
            AllowOrigin::any()
        }
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with all endpoints and middleware.
pub fn api_router(state: AppState) -> Router {
    // No bearer token required.
    let public = Router::new()
        .route("/api/auth/login", post(auth_rest::login))
        .route("/api/auth/forgot-password", post(auth_rest::forgot_password))
        .route(
            "/api/auth/reset-password/:resettoken",
            put(auth_rest::reset_password),
        );

    // Everything here passes through the access-control guard first.
    let protected = Router::new()
        // Auth
        .route("/api/auth/me", get(auth_rest::me))
        .route("/api/auth/update-password", put(auth_rest::update_password))
        // Users
        .route(
            "/api/users",
            get(users_rest::list_users).post(users_rest::create_user),
        )
        .route(
            "/api/users/:id",
            get(users_rest::get_user)
                .put(users_rest::update_user)
                .delete(users_rest::delete_user),
        )
        // Campaigns
        .route(
            "/api/campaigns",
            get(campaigns_rest::list_campaigns).post(campaigns_rest::create_campaign),
        )
        .route(
            "/api/campaigns/:id",
            get(campaigns_rest::get_campaign)
                .put(campaigns_rest::update_campaign)
                .delete(campaigns_rest::delete_campaign),
        )
        .route("/api/campaigns/:id/send", post(campaigns_rest::send_campaign))
        // Contacts
        .route(
            "/api/contacts",
            get(contacts_rest::list_contacts).post(contacts_rest::create_contact),
        )
        .route(
            "/api/contacts/lists",
            get(contacts_rest::list_contact_lists).post(contacts_rest::create_contact_list),
        )
        // Press contacts
        .route(
            "/api/press",
            get(press_rest::list_press).post(press_rest::create_press),
        )
        .route(
            "/api/press/:id",
            get(press_rest::get_press)
                .put(press_rest::update_press)
                .delete(press_rest::delete_press),
        )
        // Blacklist
        .route(
            "/api/blacklist",
            get(blacklist_rest::list_blacklist).post(blacklist_rest::add_blacklist_entry),
        )
        .route(
            "/api/blacklist/:id",
            axum::routing::delete(blacklist_rest::remove_blacklist_entry),
        )
        .route(
            "/api/blacklist/check/:email",
            get(blacklist_rest::check_blacklist),
        )
        .route("/api/blacklist/bulk", post(blacklist_rest::bulk_blacklist))
        // CSV upload, capped at the configured body size
        .route(
            "/api/upload/contacts",
            post(upload_rest::upload_contacts)
                .layer(DefaultBodyLimit::max(state.config.upload.max_upload_bytes)),
        )
        .route(
            "/api/upload/press",
            post(upload_rest::upload_press)
                .layer(DefaultBodyLimit::max(state.config.upload.max_upload_bytes)),
        )
        // Analytics
        .route("/api/analytics/dashboard", get(analytics_rest::dashboard))
        .route(
            "/api/analytics/campaigns",
            get(analytics_rest::campaign_analytics),
        )
        .route("/api/analytics/users", get(analytics_rest::user_analytics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        // Operational endpoints, outside /api and unauthenticated
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
