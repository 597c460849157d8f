// ABOUTME: HTTP API layer for Procura providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod auth;
pub mod auth_handlers;
pub mod demands_handlers;
pub mod quotes_handlers;
pub mod response;
pub mod state;
pub mod statistics_handlers;
pub mod users_handlers;

pub use auth::CurrentUser;
pub use response::{ApiError, ApiResponse};
pub use state::AppState;

/// Creates the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
}

/// Creates the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(users_handlers::list_users))
        .route("/me", get(users_handlers::me))
        .route("/{id}", delete(users_handlers::delete_user))
}

/// Creates the demands router
pub fn create_demands_router() -> Router<AppState> {
    Router::new()
        .route("/", post(demands_handlers::create_demand))
        .route("/", get(demands_handlers::list_demands))
        .route("/", put(demands_handlers::update_demand))
        .route("/{id}", get(demands_handlers::get_demand))
        .route("/validate", post(demands_handlers::validate_demand))
}

/// Creates the quotes router
pub fn create_quotes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(quotes_handlers::create_quote))
        .route("/", get(quotes_handlers::list_quotes))
        .route("/", put(quotes_handlers::update_quote))
        .route("/{id}", get(quotes_handlers::get_quote))
        .route("/validate", post(quotes_handlers::validate_quote))
        .route("/manage", post(quotes_handlers::manage_quote))
}

/// Creates the statistics router
pub fn create_statistics_router() -> Router<AppState> {
    Router::new()
        .route("/demands", get(statistics_handlers::demand_stats))
        .route("/technician", get(statistics_handlers::technician_stats))
        .route("/provider", get(statistics_handlers::provider_stats))
}

/// Creates the full API router with all endpoints mounted under /api
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", create_auth_router())
        .nest("/api/users", create_users_router())
        .nest("/api/demands", create_demands_router())
        .nest("/api/quotes", create_quotes_router())
        .nest("/api/statistics", create_statistics_router())
        .with_state(state)
}
