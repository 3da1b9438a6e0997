use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, handlers, middleware, state::AppState};

/// Builds the `/api/v1` application with its shared layers.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh-token", post(handlers::auth::refresh))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/register-fact", post(handlers::auth::register_fact))
        .route("/auth/check-code", post(handlers::auth::check_code))
        .route("/auth/retry-active", post(handlers::auth::retry_active))
        .route("/auth/retry-password", post(handlers::auth::retry_password))
        .route(
            "/auth/create-new-password",
            post(handlers::auth::create_new_password),
        )
        .route("/users/{id}", get(handlers::users::get_user));

    let user_routes = Router::new()
        .route("/auth/profile", get(handlers::auth::profile))
        .route(
            "/users",
            get(handlers::users::list_users)
                .post(handlers::users::create_user)
                .patch(handlers::users::update_user),
        )
        .route(
            "/users/email/{email}",
            get(handlers::users::get_user_by_email),
        )
        .route("/users/{id}", delete(handlers::users::delete_user))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth,
        ));

    let api = Router::new().merge(public_routes).merge(user_routes);

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(axum_middleware::from_fn(middleware::log_error_responses)),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(24 * 60 * 60));

    if config.cors_allow_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
