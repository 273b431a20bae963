use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{require_auth, trace_id};
use crate::routes::{
    admins, athletes, auth, coaches, health, measurement_types, measurements, ngos,
    permission_groups, readings, resources, user_groups, users,
};
use crate::services::storage::{FileStore, LocalFileStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub store: Arc<dyn FileStore>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let store: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(&config.storage));

    let state = AppState {
        pool,
        config: config.clone(),
        store,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Protected routes (require a bearer token)
    let protected_routes = Router::new()
        // session
        .route("/api/v1/auth/logout", post(auth::logout))
        // role-agnostic user collection
        .route("/api/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/v1/users/:key",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/v1/users/:key/activate", post(users::activate_user))
        .route("/api/v1/users/:key/deactivate", post(users::deactivate_user))
        .route("/api/v1/users/:key/reset_password", post(users::reset_password))
        .route("/api/v1/users/:key/change_language", post(users::change_language))
        // role-specialized collections
        .route("/api/v1/admins", get(admins::list_admins).post(admins::create_admin))
        .route(
            "/api/v1/admins/:key",
            get(admins::get_admin)
                .put(admins::update_admin)
                .delete(admins::delete_admin),
        )
        .route(
            "/api/v1/athletes",
            get(athletes::list_athletes).post(athletes::create_athlete),
        )
        .route(
            "/api/v1/athletes/:key",
            get(athletes::get_athlete)
                .put(athletes::update_athlete)
                .delete(athletes::delete_athlete),
        )
        .route(
            "/api/v1/coaches",
            get(coaches::list_coaches).post(coaches::create_coach),
        )
        .route(
            "/api/v1/coaches/:key",
            get(coaches::get_coach)
                .put(coaches::update_coach)
                .delete(coaches::delete_coach),
        )
        .route("/api/v1/coaches/:key/athletes", get(coaches::coach_athletes))
        // measurement catalog
        .route(
            "/api/v1/measurements",
            get(measurements::list_measurements).post(measurements::create_measurement),
        )
        .route(
            "/api/v1/measurements/athlete_baseline",
            get(measurements::athlete_baseline),
        )
        .route(
            "/api/v1/measurements/coach_baseline",
            get(measurements::coach_baseline),
        )
        .route(
            "/api/v1/measurements/:key",
            get(measurements::get_measurement)
                .put(measurements::update_measurement)
                .delete(measurements::delete_measurement),
        )
        .route(
            "/api/v1/measurements/:key/activate",
            post(measurements::activate_measurement),
        )
        .route(
            "/api/v1/measurements/:key/deactivate",
            post(measurements::deactivate_measurement),
        )
        .route(
            "/api/v1/measurement_types",
            get(measurement_types::list_measurement_types)
                .post(measurement_types::create_measurement_type),
        )
        .route(
            "/api/v1/measurement_types/:key",
            get(measurement_types::get_measurement_type)
                .put(measurement_types::update_measurement_type)
                .delete(measurement_types::delete_measurement_type),
        )
        .route(
            "/api/v1/measurement_types/:key/activate",
            post(measurement_types::activate_measurement_type),
        )
        .route(
            "/api/v1/measurement_types/:key/deactivate",
            post(measurement_types::deactivate_measurement_type),
        )
        // resource catalog
        .route(
            "/api/v1/resources",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route("/api/v1/resources/upload", post(resources::upload_file))
        .route(
            "/api/v1/resources/:key",
            get(resources::get_resource)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        )
        .route(
            "/api/v1/resources/:key/activate",
            post(resources::activate_resource),
        )
        .route(
            "/api/v1/resources/:key/deactivate",
            post(resources::deactivate_resource),
        )
        // readings
        .route(
            "/api/v1/readings",
            get(readings::list_readings).post(readings::create_reading),
        )
        .route(
            "/api/v1/readings/:key",
            get(readings::get_reading).delete(readings::delete_reading),
        )
        // permission groups
        .route("/api/v1/permissions", get(permission_groups::list_permissions))
        .route(
            "/api/v1/permission_groups",
            get(permission_groups::list_permission_groups)
                .post(permission_groups::create_permission_group),
        )
        .route(
            "/api/v1/permission_groups/:key",
            get(permission_groups::get_permission_group)
                .put(permission_groups::update_permission_group)
                .delete(permission_groups::delete_permission_group),
        )
        // user groups
        .route(
            "/api/v1/user_groups",
            get(user_groups::list_user_groups).post(user_groups::create_user_group),
        )
        .route(
            "/api/v1/user_groups/:key",
            get(user_groups::get_user_group)
                .put(user_groups::update_user_group)
                .delete(user_groups::delete_user_group),
        )
        .route(
            "/api/v1/user_groups/:key/activate",
            post(user_groups::activate_user_group),
        )
        .route(
            "/api/v1/user_groups/:key/deactivate",
            post(user_groups::deactivate_user_group),
        )
        // ngos
        .route("/api/v1/ngos", get(ngos::list_ngos).post(ngos::create_ngo))
        .route("/api/v1/ngos/:key", put(ngos::update_ngo).get(ngos::get_ngo).delete(ngos::delete_ngo))
        .route("/api/v1/ngos/:key/activate", post(ngos::activate_ngo))
        .route("/api/v1/ngos/:key/deactivate", post(ngos::deactivate_ngo))
        .route("/api/v1/ngos/:key/measurements", get(ngos::ngo_measurements))
        .route(
            "/api/v1/ngos/:key/permission_groups",
            get(ngos::ngo_permission_groups),
        )
        .route("/api/v1/ngos/:key/files", get(ngos::ngo_files))
        .route("/api/v1/ngos/:key/curricula", get(ngos::ngo_curricula))
        .route(
            "/api/v1/ngos/:key/training_sessions",
            get(ngos::ngo_training_sessions),
        )
        .route("/api/v1/ngos/:key/users", get(ngos::ngo_users))
        .route(
            "/api/v1/ngos/:key/user_hierarchy",
            get(ngos::get_user_hierarchy).post(ngos::save_user_hierarchy),
        )
        .route(
            "/api/v1/ngos/:key/registration_form/:role",
            post(ngos::bind_registration_form),
        )
        // Auth runs first (outermost layer = runs first)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/v1/ping", get(health::ping))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/session", get(auth::session))
        .route("/api/v1/ngos/active", get(ngos::active_ngos))
        .route(
            "/api/v1/ngos/:key/registration_form/:role",
            get(ngos::get_registration_form),
        );

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
