//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, LocalFotoStore},
    config::Config,
    error::ApiError,
    web::{self, dashboard, inventario, reportes, roles, state::AppState, usuarios, ApiDoc},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Multipart uploads carry a photo of at most 5 MB plus the text fields.
const MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Photo Store ---
    let fotos = Arc::new(
        LocalFotoStore::new(&config.uploads_dir).await.map_err(|e| {
            ApiError::Internal(format!(
                "No se pudo crear '{}': {e}",
                config.uploads_dir.display()
            ))
        })?,
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        inventario: db.clone(),
        reportes: db.clone(),
        roles: db.clone(),
        usuarios: db.clone(),
        dashboard: db.clone(),
        fotos,
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|_| ApiError::Internal(format!("CORS_ORIGIN inválido: '{}'", config.cors_origin)))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/api", get(web::health))
        .route("/api/roles", get(roles::get_roles).post(roles::create_rol))
        .route(
            "/api/roles/{id}",
            get(roles::get_rol_by_id)
                .put(roles::update_rol)
                .delete(roles::delete_rol),
        )
        .route("/api/users/login", post(usuarios::login))
        .route("/api/users/assign-role", post(usuarios::assign_rol))
        .route(
            "/api/users",
            get(usuarios::get_users).post(usuarios::create_user),
        )
        .route(
            "/api/users/{id}",
            get(usuarios::get_user_by_id)
                .put(usuarios::update_user)
                .delete(usuarios::delete_user),
        )
        .route(
            "/api/dashboard",
            get(dashboard::get_dashboard)
                .post(dashboard::create_or_update_dashboard)
                .delete(dashboard::delete_dashboard),
        )
        .route("/api/dashboard/card", post(dashboard::add_card))
        .route(
            "/api/dashboard/card/{card_id}",
            put(dashboard::update_card).delete(dashboard::delete_card),
        )
        .route(
            "/api/dashboard/card/{card_id}/roles",
            put(dashboard::assign_roles_to_card),
        )
        .route(
            "/api/inventario",
            get(inventario::get_medicinas)
                .post(inventario::create_medicina)
                .put(inventario::update_many_medicinas),
        )
        .route("/api/inventario/lote", post(inventario::create_medicinas_lote))
        .route(
            "/api/inventario/{id}",
            get(inventario::get_medicina_by_id)
                .put(inventario::update_medicina)
                .delete(inventario::delete_medicina),
        )
        .route("/api/reportes/inventario", get(reportes::get_reporte_inventario))
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
