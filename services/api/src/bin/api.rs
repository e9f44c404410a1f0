//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        OmdbAdapter, OpenAiChatAdapter, PgSessionStore, RedisCacheAdapter, TmdbAdapter,
        WikipediaAdapter,
    },
    config::Config,
    error::ApiError,
    web::{rest, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    Router,
};
use movie_tracker_core::{
    agents::{FactGenerator, KnowledgeAgent, RatingsAgent},
    movie_cache::MovieCache,
    toolbox::MovieToolbox,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

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
    let session_store = Arc::new(PgSessionStore::new(db_pool.clone()));
    info!("Running database migrations...");
    session_store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);
    let chat_adapter = Arc::new(OpenAiChatAdapter::new(
        openai_client,
        config.chat_model.clone(),
        config.fact_model.clone(),
    ));

    let http = reqwest::Client::new();
    let tmdb_adapter = Arc::new(TmdbAdapter::new(
        http.clone(),
        config
            .tmdb_api_key
            .clone()
            .ok_or_else(|| ApiError::Internal("TMDB_API_KEY is required".to_string()))?,
    ));
    let omdb_adapter = Arc::new(OmdbAdapter::new(
        http.clone(),
        config
            .omdb_api_key
            .clone()
            .ok_or_else(|| ApiError::Internal("OMDB_API_KEY is required".to_string()))?,
    ));
    let wikipedia_adapter = Arc::new(WikipediaAdapter::new(http));

    let cache_adapter = Arc::new(RedisCacheAdapter::new(
        &config.redis_url,
        config.movie_cache_ttl_seconds,
    )?);

    // --- 4. Assemble the Core Components ---
    let knowledge = KnowledgeAgent::new(wikipedia_adapter);
    let ratings = RatingsAgent::new(omdb_adapter);
    let fact_generator = FactGenerator::new(chat_adapter.clone(), knowledge.clone());
    let movie_cache = MovieCache::new(cache_adapter, tmdb_adapter.clone());
    let toolbox = MovieToolbox::new(
        tmdb_adapter.clone(),
        tmdb_adapter,
        ratings,
        knowledge,
    );

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        sessions: session_store,
        chat_model: chat_adapter,
        fact_generator,
        movie_cache,
        toolbox,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    let api_router = rest::api_router(app_state).layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
