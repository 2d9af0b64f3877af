use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    Api, AppState, CloudinaryStore, Config, DbAuthService, DbCommunityService,
    DbConversationService, DbFileLibraryService, DbProfileService, HuggingFaceEmbedder,
    PineconeIndex, TokenIssuer, VideoTokenIssuer,
};

pub struct App {
    router: axum::Router,
}

impl App {
    #[must_use]
    pub fn new(config: &Config, pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        let state = AppState {
            auth: Arc::new(DbAuthService::new(pool.clone())),
            profiles: Arc::new(DbProfileService::new(pool.clone())),
            community: Arc::new(DbCommunityService::new(pool.clone())),
            conversations: Arc::new(DbConversationService::new(pool.clone())),
            files: Arc::new(DbFileLibraryService::new(pool)),
            media: Arc::new(CloudinaryStore::new(config.cloudinary.clone())),
            embedder: Arc::new(HuggingFaceEmbedder::new(config.embedding.clone())),
            vectors: Arc::new(PineconeIndex::new(config.pinecone.clone())),
            tokens: TokenIssuer::new(config),
            video_tokens: VideoTokenIssuer::new(&config.livekit),
            access_cookie_ttl: config.access_token_ttl,
            refresh_cookie_ttl: config.refresh_token_ttl,
        };

        Self::with_state(config, state)
    }

    /// Builds the router around an explicit state, letting tests swap the
    /// backing services for stubs.
    #[must_use]
    pub fn with_state(config: &Config, state: AppState) -> Self {
        let cors = config
            .cors_origin
            .as_ref()
            .and_then(|origin| origin.parse::<HeaderValue>().ok())
            .map_or_else(CorsLayer::permissive, |origin| {
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_credentials(true)
                    .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            });

        let router = axum::Router::new()
            .nest("/api/v1", Api::new())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(state);

        Self { router }
    }

    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        axum::serve(listener, self.router).await
    }
}
