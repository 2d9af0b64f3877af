use std::sync::Arc;

use time::Duration;

use crate::{
    AuthService, CommunityService, ConversationService, Embedder, FileLibraryService, MediaStore,
    ProfileService, TokenIssuer, VectorIndex, VideoTokenIssuer,
};

/// Shared handler state. Services are trait objects so tests can substitute
/// in-memory or stub implementations.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub profiles: Arc<dyn ProfileService>,
    pub community: Arc<dyn CommunityService>,
    pub conversations: Arc<dyn ConversationService>,
    pub files: Arc<dyn FileLibraryService>,
    pub media: Arc<dyn MediaStore>,
    pub embedder: Arc<dyn Embedder>,
    pub vectors: Arc<dyn VectorIndex>,
    pub tokens: TokenIssuer,
    pub video_tokens: VideoTokenIssuer,
    pub access_cookie_ttl: Duration,
    pub refresh_cookie_ttl: Duration,
}
