use std::env;

use time::Duration;

pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "environment variable {key} is not set"),
            Self::Invalid(key, detail) => write!(f, "environment variable {key} is invalid: {detail}"),
        }
    }
}

impl std::fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub index_host: String,
}

#[derive(Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Clone)]
pub struct LivekitConfig {
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cors_origin: Option<String>,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub cloudinary: CloudinaryConfig,
    pub pinecone: PineconeConfig,
    pub embedding: EmbeddingConfig,
    pub livekit: LivekitConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_or("PORT", 8000)?,
            database_url: required("DATABASE_URL")?,
            cors_origin: env::var("CORS_ORIGIN").ok(),
            access_token_secret: required("ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: required("REFRESH_TOKEN_SECRET")?,
            access_token_ttl: Duration::minutes(parse_or("ACCESS_TOKEN_TTL_MINUTES", 15)?),
            refresh_token_ttl: Duration::days(parse_or("REFRESH_TOKEN_TTL_DAYS", 10)?),
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
            },
            pinecone: PineconeConfig {
                api_key: required("PINECONE_API_KEY")?,
                index_host: required("PINECONE_INDEX_HOST")?,
            },
            embedding: EmbeddingConfig {
                api_key: required("HUGGINGFACE_API_KEY")?,
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "dunzhang/stella_en_1.5B_v5".to_string()),
            },
            livekit: LivekitConfig {
                api_key: required("LIVEKIT_API_KEY")?,
                api_secret: required("LIVEKIT_API_SECRET")?,
            },
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(key, e.to_string())),
        Err(_) => Ok(default),
    }
}
