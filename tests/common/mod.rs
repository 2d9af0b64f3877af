use anyhow::Result;
use commune::{App, CloudinaryConfig, Config, EmbeddingConfig, LivekitConfig, PineconeConfig};
use diesel::{PgConnection, r2d2::ConnectionManager};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use time::Duration;
use tokio::net::TcpListener;
use uuid::Uuid;

/// Config pointing at the local test database. The media, vector and video
/// providers get placeholder credentials; scenarios that exercise them are
/// expected to stub the services instead.
pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://postgres@localhost/postgres".to_string()),
        cors_origin: None,
        access_token_secret: "test-access-secret".to_string(),
        refresh_token_secret: "test-refresh-secret".to_string(),
        access_token_ttl: Duration::minutes(15),
        refresh_token_ttl: Duration::days(10),
        cloudinary: CloudinaryConfig {
            cloud_name: "test".to_string(),
            api_key: "test".to_string(),
            api_secret: "test".to_string(),
        },
        pinecone: PineconeConfig {
            api_key: "test".to_string(),
            index_host: "localhost".to_string(),
        },
        embedding: EmbeddingConfig {
            api_key: "test".to_string(),
            model: "test-model".to_string(),
        },
        livekit: LivekitConfig {
            api_key: "test".to_string(),
            api_secret: "test-livekit-secret".to_string(),
        },
    }
}

/// Spawns the app on an OS-assigned port and returns the port number.
pub async fn spawn_app() -> u16 {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("TcpListener bind to port 0");
    let port = listener.local_addr().expect("local_addr").port();

    let config = test_config();
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("Failed to connect to Postgres");

    let app = App::new(&config, pool);
    tokio::spawn(async move { app.run(listener).await });

    port
}

/// Returns a username unique across test runs that share a database.
pub fn unique_name(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..12])
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(port: u16) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("http://localhost:{port}/api/v1"),
            access_token: None,
        }
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        self.authorized(self.client.get(format!("{}{endpoint}", self.base_url)))
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.authorized(self.client.post(format!("{}{endpoint}", self.base_url)))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Value> {
        let form = reqwest::multipart::Form::new()
            .text("username", username.to_string())
            .text("email", email.to_string())
            .text("password", password.to_string());

        let response = self
            .client
            .post(format!("{}/users/register", self.base_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Logs in and keeps the access token for subsequent requests.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/users/login", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        self.access_token = body["data"]["accessToken"].as_str().map(String::from);
        Ok(body)
    }

    pub async fn get_json(&self, endpoint: &str) -> Result<Value> {
        let response = self.get(endpoint).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let response = self
            .post(endpoint)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// POST without error_for_status, for asserting on error envelopes.
    pub async fn post_raw(&self, endpoint: &str, body: &Value) -> Result<reqwest::Response> {
        Ok(self.post(endpoint).json(body).send().await?)
    }

    pub async fn create_server(&self, name: &str, profile_id: &str) -> Result<Value> {
        let form = reqwest::multipart::Form::new()
            .text("serverName", name.to_string())
            .text("profileId", profile_id.to_string());

        let response = self
            .post("/servers/createServer")
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}
