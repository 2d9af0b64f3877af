use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::{AppError, CloudinaryConfig};

/// An asset stored with the media provider.
#[derive(Clone, Debug)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadedImage, AppError>;
    async fn delete(&self, public_id: &str) -> Result<(), AppError>;
}

/// Cloudinary-backed media storage using its signed upload REST API.
pub struct CloudinaryStore {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
    public_id: String,
}

impl CloudinaryStore {
    #[must_use]
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{action}",
            self.config.cloud_name
        )
    }
}

/// Cloudinary request signature: the parameters (minus `file` and `api_key`)
/// sorted by name, joined `k=v` with `&`, with the API secret appended, then
/// hashed. We opt into sha256 via the `signature_algorithm` parameter.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_by_key(|&(name, _)| name);

    let joined = sorted
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadedImage, AppError> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        let signature = sign_params(
            &[("signature_algorithm", "sha256"), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            )
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let uploaded: CloudinaryUploadResponse = response.json().await?;
        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        let signature = sign_params(
            &[
                ("public_id", public_id),
                ("signature_algorithm", "sha256"),
                ("timestamp", &timestamp),
            ],
            &self.config.api_secret,
        );

        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        self.http
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_parameters_by_name() {
        let unsorted = sign_params(&[("timestamp", "100"), ("public_id", "abc")], "secret");
        let sorted = sign_params(&[("public_id", "abc"), ("timestamp", "100")], "secret");
        assert_eq!(unsorted, sorted);
    }

    #[test]
    fn signature_is_hex_sha256() {
        let signature = sign_params(&[("timestamp", "100")], "secret");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

        let mut hasher = Sha256::new();
        hasher.update(b"timestamp=100");
        hasher.update(b"secret");
        assert_eq!(signature, hex::encode(hasher.finalize()));
    }

    #[test]
    fn signature_depends_on_secret() {
        let a = sign_params(&[("timestamp", "100")], "secret-a");
        let b = sign_params(&[("timestamp", "100")], "secret-b");
        assert_ne!(a, b);
    }
}
