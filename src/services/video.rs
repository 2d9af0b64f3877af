use jsonwebtoken::{EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{LivekitConfig, TokenError};

const ROOM_TOKEN_TTL: Duration = Duration::minutes(10);

/// Claim set of a LiveKit room access token. The issuer is the API key and
/// the subject is the participant identity; the grant scopes the token to a
/// single room.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomClaims {
    pub iss: String,
    pub sub: String,
    pub name: String,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room_join: bool,
    pub room: String,
}

/// Mints short-lived LiveKit access tokens, signed with the API secret.
#[derive(Clone)]
pub struct VideoTokenIssuer {
    api_key: String,
    encoding_key: EncodingKey,
}

impl VideoTokenIssuer {
    #[must_use]
    pub fn new(config: &LivekitConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            encoding_key: EncodingKey::from_secret(config.api_secret.as_bytes()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn issue(&self, room_name: &str, participant_name: &str) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = RoomClaims {
            iss: self.api_key.clone(),
            sub: participant_name.to_string(),
            name: participant_name.to_string(),
            nbf: now.unix_timestamp(),
            exp: (now + ROOM_TOKEN_TTL).unix_timestamp(),
            video: VideoGrant {
                room_join: true,
                room: room_name.to_string(),
            },
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }
}
