use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Config, TokenError};

/// Claims embedded in short-lived access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims embedded in long-lived refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and verifies the access/refresh token pair.
///
/// The refresh token is additionally persisted per user; verification of a
/// refresh credential is signature + expiry here, and equality against the
/// stored copy at the service layer.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::from_secrets(
            config.access_token_secret.as_bytes(),
            config.refresh_token_secret.as_bytes(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    #[must_use]
    pub fn from_secrets(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_access(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = AccessClaims {
            sub: user_id,
            username: username.to_string(),
            email: email.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.access_ttl).unix_timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = RefreshClaims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + self.refresh_ttl).unix_timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode(token, &self.access_decoding)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode(token, &self.refresh_decoding)
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
) -> Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<T>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(access_ttl: Duration) -> TokenIssuer {
        TokenIssuer::from_secrets(
            b"access-test-secret",
            b"refresh-test-secret",
            access_ttl,
            Duration::days(1),
        )
    }

    #[test]
    fn access_token_round_trips() {
        let issuer = issuer(Duration::minutes(15));
        let id = Uuid::new_v4();
        let token = issuer.issue_access(id, "maki", "maki@example.com").expect("issue");

        let claims = issuer.verify_access(&token).expect("verify");
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "maki");
        assert_eq!(claims.email, "maki@example.com");
    }

    #[test]
    fn refresh_token_round_trips() {
        let issuer = issuer(Duration::minutes(15));
        let id = Uuid::new_v4();
        let token = issuer.issue_refresh(id).expect("issue");

        let claims = issuer.verify_refresh(&token).expect("verify");
        assert_eq!(claims.sub, id);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let issuer = issuer(Duration::minutes(-5));
        let token = issuer
            .issue_access(Uuid::new_v4(), "maki", "maki@example.com")
            .expect("issue");

        assert!(matches!(issuer.verify_access(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn access_token_does_not_verify_as_refresh() {
        let issuer = issuer(Duration::minutes(15));
        let token = issuer
            .issue_access(Uuid::new_v4(), "maki", "maki@example.com")
            .expect("issue");

        assert!(issuer.verify_refresh(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = issuer(Duration::minutes(15));
        let mut token = issuer
            .issue_access(Uuid::new_v4(), "maki", "maki@example.com")
            .expect("issue");
        token.push('x');

        assert!(matches!(issuer.verify_access(&token), Err(TokenError::Invalid(_))));
    }
}
