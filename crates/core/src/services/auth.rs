//! Token issuing and verification.
//!
//! Login hands out a signed access/refresh pair. Access tokens authenticate
//! requests; refresh tokens are only good for minting a new access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use potluck_common::{AppError, AppResult, IdGenerator, config::AuthConfig};
use potluck_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::services::user::UserService;

/// Which half of the pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Access and refresh token returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Access token returned by refresh.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_service: UserService,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(user_service: UserService, config: &AuthConfig) -> Self {
        Self {
            user_service,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: Duration::minutes(config.refresh_token_ttl_minutes),
            id_gen: IdGenerator::new(),
        }
    }

    /// Check credentials and issue a token pair.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self.user_service.authenticate(username, password).await?;
        tracing::debug!(username = %user.username, "Issued token pair");

        Ok(TokenPair {
            access: self.issue(&user.username, TokenType::Access)?,
            refresh: self.issue(&user.username, TokenType::Refresh)?,
        })
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let claims = self.verify(refresh_token, TokenType::Refresh)?;

        // The account may have been removed since the token was issued.
        if self
            .user_service
            .find_by_username(&claims.sub)
            .await?
            .is_none()
        {
            return Err(AppError::Unauthorized);
        }

        Ok(AccessToken {
            access: self.issue(&claims.sub, TokenType::Access)?,
        })
    }

    /// Resolve a bearer access token to its user.
    pub async fn authenticate_access(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.verify(token, TokenType::Access)?;

        self.user_service
            .find_by_username(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Sign a token of the given type for `username`.
    pub fn issue(&self, username: &str, token_type: TokenType) -> AppResult<String> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: username.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: self.id_gen.generate_token(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Decode and check a token, requiring the expected type.
    pub fn verify(&self, token: &str, expected: TokenType) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                AppError::Unauthorized
            })?;

        if data.claims.token_type != expected {
            return Err(AppError::Unauthorized);
        }

        Ok(data.claims)
    }
}
