use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::User,
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the access tokens issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): id of the user in the `users` table.
    pub sub: Uuid,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Every owner-scoped check in the
/// handlers compares against `id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl AuthUser {
    fn authenticated(user: User, via: &'static str) -> Self {
        let auth_user = Self::from(user);
        tracing::debug!(
            user_id = %auth_user.id,
            username = %auth_user.username,
            via,
            "request authenticated"
        );
        auth_user
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Local bypass: in `Env::Local` a known user id in the `x-user-id` header is accepted.
/// 2. Bearer token extraction and JWT (HS256) validation, expiry included.
/// 3. Database lookup, so tokens of deleted users stop working.
///
/// Rejection: StatusCode::UNAUTHORIZED (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id_str| Uuid::parse_str(id_str).ok());

            if let Some(user_id) = bypass_id {
                if let Ok(Some(user)) = repo.get_user(user_id).await {
                    return Ok(AuthUser::authenticated(user, "local-bypass"));
                }
            }
        }
        // Production, or a failed bypass: fall through to JWT validation.

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT rejected: {:?}", e.kind());
            StatusCode::UNAUTHORIZED
        })?;

        let user = match repo.get_user(token_data.claims.sub).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(StatusCode::UNAUTHORIZED),
            Err(e) => {
                tracing::error!("user lookup failed during auth: {:?}", e);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        Ok(AuthUser::authenticated(user, "jwt"))
    }
}
