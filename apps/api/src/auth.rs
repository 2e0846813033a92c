//! Caller identity from the hosted auth provider's bearer token.
//!
//! Tokens are HS256 JWTs signed with the provider's project secret. The API only
//! verifies them: signature, algorithm, expiry, and a UUID `sub` claim. Audience
//! is not checked.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("unsupported algorithm '{0}'")]
    Algorithm(String),
    #[error("signature mismatch")]
    Signature,
    #[error("token expired")]
    Expired,
    #[error("subject claim missing or not a UUID")]
    Subject,
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    exp: Option<i64>,
}

/// Verifies an HS256 token and returns the subject user id.
pub fn verify_token(token: &str, secret: &str, now_unix: i64) -> Result<Uuid, TokenError> {
    let mut parts = token.split('.');
    let (header_b64, claims_b64, signature_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(c), Some(s), None) => (h, c, s),
            _ => return Err(TokenError::Malformed),
        };

    let header: Header = decode_segment(header_b64)?;
    if header.alg != "HS256" {
        return Err(TokenError::Algorithm(header.alg));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::Signature)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::Signature)?;

    let claims: Claims = decode_segment(claims_b64)?;
    if let Some(exp) = claims.exp {
        if exp <= now_unix {
            return Err(TokenError::Expired);
        }
    }

    claims
        .sub
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(TokenError::Subject)
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Authenticated caller. Every owned-resource handler takes this extractor;
/// the id is the only user identity the handlers ever trust.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let now = Utc::now().timestamp();
        verify_token(token, &state.config.auth_jwt_secret, now)
            .map(AuthUser)
            .map_err(|e| {
                debug!("Rejected bearer token: {e}");
                AppError::Unauthorized
            })
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// GET /api/v1/auth/me
///
/// A valid token whose account row does not exist yet is a 404.
pub async fn handle_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) const SECRET: &str = "test-secret-with-enough-entropy";

    /// Builds a signed HS256 token for tests.
    pub(crate) fn sign(claims: serde_json::Value, secret: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
        let body = URL_SAFE_NO_PAD.encode(claims.to_string());
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{header}.{body}").as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{header}.{body}.{sig}")
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let user = Uuid::new_v4();
        let token = sign(json!({"sub": user.to_string(), "exp": 2_000}), SECRET);
        assert_eq!(verify_token(&token, SECRET, 1_000), Ok(user));
    }

    #[test]
    fn test_token_without_exp_is_accepted() {
        let user = Uuid::new_v4();
        let token = sign(json!({"sub": user.to_string()}), SECRET);
        assert_eq!(verify_token(&token, SECRET, 1_000), Ok(user));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign(json!({"sub": Uuid::new_v4().to_string()}), "other");
        assert_eq!(verify_token(&token, SECRET, 0), Err(TokenError::Signature));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = sign(json!({"sub": Uuid::new_v4().to_string(), "exp": 10}), SECRET);
        assert_eq!(verify_token(&token, SECRET, 10), Err(TokenError::Expired));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let token = sign(json!({"sub": "user-42"}), SECRET);
        assert_eq!(verify_token(&token, SECRET, 0), Err(TokenError::Subject));
        let token = sign(json!({"role": "anon"}), SECRET);
        assert_eq!(verify_token(&token, SECRET, 0), Err(TokenError::Subject));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(verify_token("abc", SECRET, 0), Err(TokenError::Malformed));
        assert_eq!(verify_token("a.b.c.d", SECRET, 0), Err(TokenError::Malformed));
        assert_eq!(verify_token("!!.??.##", SECRET, 0), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tampered_claims_fail_signature() {
        let token = sign(json!({"sub": Uuid::new_v4().to_string()}), SECRET);
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(json!({"sub": Uuid::new_v4().to_string()}).to_string());
        parts[1] = &forged;
        assert_eq!(
            verify_token(&parts.join("."), SECRET, 0),
            Err(TokenError::Signature)
        );
    }

    #[test]
    fn test_none_algorithm_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "none"}).to_string());
        let body = URL_SAFE_NO_PAD.encode(json!({"sub": Uuid::new_v4().to_string()}).to_string());
        let token = format!("{header}.{body}.");
        assert_eq!(
            verify_token(&token, SECRET, 0),
            Err(TokenError::Algorithm("none".into()))
        );
    }
}
