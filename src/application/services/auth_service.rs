//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::warn;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// The authenticated caller of an API request.
///
/// Inserted into request extensions by the auth middleware. `owner_id` scopes
/// every create, list and delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub owner_id: String,
    pub token_name: String,
}

/// Hashes a raw token with HMAC-SHA256 keyed by `secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses this
/// when issuing tokens, so both sides must share the same secret.
pub fn hash_token(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Service for authenticating API requests via Bearer tokens.
///
/// An attacker with read-only access to the database cannot verify or forge
/// tokens without the server-side secret.
pub struct AuthService {
    repository: Arc<dyn TokenRepository>,
    signing_secret: String,
}

impl AuthService {
    /// `signing_secret` must match the value used when tokens were created.
    pub fn new(repository: Arc<dyn TokenRepository>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    pub fn hash_token(&self, token: &str) -> String {
        hash_token(&self.signing_secret, token)
    }

    /// Resolves a raw bearer token to its [`Principal`].
    ///
    /// On success, updates the token's `last_used_at`; a failure there is
    /// logged and does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let token_hash = self.hash_token(token);

        let Some(api_token) = self.repository.find_active(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            warn!(token = %api_token.name, error = %e, "Failed to update token last_used_at");
        }

        Ok(Principal {
            owner_id: api_token.owner_id,
            token_name: api_token.name,
        })
    }
}
