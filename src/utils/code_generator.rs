//! Short code generation and validation utilities.
//!
//! Random codes are 7 characters drawn uniformly and independently from a
//! 62-symbol alphabet. Uniqueness is probabilistic; every candidate is checked
//! against the store inside the caller's transaction, with a bounded retry
//! budget on collision.

use rand::Rng;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::repositories::LinkTransaction;
use crate::error::AppError;

/// Symbols a generated short code may contain.
pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of a generated short code.
pub const CODE_LENGTH: usize = 7;

/// Default number of candidates tried before giving up.
pub const DEFAULT_RETRY_BUDGET: usize = 10;

pub const MIN_CUSTOM_LENGTH: usize = 3;
pub const MAX_CUSTOM_LENGTH: usize = 20;

/// Codes that collide with operational path segments.
///
/// Compared case-insensitively against custom codes.
pub const RESERVED_WORDS: &[&str] = &[
    "admin", "api", "www", "mail", "ftp", "localhost", "about", "contact", "help", "support",
    "login", "logout", "register", "signup", "signin", "dashboard", "settings", "profile",
    "account", "delete", "edit", "create", "update", "new", "old", "test", "demo", "example",
    "shorten", "url", "link", "links", "stats", "analytics", "report", "export", "import",
    "search", "filter", "sort", "page", "next", "prev", "first", "last", "home", "health",
    "metrics", "static",
];

/// Produces one random candidate code.
pub fn generate_candidate() -> String {
    let mut rng = rand::rng();

    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns true if `code` could have been produced by [`generate_candidate`].
pub fn is_generated_shape(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Returns true if `code` is on the reserved denylist, ignoring case.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved word (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < MIN_CUSTOM_LENGTH || code.len() > MAX_CUSTOM_LENGTH {
        return Err(AppError::bad_request(
            format!(
                "Custom short code must be {}-{} characters",
                MIN_CUSTOM_LENGTH, MAX_CUSTOM_LENGTH
            ),
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Custom short code must contain only alphanumeric characters (a-z, A-Z, 0-9)",
            json!({ "code": code }),
        ));
    }

    if is_reserved(code) {
        return Err(AppError::bad_request(
            format!("'{}' is a reserved word and cannot be used", code),
            json!({ "code": code, "reason": "reserved" }),
        ));
    }

    Ok(())
}

/// Generates short codes that are unused in the store.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    retry_budget: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BUDGET)
    }
}

impl CodeGenerator {
    pub fn new(retry_budget: usize) -> Self {
        Self {
            retry_budget: retry_budget.max(1),
        }
    }

    pub fn retry_budget(&self) -> usize {
        self.retry_budget
    }

    /// Draws candidates until one is unused, checking each through `tx`.
    ///
    /// The check runs in the same transaction the caller later inserts with.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] with reason `collision_exhausted` after
    /// `retry_budget` colliding candidates, or any store error from the lookup.
    pub async fn generate(&self, tx: &mut dyn LinkTransaction) -> Result<String, AppError> {
        self.generate_with(tx, generate_candidate).await
    }

    /// Same as [`generate`](Self::generate) with an explicit candidate source.
    pub async fn generate_with<F>(
        &self,
        tx: &mut dyn LinkTransaction,
        mut next_candidate: F,
    ) -> Result<String, AppError>
    where
        F: FnMut() -> String + Send,
    {
        for attempt in 1..=self.retry_budget {
            let candidate = next_candidate();

            if tx.find_by_code(&candidate).await?.is_none() {
                debug!(code = %candidate, attempt, "Generated short code");
                return Ok(candidate);
            }

            debug!(code = %candidate, attempt, "Short code collision");
        }

        warn!(attempts = self.retry_budget, "Short code generation exhausted retry budget");
        Err(AppError::internal(
            "Failed to generate a unique short code",
            json!({ "reason": "collision_exhausted", "attempts": self.retry_budget }),
        ))
    }
}
