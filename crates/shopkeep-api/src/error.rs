use thiserror::Error;

/// Top-level error type for the `shopkeep-api` crate.
///
/// Covers every failure mode of a GraphQL exchange: authentication,
/// transport, HTTP status, GraphQL `errors` payloads, and decoding.
/// `shopkeep-core` folds these into its user-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token missing, rejected, or expired (HTTP 401 from the auth middleware).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-success HTTP status that is not an auth failure.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── GraphQL ─────────────────────────────────────────────────────
    /// First entry of a GraphQL `errors` array.
    #[error("{message}")]
    GraphQl {
        message: String,
        code: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the token was rejected and the session should
    /// be torn down.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::GraphQl { message, code } => {
                code.as_deref() == Some("UNAUTHENTICATED")
                    || contains_any(message, &["unauthorized", "invalid or expired token"])
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the addressed entity does not exist (any more).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Http { status: 404, .. } => true,
            Self::GraphQl { message, code } => {
                code.as_deref() == Some("NOT_FOUND")
                    || contains_any(message, &["not found", "no documents"])
            }
            _ => false,
        }
    }

    /// Returns `true` if the backend rejected the submitted payload.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Http { status: 400 | 422, .. } => true,
            Self::GraphQl { message, code } => {
                matches!(
                    code.as_deref(),
                    Some("BAD_USER_INPUT" | "GRAPHQL_VALIDATION_FAILED" | "VALIDATION")
                ) || contains_any(message, &["already exists", "invalid", "must be"])
            }
            _ => false,
        }
    }

    /// Extract the GraphQL error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::GraphQl { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

fn contains_any(message: &str, needles: &[&str]) -> bool {
    let lower = message.to_ascii_lowercase();
    needles.iter().any(|n| lower.contains(n))
}
