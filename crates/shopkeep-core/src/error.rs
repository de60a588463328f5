// ── Core error types ──
//
// User-facing errors from shopkeep-core. Consumers never see HTTP
// statuses or GraphQL envelopes directly: `CoreError::from_api` folds
// transport-layer errors into the four-way taxonomy the console acts on
// (validation, not-found, auth, transport).

use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::model::ResourceKind;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Correctable input ────────────────────────────────────────────
    /// Bad input, either caught locally or rejected by the backend.
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("The {kind} {identifier} no longer exists")]
    NotFound {
        kind: ResourceKind,
        identifier: String,
    },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ── Transport errors ─────────────────────────────────────────────
    #[error("Cannot reach the backend: {message}")]
    Transport { message: String },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session store error: {message}")]
    Store { message: String },
}

const NOT_SIGNED_IN: &str = "not signed in";

/// Coarse classification driving the console's error policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Auth,
    Transport,
    Local,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Config { .. } | Self::Store { .. } => ErrorKind::Local,
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn not_signed_in() -> Self {
        Self::Auth {
            message: NOT_SIGNED_IN.into(),
        }
    }

    /// No session at all, as opposed to one the backend rejected.
    pub fn is_not_signed_in(&self) -> bool {
        matches!(self, Self::Auth { message } if message == NOT_SIGNED_IN)
    }

    /// Fold an API error into the taxonomy.
    ///
    /// `kind` and `id` describe the addressed entity so a not-found
    /// can name it; they are ignored for every other class.
    pub fn from_api(err: shopkeep_api::Error, kind: ResourceKind, id: Option<&str>) -> Self {
        // Token errors may also read as validation ("invalid ..."), so test auth first.
        if err.is_auth_expired() {
            return Self::Auth {
                message: err.to_string(),
            };
        }
        if err.is_not_found() {
            return Self::NotFound {
                kind,
                identifier: id.unwrap_or_default().to_owned(),
            };
        }
        let validation = err.is_validation();
        let transient = err.is_transient();
        let code = err.api_error_code().map(str::to_owned);
        match err {
            shopkeep_api::Error::GraphQl { message, .. } if validation => Self::Validation {
                field: None,
                message,
            },
            // Server-side failures reported in `errors[]` are not the operator's to fix.
            shopkeep_api::Error::GraphQl { message, .. } => Self::Transport {
                message: match code {
                    Some(code) => format!("{message} ({code})"),
                    None => message,
                },
            },
            shopkeep_api::Error::Http { status, message } if (400..500).contains(&status) => {
                Self::Validation {
                    field: None,
                    message: format!("rejected (HTTP {status}): {message}"),
                }
            }
            shopkeep_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            shopkeep_api::Error::Deserialization { message, body: _ } => Self::Transport {
                message: format!("unexpected response: {message}"),
            },
            other if transient => Self::Transport {
                message: format!("{other} (temporary, try again)"),
            },
            other => Self::Transport {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gql(message: &str) -> shopkeep_api::Error {
        shopkeep_api::Error::GraphQl {
            message: message.into(),
            code: None,
        }
    }

    #[test]
    fn maps_api_errors_to_taxonomy() {
        let dup = CoreError::from_api(gql("email already exists"), ResourceKind::Account, None);
        assert_eq!(dup.kind(), ErrorKind::Validation);
        assert_eq!(dup.to_string(), "email already exists");

        let gone = CoreError::from_api(
            gql("mongo: no documents in result"),
            ResourceKind::CatalogItem,
            Some("p1"),
        );
        assert_eq!(gone.kind(), ErrorKind::NotFound);
        assert_eq!(gone.to_string(), "The product p1 no longer exists");

        let expired = CoreError::from_api(
            shopkeep_api::Error::Authentication {
                message: "Invalid or expired token".into(),
            },
            ResourceKind::Account,
            None,
        );
        assert_eq!(expired.kind(), ErrorKind::Auth);

        let down = CoreError::from_api(
            shopkeep_api::Error::Timeout { timeout_secs: 30 },
            ResourceKind::Account,
            None,
        );
        assert_eq!(down.kind(), ErrorKind::Transport);
        assert!(down.to_string().ends_with("(temporary, try again)"));
    }

    #[test]
    fn server_side_graphql_error_is_transport() {
        let err = shopkeep_api::Error::GraphQl {
            message: "failed to insert user: server selection timeout".into(),
            code: Some("INTERNAL_SERVER_ERROR".into()),
        };
        assert!(!err.is_validation());

        let mapped = CoreError::from_api(err, ResourceKind::Account, None);
        assert_eq!(mapped.kind(), ErrorKind::Transport);
        assert_eq!(
            mapped.to_string(),
            "Cannot reach the backend: failed to insert user: server selection timeout \
             (INTERNAL_SERVER_ERROR)"
        );

        let coded = CoreError::from_api(
            shopkeep_api::Error::GraphQl {
                message: "price out of range".into(),
                code: Some("BAD_USER_INPUT".into()),
            },
            ResourceKind::CatalogItem,
            None,
        );
        assert_eq!(coded.kind(), ErrorKind::Validation);
    }
}
