//! Domain error types for initdata-term.
//!
//! All business-logic errors are defined here using `thiserror`.
//! Decoding and validation share one enum so callers see a single
//! taxonomy; the CLI and router convert them to user-facing messages.

use thiserror::Error;

/// Errors that can occur while decoding or validating init data.
///
/// Every variant is terminal: retrying with the same input yields the
/// same error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InitDataError {
    /// A field could not be decoded into its typed representation.
    #[error("failed to decode {field}: {reason}")]
    Decode {
        /// The init-data key that failed (e.g., "user", "auth_date").
        field: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// The `hash` parameter is absent.
    #[error("sign is missing")]
    SignMissing,

    /// The recomputed signature does not match the supplied `hash`.
    #[error("sign is invalid")]
    SignatureMismatch,

    /// The `auth_date` parameter is absent.
    #[error("auth_date is missing")]
    AuthDateMissing,

    /// `auth_date` is older than the freshness window allows.
    #[error("init data is expired")]
    Expired,

    /// `auth_date` lies further in the future than the clock skew allows.
    #[error("auth_date is in the future")]
    AuthDateInFuture,

    /// The bot identifier is not a positive integer.
    #[error("invalid bot id: {reason}")]
    InvalidBotId {
        /// Description of why the identifier was rejected.
        reason: String,
    },

    /// No bot token is configured for the requested bot identifier.
    #[error("no bot token configured for bot {bot_id}")]
    UnknownBot {
        /// The bot identifier that was looked up.
        bot_id: i64,
    },

    /// The freshness window is zero or negative.
    #[error("invalid freshness window: must be a positive number of seconds")]
    InvalidFreshnessWindow,

    /// The bot token does not have the `<bot_id>:<secret>` shape.
    #[error("invalid bot token: {reason}")]
    InvalidBotToken {
        /// Description of the shape violation.
        reason: String,
    },

    /// Failed to parse a time-travel expression.
    #[error("invalid time expression '{expression}': {reason}")]
    InvalidTimeExpression {
        /// The time expression that failed to parse.
        expression: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// No init data was provided via any input method.
    #[error(
        "no init data provided: pass it as an argument, via --init-data-env, or through stdin"
    )]
    NoInitDataProvided,

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The environment variable name is empty or contains `=` or NUL.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },
}

impl InitDataError {
    /// Build a [`InitDataError::Decode`] for the given field.
    pub fn decode(field: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the init data itself was rejected, as
    /// opposed to the caller's configuration or arguments being wrong.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. }
                | Self::SignMissing
                | Self::SignatureMismatch
                | Self::AuthDateMissing
                | Self::Expired
                | Self::AuthDateInFuture
        )
    }
}
