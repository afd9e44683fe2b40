//! Init-data signature and freshness validation.
//!
//! Recomputes the HMAC-SHA256 signature over the canonical data-check
//! string with the bot's secret, compares it with the supplied `hash`
//! in constant time, and then enforces the freshness window on
//! `auth_date`. Validation is all-or-nothing.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::canonical::data_check_string;
use super::decoder::{DecodedInitData, decode};
use super::raw::{HASH_KEY, RawInitData};
use super::secret::{BotSecret, BotSecrets, check_bot_id};
use crate::error::InitDataError;

/// Default freshness window: one day.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// How far `auth_date` may lie in the future before it is rejected.
pub const CLOCK_SKEW: Duration = Duration::from_secs(30);

/// Freshness parameters for a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Maximum age of `auth_date`. Must be at least one second.
    pub max_age: Duration,
    /// The instant freshness is evaluated against.
    pub now: DateTime<Utc>,
}

impl ValidationOptions {
    pub fn new(max_age: Duration, now: DateTime<Utc>) -> Self {
        Self { max_age, now }
    }
}

/// Validate init data for `bot_id`, looking its secret up in `secrets`.
///
/// The bot id and freshness window are checked first. The secret is
/// looked up only once the init data has decoded and carries a `hash`,
/// so unsigned input reports `SignMissing` whatever bots are configured.
///
/// # Errors
///
/// - [`InitDataError::InvalidBotId`] if `bot_id <= 0`.
/// - [`InitDataError::InvalidFreshnessWindow`] if the window is shorter
///   than one second.
/// - [`InitDataError::Decode`] or [`InitDataError::SignMissing`] as in
///   [`validate`].
/// - [`InitDataError::UnknownBot`] if no token is configured for `bot_id`.
/// - Any later error [`validate`] returns.
pub fn validate_third_party(
    raw: &str,
    bot_id: i64,
    secrets: &BotSecrets,
    options: &ValidationOptions,
) -> Result<(), InitDataError> {
    check_bot_id(bot_id)?;
    check_freshness_window(options.max_age)?;
    let decoded = decode_signed(raw)?;
    let secret = secrets
        .get(bot_id)
        .ok_or(InitDataError::UnknownBot { bot_id })?;
    verify_decoded(&decoded, secret, options)
}

/// Validate init data against a known bot secret.
///
/// # Errors
///
/// - [`InitDataError::Decode`] if the claims do not decode.
/// - [`InitDataError::SignMissing`] if there is no `hash`.
/// - [`InitDataError::SignatureMismatch`] if the signature does not match.
/// - [`InitDataError::AuthDateMissing`], [`InitDataError::Expired`] or
///   [`InitDataError::AuthDateInFuture`] if the freshness check fails.
pub fn validate(
    raw: &str,
    secret: &BotSecret,
    options: &ValidationOptions,
) -> Result<(), InitDataError> {
    check_freshness_window(options.max_age)?;
    let decoded = decode_signed(raw)?;
    verify_decoded(&decoded, secret, options)
}

/// Decode `raw` and require a `hash`. No key material is needed yet.
fn decode_signed(raw: &str) -> Result<DecodedInitData, InitDataError> {
    let decoded = decode(raw)?;
    if decoded.hash().is_none() {
        return Err(InitDataError::SignMissing);
    }
    Ok(decoded)
}

fn verify_decoded(
    decoded: &DecodedInitData,
    secret: &BotSecret,
    options: &ValidationOptions,
) -> Result<(), InitDataError> {
    let hash = decoded.hash().ok_or(InitDataError::SignMissing)?;

    // Only canonical lowercase hex can match; the length check lives in `verify`.
    if !is_lowercase_hex(hash) {
        return Err(InitDataError::SignatureMismatch);
    }
    let supplied = hex::decode(hash).map_err(|_| InitDataError::SignatureMismatch)?;
    let check_string = data_check_string(&decoded.raw);
    if !secret.verify(&check_string, &supplied) {
        tracing::debug!(bot_id = secret.bot_id(), "init data signature mismatch");
        return Err(InitDataError::SignatureMismatch);
    }

    check_freshness(decoded.claims.auth_date, options)
}

fn is_lowercase_hex(value: &str) -> bool {
    value
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Sign `raw` with `secret`, replacing any existing `hash`.
///
/// Returns the query string with the new `hash` appended last.
pub fn sign(raw: &RawInitData, secret: &BotSecret) -> String {
    let hash = secret.sign(&data_check_string(raw));
    let signed = RawInitData::from_pairs(
        raw.pairs()
            .iter()
            .filter(|(key, _)| key != HASH_KEY)
            .cloned()
            .chain(std::iter::once((HASH_KEY.to_string(), hash))),
    );
    signed.to_query_string()
}

fn check_freshness_window(max_age: Duration) -> Result<(), InitDataError> {
    if max_age.as_secs() == 0 {
        return Err(InitDataError::InvalidFreshnessWindow);
    }
    Ok(())
}

fn check_freshness(
    auth_date: Option<i64>,
    options: &ValidationOptions,
) -> Result<(), InitDataError> {
    let auth_date = auth_date.ok_or(InitDataError::AuthDateMissing)?;
    let age = options.now.timestamp().saturating_sub(auth_date);

    let skew = i64::try_from(CLOCK_SKEW.as_secs()).unwrap_or(i64::MAX);
    if age < -skew {
        return Err(InitDataError::AuthDateInFuture);
    }

    let max_age = i64::try_from(options.max_age.as_secs()).unwrap_or(i64::MAX);
    if age >= max_age {
        return Err(InitDataError::Expired);
    }

    Ok(())
}
