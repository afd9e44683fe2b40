//! Bot secret derivation and HMAC signing.
//!
//! A bot token has the shape `<bot_id>:<secret>`. The key used to sign
//! init data is `HMAC-SHA256(key = "WebAppData", message = token)`, and
//! the signature itself is `HMAC-SHA256(key = bot secret, message =
//! data-check string)`, hex encoded.
//!
//! Secrets are derived once from configuration and passed around as an
//! immutable [`BotSecrets`] value. Key bytes are zeroized on drop.

use std::collections::HashMap;
use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::InitDataError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed label the platform keys the secret derivation with.
const WEB_APP_DATA_LABEL: &[u8] = b"WebAppData";

/// Length of an HMAC-SHA256 tag in bytes.
pub const SIGNATURE_LEN: usize = 32;

/// Parse a bot identifier, rejecting non-integers and non-positive values.
pub fn parse_bot_id(input: &str) -> Result<i64, InitDataError> {
    let bot_id = input
        .trim()
        .parse::<i64>()
        .map_err(|e| InitDataError::InvalidBotId {
            reason: e.to_string(),
        })?;
    check_bot_id(bot_id)?;
    Ok(bot_id)
}

/// Reject bot identifiers that are zero or negative.
pub fn check_bot_id(bot_id: i64) -> Result<(), InitDataError> {
    if bot_id <= 0 {
        return Err(InitDataError::InvalidBotId {
            reason: format!("must be a positive integer, got {bot_id}"),
        });
    }
    Ok(())
}

/// The HMAC key for one bot, derived from its token.
pub struct BotSecret {
    bot_id: i64,
    key: Zeroizing<[u8; SIGNATURE_LEN]>,
}

impl BotSecret {
    /// Derive the secret from a `<bot_id>:<secret>` bot token.
    ///
    /// # Errors
    ///
    /// Returns [`InitDataError::InvalidBotToken`] if the token lacks the
    /// `:` separator, has an empty secret part, or its bot id is not a
    /// positive integer.
    pub fn from_token(token: &str) -> Result<Self, InitDataError> {
        let token = token.trim();
        let (id_part, secret_part) =
            token
                .split_once(':')
                .ok_or_else(|| InitDataError::InvalidBotToken {
                    reason: "expected '<bot_id>:<secret>'".to_string(),
                })?;

        if secret_part.is_empty() {
            return Err(InitDataError::InvalidBotToken {
                reason: "secret part is empty".to_string(),
            });
        }

        let bot_id = parse_bot_id(id_part).map_err(|e| InitDataError::InvalidBotToken {
            reason: format!("bot id part: {e}"),
        })?;

        let mut key = Zeroizing::new([0u8; SIGNATURE_LEN]);
        key.copy_from_slice(&hmac_sha256(WEB_APP_DATA_LABEL, token.as_bytes()));

        Ok(Self { bot_id, key })
    }

    /// The bot identifier embedded in the token.
    pub fn bot_id(&self) -> i64 {
        self.bot_id
    }

    /// Compute the lowercase hex signature of a data-check string.
    pub fn sign(&self, data_check_string: &str) -> String {
        hex::encode(hmac_sha256(&*self.key, data_check_string.as_bytes()))
    }

    /// Check `signature` against a data-check string in constant time.
    ///
    /// A signature of the wrong length never verifies.
    pub fn verify(&self, data_check_string: &str, signature: &[u8]) -> bool {
        let mut mac = new_mac(&*self.key);
        mac.update(data_check_string.as_bytes());
        mac.verify_slice(signature).is_ok()
    }
}

/// Custom `Debug` that redacts the derived key.
impl fmt::Debug for BotSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSecret")
            .field("bot_id", &self.bot_id)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Immutable set of bot secrets keyed by bot id.
///
/// Built once from configuration and shared by reference; lookups take
/// no locks.
#[derive(Debug, Default)]
pub struct BotSecrets {
    secrets: HashMap<i64, BotSecret>,
}

impl BotSecrets {
    /// Derive secrets for every token. If two tokens share a bot id the
    /// first one is kept.
    ///
    /// # Errors
    ///
    /// Returns the first token-shape error encountered.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, InitDataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut secrets = HashMap::new();
        for token in tokens {
            let secret = BotSecret::from_token(token.as_ref())?;
            let bot_id = secret.bot_id();
            if secrets.contains_key(&bot_id) {
                tracing::warn!(bot_id, "duplicate bot token ignored");
                continue;
            }
            secrets.insert(bot_id, secret);
        }
        Ok(Self { secrets })
    }

    pub fn get(&self, bot_id: i64) -> Option<&BotSecret> {
        self.secrets.get(&bot_id)
    }

    /// The single configured secret, if exactly one is configured.
    pub fn sole(&self) -> Option<&BotSecret> {
        match self.secrets.len() {
            1 => self.secrets.values().next(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

fn new_mac(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length")
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; SIGNATURE_LEN] {
    let mut mac = new_mac(key);
    mac.update(message);
    let mut tag = [0u8; SIGNATURE_LEN];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "7342037359:AAFake-token-used-only-in-tests";

    #[test]
    fn test_parse_bot_id_accepts_positive_integer() {
        assert_eq!(parse_bot_id("7342037359").unwrap(), 7342037359);
    }

    #[test]
    fn test_parse_bot_id_rejects_garbage() {
        let err = parse_bot_id("invalid_bot_id").unwrap_err();
        assert!(matches!(
            err,
            InitDataError::InvalidBotId { reason } if reason.contains("invalid digit")
        ));
    }

    #[test]
    fn test_parse_bot_id_rejects_empty() {
        assert!(matches!(
            parse_bot_id(""),
            Err(InitDataError::InvalidBotId { .. })
        ));
    }

    #[test]
    fn test_parse_bot_id_rejects_zero_and_negative() {
        assert!(parse_bot_id("0").is_err());
        assert!(parse_bot_id("-12").is_err());
    }

    #[test]
    fn test_from_token_extracts_bot_id() {
        let secret = BotSecret::from_token(TOKEN).unwrap();
        assert_eq!(secret.bot_id(), 7342037359);
    }

    #[test]
    fn test_from_token_rejects_missing_separator() {
        let err = BotSecret::from_token("no-separator").unwrap_err();
        assert!(matches!(err, InitDataError::InvalidBotToken { .. }));
    }

    #[test]
    fn test_from_token_rejects_empty_secret() {
        let err = BotSecret::from_token("123:").unwrap_err();
        assert!(matches!(
            err,
            InitDataError::InvalidBotToken { reason } if reason.contains("empty")
        ));
    }

    #[test]
    fn test_from_token_rejects_non_numeric_bot_id() {
        let err = BotSecret::from_token("abc:secret").unwrap_err();
        assert!(matches!(err, InitDataError::InvalidBotToken { .. }));
    }

    #[test]
    fn test_secret_derivation_matches_manual_hmac() {
        let secret = BotSecret::from_token(TOKEN).unwrap();

        let mut derive = HmacSha256::new_from_slice(b"WebAppData").unwrap();
        derive.update(TOKEN.as_bytes());
        let key = derive.finalize().into_bytes();

        let mut mac = HmacSha256::new_from_slice(&key).unwrap();
        mac.update(b"auth_date=1\nquery_id=Q");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(secret.sign("auth_date=1\nquery_id=Q"), expected);
    }

    #[test]
    fn test_sign_is_lowercase_hex_of_digest_length() {
        let secret = BotSecret::from_token(TOKEN).unwrap();
        let signature = secret.sign("auth_date=1");
        assert_eq!(signature.len(), SIGNATURE_LEN * 2);
        assert!(
            signature
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_verify_accepts_own_signature() {
        let secret = BotSecret::from_token(TOKEN).unwrap();
        let signature = hex::decode(secret.sign("auth_date=1")).unwrap();
        assert!(secret.verify("auth_date=1", &signature));
    }

    #[test]
    fn test_verify_rejects_other_message_and_truncated_tag() {
        let secret = BotSecret::from_token(TOKEN).unwrap();
        let signature = hex::decode(secret.sign("auth_date=1")).unwrap();
        assert!(!secret.verify("auth_date=2", &signature));
        assert!(!secret.verify("auth_date=1", &signature[..16]));
        assert!(!secret.verify("auth_date=1", &[]));
    }

    #[test]
    fn test_different_tokens_give_different_signatures() {
        let a = BotSecret::from_token("1:aaa").unwrap();
        let b = BotSecret::from_token("1:aab").unwrap();
        assert_ne!(a.sign("auth_date=1"), b.sign("auth_date=1"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let secret = BotSecret::from_token(TOKEN).unwrap();
        let debug_output = format!("{secret:?}");
        assert!(debug_output.contains("7342037359"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AAFake"));
    }

    #[test]
    fn test_bot_secrets_lookup_by_id() {
        let secrets = BotSecrets::from_tokens(["1:one", "2:two"]).unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets.get(2).unwrap().bot_id(), 2);
        assert!(secrets.get(3).is_none());
        assert!(secrets.sole().is_none());
    }

    #[test]
    fn test_bot_secrets_duplicate_bot_id_keeps_first() {
        let secrets = BotSecrets::from_tokens(["1:first", "1:second"]).unwrap();
        let first = BotSecret::from_token("1:first").unwrap();
        assert_eq!(secrets.len(), 1);
        assert_eq!(
            secrets.get(1).unwrap().sign("auth_date=1"),
            first.sign("auth_date=1")
        );
    }

    #[test]
    fn test_bot_secrets_sole_with_one_token() {
        let secrets = BotSecrets::from_tokens([TOKEN]).unwrap();
        assert_eq!(secrets.sole().unwrap().bot_id(), 7342037359);
    }

    #[test]
    fn test_bot_secrets_propagates_token_error() {
        assert!(BotSecrets::from_tokens(["1:ok", "broken"]).is_err());
    }

    #[test]
    fn test_bot_secrets_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BotSecrets>();
    }
}
