//! Init-data decoding logic.
//!
//! Turns the percent-decoded pairs from [`RawInitData`] into typed
//! claims: JSON-valued fields (`user`, `receiver`, `chat`) are parsed
//! into structs, integer fields are parsed as `i64`, and the rest are
//! passed through as strings. No authenticity check happens here.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::raw::{HASH_KEY, RawInitData, SIGNATURE_KEY};
use crate::error::InitDataError;

/// A user (or receiver) described by the init data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub language_code: String,
    pub is_premium: bool,
    pub allows_write_to_pm: bool,
    pub photo_url: String,
    pub is_bot: bool,
    pub added_to_attachment_menu: bool,
}

/// The chat the mini-app was opened from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    pub title: String,
    pub username: String,
    pub photo_url: String,
}

/// Typed claims carried by init data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitData {
    /// Issuance time, Unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_send_after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<Chat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Decoded init data: the typed claims plus the pairs they came from.
///
/// The pairs are kept verbatim because the signature is computed over
/// their string form, not over the typed claims. Implements a custom
/// `Debug` that redacts the claims to avoid leaking personal data.
pub struct DecodedInitData {
    pub claims: InitData,
    pub raw: RawInitData,
}

impl DecodedInitData {
    /// The supplied `hash`, if present.
    pub fn hash(&self) -> Option<&str> {
        self.raw.hash()
    }
}

impl fmt::Debug for DecodedInitData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedInitData")
            .field("claims", &"[REDACTED]")
            .field("raw", &self.raw)
            .finish()
    }
}

/// Decode a raw init-data string into typed claims.
///
/// # Errors
///
/// Returns [`InitDataError::Decode`] naming the offending field if a
/// JSON-valued field is malformed or an integer field does not parse.
pub fn decode(raw: &str) -> Result<DecodedInitData, InitDataError> {
    decode_pairs(RawInitData::parse(raw))
}

/// Decode already-parsed pairs into typed claims.
pub fn decode_pairs(raw: RawInitData) -> Result<DecodedInitData, InitDataError> {
    let claims = InitData {
        auth_date: parse_auth_date(&raw)?,
        can_send_after: parse_integer(&raw, "can_send_after")?,
        chat: parse_json(&raw, "chat")?,
        chat_instance: parse_string(&raw, "chat_instance"),
        chat_type: parse_string(&raw, "chat_type"),
        hash: parse_string(&raw, HASH_KEY),
        query_id: parse_string(&raw, "query_id"),
        receiver: parse_json(&raw, "receiver")?,
        signature: parse_string(&raw, SIGNATURE_KEY),
        start_param: parse_string(&raw, "start_param"),
        user: parse_json(&raw, "user")?,
    };

    Ok(DecodedInitData { claims, raw })
}

fn parse_string(raw: &RawInitData, field: &str) -> Option<String> {
    raw.get(field).map(str::to_string)
}

fn parse_integer(raw: &RawInitData, field: &str) -> Result<Option<i64>, InitDataError> {
    raw.get(field)
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|e| InitDataError::decode(field, e.to_string()))
        })
        .transpose()
}

fn parse_auth_date(raw: &RawInitData) -> Result<Option<i64>, InitDataError> {
    match parse_integer(raw, "auth_date")? {
        Some(value) if value <= 0 => Err(InitDataError::decode(
            "auth_date",
            format!("must be a positive integer, got {value}"),
        )),
        other => Ok(other),
    }
}

fn parse_json<T: DeserializeOwned>(
    raw: &RawInitData,
    field: &str,
) -> Result<Option<T>, InitDataError> {
    raw.get(field)
        .map(|value| {
            serde_json::from_str(value).map_err(|e| InitDataError::decode(field, e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_INIT_DATA: &str = "user=%7B%22id%22%3A279058397%2C%22first_name%22%3A%22Vladislav%20%2B%20-%20%3F%20%5C%2F%22%2C%22last_name%22%3A%22Kibenko%22%2C%22username%22%3A%22vdkfrost%22%2C%22language_code%22%3A%22ru%22%2C%22is_premium%22%3Atrue%2C%22allows_write_to_pm%22%3Atrue%2C%22photo_url%22%3A%22https%3A%5C%2F%5C%2Ft.me%5C%2Fi%5C%2Fuserpic%5C%2F320%5C%2F4FPEE4tmP3ATHa57u6MqTDih13LTOiMoKoLDRG4PnSA.svg%22%7D&chat_instance=8134722200314281151&chat_type=private&auth_date=1733509682&signature=TYJxVcisqbWjtodPepiJ6ghziUL94-KNpG8Pau-X7oNNLNBM72APCpi_RKiUlBvcqo5L-LAxIc3dnTzcZX_PDg&hash=a433d8f9847bd6addcc563bff7cc82c89e97ea0d90c11fe5729cae6796a36d73";

    #[test]
    fn test_decode_reference_user() {
        let decoded = decode(REFERENCE_INIT_DATA).unwrap();
        let user = decoded.claims.user.unwrap();

        assert_eq!(user.id, 279058397);
        assert_eq!(user.first_name, "Vladislav + - ? /");
        assert_eq!(user.last_name, "Kibenko");
        assert_eq!(user.username, "vdkfrost");
        assert_eq!(user.language_code, "ru");
        assert!(user.is_premium);
        assert!(user.allows_write_to_pm);
        assert_eq!(
            user.photo_url,
            "https://t.me/i/userpic/320/4FPEE4tmP3ATHa57u6MqTDih13LTOiMoKoLDRG4PnSA.svg"
        );
    }

    #[test]
    fn test_decode_reference_scalars() {
        let decoded = decode(REFERENCE_INIT_DATA).unwrap();
        let claims = &decoded.claims;

        assert_eq!(claims.auth_date, Some(1733509682));
        assert_eq!(claims.chat_instance.as_deref(), Some("8134722200314281151"));
        assert_eq!(claims.chat_type.as_deref(), Some("private"));
        assert!(claims.signature.as_deref().unwrap().starts_with("TYJxVcis"));
        assert_eq!(
            decoded.hash(),
            Some("a433d8f9847bd6addcc563bff7cc82c89e97ea0d90c11fe5729cae6796a36d73")
        );
        assert_eq!(claims.hash.as_deref(), decoded.hash());
        assert!(claims.receiver.is_none());
        assert!(claims.chat.is_none());
    }

    #[test]
    fn test_decode_keeps_verbatim_pairs() {
        let decoded = decode(REFERENCE_INIT_DATA).unwrap();
        let keys: Vec<&str> = decoded
            .raw
            .pairs()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(
            keys,
            [
                "user",
                "chat_instance",
                "chat_type",
                "auth_date",
                "signature",
                "hash"
            ]
        );
    }

    #[test]
    fn test_decode_chat_and_receiver() {
        let raw = "chat=%7B%22id%22%3A-100123%2C%22type%22%3A%22supergroup%22%2C%22title%22%3A%22Club%22%7D\
                   &receiver=%7B%22id%22%3A42%2C%22first_name%22%3A%22Bob%22%2C%22is_bot%22%3Atrue%7D\
                   &can_send_after=10&start_param=ref_7&query_id=AAH";
        let claims = decode(raw).unwrap().claims;

        let chat = claims.chat.unwrap();
        assert_eq!(chat.id, -100123);
        assert_eq!(chat.chat_type, "supergroup");
        assert_eq!(chat.title, "Club");

        let receiver = claims.receiver.unwrap();
        assert_eq!(receiver.id, 42);
        assert_eq!(receiver.first_name, "Bob");
        assert!(receiver.is_bot);
        assert!(!receiver.is_premium);

        assert_eq!(claims.can_send_after, Some(10));
        assert_eq!(claims.start_param.as_deref(), Some("ref_7"));
        assert_eq!(claims.query_id.as_deref(), Some("AAH"));
    }

    #[test]
    fn test_decode_malformed_user_json_names_field() {
        let err = decode("user=%7Bnot-json&auth_date=1").unwrap_err();
        assert!(matches!(err, InitDataError::Decode { field, .. } if field == "user"));
    }

    #[test]
    fn test_decode_malformed_chat_json_names_field() {
        let err = decode("chat=42").unwrap_err();
        assert!(matches!(err, InitDataError::Decode { field, .. } if field == "chat"));
    }

    #[test]
    fn test_decode_non_numeric_auth_date_fails() {
        let err = decode("auth_date=yesterday").unwrap_err();
        assert!(matches!(err, InitDataError::Decode { field, .. } if field == "auth_date"));
    }

    #[test]
    fn test_decode_non_positive_auth_date_fails() {
        let err = decode("auth_date=0").unwrap_err();
        assert!(matches!(
            err,
            InitDataError::Decode { field, reason } if field == "auth_date" && reason.contains("positive")
        ));
    }

    #[test]
    fn test_decode_non_numeric_can_send_after_fails() {
        let err = decode("can_send_after=soon").unwrap_err();
        assert!(matches!(err, InitDataError::Decode { field, .. } if field == "can_send_after"));
    }

    #[test]
    fn test_decode_missing_auth_date_is_allowed() {
        let decoded = decode("chat_type=private").unwrap();
        assert!(decoded.claims.auth_date.is_none());
    }

    #[test]
    fn test_decode_invalid_data_without_equals() {
        let decoded = decode("invalid_data").unwrap();
        assert_eq!(decoded.claims, InitData::default());
        assert!(decoded.hash().is_none());
    }

    #[test]
    fn test_decode_empty_string() {
        let decoded = decode("").unwrap();
        assert!(decoded.raw.pairs().is_empty());
    }

    #[test]
    fn test_decode_duplicate_key_first_wins() {
        let decoded = decode("auth_date=100&auth_date=200").unwrap();
        assert_eq!(decoded.claims.auth_date, Some(100));
    }

    #[test]
    fn test_claims_serialize_with_wire_names() {
        let decoded = decode(REFERENCE_INIT_DATA).unwrap();
        let json = serde_json::to_value(&decoded.claims).unwrap();
        assert_eq!(json["user"]["id"], 279058397);
        assert_eq!(json["user"]["first_name"], "Vladislav + - ? /");
        assert_eq!(json["auth_date"], 1733509682);
        assert!(json.get("chat").is_none());
    }

    #[test]
    fn test_chat_serializes_type_field() {
        let chat = Chat {
            id: 1,
            chat_type: "group".to_string(),
            ..Chat::default()
        };
        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["type"], "group");
    }

    #[test]
    fn test_decoded_debug_redacts_claims() {
        let decoded = decode(REFERENCE_INIT_DATA).unwrap();
        let debug_output = format!("{decoded:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("Vladislav"));
        assert!(!debug_output.contains("a433d8f9"));
    }
}
