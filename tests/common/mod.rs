//! Shared test fixtures and helper utilities.
//!
//! Provides init-data strings with known claims, a test bot token, and
//! an offline signer that follows the platform's HMAC scheme
//! independently of the binary under test.
#![allow(dead_code)]

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Real init data captured from a client.
///
/// Its `hash` was produced with a bot token we do not have, so it
/// decodes but never validates here.
pub const REFERENCE_INIT_DATA: &str = "user=%7B%22id%22%3A279058397%2C%22first_name%22%3A%22Vladislav%20%2B%20-%20%3F%20%5C%2F%22%2C%22last_name%22%3A%22Kibenko%22%2C%22username%22%3A%22vdkfrost%22%2C%22language_code%22%3A%22ru%22%2C%22is_premium%22%3Atrue%2C%22allows_write_to_pm%22%3Atrue%2C%22photo_url%22%3A%22https%3A%5C%2F%5C%2Ft.me%5C%2Fi%5C%2Fuserpic%5C%2F320%5C%2F4FPEE4tmP3ATHa57u6MqTDih13LTOiMoKoLDRG4PnSA.svg%22%7D&chat_instance=8134722200314281151&chat_type=private&auth_date=1733509682&signature=TYJxVcisqbWjtodPepiJ6ghziUL94-KNpG8Pau-X7oNNLNBM72APCpi_RKiUlBvcqo5L-LAxIc3dnTzcZX_PDg&hash=a433d8f9847bd6addcc563bff7cc82c89e97ea0d90c11fe5729cae6796a36d73";

/// `auth_date` of [`REFERENCE_INIT_DATA`].
pub const REFERENCE_AUTH_DATE: i64 = 1733509682;

/// Input with no `=` and no `hash`.
pub const INVALID_INIT_DATA: &str = "invalid_data";

/// Bot token used to sign fixtures. Not a real token.
pub const TEST_BOT_TOKEN: &str = "7342037359:AAFake-token-used-only-in-tests";

/// Bot id embedded in [`TEST_BOT_TOKEN`].
pub const TEST_BOT_ID: &str = "7342037359";

/// Sign `pairs` with `token` and return the encoded query string.
///
/// Computes `HMAC(HMAC("WebAppData", token), data_check_string)` where
/// the data-check string is the sorted `key=value` lines.
pub fn sign_pairs(pairs: &[(&str, &str)], token: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let check_string = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut derive = HmacSha256::new_from_slice(b"WebAppData").unwrap();
    derive.update(token.as_bytes());
    let secret = derive.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
    mac.update(check_string.as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .append_pair("hash", &hash)
        .finish()
}

/// The claims of [`REFERENCE_INIT_DATA`] as decoded pairs, without `hash`.
pub fn reference_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "user",
            r#"{"id":279058397,"first_name":"Vladislav + - ? /","last_name":"Kibenko","username":"vdkfrost","language_code":"ru","is_premium":true,"allows_write_to_pm":true}"#,
        ),
        ("chat_instance", "8134722200314281151"),
        ("chat_type", "private"),
        ("auth_date", "1733509682"),
        ("signature", "TYJxVcisqbWjtodPepiJ6g"),
    ]
}

/// [`reference_pairs`] signed with [`TEST_BOT_TOKEN`].
pub fn signed_reference() -> String {
    sign_pairs(&reference_pairs(), TEST_BOT_TOKEN)
}

/// A `--now` value one minute after [`REFERENCE_AUTH_DATE`].
pub fn shortly_after_issue() -> String {
    (REFERENCE_AUTH_DATE + 60).to_string()
}
