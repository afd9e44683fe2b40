//! Canonicalize-for-signing stage.
//!
//! Builds the data-check string the HMAC signature is computed over:
//! every pair except `hash`, sorted byte-wise by key, rendered as
//! `key=value` and joined with `\n`. Values are the percent-decoded
//! strings from [`RawInitData`], never the typed claims.

use super::raw::{HASH_KEY, RawInitData};

/// Build the canonical data-check string for `raw`.
pub fn data_check_string(raw: &RawInitData) -> String {
    let mut signed: Vec<&(String, String)> = raw
        .pairs()
        .iter()
        .filter(|(key, _)| key != HASH_KEY)
        .collect();
    signed.sort_unstable_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    signed
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
