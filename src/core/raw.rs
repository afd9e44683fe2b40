//! Parse-to-pairs stage for init data.
//!
//! Turns a URL-query-encoded init-data string into an ordered list of
//! percent-decoded key/value pairs. This is the only place percent
//! decoding happens; canonicalization and typed decoding both work on
//! the pairs produced here.

use std::collections::HashSet;
use std::fmt;

use url::form_urlencoded;

/// Key carrying the hex-encoded HMAC signature.
pub const HASH_KEY: &str = "hash";

/// Key carrying the auxiliary platform signature. Never verified here.
pub const SIGNATURE_KEY: &str = "signature";

/// Init data split into percent-decoded key/value pairs.
///
/// Pairs keep their wire order. When a key repeats, the first
/// occurrence wins and later ones are dropped, so lookups and the
/// canonical signing string always agree on which value is meant.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawInitData {
    pairs: Vec<(String, String)>,
}

impl RawInitData {
    /// Parse a query-encoded init-data string.
    ///
    /// Segments are split on `&`, each segment on its first `=`, and the
    /// key and value are percent-decoded independently (`+` decodes to
    /// a space). A segment without `=` yields a key with an empty value.
    /// Empty segments are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut seen = HashSet::new();
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .filter(|(key, _)| seen.insert(key.to_string()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Build from already-decoded pairs, applying the same first-wins rule.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut seen = HashSet::new();
        let pairs = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(key, _): &(String, String)| seen.insert(key.clone()))
            .collect();
        Self { pairs }
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The pairs in wire order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// The supplied `hash` value, if any.
    pub fn hash(&self) -> Option<&str> {
        self.get(HASH_KEY)
    }

    /// Re-encode the pairs as a query string.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Custom `Debug` that lists keys only. Values may carry personal data
/// and the signature.
impl fmt::Debug for RawInitData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawInitData")
            .field(
                "keys",
                &self.pairs.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
