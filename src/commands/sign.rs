//! Handler for the `sign` subcommand.
//!
//! Signs init data with a configured bot token and prints the query
//! string with a fresh `hash`. Useful for producing fixtures that the
//! `validate` subcommand (or a deployed validator) accepts.

use anyhow::Result;

use super::input::{resolve_bot_secrets, resolve_init_data, resolve_now, select_secret};
use crate::cli::SignArgs;
use crate::core::raw::RawInitData;
use crate::core::validator::sign;

/// Execute the `sign` subcommand with the given arguments.
pub fn execute(args: &SignArgs) -> Result<()> {
    let secrets = resolve_bot_secrets(&args.tokens)?;
    let secret = select_secret(&secrets, args.bot_id.as_deref())?;
    let init_data = resolve_init_data(&args.input)?;

    let mut raw = RawInitData::parse(&init_data);
    if args.refresh_auth_date {
        let now = resolve_now(args.now.as_deref())?;
        raw = with_auth_date(&raw, now.timestamp());
    }

    tracing::info!(bot_id = secret.bot_id(), "signing init data");
    println!("{}", sign(&raw, secret));
    Ok(())
}

/// Copy `raw` with `auth_date` set to `timestamp`, keeping its position
/// if present and appending it otherwise.
fn with_auth_date(raw: &RawInitData, timestamp: i64) -> RawInitData {
    let value = timestamp.to_string();
    let mut pairs: Vec<(String, String)> = raw.pairs().to_vec();
    match pairs.iter_mut().find(|(key, _)| key == "auth_date") {
        Some((_, existing)) => *existing = value,
        None => pairs.push(("auth_date".to_string(), value)),
    }
    RawInitData::from_pairs(pairs)
}
