//! Handler for the `validate` subcommand.
//!
//! Checks init data's HMAC signature against a configured bot token and
//! enforces the freshness window. Supports time-travel via `--now` for
//! evaluating old fixtures.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use super::input::{resolve_bot_secrets, resolve_init_data, resolve_now, select_secret};
use crate::cli::ValidateArgs;
use crate::core::validator::{ValidationOptions, validate_third_party};
use crate::error::InitDataError;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Execute the `validate` subcommand with the given arguments.
///
/// Returns `Ok(true)` if the init data is valid, `Ok(false)` if it was
/// rejected, and `Err` if the arguments or configuration are unusable.
pub fn execute(args: &ValidateArgs) -> Result<bool> {
    if args.exp_in <= 0 {
        return Err(InitDataError::InvalidFreshnessWindow.into());
    }
    let max_age = Duration::from_secs(args.exp_in.unsigned_abs());

    let secrets = resolve_bot_secrets(&args.tokens)?;
    let bot_id = select_secret(&secrets, args.bot_id.as_deref())?.bot_id();
    let now = resolve_now(args.now.as_deref())?;
    let init_data = resolve_init_data(&args.input)?;

    let options = ValidationOptions::new(max_age, now);
    let outcome = validate_third_party(&init_data, bot_id, &secrets, &options);
    tracing::info!(bot_id, valid = outcome.is_ok(), "validation finished");

    let reason = match outcome {
        Ok(()) => None,
        Err(e) if e.is_rejection() => Some(e.to_string()),
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "valid": reason.is_none(),
                "bot_id": bot_id,
                "reason": reason,
            }))?
        );
    } else {
        let use_color = std::io::stdout().is_terminal();
        println!("{}", status_line(bot_id, reason.as_deref(), use_color));
    }

    Ok(reason.is_none())
}

/// Render the one-line VALID/INVALID verdict.
fn status_line(bot_id: i64, reason: Option<&str>, use_color: bool) -> String {
    let (color, text) = match reason {
        None => (GREEN, format!("VALID (bot {bot_id})")),
        Some(reason) => (RED, format!("INVALID (bot {bot_id}): {reason}")),
    };
    if use_color {
        format!("Init data is {color}{text}{RESET}")
    } else {
        format!("Init data is {text}")
    }
}
