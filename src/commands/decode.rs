//! Handler for the `decode` subcommand.
//!
//! Decodes and pretty-prints init-data claims without verifying their
//! signature. Supports reading the init data from a CLI argument,
//! environment variable, or stdin.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use super::input::resolve_init_data;
use crate::cli::DecodeArgs;
use crate::core::decoder::decode;
use crate::display::init_data_status::display_init_data_status;
use crate::display::json_printer::print_json;
use crate::error::InitDataError;

/// Execute the `decode` subcommand with the given arguments.
pub fn execute(args: &DecodeArgs) -> Result<()> {
    if args.exp_in == 0 {
        return Err(InitDataError::InvalidFreshnessWindow.into());
    }
    let init_data = resolve_init_data(&args.input)?;
    let decoded = decode(&init_data)?;
    let claims = serde_json::to_value(&decoded.claims)?;

    tracing::debug!(raw = ?decoded.raw, "decoded init data");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&claims)?);
        return Ok(());
    }

    let use_color = std::io::stdout().is_terminal();
    println!("--- Claims ---");
    print_json(&claims, use_color);
    println!();
    println!("--- Init Data Status ---");
    display_init_data_status(
        decoded.claims.auth_date,
        Utc::now(),
        Duration::from_secs(args.exp_in),
        use_color,
    );
    Ok(())
}
