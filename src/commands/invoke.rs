//! Handler for the `invoke` subcommand.
//!
//! Runs a single request through the HTTP router and prints the JSON
//! response envelope, the same one a deployed function would return.

use anyhow::Result;

use super::input::{resolve_bot_secrets, resolve_now};
use crate::cli::InvokeArgs;
use crate::router::{ApiRequest, handle};

/// Execute the `invoke` subcommand with the given arguments.
///
/// Returns whether the router answered with status 200.
pub fn execute(args: &InvokeArgs) -> Result<bool> {
    let secrets = resolve_bot_secrets(&args.tokens)?;
    let now = resolve_now(args.now.as_deref())?;
    let request = ApiRequest::new(&args.path, args.params.iter().cloned());

    let response = handle(&request, &secrets, now);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.is_success())
}
