//! CLI argument definitions for initdata-term.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing.
//!
//! # Security
//!
//! Argument structs implement custom `Debug` to redact init data and
//! bot tokens, and tokens are held in `Zeroizing` buffers so they are
//! wiped when the arguments are dropped.

use std::fmt;

use clap::{ArgAction, Parser, Subcommand};
use zeroize::Zeroizing;

/// Environment variable read for bot tokens when none are passed explicitly.
pub const DEFAULT_BOT_TOKENS_ENV: &str = "INITDATA_BOT_TOKENS";

/// A secure, offline-first CLI for decoding and validating the signed
/// init data that a chat platform hands to its mini-apps.
#[derive(Debug, Parser)]
#[command(name = "initdata-term")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug). Overridden by RUST_LOG.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode and inspect init data without verifying its signature.
    Decode(DecodeArgs),

    /// Validate init data's signature and freshness against a bot token.
    Validate(ValidateArgs),

    /// Sign init data with a bot token (for fixtures and local testing).
    Sign(SignArgs),

    /// Run one request through the HTTP router and print the response envelope.
    Invoke(InvokeArgs),
}

/// Where to read the init data from.
#[derive(clap::Args)]
pub struct InitDataInput {
    /// The init data query string. If omitted, reads from stdin.
    pub init_data: Option<String>,

    /// Read the init data from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub init_data_env: Option<String>,
}

impl fmt::Debug for InitDataInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitDataInput")
            .field("init_data", &self.init_data.as_ref().map(|_| "[REDACTED]"))
            .field("init_data_env", &self.init_data_env)
            .finish()
    }
}

/// Where to read bot tokens from.
#[derive(clap::Args)]
pub struct BotTokenArgs {
    /// Bot token in `<bot_id>:<secret>` form. May be repeated.
    ///
    /// WARNING: Passing tokens via CLI arguments may expose them in shell
    /// history. Prefer --bot-token-env or INITDATA_BOT_TOKENS instead.
    #[arg(long, value_name = "TOKEN", value_parser = parse_zeroizing_string)]
    pub bot_token: Vec<Zeroizing<String>>,

    /// Read comma-separated bot tokens from the specified environment
    /// variable (defaults to INITDATA_BOT_TOKENS when no token is given).
    #[arg(long, value_name = "VAR_NAME")]
    pub bot_token_env: Option<String>,
}

impl fmt::Debug for BotTokenArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotTokenArgs")
            .field(
                "bot_token",
                &self.bot_token.iter().map(|_| "[REDACTED]").collect::<Vec<_>>(),
            )
            .field("bot_token_env", &self.bot_token_env)
            .finish()
    }
}

/// Arguments for the `decode` subcommand.
#[derive(Debug, clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: InitDataInput,

    /// Freshness window in seconds used for the status line. Must be positive.
    #[arg(long, value_name = "SECONDS", default_value_t = 86_400)]
    pub exp_in: u64,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` subcommand.
#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InitDataInput,

    #[command(flatten)]
    pub tokens: BotTokenArgs,

    /// The bot the init data was issued for. Defaults to the bot of the
    /// only configured token.
    #[arg(long, value_name = "BOT_ID")]
    pub bot_id: Option<String>,

    /// Freshness window in seconds. Must be positive.
    #[arg(long, value_name = "SECONDS", default_value_t = 86_400, allow_negative_numbers = true)]
    pub exp_in: i64,

    /// Simulate a different current time for the freshness check.
    ///
    /// Accepts relative expressions like "+7d", "-1h", "+30m" or
    /// absolute timestamps in RFC 3339 or Unix epoch format.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub now: Option<String>,

    /// Output a JSON result object instead of a status line.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `sign` subcommand.
#[derive(Debug, clap::Args)]
pub struct SignArgs {
    #[command(flatten)]
    pub input: InitDataInput,

    #[command(flatten)]
    pub tokens: BotTokenArgs,

    /// Which configured bot to sign for. Defaults to the only configured token.
    #[arg(long, value_name = "BOT_ID")]
    pub bot_id: Option<String>,

    /// Set `auth_date` to the current (or --now) time before signing.
    #[arg(long)]
    pub refresh_auth_date: bool,

    /// Simulate a different current time for --refresh-auth-date.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub now: Option<String>,
}

/// Arguments for the `invoke` subcommand.
#[derive(clap::Args)]
pub struct InvokeArgs {
    /// Request path, e.g. /api/validateinitdata.
    #[arg(long, value_name = "PATH")]
    pub path: String,

    /// Query parameter as `name=value`, already decoded. May be repeated.
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_query_param)]
    pub params: Vec<(String, String)>,

    #[command(flatten)]
    pub tokens: BotTokenArgs,

    /// Simulate a different current time for the freshness check.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub now: Option<String>,
}

/// Custom `Debug` that shows parameter names only; values may be init data.
impl fmt::Debug for InvokeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokeArgs")
            .field("path", &self.path)
            .field(
                "params",
                &self.params.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            )
            .field("tokens", &self.tokens)
            .field("now", &self.now)
            .finish()
    }
}

/// Parse a string into a `Zeroizing<String>` for secure CLI arguments.
fn parse_zeroizing_string(s: &str) -> Result<Zeroizing<String>, std::convert::Infallible> {
    Ok(Zeroizing::new(s.to_string()))
}

/// Split a `name=value` query parameter on its first `=`.
fn parse_query_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}
