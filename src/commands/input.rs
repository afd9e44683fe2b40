//! Shared input resolution for subcommands.
//!
//! Resolves init data (argument, environment variable, or stdin), bot
//! tokens (arguments or environment variable), and the evaluation time.

use std::io::{IsTerminal, Read};

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::cli::{BotTokenArgs, DEFAULT_BOT_TOKENS_ENV, InitDataInput};
use crate::core::secret::{BotSecret, BotSecrets, parse_bot_id};
use crate::core::time_travel::parse_time_expression;
use crate::error::InitDataError;

/// Maximum number of bytes read from stdin.
const STDIN_MAX_BYTES: u64 = 64 * 1024;

/// Resolve the init data from the argument, an environment variable, or stdin.
pub fn resolve_init_data(input: &InitDataInput) -> Result<String, InitDataError> {
    let init_data = if let Some(value) = &input.init_data {
        value.clone()
    } else if let Some(name) = &input.init_data_env {
        read_env_var(name)?.to_string()
    } else {
        read_stdin()?
    };

    let init_data = init_data.trim().to_string();
    if init_data.is_empty() {
        return Err(InitDataError::NoInitDataProvided);
    }
    Ok(init_data)
}

/// Derive bot secrets from `--bot-token`, `--bot-token-env`, or the
/// default environment variable, in that order.
pub fn resolve_bot_secrets(args: &BotTokenArgs) -> Result<BotSecrets, InitDataError> {
    if !args.bot_token.is_empty() {
        return BotSecrets::from_tokens(args.bot_token.iter().map(|t| t.as_str()));
    }

    let raw = match &args.bot_token_env {
        Some(name) => read_env_var(name)?,
        None => match std::env::var(DEFAULT_BOT_TOKENS_ENV) {
            Ok(value) => Zeroizing::new(value),
            Err(_) => return Ok(BotSecrets::default()),
        },
    };

    BotSecrets::from_tokens(raw.split(',').map(str::trim).filter(|t| !t.is_empty()))
}

/// Pick the secret for `bot_id`, or the sole configured secret if no id
/// was given.
pub fn select_secret<'a>(
    secrets: &'a BotSecrets,
    bot_id: Option<&str>,
) -> Result<&'a BotSecret, InitDataError> {
    if secrets.is_empty() {
        return Err(InitDataError::InvalidBotToken {
            reason: format!(
                "no bot token configured: pass --bot-token, --bot-token-env, or set {DEFAULT_BOT_TOKENS_ENV}"
            ),
        });
    }

    match bot_id {
        Some(raw) => {
            let bot_id = parse_bot_id(raw)?;
            secrets
                .get(bot_id)
                .ok_or(InitDataError::UnknownBot { bot_id })
        }
        None => secrets.sole().ok_or_else(|| InitDataError::InvalidBotId {
            reason: format!(
                "--bot-id is required when {} bot tokens are configured",
                secrets.len()
            ),
        }),
    }
}

/// Resolve the evaluation time: the `--now` expression, or the wall clock.
pub fn resolve_now(expression: Option<&str>) -> Result<DateTime<Utc>, InitDataError> {
    let now = Utc::now();
    match expression {
        Some(expr) => {
            let target = parse_time_expression(expr, now)?;
            tracing::debug!(expression = %target.expression, timestamp = %target.timestamp, "time travel");
            Ok(target.timestamp)
        }
        None => Ok(now),
    }
}

/// Read an environment variable, rejecting names the OS cannot hold.
fn read_env_var(name: &str) -> Result<Zeroizing<String>, InitDataError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(InitDataError::InvalidEnvVarName {
            name: name.to_string(),
        });
    }
    std::env::var(name)
        .map(Zeroizing::new)
        .map_err(|_| InitDataError::EnvVarNotFound {
            name: name.to_string(),
        })
}

/// Read init data from stdin, unless stdin is an interactive terminal.
fn read_stdin() -> Result<String, InitDataError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(InitDataError::NoInitDataProvided);
    }

    let mut buffer = String::new();
    stdin
        .lock()
        .take(STDIN_MAX_BYTES)
        .read_to_string(&mut buffer)
        .map_err(|_| InitDataError::NoInitDataProvided)?;
    Ok(buffer)
}
