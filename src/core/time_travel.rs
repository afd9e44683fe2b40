//! Time-travel debugging for the freshness check.
//!
//! Parses time expressions (relative like "+7d" or absolute like RFC 3339)
//! into the instant `auth_date` freshness is evaluated against.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::InitDataError;

/// A parsed time target for time-travel evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTarget {
    /// The resolved absolute timestamp.
    pub timestamp: DateTime<Utc>,
    /// The original expression provided by the user.
    pub expression: String,
}

/// Parse a time-travel expression into an absolute timestamp.
///
/// Supports the following formats:
/// - Relative to `now`: `+7d`, `-1h`, `+30m`, `+2w`, `+1y`, `-5s`
/// - Absolute RFC 3339: `2024-01-15T14:30:00Z`
/// - Absolute Unix epoch: `1705312200`
///
/// # Errors
///
/// Returns an error if the expression doesn't match any known format or
/// resolves outside the representable range.
pub fn parse_time_expression(
    expression: &str,
    now: DateTime<Utc>,
) -> Result<TimeTarget, InitDataError> {
    let trimmed = expression.trim();
    let timestamp = match trimmed.chars().next() {
        None => return Err(invalid(expression, "expression is empty")),
        Some(sign @ ('+' | '-')) => {
            let offset = parse_offset(&trimmed[1..], expression)?;
            let offset = if sign == '-' { -offset } else { offset };
            now.checked_add_signed(offset)
                .ok_or_else(|| invalid(expression, "resulting time is out of range"))?
        }
        Some(c) if c.is_ascii_digit() && trimmed.chars().all(|c| c.is_ascii_digit()) => {
            let seconds = trimmed
                .parse::<i64>()
                .map_err(|e| invalid(expression, &e.to_string()))?;
            DateTime::from_timestamp(seconds, 0)
                .ok_or_else(|| invalid(expression, "epoch seconds out of range"))?
        }
        Some(_) => DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| invalid(expression, &format!("not RFC 3339: {e}")))?,
    };

    Ok(TimeTarget {
        timestamp,
        expression: expression.to_string(),
    })
}

/// Parse `<amount><unit>` into a signed offset.
fn parse_offset(body: &str, expression: &str) -> Result<TimeDelta, InitDataError> {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| invalid(expression, "missing unit (use s, m, h, d, w or y)"))?;
    let (amount, unit) = body.split_at(split);
    if amount.is_empty() {
        return Err(invalid(expression, "missing amount"));
    }

    let amount = amount
        .parse::<i64>()
        .map_err(|e| invalid(expression, &e.to_string()))?;
    let unit_seconds = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 604_800,
        "y" => 31_536_000,
        other => return Err(invalid(expression, &format!("unknown unit '{other}'"))),
    };

    amount
        .checked_mul(unit_seconds)
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| invalid(expression, "offset is too large"))
}

fn invalid(expression: &str, reason: &str) -> InitDataError {
    InitDataError::InvalidTimeExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}
