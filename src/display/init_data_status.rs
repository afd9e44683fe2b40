//! Freshness status display for init data.
//!
//! Renders the `auth_date` claim as a human-readable issuance time and
//! a freshness verdict against the configured window:
//! - Expired init data: red "EXPIRED (X ago)"
//! - Fresh init data: green "FRESH (expires in X)"
//! - Future-dated init data: yellow "NOT YET VALID (issued X in the future)"

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::validator::CLOCK_SKEW;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Print the freshness status lines for `auth_date`.
pub fn display_init_data_status(
    auth_date: Option<i64>,
    now: DateTime<Utc>,
    max_age: Duration,
    use_color: bool,
) {
    for line in status_lines(auth_date, now, max_age, use_color) {
        println!("{line}");
    }
}

/// Build the freshness status lines for `auth_date`.
pub fn status_lines(
    auth_date: Option<i64>,
    now: DateTime<Utc>,
    max_age: Duration,
    use_color: bool,
) -> Vec<String> {
    let Some(auth_date) = auth_date else {
        return vec![format!(
            "Freshness: {}",
            paint(RED, "UNKNOWN (auth_date is missing)", use_color)
        )];
    };

    let issued = DateTime::from_timestamp(auth_date, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| auth_date.to_string());

    let age = now.timestamp().saturating_sub(auth_date);
    let window = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    let skew = i64::try_from(CLOCK_SKEW.as_secs()).unwrap_or(i64::MAX);

    let verdict = if age < -skew {
        paint(
            YELLOW,
            &format!(
                "NOT YET VALID (issued {} in the future)",
                format_span(age.saturating_neg())
            ),
            use_color,
        )
    } else if age >= window {
        paint(
            RED,
            &format!("EXPIRED ({} ago)", format_span(age.saturating_sub(window))),
            use_color,
        )
    } else {
        paint(
            GREEN,
            &format!("FRESH (expires in {})", format_span(window.saturating_sub(age))),
            use_color,
        )
    };

    vec![
        format!("Issued at: {issued} ({} ago)", format_span(age.max(0))),
        format!("Freshness: {verdict}"),
    ]
}

/// Format a span of seconds using its two largest units, e.g. "2d 3h".
pub fn format_span(seconds: i64) -> String {
    const UNITS: [(i64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

    let mut remaining = seconds.max(0);
    let mut parts = Vec::new();
    for (size, suffix) in UNITS {
        if remaining >= size {
            parts.push(format!("{}{suffix}", remaining / size));
            remaining %= size;
        }
        if parts.len() == 2 {
            break;
        }
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

fn paint(color: &str, text: &str, use_color: bool) -> String {
    if use_color {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}
