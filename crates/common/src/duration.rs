//! Parsing and formatting of staff-entered punishment durations.
//!
//! Durations are written as compact tokens like `30m`, `7d` or `1mo`.
//! Multipliers are fixed rather than calendar-aware: a month is always
//! 30 days and a year is always 365 days. Staff-entered moderation
//! durations are approximate by nature, so calendar arithmetic would add
//! complexity without adding meaning.

use chrono::{DateTime, Duration, FixedOffset};

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;
const SECS_PER_WEEK: i64 = 7 * SECS_PER_DAY;
const SECS_PER_MONTH: i64 = 30 * SECS_PER_DAY;
const SECS_PER_YEAR: i64 = 365 * SECS_PER_DAY;

/// Parse a human-coded duration like `30m`, `7d` or `1mo`.
///
/// Accepts a whitespace-separated sequence of `<integer><unit>` tokens
/// whose values are summed, so everything [`format_duration`] emits parses
/// back. Units are case-insensitive: `s`, `m`, `h`, `d`, `w`, `mo`
/// (30 days) and `y` (365 days).
///
/// Returns `None` for blank input, an unrecognized unit or a non-integer
/// magnitude. `None` means "ask the operator to re-enter", not a fault.
/// Zero and negative magnitudes are syntactically valid; treating a
/// non-positive duration as "permanent" is caller policy.
#[must_use]
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut tokens = input.split_whitespace().peekable();
    tokens.peek()?;

    let mut total = 0i64;
    for token in tokens {
        total = total.checked_add(parse_token(token)?)?;
    }
    Some(Duration::seconds(total))
}

/// Parse a single `<integer><unit>` token into seconds.
fn parse_token(token: &str) -> Option<i64> {
    let split = token.find(|c: char| c.is_ascii_alphabetic())?;
    let magnitude: i64 = token[..split].parse().ok()?;

    // "mo" must match before the bare "m" minute suffix.
    let multiplier = match token[split..].to_ascii_lowercase().as_str() {
        "mo" => SECS_PER_MONTH,
        "s" => 1,
        "m" => SECS_PER_MINUTE,
        "h" => SECS_PER_HOUR,
        "d" => SECS_PER_DAY,
        "w" => SECS_PER_WEEK,
        "y" => SECS_PER_YEAR,
        _ => return None,
    };

    magnitude.checked_mul(multiplier)
}

/// Format a duration as `"<d>d <h>h <m>m <s>s"`.
///
/// Zero-valued leading components are omitted; the seconds component is
/// always present. Negative durations render as `"0s"`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);

    let days = total / SECS_PER_DAY;
    let hours = total % SECS_PER_DAY / SECS_PER_HOUR;
    let minutes = total % SECS_PER_HOUR / SECS_PER_MINUTE;
    let seconds = total % SECS_PER_MINUTE;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 || !parts.is_empty() {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));

    parts.join(" ")
}

/// Format the time remaining until `expires_at`, relative to `now`.
///
/// `None` means a permanent restriction and renders as `"permanent"`.
/// An already-passed expiry clamps to `"0s"`.
#[must_use]
pub fn format_remaining_at(
    expires_at: Option<DateTime<FixedOffset>>,
    now: DateTime<FixedOffset>,
) -> String {
    expires_at.map_or_else(
        || "permanent".to_string(),
        |expires| format_duration(expires - now),
    )
}
