//! Duration parsing utilities.

use anyhow::Context;

/// Parse a duration string like "2d", "48h", "30m", "300s", "300" into seconds.
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
/// - Days suffix: "2d"
pub fn parse_duration_to_secs(s: &str) -> anyhow::Result<i64> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let (num_str, unit, scale) = match s.char_indices().last() {
        Some((idx, 'd')) => (&s[..idx], "days", 86_400),
        Some((idx, 'h')) => (&s[..idx], "hours", 3_600),
        Some((idx, 'm')) => (&s[..idx], "minutes", 60),
        Some((idx, 's')) => (&s[..idx], "seconds", 1),
        _ => (s, "duration", 1),
    };

    let value: i64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid {unit} value: {num_str}"))?;
    if value < 0 {
        anyhow::bail!("Negative duration: {s}");
    }

    value
        .checked_mul(scale)
        .with_context(|| format!("Duration out of range: {s}"))
}
