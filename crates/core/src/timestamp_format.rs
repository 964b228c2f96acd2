// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named timestamp layouts for the stdio line-prefixing reader (§4.1.2).
//!
//! Mirrors Go's `time` package layout constants, since `timestamp_format`
//! values in job config are expected to reference them by name.

use chrono::{DateTime, Utc};

/// Resolve a layout name (or pass through a custom strftime-like string) to
/// a `chrono::format::strftime` pattern. Unknown names fall back to RFC3339
/// and the caller should log a warning when `was_fallback` is true.
pub struct ResolvedLayout {
    pub pattern: &'static str,
    pub was_fallback: bool,
}

const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%:z";

pub fn resolve_named_layout(name: &str) -> ResolvedLayout {
    let pattern = match name {
        "RFC3339" => RFC3339,
        "RFC3339Nano" => "%Y-%m-%dT%H:%M:%S%.9f%:z",
        "RFC1123" => "%a, %d %b %Y %H:%M:%S %Z",
        "RFC1123Z" => "%a, %d %b %Y %H:%M:%S %z",
        "RFC822" => "%d %b %y %H:%M %Z",
        "RFC822Z" => "%d %b %y %H:%M %z",
        "ANSIC" => "%a %b %e %H:%M:%S %Y",
        "UnixDate" => "%a %b %e %H:%M:%S %Z %Y",
        "RubyDate" => "%a %b %d %H:%M:%S %z %Y",
        "Kitchen" => "%l:%M%p",
        "Stamp" => "%b %e %H:%M:%S",
        "StampMilli" => "%b %e %H:%M:%S%.3f",
        "StampMicro" => "%b %e %H:%M:%S%.6f",
        "StampNano" => "%b %e %H:%M:%S%.9f",
        "DateTime" => "%Y-%m-%d %H:%M:%S",
        "DateOnly" => "%Y-%m-%d",
        "TimeOnly" => "%H:%M:%S",
        _ => return ResolvedLayout { pattern: RFC3339, was_fallback: true },
    };
    ResolvedLayout { pattern, was_fallback: false }
}

/// A job's `timestamp_format` config value: either a known layout name
/// (resolved through the table above) or a literal strftime pattern that
/// bypasses it entirely.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimestampFormat(pub String);

impl TimestampFormat {
    /// Format `now` per this spec. Unknown named layouts fall back to
    /// RFC3339; the caller decides whether/how to surface that warning
    /// (it's logged once per job at executor start, not per line).
    pub fn format(&self, now: DateTime<Utc>) -> String {
        let resolved = resolve_named_layout(&self.0);
        if resolved.was_fallback && !looks_like_custom_pattern(&self.0) {
            now.format(resolved.pattern).to_string()
        } else if resolved.was_fallback {
            // Custom strftime-like string: use it directly.
            now.format(&self.0).to_string()
        } else {
            now.format(resolved.pattern).to_string()
        }
    }

    pub fn is_known_name(&self) -> bool {
        !resolve_named_layout(&self.0).was_fallback
    }
}

/// Heuristic: a "name" is a single bare identifier (letters/digits only);
/// anything containing `%` or other punctuation is treated as a literal
/// strftime-like format string, never matched against the table.
fn looks_like_custom_pattern(s: &str) -> bool {
    s.contains('%') || !s.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 13, 4, 5).unwrap()
    }

    #[test]
    fn known_layout_resolves_without_fallback() {
        let r = resolve_named_layout("RFC3339Nano");
        assert!(!r.was_fallback);
    }

    #[test]
    fn unknown_name_falls_back_to_rfc3339() {
        let r = resolve_named_layout("Bogus");
        assert!(r.was_fallback);
        assert_eq!(r.pattern, RFC3339);
    }

    #[test]
    fn custom_pattern_bypasses_table() {
        let fmt = TimestampFormat("%H:%M".to_string());
        assert_eq!(fmt.format(sample()), "13:04");
    }

    #[test]
    fn date_only_layout_formats() {
        let fmt = TimestampFormat("DateOnly".to_string());
        assert_eq!(fmt.format(sample()), "2026-07-27");
    }
}
