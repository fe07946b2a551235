//! Display helpers for durations.

use std::{fmt, time::Duration};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Compact duration used next to test names and in per-source summaries, e.g. `1 m 30 s`.
///
/// Shows hours and minutes when present. Seconds are only shown below an hour, and
/// milliseconds only when nothing larger is. Anything shorter than a millisecond is `< 1 ms`.
#[derive(Copy, Clone, Debug)]
pub struct DisplayTestDuration(pub Duration);

impl fmt::Display for DisplayTestDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0.as_secs();
        // Days fold into hours.
        let hours = total_secs / SECS_PER_HOUR;
        let mins = (total_secs % SECS_PER_HOUR) / SECS_PER_MINUTE;
        let secs = total_secs % SECS_PER_MINUTE;
        let millis = self.0.subsec_millis();

        let mut parts = Vec::with_capacity(2);
        if hours > 0 {
            parts.push(format!("{hours} h"));
        }
        if mins > 0 {
            parts.push(format!("{mins} m"));
        }
        if hours == 0 {
            if secs > 0 {
                parts.push(format!("{secs} s"));
            }
            if millis > 0 && mins == 0 && secs == 0 {
                parts.push(format!("{millis} ms"));
            }
        }

        if parts.is_empty() {
            f.write_str("< 1 ms")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

/// Single-unit duration for the end of run summary, e.g. `1.5000 Minutes`.
#[derive(Copy, Clone, Debug)]
pub struct DisplayRunDuration(pub Duration);

impl fmt::Display for DisplayRunDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs_f64();
        let whole_secs = self.0.as_secs();

        let (value, unit) = if whole_secs >= SECS_PER_DAY {
            (secs / SECS_PER_DAY as f64, "Days")
        } else if whole_secs >= SECS_PER_HOUR {
            (secs / SECS_PER_HOUR as f64, "Hours")
        } else if whole_secs >= SECS_PER_MINUTE {
            (secs / SECS_PER_MINUTE as f64, "Minutes")
        } else {
            (secs, "Seconds")
        };

        write!(f, "{value:.4} {unit}")
    }
}
