//! Time formatting helpers.

use interstake_types::Timestamp;

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// `"in 2d 3h"` while `target` lies ahead of `now`, `"due"` once reached.
pub fn format_until(target: Timestamp, now: Timestamp) -> String {
    if target.is_reached(now) {
        "due".to_string()
    } else {
        format!("in {}", format_duration(target.as_secs() - now.as_secs()))
    }
}
