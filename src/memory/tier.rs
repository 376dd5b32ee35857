//! Retention tier classification.

use chrono::{DateTime, Duration, Utc};

use super::paths;
use super::types::Tier;

/// Files touched within this window (at the memory root) stay hot.
pub const HOT_WINDOW_DAYS: i64 = 7;

/// Directory segment that marks rolled-up history.
pub const ARCHIVE_SEGMENT: &str = "archive";

/// Classify a normalized path key. `root_name` is the memory folder's name
/// as it appears in stored paths.
///
/// Archive folders win over everything; quarterly rollups (`-Q<digit>` in the
/// file name) are `Archive`, the rest of the archive folder is `Cold`. The hub
/// and recently touched root-level files are `Hot`. Everything else is `Warm`.
/// An unknown modification time never counts as recent.
pub fn classify(
    key: &str,
    root_name: &str,
    modified: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Tier {
    let is_root_level = paths::is_root_level(key, root_name);

    if !is_root_level && paths::dir_segments(key).any(|s| s == ARCHIVE_SEGMENT) {
        return if has_quarter_marker(paths::file_name(key)) {
            Tier::Archive
        } else {
            Tier::Cold
        };
    }

    if paths::is_hub(key) {
        return Tier::Hot;
    }

    let is_recent = modified
        .map(|m| now.signed_duration_since(m) < Duration::days(HOT_WINDOW_DAYS))
        .unwrap_or(false);

    if is_root_level && is_recent {
        Tier::Hot
    } else {
        Tier::Warm
    }
}

/// `-Q` immediately followed by an ASCII digit, e.g. `2025-Q3-summary.md`.
fn has_quarter_marker(name: &str) -> bool {
    name.as_bytes()
        .windows(3)
        .any(|w| w[0] == b'-' && w[1] == b'Q' && w[2].is_ascii_digit())
}
