//! Countdown formatting helpers.

/// Whole seconds left, rounded up.
///
/// A countdown must not show `0` while any time remains, so partial seconds
/// count as a full second.
pub fn get_remaining_seconds(remaining_ms: u64) -> u64 {
    remaining_ms.div_ceil(1000)
}

/// `MM:SS`, with minutes zero-padded to two digits and allowed to grow past
/// 59 (`3661` -> `"61:01"`).
pub fn display_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
