use crate::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current timestamp in milliseconds since the Unix epoch.
#[must_use]
pub fn timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since_the_epoch| {
            i64::try_from(since_the_epoch.as_millis()).unwrap_or(i64::MAX)
        })
}
