use hifitime::{Duration, Epoch};
use std::str::FromStr;

use crate::constants::Second;
use crate::lagtraj_errors::LagtrajError;

/// Parse a timestamp in the format YYYY-MM-ddTHH:mm:ss
///
/// Timestamps without an explicit time scale are read as UTC.
///
/// Argument
/// --------
/// * `date`: the timestamp to parse
///
/// Return
/// ------
/// * the parsed [`Epoch`], or [`LagtrajError::TimeParsingError`] with the offending input
pub fn parse_epoch(date: &str) -> Result<Epoch, LagtrajError> {
    Epoch::from_str(date.trim())
        .map_err(|e| LagtrajError::TimeParsingError(format!("`{date}`: {e}")))
}

/// Elapsed time truncated toward zero to whole seconds.
///
/// A backward step of 0.6 s and a forward step of 0.6 s both give 0, so a target
/// time within the same second as the previous position is a no-op in either direction.
pub fn whole_seconds(elapsed: Duration) -> i64 {
    elapsed.to_seconds().trunc() as i64
}

/// Signed number of seconds as a [`Duration`]
pub fn duration_from_seconds(seconds: Second) -> Duration {
    Duration::from_seconds(seconds)
}

/// Render an epoch as an ISO-8601 UTC timestamp without time scale suffix.
///
/// Sub-second parts are written with nanosecond precision only when non-zero, so
/// whole-second epochs read back with [`parse_epoch`] unchanged.
pub fn fmt_iso_utc(epoch: Epoch) -> String {
    let (y, mo, d, h, mi, s, ns) = epoch.to_gregorian_utc();
    if ns == 0 {
        format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}")
    } else {
        format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}.{ns:09}")
    }
}

/// Render an inclusive time window for diagnostics.
pub fn fmt_window(start: Epoch, end: Epoch) -> String {
    format!("{start} to {end}")
}
