use chrono::{Local, NaiveDateTime};

use crate::error::Error;

/// Compact timestamp layout used for all range comparisons and stamps.
/// Fixed-width and zero-padded, so lexicographic order equals
/// chronological order.
pub const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

const CAMERA_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Reduce a camera-supplied `YYYY-MM-DDTHH:MM:SS±HHMM` timestamp to the
/// compact `YYYYMMDDHHMMSS` form.
///
/// The UTC offset is discarded, whatever its shape (`+0700`, `+07:00`, `Z`):
/// events from cameras in different zones compare as if their offsets were
/// equal. This is the only function that produces the compact form from a
/// camera timestamp, so an offset-aware conversion can be swapped in here
/// without touching any call site.
pub fn compact_from_camera(date_time: &str) -> Result<String, Error> {
    let head = date_time.get(..19).ok_or_else(|| {
        Error::Validation(format!("Camera timestamp too short: {:?}", date_time))
    })?;

    let parsed = NaiveDateTime::parse_from_str(head, CAMERA_FORMAT)
        .map_err(|e| Error::Validation(format!("Bad camera timestamp {:?}: {}", date_time, e)))?;

    Ok(parsed.format(COMPACT_FORMAT).to_string())
}

/// Check a query bound: exactly 14 digits naming a real calendar date/time.
pub fn is_valid_compact(value: &str) -> bool {
    value.len() == 14
        && value.bytes().all(|b| b.is_ascii_digit())
        && NaiveDateTime::parse_from_str(value, COMPACT_FORMAT).is_ok()
}

/// Current local time in compact form, used for the ingestion stamp.
pub fn now_compact() -> String {
    Local::now().format(COMPACT_FORMAT).to_string()
}
