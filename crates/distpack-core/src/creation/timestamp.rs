//! Conversion of file modification times to ZIP date-times.
//!
//! ZIP stores MS-DOS timestamps, which cannot represent anything before
//! 1980-01-01. Files older than that are written with the minimum value.

use crate::BundleError;
use crate::Result;
use chrono::Datelike;
use chrono::Local;
use chrono::TimeZone;
use chrono::Timelike;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use zip::DateTime;

/// First year an MS-DOS timestamp can hold.
pub const MIN_ZIP_YEAR: i32 = 1980;

/// Result of converting a modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipTimestamp {
    /// Time was representable and is used as-is.
    Exact(DateTime),
    /// Time predates 1980 and was replaced with 1980-01-01 00:00:00.
    Clamped(DateTime),
}

impl ZipTimestamp {
    /// The date-time to record in the entry header.
    #[must_use]
    pub const fn datetime(self) -> DateTime {
        match self {
            Self::Exact(dt) | Self::Clamped(dt) => dt,
        }
    }

    /// Whether the original time had to be replaced.
    #[must_use]
    pub const fn was_clamped(self) -> bool {
        matches!(self, Self::Clamped(_))
    }
}

/// The smallest ZIP date-time, 1980-01-01 00:00:00.
#[must_use]
pub fn min_zip_datetime() -> DateTime {
    DateTime::default()
}

/// Converts a modification time (in local time, as ZIP tools expect).
///
/// Times before 1980 are clamped; times past the format's upper bound
/// (2107) are an error.
///
/// # Examples
///
/// ```
/// use distpack_core::creation::timestamp::zip_timestamp;
/// use std::time::SystemTime;
///
/// let converted = zip_timestamp(SystemTime::UNIX_EPOCH).unwrap();
/// assert!(converted.was_clamped());
/// assert_eq!(converted.datetime().year(), 1980);
/// ```
pub fn zip_timestamp(modified: SystemTime) -> Result<ZipTimestamp> {
    // Anything before 1970 is before 1980 in every time zone.
    let Ok(since_epoch) = modified.duration_since(UNIX_EPOCH) else {
        return Ok(ZipTimestamp::Clamped(min_zip_datetime()));
    };

    let out_of_range = || {
        BundleError::Zip(format!(
            "modification time {}s after 1970-01-01 cannot be stored in a ZIP header",
            since_epoch.as_secs()
        ))
    };

    let secs = i64::try_from(since_epoch.as_secs()).map_err(|_| out_of_range())?;
    let local = Local
        .timestamp_opt(secs, since_epoch.subsec_nanos())
        .earliest()
        .ok_or_else(out_of_range)?;
    if local.year() < MIN_ZIP_YEAR {
        return Ok(ZipTimestamp::Clamped(min_zip_datetime()));
    }

    let year = u16::try_from(local.year()).map_err(|_| out_of_range())?;
    // chrono guarantees these fields fit in a byte.
    #[allow(clippy::cast_possible_truncation)]
    let converted = DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    );

    match converted {
        Ok(dt) => Ok(ZipTimestamp::Exact(dt)),
        Err(_) => Err(out_of_range()),
    }
}
