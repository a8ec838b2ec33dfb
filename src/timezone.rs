//! Local time for timestamps written to the worksheet and used in file names.

use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The format of the `date` column and the health check timestamp.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The format of the timestamp in export file names.
pub const FILE_STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

/// The current UTC offset of a canonical timezone, e.g. "Asia/Jakarta".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current time in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a known canonical timezone.
pub fn now_local(canonical_timezone: &str) -> Result<OffsetDateTime, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset))
}

/// Format `datetime` as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(datetime: OffsetDateTime) -> String {
    datetime
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| datetime.to_string())
}

/// Format `datetime` as `YYYYMMDD_HHMMSS`.
pub fn format_file_stamp(datetime: OffsetDateTime) -> String {
    datetime
        .format(FILE_STAMP_FORMAT)
        .unwrap_or_else(|_| datetime.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::Error;

    use super::{format_file_stamp, format_timestamp, get_local_offset, now_local};

    #[test]
    fn formats_timestamps() {
        let datetime = datetime!(2025-03-04 05:06:07 UTC);

        assert_eq!(format_timestamp(datetime), "2025-03-04 05:06:07");
        assert_eq!(format_file_stamp(datetime), "20250304_050607");
    }

    #[test]
    fn resolves_canonical_timezone() {
        assert!(get_local_offset("Asia/Jakarta").is_some());
        assert!(now_local("Etc/UTC").is_ok());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert_eq!(
            now_local("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezone("Mars/Olympus_Mons".to_owned()))
        );
    }
}
