//! Resolves canonical timezone names to UTC offsets.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset of `canonical_timezone`, e.g. "America/Argentina/Buenos_Aires".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

#[cfg(test)]
mod timezone_tests {
    use time::UtcOffset;

    use super::get_local_offset;

    #[test]
    fn buenos_aires_is_three_hours_behind_utc() {
        // Argentina has not observed daylight saving time since 2009.
        let got = get_local_offset("America/Argentina/Buenos_Aires");

        assert_eq!(got, Some(UtcOffset::from_hms(-3, 0, 0).unwrap()));
    }

    #[test]
    fn unknown_timezone_gives_none() {
        assert_eq!(get_local_offset("Mars/Olympus_Mons"), None);
    }
}
