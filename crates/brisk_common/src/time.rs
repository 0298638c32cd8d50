use core::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock timestamp, in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeStamp {
    pub year        : u16,
    pub month       : u8,
    pub day_of_week : u8,
    pub day         : u8,
    pub hour        : u8,
    pub minute      : u8,
    pub second      : u8,
    pub millisecond : u16,
}

impl TimeStamp {
    const SECS_PER_DAY: u64 = 86_400;

    /// Build a timestamp from a duration since the unix epoch, in milliseconds.
    pub fn from_unix_millis(millis: u64) -> Self {
        let secs = millis / 1000;
        let days = secs / Self::SECS_PER_DAY;
        let secs_of_day = secs % Self::SECS_PER_DAY;

        let (year, month, day) = civil_from_days(days as i64);

        Self {
            year: year as u16,
            month,
            // 1970-01-01 was a thursday, sunday == 0
            day_of_week: ((days + 4) % 7) as u8,
            day,
            hour: (secs_of_day / 3600) as u8,
            minute: (secs_of_day / 60 % 60) as u8,
            second: (secs_of_day % 60) as u8,
            millisecond: (millis % 1000) as u16,
        }
    }
}

// TODO: customizable formatter
impl Display for TimeStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}", self.year, self.month, self.day, self.hour, self.minute, self.second, self.millisecond))
    }
}

/// Get the current UTC timestamp.
///
/// A clock set before the unix epoch is reported as the epoch itself.
pub fn get_timestamp() -> TimeStamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |dur| dur.as_millis() as u64);
    TimeStamp::from_unix_millis(millis)
}

/// Convert days since 1970-01-01 into a proleptic gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    // Shift the epoch to 0000-03-01, so leap days are at the end of the 400 year era.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_a_thursday() {
        let ts = TimeStamp::from_unix_millis(0);
        assert_eq!((ts.year, ts.month, ts.day), (1970, 1, 1));
        assert_eq!(ts.day_of_week, 4);
        assert_eq!(ts.to_string(), "1970-01-01 00:00:00.000");
    }

    #[test]
    fn leap_day_and_time_of_day() {
        // 2024-02-29 13:45:30.250 UTC
        let ts = TimeStamp::from_unix_millis(1_709_214_330_250);
        assert_eq!((ts.year, ts.month, ts.day), (2024, 2, 29));
        assert_eq!((ts.hour, ts.minute, ts.second, ts.millisecond), (13, 45, 30, 250));
        assert_eq!(ts.to_string(), "2024-02-29 13:45:30.250");
    }
}
