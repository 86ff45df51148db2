use std::cmp::Ordering;
use std::fmt;

use crate::error::{Result, TypeError};

/// Milliseconds per second.
const MS_PER_SEC: i64 = 1000;
/// Milliseconds per day.
const MS_PER_DAY: i64 = 86_400_000;
/// FORTE's DATE_AND_TIME zero is 1970-01-01 01:00:00.000, one hour past the
/// Unix epoch.
const REFERENCE_OFFSET_MS: i64 = 3_600_000;

/// An IEC 61499 DATE_AND_TIME value as represented in 4diac-RTE (FORTE).
///
/// Acts as the adapter between the host simulation clock (integer seconds
/// since the start of the simulation) and the absolute millisecond value
/// FORTE puts on the wire. A `DateAndTime` carries two things: the absolute
/// instant it currently represents, and the absolute instant at which
/// simulation time is zero.
///
/// ```
/// use fblink_types::DateAndTime;
///
/// // Simulation starts at the beginning of 2017.
/// let mut dt = DateAndTime::from_year(2017);
/// dt.set_simulation_secs(3600);
/// assert_eq!(dt.simulation_secs(), 3600);
/// assert_eq!(dt.to_string(), "01.01.2017 01:00:00");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DateAndTime {
    /// Absolute encoded value: ms since the FORTE reference instant.
    millis: i64,
    /// Absolute ms value at simulation time zero.
    simulation_start: i64,
}

impl DateAndTime {
    /// A timestamp with both the value and the simulation start at the
    /// reference instant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a timestamp whose simulation start is the given absolute
    /// millisecond value.
    pub fn from_simulation_start(millis: i64) -> Self {
        Self {
            millis: 0,
            simulation_start: millis.max(0),
        }
    }

    /// Builds a timestamp whose simulation start is midnight, January 1st of
    /// the given year.
    pub fn from_year(year: i32) -> Self {
        Self::from_date(year, 1, 1, 0, 0, 0, 0)
    }

    /// Builds a timestamp whose simulation start is the given civil date and
    /// time of day.
    ///
    /// Dates before the reference instant clamp to it; the remote
    /// representation has no notion of negative time.
    pub fn from_date(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
    ) -> Self {
        let days = days_from_civil(year, month, day);
        let ms = days * MS_PER_DAY
            + i64::from(hour) * 3_600_000
            + i64::from(minute) * 60_000
            + i64::from(second) * MS_PER_SEC
            + i64::from(millisecond)
            - REFERENCE_OFFSET_MS;
        Self::from_simulation_start(ms)
    }

    /// Parses a `dd.MM.yyyy HH:mm:ss` string into a simulation start value.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || TypeError::InvalidDate {
            input: input.to_owned(),
        };
        let (date, time) = input.trim().split_once(' ').ok_or_else(invalid)?;
        let mut date_parts = date.split('.');
        let mut time_parts = time.split(':');
        let mut next = |parts: &mut std::str::Split<'_, char>| -> Result<i64> {
            parts
                .next()
                .and_then(|p| p.parse::<i64>().ok())
                .ok_or_else(invalid)
        };
        let day = next(&mut date_parts)?;
        let month = next(&mut date_parts)?;
        let year = next(&mut date_parts)?;
        let hour = next(&mut time_parts)?;
        let minute = next(&mut time_parts)?;
        let second = next(&mut time_parts)?;
        if date_parts.next().is_some() || time_parts.next().is_some() {
            return Err(invalid());
        }
        if !(1..=31).contains(&day)
            || !(1..=12).contains(&month)
            || !(0..24).contains(&hour)
            || !(0..60).contains(&minute)
            || !(0..60).contains(&second)
        {
            return Err(invalid());
        }
        Ok(Self::from_date(
            year as i32,
            month as u32,
            day as u32,
            hour as u32,
            minute as u32,
            second as u32,
            0,
        ))
    }

    /// Sets the represented instant to `secs` seconds past the simulation
    /// start. Values that would land before the reference instant clamp to
    /// it.
    pub fn set_simulation_secs(&mut self, secs: i64) {
        self.set_millis(self.simulation_start + secs * MS_PER_SEC);
    }

    /// Seconds between the simulation start and the represented instant.
    pub fn simulation_secs(&self) -> i64 {
        (self.millis - self.simulation_start) / MS_PER_SEC
    }

    /// The absolute encoded value in milliseconds.
    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Sets the absolute encoded value, clamping at the reference instant.
    pub fn set_millis(&mut self, value: i64) {
        self.millis = value.max(0);
    }

    /// The absolute millisecond value at simulation time zero.
    pub fn simulation_start(&self) -> i64 {
        self.simulation_start
    }
}

// Two timestamps compare by their absolute encoded value only; the
// simulation start is bookkeeping, not identity.
impl PartialEq for DateAndTime {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl Eq for DateAndTime {}

impl PartialOrd for DateAndTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateAndTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.cmp(&other.millis)
    }
}

impl fmt::Display for DateAndTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.millis + REFERENCE_OFFSET_MS;
        let days = total.div_euclid(MS_PER_DAY);
        let mut rem = total.rem_euclid(MS_PER_DAY) / MS_PER_SEC;
        let second = rem % 60;
        rem /= 60;
        let minute = rem % 60;
        let hour = rem / 60;
        let (year, month, day) = civil_from_days(days);
        write!(
            f,
            "{day:02}.{month:02}.{year:04} {hour:02}:{minute:02}:{second:02}"
        )
    }
}

/// Days between 1970-01-01 and the given civil date (proleptic Gregorian).
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = mp + if mp < 10 { 3 } else { -9 };
    (y + i64::from(month <= 2), month, day)
}
