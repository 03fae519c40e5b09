//! Timestamps and periods as they travel over the wire.
//!
//! Outgoing timestamps are ISO-8601 with millisecond precision and a
//! fixed-width numeric offset, `2012-01-01T00:00:00.000+0000`. Incoming
//! timestamps are accepted with a numeric offset, with `Z`, or with no offset
//! at all, in which case they are read as wall-clock time in the zone the
//! response declares.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

lazy_static! {
    static ref PERIOD: Regex = Regex::new(
        r"^P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d{1,3}))?S)?)?$"
    ).unwrap();
}

/// Nanoseconds elapsed since `i`, saturating.
pub fn elapsed_ns(i: Instant) -> u64 {
    let elapsed = i.elapsed();
    (elapsed.as_secs().saturating_mul(1_000_000_000))
        .saturating_add(u64::from(elapsed.subsec_nanos()))
}

/// Look up a timezone by its IANA identifier, `UTC` or `America/Chicago` for
/// instance.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| Error::Precondition(format!("unknown timezone {:?}: {}", name, e)))
}

/// Format `instant` as seen from `tz` in the wire format.
pub fn format_timestamp<Z: TimeZone>(instant: &DateTime<Z>, tz: &Tz) -> String {
    instant.with_timezone(tz).format(WIRE_FORMAT).to_string()
}

/// Parse a wire timestamp and project it into `tz`.
///
/// An embedded offset (numeric or `Z`) always wins. Timestamps without one
/// are wall-clock time in `tz`; a wall-clock time that `tz` skips over is an
/// error, an ambiguous one resolves to the earlier instant.
pub fn parse_timestamp(s: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(tz));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    match naive {
        Some(naive) => tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
            Error::Decode(format!("timestamp {:?} does not exist in {}", s, tz.name()))
        }),
        None => Err(Error::Decode(format!("unparseable timestamp {:?}", s))),
    }
}

/// Convenience for building instants in tests and at the command line.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec).single()
}

/// An ISO-8601 period, `PT1M` or `P1DT12H` for example.
///
/// Periods are calendar aware and only ever interpreted by the server, so
/// the fields are kept as written rather than normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Period {
    /// Whole years.
    pub years: u32,
    /// Whole months.
    pub months: u32,
    /// Whole weeks.
    pub weeks: u32,
    /// Whole days.
    pub days: u32,
    /// Whole hours.
    pub hours: u32,
    /// Whole minutes.
    pub minutes: u32,
    /// Whole seconds.
    pub seconds: u32,
    /// Milliseconds. Anything past 999 is written out as whole seconds.
    pub millis: u32,
}

impl Period {
    /// A period of `n` years.
    pub fn years(n: u32) -> Period {
        Period { years: n, ..Default::default() }
    }

    /// A period of `n` months.
    pub fn months(n: u32) -> Period {
        Period { months: n, ..Default::default() }
    }

    /// A period of `n` weeks.
    pub fn weeks(n: u32) -> Period {
        Period { weeks: n, ..Default::default() }
    }

    /// A period of `n` days.
    pub fn days(n: u32) -> Period {
        Period { days: n, ..Default::default() }
    }

    /// A period of `n` hours.
    pub fn hours(n: u32) -> Period {
        Period { hours: n, ..Default::default() }
    }

    /// A period of `n` minutes.
    pub fn minutes(n: u32) -> Period {
        Period { minutes: n, ..Default::default() }
    }

    /// A period of `n` seconds.
    pub fn seconds(n: u32) -> Period {
        Period { seconds: n, ..Default::default() }
    }

    /// Determine if every field is zero.
    pub fn is_zero(&self) -> bool {
        *self == Period::default()
    }

    fn has_time(&self) -> bool {
        self.hours > 0 || self.minutes > 0 || self.seconds > 0 || self.millis > 0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("PT0S");
        }
        f.write_str("P")?;
        for &(n, unit) in &[
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if n > 0 {
                write!(f, "{}{}", n, unit)?;
            }
        }
        if self.has_time() {
            f.write_str("T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            // whole seconds hiding in `millis` carry over
            let seconds = u64::from(self.seconds) + u64::from(self.millis / 1000);
            let millis = self.millis % 1000;
            if millis > 0 {
                write!(f, "{}.{:03}S", seconds, millis)?;
            } else if seconds > 0 {
                write!(f, "{}S", seconds)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Period> {
        let bad = || Error::Decode(format!("malformed period {:?}", s));
        let caps = PERIOD.captures(s).ok_or_else(bad)?;
        if (1..9).all(|i| caps.get(i).is_none()) {
            return Err(bad());
        }
        let field = |i: usize| -> Result<u32> {
            match caps.get(i) {
                Some(m) => m.as_str().parse::<u32>().map_err(|_| bad()),
                None => Ok(0),
            }
        };
        let millis = match caps.get(8) {
            // ".5" is half a second, not five milliseconds
            Some(m) => format!("{:0<3}", m.as_str()).parse::<u32>().map_err(|_| bad())?,
            None => 0,
        };
        Ok(Period {
            years: field(1)?,
            months: field(2)?,
            weeks: field(3)?,
            days: field(4)?,
            hours: field(5)?,
            minutes: field(6)?,
            seconds: field(7)?,
            millis: millis,
        })
    }
}
