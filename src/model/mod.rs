//! The values a caller hands to the client and the values it gets back.
//!
//! Everything here is plain data. `Filter`, `Interval`, `Rollup` and
//! `Interpolation` are built by the caller and borrowed, unchanged, by a
//! single read call.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::slice;
use std::str::FromStr;
use time::Period;

mod attributes;

pub use self::attributes::AttributeMap;

/// A named stream of time-stamped values.
///
/// The `key` is the series' identity and is opaque to the client. Name, tags
/// and attributes are metadata the server keeps alongside it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Series {
    /// Opaque identifier of the series.
    pub key: String,
    /// Human readable name, if one was set.
    pub name: Option<String>,
    /// Tags attached to the series.
    pub tags: BTreeSet<String>,
    /// Attributes attached to the series.
    pub attributes: AttributeMap,
}

impl Series {
    /// Create a series reference from its key.
    pub fn new<S>(key: S) -> Series
    where
        S: Into<String>,
    {
        Series {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Set the series name.
    pub fn name<S>(mut self, name: S) -> Series
    where
        S: Into<String>,
    {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to the series.
    pub fn tag<S>(mut self, tag: S) -> Series
    where
        S: Into<String>,
    {
        self.tags.insert(tag.into());
        self
    }

    /// Add an attribute to the series, replacing any earlier value.
    pub fn attribute<S>(mut self, name: S, value: S) -> Series
    where
        S: Into<String>,
    {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// One sample of a single series.
#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint {
    /// When the sample was taken.
    pub timestamp: DateTime<Tz>,
    /// The sampled value.
    pub value: f64,
}

impl DataPoint {
    /// Create a data point.
    pub fn new<Z: TimeZone>(timestamp: DateTime<Z>, value: f64) -> DataPoint {
        DataPoint {
            timestamp: timestamp.with_timezone(&Tz::UTC),
            value: value,
        }
    }
}

/// A sample bound to the series it belongs to, the unit of a write.
///
/// Values compare by bit pattern, so `NaN` equals itself and `0.0` differs
/// from `-0.0`.
#[derive(Clone, Debug)]
pub struct WritableDataPoint {
    /// Series the sample belongs to.
    pub series: Series,
    /// When the sample was taken.
    pub timestamp: DateTime<Tz>,
    /// The sampled value.
    pub value: f64,
}

impl PartialEq for WritableDataPoint {
    fn eq(&self, other: &WritableDataPoint) -> bool {
        self.series == other.series && self.timestamp == other.timestamp
            && self.value.to_bits() == other.value.to_bits()
    }
}

impl Eq for WritableDataPoint {}

impl Hash for WritableDataPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.series.hash(state);
        self.timestamp.hash(state);
        self.value.to_bits().hash(state);
    }
}

/// An ordered batch of samples across any number of series.
///
/// Two requests are equal when they hold the same samples in the same order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WriteRequest {
    data: Vec<WritableDataPoint>,
}

impl WriteRequest {
    /// Create an empty request.
    pub fn new() -> WriteRequest {
        WriteRequest::default()
    }

    /// Append `datapoint` for `series`.
    pub fn add(&mut self, series: &Series, datapoint: &DataPoint) -> &mut WriteRequest {
        self.data.push(WritableDataPoint {
            series: series.clone(),
            timestamp: datapoint.timestamp.clone(),
            value: datapoint.value,
        });
        self
    }

    /// Append every one of `datapoints` for `series`, in order.
    pub fn add_all(&mut self, series: &Series, datapoints: &[DataPoint]) -> &mut WriteRequest {
        for dp in datapoints {
            self.add(series, dp);
        }
        self
    }

    /// Iterate the samples in the order they were added.
    pub fn iter(&self) -> slice::Iter<WritableDataPoint> {
        self.data.iter()
    }

    /// Number of samples in the request.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Determine if the request holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'a> IntoIterator for &'a WriteRequest {
    type Item = &'a WritableDataPoint;
    type IntoIter = slice::Iter<'a, WritableDataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// One timestamp's values across several series. Not every series selected
/// by a read need have a value at every timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiDataPoint {
    /// The shared timestamp.
    pub timestamp: DateTime<Tz>,
    /// Series key to value, at most one entry per key.
    pub data: BTreeMap<String, f64>,
}

impl MultiDataPoint {
    /// Create a multi data point.
    pub fn new<Z: TimeZone>(timestamp: DateTime<Z>, data: BTreeMap<String, f64>) -> MultiDataPoint {
        MultiDataPoint {
            timestamp: timestamp.with_timezone(&Tz::UTC),
            data: data,
        }
    }

    /// The value for the series `key` at this timestamp, if there is one.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.data.get(key).cloned()
    }
}

/// Selection criteria for a multi-series read.
///
/// Keys and tags are sets, adding a duplicate is a no-op. Attributes are a
/// map, the last value written for a name wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    /// Series keys to select.
    pub keys: BTreeSet<String>,
    /// Tags a series must carry.
    pub tags: BTreeSet<String>,
    /// Attributes a series must carry.
    pub attributes: AttributeMap,
}

impl Filter {
    /// An empty filter.
    pub fn new() -> Filter {
        Filter::default()
    }

    /// Select the series with `key`.
    pub fn add_key<S>(mut self, key: S) -> Filter
    where
        S: Into<String>,
    {
        self.keys.insert(key.into());
        self
    }

    /// Require `tag`.
    pub fn add_tag<S>(mut self, tag: S) -> Filter
    where
        S: Into<String>,
    {
        self.tags.insert(tag.into());
        self
    }

    /// Require attribute `name` to equal `value`.
    pub fn add_attribute<S>(mut self, name: S, value: S) -> Filter
    where
        S: Into<String>,
    {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// A half-open `[start, end)` span of time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval. Fails when `end` precedes `start`.
    pub fn new<Z1, Z2>(start: DateTime<Z1>, end: DateTime<Z2>) -> Result<Interval>
    where
        Z1: TimeZone,
        Z2: TimeZone,
    {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end < start {
            return Err(Error::Precondition(format!(
                "interval end {} precedes start {}",
                end, start
            )));
        }
        Ok(Interval {
            start: start,
            end: end,
        })
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Determine if `instant` falls inside the interval.
    pub fn contains<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        let instant = instant.with_timezone(&Utc);
        self.start <= instant && instant < self.end
    }
}

macro_rules! wire_names {
    ($ty:ident, $what:expr, { $($variant:ident => $name:literal),+ $(,)* }) => {
        impl $ty {
            /// The lower-case name used on the wire.
            pub fn as_str(&self) -> &'static str {
                match *self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<$ty> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(Error::Decode(format!("unknown {} {:?}", $what, s))),
                }
            }
        }
    }
}

/// Server-side aggregation applied to each rollup bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fold {
    /// Sum of the bucket.
    Sum,
    /// Arithmetic mean of the bucket.
    Mean,
    /// Largest value in the bucket.
    Max,
    /// Smallest value in the bucket.
    Min,
    /// Number of values in the bucket.
    Count,
    /// Standard deviation of the bucket.
    StdDev,
    /// Sum of squares of the bucket.
    SumOfSquares,
    /// Difference between the largest and smallest value.
    Range,
    /// Earliest value in the bucket.
    First,
    /// Latest value in the bucket.
    Last,
}

wire_names!(Fold, "fold", {
    Sum => "sum",
    Mean => "mean",
    Max => "max",
    Min => "min",
    Count => "count",
    StdDev => "stddev",
    SumOfSquares => "ss",
    Range => "range",
    First => "first",
    Last => "last",
});

/// Time-bucketed aggregation computed by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rollup {
    /// Bucket width.
    pub period: Period,
    /// Aggregation applied per bucket.
    pub fold: Fold,
}

impl Rollup {
    /// Create a rollup.
    pub fn new(period: Period, fold: Fold) -> Rollup {
        Rollup {
            period: period,
            fold: fold,
        }
    }
}

/// Gap-filling function applied by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterpolationFunction {
    /// Straight line between neighbouring points.
    Linear,
    /// Zero-order hold, the previous value carries forward.
    Zoh,
}

wire_names!(InterpolationFunction, "interpolation function", {
    Linear => "linear",
    Zoh => "zoh",
});

/// Gap filling computed by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interpolation {
    /// Spacing of the filled points.
    pub period: Period,
    /// How gaps are filled.
    pub function: InterpolationFunction,
}

impl Interpolation {
    /// Create an interpolation.
    pub fn new(period: Period, function: InterpolationFunction) -> Interpolation {
        Interpolation {
            period: period,
            function: function,
        }
    }

    /// Linear interpolation at `period` spacing.
    pub fn linear(period: Period) -> Interpolation {
        Interpolation::new(period, InterpolationFunction::Linear)
    }

    /// Zero-order hold at `period` spacing.
    pub fn zoh(period: Period) -> Interpolation {
        Interpolation::new(period, InterpolationFunction::Zoh)
    }
}
