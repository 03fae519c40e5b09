//! Decoding of TempoDB JSON response bodies.
//!
//! A read returns one segment per page:
//!
//! ```text
//! { "tz": "UTC",
//!   "rollup": null | { "fold": "sum", "period": "PT1H" },
//!   "data": [ { "t": "2012-01-01T00:00:00.000Z", "v": ... }, ... ] }
//! ```
//!
//! where `v` is a number for single-series reads and an object of series key
//! to number for multi-series reads. Points keep the order the server sent.

use chrono::DateTime;
use chrono_tz::Tz;
use error::{Error, Result};
use model::{DataPoint, MultiDataPoint, Rollup, Series};
use serde::de::DeserializeOwned;
use serde_json;
use std::collections::BTreeMap;
use time;

/// A point type that can be read out of a segment.
pub trait Decode: Sized {
    /// Shape of `v` on the wire.
    type Value: DeserializeOwned;

    /// Build a point from its timestamp, already projected into the requested
    /// timezone, and its wire value.
    fn from_wire(timestamp: DateTime<Tz>, value: Self::Value) -> Self;
}

impl Decode for DataPoint {
    type Value = f64;

    fn from_wire(timestamp: DateTime<Tz>, value: f64) -> DataPoint {
        DataPoint {
            timestamp: timestamp,
            value: value,
        }
    }
}

impl Decode for MultiDataPoint {
    type Value = BTreeMap<String, Option<f64>>;

    fn from_wire(timestamp: DateTime<Tz>, value: Self::Value) -> MultiDataPoint {
        // a null value means the series has nothing at this timestamp
        let data = value
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        MultiDataPoint {
            timestamp: timestamp,
            data: data,
        }
    }
}

#[derive(Deserialize)]
struct WireRollup {
    fold: String,
    period: String,
}

#[derive(Deserialize)]
struct WirePoint<V> {
    t: String,
    v: V,
}

#[derive(Deserialize)]
struct WireSegment<V> {
    #[serde(default)]
    tz: Option<String>,
    #[serde(default)]
    rollup: Option<WireRollup>,
    data: Vec<WirePoint<V>>,
}

#[derive(Deserialize)]
struct WireSeries {
    key: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

/// One decoded page of a read.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment<T> {
    /// Timezone the server declared for the page.
    pub tz: Tz,
    /// Rollup the server applied, if any.
    pub rollup: Option<Rollup>,
    /// The page's points, in server order.
    pub data: Vec<T>,
}

/// Decode a segment body, projecting every timestamp into `tz`.
///
/// Timestamps with an embedded offset keep their instant. Timestamps without
/// one are wall-clock time in the segment's declared timezone, falling back to
/// `tz` when the segment declares none.
pub fn decode_segment<T: Decode>(body: &[u8], tz: &Tz) -> Result<Segment<T>> {
    let wire: WireSegment<T::Value> = serde_json::from_slice(body)?;

    let doc_tz = match wire.tz {
        Some(ref name) => name.parse::<Tz>()
            .map_err(|_| Error::Decode(format!("unknown timezone {:?} in response", name)))?,
        None => *tz,
    };
    let rollup = match wire.rollup {
        Some(r) => Some(Rollup::new(r.period.parse()?, r.fold.parse()?)),
        None => None,
    };

    let mut data = Vec::with_capacity(wire.data.len());
    for point in wire.data {
        let timestamp = time::parse_timestamp(&point.t, &doc_tz)?.with_timezone(tz);
        data.push(T::from_wire(timestamp, point.v));
    }
    Ok(Segment {
        tz: doc_tz,
        rollup: rollup,
        data: data,
    })
}

/// Decode a series body.
pub fn decode_series(body: &[u8]) -> Result<Series> {
    let wire: WireSeries = serde_json::from_slice(body)?;
    Ok(Series {
        key: wire.key,
        name: wire.name.and_then(|n| if n.is_empty() { None } else { Some(n) }),
        tags: wire.tags.into_iter().collect(),
        attributes: wire.attributes.into_iter().collect(),
    })
}
