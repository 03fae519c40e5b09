//! Query string encoding for the read endpoints.
//!
//! A read is fully described by its filter, interval, display timezone and
//! optional rollup / interpolation blocks. This module flattens those into the
//! ordered key / value pairs the server expects. An absent rollup or
//! interpolation emits nothing at all, never empty defaults.

use chrono_tz::Tz;
use model::{Filter, Interpolation, Interval, Rollup};
use std::slice::Iter;
use time;

/// Ordered query parameters. Names may repeat, `key` and `tag` do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    inner: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter list.
    pub fn new() -> QueryParams {
        QueryParams::default()
    }

    /// Append a parameter.
    pub fn push<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.push((name.into(), value.into()));
    }

    /// Replace every occurrence of `name` with a single `value`, keeping the
    /// position of the first occurrence. Appends if `name` is absent.
    pub fn set<V>(&mut self, name: &str, value: V)
    where
        V: Into<String>,
    {
        let value = value.into();
        match self.inner.iter().position(|&(ref k, _)| k == name) {
            Some(idx) => {
                self.inner[idx].1 = value;
                let mut seen = 0;
                self.inner.retain(|&(ref k, _)| {
                    if k == name {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.push(name, value),
        }
    }

    /// The first value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|&&(ref k, _)| k == name)
            .map(|&(_, ref v)| v.as_str())
    }

    /// Every value stored under `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.inner
            .iter()
            .filter(move |&&(ref k, _)| k == name)
            .map(|&(_, ref v)| v.as_str())
    }

    /// Determine if the pair `name=value` is present.
    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.inner.iter().any(|&(ref k, ref v)| k == name && v == value)
    }

    /// Iterate the pairs in order.
    pub fn iter(&self) -> Iter<(String, String)> {
        self.inner.iter()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Determine if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = &'a (String, String);
    type IntoIter = Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[inline]
fn push_filter(filter: &Filter, params: &mut QueryParams) {
    for key in &filter.keys {
        params.push("key", key.as_str());
    }
    for tag in &filter.tags {
        params.push("tag", tag.as_str());
    }
    for &(ref name, ref value) in filter.attributes.iter() {
        params.push(format!("attr[{}]", name), value.as_str());
    }
}

#[inline]
fn push_window(
    interval: &Interval,
    tz: &Tz,
    rollup: Option<&Rollup>,
    interpolation: Option<&Interpolation>,
    params: &mut QueryParams,
) {
    params.push("start", time::format_timestamp(&interval.start(), tz));
    params.push("end", time::format_timestamp(&interval.end(), tz));
    params.push("tz", tz.name());
    if let Some(rollup) = rollup {
        params.push("rollup.period", rollup.period.to_string());
        params.push("rollup.fold", rollup.fold.as_str());
    }
    if let Some(interpolation) = interpolation {
        params.push("interpolation.period", interpolation.period.to_string());
        params.push("interpolation.function", interpolation.function.as_str());
    }
}

/// Parameters for the first page of a multi-series read.
pub fn multi_params(
    filter: &Filter,
    interval: &Interval,
    tz: &Tz,
    rollup: Option<&Rollup>,
    interpolation: Option<&Interpolation>,
) -> QueryParams {
    let mut params = QueryParams::new();
    push_filter(filter, &mut params);
    push_window(interval, tz, rollup, interpolation, &mut params);
    for &(ref k, ref v) in &params {
        trace!("multi read param {}={}", k, v);
    }
    params
}

/// Parameters for the first page of a single-series read. The series itself
/// is addressed by path, so no filter parameters are emitted.
pub fn series_params(
    interval: &Interval,
    tz: &Tz,
    rollup: Option<&Rollup>,
    interpolation: Option<&Interpolation>,
) -> QueryParams {
    let mut params = QueryParams::new();
    push_window(interval, tz, rollup, interpolation, &mut params);
    params
}
