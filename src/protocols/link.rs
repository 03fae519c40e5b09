//! Pagination through the `Link` response header.
//!
//! A page that is not the last one carries
//!
//! ```text
//! Link: </v1/segment/?key=key1&start=2012-03-27T00:02:00.000-05:00&end=2012-03-28>; rel="next"
//! ```
//!
//! The target's path and its `start` parameter are all that move from one
//! page to the next. Filter, timezone, rollup and interpolation are carried
//! forward from the original request untouched.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use error::{Error, Result};
use http::{Request, Response};
use regex::Regex;
use time;
use url::Url;

lazy_static! {
    static ref LINK_VALUE: Regex = Regex::new(r"<([^>]*)>([^,]*)").unwrap();
    static ref REL: Regex = Regex::new(r#"(?i)(?:^|;)\s*rel\s*=\s*"?([^";]*)"?"#).unwrap();
    static ref ORIGIN: Url = Url::parse("http://localhost/").unwrap();
}

/// How to fetch the page after this one.
#[derive(Clone, Debug, PartialEq)]
pub struct Continuation {
    /// Percent-encoded path of the next page.
    pub path: String,
    /// Inclusive start boundary of the next page.
    pub start: DateTime<Utc>,
}

impl Continuation {
    /// Parse a continuation from a link target, relative or absolute.
    pub fn parse(target: &str, tz: &Tz) -> Result<Continuation> {
        let url = ORIGIN.join(target)?;
        let start = url.query_pairs()
            .find(|&(ref k, _)| k == "start")
            .map(|(_, v)| v.into_owned())
            .ok_or_else(|| Error::Decode(format!("continuation {:?} has no start", target)))?;
        // form decoding reads an unescaped offset sign as a space
        let start = start.replace(' ', "+");
        let start = time::parse_timestamp(&start, tz)?.with_timezone(&Utc);
        Ok(Continuation {
            path: url.path().to_string(),
            start: start,
        })
    }

    /// The request for the next page: `request` with its path and `start`
    /// replaced.
    ///
    /// Fails when the continuation does not move past the start of
    /// `request`, which would otherwise page forever.
    pub fn follow(&self, request: &Request, tz: &Tz) -> Result<Request> {
        if let Some(current) = request.params.get("start") {
            let current = time::parse_timestamp(current, tz)?.with_timezone(&Utc);
            if self.start <= current {
                return Err(Error::Decode(format!(
                    "continuation start {} does not advance past {}",
                    self.start, current
                )));
            }
        }
        let mut next = request.clone();
        next.path = self.path.clone();
        next.params.set("start", time::format_timestamp(&self.start, tz));
        Ok(next)
    }
}

/// Find the `rel="next"` target among the `Link` headers of `response`.
pub fn next_target(response: &Response) -> Option<&str> {
    for value in response.header_values("link") {
        for caps in LINK_VALUE.captures_iter(value) {
            let is_next = REL.captures_iter(&caps[2]).any(|rel| {
                rel[1].split_whitespace().any(|r| r.eq_ignore_ascii_case("next"))
            });
            if is_next {
                return caps.get(1).map(|m| m.as_str());
            }
        }
    }
    None
}

/// Inspect a completed response for a continuation. `None` means this was
/// the last page.
pub fn continuation(response: &Response, tz: &Tz) -> Result<Option<Continuation>> {
    match next_target(response) {
        Some(target) => {
            let cont = Continuation::parse(target, tz)?;
            debug!("continuation to {} starting {}", cont.path, cont.start);
            Ok(Some(cont))
        }
        None => Ok(None),
    }
}
