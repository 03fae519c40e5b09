//! Lazy, forward-only iteration over paginated reads.
//!
//! A `Cursor` owns the request for its next page and nothing else until it is
//! advanced. Building one performs no I/O. Each advance either hands out a
//! buffered point or, once the buffer runs dry and the last page named a
//! continuation, fetches, decodes and buffers exactly one more page. Only one
//! page is ever held in memory.
//!
//! Failures are never raised when a cursor is built or while a page is
//! fetched. They are stored and handed to the caller on the advance that
//! needed the failed page.

use chrono_tz::Tz;
use error::{Error, Result};
use http::{Request, Transport};
use protocols::json::{self, Decode, Segment};
use protocols::link::{self, Continuation};
use std::mem;
use std::time::Instant;
use std::vec;
use time;

/// Observable lifecycle of a `Cursor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    /// Built, nothing fetched yet.
    NotStarted,
    /// A page fetch is underway.
    FetchingPage,
    /// A page is buffered; it may already be fully consumed, in which case
    /// the next advance follows its continuation.
    HasBuffered,
    /// Every page has been consumed.
    Exhausted,
    /// A page could not be fetched or decoded.
    Errored,
}

enum State<T> {
    NotStarted(Request),
    Fetching,
    Buffered {
        page: vec::IntoIter<T>,
        request: Request,
        // a bad `Link` only spoils the page after this one
        continuation: Result<Option<Continuation>>,
    },
    Exhausted,
    Errored(Error),
}

/// A lazy sequence of points spanning any number of pages.
///
/// `advance` is the primitive: it yields `Ok(Some(point))`, `Ok(None)` at the
/// end, or the error that stopped the cursor, again on every later call. The
/// `Iterator` impl reports that error once and then yields `None`; only
/// `advance` repeats it.
///
/// An unusable continuation on a page is reported after that page's points
/// have been handed out.
///
/// A cursor is driven by one consumer; dropping it is the only way to cancel
/// and leaves no request in flight.
pub struct Cursor<'a, T> {
    transport: &'a dyn Transport,
    tz: Tz,
    state: State<T>,
    pages: usize,
    error_reported: bool,
}

impl<'a, T: Decode> Cursor<'a, T> {
    /// Create a cursor whose first page is `request`. Timestamps are
    /// projected into `tz`. Nothing is sent until the first advance.
    pub fn new(transport: &'a dyn Transport, request: Request, tz: Tz) -> Cursor<'a, T> {
        Cursor {
            transport: transport,
            tz: tz,
            state: State::NotStarted(request),
            pages: 0,
            error_reported: false,
        }
    }

    /// Where the cursor is in its lifecycle.
    pub fn state(&self) -> CursorState {
        match self.state {
            State::NotStarted(_) => CursorState::NotStarted,
            State::Fetching => CursorState::FetchingPage,
            State::Buffered { .. } => CursorState::HasBuffered,
            State::Exhausted => CursorState::Exhausted,
            State::Errored(_) => CursorState::Errored,
        }
    }

    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// The timezone points are projected into.
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Move to the next point, fetching a page if the buffer is empty.
    pub fn advance(&mut self) -> Result<Option<T>> {
        loop {
            match mem::replace(&mut self.state, State::Fetching) {
                State::NotStarted(request) => self.load(request),
                State::Buffered {
                    mut page,
                    request,
                    continuation,
                } => {
                    if let Some(item) = page.next() {
                        self.state = State::Buffered {
                            page: page,
                            request: request,
                            continuation: continuation,
                        };
                        return Ok(Some(item));
                    }
                    match continuation {
                        Ok(Some(cont)) => match cont.follow(&request, &self.tz) {
                            Ok(next) => self.load(next),
                            Err(e) => self.state = State::Errored(e),
                        },
                        Ok(None) => self.state = State::Exhausted,
                        Err(e) => self.state = State::Errored(e),
                    }
                }
                State::Exhausted => {
                    self.state = State::Exhausted;
                    return Ok(None);
                }
                State::Errored(e) => {
                    self.state = State::Errored(e.clone());
                    return Err(e);
                }
                // only seen if an earlier fetch unwound mid-flight
                State::Fetching => {
                    let err = Error::Transport("page fetch was interrupted".to_string());
                    self.state = State::Errored(err.clone());
                    return Err(err);
                }
            }
        }
    }

    fn load(&mut self, request: Request) {
        self.pages += 1;
        let started = Instant::now();
        self.state = match self.fetch(&request) {
            Ok((segment, continuation)) => {
                debug!(
                    "page {} from {}: {} points in {}ns, more: {:?}",
                    self.pages,
                    request.path,
                    segment.data.len(),
                    time::elapsed_ns(started),
                    continuation.as_ref().map(|c| c.is_some())
                );
                State::Buffered {
                    page: segment.data.into_iter(),
                    request: request,
                    continuation: continuation,
                }
            }
            Err(e) => {
                debug!("page {} from {} failed: {}", self.pages, request.path, e);
                State::Errored(e)
            }
        };
    }

    fn fetch(&self, request: &Request) -> Result<(Segment<T>, Result<Option<Continuation>>)> {
        let response = self.transport.send(request)?.check()?;
        let segment = json::decode_segment(&response.body, &self.tz)?;
        let continuation = link::continuation(&response, &self.tz);
        Ok((segment, continuation))
    }
}

impl<'a, T: Decode> Iterator for Cursor<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if self.error_reported {
            return None;
        }
        match self.advance() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                self.error_reported = true;
                Some(Err(e))
            }
        }
    }
}
