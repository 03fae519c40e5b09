//! A scripted `Transport` for driving the client without a server.

use std::cell::RefCell;
use std::collections::VecDeque;
use tempodb::{Error, Request, Response, Result, Transport};

pub struct MockTransport {
    responses: RefCell<VecDeque<Result<Response>>>,
    pub sent: RefCell<Vec<Request>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport {
            responses: RefCell::new(VecDeque::new()),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn respond(self, response: Response) -> MockTransport {
        self.responses.borrow_mut().push_back(Ok(response));
        self
    }

    pub fn fail(self, err: Error) -> MockTransport {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn request(&self, idx: usize) -> Request {
        self.sent.borrow()[idx].clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        self.sent.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("no scripted response left".to_string())))
    }
}

/// A 200 response carrying `body` as JSON.
#[allow(dead_code)]
pub fn ok_json(body: &str) -> Response {
    Response::new(200, body).header("Content-Type", "application/json")
}
