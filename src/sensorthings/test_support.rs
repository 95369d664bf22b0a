//! In-memory stand-in for a SensorThings server.
use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use super::fetch::{EntityRequest, EntitySource};
use crate::provider::ProviderError;

/// Answers every request with the same canned body and records the requests.
///
/// Clones share the request log.
#[derive(Clone)]
pub struct StubEntitySource {
    body: Option<Value>,
    fail: bool,
    requests: Rc<RefCell<Vec<EntityRequest>>>,
}

impl StubEntitySource {
    pub fn new(body: Option<Value>) -> Self {
        Self {
            body,
            fail: false,
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            fail: true,
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<EntityRequest> {
        self.requests.borrow().clone()
    }
}

impl EntitySource for StubEntitySource {
    fn fetch(&self, request: &EntityRequest) -> Result<Option<Value>, ProviderError> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail {
            return Err(ProviderError::connection("stub upstream unreachable"));
        }
        Ok(self.body.clone())
    }
}
