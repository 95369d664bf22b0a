//! Canned SPARQL endpoint for enrichment tests.
use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use super::client::SparqlEndpoint;
use crate::provider::ProviderError;

/// Answers every query with the same results document and records the queries.
///
/// Clones share the query log.
#[derive(Clone)]
pub struct StubEndpoint {
    results: Option<Value>,
    queries: Rc<RefCell<Vec<String>>>,
}

impl StubEndpoint {
    pub fn new(results: Value) -> Self {
        Self {
            results: Some(results),
            queries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// An endpoint whose every query fails server-side.
    pub fn failing() -> Self {
        Self {
            results: None,
            queries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl SparqlEndpoint for StubEndpoint {
    fn select(&self, query: &str) -> Result<Value, ProviderError> {
        self.queries.borrow_mut().push(query.to_string());
        self.results
            .clone()
            .ok_or_else(|| ProviderError::Query("stub endpoint rejected the query".to_string()))
    }
}
