use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::provider::ProviderError;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Something that answers SPARQL SELECT queries with a JSON results document.
pub trait SparqlEndpoint {
    fn select(&self, query: &str) -> Result<Value, ProviderError>;
}

/// SPARQL 1.1 protocol endpoint queried over HTTP POST.
pub struct HttpSparqlEndpoint {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSparqlEndpoint {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ProviderError> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(crate::sensorthings::fetch::DEFAULT_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ProviderError::connection_with_source("Could not build HTTP client", err))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SparqlEndpoint for HttpSparqlEndpoint {
    fn select(&self, query: &str) -> Result<Value, ProviderError> {
        log::debug!("Sending SPARQL query to {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .map_err(|err| {
                log::error!("Error in SPARQL query: {}", err);
                ProviderError::connection_with_source(format!("Could not reach {}", self.url), err)
            })?;

        let status = response.status();
        let body = response.text().map_err(|err| {
            ProviderError::connection_with_source("Could not read SPARQL response", err)
        })?;
        decode_select_response(status, &body)
    }
}

/// Turn an endpoint answer into a results document.
///
/// An error status means the endpoint rejected the query. A success whose body is
/// not JSON is a connection error.
pub fn decode_select_response(status: StatusCode, body: &str) -> Result<Value, ProviderError> {
    if !status.is_success() {
        log::error!("SPARQL endpoint answered {}: {}", status, body);
        return Err(ProviderError::Query(format!(
            "SPARQL endpoint answered with status {}: {}",
            status, body
        )));
    }
    let results: Value = serde_json::from_str(body)
        .map_err(|err| ProviderError::connection_with_source("SPARQL response is not JSON", err))?;
    log::debug!("Received SPARQL results");
    Ok(results)
}

impl<E: SparqlEndpoint + ?Sized> SparqlEndpoint for Box<E> {
    fn select(&self, query: &str) -> Result<Value, ProviderError> {
        (**self).select(query)
    }
}
