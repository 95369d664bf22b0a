use std::time::Duration;

use geojson::JsonObject;
use reqwest::StatusCode;
use serde_json::Value;

use crate::provider::ProviderError;

pub const DEFAULT_USER_AGENT: &str = "geo-providers";

/// One request against a SensorThings entity set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRequest {
    pub entity: String,
    pub identifier: Option<String>,
    pub skip: usize,
    pub top: usize,
    /// Ask the server for the total number of entities with `$count=true`.
    pub count: bool,
}

impl EntityRequest {
    pub fn page(entity: impl Into<String>, skip: usize, top: usize) -> Self {
        Self {
            entity: entity.into(),
            identifier: None,
            skip,
            top,
            count: false,
        }
    }

    pub fn single(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            identifier: Some(identifier.into()),
            skip: 0,
            top: 1,
            count: false,
        }
    }

    /// `<base>/<entity>` or `<base>/<entity>(<identifier>)`.
    ///
    /// Integer identifiers are used as is, anything else becomes a quoted string key.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}/{}", base_url.trim_end_matches('/'), self.entity);
        if let Some(identifier) = &self.identifier {
            if identifier.parse::<i64>().is_ok() {
                url.push_str(&format!("({})", identifier));
            } else {
                url.push_str(&format!("('{}')", identifier.replace('\'', "''")));
            }
        }
        url
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("$expand", "Locations".to_string()),
            ("$skip", self.skip.to_string()),
            ("$top", self.top.to_string()),
        ];
        if self.count {
            pairs.push(("$count", "true".to_string()));
        }
        pairs
    }
}

/// Transport used by the SensorThings provider.
pub trait EntitySource {
    /// Issue `request` and return the decoded JSON body, or `None` if the upstream answered 404.
    fn fetch(&self, request: &EntityRequest) -> Result<Option<Value>, ProviderError>;
}

/// [`EntitySource`] talking to a SensorThings server over HTTP.
pub struct HttpEntitySource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpEntitySource {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ProviderError::connection_with_source("Could not build HTTP client", err))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl EntitySource for HttpEntitySource {
    fn fetch(&self, request: &EntityRequest) -> Result<Option<Value>, ProviderError> {
        let url = request.url(&self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&request.query_pairs())
            .send()
            .map_err(|err| {
                log::error!("Request to {} failed: {}", url, err);
                ProviderError::connection_with_source(format!("Could not reach {}", url), err)
            })?;
        log::debug!("{}", response.url());

        let status = response.status();
        let body = response.text().map_err(|err| {
            ProviderError::connection_with_source(format!("Could not read response from {}", url), err)
        })?;
        decode_entity_response(&url, status, &body)
    }
}

/// Turn an upstream answer into a JSON body.
///
/// 404 is `Ok(None)`. Any other non-success status or a body that is not JSON
/// is a connection error.
pub fn decode_entity_response(
    url: &str,
    status: StatusCode,
    body: &str,
) -> Result<Option<Value>, ProviderError> {
    if status == StatusCode::NOT_FOUND {
        log::debug!("{} answered 404", url);
        return Ok(None);
    }
    if !status.is_success() {
        log::error!("{} answered {}: {}", url, status, body);
        return Err(ProviderError::connection(format!(
            "{} answered with status {}",
            url, status
        )));
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|err| ProviderError::connection_with_source(format!("Invalid JSON from {}", url), err))
}

/// Records of one response, plus the server-side total when it reported one.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub records: Vec<JsonObject>,
    pub count: Option<u64>,
}

/// Fetch `request` and split the response into raw records.
///
/// `Ok(None)` is only returned for identifier requests the upstream does not know.
pub fn fetch_page(
    source: &dyn EntitySource,
    request: &EntityRequest,
) -> Result<Option<RawPage>, ProviderError> {
    let body = match source.fetch(request)? {
        Some(body) => body,
        None if request.identifier.is_some() => return Ok(None),
        None => {
            return Err(ProviderError::connection(format!(
                "Entity set '{}' not found",
                request.entity
            )))
        }
    };

    if request.identifier.is_some() {
        return match body {
            Value::Object(record) => Ok(Some(RawPage {
                records: vec![record],
                count: None,
            })),
            other => Err(ProviderError::connection(format!(
                "Expected a single entity object, got {}",
                other
            ))),
        };
    }

    let mut body = match body {
        Value::Object(body) => body,
        other => {
            return Err(ProviderError::connection(format!(
                "Expected an entity collection object, got {}",
                other
            )))
        }
    };
    let count = body.get("@iot.count").and_then(Value::as_u64);
    let records = match body.remove("value") {
        Some(Value::Array(values)) => values
            .into_iter()
            .map(|value| match value {
                Value::Object(record) => Ok(record),
                other => Err(ProviderError::connection(format!(
                    "Expected an entity object, got {}",
                    other
                ))),
            })
            .collect::<Result<Vec<JsonObject>, ProviderError>>()?,
        _ => {
            return Err(ProviderError::connection(
                "Response has no 'value' array of entities",
            ))
        }
    };
    Ok(Some(RawPage { records, count }))
}
