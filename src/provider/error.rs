use std::error::Error as StdError;

use thiserror::Error;

/// Errors surfaced by the providers to the host.
///
/// A feature that does not exist is not an error, see [`super::Provider::get`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The upstream source could not be reached or answered with something unreadable.
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    /// The query could not be answered as asked.
    #[error("query error: {0}")]
    Query(String),
    /// Enrichment data was present but not shaped like variable bindings.
    #[error("no data: {0}")]
    NoData(String),
}

impl ProviderError {
    pub fn connection(message: impl Into<String>) -> Self {
        ProviderError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, ProviderError::Connection { .. })
    }

    pub fn is_query(&self) -> bool {
        matches!(self, ProviderError::Query(_))
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ProviderError::NoData(_))
    }
}
