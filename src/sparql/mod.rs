//! Feature enrichment from a SPARQL endpoint.
pub mod client;
pub mod enrich;
pub mod provider;
pub mod query;
#[cfg(test)]
pub(crate) mod test_support;

pub use provider::{SparqlDefinition, SparqlProvider};
