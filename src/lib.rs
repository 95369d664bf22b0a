extern crate log;
pub mod config;
pub mod feature;
pub mod provider;
pub mod sensorthings;
pub mod sparql;
pub mod tabular;

pub use feature::feature::{Feature, FeatureCollection};
pub use provider::{Provider, ProviderError, QueryParameters, ResultType};
