//! OGC SensorThings API entity sets served as GeoJSON features.
pub mod fetch;
pub mod normalize;
pub mod provider;
#[cfg(test)]
pub(crate) mod test_support;

pub use provider::{SensorthingsDefinition, SensorthingsProvider};
