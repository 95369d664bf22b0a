pub mod provider;
pub mod rows;

pub use provider::{CsvDefinition, CsvProvider, PointFields};
