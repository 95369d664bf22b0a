use std::path::Path;

use geojson::JsonObject;
use serde_json::Value;

use crate::provider::ProviderError;

/// Read every record of a CSV file with headers into objects of string values.
pub fn read_rows(filepath: &Path) -> Result<Vec<JsonObject>, ProviderError> {
    let mut reader = csv::Reader::from_path(filepath).map_err(|err| {
        ProviderError::connection_with_source(format!("Could not open {:?}", filepath), err)
    })?;
    let headers = reader
        .headers()
        .map_err(|err| {
            ProviderError::connection_with_source(format!("Could not read headers of {:?}", filepath), err)
        })?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| {
            ProviderError::connection_with_source(format!("Could not read row of {:?}", filepath), err)
        })?;
        let row: JsonObject = headers
            .iter()
            .zip(record.iter())
            .map(|(header, field)| (header.to_string(), Value::String(field.to_string())))
            .collect();
        rows.push(row);
    }
    log::debug!("Read {} rows from {:?}", rows.len(), filepath);
    Ok(rows)
}
