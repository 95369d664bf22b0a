use geojson::JsonObject;
use serde_json::Value;

use crate::provider::ProviderError;

/// Render a JSON value as a feature identifier or subject string.
///
/// Strings are used verbatim, every other value as its JSON text.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(string) => string.clone(),
        other => other.to_string(),
    }
}

/// Union of the provider-configured and caller-requested property names.
///
/// Configured names come first, duplicates are dropped.
pub fn selected_properties(configured: &[String], requested: &[String]) -> Vec<String> {
    let mut selection: Vec<String> = Vec::with_capacity(configured.len() + requested.len());
    for name in configured.iter().chain(requested) {
        if !selection.contains(name) {
            selection.push(name.clone());
        }
    }
    selection
}

/// Pick exactly the `selection` keys out of `source`, in selection order.
///
/// A selected key that is absent from `source` fails the whole feature.
pub fn project_properties(
    source: &JsonObject,
    selection: &[String],
) -> Result<JsonObject, ProviderError> {
    let mut properties = JsonObject::new();
    for name in selection {
        match source.get(name) {
            Some(value) => {
                properties.insert(name.clone(), value.clone());
            }
            None => {
                log::error!("Selected property '{}' not found", name);
                return Err(ProviderError::Query(format!(
                    "property '{}' does not exist",
                    name
                )));
            }
        }
    }
    Ok(properties)
}
