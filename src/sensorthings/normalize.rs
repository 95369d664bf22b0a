use geojson::JsonObject;
use serde_json::Value;

use crate::feature::{
    feature::Feature,
    properties::{project_properties, stringify_value},
};
use crate::provider::ProviderError;

const LOCATIONS_KEY: &str = "Locations";
const LOCATION_KEY: &str = "location";
const NESTED_PROPERTIES_KEY: &str = "properties";

pub struct NormalizeOptions<'a> {
    pub id_field: &'a str,
    /// Union of configured and requested properties. Empty means all properties.
    pub selection: &'a [String],
    pub skip_geometry: bool,
}

/// Turn one SensorThings entity into a [`Feature`].
///
/// The record is consumed: the id field, the expanded `Locations` and the nested
/// `properties` object are taken out of it so that none of them appear twice.
pub fn normalize_entity(
    mut record: JsonObject,
    options: &NormalizeOptions,
) -> Result<Feature, ProviderError> {
    let id = record
        .shift_remove(options.id_field)
        .map(|id| stringify_value(&id))
        .ok_or_else(|| {
            ProviderError::Query(format!("entity has no '{}' field", options.id_field))
        })?;

    let locations = record.shift_remove(LOCATIONS_KEY);
    let geometry = if options.skip_geometry {
        None
    } else {
        locations.map(first_location_geometry).transpose()?.flatten()
    };

    let properties = flatten_properties(record);
    let properties = if options.selection.is_empty() {
        properties
    } else {
        project_properties(&properties, options.selection)?
    };

    Ok(Feature {
        id,
        geometry,
        properties,
    })
}

/// Geometry of the first expanded location, if there is one.
fn first_location_geometry(locations: Value) -> Result<Option<geojson::Geometry>, ProviderError> {
    let location = match locations {
        Value::Array(locations) => locations.into_iter().next(),
        _ => None,
    };
    let payload = match location {
        Some(Value::Object(mut location)) => location.remove(LOCATION_KEY),
        _ => None,
    };
    match payload {
        Some(Value::Null) | None => Ok(None),
        Some(payload) => geojson::Geometry::from_json_value(payload)
            .map(Some)
            .map_err(|err| ProviderError::connection_with_source("Invalid location geometry", err)),
    }
}

/// Remaining top-level fields merged with the nested `properties` object, nested keys winning.
fn flatten_properties(mut record: JsonObject) -> JsonObject {
    if let Some(Value::Object(_)) = record.get(NESTED_PROPERTIES_KEY) {
        if let Some(Value::Object(nested)) = record.shift_remove(NESTED_PROPERTIES_KEY) {
            record.extend(nested);
        }
    }
    record
}
