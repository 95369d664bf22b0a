use std::path::PathBuf;

use geojson::JsonObject;
use serde::Deserialize;
use serde_json::Value;

use super::rows::read_rows;
use crate::feature::{
    feature::{Feature, FeatureCollection},
    properties::{project_properties, selected_properties, stringify_value},
};
use crate::provider::{Provider, ProviderError, QueryParameters, ResultType};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PointFields {
    pub x_field: String,
    pub y_field: String,
}

/// Provider definition of a CSV collection.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CsvDefinition {
    pub data: PathBuf,
    pub id_field: String,
    pub geometry: PointFields,
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Features read from a CSV file with one point per row.
pub struct CsvProvider {
    definition: CsvDefinition,
}

impl CsvProvider {
    pub fn new(definition: CsvDefinition) -> Self {
        log::debug!("CSV provider for {:?}", definition.data);
        Self { definition }
    }

    pub fn definition(&self) -> &CsvDefinition {
        &self.definition
    }

    fn normalize_row(
        &self,
        mut row: JsonObject,
        selection: &[String],
        skip_geometry: bool,
    ) -> Result<Feature, ProviderError> {
        let id = row
            .shift_remove(&self.definition.id_field)
            .map(|id| stringify_value(&id))
            .ok_or_else(|| {
                ProviderError::Query(format!("row has no '{}' column", self.definition.id_field))
            })?;
        let x = row.shift_remove(&self.definition.geometry.x_field);
        let y = row.shift_remove(&self.definition.geometry.y_field);
        let geometry = if skip_geometry {
            None
        } else {
            Some(point_geometry(&id, x, y)?)
        };
        let properties = if selection.is_empty() {
            row
        } else {
            project_properties(&row, selection)?
        };
        Ok(Feature {
            id,
            geometry,
            properties,
        })
    }
}

fn point_geometry(
    id: &str,
    x: Option<Value>,
    y: Option<Value>,
) -> Result<geojson::Geometry, ProviderError> {
    let coordinate = |value: Option<Value>| -> Result<f64, ProviderError> {
        value
            .as_ref()
            .map(stringify_value)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .ok_or_else(|| ProviderError::Query(format!("row {} has no valid coordinates", id)))
    };
    let x = coordinate(x)?;
    let y = coordinate(y)?;
    Ok(geojson::Geometry::new(geojson::Value::Point(vec![x, y])))
}

fn matches_filters(row: &JsonObject, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(name, expected)| {
        row.get(name)
            .map(|value| stringify_value(value) == *expected)
            .unwrap_or(false)
    })
}

impl Provider for CsvProvider {
    fn name(&self) -> &str {
        "CSV"
    }

    fn query(&self, params: &QueryParameters) -> Result<FeatureCollection, ProviderError> {
        params.log_unsupported_filters(self.name());
        let rows: Vec<JsonObject> = read_rows(&self.definition.data)?
            .into_iter()
            .filter(|row| matches_filters(row, &params.properties))
            .collect();
        let number_matched = rows.len() as u64;

        if params.resulttype == ResultType::Hits {
            log::debug!("Returning hits only");
            return Ok(FeatureCollection::hits(number_matched));
        }

        let selection = selected_properties(&self.definition.properties, &params.select_properties);
        let features = rows
            .into_iter()
            .skip(params.startindex)
            .take(params.limit)
            .map(|row| self.normalize_row(row, &selection, params.skip_geometry))
            .collect::<Result<Vec<Feature>, ProviderError>>()?;
        log::info!("Normalized {} of {} rows", features.len(), number_matched);
        Ok(FeatureCollection::from_features(features, Some(number_matched)))
    }

    fn get(&self, identifier: &str) -> Result<Option<Feature>, ProviderError> {
        let row = read_rows(&self.definition.data)?.into_iter().find(|row| {
            row.get(&self.definition.id_field)
                .map(|id| stringify_value(id) == identifier)
                .unwrap_or(false)
        });
        match row {
            Some(row) => self
                .normalize_row(row, &self.definition.properties, false)
                .map(Some),
            None => {
                log::debug!("No row with {} {}", self.definition.id_field, identifier);
                Ok(None)
            }
        }
    }
}
