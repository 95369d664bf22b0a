use std::time::Duration;

use serde::Deserialize;

use super::fetch::{fetch_page, EntityRequest, EntitySource, HttpEntitySource};
use super::normalize::{normalize_entity, NormalizeOptions};
use crate::feature::{
    feature::{Feature, FeatureCollection},
    properties::selected_properties,
};
use crate::provider::{Provider, ProviderError, QueryParameters, ResultType};

fn default_id_field() -> String {
    "@iot.id".to_string()
}

/// Provider definition of a SensorThings collection.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SensorthingsDefinition {
    /// Base URL of the SensorThings service, e.g. `https://host/FROST-Server/v1.1`.
    pub data: String,
    /// Entity set to serve, e.g. `Things`.
    pub entity: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default)]
    pub properties: Vec<String>,
    /// Ask the server for `@iot.count` so hits report the global total.
    #[serde(default)]
    pub count: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

pub struct SensorthingsProvider {
    definition: SensorthingsDefinition,
    source: Box<dyn EntitySource>,
}

impl SensorthingsProvider {
    pub fn new(definition: SensorthingsDefinition) -> Result<Self, ProviderError> {
        let source = HttpEntitySource::new(
            definition.data.clone(),
            definition.user_agent.as_deref(),
            definition.timeout_secs.map(Duration::from_secs),
        )?;
        Ok(Self::with_source(definition, Box::new(source)))
    }

    pub fn with_source(definition: SensorthingsDefinition, source: Box<dyn EntitySource>) -> Self {
        log::debug!(
            "SensorThings provider for {} at {}",
            definition.entity,
            definition.data
        );
        Self { definition, source }
    }

    pub fn definition(&self) -> &SensorthingsDefinition {
        &self.definition
    }

    fn normalize_all(
        &self,
        records: Vec<geojson::JsonObject>,
        selection: &[String],
        skip_geometry: bool,
    ) -> Result<Vec<Feature>, ProviderError> {
        let options = NormalizeOptions {
            id_field: &self.definition.id_field,
            selection,
            skip_geometry,
        };
        records
            .into_iter()
            .map(|record| normalize_entity(record, &options))
            .collect()
    }
}

impl Provider for SensorthingsProvider {
    fn name(&self) -> &str {
        "SensorThings"
    }

    fn query(&self, params: &QueryParameters) -> Result<FeatureCollection, ProviderError> {
        params.log_unsupported_filters(self.name());
        let mut request =
            EntityRequest::page(&self.definition.entity, params.startindex, params.limit);
        request.count = self.definition.count;

        let page = fetch_page(self.source.as_ref(), &request)?.ok_or_else(|| {
            ProviderError::connection(format!("No response for {}", self.definition.entity))
        })?;

        if params.resulttype == ResultType::Hits {
            log::debug!("Returning hits only");
            // Without a server-side count this is the size of the requested page.
            let number_matched = page.count.unwrap_or(page.records.len() as u64);
            return Ok(FeatureCollection::hits(number_matched));
        }

        let selection = selected_properties(&self.definition.properties, &params.select_properties);
        let features = self.normalize_all(page.records, &selection, params.skip_geometry)?;
        log::info!(
            "Normalized {} {} entities",
            features.len(),
            self.definition.entity
        );
        Ok(FeatureCollection::from_features(features, page.count))
    }

    fn get(&self, identifier: &str) -> Result<Option<Feature>, ProviderError> {
        let request = EntityRequest::single(&self.definition.entity, identifier);
        let page = match fetch_page(self.source.as_ref(), &request)? {
            Some(page) => page,
            None => return Ok(None),
        };
        let feature = self
            .normalize_all(page.records, &self.definition.properties, false)?
            .into_iter()
            .next();
        match feature {
            Some(feature) if feature.id == identifier => {
                log::debug!("{:?}", feature);
                Ok(Some(feature))
            }
            Some(feature) => {
                log::debug!(
                    "Requested {} but upstream returned {}",
                    identifier,
                    feature.id
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
