use std::collections::HashMap;

use geojson::JsonObject;
use serde_json::Value;

use super::client::SparqlEndpoint;
use super::query::{build_query, is_valid_subject, Predicates, SUBJECT_VARIABLE};
use crate::feature::{feature::Feature, properties::stringify_value};
use crate::provider::ProviderError;

/// Bound variables of one subject, each still in SPARQL JSON binding form.
pub type FactSet = JsonObject;

/// Fact sets keyed by subject URI.
pub type EnrichmentMap = HashMap<String, FactSet>;

/// Group the `results.bindings` rows of a SELECT response by subject.
///
/// Rows for the same subject are merged, later rows overwriting earlier bindings.
pub fn parse_bindings(results: &Value) -> Result<EnrichmentMap, ProviderError> {
    let bindings = results
        .get("results")
        .and_then(|results| results.get("bindings"))
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Query("SPARQL response has no results.bindings".to_string()))?;

    let mut enrichment = EnrichmentMap::new();
    for row in bindings {
        let mut row = match row {
            Value::Object(row) => row.clone(),
            other => {
                return Err(ProviderError::NoData(format!(
                    "binding row is not an object: {}",
                    other
                )))
            }
        };
        let subject = row
            .shift_remove(SUBJECT_VARIABLE)
            .as_ref()
            .and_then(|binding| binding.get("value"))
            .map(stringify_value)
            .ok_or_else(|| {
                ProviderError::NoData(format!("binding row has no ?{} value", SUBJECT_VARIABLE))
            })?;
        enrichment.entry(subject).or_default().extend(row);
    }
    Ok(enrichment)
}

/// Copy the value of every binding in `facts` into `properties`.
///
/// A subject without facts leaves `properties` untouched.
pub fn merge_facts(properties: &mut JsonObject, facts: Option<&FactSet>) -> Result<(), ProviderError> {
    let facts = match facts {
        Some(facts) => facts,
        None => return Ok(()),
    };
    for (variable, binding) in facts {
        match binding {
            Value::Object(binding) => {
                let value = binding.get("value").cloned().unwrap_or(Value::Null);
                properties.insert(variable.clone(), value);
            }
            other => {
                log::error!("Error SPARQL data: {} is {}", variable, other);
                return Err(ProviderError::NoData(format!(
                    "binding for ?{} is not an object",
                    variable
                )));
            }
        }
    }
    Ok(())
}

/// Resolves configured predicates for a batch of features with a single query.
pub struct Enricher<E: SparqlEndpoint> {
    endpoint: E,
    /// Property holding each feature's subject URI.
    subject: String,
    predicates: Predicates,
}

impl<E: SparqlEndpoint> Enricher<E> {
    pub fn new(endpoint: E, subject: impl Into<String>, predicates: Predicates) -> Self {
        Self {
            endpoint,
            subject: subject.into(),
            predicates,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    fn subject_of(&self, feature: &Feature) -> Result<String, ProviderError> {
        let subject = feature
            .properties
            .get(&self.subject)
            .map(stringify_value)
            .ok_or_else(|| {
                ProviderError::Query(format!(
                    "feature {} has no subject property '{}'",
                    feature.id, self.subject
                ))
            })?;
        if !is_valid_subject(&subject) {
            log::error!("Feature {} has an invalid subject: {:?}", feature.id, subject);
            return Err(ProviderError::Query(format!(
                "feature {} has an invalid subject URI {:?}",
                feature.id, subject
            )));
        }
        Ok(subject)
    }

    /// Resolve facts for every feature and merge them into its properties.
    pub fn enrich(&self, features: &mut [Feature]) -> Result<(), ProviderError> {
        if features.is_empty() {
            return Ok(());
        }
        let subjects = features
            .iter()
            .map(|feature| self.subject_of(feature))
            .collect::<Result<Vec<String>, ProviderError>>()?;

        log::debug!("Requesting SPARQL data for {} features", features.len());
        let query = build_query(&subjects, &self.predicates);
        let enrichment = parse_bindings(&self.endpoint.select(&query)?)?;

        for (feature, subject) in features.iter_mut().zip(&subjects) {
            merge_facts(&mut feature.properties, enrichment.get(subject))?;
        }
        Ok(())
    }
}
