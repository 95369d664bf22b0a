use std::time::Duration;

use serde::Deserialize;

use super::client::{HttpSparqlEndpoint, SparqlEndpoint};
use super::enrich::Enricher;
use super::query::Predicates;
use crate::feature::feature::{Feature, FeatureCollection};
use crate::provider::{Provider, ProviderError, QueryParameters};
use crate::tabular::{CsvDefinition, CsvProvider};

/// Provider definition of a CSV collection enriched from a SPARQL endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SparqlDefinition {
    #[serde(flatten)]
    pub csv: CsvDefinition,
    pub sparql_endpoint: String,
    /// Property holding each feature's subject URI.
    pub sparql_subject: String,
    /// Variable alias to predicate, e.g. `population: dbo:populationTotal`.
    pub sparql_predicates: Predicates,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Wraps another provider and adds SPARQL facts to each feature it returns.
pub struct SparqlProvider<P: Provider, E: SparqlEndpoint> {
    inner: P,
    enricher: Enricher<E>,
}

impl SparqlProvider<CsvProvider, HttpSparqlEndpoint> {
    pub fn from_definition(definition: SparqlDefinition) -> Result<Self, ProviderError> {
        let endpoint = HttpSparqlEndpoint::new(
            definition.sparql_endpoint.clone(),
            definition.timeout_secs.map(Duration::from_secs),
        )?;
        Ok(Self::with_endpoint(definition, endpoint))
    }
}

impl<E: SparqlEndpoint> SparqlProvider<CsvProvider, E> {
    /// CSV features from `definition`, enriched through `endpoint`.
    ///
    /// A configured property list always carries the subject property, otherwise
    /// the projection would drop it before the facts are resolved.
    pub fn with_endpoint(definition: SparqlDefinition, endpoint: E) -> Self {
        let mut csv = definition.csv;
        if !csv.properties.is_empty() && !csv.properties.contains(&definition.sparql_subject) {
            csv.properties.push(definition.sparql_subject.clone());
        }
        Self::new(
            CsvProvider::new(csv),
            Enricher::new(
                endpoint,
                definition.sparql_subject,
                definition.sparql_predicates,
            ),
        )
    }
}

impl<P: Provider, E: SparqlEndpoint> SparqlProvider<P, E> {
    pub fn new(inner: P, enricher: Enricher<E>) -> Self {
        Self { inner, enricher }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Provider, E: SparqlEndpoint> Provider for SparqlProvider<P, E> {
    fn name(&self) -> &str {
        "SPARQL"
    }

    fn query(&self, params: &QueryParameters) -> Result<FeatureCollection, ProviderError> {
        let subject = self.enricher.subject().to_string();
        let mut collection = if params.select_properties.is_empty()
            || params.select_properties.contains(&subject)
        {
            self.inner.query(params)?
        } else {
            // The subject has to survive the selection for the facts to be resolved.
            let mut select_properties = params.select_properties.clone();
            select_properties.push(subject);
            self.inner
                .query(&params.clone().with_select_properties(select_properties))?
        };
        self.enricher.enrich(collection.features_mut())?;
        Ok(collection)
    }

    fn get(&self, identifier: &str) -> Result<Option<Feature>, ProviderError> {
        let mut feature = match self.inner.get(identifier)? {
            Some(feature) => feature,
            None => return Ok(None),
        };
        self.enricher.enrich(std::slice::from_mut(&mut feature))?;
        Ok(Some(feature))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;
    use serde_json::{json, Value};
    use testdir::testdir;

    use super::{SparqlDefinition, SparqlProvider};
    use crate::provider::{Provider, QueryParameters, ResultType};
    use crate::sparql::{enrich::Enricher, query::Predicates, test_support::StubEndpoint};
    use crate::tabular::{CsvDefinition, CsvProvider, PointFields};

    const PLACES: &str = "id,name,uri,lon,lat\n\
        1,Berlin,http://dbpedia.org/resource/Berlin,13.4,52.5\n\
        2,Bonn,http://dbpedia.org/resource/Bonn,7.1,50.7\n\
        3,Berlin again,http://dbpedia.org/resource/Berlin,13.4,52.5\n";

    fn bindings() -> Value {
        json!({"head": {"vars": ["v", "population"]}, "results": {"bindings": [
            {
                "v": {"type": "uri", "value": "http://dbpedia.org/resource/Berlin"},
                "population": {"type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#nonNegativeInteger", "value": "3677472"}
            }
        ]}})
    }

    fn csv_provider(dir: &Path) -> CsvProvider {
        let data = dir.join("places.csv");
        std::fs::write(&data, PLACES).unwrap();
        CsvProvider::new(CsvDefinition {
            data,
            id_field: "id".to_string(),
            geometry: PointFields {
                x_field: "lon".to_string(),
                y_field: "lat".to_string(),
            },
            properties: Vec::new(),
        })
    }

    fn provider(dir: &Path, endpoint: StubEndpoint) -> SparqlProvider<CsvProvider, StubEndpoint> {
        let predicates = Predicates::from([(
            "population".to_string(),
            "dbo:populationTotal".to_string(),
        )]);
        SparqlProvider::new(
            csv_provider(dir),
            Enricher::new(endpoint, "uri", predicates),
        )
    }

    #[rstest]
    fn test_query_enriches_page_with_one_query() {
        let endpoint = StubEndpoint::new(bindings());
        let provider = provider(&testdir!(), endpoint.clone());
        let collection = provider.query(&QueryParameters::default()).unwrap();

        assert_eq!(endpoint.queries().len(), 1);
        assert!(endpoint.queries()[0].contains(
            "VALUES ?v { <http://dbpedia.org/resource/Berlin> <http://dbpedia.org/resource/Bonn> }"
        ));
        assert!(endpoint.queries()[0].contains("?v dbo:populationTotal ?population ."));

        let features = collection.features();
        assert_eq!(collection.number_returned(), Some(3));
        assert_eq!(features[0].properties["population"], "3677472");
        assert_eq!(features[2].properties["population"], "3677472");
        assert!(!features[1].properties.contains_key("population"));
        assert_eq!(features[1].properties["name"], "Bonn");
    }

    #[rstest]
    fn test_query_two_features_one_batched_call() {
        let endpoint = StubEndpoint::new(bindings());
        let provider = provider(&testdir!(), endpoint.clone());
        provider
            .query(&QueryParameters::default().with_window(0, 2))
            .unwrap();
        assert_eq!(endpoint.queries().len(), 1);
    }

    #[rstest]
    fn test_hits_skip_enrichment() {
        let endpoint = StubEndpoint::new(bindings());
        let provider = provider(&testdir!(), endpoint.clone());
        let collection = provider
            .query(&QueryParameters::default().with_resulttype(ResultType::Hits))
            .unwrap();
        assert_eq!(collection.number_matched(), Some(3));
        assert!(endpoint.queries().is_empty());
    }

    #[rstest]
    fn test_selection_keeps_subject_for_enrichment() {
        let endpoint = StubEndpoint::new(bindings());
        let provider = provider(&testdir!(), endpoint.clone());
        let collection = provider
            .query(
                &QueryParameters::default()
                    .with_window(0, 1)
                    .with_select_properties(vec!["name".to_string()]),
            )
            .unwrap();
        assert_eq!(
            Value::Object(collection.features()[0].properties.clone()),
            json!({"name": "Berlin", "uri": "http://dbpedia.org/resource/Berlin", "population": "3677472"})
        );
    }

    fn definition(dir: &Path, properties: Vec<&str>) -> SparqlDefinition {
        let data = dir.join("places.csv");
        std::fs::write(&data, PLACES).unwrap();
        SparqlDefinition {
            csv: CsvDefinition {
                data,
                id_field: "id".to_string(),
                geometry: PointFields {
                    x_field: "lon".to_string(),
                    y_field: "lat".to_string(),
                },
                properties: properties.into_iter().map(String::from).collect(),
            },
            sparql_endpoint: "http://localhost/sparql".to_string(),
            sparql_subject: "uri".to_string(),
            sparql_predicates: Predicates::from([(
                "population".to_string(),
                "dbo:populationTotal".to_string(),
            )]),
            timeout_secs: None,
        }
    }

    #[rstest]
    fn test_configured_properties_keep_subject() {
        let endpoint = StubEndpoint::new(bindings());
        let provider =
            SparqlProvider::with_endpoint(definition(&testdir!(), vec!["name"]), endpoint.clone());
        assert_eq!(
            provider.inner().definition().properties,
            vec!["name".to_string(), "uri".to_string()]
        );

        let collection = provider
            .query(&QueryParameters::default().with_window(0, 1))
            .unwrap();
        assert_eq!(
            Value::Object(collection.features()[0].properties.clone()),
            json!({"name": "Berlin", "uri": "http://dbpedia.org/resource/Berlin", "population": "3677472"})
        );

        let feature = provider.get("1").unwrap().unwrap();
        assert_eq!(feature.properties["population"], "3677472");
        assert_eq!(endpoint.queries().len(), 2);
    }

    #[rstest]
    fn test_unconfigured_properties_stay_empty() {
        let provider = SparqlProvider::with_endpoint(
            definition(&testdir!(), Vec::new()),
            StubEndpoint::new(bindings()),
        );
        assert!(provider.inner().definition().properties.is_empty());
        let feature = provider.get("2").unwrap().unwrap();
        assert_eq!(feature.properties["name"], "Bonn");
    }

    #[rstest]
    fn test_get_enriches_single_feature() {
        let endpoint = StubEndpoint::new(bindings());
        let provider = provider(&testdir!(), endpoint.clone());
        let feature = provider.get("1").unwrap().unwrap();
        assert_eq!(feature.id, "1");
        assert_eq!(feature.properties["population"], "3677472");
        let queries = endpoint.queries();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("VALUES ?v { <http://dbpedia.org/resource/Berlin> }"));
    }

    #[rstest]
    fn test_get_unknown_identifier_skips_enrichment() {
        let endpoint = StubEndpoint::new(bindings());
        let provider = provider(&testdir!(), endpoint.clone());
        assert_eq!(provider.get("42").unwrap(), None);
        assert!(endpoint.queries().is_empty());
    }

    #[rstest]
    fn test_malformed_fact_set_is_no_data() {
        let endpoint = StubEndpoint::new(json!({"results": {"bindings": [
            {"v": {"value": "http://dbpedia.org/resource/Bonn"}, "population": 318809}
        ]}}));
        let provider = provider(&testdir!(), endpoint);
        assert!(provider
            .query(&QueryParameters::default())
            .unwrap_err()
            .is_no_data());
    }

    #[rstest]
    fn test_failed_sparql_query_is_query_error() {
        let provider = provider(&testdir!(), StubEndpoint::failing());
        assert!(provider
            .query(&QueryParameters::default())
            .unwrap_err()
            .is_query());
    }
}
