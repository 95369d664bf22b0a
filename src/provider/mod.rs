pub mod error;

use std::str::FromStr;

use crate::feature::feature::{Feature, FeatureCollection};

pub use error::ProviderError;

/// Whether a query returns features or only counts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultType {
    #[default]
    Results,
    Hits,
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "results" => Ok(ResultType::Results),
            "hits" => Ok(ResultType::Hits),
            other => Err(format!(
                "Unknown result type '{}', expected 'results' or 'hits'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub property: String,
    pub order: SortOrder,
}

/// Per-call query configuration handed to [`Provider::query`].
///
/// `bbox`, `datetime`, `sortby` and `q` are accepted by every provider but not acted on.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub startindex: usize,
    pub limit: usize,
    pub resulttype: ResultType,
    /// `[minx, miny, maxx, maxy]`
    pub bbox: Option<[f64; 4]>,
    pub datetime: Option<String>,
    /// Equality filters as `(name, value)` pairs.
    pub properties: Vec<(String, String)>,
    pub sortby: Vec<SortKey>,
    pub select_properties: Vec<String>,
    pub skip_geometry: bool,
    /// Free-text search term(s).
    pub q: Option<String>,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            startindex: 0,
            limit: 10,
            resulttype: ResultType::Results,
            bbox: None,
            datetime: None,
            properties: Vec::new(),
            sortby: Vec::new(),
            select_properties: Vec::new(),
            skip_geometry: false,
            q: None,
        }
    }
}

impl QueryParameters {
    pub fn with_window(mut self, startindex: usize, limit: usize) -> Self {
        self.startindex = startindex;
        self.limit = limit;
        self
    }

    pub fn with_resulttype(mut self, resulttype: ResultType) -> Self {
        self.resulttype = resulttype;
        self
    }

    pub fn with_select_properties(mut self, select_properties: Vec<String>) -> Self {
        self.select_properties = select_properties;
        self
    }

    pub fn with_skip_geometry(mut self, skip_geometry: bool) -> Self {
        self.skip_geometry = skip_geometry;
        self
    }

    pub fn with_properties(mut self, properties: Vec<(String, String)>) -> Self {
        self.properties = properties;
        self
    }

    /// Log the filters a provider accepts without applying them.
    pub(crate) fn log_unsupported_filters(&self, provider: &str) {
        if let Some(bbox) = &self.bbox {
            log::debug!("{} ignores bbox filter {:?}", provider, bbox);
        }
        if let Some(datetime) = &self.datetime {
            log::debug!("{} ignores datetime filter {}", provider, datetime);
        }
        if !self.sortby.is_empty() {
            log::debug!("{} ignores sortby {:?}", provider, self.sortby);
        }
        if let Some(q) = &self.q {
            log::debug!("{} ignores free-text search '{}'", provider, q);
        }
    }
}

/// Feature source a host collection is served from.
pub trait Provider {
    /// Short provider name used in log messages.
    fn name(&self) -> &str;

    /// Return one page of features, or only their count for [`ResultType::Hits`].
    fn query(&self, params: &QueryParameters) -> Result<FeatureCollection, ProviderError>;

    /// Look up a single feature. `Ok(None)` means the feature does not exist.
    fn get(&self, identifier: &str) -> Result<Option<Feature>, ProviderError>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, params: &QueryParameters) -> Result<FeatureCollection, ProviderError> {
        (**self).query(params)
    }

    fn get(&self, identifier: &str) -> Result<Option<Feature>, ProviderError> {
        (**self).get(identifier)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{QueryParameters, ResultType};

    #[rstest]
    #[case("results", Some(ResultType::Results))]
    #[case("hits", Some(ResultType::Hits))]
    #[case("Hits", None)]
    #[case("", None)]
    fn test_parse_resulttype(#[case] input: &str, #[case] expected: Option<ResultType>) {
        assert_eq!(input.parse::<ResultType>().ok(), expected);
    }

    #[rstest]
    fn test_default_query_parameters() {
        let params = QueryParameters::default();
        assert_eq!(params.startindex, 0);
        assert_eq!(params.limit, 10);
        assert_eq!(params.resulttype, ResultType::Results);
        assert!(!params.skip_geometry);
        assert!(params.select_properties.is_empty());
    }
}
