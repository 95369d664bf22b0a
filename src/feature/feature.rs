use geojson::JsonObject;

/// Canonical feature every provider normalizes its records into.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: Option<geojson::Geometry>,
    pub properties: JsonObject,
}

impl Feature {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            geometry: None,
            properties: JsonObject::new(),
        }
    }
}

impl From<Feature> for geojson::Feature {
    fn from(feature: Feature) -> Self {
        geojson::Feature {
            bbox: None,
            geometry: feature.geometry,
            id: Some(geojson::feature::Id::String(feature.id)),
            properties: Some(feature.properties),
            foreign_members: None,
        }
    }
}

/// A page of features together with its counts.
///
/// `number_returned` always equals the number of features when set. It is unset for
/// collections built with [`FeatureCollection::hits`], which carry no features.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    features: Vec<Feature>,
    number_returned: Option<usize>,
    number_matched: Option<u64>,
}

impl FeatureCollection {
    pub fn from_features(features: Vec<Feature>, number_matched: Option<u64>) -> Self {
        Self {
            number_returned: Some(features.len()),
            features,
            number_matched,
        }
    }

    /// A collection that only reports how many features matched.
    pub fn hits(number_matched: u64) -> Self {
        Self {
            features: Vec::new(),
            number_returned: None,
            number_matched: Some(number_matched),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Features can be edited in place but not added or removed.
    pub fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features
    }

    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    pub fn number_returned(&self) -> Option<usize> {
        self.number_returned
    }

    pub fn number_matched(&self) -> Option<u64> {
        self.number_matched
    }
}

impl From<FeatureCollection> for geojson::FeatureCollection {
    fn from(collection: FeatureCollection) -> Self {
        let mut foreign_members = JsonObject::new();
        if let Some(number_matched) = collection.number_matched {
            foreign_members.insert("numberMatched".to_string(), number_matched.into());
        }
        if let Some(number_returned) = collection.number_returned {
            foreign_members.insert("numberReturned".to_string(), number_returned.into());
        }
        geojson::FeatureCollection {
            bbox: None,
            features: collection
                .features
                .into_iter()
                .map(geojson::Feature::from)
                .collect(),
            foreign_members: Some(foreign_members),
        }
    }
}
