use std::{fs, io, path::Path};

use super::feature::{Feature, FeatureCollection};

pub fn feature_to_geojson(feature: Feature) -> geojson::GeoJson {
    geojson::GeoJson::from(geojson::Feature::from(feature))
}

pub fn collection_to_geojson(collection: FeatureCollection) -> geojson::GeoJson {
    geojson::GeoJson::from(geojson::FeatureCollection::from(collection))
}

pub fn write_geojson(geojson_contents: &geojson::GeoJson, output_filepath: &Path) -> io::Result<()> {
    fs::write(output_filepath, geojson_contents.to_string())
}
