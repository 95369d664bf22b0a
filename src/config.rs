use std::{collections::BTreeMap, fs::read_to_string, path::Path};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::provider::Provider;
use crate::sensorthings::{SensorthingsDefinition, SensorthingsProvider};
use crate::sparql::{SparqlDefinition, SparqlProvider};
use crate::tabular::{CsvDefinition, CsvProvider};

/// Provider definition of one collection, selected by its `name`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "name")]
pub enum ProviderDefinition {
    SensorThings(SensorthingsDefinition),
    #[serde(rename = "CSV")]
    Csv(CsvDefinition),
    #[serde(rename = "SPARQL")]
    Sparql(SparqlDefinition),
}

impl ProviderDefinition {
    pub fn build(&self) -> anyhow::Result<Box<dyn Provider>> {
        let provider: Box<dyn Provider> = match self {
            ProviderDefinition::SensorThings(definition) => {
                Box::new(SensorthingsProvider::new(definition.clone())?)
            }
            ProviderDefinition::Csv(definition) => Box::new(CsvProvider::new(definition.clone())),
            ProviderDefinition::Sparql(definition) => {
                Box::new(SparqlProvider::from_definition(definition.clone())?)
            }
        };
        Ok(provider)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub collections: BTreeMap<String, ProviderDefinition>,
}

impl Config {
    pub fn from_file(filepath: &Path) -> anyhow::Result<Self> {
        if !filepath.exists() {
            return Err(anyhow!("Config file {:?} not found", filepath));
        }
        let config_contents = read_to_string(filepath)?;
        serde_yaml::from_str(&config_contents)
            .with_context(|| format!("Parsing config file {:?}", filepath))
    }

    pub fn provider(&self, collection: &str) -> anyhow::Result<Box<dyn Provider>> {
        let definition = self.collections.get(collection).ok_or_else(|| {
            anyhow!(
                "Collection '{}' not configured, known collections: {:?}",
                collection,
                self.collections.keys().collect::<Vec<_>>()
            )
        })?;
        log::debug!("Building provider for collection {}", collection);
        definition.build()
    }
}
