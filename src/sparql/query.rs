use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Predicates to resolve for every subject, keyed by the variable alias they bind to.
///
/// Entries keep the order they were configured in. A repeated alias replaces the
/// earlier predicate in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicates(Vec<(String, String)>);

impl Predicates {
    pub fn insert(&mut self, alias: impl Into<String>, predicate: impl Into<String>) {
        let alias = alias.into();
        let predicate = predicate.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == alias) {
            Some(entry) => entry.1 = predicate,
            None => self.0.push((alias, predicate)),
        }
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == alias)
            .map(|(_, predicate)| predicate.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(alias, predicate)| (alias.as_str(), predicate.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Predicates {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut predicates = Predicates::default();
        for (alias, predicate) in iter {
            predicates.insert(alias, predicate);
        }
        predicates
    }
}

impl<const N: usize> From<[(String, String); N]> for Predicates {
    fn from(pairs: [(String, String); N]) -> Self {
        pairs.into_iter().collect()
    }
}

struct PredicatesVisitor;

impl<'de> Visitor<'de> for PredicatesVisitor {
    type Value = Predicates;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of variable aliases to predicates")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Predicates, A::Error> {
        let mut predicates = Predicates::default();
        while let Some((alias, predicate)) = access.next_entry::<String, String>()? {
            predicates.insert(alias, predicate);
        }
        Ok(predicates)
    }
}

impl<'de> Deserialize<'de> for Predicates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PredicatesVisitor)
    }
}

/// Variable the subjects are bound to.
pub const SUBJECT_VARIABLE: &str = "v";

pub const PREFIXES: &str = "
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
PREFIX dc: <http://purl.org/dc/elements/1.1/>
PREFIX : <http://dbpedia.org/resource/>
PREFIX dbpedia2: <http://dbpedia.org/property/>
PREFIX dbpedia: <http://dbpedia.org/>
PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
";

pub const SELECT: &str = "SELECT *";

/// Whether `subject` can be written as an IRI reference between `<` and `>`.
pub fn is_valid_subject(subject: &str) -> bool {
    !subject.is_empty()
        && !subject.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        })
}

/// `<s1> <s2> ...` with repeated subjects listed once.
pub fn subjects_clause<S: AsRef<str>>(subjects: &[S]) -> String {
    let mut unique: Vec<&str> = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let subject = subject.as_ref();
        if !unique.contains(&subject) {
            unique.push(subject);
        }
    }
    unique
        .iter()
        .map(|subject| format!("<{}>", subject))
        .collect::<Vec<String>>()
        .join(" ")
}

/// One `?v <predicate> ?<alias> .` pattern per configured predicate.
pub fn predicate_patterns(predicates: &Predicates) -> String {
    predicates
        .iter()
        .map(|(alias, predicate)| format!("?{} {} ?{} .", SUBJECT_VARIABLE, predicate, alias))
        .collect::<Vec<String>>()
        .join("\n    ")
}

/// Build the batched query resolving `predicates` for all `subjects` at once.
pub fn build_query<S: AsRef<str>>(subjects: &[S], predicates: &Predicates) -> String {
    let query = format!(
        "{}{}\nWHERE {{\n    VALUES ?{} {{ {} }}\n    {}\n}}\n",
        PREFIXES,
        SELECT,
        SUBJECT_VARIABLE,
        subjects_clause(subjects),
        predicate_patterns(predicates)
    );
    log::debug!("SPARQL query: {}", query);
    query
}
