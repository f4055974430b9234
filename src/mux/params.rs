//! Multi-valued capture bindings produced by template patterns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Capture name (marker included, e.g. `:id`) to captured values.
///
/// Values for a repeated name accumulate in match order. Keys iterate in
/// sorted order, which is also the order used by [`Params::encode`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Vec<String>>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// First value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Form-urlencoded query string, `%3Aid=42&%3Aname=x`.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.iter() {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// Query string with the captures ahead of `existing`.
    #[must_use]
    pub fn merge_query(&self, existing: Option<&str>) -> String {
        let encoded = self.encode();
        match existing {
            Some(query) if !query.is_empty() => {
                if encoded.is_empty() {
                    query.to_string()
                } else {
                    format!("{encoded}&{query}")
                }
            }
            _ => encoded,
        }
    }
}
