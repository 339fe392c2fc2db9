use std::collections::BTreeMap;

use reqwest::Request;

use crate::error::ValidationError;

/// Label mapping attached to every measurement of a request.
pub type Tags = BTreeMap<String, String>;

/// Names of the tags to extract, shared read-only by all workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSpec {
    names: Vec<String>,
}

impl TagSpec {
    /// Builds a spec from tag names. Entries may be comma separated;
    /// duplicates are dropped and order is kept.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTagName` for blank names.
    pub fn new<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<String> = Vec::new();
        for raw in names {
            for name in raw.as_ref().split(',').map(str::trim) {
                if name.is_empty() {
                    return Err(ValidationError::EmptyTagName);
                }
                if !parsed.iter().any(|existing| existing == name) {
                    parsed.push(name.to_owned());
                }
            }
        }
        Ok(Self { names: parsed })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Derives tag values from a built request.
///
/// Each name is looked up in the request headers first; a same-named query
/// parameter overrides the header value. Names with no non-empty value are
/// left out.
#[must_use]
pub fn extract_tags(request: &Request, spec: &TagSpec) -> Tags {
    let mut tags = Tags::new();
    for name in spec.names() {
        if let Some(value) = header_value(request, name) {
            tags.insert(name.clone(), value);
        }
        if let Some(value) = query_value(request, name) {
            tags.insert(name.clone(), value);
        }
    }
    tags
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn query_value(request: &Request, name: &str) -> Option<String> {
    request
        .url()
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
