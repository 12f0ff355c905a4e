//! A city of the extraction list and its resolved location key.

/// A city taken from the configured list, keyed by its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    /// Display name, unique within a run. Used as the key of every stored row.
    pub name: String,
    /// Opaque identifier assigned by the source. `None` when resolution failed, in
    /// which case nothing is extracted for the city.
    pub location_key: Option<String>,
}

impl City {
    pub fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location_key: None,
        }
    }

    pub fn resolved(name: &str, location_key: &str) -> Self {
        Self {
            name: name.to_string(),
            location_key: Some(location_key.to_string()),
        }
    }
}
