//! Mailing address shapes: what the caller submits and what the geocoder confirms.

use serde::{Deserialize, Serialize};

/// User-submitted address. Any field may be missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCandidate {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

impl AddressCandidate {
    /// Free-text query: present, non-empty fields joined with ", " in
    /// line1, line2, city, state, zip order. All-empty input yields "".
    pub fn query_string(&self) -> String {
        [
            &self.line1,
            &self.line2,
            &self.city,
            &self.state,
            &self.zip_code,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Address confirmed by the geocoding service. Source of truth once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedAddress {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Top geocoding match, as reported by the provider. Missing components are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodedAddress {
    pub house_number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl GeocodedAddress {
    /// Build the validated shape. line1 is "{house_number} {street}" verbatim (an
    /// empty component leaves a stray space); line2 always comes from the caller.
    pub fn into_validated(self, caller_line2: Option<&str>) -> ValidatedAddress {
        ValidatedAddress {
            line1: format!("{} {}", self.house_number, self.street),
            line2: caller_line2.unwrap_or_default().to_string(),
            city: self.city,
            state: self.state,
            zip_code: self.postal_code,
        }
    }
}
