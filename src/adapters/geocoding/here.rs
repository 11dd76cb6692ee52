//! HERE Geocoding & Search adapter. Implements GeocoderPort.
//!
//! One GET per lookup with `q`, `apiKey` and `limit=1`. Anything other than
//! HTTP 200 is an error; an empty `items` array is "no match".

use crate::domain::{DomainError, GeocodedAddress};
use crate::ports::GeocoderPort;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

pub const HERE_GEOCODE_URL: &str = "https://geocode.search.hereapi.com/v1/geocode";

/// HERE geocoder. Without an API key every lookup fails without touching the network.
pub struct HereGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HereGeocoder {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn parse_response(body: &str) -> Result<Option<GeocodedAddress>, DomainError> {
        let parsed: GeocodeResponse = serde_json::from_str(body)
            .map_err(|e| DomainError::Geocoding(format!("malformed response: {}", e)))?;
        Ok(parsed.items.into_iter().next().map(|item| {
            let a = item.address;
            GeocodedAddress {
                house_number: a.house_number,
                street: a.street,
                city: a.city,
                state: a.state,
                postal_code: a.postal_code,
            }
        }))
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    items: Vec<GeocodeItem>,
}

#[derive(Deserialize)]
struct GeocodeItem {
    #[serde(default)]
    address: HereAddress,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct HereAddress {
    house_number: String,
    street: String,
    city: String,
    state: String,
    postal_code: String,
}

#[async_trait::async_trait]
impl GeocoderPort for HereGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, DomainError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DomainError::Geocoding("HERE_API_KEY is not configured".to_string()))?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("apiKey", api_key), ("limit", "1")])
            .send()
            .await
            .map_err(|e| DomainError::Geocoding(format!("request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(status = %status, "HERE API error");
            return Err(DomainError::Geocoding(format!("HERE API error: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Geocoding(format!("failed to read response: {}", e)))?;
        let result = Self::parse_response(&body)?;
        debug!(found = result.is_some(), "geocoding lookup complete");
        Ok(result)
    }
}
