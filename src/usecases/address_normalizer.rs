//! Address validation against the geocoding port.
//!
//! Any fault (transport, non-200, malformed body, no match) collapses into
//! "invalid". Callers cannot tell an outage from a bad address.

use crate::domain::{AddressCandidate, ValidatedAddress};
use crate::ports::GeocoderPort;
use std::sync::Arc;
use tracing::{error, info};

pub struct AddressNormalizer {
    geocoder: Arc<dyn GeocoderPort>,
}

impl AddressNormalizer {
    pub fn new(geocoder: Arc<dyn GeocoderPort>) -> Self {
        Self { geocoder }
    }

    /// Single lookup; `None` means "needs correction".
    pub async fn normalize(&self, candidate: &AddressCandidate) -> Option<ValidatedAddress> {
        let query = candidate.query_string();
        match self.geocoder.geocode(&query).await {
            Ok(Some(top)) => {
                info!("address matched by geocoder");
                Some(top.into_validated(candidate.line2.as_deref()))
            }
            Ok(None) => {
                info!("geocoder returned no match");
                None
            }
            Err(e) => {
                error!(error = %e, "Address validation error");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, GeocodedAddress};
    use std::sync::Mutex;

    struct RecordingGeocoder {
        answer: fn() -> Result<Option<GeocodedAddress>, DomainError>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl GeocoderPort for RecordingGeocoder {
        async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, DomainError> {
            self.queries.lock().unwrap().push(query.to_string());
            (self.answer)()
        }
    }

    fn normalizer(
        answer: fn() -> Result<Option<GeocodedAddress>, DomainError>,
    ) -> (AddressNormalizer, Arc<RecordingGeocoder>) {
        let geocoder = Arc::new(RecordingGeocoder {
            answer,
            queries: Mutex::new(Vec::new()),
        });
        (AddressNormalizer::new(geocoder.clone()), geocoder)
    }

    fn candidate() -> AddressCandidate {
        AddressCandidate {
            line1: Some("12 elm street".to_string()),
            line2: Some("Apt 4".to_string()),
            city: Some("portland".to_string()),
            state: Some("OR".to_string()),
            zip_code: None,
        }
    }

    #[tokio::test]
    async fn test_match_builds_validated_address() {
        let (n, geocoder) = normalizer(|| {
            Ok(Some(GeocodedAddress {
                house_number: "12".to_string(),
                street: "Elm St".to_string(),
                city: "Portland".to_string(),
                state: "Oregon".to_string(),
                postal_code: "97201".to_string(),
            }))
        });

        let validated = n.normalize(&candidate()).await.unwrap();
        assert_eq!(validated.line1, "12 Elm St");
        assert_eq!(validated.line2, "Apt 4");
        assert_eq!(validated.zip_code, "97201");
        assert_eq!(
            geocoder.queries.lock().unwrap().as_slice(),
            ["12 elm street, Apt 4, portland, OR"]
        );
    }

    #[tokio::test]
    async fn test_no_match_and_fault_are_both_invalid() {
        let (n, _) = normalizer(|| Ok(None));
        assert!(n.normalize(&candidate()).await.is_none());

        let (n, geocoder) =
            normalizer(|| Err(DomainError::Geocoding("connection refused".to_string())));
        assert!(n.normalize(&candidate()).await.is_none());
        assert_eq!(geocoder.queries.lock().unwrap().len(), 1);
    }
}
