//! Forward geocoding of to-do locations.
//!
//! # Responsibility
//! - Resolve a free-text address to coordinates through a mapping HTTP API.
//! - Keep response parsing pure so it can be tested without network.
//!
//! # Invariants
//! - Requests are never retried; failures are returned to the caller.
//! - The access token is never logged.

use crate::config::GeocodingConfig;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// WGS84 point with an optional human-readable place name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: Option<String>,
}

#[derive(Debug)]
pub enum GeocodeError {
    EmptyAddress,
    /// No access token configured.
    MissingToken,
    Http(reqwest::Error),
    Status(u16),
    InvalidResponse(String),
}

impl Display for GeocodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAddress => write!(f, "address cannot be empty"),
            Self::MissingToken => write!(f, "geocoding access token is not configured"),
            Self::Http(err) => write!(f, "geocoding request failed: {err}"),
            Self::Status(code) => write!(f, "geocoding service returned status {code}"),
            Self::InvalidResponse(message) => {
                write!(f, "invalid geocoding response: {message}")
            }
        }
    }
}

impl Error for GeocodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// Address to coordinates lookup.
pub trait Geocoder {
    /// Returns the best match, or `None` when the service knows no match.
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Geocoder backed by the Mapbox forward-geocoding API.
pub struct MapboxGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
    access_token: String,
}

impl MapboxGeocoder {
    /// Builds a geocoder from configuration.
    ///
    /// # Errors
    /// - `MissingToken` when no non-blank token is configured.
    /// - `Http` when the HTTP client cannot be built.
    pub fn try_new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let access_token = config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(GeocodeError::MissingToken)?
            .to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn request_url(&self, address: &str) -> String {
        format!(
            "{}/{}.json?limit=1&access_token={}",
            self.endpoint,
            urlencoding::encode(address),
            urlencoding::encode(&self.access_token)
        )
    }
}

impl Geocoder for MapboxGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }

        let response = self.client.get(self.request_url(address)).send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=geocode module=geocode status=error http_status={}",
                status.as_u16()
            );
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let result = parse_geocode_response(&body)?;
        info!(
            "event=geocode module=geocode status=ok matched={}",
            result.is_some()
        );
        Ok(result)
    }
}

/// Extracts the first feature of a GeoJSON feature collection.
///
/// Feature centers are `[longitude, latitude]`.
pub fn parse_geocode_response(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let document: Value = serde_json::from_str(body)
        .map_err(|err| GeocodeError::InvalidResponse(err.to_string()))?;
    let features = document
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| GeocodeError::InvalidResponse("missing `features` array".to_string()))?;

    let Some(feature) = features.first() else {
        return Ok(None);
    };
    let center = feature
        .get("center")
        .and_then(Value::as_array)
        .filter(|center| center.len() == 2)
        .ok_or_else(|| GeocodeError::InvalidResponse("missing `center` pair".to_string()))?;
    let (Some(longitude), Some(latitude)) = (center[0].as_f64(), center[1].as_f64()) else {
        return Err(GeocodeError::InvalidResponse(
            "non-numeric `center`".to_string(),
        ));
    };
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(GeocodeError::InvalidResponse(
            "coordinates out of range".to_string(),
        ));
    }

    Ok(Some(Coordinates {
        latitude,
        longitude,
        place_name: feature
            .get("place_name")
            .and_then(Value::as_str)
            .map(str::to_string),
    }))
}

#[cfg(test)]
mod tests {
    use super::{parse_geocode_response, GeocodeError, MapboxGeocoder};
    use crate::config::GeocodingConfig;

    #[test]
    fn parses_first_feature_center_as_lon_lat() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"center": [-122.4194, 37.7749], "place_name": "San Francisco, California"},
                {"center": [0.0, 0.0], "place_name": "Null Island"}
            ]
        }"#;
        let coordinates = parse_geocode_response(body).unwrap().unwrap();
        assert_eq!(coordinates.latitude, 37.7749);
        assert_eq!(coordinates.longitude, -122.4194);
        assert_eq!(
            coordinates.place_name.as_deref(),
            Some("San Francisco, California")
        );
    }

    #[test]
    fn empty_feature_list_is_no_match() {
        let body = r#"{"type":"FeatureCollection","features":[]}"#;
        assert_eq!(parse_geocode_response(body).unwrap(), None);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        for body in [
            "not json",
            r#"{"message":"Not Authorized - Invalid Token"}"#,
            r#"{"features":[{"center":[1.0]}]}"#,
            r#"{"features":[{"center":[10.0, 95.0]}]}"#,
        ] {
            assert!(matches!(
                parse_geocode_response(body),
                Err(GeocodeError::InvalidResponse(_))
            ));
        }
    }

    #[test]
    fn blank_token_is_rejected_and_url_is_encoded() {
        let mut config = GeocodingConfig::default();
        config.access_token = Some("   ".to_string());
        assert!(matches!(
            MapboxGeocoder::try_new(&config),
            Err(GeocodeError::MissingToken)
        ));

        config.access_token = Some("pk.abc".to_string());
        let geocoder = MapboxGeocoder::try_new(&config).unwrap();
        assert_eq!(
            geocoder.request_url("1 Main St & Co"),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/1%20Main%20St%20%26%20Co.json?limit=1&access_token=pk.abc"
        );
    }
}
