use serde::Deserialize;
use tracing::debug;

use super::RemoteClient;
use crate::error::{AppError, AppResult};

impl RemoteClient {
    /// Resolves a free-form place name to its best geocoding match.
    pub async fn geocode(&self, address: &str) -> AppResult<GeocodeResult> {
        debug!(address = %address, "geocoding");

        let req = self
            .client
            .get(self.geocode.url("/geocode/json"))
            .query(&[("address", address), ("key", self.geocode.api_key.as_str())]);

        let resp: GeocodeResponse = self.get_json(req).await?;
        resp.results.into_iter().next().ok_or_else(|| AppError::no_data("geocode"))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}
