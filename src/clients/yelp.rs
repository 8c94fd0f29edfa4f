use serde::Deserialize;
use tracing::debug;

use super::RemoteClient;
use crate::error::{AppError, AppResult};

impl RemoteClient {
    pub async fn search_businesses(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Vec<BusinessItem>> {
        debug!(latitude, longitude, term = %self.yelp_search_term, "searching businesses");

        let req = self
            .client
            .get(self.yelp.url("/businesses/search"))
            .bearer_auth(&self.yelp.api_key)
            .query(&[("term", self.yelp_search_term.clone())])
            .query(&[("latitude", latitude), ("longitude", longitude)]);

        let resp: BusinessSearchResponse = self.get_json(req).await?;
        if resp.businesses.is_empty() {
            return Err(AppError::no_data("yelp"));
        }
        Ok(resp.businesses)
    }
}

#[derive(Debug, Deserialize)]
struct BusinessSearchResponse {
    #[serde(default)]
    businesses: Vec<BusinessItem>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BusinessItem {
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub price: Option<String>,
    #[serde(default)]
    pub rating: f64,
    pub url: String,
}
