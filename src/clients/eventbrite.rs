use serde::Deserialize;
use tracing::debug;

use super::RemoteClient;
use crate::error::{AppError, AppResult};

impl RemoteClient {
    pub async fn search_events(&self, address: &str) -> AppResult<Vec<EventItem>> {
        debug!(address = %address, "searching events");

        let req = self.client.get(self.events.url("/events/search")).query(&[
            ("token", self.events.api_key.as_str()),
            ("location.address", address),
        ]);

        let resp: EventSearchResponse = self.get_json(req).await?;
        if resp.events.is_empty() {
            return Err(AppError::no_data("eventbrite"));
        }
        Ok(resp.events)
    }
}

#[derive(Debug, Deserialize)]
struct EventSearchResponse {
    #[serde(default)]
    events: Vec<EventItem>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventItem {
    pub url: String,
    pub name: EventName,
    pub start: EventStart,
    pub summary: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventName {
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventStart {
    /// Wall-clock start in the venue's timezone, without offset.
    pub local: String,
}
