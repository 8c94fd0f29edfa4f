use serde::Deserialize;
use tracing::debug;

use super::RemoteClient;
use crate::error::{AppError, AppResult};

impl RemoteClient {
    /// Daily forecast for a coordinate pair, one item per day.
    pub async fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Vec<DailyForecast>> {
        debug!(latitude, longitude, "fetching forecast");

        let url = self
            .weather
            .url(&format!("/forecast/{}/{latitude},{longitude}", self.weather.api_key));

        let resp: ForecastResponse = self.get_json(self.client.get(url)).await?;
        let days = resp.daily.map(|d| d.data).unwrap_or_default();
        if days.is_empty() {
            return Err(AppError::no_data("forecast"));
        }
        Ok(days)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    data: Vec<DailyForecast>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DailyForecast {
    #[serde(default)]
    pub summary: String,
    /// Unix seconds at the start of the day.
    pub time: i64,
}
