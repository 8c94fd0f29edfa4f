mod eventbrite;
mod forecast;
mod geocode;
mod tmdb;
mod yelp;

use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::de::DeserializeOwned;

pub use eventbrite::{EventItem, EventName, EventStart};
pub use forecast::DailyForecast;
pub use geocode::{GeocodeResult, Geometry, LatLng};
pub use tmdb::MovieItem;
pub use yelp::BusinessItem;

use crate::{
    config::{ApiEndpoint, Config},
    error::AppResult,
};

/// Outbound client for every third-party API the aggregator proxies.
///
/// Calls share one rate limiter. Transport failures and non-2xx statuses
/// surface as `AppError::Transport`; an empty result set as `AppError::NoData`.
pub struct RemoteClient {
    client: reqwest::Client,
    geocode: ApiEndpoint,
    weather: ApiEndpoint,
    events: ApiEndpoint,
    movies: ApiEndpoint,
    yelp: ApiEndpoint,
    yelp_search_term: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RemoteClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        let rps = NonZeroU32::new(config.outbound_rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self {
            client,
            geocode: config.geocode.clone(),
            weather: config.weather.clone(),
            events: config.events.clone(),
            movies: config.movies.clone(),
            yelp: config.yelp.clone(),
            yelp_search_term: config.yelp_search_term.clone(),
            limiter,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> AppResult<T> {
        self.limiter.until_ready().await;
        let body = req.send().await?.error_for_status()?.json().await?;
        Ok(body)
    }
}
