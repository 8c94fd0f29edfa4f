use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub geocode: ApiEndpoint,
    pub weather: ApiEndpoint,
    pub events: ApiEndpoint,
    pub movies: ApiEndpoint,
    pub yelp: ApiEndpoint,
    pub yelp_search_term: String,
    pub outbound_rps: u32,
    pub http_timeout_secs: u64,
    pub weather_refresh_ms: i64,
    pub weather_refresh_policy: RefreshPolicy,
}

/// Base URL and secret for one remote API.
#[derive(Clone, Debug)]
pub struct ApiEndpoint {
    pub base_url: String,
    pub api_key: String,
}

impl ApiEndpoint {
    fn new(base_url: &str) -> Self {
        Self { base_url: base_url.to_string(), api_key: String::new() }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// How the age of cached weather rows decides whether to call the forecast API again.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RefreshPolicy {
    /// Refetch while the cached set is younger than the window; serve it once older.
    #[default]
    Literal,
    /// Serve the cached set while it is younger than the window; refetch once older.
    Expire,
}

impl RefreshPolicy {
    pub fn should_refetch(self, earliest_created_at: i64, now: i64, window_ms: i64) -> bool {
        let deadline = earliest_created_at.saturating_add(window_ms);
        match self {
            RefreshPolicy::Literal => deadline > now,
            RefreshPolicy::Expire => now >= deadline,
        }
    }
}

impl FromStr for RefreshPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(RefreshPolicy::Literal),
            "expire" => Ok(RefreshPolicy::Expire),
            other => anyhow::bail!("unknown weather refresh policy `{other}`"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: "sqlite://cityscout.db?mode=rwc".to_string(),
            geocode: ApiEndpoint::new("https://maps.googleapis.com/maps/api"),
            weather: ApiEndpoint::new("https://api.darksky.net"),
            events: ApiEndpoint::new("https://www.eventbriteapi.com/v3"),
            movies: ApiEndpoint::new("https://api.themoviedb.org/3"),
            yelp: ApiEndpoint::new("https://api.yelp.com/v3"),
            yelp_search_term: "delis".to_string(),
            outbound_rps: 10,
            http_timeout_secs: 30,
            weather_refresh_ms: 15_000,
            weather_refresh_policy: RefreshPolicy::Literal,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let geocode = endpoint("GEOCODE_BASE_URL", "GEOCODE_API_KEY", defaults.geocode);
        let weather = endpoint("WEATHER_BASE_URL", "WEATHER_API_KEY", defaults.weather);
        let events = endpoint("EVENTBRITE_BASE_URL", "EVENTBRITE_API_KEY", defaults.events);
        let movies = endpoint("TMDB_BASE_URL", "MOVIE_API_KEY", defaults.movies);
        let yelp = endpoint("YELP_BASE_URL", "YELP_API_KEY", defaults.yelp);

        let yelp_search_term =
            std::env::var("YELP_SEARCH_TERM").unwrap_or(defaults.yelp_search_term);

        let outbound_rps: u32 = std::env::var("OUTBOUND_RPS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.outbound_rps);

        let http_timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.http_timeout_secs);

        let weather_refresh_ms: i64 = std::env::var("WEATHER_REFRESH_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.weather_refresh_ms);

        let weather_refresh_policy = match std::env::var("WEATHER_REFRESH_POLICY") {
            Ok(raw) => raw.parse().context("WEATHER_REFRESH_POLICY")?,
            Err(_) => defaults.weather_refresh_policy,
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            geocode,
            weather,
            events,
            movies,
            yelp,
            yelp_search_term,
            outbound_rps,
            http_timeout_secs,
            weather_refresh_ms,
            weather_refresh_policy,
        })
    }
}

fn endpoint(url_var: &str, key_var: &str, default: ApiEndpoint) -> ApiEndpoint {
    let base_url = std::env::var(url_var).unwrap_or(default.base_url);
    let api_key = std::env::var(key_var).unwrap_or_default();
    if api_key.trim().is_empty() {
        tracing::warn!(var = key_var, "no API key provided, remote calls will likely be rejected");
    }
    ApiEndpoint { base_url, api_key }
}
