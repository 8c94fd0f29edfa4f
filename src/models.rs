use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::{
    cache::Record,
    clients::{BusinessItem, DailyForecast, EventItem, GeocodeResult, MovieItem},
    entities::{event, location, movie, weather, yelp},
    error::AppResult,
    extract::number_or_string,
};

pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w200_and_h300_bestv2";

/// Day-granular rendering shared by forecasts and events, e.g. `Mon Oct 16 2026`.
const DAY_FORMAT: &str = "%a %b %d %Y";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub search_query: String,
    pub formatted_query: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(search_query: &str, result: &GeocodeResult) -> Self {
        Self {
            id: None,
            search_query: search_query.to_string(),
            formatted_query: result.formatted_address.clone(),
            latitude: result.geometry.location.lat,
            longitude: result.geometry.location.lng,
        }
    }

    pub fn to_active_model(&self) -> location::ActiveModel {
        location::ActiveModel {
            id: Default::default(),
            search_query: Set(self.search_query.clone()),
            formatted_query: Set(self.formatted_query.clone()),
            latitude: Set(self.latitude),
            longitude: Set(self.longitude),
        }
    }
}

impl From<location::Model> for Location {
    fn from(row: location::Model) -> Self {
        Self {
            id: Some(row.id),
            search_query: row.search_query,
            formatted_query: row.formatted_query,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Weather {
    pub forecast: String,
    pub time: String,
    #[serde(skip)]
    pub created_at: i64,
}

impl Weather {
    pub fn from_day(day: &DailyForecast, created_at: i64) -> AppResult<Self> {
        let time = Timestamp::from_second(day.time)?
            .to_zoned(TimeZone::UTC)
            .strftime(DAY_FORMAT)
            .to_string();
        Ok(Self { forecast: day.summary.clone(), time, created_at })
    }
}

impl Record for Weather {
    type Entity = weather::Entity;
    type ActiveModel = weather::ActiveModel;

    fn to_active_model(&self, location_id: i32) -> weather::ActiveModel {
        weather::ActiveModel {
            id: Default::default(),
            forecast: Set(self.forecast.clone()),
            time: Set(self.time.clone()),
            created_at: Set(self.created_at),
            location_id: Set(location_id),
        }
    }

    fn from_model(row: weather::Model) -> Self {
        Self { forecast: row.forecast, time: row.time, created_at: row.created_at }
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    pub link: String,
    pub name: String,
    pub event_date: String,
    pub summary: Option<String>,
    #[serde(skip)]
    pub created_at: i64,
}

impl Event {
    pub fn from_item(item: &EventItem, created_at: i64) -> AppResult<Self> {
        let event_date =
            item.start.local.parse::<DateTime>()?.strftime(DAY_FORMAT).to_string();
        Ok(Self {
            link: item.url.clone(),
            name: item.name.text.clone().unwrap_or_default(),
            event_date,
            summary: item.summary.clone(),
            created_at,
        })
    }
}

impl Record for Event {
    type Entity = event::Entity;
    type ActiveModel = event::ActiveModel;

    fn to_active_model(&self, location_id: i32) -> event::ActiveModel {
        event::ActiveModel {
            id: Default::default(),
            link: Set(self.link.clone()),
            name: Set(self.name.clone()),
            event_date: Set(self.event_date.clone()),
            summary: Set(self.summary.clone()),
            created_at: Set(self.created_at),
            location_id: Set(location_id),
        }
    }

    fn from_model(row: event::Model) -> Self {
        Self {
            link: row.link,
            name: row.name,
            event_date: row.event_date,
            summary: row.summary,
            created_at: row.created_at,
        }
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub title: String,
    pub overview: String,
    pub average_votes: f64,
    #[serde(skip)]
    pub total_votes: i32,
    pub image_url: String,
    pub popularity: f64,
    pub released_on: String,
    #[serde(skip)]
    pub created_at: i64,
}

impl Movie {
    pub fn from_item(item: &MovieItem, created_at: i64) -> Self {
        let image_url = item
            .poster_path
            .as_deref()
            .map(|path| format!("{TMDB_IMAGE_BASE}{path}"))
            .unwrap_or_default();
        Self {
            title: item.title.clone(),
            overview: item.overview.clone(),
            average_votes: item.vote_average,
            total_votes: item.vote_count,
            image_url,
            popularity: item.popularity,
            released_on: item.release_date.clone(),
            created_at,
        }
    }
}

impl Record for Movie {
    type Entity = movie::Entity;
    type ActiveModel = movie::ActiveModel;

    fn to_active_model(&self, location_id: i32) -> movie::ActiveModel {
        movie::ActiveModel {
            id: Default::default(),
            title: Set(self.title.clone()),
            overview: Set(self.overview.clone()),
            average_votes: Set(self.average_votes),
            total_votes: Set(self.total_votes),
            image_url: Set(self.image_url.clone()),
            popularity: Set(self.popularity),
            released_on: Set(self.released_on.clone()),
            created_at: Set(self.created_at),
            location_id: Set(location_id),
        }
    }

    fn from_model(row: movie::Model) -> Self {
        Self {
            title: row.title,
            overview: row.overview,
            average_votes: row.average_votes,
            total_votes: row.total_votes,
            image_url: row.image_url,
            popularity: row.popularity,
            released_on: row.released_on,
            created_at: row.created_at,
        }
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Business {
    pub name: String,
    pub image_url: String,
    pub price: Option<String>,
    pub rating: f64,
    pub url: String,
    #[serde(skip)]
    pub created_at: i64,
}

impl Business {
    pub fn from_item(item: &BusinessItem, created_at: i64) -> Self {
        Self {
            name: item.name.clone(),
            image_url: item.image_url.clone(),
            price: item.price.clone(),
            rating: item.rating,
            url: item.url.clone(),
            created_at,
        }
    }
}

impl Record for Business {
    type Entity = yelp::Entity;
    type ActiveModel = yelp::ActiveModel;

    fn to_active_model(&self, location_id: i32) -> yelp::ActiveModel {
        yelp::ActiveModel {
            id: Default::default(),
            name: Set(self.name.clone()),
            image_url: Set(self.image_url.clone()),
            price: Set(self.price.clone()),
            rating: Set(self.rating),
            url: Set(self.url.clone()),
            created_at: Set(self.created_at),
            location_id: Set(location_id),
        }
    }

    fn from_model(row: yelp::Model) -> Self {
        Self {
            name: row.name,
            image_url: row.image_url,
            price: row.price,
            rating: row.rating,
            url: row.url,
            created_at: row.created_at,
        }
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    #[serde(deserialize_with = "number_or_string")]
    pub id: i32,
    #[serde(deserialize_with = "number_or_string")]
    pub latitude: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(deserialize_with = "number_or_string")]
    pub id: i32,
    pub formatted_query: String,
}

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    #[serde(deserialize_with = "number_or_string")]
    pub id: i32,
    pub search_query: String,
}

pub fn now_ms() -> i64 {
    Timestamp::now().as_millisecond()
}
