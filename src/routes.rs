use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::debug;

use crate::{
    AppState,
    cache::{CacheStore, Lookup, Record},
    error::{AppError, AppResult},
    extract::DataQuery,
    locks::CacheKey,
    models::{
        Business, CoordinatesQuery, Event, EventsQuery, Location, Movie, MoviesQuery, Weather,
        now_ms,
    },
};

pub async fn location(
    State(state): State<Arc<AppState>>,
    DataQuery(search): DataQuery<String>,
) -> AppResult<Json<Location>> {
    if search.trim().is_empty() {
        return Err(AppError::BadRequest("search query is required".to_string()));
    }

    let _guard = state.locks.lock(CacheKey::Location(search.clone())).await;

    if let Some(hit) = state.cache.find_location(&search).await? {
        debug!(search_query = %search, id = ?hit.id, "location cache hit");
        return Ok(Json(hit));
    }

    debug!(search_query = %search, "location cache miss");
    let result = state.remote.geocode(&search).await?;
    let location = state.cache.insert_location(&Location::new(&search, &result)).await?;

    Ok(Json(location))
}

pub async fn weather(
    State(state): State<Arc<AppState>>,
    DataQuery(q): DataQuery<CoordinatesQuery>,
) -> AppResult<Json<Vec<Weather>>> {
    let _guard = state.locks.lock(CacheKey::Weather(q.id)).await;

    match state.cache.lookup::<Weather>(q.id).await? {
        Lookup::Hit(rows) => {
            let earliest = rows.iter().map(Record::created_at).min().unwrap_or_default();
            let refetch = state.config.weather_refresh_policy.should_refetch(
                earliest,
                now_ms(),
                state.config.weather_refresh_ms,
            );
            if !refetch {
                debug!(location_id = q.id, rows = rows.len(), "serving cached weather");
                return Ok(Json(rows));
            }

            debug!(location_id = q.id, earliest, "replacing cached weather");
            let fresh = fetch_weather(&state, &q).await?;
            state.cache.replace_all(q.id, &fresh).await?;
            Ok(Json(fresh))
        },
        Lookup::Miss => {
            debug!(location_id = q.id, "weather cache miss");
            let fresh = fetch_weather(&state, &q).await?;
            state.cache.save_all(q.id, &fresh).await?;
            Ok(Json(fresh))
        },
    }
}

async fn fetch_weather(state: &AppState, q: &CoordinatesQuery) -> AppResult<Vec<Weather>> {
    let created_at = now_ms();
    state
        .remote
        .daily_forecast(q.latitude, q.longitude)
        .await?
        .iter()
        .map(|day| Weather::from_day(day, created_at))
        .collect()
}

pub async fn events(
    State(state): State<Arc<AppState>>,
    DataQuery(q): DataQuery<EventsQuery>,
) -> AppResult<Json<Vec<Event>>> {
    let _guard = state.locks.lock(CacheKey::Events(q.id)).await;

    let events = cached_or_fetch(&state.cache, q.id, || async {
        let created_at = now_ms();
        let items = state.remote.search_events(&q.formatted_query).await?;
        let events = items
            .iter()
            .map(|item| Event::from_item(item, created_at))
            .collect::<AppResult<Vec<_>>>()?;
        Ok::<_, AppError>(events)
    })
    .await?;

    Ok(Json(events))
}

pub async fn movies(
    State(state): State<Arc<AppState>>,
    DataQuery(q): DataQuery<MoviesQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let _guard = state.locks.lock(CacheKey::Movies(q.id)).await;

    let movies = cached_or_fetch(&state.cache, q.id, || async {
        let created_at = now_ms();
        let items = state.remote.search_movies(&q.search_query).await?;
        let movies = items.iter().map(|item| Movie::from_item(item, created_at)).collect();
        Ok::<Vec<Movie>, AppError>(movies)
    })
    .await?;

    Ok(Json(movies))
}

pub async fn yelp(
    State(state): State<Arc<AppState>>,
    DataQuery(q): DataQuery<CoordinatesQuery>,
) -> AppResult<Json<Vec<Business>>> {
    let _guard = state.locks.lock(CacheKey::Yelp(q.id)).await;

    let businesses = cached_or_fetch(&state.cache, q.id, || async {
        let created_at = now_ms();
        let items = state.remote.search_businesses(q.latitude, q.longitude).await?;
        let businesses = items.iter().map(|item| Business::from_item(item, created_at)).collect();
        Ok::<Vec<Business>, AppError>(businesses)
    })
    .await?;

    Ok(Json(businesses))
}

/// Serves cached rows verbatim on a hit; on a miss fetches, persists, then returns the new set.
async fn cached_or_fetch<R, F, Fut>(
    cache: &CacheStore,
    location_id: i32,
    fetch: F,
) -> AppResult<Vec<R>>
where
    R: Record,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<Vec<R>>>,
{
    if let Lookup::Hit(rows) = cache.lookup::<R>(location_id).await? {
        debug!(location_id, rows = rows.len(), "cache hit");
        return Ok(rows);
    }

    debug!(location_id, "cache miss");
    let records = fetch().await?;
    cache.save_all(location_id, &records).await?;
    Ok(records)
}
