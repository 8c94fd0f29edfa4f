use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cityscout::{
    AppState,
    config::{Config, RefreshPolicy},
    entities::{location, movie, weather, yelp},
    error::GENERIC_FAILURE,
    models::now_ms,
};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const API_KEY: &str = "test-key";

async fn spawn_app(server: &MockServer, policy: RefreshPolicy) -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.database_url = "sqlite::memory:".to_string();
    config.outbound_rps = 1_000;
    config.weather_refresh_policy = policy;
    for endpoint in [
        &mut config.geocode,
        &mut config.weather,
        &mut config.events,
        &mut config.movies,
        &mut config.yelp,
    ] {
        endpoint.base_url = server.uri();
        endpoint.api_key = API_KEY.to_string();
    }

    let state = Arc::new(AppState::new(config).await.expect("Failed to create app state"));
    (cityscout::router(state.clone()), state)
}

fn data_uri(route: &str, data: &str) -> String {
    let base = format!("http://localhost{route}");
    let url = reqwest::Url::parse_with_params(&base, &[("data", data)]).unwrap();
    format!("{}?{}", url.path(), url.query().unwrap_or_default())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "body: {}", String::from_utf8_lossy(&body));
    serde_json::from_slice(&body).unwrap()
}

async fn seed_location(state: &AppState, id: i32, search_query: &str) {
    location::ActiveModel {
        id: Set(id),
        search_query: Set(search_query.to_string()),
        formatted_query: Set(format!("{search_query}, USA")),
        latitude: Set(47.6062),
        longitude: Set(-122.3321),
    }
    .insert(state.cache.db())
    .await
    .unwrap();
}

async fn seed_weather(state: &AppState, location_id: i32, forecast: &str, created_at: i64) {
    weather::ActiveModel {
        id: Default::default(),
        forecast: Set(forecast.to_string()),
        time: Set("Thu Oct 15 2026".to_string()),
        created_at: Set(created_at),
        location_id: Set(location_id),
    }
    .insert(state.cache.db())
    .await
    .unwrap();
}

fn forecast_body(summary: &str) -> Value {
    json!({
        "latitude": 47.6062,
        "longitude": -122.3321,
        "daily": {
            "data": [
                { "summary": summary, "time": 1_792_108_800 },
                { "summary": "Clear throughout the day.", "time": 1_792_195_200 }
            ]
        }
    })
}

#[tokio::test]
async fn location_is_geocoded_once_per_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "Seattle"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "formatted_address": "Seattle, WA, USA",
                "geometry": { "location": { "lat": 47.6062, "lng": -122.3321 } }
            }],
            "status": "OK"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _state) = spawn_app(&server, RefreshPolicy::Literal).await;

    let first = get_json(&app, "/location?data=Seattle").await;
    assert_eq!(first["search_query"], "Seattle");
    assert_eq!(first["formatted_query"], "Seattle, WA, USA");
    assert_eq!(first["latitude"].as_f64(), Some(47.6062));
    assert_eq!(first["longitude"].as_f64(), Some(-122.3321));
    assert!(first["id"].is_i64());

    let second = get_json(&app, "/location?data=Seattle").await;
    assert_eq!(second, first);
}

#[tokio::test]
async fn location_without_results_is_not_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [], "status": "ZERO_RESULTS" })),
        )
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;

    let (status, body) = get(&app, "/location?data=Atlantis").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, GENERIC_FAILURE.as_bytes());
    assert!(state.cache.find_location("Atlantis").await.unwrap().is_none());
}

#[tokio::test]
async fn movies_miss_fetches_and_stores_then_hits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "dune"))
        .and(query_param("api_key", API_KEY))
        .and(query_param("language", "en-US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [{
                "title": "Dune",
                "overview": "Paul Atreides travels to Arrakis.",
                "vote_average": 8.1,
                "vote_count": 500,
                "poster_path": "/x.jpg",
                "popularity": 90,
                "release_date": "2021-10-22"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 7, "dune").await;

    let uri = data_uri("/movies", r#"{"id":7,"search_query":"dune"}"#);
    let body = get_json(&app, &uri).await;

    let movies = body.as_array().unwrap();
    assert_eq!(movies.len(), 1);
    let dune = &movies[0];
    assert_eq!(dune["title"], "Dune");
    assert_eq!(dune["overview"], "Paul Atreides travels to Arrakis.");
    assert_eq!(dune["average_votes"].as_f64(), Some(8.1));
    assert_eq!(dune["image_url"], "https://image.tmdb.org/t/p/w200_and_h300_bestv2/x.jpg");
    assert_eq!(dune["popularity"], json!(90.0));
    assert_eq!(dune["released_on"], "2021-10-22");

    let rows = movie::Entity::find().all(state.cache.db()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].location_id, 7);
    assert_eq!(rows[0].total_votes, 500);

    let cached = get_json(&app, &uri).await;
    assert_eq!(cached, body);
    assert_eq!(movie::Entity::find().all(state.cache.db()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn events_accept_bracket_query_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/search"))
        .and(query_param("token", API_KEY))
        .and(query_param("location.address", "Seattle, WA, USA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [
                {
                    "url": "https://www.eventbrite.com/e/1",
                    "name": { "text": "Harbor Jazz Night", "html": "Harbor Jazz Night" },
                    "start": { "local": "2026-10-20T19:00:00", "timezone": "America/Los_Angeles" },
                    "summary": "Live music by the water"
                },
                {
                    "url": "https://www.eventbrite.com/e/2",
                    "name": { "text": "Market Tour" },
                    "start": { "local": "2026-10-21T10:30:00" },
                    "summary": null
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 3, "seattle").await;

    let uri = "/events?data%5Bid%5D=3&data%5Bformatted_query%5D=Seattle%2C%20WA%2C%20USA";
    let body = get_json(&app, uri).await;

    assert_eq!(
        body,
        json!([
            {
                "link": "https://www.eventbrite.com/e/1",
                "name": "Harbor Jazz Night",
                "event_date": "Tue Oct 20 2026",
                "summary": "Live music by the water"
            },
            {
                "link": "https://www.eventbrite.com/e/2",
                "name": "Market Tour",
                "event_date": "Wed Oct 21 2026",
                "summary": null
            }
        ])
    );

    assert_eq!(get_json(&app, uri).await, body);
}

#[tokio::test]
async fn yelp_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .and(header("authorization", "Bearer test-key"))
        .and(query_param("term", "delis"))
        .and(query_param("latitude", "47.6062"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [{
                "name": "Salumi",
                "image_url": "https://s3-media.fl.yelpcdn.com/salumi.jpg",
                "price": "$$",
                "rating": 4.5,
                "url": "https://www.yelp.com/biz/salumi"
            }],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 1, "seattle").await;

    let uri = data_uri("/yelp", r#"{"id":1,"latitude":47.6062,"longitude":-122.3321}"#);
    let body = get_json(&app, &uri).await;

    assert_eq!(
        body,
        json!([{
            "name": "Salumi",
            "image_url": "https://s3-media.fl.yelpcdn.com/salumi.jpg",
            "price": "$$",
            "rating": 4.5,
            "url": "https://www.yelp.com/biz/salumi"
        }])
    );

    let cached = get_json(&app, &uri).await;
    assert_eq!(cached, body);
    assert_eq!(yelp::Entity::find().all(state.cache.db()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_remote_result_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "businesses": [], "total": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 1, "nowhere").await;

    let uri = data_uri("/yelp", r#"{"id":1,"latitude":0,"longitude":0}"#);
    let (status, body) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, GENERIC_FAILURE.as_bytes());
    assert!(yelp::Entity::find().all(state.cache.db()).await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_error_status_becomes_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 2, "alien").await;

    let uri = data_uri("/movies", r#"{"id":2,"search_query":"alien"}"#);
    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_data_parameter_is_rejected() {
    let server = MockServer::start().await;
    let (app, _state) = spawn_app(&server, RefreshPolicy::Literal).await;

    let (status, _) = get(&app, "/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/location?data=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn weather_miss_fetches_forecast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/test-key/47.6062,-122.3321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Rain overnight.")))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 5, "seattle").await;

    let uri = data_uri("/weather", r#"{"id":5,"latitude":47.6062,"longitude":-122.3321}"#);
    let body = get_json(&app, &uri).await;

    assert_eq!(
        body,
        json!([
            { "forecast": "Rain overnight.", "time": "Fri Oct 16 2026" },
            { "forecast": "Clear throughout the day.", "time": "Sat Oct 17 2026" }
        ])
    );

    let rows = weather::Entity::find()
        .filter(weather::Column::LocationId.eq(5))
        .all(state.cache.db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn literal_policy_replaces_recent_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/test-key/47.6062,-122.3321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Fresh forecast.")))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 5, "seattle").await;
    seed_weather(&state, 5, "Cached forecast.", now_ms()).await;

    let uri = data_uri("/weather", r#"{"id":5,"latitude":47.6062,"longitude":-122.3321}"#);
    let body = get_json(&app, &uri).await;
    assert_eq!(body[0]["forecast"], "Fresh forecast.");

    let rows = weather::Entity::find().all(state.cache.db()).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.forecast != "Cached forecast."));
}

#[tokio::test]
async fn failed_weather_refetch_keeps_cached_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/test-key/47.6062,-122.3321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "daily": { "data": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 5, "seattle").await;
    seed_weather(&state, 5, "Cached forecast.", now_ms()).await;

    let uri = data_uri("/weather", r#"{"id":5,"latitude":47.6062,"longitude":-122.3321}"#);
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, GENERIC_FAILURE.as_bytes());

    let rows = weather::Entity::find().all(state.cache.db()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].forecast, "Cached forecast.");
}

#[tokio::test]
async fn literal_policy_serves_old_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/test-key/47.6062,-122.3321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Fresh forecast.")))
        .expect(0)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 5, "seattle").await;
    seed_weather(&state, 5, "Cached forecast.", now_ms() - 60_000).await;

    let uri = data_uri("/weather", r#"{"id":5,"latitude":47.6062,"longitude":-122.3321}"#);
    let body = get_json(&app, &uri).await;
    assert_eq!(body, json!([{ "forecast": "Cached forecast.", "time": "Thu Oct 15 2026" }]));
}

#[tokio::test]
async fn expire_policy_keeps_recent_and_replaces_old_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/test-key/47.6062,-122.3321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Fresh forecast.")))
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Expire).await;
    seed_location(&state, 5, "seattle").await;
    seed_location(&state, 6, "tacoma").await;
    seed_weather(&state, 5, "Recent forecast.", now_ms()).await;
    seed_weather(&state, 6, "Old forecast.", now_ms() - 60_000).await;

    let recent = data_uri("/weather", r#"{"id":5,"latitude":47.6062,"longitude":-122.3321}"#);
    let body = get_json(&app, &recent).await;
    assert_eq!(body[0]["forecast"], "Recent forecast.");

    let old = data_uri("/weather", r#"{"id":6,"latitude":47.6062,"longitude":-122.3321}"#);
    let body = get_json(&app, &old).await;
    assert_eq!(body[0]["forecast"], "Fresh forecast.");
}

#[tokio::test]
async fn concurrent_misses_fetch_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_millis(100))
                .set_body_json(json!({
                    "results": [{
                        "title": "Alien",
                        "overview": "In space no one can hear you scream.",
                        "vote_average": 8.2,
                        "vote_count": 14000,
                        "poster_path": "/alien.jpg",
                        "popularity": 60.5,
                        "release_date": "1979-05-25"
                    }]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;
    seed_location(&state, 4, "alien").await;

    let uri = data_uri("/movies", r#"{"id":4,"search_query":"alien"}"#);
    let (first, second) = tokio::join!(get_json(&app, &uri), get_json(&app, &uri));

    assert_eq!(first, second);
    let rows = movie::Entity::find().all(state.cache.db()).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn concurrent_location_searches_geocode_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "Seattle"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_millis(100))
                .set_body_json(json!({
                    "results": [{
                        "formatted_address": "Seattle, WA, USA",
                        "geometry": { "location": { "lat": 47.6062, "lng": -122.3321 } }
                    }],
                    "status": "OK"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (app, state) = spawn_app(&server, RefreshPolicy::Literal).await;

    let uri = "/location?data=Seattle";
    let (first, second) = tokio::join!(get_json(&app, uri), get_json(&app, uri));

    assert!(first["id"].is_i64());
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first, second);
    let rows = location::Entity::find().all(state.cache.db()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].search_query, "Seattle");
}
