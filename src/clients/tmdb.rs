use serde::Deserialize;
use tracing::debug;

use super::RemoteClient;
use crate::error::{AppError, AppResult};

impl RemoteClient {
    pub async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieItem>> {
        debug!(query = %query, "searching TMDB");

        let req = self.client.get(self.movies.url("/search/movie")).query(&[
            ("api_key", self.movies.api_key.as_str()),
            ("language", "en-US"),
            ("query", query),
        ]);

        let resp: SearchResponse = self.get_json(req).await?;
        if resp.results.is_empty() {
            return Err(AppError::no_data("tmdb"));
        }
        Ok(resp.results)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MovieItem>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MovieItem {
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i32,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub release_date: String,
}
