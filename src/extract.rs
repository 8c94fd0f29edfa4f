use std::{fmt::Display, str::FromStr};

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::AppError;

/// The `data` query parameter, decoded into `T`.
///
/// Browser clients send it either JSON-encoded (`data={"id":7}`), as a bare
/// string (`data=Seattle`) or in bracket form (`data[id]=7&data[latitude]=47.6`).
#[derive(Debug)]
pub struct DataQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for DataQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        parse_data(pairs).map(DataQuery)
    }
}

fn parse_data<T: DeserializeOwned>(pairs: Vec<(String, String)>) -> Result<T, AppError> {
    let mut whole = None;
    let mut fields = Map::new();

    for (key, value) in pairs {
        if key == "data" {
            whole = Some(value);
        } else if let Some(field) = key.strip_prefix("data[").and_then(|k| k.strip_suffix(']')) {
            fields.insert(field.to_string(), Value::String(value));
        }
    }

    let value = match whole {
        Some(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(v @ (Value::Object(_) | Value::String(_))) => v,
            _ => Value::String(raw),
        },
        None if !fields.is_empty() => Value::Object(fields),
        None => return Err(AppError::BadRequest("missing `data` query parameter".to_string())),
    };

    serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Accepts either a JSON number or a string holding one.
pub fn number_or_string<'de, D, N>(deserializer: D) -> Result<N, D::Error>
where
    D: Deserializer<'de>,
    N: Deserialize<'de> + FromStr,
    N::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<N> {
        Number(N),
        Text(String),
    }

    match Raw::<N>::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
