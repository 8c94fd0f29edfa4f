use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub const GENERIC_FAILURE: &str = "Sorry, something went wrong here.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("remote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{api} returned no data")]
    NoData { api: &'static str },

    #[error("store failure: {0}")]
    Store(#[from] sea_orm::DbErr),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn no_data(api: &'static str) -> Self {
        Self::NoData { api }
    }
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            err => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE).into_response()
            },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
