use crate::domain::model::Cinema;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// 單次 HTTP GET，不含重試
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, uri: &str, headers: &HeaderMap) -> Result<Vec<u8>>;
}

/// What the movie-detail endpoint depends on. Never fails: an outage shows up as
/// an empty list.
#[async_trait]
pub trait CinemaProvider: Send + Sync {
    async fn get_cinemas_for_movie(&self, provider_movie_id: &str) -> Vec<Cinema>;
}
