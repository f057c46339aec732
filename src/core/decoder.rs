use crate::domain::model::{ProviderCatalogue, ProviderMovieRecord};
use crate::utils::error::{CinemaError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Length, in characters, of the provider-type prefix on external ids ("cm", "fw").
pub const PROVIDER_PREFIX_LEN: usize = 2;

// 供應商回應格式；未知欄位一律忽略
#[derive(Debug, Deserialize)]
struct CinemaProviderDto {
    #[serde(alias = "Provider", default)]
    provider: String,
    #[serde(alias = "Movies", default)]
    movies: Vec<MovieFromProviderDto>,
}

#[derive(Debug, Deserialize)]
struct MovieFromProviderDto {
    #[serde(rename = "ID", alias = "Id", alias = "id")]
    id: String,
    #[serde(rename = "Title", alias = "title", default)]
    title: String,
    // 缺少價格時視為 0，不影響同一份目錄裡的其他電影
    #[serde(rename = "Price", alias = "price", default)]
    price: Decimal,
}

impl From<MovieFromProviderDto> for ProviderMovieRecord {
    fn from(dto: MovieFromProviderDto) -> Self {
        Self {
            external_id: dto.id,
            title: dto.title,
            price: dto.price,
        }
    }
}

pub fn decode(provider_name: &str, body: &[u8]) -> Result<ProviderCatalogue> {
    let dto: CinemaProviderDto =
        serde_json::from_slice(body).map_err(|source| CinemaError::DecodeError {
            provider: provider_name.to_string(),
            source,
        })?;

    tracing::debug!(
        "Decoded {} movies from provider '{}'",
        dto.movies.len(),
        provider_name
    );

    Ok(ProviderCatalogue {
        provider: dto.provider,
        movies: dto.movies.into_iter().map(ProviderMovieRecord::from).collect(),
    })
}

/// Drops the provider-type prefix, counting characters rather than bytes.
/// Ids shorter than the prefix have no catalogue id and yield `None`.
pub fn strip_provider_prefix(external_id: &str) -> Option<&str> {
    let mut chars = external_id.chars();
    for _ in 0..PROVIDER_PREFIX_LEN {
        chars.next()?;
    }
    Some(chars.as_str())
}

impl ProviderCatalogue {
    /// First movie whose stripped id equals `provider_movie_id` (case-sensitive).
    pub fn find_movie(&self, provider_movie_id: &str) -> Option<&ProviderMovieRecord> {
        self.movies
            .iter()
            .find(|movie| strip_provider_prefix(&movie.external_id) == Some(provider_movie_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_provider_payload() {
        let body = serde_json::json!({
            "Provider": "Cinema World",
            "Movies": [
                {
                    "ID": "cm123",
                    "Title": "Star Wars: Episode IV - A New Hope",
                    "Type": "movie",
                    "Poster": "https://example.com/poster.jpg",
                    "Actors": "Mark Hamill, Harrison Ford",
                    "Price": 20
                },
                {"ID": "cm456", "Title": "Episode V", "Price": 15.5}
            ]
        })
        .to_string();

        let catalogue = decode("cinemaworld", body.as_bytes()).unwrap();

        assert_eq!(catalogue.provider, "Cinema World");
        assert_eq!(catalogue.movies.len(), 2);
        assert_eq!(catalogue.movies[0].external_id, "cm123");
        assert_eq!(catalogue.movies[0].price, dec!(20));
        assert_eq!(catalogue.movies[1].price, dec!(15.5));
    }

    #[test]
    fn test_decode_ignores_unknown_fields_and_accepts_lowercase_keys() {
        let body = r#"{
            "provider": "Film World",
            "movies": [{"ID": "fw123", "Title": "Movie", "Price": "12.75", "Rating": "PG"}],
            "generatedAt": "2024-07-01"
        }"#;

        let catalogue = decode("filmworld", body.as_bytes()).unwrap();

        assert_eq!(catalogue.provider, "Film World");
        assert_eq!(catalogue.movies[0].price, dec!(12.75));
    }

    #[test]
    fn test_decode_malformed_payload() {
        let err = decode("filmworld", b"<html>Forbidden</html>").unwrap_err();
        match err {
            CinemaError::DecodeError { provider, .. } => assert_eq!(provider, "filmworld"),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(decode("filmworld", b"").is_err());
        assert!(decode("filmworld", br#"{"Provider": "Film World", "Movies": null}"#).is_err());
    }

    #[test]
    fn test_decode_without_movies_is_empty_catalogue() {
        let catalogue = decode("filmworld", br#"{"Provider": "Film World"}"#).unwrap();

        assert_eq!(catalogue.provider, "Film World");
        assert!(catalogue.movies.is_empty());
        assert!(catalogue.find_movie("123").is_none());
    }

    #[test]
    fn test_unpriced_record_does_not_drop_the_catalogue() {
        let body = r#"{
            "Provider": "Cinema World",
            "Movies": [
                {"ID": "cm123", "Title": "Priced", "Price": 20},
                {"ID": "cm456", "Title": "Unpriced"}
            ]
        }"#;

        let catalogue = decode("cinemaworld", body.as_bytes()).unwrap();

        assert_eq!(catalogue.movies.len(), 2);
        assert_eq!(catalogue.find_movie("123").unwrap().price, dec!(20));
        assert_eq!(catalogue.find_movie("456").unwrap().price, Decimal::ZERO);
    }

    #[test]
    fn test_strip_provider_prefix() {
        assert_eq!(strip_provider_prefix("cm123"), Some("123"));
        assert_eq!(strip_provider_prefix("fw"), Some(""));
        assert_eq!(strip_provider_prefix("f"), None);
        assert_eq!(strip_provider_prefix(""), None);
        assert_eq!(strip_provider_prefix("éü42"), Some("42"));
    }

    #[test]
    fn test_find_movie_is_exact_and_case_sensitive() {
        let catalogue = ProviderCatalogue {
            provider: "Cinema World".to_string(),
            movies: vec![
                ProviderMovieRecord {
                    external_id: "cmABC".to_string(),
                    title: "Upper".to_string(),
                    price: dec!(10),
                },
                ProviderMovieRecord {
                    external_id: "cm1234".to_string(),
                    title: "Longer".to_string(),
                    price: dec!(11),
                },
            ],
        };

        assert!(catalogue.find_movie("abc").is_none());
        assert!(catalogue.find_movie("123").is_none());
        assert_eq!(catalogue.find_movie("ABC").unwrap().title, "Upper");
    }
}
