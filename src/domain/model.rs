use crate::utils::error::CinemaError;
use chrono::NaiveDate;
use reqwest::header::HeaderMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 一個外部影院供應商的靜態設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    pub base_uri: String,
    pub location: String,
}

/// 啟動時載入一次，之後只讀
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
    default_headers: HeaderMap,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Provider>, default_headers: HeaderMap) -> Self {
        Self {
            providers,
            default_headers,
        }
    }

    /// Providers in declaration order.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMovieRecord {
    /// Two-character provider prefix followed by the catalogue-wide movie id.
    pub external_id: String,
    pub title: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCatalogue {
    /// Display name the provider reports for itself.
    pub provider: String,
    pub movies: Vec<ProviderMovieRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cinema {
    pub name: String,
    pub location: String,
    pub showtime: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub ticket_price: Decimal,
}

/// 單一供應商查詢的結果
#[derive(Debug)]
pub enum AggregationOutcome {
    Success(Cinema),
    NotFound,
    Failed(CinemaError),
}

impl AggregationOutcome {
    pub fn cinema(&self) -> Option<&Cinema> {
        match self {
            AggregationOutcome::Success(cinema) => Some(cinema),
            _ => None,
        }
    }

    pub fn into_cinema(self) -> Option<Cinema> {
        match self {
            AggregationOutcome::Success(cinema) => Some(cinema),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AggregationOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct ProviderLookup {
    pub provider: String,
    pub outcome: AggregationOutcome,
}
