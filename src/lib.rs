pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::CinemaConfig;
pub use crate::core::{
    aggregator::CinemaAggregator,
    transport::{ReqwestTransport, ResilientHttpClient, RetryPolicy},
};
pub use domain::model::{AggregationOutcome, Cinema, Provider, ProviderLookup, ProviderRegistry};
pub use domain::ports::{CinemaProvider, HttpTransport};
pub use utils::error::{CinemaError, Result};
