pub mod aggregator;
pub mod decoder;
pub mod transport;

pub use crate::domain::model::{AggregationOutcome, Cinema, ProviderLookup, ProviderRegistry};
pub use crate::domain::ports::{CinemaProvider, HttpTransport};
pub use crate::utils::error::Result;
