use crate::config::CinemaConfig;
use crate::core::decoder;
use crate::core::transport::{ReqwestTransport, ResilientHttpClient};
use crate::domain::model::{
    AggregationOutcome, Cinema, Provider, ProviderCatalogue, ProviderLookup, ProviderMovieRecord,
    ProviderRegistry,
};
use crate::domain::ports::{CinemaProvider, HttpTransport};
use crate::utils::error::{CinemaError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Queries every registered provider for a movie and merges what comes back.
///
/// Lookups run concurrently, one per registry entry, and are joined before the
/// merge, so the output follows registry order no matter which provider answers
/// first. A provider that fails, times out or sends garbage contributes nothing;
/// it never takes the whole call down.
pub struct CinemaAggregator<T: HttpTransport> {
    registry: Arc<ProviderRegistry>,
    client: ResilientHttpClient<T>,
    default_deadline: Option<Duration>,
}

impl<T: HttpTransport> CinemaAggregator<T> {
    pub fn new(registry: Arc<ProviderRegistry>, client: ResilientHttpClient<T>) -> Self {
        Self {
            registry,
            client,
            default_deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.default_deadline = deadline;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Uses the configured deadline, if any.
    pub async fn get_cinemas_for_movie(&self, provider_movie_id: &str) -> Vec<Cinema> {
        self.collect(provider_movie_id, self.default_deadline).await
    }

    pub async fn get_cinemas_for_movie_within(
        &self,
        provider_movie_id: &str,
        deadline: Duration,
    ) -> Vec<Cinema> {
        self.collect(provider_movie_id, Some(deadline)).await
    }

    async fn collect(&self, provider_movie_id: &str, deadline: Option<Duration>) -> Vec<Cinema> {
        self.lookup_all(provider_movie_id, deadline)
            .await
            .into_iter()
            .filter_map(|lookup| lookup.outcome.into_cinema())
            .collect()
    }

    /// One report per provider, index-aligned with the registry.
    pub async fn lookup_all(
        &self,
        provider_movie_id: &str,
        deadline: Option<Duration>,
    ) -> Vec<ProviderLookup> {
        // 空白字元是合法的 id，只有空字串不查詢
        if provider_movie_id.is_empty() {
            tracing::warn!("Skipping cinema lookup: empty movie id");
            return Vec::new();
        }

        let branches = self
            .registry
            .providers()
            .iter()
            .map(|provider| self.lookup_with_deadline(provider, provider_movie_id, deadline));

        let lookups = join_all(branches).await;
        log_summary(provider_movie_id, &lookups);
        lookups
    }

    async fn lookup_with_deadline(
        &self,
        provider: &Provider,
        provider_movie_id: &str,
        deadline: Option<Duration>,
    ) -> ProviderLookup {
        let outcome = match deadline {
            Some(after) => {
                match tokio::time::timeout(after, self.lookup(provider, provider_movie_id)).await {
                    Ok(outcome) => outcome,
                    Err(_) => AggregationOutcome::Failed(CinemaError::Timeout {
                        provider: provider.name.clone(),
                        after,
                    }),
                }
            }
            None => self.lookup(provider, provider_movie_id).await,
        };

        match &outcome {
            AggregationOutcome::Success(cinema) => tracing::debug!(
                "🎬 {}: movie {} found, ticket price {}",
                provider.name,
                provider_movie_id,
                cinema.ticket_price
            ),
            AggregationOutcome::NotFound => tracing::info!(
                "{}: movie {} not in catalogue",
                provider.name,
                provider_movie_id
            ),
            AggregationOutcome::Failed(e) => tracing::error!(
                "❌ Provider {} ({}) contributed nothing: {} ({:?})",
                provider.name,
                provider.base_uri,
                e,
                e.category()
            ),
        }

        ProviderLookup {
            provider: provider.name.clone(),
            outcome,
        }
    }

    async fn lookup(&self, provider: &Provider, provider_movie_id: &str) -> AggregationOutcome {
        let body = match self
            .client
            .get(&provider.base_uri, self.registry.default_headers())
            .await
        {
            Ok(body) => body,
            Err(e) => return AggregationOutcome::Failed(e),
        };

        let catalogue = match decoder::decode(&provider.name, &body) {
            Ok(catalogue) => catalogue,
            Err(e) => return AggregationOutcome::Failed(e),
        };

        match catalogue.find_movie(provider_movie_id) {
            Some(movie) => AggregationOutcome::Success(to_cinema(provider, &catalogue, movie)),
            None => AggregationOutcome::NotFound,
        }
    }
}

impl CinemaAggregator<ReqwestTransport> {
    /// 依設定檔建立使用 reqwest 的聚合器
    pub fn from_config(config: &CinemaConfig) -> Result<Self> {
        let registry = Arc::new(config.to_registry()?);
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let client = ResilientHttpClient::new(transport, config.retry_policy());

        tracing::debug!(
            "Cinema aggregator ready: {} providers, retry policy {:?}",
            registry.len(),
            client.policy()
        );

        Ok(Self::new(registry, client).with_deadline(config.deadline()))
    }
}

fn to_cinema(provider: &Provider, catalogue: &ProviderCatalogue, movie: &ProviderMovieRecord) -> Cinema {
    // 供應商自報的顯示名稱優先，空白時退回設定檔名稱
    let name = if catalogue.provider.trim().is_empty() {
        provider.name.clone()
    } else {
        catalogue.provider.clone()
    };

    Cinema {
        name,
        location: provider.location.clone(),
        showtime: chrono::Local::now().date_naive(),
        ticket_price: movie.price,
    }
}

fn log_summary(provider_movie_id: &str, lookups: &[ProviderLookup]) {
    let found = lookups.iter().filter(|l| l.outcome.cinema().is_some()).count();
    let failed = lookups.iter().filter(|l| l.outcome.is_failed()).count();
    let not_found = lookups.len() - found - failed;

    if !lookups.is_empty() && failed == lookups.len() {
        tracing::error!(
            "🚨 All {} cinema providers failed for movie {}",
            lookups.len(),
            provider_movie_id
        );
    }

    tracing::info!(
        "📊 Movie {}: consulted {} providers, {} found, {} not found, {} failed",
        provider_movie_id,
        lookups.len(),
        found,
        not_found,
        failed
    );
}

#[async_trait]
impl<T: HttpTransport> CinemaProvider for CinemaAggregator<T> {
    async fn get_cinemas_for_movie(&self, provider_movie_id: &str) -> Vec<Cinema> {
        CinemaAggregator::get_cinemas_for_movie(self, provider_movie_id).await
    }
}
