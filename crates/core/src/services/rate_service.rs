use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::config::DEFAULT_RATE_CACHE_TTL_SECS;
use crate::models::currency::CurrencyCode;
use crate::models::rate::{RateCache, RateOrigin, RateQuote, RateSource};
use crate::providers::registry::RateProviderRegistry;

/// Reachability of one provider, as reported by [`RateService::check_providers`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStatus {
    pub source: RateSource,
    pub available: bool,
    pub rate: Option<f64>,
    pub error: Option<String>,
}

/// Fetches PLN exchange rates with caching and graceful degradation.
///
/// Lookup order for a single currency:
/// 1. Fresh cache entry (younger than the TTL, 5 minutes by default).
/// 2. The selected provider, then Frankfurter if a different one was selected.
/// 3. The hard-coded default table.
///
/// Never fails: a network outage only changes the quote's `origin`.
pub struct RateService {
    registry: RateProviderRegistry,
    ttl: Duration,
}

impl RateService {
    pub fn new(registry: RateProviderRegistry) -> Self {
        Self::with_ttl(registry, DEFAULT_RATE_CACHE_TTL_SECS)
    }

    /// TTLs too large for `chrono::Duration` saturate to `Duration::MAX`.
    pub fn with_ttl(registry: RateProviderRegistry, ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self { registry, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_rate(
        &self,
        cache: &mut RateCache,
        currency: CurrencyCode,
        source: RateSource,
    ) -> RateQuote {
        self.get_rate_at(cache, currency, source, Utc::now()).await
    }

    /// [`RateService::get_rate`] with an explicit clock.
    pub async fn get_rate_at(
        &self,
        cache: &mut RateCache,
        currency: CurrencyCode,
        source: RateSource,
        now: DateTime<Utc>,
    ) -> RateQuote {
        if let Some(cached) = cache.get_fresh(currency, now, self.ttl) {
            return RateQuote {
                currency,
                rate: cached.rate,
                origin: RateOrigin::Cache,
                fetched_at: cached.fetched_at,
            };
        }

        match self.fetch_with_fallback(currency, source).await {
            Ok((rate, used)) => {
                cache.set(currency, rate, now);
                RateQuote {
                    currency,
                    rate,
                    origin: RateOrigin::Provider(used),
                    fetched_at: now,
                }
            }
            Err(e) => {
                let rate = currency.default_rate();
                warn!(%currency, error = %e, rate, "all rate providers failed, using default rate");
                RateQuote {
                    currency,
                    rate,
                    origin: RateOrigin::Default,
                    fetched_at: now,
                }
            }
        }
    }

    /// Rates for several currencies. One batched request to the selected provider
    /// first; any currency it did not return goes through [`RateService::get_rate_at`].
    pub async fn get_rates(
        &self,
        cache: &mut RateCache,
        currencies: &[CurrencyCode],
        source: RateSource,
    ) -> HashMap<CurrencyCode, RateQuote> {
        let now = Utc::now();
        let mut quotes = HashMap::new();

        let missing: Vec<CurrencyCode> = currencies
            .iter()
            .copied()
            .filter(|c| cache.get_fresh(*c, now, self.ttl).is_none())
            .collect();

        if !missing.is_empty() {
            if let Some(provider) = self.registry.get(source) {
                match provider.fetch_rates(&missing).await {
                    Ok(rates) => {
                        info!(provider = provider.name(), count = rates.len(), "fetched batch rates");
                        let usable = rates
                            .into_iter()
                            .filter(|(c, r)| missing.contains(c) && r.is_finite() && *r > 0.0);
                        for (currency, rate) in usable {
                            cache.set(currency, rate, now);
                            quotes.insert(
                                currency,
                                RateQuote {
                                    currency,
                                    rate,
                                    origin: RateOrigin::Provider(source),
                                    fetched_at: now,
                                },
                            );
                        }
                    }
                    Err(e) => {
                        warn!(provider = provider.name(), error = %e, "batch rate fetch failed, fetching individually");
                    }
                }
            }
        }

        for &currency in currencies {
            if !quotes.contains_key(&currency) {
                let quote = self.get_rate_at(cache, currency, source, now).await;
                quotes.insert(currency, quote);
            }
        }

        quotes
    }

    /// Probe every registered provider for `currency`, bypassing the cache.
    pub async fn check_providers(&self, currency: CurrencyCode) -> Vec<ProviderStatus> {
        let mut statuses = Vec::new();
        for source in self.registry.sources() {
            let Some(provider) = self.registry.get(source) else {
                continue;
            };
            let status = match provider.fetch_rate(currency).await {
                Ok(rate) => ProviderStatus {
                    source,
                    available: true,
                    rate: Some(rate),
                    error: None,
                },
                Err(e) => ProviderStatus {
                    source,
                    available: false,
                    rate: None,
                    error: Some(e.to_string()),
                },
            };
            statuses.push(status);
        }
        statuses
    }

    /// Internal: selected provider, then the Frankfurter fallback.
    /// Returns the rate and the source that actually produced it.
    async fn fetch_with_fallback(
        &self,
        currency: CurrencyCode,
        source: RateSource,
    ) -> Result<(f64, RateSource), CoreError> {
        let chain = self.registry.chain_for(source);
        let mut last_error = None;

        for provider in chain {
            match provider.fetch_rate(currency).await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => {
                    info!(provider = provider.name(), %currency, rate, "fetched exchange rate");
                    return Ok((rate, provider.source()));
                }
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Invalid rate {rate} for PLN → {currency}"),
                    });
                }
                Err(e) => {
                    warn!(provider = provider.name(), %currency, error = %e, "rate provider failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::Api {
            provider: source.label().to_string(),
            message: "No rate provider registered".into(),
        }))
    }
}
