use super::exchangerate_host::ExchangeRateHostProvider;
use super::frankfurter::FrankfurterProvider;
use super::http;
use super::open_er_api::OpenErApiProvider;
use super::traits::RateProvider;
use crate::models::rate::RateSource;

/// Registry of the available exchange-rate providers.
///
/// Routes requests to the provider behind the selected `RateSource`.
/// Frankfurter doubles as the fallback for every other source.
pub struct RateProviderRegistry {
    providers: Vec<Box<dyn RateProvider>>,
}

impl RateProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all public providers pre-configured.
    pub fn new_with_defaults(http_timeout_secs: u64) -> Self {
        let client = http::build_client(http_timeout_secs);
        let mut registry = Self::new();
        registry.register(Box::new(
            FrankfurterProvider::new().with_client(client.clone()),
        ));
        registry.register(Box::new(
            ExchangeRateHostProvider::new().with_client(client.clone()),
        ));
        registry.register(Box::new(OpenErApiProvider::new().with_client(client)));
        registry
    }

    /// Register a provider. A later registration for the same source replaces the earlier one.
    pub fn register(&mut self, provider: Box<dyn RateProvider>) {
        let source = provider.source();
        self.providers.retain(|p| p.source() != source);
        self.providers.push(provider);
    }

    pub fn get(&self, source: RateSource) -> Option<&dyn RateProvider> {
        self.providers
            .iter()
            .find(|p| p.source() == source)
            .map(|p| p.as_ref())
    }

    /// Providers to try for `source`, in order: the selected one, then Frankfurter
    /// unless it was the selected one already.
    pub fn chain_for(&self, source: RateSource) -> Vec<&dyn RateProvider> {
        let mut chain: Vec<&dyn RateProvider> = Vec::new();
        if let Some(selected) = self.get(source) {
            chain.push(selected);
        }
        if source != RateSource::Frankfurter {
            if let Some(fallback) = self.get(RateSource::Frankfurter) {
                chain.push(fallback);
            }
        }
        chain
    }

    pub fn sources(&self) -> Vec<RateSource> {
        self.providers.iter().map(|p| p.source()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for RateProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
