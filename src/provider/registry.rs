//! @acp:module "Provider Registry"
//! @acp:summary "Registration-ordered name to provider map"
//! @acp:domain cli
//! @acp:layer service
//!
//! Provider registry: name -> provider, in registration order.

use indexmap::IndexMap;

use super::OutputProvider;

/// Registry of available output providers.
///
/// Built once in the entry point and read-only afterwards. Iteration order
/// is registration order, which keeps `--help` output reproducible.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: IndexMap<String, Box<dyn OutputProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the output of discovery.
    pub fn from_providers(providers: Vec<Box<dyn OutputProvider>>) -> Self {
        let mut registry = Self::new();
        for provider in providers {
            registry.register(provider);
        }
        registry
    }

    /// Register a provider under its own name.
    ///
    /// A later provider with the same name replaces the earlier one and keeps
    /// the earlier one's position.
    pub fn register(&mut self, provider: Box<dyn OutputProvider>) {
        let name = provider.name().to_string();
        if self.providers.insert(name.clone(), provider).is_some() {
            tracing::debug!("Provider '{}' registered twice, keeping the latest", name);
        }
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, name: &str) -> Option<&dyn OutputProvider> {
        self.providers.get(name).map(|p| p.as_ref())
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn OutputProvider> {
        self.providers.values().map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
