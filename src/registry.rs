use crate::adapters::{self, DebugAdapter};
use crate::config::ExtractionConfig;
use crate::extractors::PlanLimits;
use crate::traits::SiteAdapter;
use tracing::{debug, info};

/// Ordered set of site adapters. The first adapter whose pattern matches a URL wins.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SiteAdapter>>,
}

impl AdapterRegistry {
    /// Built-in adapters with default plan limits.
    pub fn new() -> Self {
        Self {
            adapters: adapters::builtin(PlanLimits::default()),
        }
    }

    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        let limits = PlanLimits::from(config);
        let mut registry = Self::empty();

        // Matches every URL, so it has to come first to be reached at all.
        if config.debug_adapter {
            info!("[REGISTRY] Debug adapter enabled, every page will be probed");
            registry.register(Box::new(DebugAdapter::new(limits)));
        }
        for adapter in adapters::builtin(limits) {
            registry.register(adapter);
        }
        registry
    }

    /// Appends `adapter`; it only wins URLs no earlier adapter claims.
    pub fn register(&mut self, adapter: Box<dyn SiteAdapter>) {
        debug!("[REGISTRY] Registered adapter: {}", adapter.name());
        self.adapters.push(adapter);
    }

    pub fn adapter_for_url(&self, url: &str) -> Option<&dyn SiteAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.can_handle(url))
            .map(|adapter| adapter.as_ref())
    }

    pub fn adapter_by_name(&self, name: &str) -> Option<&dyn SiteAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.name().eq_ignore_ascii_case(name))
            .map(|adapter| adapter.as_ref())
    }

    pub fn can_handle(&self, url: &str) -> bool {
        self.adapter_for_url(url).is_some()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &dyn SiteAdapter> {
        self.adapters.iter().map(|adapter| adapter.as_ref())
    }

    pub fn supported_sites(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|adapter| adapter.name()).collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
