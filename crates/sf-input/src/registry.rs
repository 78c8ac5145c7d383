//! Registered providers, in registration order

use indexmap::IndexMap;
use sf_core::error::CoordinatorError;

use crate::capability::{Capabilities, ProviderKind};
use crate::event::{EventCategory, EventMask};
use crate::provider::SharedProvider;
use crate::settings::ProviderSettings;
use crate::signal::SubscriptionId;

/// One registered provider and what the coordinator knows about it
pub struct RegistryEntry {
    pub id: String,
    pub provider: SharedProvider,
    pub settings: ProviderSettings,
    pub kind: ProviderKind,
    /// Capabilities computed once at registration
    pub capabilities: Capabilities,
    /// Events relayed from this provider
    pub relayed: EventMask,
    /// Relay subscriptions held on the provider's event table
    pub(crate) subscriptions: Vec<(EventCategory, SubscriptionId)>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("capabilities", &self.capabilities)
            .field("relayed", &self.relayed)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// Providers keyed by identifier
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Add an entry; duplicates are rejected without touching the registry
    pub fn insert(&mut self, entry: RegistryEntry) -> Result<(), CoordinatorError> {
        if self.entries.contains_key(&entry.id) {
            return Err(CoordinatorError::DuplicateProvider(entry.id));
        }
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    /// Remove an entry, keeping the order of the others
    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry> {
        self.entries.shift_remove(id)
    }

    /// Identifiers in registration order
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry, in registration order
    pub fn drain(&mut self) -> Vec<RegistryEntry> {
        self.entries.drain(..).map(|(_, entry)| entry).collect()
    }
}
