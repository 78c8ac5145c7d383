//! Null provider (no tracking data)

use sf_core::error::ProviderError;

use crate::provider::InputProvider;
use crate::signal::ProviderEvents;

/// Base-contract provider that starts successfully and never tracks
#[derive(Debug, Default)]
pub struct NullProvider {
    name: Option<String>,
    events: ProviderEvents,
    pub(crate) started: bool,
}

impl NullProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Null provider with a declared type name
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl InputProvider for NullProvider {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn events(&self) -> &ProviderEvents {
        &self.events
    }

    fn start(&mut self, _settings: &str) -> Result<(), ProviderError> {
        self.started = true;
        self.events.emit_started();
        Ok(())
    }

    fn stop(&mut self) {
        if self.started {
            self.started = false;
            self.events.emit_stopped();
        }
    }

    fn is_tracking(&self) -> bool {
        false
    }
}
