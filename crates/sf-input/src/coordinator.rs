//! Provider coordinator
//!
//! Owns the registered providers, keeps at most one of them active and
//! relays the active provider's events through its own dispatch table.
//!
//! Invariants:
//! - provider identifiers are unique within the registry
//! - the active provider, if any, is registered; it is started unless
//!   its replacement failed to start
//! - a provider is only started after the previously active one was
//!   stopped, so at most one provider is ever started by the coordinator
//! - only events from the active provider (or the one being activated)
//!   reach the coordinator's listeners

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sf_core::config::InputConfig;
use sf_core::error::CoordinatorError;
use sf_core::{coordinator_debug, coordinator_trace};
use tracing::{info, warn};

use crate::body::{BodyPart, BodyTrackFlags, Pose, Side, TrackingMode};
use crate::capability::{Capabilities, ProviderKind};
use crate::event::{EventCategory, EventMask, ProviderEvent};
use crate::provider::{provider_id, InputProvider, SharedProvider};
use crate::registry::{ProviderRegistry, RegistryEntry};
use crate::settings::ProviderSettings;
use crate::signal::{EventEmitter, ProviderEvents, SubscriptionId};

/// Notifications about the coordinator's own state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    ProviderRegistered(String),
    ProviderUnregistered(String),
    /// The active slot changed; `current` is `None` when it was cleared
    ActiveProviderChanged {
        previous: Option<String>,
        current: Option<String>,
    },
}

/// State shared with the relay listeners installed on providers
#[derive(Debug, Default)]
struct Relay {
    /// Provider whose events are forwarded
    connected: Mutex<Option<String>>,
    events: ProviderEvents,
}

impl Relay {
    fn connect(&self, id: Option<String>) {
        *self.connected.lock() = id;
    }

    fn forward(&self, source: &str, relayed: EventMask, event: &ProviderEvent) {
        if !relayed.contains(event.mask()) {
            return;
        }
        let connected = self.connected.lock().as_deref() == Some(source);
        if !connected {
            coordinator_trace!("Ignoring {:?} from inactive provider {}", event.mask(), source);
            return;
        }
        coordinator_trace!("Relaying {:?} from {}", event.mask(), source);
        self.events.emit(event);
    }
}

/// Registers providers, selects the active one and relays its events
pub struct InputCoordinator {
    registry: ProviderRegistry,
    active: Option<String>,
    /// The active provider was stopped by a failed activation
    displaced: bool,
    priority: Vec<String>,
    auto_switch: bool,
    tracking_mode: TrackingMode,
    body_track: BodyTrackFlags,
    relay: Arc<Relay>,
    notifications: EventEmitter<CoordinatorEvent>,
}

impl std::fmt::Debug for InputCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputCoordinator")
            .field("registered", &self.registry.ids())
            .field("active", &self.active)
            .field("displaced", &self.displaced)
            .field("priority", &self.priority)
            .field("auto_switch", &self.auto_switch)
            .finish()
    }
}

impl InputCoordinator {
    /// Coordinator with auto-switching enabled and an empty priority list
    pub fn new() -> Self {
        Self {
            registry: ProviderRegistry::new(),
            active: None,
            displaced: false,
            priority: Vec::new(),
            auto_switch: true,
            tracking_mode: TrackingMode::World3D,
            body_track: BodyTrackFlags::ALL,
            relay: Arc::new(Relay::default()),
            notifications: EventEmitter::new(),
        }
    }

    /// Coordinator configured from the `[input]` section
    pub fn from_config(config: &InputConfig) -> Self {
        let mut coordinator = Self::new();
        coordinator.priority = config.priority.clone();
        coordinator.auto_switch = config.auto_switch;
        coordinator.tracking_mode = config.tracking_mode;
        coordinator.body_track = config.body_track.iter().copied().collect();
        coordinator
    }

    // ---------------------------------------------------------------
    // Event surface
    // ---------------------------------------------------------------

    /// Relayed provider events. Gameplay code subscribes here once and
    /// keeps receiving events across provider swaps.
    ///
    /// Listeners run while the emitting provider is locked and must not
    /// call back into it.
    pub fn events(&self) -> &ProviderEvents {
        &self.relay.events
    }

    /// Registration and activation notifications
    pub fn notifications(&self) -> &EventEmitter<CoordinatorEvent> {
        &self.notifications
    }

    // ---------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------

    /// Register a provider with empty settings
    pub fn register_provider(&mut self, provider: SharedProvider) -> Result<(), CoordinatorError> {
        self.register_provider_with_settings(provider, ProviderSettings::empty())
    }

    /// Register a provider.
    ///
    /// The provider is started with the probe marker and immediately
    /// stopped; a provider that cannot start is not registered. On any
    /// failure the registry is left untouched.
    pub fn register_provider_with_settings(
        &mut self,
        provider: SharedProvider,
        settings: ProviderSettings,
    ) -> Result<(), CoordinatorError> {
        let (id, kind, capabilities, declared) = {
            let guard = provider.lock();
            (
                provider_id(&*guard),
                guard.kind(),
                capability_set(&*guard),
                guard.declared_events(),
            )
        };

        if self.registry.contains(&id) {
            warn!("Provider {} is already registered", id);
            return Err(CoordinatorError::DuplicateProvider(id));
        }

        {
            let mut guard = provider.lock();
            if let Err(source) = guard.start(&ProviderSettings::probe().to_json()) {
                warn!("Provider {} failed its startup probe: {}", id, source);
                return Err(CoordinatorError::ProbeFailed { id, source });
            }
            guard.stop();
        }

        let relayed = EventMask::BASE | (declared & kind.vocabulary());
        let subscriptions = self.attach_relay(&provider, &id, relayed);

        self.registry.insert(RegistryEntry {
            id: id.clone(),
            provider,
            settings,
            kind,
            capabilities,
            relayed,
            subscriptions,
        })?;

        info!("Registered provider {} ({:?}, {:?})", id, kind, capabilities);
        self.notifications
            .emit(&CoordinatorEvent::ProviderRegistered(id));

        if self.auto_switch {
            self.evaluate_priority();
        }
        Ok(())
    }

    /// Remove a provider, stopping it first if it is active.
    ///
    /// Unknown identifiers are logged and ignored.
    pub fn unregister_provider(&mut self, id: &str) {
        if !self.registry.contains(id) {
            warn!("Cannot unregister unknown provider {}", id);
            return;
        }

        let previous = if self.active.as_deref() == Some(id) {
            self.stop_active_inner()
        } else {
            None
        };

        if let Some(entry) = self.registry.remove(id) {
            detach_relay(&entry);
        }

        info!("Unregistered provider {}", id);
        if previous.is_some() {
            self.notify_active_changed(previous, None);
        }
        self.notifications
            .emit(&CoordinatorEvent::ProviderUnregistered(id.to_string()));

        if self.auto_switch {
            self.evaluate_priority();
        }
    }

    /// Subscribe the relay to the provider's event table.
    ///
    /// Lifecycle and tracking are always relayed; posture and gesture
    /// categories only when the provider declares at least one of their
    /// events.
    fn attach_relay(
        &self,
        provider: &SharedProvider,
        id: &str,
        relayed: EventMask,
    ) -> Vec<(EventCategory, SubscriptionId)> {
        let guard = provider.lock();
        let events = guard.events();

        EventCategory::ALL
            .iter()
            .filter(|category| relayed.intersects(category.mask()))
            .map(|&category| {
                let relay = Arc::clone(&self.relay);
                let source = id.to_string();
                let sub = events.subscribe(category, move |event| {
                    relay.forward(&source, relayed, event)
                });
                coordinator_debug!("Relaying {:?} events from {}", category, id);
                (category, sub)
            })
            .collect()
    }

    // ---------------------------------------------------------------
    // Activation
    // ---------------------------------------------------------------

    /// Make a registered provider the active one.
    ///
    /// The currently active provider is stopped before the candidate is
    /// started. If the candidate fails to start, the active slot keeps
    /// its previous value but that provider is not restarted.
    pub fn set_active_provider(&mut self, id: &str) -> Result<(), CoordinatorError> {
        let Some(entry) = self.registry.get(id) else {
            warn!("Cannot activate unknown provider {}", id);
            return Err(CoordinatorError::UnknownProvider(id.to_string()));
        };

        if self.active.as_deref() == Some(id) && !self.displaced {
            coordinator_debug!("Provider {} is already active", id);
            return Ok(());
        }

        let provider = Arc::clone(&entry.provider);
        let settings = entry.settings.to_json();

        let previous = self.stop_active_inner();

        self.relay.connect(Some(id.to_string()));
        let started = {
            let mut guard = provider.lock();
            guard.set_tracking_mode(self.tracking_mode);
            guard.set_body_track_flags(self.body_track);
            guard.start(&settings)
        };

        match started {
            Ok(()) => {
                self.active = Some(id.to_string());
                self.displaced = false;
                info!("Active provider is now {}", id);
                self.notify_active_changed(previous, Some(id.to_string()));
                Ok(())
            }
            Err(source) => {
                self.relay.connect(previous.clone());
                self.displaced = previous.is_some();
                self.active = previous;
                warn!("Failed to start provider {}: {}", id, source);
                Err(CoordinatorError::ActivationFailed {
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    /// Stop the active provider, if any
    pub fn stop_active_provider(&mut self) {
        if let Some(previous) = self.stop_active_inner() {
            self.notify_active_changed(Some(previous), None);
        }
    }

    /// Stop and clear the active slot without notifying
    fn stop_active_inner(&mut self) -> Option<String> {
        let id = self.active.take()?;
        self.displaced = false;
        if let Some(entry) = self.registry.get(&id) {
            entry.provider.lock().stop();
        }
        self.relay.connect(None);
        info!("Stopped provider {}", id);
        Some(id)
    }

    fn notify_active_changed(&self, previous: Option<String>, current: Option<String>) {
        self.notifications
            .emit(&CoordinatorEvent::ActiveProviderChanged { previous, current });
    }

    /// Pick the active provider from the priority list.
    ///
    /// The first registered identifier in priority order wins; if it is
    /// already active nothing changes. A candidate that fails to start is
    /// skipped, and the provider it displaced is released from the active
    /// slot so the next candidate can take over. When no candidate could
    /// be activated and nothing is active, registered providers are tried
    /// in registration order.
    pub fn evaluate_priority(&mut self) {
        let mut failed = Vec::new();

        for id in self.priority.clone() {
            if !self.registry.contains(&id) {
                continue;
            }
            if self.active.as_deref() == Some(id.as_str()) && !self.displaced {
                return;
            }
            match self.set_active_provider(&id) {
                Ok(()) => return,
                Err(_) => {
                    self.release_displaced();
                    failed.push(id);
                }
            }
        }

        if self.active.is_some() && !self.displaced {
            return;
        }

        for id in self.registry.ids() {
            if failed.contains(&id) {
                continue;
            }
            coordinator_debug!("Falling back to provider {}", id);
            if self.set_active_provider(&id).is_ok() {
                return;
            }
        }
    }

    /// Clear an active slot whose provider was stopped by a failed
    /// activation
    fn release_displaced(&mut self) {
        self.displaced = false;
        if let Some(previous) = self.active.take() {
            self.relay.connect(None);
            coordinator_debug!("Releasing stopped provider {}", previous);
            self.notify_active_changed(Some(previous), None);
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn provider(&self, id: &str) -> Option<SharedProvider> {
        self.registry.get(id).map(|entry| Arc::clone(&entry.provider))
    }

    /// Registered identifiers, in registration order
    pub fn registered_providers(&self) -> Vec<String> {
        self.registry.ids()
    }

    pub fn active_provider(&self) -> Option<SharedProvider> {
        self.active.as_deref().and_then(|id| self.provider(id))
    }

    pub fn active_provider_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Capabilities computed when the provider was registered
    pub fn capabilities_of(&self, id: &str) -> Option<Capabilities> {
        self.registry.get(id).map(|entry| entry.capabilities)
    }

    pub fn kind_of(&self, id: &str) -> Option<ProviderKind> {
        self.registry.get(id).map(|entry| entry.kind)
    }

    /// Entry of the active provider, unless a failed activation left it
    /// stopped in the slot
    fn live_active(&self) -> Option<&RegistryEntry> {
        if self.displaced {
            return None;
        }
        self.active.as_deref().and_then(|id| self.registry.get(id))
    }

    fn live_provider(&self) -> Option<SharedProvider> {
        self.live_active().map(|entry| Arc::clone(&entry.provider))
    }

    /// False when nothing is active or the active provider is stopped
    pub fn active_provider_has_capability(&self, flag: Capabilities) -> bool {
        self.live_active()
            .is_some_and(|entry| entry.capabilities.contains(flag))
    }

    pub fn any_provider_has_capability(&self, flag: Capabilities) -> bool {
        self.registry
            .iter()
            .any(|entry| entry.capabilities.contains(flag))
    }

    /// Whether the active provider reports live data
    pub fn is_tracking(&self) -> bool {
        match self.live_provider() {
            Some(provider) => {
                let tracking = provider.lock().is_tracking();
                tracking
            }
            None => false,
        }
    }

    /// Pose of a body point from the active provider, in the coordinator's
    /// tracking mode
    pub fn active_pose(&self, part: BodyPart) -> Option<Pose> {
        let provider = self.live_provider()?;
        let pose = provider.lock().pose(part, self.tracking_mode);
        pose
    }

    // ---------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------

    pub fn priority_order(&self) -> &[String] {
        &self.priority
    }

    /// Replace the priority list. Takes effect at the next evaluation.
    pub fn set_priority_order(&mut self, priority: Vec<String>) {
        self.priority = priority;
    }

    pub fn is_auto_switch(&self) -> bool {
        self.auto_switch
    }

    pub fn set_auto_switch(&mut self, enabled: bool) {
        self.auto_switch = enabled;
    }

    pub fn tracking_mode(&self) -> TrackingMode {
        self.tracking_mode
    }

    /// Remember the mode and forward it to the active provider
    pub fn set_tracking_mode(&mut self, mode: TrackingMode) {
        self.tracking_mode = mode;
        if let Some(provider) = self.live_provider() {
            provider.lock().set_tracking_mode(mode);
        }
    }

    pub fn body_track_flags(&self) -> BodyTrackFlags {
        self.body_track
    }

    /// Remember the flags and forward them to the active provider
    pub fn set_body_track_flags(&mut self, flags: BodyTrackFlags) {
        self.body_track = flags;
        if let Some(provider) = self.live_provider() {
            provider.lock().set_body_track_flags(flags);
        }
    }

    // ---------------------------------------------------------------
    // Frame loop
    // ---------------------------------------------------------------

    /// Drive the active provider for one host frame
    pub fn update(&mut self, delta: Duration) {
        if let Some(provider) = self.live_provider() {
            provider.lock().update(delta);
        }
    }

    /// Forward a haptic pulse to the active provider if it supports it
    pub fn trigger_haptic(&mut self, side: Side, intensity: f32, duration_ms: u32) {
        if !self.active_provider_has_capability(Capabilities::HAPTICS) {
            coordinator_debug!("No active provider with haptics");
            return;
        }
        if let Some(provider) = self.live_provider() {
            provider
                .lock()
                .trigger_haptic(side, intensity.clamp(0.0, 1.0), duration_ms);
        }
    }

    /// Stop the active provider, stop every registered provider and empty
    /// the registry. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        let previous = self.stop_active_inner();

        let entries = self.registry.drain();
        for entry in &entries {
            entry.provider.lock().stop();
            detach_relay(entry);
        }

        if !entries.is_empty() || previous.is_some() {
            info!("Coordinator shut down ({} providers released)", entries.len());
        }
        if previous.is_some() {
            self.notify_active_changed(previous, None);
        }
    }
}

impl Default for InputCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Capabilities answered by the provider, one flag at a time
fn capability_set<P: InputProvider + ?Sized>(provider: &P) -> Capabilities {
    Capabilities::all()
        .iter()
        .filter(|&flag| provider.has_capability(flag))
        .fold(Capabilities::empty(), |acc, flag| acc | flag)
}

fn detach_relay(entry: &RegistryEntry) {
    let guard = entry.provider.lock();
    for &(category, sub) in &entry.subscriptions {
        guard.events().unsubscribe(category, sub);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{TrackingFrame, Vec3};
    use crate::provider::shared;
    use crate::providers::{NullProvider, SimulatedProvider};

    fn names(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn register_and_lookup() {
        let mut coordinator = InputCoordinator::new();
        coordinator.set_auto_switch(false);

        let keyboard = shared(SimulatedProvider::new("Keyboard"));
        coordinator.register_provider(keyboard.clone()).unwrap();

        assert_eq!(coordinator.registered_providers(), vec!["keyboard"]);
        assert!(coordinator.provider("keyboard").is_some());
        assert!(coordinator.active_provider().is_none());
        assert!(!keyboard.lock().is_started());
        assert!(keyboard.lock().was_probed());
    }

    #[test]
    fn auto_switch_follows_priority() {
        let mut coordinator = InputCoordinator::new();
        coordinator.set_priority_order(names(&["gamepad", "keyboard"]));

        coordinator
            .register_provider(shared(SimulatedProvider::new("Keyboard")))
            .unwrap();
        assert_eq!(coordinator.active_provider_id(), Some("keyboard"));

        coordinator
            .register_provider(shared(SimulatedProvider::new("Gamepad")))
            .unwrap();
        assert_eq!(coordinator.active_provider_id(), Some("gamepad"));
    }

    #[test]
    fn failed_activation_keeps_slot() {
        let mut coordinator = InputCoordinator::new();
        coordinator.set_auto_switch(false);

        let keyboard = shared(SimulatedProvider::new("Keyboard"));
        let vr = shared(SimulatedProvider::new("Vr"));
        coordinator.register_provider(keyboard.clone()).unwrap();
        coordinator.register_provider(vr.clone()).unwrap();

        coordinator.set_active_provider("keyboard").unwrap();
        vr.lock().set_fail_start(true);

        let err = coordinator.set_active_provider("vr").unwrap_err();
        assert!(matches!(err, CoordinatorError::ActivationFailed { .. }));
        assert_eq!(coordinator.active_provider_id(), Some("keyboard"));
        assert!(!keyboard.lock().is_started());
        assert!(!coordinator.is_tracking());

        // re-selecting the displaced provider restarts it
        vr.lock().set_fail_start(false);
        coordinator.set_auto_switch(true);
        coordinator.set_priority_order(names(&["vr"]));
        coordinator.evaluate_priority();
        assert_eq!(coordinator.active_provider_id(), Some("vr"));
        assert!(vr.lock().is_started());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut coordinator = InputCoordinator::new();
        assert_eq!(
            coordinator.set_active_provider("ghost"),
            Err(CoordinatorError::UnknownProvider("ghost".to_string()))
        );
        coordinator.unregister_provider("ghost");
        assert!(coordinator.registered_providers().is_empty());
    }

    #[test]
    fn settings_are_forwarded_on_activation() {
        let mut coordinator = InputCoordinator::new();
        let camera = shared(SimulatedProvider::new("Camera"));
        coordinator
            .register_provider_with_settings(
                camera.clone(),
                ProviderSettings::from_value(serde_json::json!({ "confidence": 0.25 })),
            )
            .unwrap();

        camera.lock().push_frame(
            TrackingFrame::default().with(BodyPart::Head, Pose::at(Vec3::new(0.0, 1.6, 0.0))),
        );
        coordinator.update(Duration::from_millis(16));

        assert_eq!(camera.lock().tracking_confidence(BodyPart::Head), 0.25);
        assert!(coordinator.active_pose(BodyPart::Head).is_some());
        assert!(coordinator.is_tracking());
    }

    #[test]
    fn tracking_mode_is_applied_to_active_and_new_providers() {
        let mut coordinator = InputCoordinator::new();
        coordinator.set_tracking_mode(TrackingMode::Screen2D);

        let camera = shared(SimulatedProvider::new("Camera"));
        coordinator.register_provider(camera.clone()).unwrap();
        assert_eq!(camera.lock().tracking_mode(), TrackingMode::Screen2D);

        coordinator.set_body_track_flags(BodyTrackFlags::HANDS);
        assert_eq!(camera.lock().body_track_flags(), BodyTrackFlags::HANDS);
    }

    #[test]
    fn drop_shuts_down() {
        let null = shared(NullProvider::named("Null"));
        {
            let mut coordinator = InputCoordinator::new();
            coordinator.register_provider(null.clone()).unwrap();
            assert!(null.lock().is_started());
        }
        assert!(!null.lock().is_started());
        assert_eq!(null.lock().events().total_listeners(), 0);
    }
}
