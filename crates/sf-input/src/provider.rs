//! The provider contract
//!
//! Every input source (VR runtime, camera pose tracker, gamepad, mouse
//! and keyboard) implements [`InputProvider`]. Gameplay code never talks
//! to a provider directly; it registers providers with the
//! [`InputCoordinator`](crate::InputCoordinator) and listens to the
//! coordinator's events.
//!
//! Lifecycle methods have no default: a provider that does not implement
//! them does not compile. Query methods default to "no data" and
//! commands a provider does not support are logged and ignored.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sf_core::error::ProviderError;
use sf_core::provider_debug;

use crate::body::{BodyPart, BodyTrackFlags, Pose, Quat, Side, TrackingMode, Vec3};
use crate::capability::{Capabilities, ProviderKind};
use crate::event::EventMask;
use crate::signal::ProviderEvents;

/// Shared handle to a registered provider.
///
/// The caller constructs and owns the provider; the coordinator only
/// keeps a handle.
pub type SharedProvider = Arc<Mutex<dyn InputProvider>>;

/// Wrap a provider so it can be registered while the caller keeps a
/// typed handle to it.
pub fn shared<P: InputProvider + 'static>(provider: P) -> Arc<Mutex<P>> {
    Arc::new(Mutex::new(provider))
}

/// Contract every input provider satisfies
pub trait InputProvider: Send {
    /// Declared type name, e.g. `"VRProvider"`.
    ///
    /// Normalized into the provider identifier. Providers without a name
    /// fall back to the name of their contract variant.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Contract variant this provider implements
    fn kind(&self) -> ProviderKind {
        ProviderKind::Base
    }

    /// Capabilities of the provider itself, not counting those implied by
    /// its contract variant
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Individual events this provider may emit.
    ///
    /// Defaults to the whole vocabulary of its variant. Providers that
    /// only implement part of a vocabulary narrow it here.
    fn declared_events(&self) -> EventMask {
        self.kind().vocabulary()
    }

    /// Dispatch table the provider emits its events through
    fn events(&self) -> &ProviderEvents;

    /// Initialize the backing hardware with serialized settings.
    ///
    /// Must return quickly; slow initialization is reported later through
    /// the `Started`/`Failed` events.
    fn start(&mut self, settings: &str) -> Result<(), ProviderError>;

    /// Release resources. Safe to call when not started.
    fn stop(&mut self);

    /// Whether live data is flowing
    fn is_tracking(&self) -> bool;

    /// Called once per host frame while the provider is active
    fn update(&mut self, _delta: Duration) {}

    /// Static support for a capability.
    ///
    /// The contract variant contributes its own flags; everything else is
    /// answered by [`InputProvider::capabilities`].
    fn has_capability(&self, flag: Capabilities) -> bool {
        (self.kind().implied_capabilities() | self.capabilities()).contains(flag)
    }

    /// Best-effort haptic pulse
    fn trigger_haptic(&mut self, side: Side, intensity: f32, duration_ms: u32) {
        let _ = (side, intensity, duration_ms);
        provider_debug!("Haptics not supported by {}", provider_id(self));
    }

    /// Pose of a body point, `None` when the point is not tracked
    fn pose(&self, _part: BodyPart, _mode: TrackingMode) -> Option<Pose> {
        None
    }

    /// Linear velocity of a body point
    fn velocity(&self, _part: BodyPart) -> Option<Vec3> {
        None
    }

    /// Orientation of a body point
    fn rotation(&self, part: BodyPart) -> Option<Quat> {
        self.pose(part, TrackingMode::World3D).map(|pose| pose.rotation)
    }

    /// Confidence in `[0, 1]` of the data reported for a body point
    fn tracking_confidence(&self, _part: BodyPart) -> f32 {
        0.0
    }

    fn tracking_mode(&self) -> TrackingMode {
        TrackingMode::World3D
    }

    fn set_tracking_mode(&mut self, mode: TrackingMode) {
        provider_debug!("{} ignores tracking mode {:?}", provider_id(self), mode);
    }

    fn body_track_flags(&self) -> BodyTrackFlags {
        BodyTrackFlags::ALL
    }

    fn set_body_track_flags(&mut self, flags: BodyTrackFlags) {
        provider_debug!("{} ignores body track flags {:?}", provider_id(self), flags);
    }
}

/// Identifier of a provider: its declared name, or its variant's
/// fallback name, in lowercase-with-underscores form.
pub fn provider_id<P: InputProvider + ?Sized>(provider: &P) -> String {
    match provider.name() {
        Some(name) if !name.trim().is_empty() => normalize_identifier(name),
        _ => normalize_identifier(provider.kind().fallback_name()),
    }
}

/// Convert a type name to lowercase-with-underscores.
///
/// `"VRProvider"` becomes `"vr_provider"`, `"Camera Provider"` becomes
/// `"camera_provider"`.
pub fn normalize_identifier(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }

        out.extend(c.to_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}
