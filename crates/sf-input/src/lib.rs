//! Input abstraction for strikeflow
//!
//! Decouples gameplay from the sensing hardware:
//! - The provider contract every driver implements (`provider`)
//! - Spatial types and tracking frames (`body`)
//! - Capability flags and contract variants (`capability`)
//! - Event vocabularies: base (`event`), striking and flow
//! - The coordinator that registers, selects and relays providers

// Contract
pub mod body;
pub mod capability;
pub mod event;
pub mod flow;
pub mod provider;
pub mod settings;
pub mod signal;
pub mod striking;

// Coordination
pub mod coordinator;
pub mod registry;

// Reference providers
pub mod providers;

// Re-exports for convenient access
pub use body::{BodyPart, BodyTrackFlags, Pose, Quat, Side, TrackingFrame, TrackingMode, Vec3};
pub use capability::{Capabilities, ProviderKind};
pub use event::{
    EventCategory, EventMask, LocationZone, PostureEvent, ProviderEvent, Stance, StanceHeight,
};
pub use flow::{FlowEvent, SliceDirection};
pub use provider::{normalize_identifier, provider_id, shared, InputProvider, SharedProvider};
pub use settings::ProviderSettings;
pub use signal::{EventEmitter, ProviderEvents, SubscriptionId};
pub use striking::StrikeEvent;

pub use coordinator::{CoordinatorEvent, InputCoordinator};
pub use registry::{ProviderRegistry, RegistryEntry};

pub use providers::{NullProvider, SimulatedProvider};
