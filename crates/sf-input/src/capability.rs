//! Provider capabilities and contract variants

use bitflags::bitflags;

use crate::event::EventMask;

bitflags! {
    /// Features a provider statically declares support for
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Reports spatial poses for tracked body points
        const SPATIAL_TRANSFORM   = 0x01;
        /// Recognizes gameplay gestures on its own
        const GESTURE_RECOGNITION = 0x02;
        /// Tracks feet and leg gestures
        const LOWER_BODY          = 0x04;
        /// Accepts haptic feedback commands
        const HAPTICS             = 0x08;
        /// Reports per-point velocities
        const VELOCITY            = 0x10;
    }
}

/// The closed set of provider contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// Base contract only: lifecycle and tracking
    #[default]
    Base,
    /// Striking (boxing) vocabulary on top of the base contract
    Striking,
    /// Slicing (flow) vocabulary on top of the base contract
    Flow,
}

impl ProviderKind {
    /// Capabilities the contract itself adds on top of the provider's own
    pub fn implied_capabilities(&self) -> Capabilities {
        match self {
            ProviderKind::Base => Capabilities::empty(),
            ProviderKind::Striking => {
                Capabilities::GESTURE_RECOGNITION | Capabilities::LOWER_BODY
            }
            ProviderKind::Flow => Capabilities::GESTURE_RECOGNITION,
        }
    }

    /// Every event a provider of this kind may emit
    pub fn vocabulary(&self) -> EventMask {
        match self {
            ProviderKind::Base => EventMask::BASE,
            ProviderKind::Striking => EventMask::BASE | EventMask::POSTURE | EventMask::STRIKING,
            ProviderKind::Flow => EventMask::BASE | EventMask::POSTURE | EventMask::FLOW,
        }
    }

    /// Identifier used when a provider declares no name of its own
    pub fn fallback_name(&self) -> &'static str {
        match self {
            ProviderKind::Base => "InputProvider",
            ProviderKind::Striking => "StrikingProvider",
            ProviderKind::Flow => "FlowProvider",
        }
    }
}
