//! Events emitted by input providers

use bitflags::bitflags;

use crate::body::TrackingFrame;
use crate::flow::FlowEvent;
use crate::striking::StrikeEvent;

/// Every event a provider can emit.
///
/// The coordinator relays these verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// Hardware is up and data will start flowing
    Started,
    /// Provider released its resources
    Stopped,
    /// Runtime failure such as a disconnect
    Failed { reason: String },
    /// Combined poses of all five body points for one tick
    TrackingUpdated(TrackingFrame),
    /// Stance, location and stance height changes
    Posture(PostureEvent),
    Strike(StrikeEvent),
    Flow(FlowEvent),
}

impl ProviderEvent {
    /// Shorthand for [`ProviderEvent::Failed`]
    pub fn failed(reason: impl Into<String>) -> Self {
        ProviderEvent::Failed {
            reason: reason.into(),
        }
    }

    /// Dispatch category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            ProviderEvent::Started | ProviderEvent::Stopped | ProviderEvent::Failed { .. } => {
                EventCategory::Lifecycle
            }
            ProviderEvent::TrackingUpdated(_) => EventCategory::Tracking,
            ProviderEvent::Posture(_) => EventCategory::Posture,
            ProviderEvent::Strike(_) => EventCategory::Striking,
            ProviderEvent::Flow(_) => EventCategory::Flow,
        }
    }

    /// The single mask bit identifying this event
    pub fn mask(&self) -> EventMask {
        match self {
            ProviderEvent::Started => EventMask::STARTED,
            ProviderEvent::Stopped => EventMask::STOPPED,
            ProviderEvent::Failed { .. } => EventMask::FAILED,
            ProviderEvent::TrackingUpdated(_) => EventMask::TRACKING_UPDATED,
            ProviderEvent::Posture(event) => event.mask(),
            ProviderEvent::Strike(event) => event.mask(),
            ProviderEvent::Flow(event) => event.mask(),
        }
    }
}

/// Boxing stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stance {
    /// Left foot forward
    Orthodox,
    /// Right foot forward
    Southpaw,
}

/// Horizontal zone of the play space the player stands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationZone {
    Left,
    Center,
    Right,
}

/// Vertical stance of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StanceHeight {
    Standing,
    Crouching,
    Ducking,
}

/// Events shared by the striking and flow contracts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostureEvent {
    StanceChanged(Stance),
    LocationChanged(LocationZone),
    StanceHeightChanged(StanceHeight),
}

impl PostureEvent {
    pub fn mask(&self) -> EventMask {
        match self {
            PostureEvent::StanceChanged(_) => EventMask::STANCE,
            PostureEvent::LocationChanged(_) => EventMask::LOCATION,
            PostureEvent::StanceHeightChanged(_) => EventMask::STANCE_HEIGHT,
        }
    }
}

/// Dispatch categories, one listener table each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Lifecycle,
    Tracking,
    Posture,
    Striking,
    Flow,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Lifecycle,
        EventCategory::Tracking,
        EventCategory::Posture,
        EventCategory::Striking,
        EventCategory::Flow,
    ];

    /// All events belonging to this category
    pub fn mask(&self) -> EventMask {
        match self {
            EventCategory::Lifecycle => EventMask::LIFECYCLE,
            EventCategory::Tracking => EventMask::TRACKING_UPDATED,
            EventCategory::Posture => EventMask::POSTURE,
            EventCategory::Striking => EventMask::STRIKING,
            EventCategory::Flow => EventMask::FLOW,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            EventCategory::Lifecycle => 0,
            EventCategory::Tracking => 1,
            EventCategory::Posture => 2,
            EventCategory::Striking => 3,
            EventCategory::Flow => 4,
        }
    }
}

bitflags! {
    /// Individual events a provider declares it can emit.
    ///
    /// Paired left/right events share one bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const STARTED          = 1 << 0;
        const STOPPED          = 1 << 1;
        const FAILED           = 1 << 2;
        const TRACKING_UPDATED = 1 << 3;

        const STANCE           = 1 << 4;
        const LOCATION         = 1 << 5;
        const STANCE_HEIGHT    = 1 << 6;

        const PUNCH            = 1 << 7;
        const UPPERCUT         = 1 << 8;
        const CROSS            = 1 << 9;
        const HOOK             = 1 << 10;
        const BLOCK            = 1 << 11;
        const WEAVE            = 1 << 12;
        const DUCK_WEAVE       = 1 << 13;
        const KNEE_STRIKE      = 1 << 14;
        const LEG_LIFT         = 1 << 15;
        const RUN              = 1 << 16;

        const SLICE            = 1 << 17;

        const LIFECYCLE = Self::STARTED.bits() | Self::STOPPED.bits() | Self::FAILED.bits();
        const BASE = Self::LIFECYCLE.bits() | Self::TRACKING_UPDATED.bits();
        const POSTURE = Self::STANCE.bits() | Self::LOCATION.bits() | Self::STANCE_HEIGHT.bits();
        const STRIKING = Self::PUNCH.bits()
            | Self::UPPERCUT.bits()
            | Self::CROSS.bits()
            | Self::HOOK.bits()
            | Self::BLOCK.bits()
            | Self::WEAVE.bits()
            | Self::DUCK_WEAVE.bits()
            | Self::KNEE_STRIKE.bits()
            | Self::LEG_LIFT.bits()
            | Self::RUN.bits();
        const FLOW = Self::SLICE.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Side;

    #[test]
    fn events_map_to_their_category() {
        assert_eq!(ProviderEvent::Started.category(), EventCategory::Lifecycle);
        assert_eq!(
            ProviderEvent::failed("unplugged").category(),
            EventCategory::Lifecycle
        );
        assert_eq!(
            ProviderEvent::Strike(StrikeEvent::BlockStart).category(),
            EventCategory::Striking
        );
    }

    #[test]
    fn every_event_bit_lies_in_its_category_mask() {
        let events = [
            ProviderEvent::Stopped,
            ProviderEvent::TrackingUpdated(TrackingFrame::default()),
            ProviderEvent::Posture(PostureEvent::StanceChanged(Stance::Southpaw)),
            ProviderEvent::Strike(StrikeEvent::punch(Side::Left, 0.5)),
            ProviderEvent::Flow(FlowEvent::slice(crate::flow::SliceDirection::Up, 90.0)),
        ];
        for event in events {
            assert!(event.category().mask().contains(event.mask()));
        }
    }

    #[test]
    fn category_masks_are_disjoint() {
        let mut seen = EventMask::empty();
        for category in EventCategory::ALL {
            assert!(!seen.intersects(category.mask()));
            seen |= category.mask();
        }
        assert_eq!(seen, EventMask::all());
    }
}
