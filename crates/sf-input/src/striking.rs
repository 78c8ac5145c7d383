//! Striking (boxing) contract vocabulary
//!
//! A striking provider reports punches, defensive moves and lower-body
//! gestures in addition to the base tracking events, plus the shared
//! posture events. Powers are normalized to `[0, 1]`.

use crate::body::Side;
use crate::event::{EventMask, ProviderEvent};

/// Gesture recognized by a striking provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeEvent {
    Punch { side: Side, power: f32 },
    Uppercut { side: Side, power: f32 },
    Cross { side: Side, power: f32 },
    Hook { side: Side, power: f32 },
    BlockStart,
    BlockEnd,
    Weave(Side),
    DuckWeave(Side),
    KneeStrike { side: Side, power: f32 },
    LegLift(Side),
    RunStart,
    RunEnd,
}

fn clamp_power(power: f32) -> f32 {
    if power.is_nan() {
        0.0
    } else {
        power.clamp(0.0, 1.0)
    }
}

impl StrikeEvent {
    pub fn punch(side: Side, power: f32) -> Self {
        StrikeEvent::Punch {
            side,
            power: clamp_power(power),
        }
    }

    pub fn uppercut(side: Side, power: f32) -> Self {
        StrikeEvent::Uppercut {
            side,
            power: clamp_power(power),
        }
    }

    pub fn cross(side: Side, power: f32) -> Self {
        StrikeEvent::Cross {
            side,
            power: clamp_power(power),
        }
    }

    pub fn hook(side: Side, power: f32) -> Self {
        StrikeEvent::Hook {
            side,
            power: clamp_power(power),
        }
    }

    pub fn knee_strike(side: Side, power: f32) -> Self {
        StrikeEvent::KneeStrike {
            side,
            power: clamp_power(power),
        }
    }

    pub fn mask(&self) -> EventMask {
        match self {
            StrikeEvent::Punch { .. } => EventMask::PUNCH,
            StrikeEvent::Uppercut { .. } => EventMask::UPPERCUT,
            StrikeEvent::Cross { .. } => EventMask::CROSS,
            StrikeEvent::Hook { .. } => EventMask::HOOK,
            StrikeEvent::BlockStart | StrikeEvent::BlockEnd => EventMask::BLOCK,
            StrikeEvent::Weave(_) => EventMask::WEAVE,
            StrikeEvent::DuckWeave(_) => EventMask::DUCK_WEAVE,
            StrikeEvent::KneeStrike { .. } => EventMask::KNEE_STRIKE,
            StrikeEvent::LegLift(_) => EventMask::LEG_LIFT,
            StrikeEvent::RunStart | StrikeEvent::RunEnd => EventMask::RUN,
        }
    }

    /// Side of the body that performed the gesture, if paired
    pub fn side(&self) -> Option<Side> {
        match *self {
            StrikeEvent::Punch { side, .. }
            | StrikeEvent::Uppercut { side, .. }
            | StrikeEvent::Cross { side, .. }
            | StrikeEvent::Hook { side, .. }
            | StrikeEvent::KneeStrike { side, .. } => Some(side),
            StrikeEvent::Weave(side) | StrikeEvent::DuckWeave(side) | StrikeEvent::LegLift(side) => {
                Some(side)
            }
            StrikeEvent::BlockStart
            | StrikeEvent::BlockEnd
            | StrikeEvent::RunStart
            | StrikeEvent::RunEnd => None,
        }
    }

    /// Power of a power-valued gesture
    pub fn power(&self) -> Option<f32> {
        match *self {
            StrikeEvent::Punch { power, .. }
            | StrikeEvent::Uppercut { power, .. }
            | StrikeEvent::Cross { power, .. }
            | StrikeEvent::Hook { power, .. }
            | StrikeEvent::KneeStrike { power, .. } => Some(power),
            _ => None,
        }
    }

    /// Gestures performed with the legs
    pub fn is_lower_body(&self) -> bool {
        EventMask::KNEE_STRIKE
            .union(EventMask::LEG_LIFT)
            .union(EventMask::RUN)
            .contains(self.mask())
    }
}

impl From<StrikeEvent> for ProviderEvent {
    fn from(event: StrikeEvent) -> Self {
        ProviderEvent::Strike(event)
    }
}
