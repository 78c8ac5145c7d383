//! Flow (slicing) contract vocabulary

use crate::event::{EventMask, ProviderEvent};

/// Dominant direction of a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SliceDirection {
    /// Closest cardinal direction for an angle in degrees.
    ///
    /// 0° points right and angles grow counter-clockwise.
    pub fn from_angle(angle_deg: f32) -> Self {
        let angle = angle_deg.rem_euclid(360.0);
        if !(45.0..315.0).contains(&angle) {
            SliceDirection::Right
        } else if angle < 135.0 {
            SliceDirection::Up
        } else if angle < 225.0 {
            SliceDirection::Left
        } else {
            SliceDirection::Down
        }
    }
}

/// Gesture recognized by a flow provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowEvent {
    Slice {
        direction: SliceDirection,
        angle_deg: f32,
    },
}

impl FlowEvent {
    pub fn slice(direction: SliceDirection, angle_deg: f32) -> Self {
        FlowEvent::Slice {
            direction,
            angle_deg,
        }
    }

    /// Slice whose direction is derived from its angle
    pub fn slice_at(angle_deg: f32) -> Self {
        Self::slice(SliceDirection::from_angle(angle_deg), angle_deg)
    }

    pub fn mask(&self) -> EventMask {
        match self {
            FlowEvent::Slice { .. } => EventMask::SLICE,
        }
    }
}

impl From<FlowEvent> for ProviderEvent {
    fn from(event: FlowEvent) -> Self {
        ProviderEvent::Flow(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_angle() {
        assert_eq!(SliceDirection::from_angle(0.0), SliceDirection::Right);
        assert_eq!(SliceDirection::from_angle(350.0), SliceDirection::Right);
        assert_eq!(SliceDirection::from_angle(90.0), SliceDirection::Up);
        assert_eq!(SliceDirection::from_angle(180.0), SliceDirection::Left);
        assert_eq!(SliceDirection::from_angle(-90.0), SliceDirection::Down);
    }

    #[test]
    fn slice_at_keeps_angle() {
        let FlowEvent::Slice {
            direction,
            angle_deg,
        } = FlowEvent::slice_at(200.0);
        assert_eq!(direction, SliceDirection::Left);
        assert_eq!(angle_deg, 200.0);
    }
}
