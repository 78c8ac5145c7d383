//! Tracked body points, spatial types and tracking frames

use std::ops::{Add, Mul, Sub};

use bitflags::bitflags;

pub use sf_core::config::{BodyPart, TrackingMode};

bitflags! {
    /// Body points a provider actively tracks
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BodyTrackFlags: u8 {
        const HEAD       = 0x01;
        const LEFT_HAND  = 0x02;
        const RIGHT_HAND = 0x04;
        const LEFT_FOOT  = 0x08;
        const RIGHT_FOOT = 0x10;
        const HANDS = Self::LEFT_HAND.bits() | Self::RIGHT_HAND.bits();
        const FEET  = Self::LEFT_FOOT.bits() | Self::RIGHT_FOOT.bits();
        const ALL   = 0x1F;
    }
}

impl Default for BodyTrackFlags {
    fn default() -> Self {
        BodyTrackFlags::ALL
    }
}

impl From<BodyPart> for BodyTrackFlags {
    fn from(part: BodyPart) -> Self {
        match part {
            BodyPart::Head => BodyTrackFlags::HEAD,
            BodyPart::LeftHand => BodyTrackFlags::LEFT_HAND,
            BodyPart::RightHand => BodyTrackFlags::RIGHT_HAND,
            BodyPart::LeftFoot => BodyTrackFlags::LEFT_FOOT,
            BodyPart::RightFoot => BodyTrackFlags::RIGHT_FOOT,
        }
    }
}

impl FromIterator<BodyPart> for BodyTrackFlags {
    fn from_iter<I: IntoIterator<Item = BodyPart>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BodyTrackFlags::empty(), |acc, part| acc | part.into())
    }
}

impl BodyTrackFlags {
    /// Whether a single body point is selected
    pub fn tracks(&self, part: BodyPart) -> bool {
        self.contains(part.into())
    }
}

/// Left or right side of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn hand(&self) -> BodyPart {
        match self {
            Side::Left => BodyPart::LeftHand,
            Side::Right => BodyPart::RightHand,
        }
    }
}

/// 3D vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Rotation quaternion (w, x, y, z)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

/// Position and orientation of one body point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

/// Poses of all five body points for one update tick.
///
/// Points the provider does not track are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackingFrame {
    pub head: Option<Pose>,
    pub left_hand: Option<Pose>,
    pub right_hand: Option<Pose>,
    pub left_foot: Option<Pose>,
    pub right_foot: Option<Pose>,
}

impl TrackingFrame {
    pub fn get(&self, part: BodyPart) -> Option<Pose> {
        match part {
            BodyPart::Head => self.head,
            BodyPart::LeftHand => self.left_hand,
            BodyPart::RightHand => self.right_hand,
            BodyPart::LeftFoot => self.left_foot,
            BodyPart::RightFoot => self.right_foot,
        }
    }

    pub fn set(&mut self, part: BodyPart, pose: Option<Pose>) {
        let slot = match part {
            BodyPart::Head => &mut self.head,
            BodyPart::LeftHand => &mut self.left_hand,
            BodyPart::RightHand => &mut self.right_hand,
            BodyPart::LeftFoot => &mut self.left_foot,
            BodyPart::RightFoot => &mut self.right_foot,
        };
        *slot = pose;
    }

    /// Builder-style variant of [`TrackingFrame::set`]
    pub fn with(mut self, part: BodyPart, pose: Pose) -> Self {
        self.set(part, Some(pose));
        self
    }

    /// Drop the points not selected by `flags`
    pub fn masked(mut self, flags: BodyTrackFlags) -> Self {
        for part in BodyPart::ALL {
            if !flags.tracks(part) {
                self.set(part, None);
            }
        }
        self
    }
}
