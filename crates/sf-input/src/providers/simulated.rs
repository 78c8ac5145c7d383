//! Simulated provider
//!
//! Replays tracking frames and gestures queued by the host, one batch per
//! `update`. Any contract variant and capability set can be simulated,
//! which makes it the stand-in for real drivers in the host binary and in
//! tests.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sf_core::error::ProviderError;
use sf_core::{provider_debug, provider_trace};

use crate::body::{BodyPart, BodyTrackFlags, Pose, Side, TrackingFrame, TrackingMode, Vec3};
use crate::capability::{Capabilities, ProviderKind};
use crate::event::{EventMask, ProviderEvent};
use crate::provider::InputProvider;
use crate::settings::ProviderSettings;
use crate::signal::ProviderEvents;

/// Settings understood by [`SimulatedProvider`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedSettings {
    /// Refuse to start
    pub fail: bool,
    /// Confidence reported for tracked points
    pub confidence: f32,
}

impl Default for SimulatedSettings {
    fn default() -> Self {
        Self {
            fail: false,
            confidence: 1.0,
        }
    }
}

/// A recorded haptic command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticPulse {
    pub side: Side,
    pub intensity: f32,
    pub duration_ms: u32,
}

/// Provider driven by queued data instead of hardware
#[derive(Debug)]
pub struct SimulatedProvider {
    name: String,
    kind: ProviderKind,
    capabilities: Capabilities,
    declared: Option<EventMask>,
    events: ProviderEvents,
    fail_start: bool,
    started: bool,
    failed: bool,
    probed: bool,
    settings: SimulatedSettings,
    tracking_mode: TrackingMode,
    body_track: BodyTrackFlags,
    pending: VecDeque<ProviderEvent>,
    frame: TrackingFrame,
    /// Last frame of the batch before the current one
    previous: TrackingFrame,
    /// Host time between the previous batch and the current one
    frame_interval: Duration,
    since_batch: Duration,
    haptics: Vec<HapticPulse>,
}

impl SimulatedProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ProviderKind::Base,
            capabilities: Capabilities::SPATIAL_TRANSFORM,
            declared: None,
            events: ProviderEvents::new(),
            fail_start: false,
            started: false,
            failed: false,
            probed: false,
            settings: SimulatedSettings::default(),
            tracking_mode: TrackingMode::World3D,
            body_track: BodyTrackFlags::ALL,
            pending: VecDeque::new(),
            frame: TrackingFrame::default(),
            previous: TrackingFrame::default(),
            frame_interval: Duration::ZERO,
            since_batch: Duration::ZERO,
            haptics: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Narrow the events this provider declares
    pub fn with_declared_events(mut self, events: EventMask) -> Self {
        self.declared = Some(events);
        self
    }

    /// Make every `start` call fail
    pub fn failing(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn set_fail_start(&mut self, fail: bool) {
        self.fail_start = fail;
    }

    /// Queue a tracking frame for the next update
    pub fn push_frame(&mut self, frame: TrackingFrame) {
        self.pending.push_back(ProviderEvent::TrackingUpdated(frame));
    }

    /// Queue any event for the next update
    pub fn push_event(&mut self, event: impl Into<ProviderEvent>) {
        self.pending.push_back(event.into());
    }

    /// Simulate a hardware failure; reported immediately
    pub fn disconnect(&mut self, reason: &str) {
        self.failed = true;
        self.pending.clear();
        self.events.emit_failed(reason);
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the last successful start was the registration probe
    pub fn was_probed(&self) -> bool {
        self.probed
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn haptics(&self) -> &[HapticPulse] {
        &self.haptics
    }

    fn dispatch(&mut self, event: ProviderEvent) {
        let event = match event {
            ProviderEvent::TrackingUpdated(frame) => {
                let frame = frame.masked(self.body_track);
                self.frame = frame;
                ProviderEvent::TrackingUpdated(frame)
            }
            other => other,
        };

        if !self.declared_events().contains(event.mask()) {
            provider_debug!("{} dropped undeclared event {:?}", self.name, event);
            return;
        }
        self.events.emit(&event);
    }
}

impl InputProvider for SimulatedProvider {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn declared_events(&self) -> EventMask {
        self.declared.unwrap_or_else(|| self.kind.vocabulary())
    }

    fn events(&self) -> &ProviderEvents {
        &self.events
    }

    fn start(&mut self, settings: &str) -> Result<(), ProviderError> {
        let parsed: SimulatedSettings = ProviderSettings::parse(settings)?;
        if self.fail_start || parsed.fail {
            return Err(ProviderError::StartFailed(format!(
                "{} refused to start",
                self.name
            )));
        }

        self.probed = ProviderSettings::is_probe(settings);
        self.settings = parsed;
        self.started = true;
        self.failed = false;
        provider_debug!("{} started (probe: {})", self.name, self.probed);
        self.events.emit_started();
        Ok(())
    }

    fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        self.pending.clear();
        self.frame = TrackingFrame::default();
        self.previous = TrackingFrame::default();
        self.frame_interval = Duration::ZERO;
        self.since_batch = Duration::ZERO;
        provider_debug!("{} stopped", self.name);
        self.events.emit_stopped();
    }

    fn is_tracking(&self) -> bool {
        self.started && !self.failed
    }

    fn update(&mut self, delta: Duration) {
        if !self.is_tracking() {
            return;
        }
        self.since_batch += delta;
        let before = self.frame;
        let frames = self
            .pending
            .iter()
            .filter(|e| matches!(e, ProviderEvent::TrackingUpdated(_)))
            .count();
        if frames > 0 {
            self.previous = before;
            self.frame_interval = self.since_batch;
            self.since_batch = Duration::ZERO;
            provider_trace!("{} replaying {} frames", self.name, frames);
        }
        while let Some(event) = self.pending.pop_front() {
            self.dispatch(event);
        }
    }

    fn trigger_haptic(&mut self, side: Side, intensity: f32, duration_ms: u32) {
        if !self.has_capability(Capabilities::HAPTICS) {
            provider_debug!("{} has no haptics", self.name);
            return;
        }
        self.haptics.push(HapticPulse {
            side,
            intensity,
            duration_ms,
        });
    }

    fn pose(&self, part: BodyPart, mode: TrackingMode) -> Option<Pose> {
        if !self.is_tracking() || !self.body_track.tracks(part) {
            return None;
        }
        let pose = self.frame.get(part)?;
        match mode {
            TrackingMode::World3D => Some(pose),
            TrackingMode::Screen2D => Some(Pose::new(
                Vec3::new(pose.position.x, pose.position.y, 0.0),
                pose.rotation,
            )),
        }
    }

    fn velocity(&self, part: BodyPart) -> Option<Vec3> {
        if !self.has_capability(Capabilities::VELOCITY) || self.frame_interval.is_zero() {
            return None;
        }
        let current = self.pose(part, TrackingMode::World3D)?;
        let previous = self.previous.get(part)?;
        let dt = self.frame_interval.as_secs_f32();
        Some((current.position - previous.position) * (1.0 / dt))
    }

    fn tracking_confidence(&self, part: BodyPart) -> f32 {
        if self.pose(part, TrackingMode::World3D).is_some() {
            self.settings.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn tracking_mode(&self) -> TrackingMode {
        self.tracking_mode
    }

    fn set_tracking_mode(&mut self, mode: TrackingMode) {
        self.tracking_mode = mode;
    }

    fn body_track_flags(&self) -> BodyTrackFlags {
        self.body_track
    }

    fn set_body_track_flags(&mut self, flags: BodyTrackFlags) {
        self.body_track = flags;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::event::EventCategory;
    use crate::striking::StrikeEvent;

    fn hand_frame(x: f32) -> TrackingFrame {
        TrackingFrame::default()
            .with(BodyPart::Head, Pose::at(Vec3::new(0.0, 1.7, 0.0)))
            .with(BodyPart::RightHand, Pose::at(Vec3::new(x, 1.2, 0.3)))
            .with(BodyPart::LeftFoot, Pose::at(Vec3::new(-0.2, 0.0, 0.0)))
    }

    #[test]
    fn replays_queued_frames_on_update() {
        let mut provider = SimulatedProvider::new("Camera")
            .with_capabilities(Capabilities::SPATIAL_TRANSFORM | Capabilities::VELOCITY);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        provider
            .events()
            .subscribe(EventCategory::Tracking, move |e| sink.lock().push(e.clone()));

        provider.start("{}").unwrap();
        provider.push_frame(hand_frame(0.0));
        provider.update(Duration::from_millis(100));
        provider.push_frame(hand_frame(0.5));
        provider.update(Duration::from_millis(100));

        assert_eq!(seen.lock().len(), 2);
        let velocity = provider.velocity(BodyPart::RightHand).unwrap();
        assert!((velocity.x - 5.0).abs() < 1e-4);
        assert_eq!(provider.tracking_confidence(BodyPart::RightHand), 1.0);
        assert_eq!(provider.tracking_confidence(BodyPart::RightFoot), 0.0);
    }

    #[test]
    fn velocity_spans_whole_batches() {
        let mut provider = SimulatedProvider::new("Camera")
            .with_capabilities(Capabilities::SPATIAL_TRANSFORM | Capabilities::VELOCITY);
        provider.start("{}").unwrap();

        provider.push_frame(hand_frame(0.0));
        provider.update(Duration::from_millis(100));
        for x in [0.25, 0.5, 1.0] {
            provider.push_frame(hand_frame(x));
        }
        provider.update(Duration::from_millis(100));

        // 1.0 m over 100 ms, whatever the batch size
        let velocity = provider.velocity(BodyPart::RightHand).unwrap();
        assert!((velocity.x - 10.0).abs() < 1e-4, "{:?}", velocity);

        // empty updates count toward the next interval
        provider.update(Duration::from_millis(50));
        provider.push_frame(hand_frame(1.3));
        provider.update(Duration::from_millis(50));
        let velocity = provider.velocity(BodyPart::RightHand).unwrap();
        assert!((velocity.x - 3.0).abs() < 1e-4, "{:?}", velocity);
    }

    #[test]
    fn nothing_is_emitted_before_start() {
        let mut provider = SimulatedProvider::new("Camera");
        provider.push_frame(hand_frame(0.0));
        provider.update(Duration::from_millis(16));
        assert_eq!(provider.pending(), 1);
        assert_eq!(provider.pose(BodyPart::Head, TrackingMode::World3D), None);
    }

    #[test]
    fn body_flags_and_screen_mode() {
        let mut provider = SimulatedProvider::new("Camera");
        provider.start("{}").unwrap();
        provider.set_body_track_flags(BodyTrackFlags::HEAD | BodyTrackFlags::HANDS);
        provider.push_frame(hand_frame(0.4));
        provider.update(Duration::from_millis(16));

        assert!(provider.pose(BodyPart::LeftFoot, TrackingMode::World3D).is_none());
        let screen = provider.pose(BodyPart::RightHand, TrackingMode::Screen2D).unwrap();
        assert_eq!(screen.position, Vec3::new(0.4, 1.2, 0.0));
    }

    #[test]
    fn start_failures() {
        let mut provider = SimulatedProvider::new("Vr").failing();
        assert!(matches!(provider.start("{}"), Err(ProviderError::StartFailed(_))));

        let mut provider = SimulatedProvider::new("Vr");
        assert!(provider.start(r#"{"fail": true}"#).is_err());
        assert!(matches!(
            provider.start("{oops"),
            Err(ProviderError::InvalidSettings(_))
        ));
        assert!(!provider.is_started());

        provider.start(&ProviderSettings::probe().to_json()).unwrap();
        assert!(provider.was_probed());
    }

    #[test]
    fn undeclared_gestures_are_dropped() {
        let mut provider = SimulatedProvider::new("Boxer")
            .with_kind(ProviderKind::Striking)
            .with_declared_events(EventMask::BASE | EventMask::PUNCH);
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        provider
            .events()
            .subscribe(EventCategory::Striking, move |_| *sink.lock() += 1);

        provider.start("{}").unwrap();
        provider.push_event(StrikeEvent::punch(Side::Left, 0.8));
        provider.push_event(StrikeEvent::BlockStart);
        provider.update(Duration::from_millis(16));

        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn haptics_recorded_only_when_supported() {
        let mut plain = SimulatedProvider::new("Keyboard");
        plain.trigger_haptic(Side::Left, 1.0, 50);
        assert!(plain.haptics().is_empty());

        let mut pad = SimulatedProvider::new("Gamepad").with_capabilities(Capabilities::HAPTICS);
        pad.trigger_haptic(Side::Right, 0.6, 80);
        assert_eq!(
            pad.haptics(),
            &[HapticPulse {
                side: Side::Right,
                intensity: 0.6,
                duration_ms: 80
            }]
        );
    }

    #[test]
    fn disconnect_reports_failure() {
        let mut provider = SimulatedProvider::new("Vr");
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reasons);
        provider.events().subscribe(EventCategory::Lifecycle, move |e| {
            if let ProviderEvent::Failed { reason } = e {
                sink.lock().push(reason.clone());
            }
        });

        provider.start("{}").unwrap();
        provider.disconnect("headset unplugged");
        assert!(!provider.is_tracking());
        assert!(provider.is_started());
        assert_eq!(*reasons.lock(), vec!["headset unplugged".to_string()]);
    }
}
