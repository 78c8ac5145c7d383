//! Strikeflow - headless input host
//!
//! Registers the reference providers with a coordinator built from the
//! configuration file and drives them through a scripted session.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use sf_core::config::Config;
use sf_input::{
    shared, BodyPart, Capabilities, EventCategory, InputCoordinator, Pose, ProviderEvent,
    ProviderKind, ProviderSettings, SharedProvider, Side, SimulatedProvider, StrikeEvent,
    TrackingFrame, Vec3,
};
use tracing::{info, trace, warn};

const DEFAULT_FRAMES: u32 = 240;
const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    sf_core::logging::init(&config);

    let frames = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("Invalid frame count: {}", arg))?,
        None => DEFAULT_FRAMES,
    };

    info!("Starting strikeflow host ({} frames)", frames);

    let mut coordinator = InputCoordinator::from_config(&config.input);
    install_listeners(&coordinator);

    let keyboard = shared(SimulatedProvider::new("Keyboard"));
    let gamepad = shared(
        SimulatedProvider::new("Gamepad")
            .with_capabilities(Capabilities::SPATIAL_TRANSFORM | Capabilities::HAPTICS),
    );
    let camera = shared(
        SimulatedProvider::new("Camera")
            .with_kind(ProviderKind::Striking)
            .with_capabilities(Capabilities::SPATIAL_TRANSFORM | Capabilities::VELOCITY),
    );

    register(&mut coordinator, &config, "keyboard", keyboard.clone())?;
    register(&mut coordinator, &config, "gamepad", gamepad.clone())?;
    register(&mut coordinator, &config, "camera", camera.clone())?;

    info!(
        "Registered {:?}, active provider: {:?}",
        coordinator.registered_providers(),
        coordinator.active_provider_id()
    );

    for frame in 0..frames {
        let t = frame as f32 * FRAME_TIME.as_secs_f32();
        let pose = scripted_frame(t);

        keyboard.lock().push_frame(pose);
        gamepad.lock().push_frame(pose);
        camera.lock().push_frame(pose);

        if frame % 30 == 15 {
            let side = if frame % 60 == 15 { Side::Left } else { Side::Right };
            camera.lock().push_event(StrikeEvent::punch(side, 0.8));
            coordinator.trigger_haptic(side, 0.6, 40);
        }

        if frame == frames / 2 {
            camera.lock().disconnect("camera unplugged");
        }

        coordinator.update(FRAME_TIME);

        if !coordinator.is_tracking() {
            if let Some(id) = coordinator.active_provider_id().map(str::to_string) {
                warn!("Provider {} stopped tracking, removing it", id);
                coordinator.unregister_provider(&id);
            }
        }

        if let Some(head) = coordinator.active_pose(BodyPart::Head) {
            trace!("Frame {} head at {:?}", frame, head.position);
        }
    }

    info!(
        "Session finished, active provider: {:?}",
        coordinator.active_provider_id()
    );
    coordinator.shutdown();
    Ok(())
}

/// Register a provider with its `[input.providers.<id>]` table
fn register(
    coordinator: &mut InputCoordinator,
    config: &Config,
    id: &str,
    provider: SharedProvider,
) -> Result<()> {
    let settings = config
        .input
        .provider_settings(id)
        .with_context(|| format!("Settings for provider {}", id))?;

    if let Err(e) =
        coordinator.register_provider_with_settings(provider, ProviderSettings::from_value(settings))
    {
        warn!("Skipping provider {}: {}", id, e);
    }
    Ok(())
}

fn install_listeners(coordinator: &InputCoordinator) {
    coordinator
        .events()
        .subscribe(EventCategory::Lifecycle, |event| match event {
            ProviderEvent::Failed { reason } => warn!("Active provider failed: {}", reason),
            other => info!("Active provider {:?}", other),
        });

    coordinator
        .events()
        .subscribe(EventCategory::Tracking, |event| {
            if let ProviderEvent::TrackingUpdated(frame) = event {
                trace!("Tracking update: {:?}", frame.get(BodyPart::RightHand));
            }
        });

    for category in [EventCategory::Posture, EventCategory::Striking, EventCategory::Flow] {
        coordinator
            .events()
            .subscribe(category, |event| info!("Gesture: {:?}", event));
    }

    coordinator
        .notifications()
        .subscribe(|note| info!("Coordinator: {:?}", note));
}

/// Idle stance with the hands bobbing in front of the chest
fn scripted_frame(t: f32) -> TrackingFrame {
    let bob = (t * 4.0).sin() * 0.05;
    TrackingFrame::default()
        .with(BodyPart::Head, Pose::at(Vec3::new(0.0, 1.7, 0.0)))
        .with(BodyPart::LeftHand, Pose::at(Vec3::new(-0.25, 1.3 + bob, 0.3)))
        .with(BodyPart::RightHand, Pose::at(Vec3::new(0.25, 1.3 - bob, 0.3)))
        .with(BodyPart::LeftFoot, Pose::at(Vec3::new(-0.15, 0.0, 0.0)))
        .with(BodyPart::RightFoot, Pose::at(Vec3::new(0.15, 0.0, 0.0)))
}
