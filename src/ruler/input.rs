use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::session::{RulerSession, TapOutcome};
use crate::camera::RulerCamera;
use crate::surface::{hit_test, DetectedPlane};

/// A press on the viewport, in window logical pixels.
#[derive(Message, Debug, Clone, Copy)]
pub struct ScreenTap(pub Vec2);

/// A screen tap that landed on a detected surface.
#[derive(Message, Debug, Clone, Copy)]
pub struct SurfaceHit(pub Vec3);

/// Turn left clicks and touch presses into `ScreenTap`s.
pub fn collect_screen_taps(
    mouse_button: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    mut taps: MessageWriter<ScreenTap>,
) {
    // Clicks on the panel are not taps on the scene
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
            return;
        }
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        if let Some(cursor) = window_query.single().ok().and_then(|w| w.cursor_position()) {
            taps.write(ScreenTap(cursor));
        }
    }

    for touch in touches.iter_just_pressed() {
        taps.write(ScreenTap(touch.position()));
    }
}

/// Camera ray through a screen tap.
#[derive(Message, Debug, Clone, Copy)]
pub struct TapRay(pub Ray3d);

/// Turn each tap into a world ray through the ruler camera.
pub fn project_screen_taps(
    mut taps: MessageReader<ScreenTap>,
    camera_query: Query<(&Camera, &GlobalTransform), With<RulerCamera>>,
    mut rays: MessageWriter<TapRay>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        taps.clear();
        return;
    };

    for ScreenTap(screen) in taps.read() {
        match camera.viewport_to_world(camera_transform, *screen) {
            Ok(ray) => {
                rays.write(TapRay(ray));
            }
            Err(e) => debug!("No ray for tap at {:?}: {:?}", screen, e),
        }
    }
}

/// Hit test each tap ray against the detected planes. Misses are dropped.
pub fn resolve_tap_rays(
    mut rays: MessageReader<TapRay>,
    plane_query: Query<(&GlobalTransform, &DetectedPlane)>,
    mut hits: MessageWriter<SurfaceHit>,
) {
    for TapRay(ray) in rays.read() {
        match hit_test(*ray, plane_query.iter()) {
            Some(point) => {
                hits.write(SurfaceHit(point));
            }
            None => debug!("Tap ray from {:?} missed every surface", ray.origin),
        }
    }
}

/// Feed surface hits to the session, one at a time, in arrival order.
pub fn apply_surface_hits(
    mut hits: MessageReader<SurfaceHit>,
    mut session: ResMut<RulerSession>,
    mut outcomes: MessageWriter<TapOutcome>,
) {
    for SurfaceHit(point) in hits.read() {
        let outcome = session.on_tap(*point);
        match outcome {
            TapOutcome::StartPlaced(p) => {
                info!("Measurement start: {:.3}, {:.3}, {:.3}", p.x, p.y, p.z);
            }
            TapOutcome::PairCompleted(m) => {
                info!("Measurement: {} ({})", m.display_text(), m.meters());
            }
        }
        outcomes.write(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruler::TapState;
    use crate::units::LengthUnit;
    use bevy::ecs::message::Messages;

    fn hits_app(unit: LengthUnit) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(RulerSession::new(unit))
            .add_message::<SurfaceHit>()
            .add_message::<TapOutcome>()
            .add_systems(Update, apply_surface_hits);
        app
    }

    fn drain_outcomes(app: &mut App) -> Vec<TapOutcome> {
        app.world_mut()
            .resource_mut::<Messages<TapOutcome>>()
            .drain()
            .collect()
    }

    #[test]
    fn hits_in_one_frame_are_processed_in_order() {
        let mut app = hits_app(LengthUnit::Centimeters);
        for p in [Vec3::ZERO, Vec3::X, Vec3::Z] {
            app.world_mut().write_message(SurfaceHit(p));
        }
        app.update();

        let outcomes = drain_outcomes(&mut app);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], TapOutcome::StartPlaced(Vec3::ZERO));
        match outcomes[1] {
            TapOutcome::PairCompleted(m) => assert_eq!(m.distance, 100.0),
            other => panic!("expected PairCompleted, got {:?}", other),
        }
        assert_eq!(outcomes[2], TapOutcome::StartPlaced(Vec3::Z));
        assert_eq!(
            app.world().resource::<RulerSession>().pending_start(),
            Some(Vec3::Z)
        );
    }

    #[test]
    fn no_hits_leaves_state_alone() {
        let mut app = hits_app(LengthUnit::Inches);
        app.update();
        assert!(drain_outcomes(&mut app).is_empty());
        assert!(app.world().resource::<RulerSession>().pending_start().is_none());
    }

    fn rays_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(RulerSession::new(LengthUnit::Centimeters))
            .add_message::<TapRay>()
            .add_message::<SurfaceHit>()
            .add_message::<TapOutcome>()
            .add_systems(Update, (resolve_tap_rays, apply_surface_hits).chain());
        app.world_mut().spawn((
            GlobalTransform::IDENTITY,
            DetectedPlane {
                half_extents: Vec2::splat(1.0),
            },
        ));
        app
    }

    fn ray_down_from(x: f32, z: f32) -> TapRay {
        TapRay(Ray3d::new(Vec3::new(x, 2.0, z), Dir3::NEG_Y))
    }

    #[test]
    fn tap_on_plane_places_start() {
        let mut app = rays_app();
        app.world_mut().write_message(ray_down_from(0.5, 0.0));
        app.update();

        let outcomes = drain_outcomes(&mut app);
        assert_eq!(outcomes.len(), 1);
        let start = app.world().resource::<RulerSession>().pending_start();
        assert!((start.unwrap() - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn tap_off_every_plane_is_ignored() {
        let mut app = rays_app();
        app.world_mut().write_message(ray_down_from(3.0, 0.0));
        app.update();

        assert!(drain_outcomes(&mut app).is_empty());
        let session = app.world().resource::<RulerSession>();
        assert_eq!(session.state, TapState::AwaitingStart);
        assert!(session.last.is_none());
    }

    #[test]
    fn miss_between_taps_does_not_break_the_pair() {
        let mut app = rays_app();
        for ray in [
            ray_down_from(0.0, 0.0),
            ray_down_from(0.0, 5.0),
            ray_down_from(0.0, 0.5),
        ] {
            app.world_mut().write_message(ray);
        }
        app.update();

        let outcomes = drain_outcomes(&mut app);
        assert_eq!(outcomes.len(), 2);
        let last = app.world().resource::<RulerSession>().last.unwrap();
        assert!((last.distance - 50.0).abs() < 1e-3);
    }

    #[test]
    fn pair_can_span_frames() {
        let mut app = hits_app(LengthUnit::Inches);
        app.world_mut().write_message(SurfaceHit(Vec3::ZERO));
        app.update();
        app.world_mut().write_message(SurfaceHit(Vec3::new(0.0, 0.0, 1.0)));
        app.update();

        let session = app.world().resource::<RulerSession>();
        let last = session.last.expect("pair should be complete");
        assert!((last.distance - 39.3701).abs() < 1e-4);
    }
}
