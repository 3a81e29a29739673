//! Orbit camera standing in for the tracked device pose.
//!
//! Right-drag orbits around the focus point, scroll and pinch move closer
//! or farther. Left button and touch stay free for measuring taps.

use bevy::input::gestures::PinchGesture;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::config::AppConfig;

const ORBIT_SENSITIVITY: f32 = 0.3;
const ZOOM_SENSITIVITY_LINE: f32 = 0.1;
const ZOOM_SENSITIVITY_PIXEL: f32 = 0.002;
const MIN_PITCH: f32 = 5.0;
const MAX_PITCH: f32 = 89.0;
const MIN_DISTANCE: f32 = 0.3;
const MAX_DISTANCE: f32 = 10.0;

/// Marker for the camera taps are projected through.
#[derive(Component)]
pub struct RulerCamera;

#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct OrbitCamera {
    pub focus: Vec3,
    /// Degrees, 0 = camera south of focus looking north (-Z)
    pub yaw: f32,
    /// Degrees above the horizon
    pub pitch: f32,
    /// Meters from focus
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.0,
            pitch: 40.0,
            distance: 3.0,
        }
    }
}

impl OrbitCamera {
    pub fn transform(&self) -> Transform {
        let pitch_rad = self.pitch.to_radians();
        let yaw_rad = self.yaw.to_radians();

        let horizontal = self.distance * pitch_rad.cos();
        let vertical = self.distance * pitch_rad.sin();

        let position = Vec3::new(
            self.focus.x - horizontal * yaw_rad.sin(),
            self.focus.y + vertical,
            self.focus.z + horizontal * yaw_rad.cos(),
        );

        Transform::from_translation(position).looking_at(self.focus, Vec3::Y)
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw = (self.yaw + delta.x * ORBIT_SENSITIVITY).rem_euclid(360.0);
        self.pitch = (self.pitch + delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Positive `amount` moves closer.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance * (1.0 - amount)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<OrbitCamera>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (orbit_camera_input, apply_orbit_camera).chain());
    }
}

fn setup_camera(mut commands: Commands, config: Res<AppConfig>) {
    let orbit = OrbitCamera {
        pitch: config.scene.camera_pitch_deg.clamp(MIN_PITCH, MAX_PITCH),
        distance: config.scene.camera_distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
        ..default()
    };

    commands.spawn((
        Name::new("Ruler camera"),
        Camera3d::default(),
        orbit.transform(),
        RulerCamera,
    ));
    commands.insert_resource(orbit);
}

fn orbit_camera_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut scroll_events: MessageReader<MouseWheel>,
    mut pinch_events: MessageReader<PinchGesture>,
    mut orbit: ResMut<OrbitCamera>,
    mut contexts: EguiContexts,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.is_pointer_over_area() {
            mouse_motion.clear();
            scroll_events.clear();
            pinch_events.clear();
            return;
        }
    }

    if mouse_button.pressed(MouseButton::Right) {
        for event in mouse_motion.read() {
            orbit.orbit(event.delta);
        }
    } else {
        mouse_motion.clear();
    }

    for event in scroll_events.read() {
        let amount = match event.unit {
            MouseScrollUnit::Line => event.y * ZOOM_SENSITIVITY_LINE,
            MouseScrollUnit::Pixel => event.y * ZOOM_SENSITIVITY_PIXEL,
        };
        orbit.zoom(amount);
    }

    for event in pinch_events.read() {
        orbit.zoom(event.0);
    }
}

fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut camera_query: Query<&mut Transform, With<RulerCamera>>,
) {
    if !orbit.is_changed() {
        return;
    }
    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_stays_at_distance_and_looks_at_focus() {
        let orbit = OrbitCamera {
            focus: Vec3::new(0.5, 0.0, -0.5),
            yaw: 30.0,
            pitch: 45.0,
            distance: 2.0,
        };
        let transform = orbit.transform();
        assert!((transform.translation.distance(orbit.focus) - 2.0).abs() < 1e-4);

        let to_focus = (orbit.focus - transform.translation).normalize();
        assert!(transform.forward().dot(to_focus) > 0.9999);
    }

    #[test]
    fn zero_yaw_sits_south_of_focus() {
        let transform = OrbitCamera::default().transform();
        assert!(transform.translation.z > 0.0);
        assert!(transform.translation.x.abs() < 1e-5);
        assert!(transform.translation.y > 0.0);
    }

    #[test]
    fn pitch_is_clamped_above_horizon() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(Vec2::new(0.0, -10_000.0));
        assert_eq!(orbit.pitch, MIN_PITCH);
        orbit.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(orbit.pitch, MAX_PITCH);
    }

    #[test]
    fn yaw_wraps() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(Vec2::new(-10.0 / ORBIT_SENSITIVITY, 0.0));
        assert!((orbit.yaw - 350.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.zoom(0.99);
        orbit.zoom(0.99);
        assert_eq!(orbit.distance, MIN_DISTANCE);
        for _ in 0..100 {
            orbit.zoom(-0.5);
        }
        assert_eq!(orbit.distance, MAX_DISTANCE);
    }
}
