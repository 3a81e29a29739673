//! Detected surfaces and the screen-tap hit test.
//!
//! A `DetectedPlane` is a bounded plane whose local XZ square lies in the
//! entity's transform; the plane normal is the entity's local +Y.

use bevy::prelude::*;

use crate::config::AppConfig;

/// A surface taps can land on. `half_extents` bounds local X and Z.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DetectedPlane {
    pub half_extents: Vec2,
}

impl DetectedPlane {
    fn contains_local(&self, local: Vec3) -> bool {
        local.x.abs() <= self.half_extents.x && local.z.abs() <= self.half_extents.y
    }
}

/// Nearest point where `ray` meets any of `planes`, if any.
pub fn hit_test<'a>(
    ray: Ray3d,
    planes: impl IntoIterator<Item = (&'a GlobalTransform, &'a DetectedPlane)>,
) -> Option<Vec3> {
    planes
        .into_iter()
        .filter_map(|(transform, plane)| {
            let surface = InfinitePlane3d {
                normal: transform.up(),
            };
            let t = ray.intersect_plane(transform.translation(), surface)?;
            let point = ray.get_point(t);
            let local = transform.affine().inverse().transform_point3(point);
            plane.contains_local(local).then_some((t, point))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, point)| point)
}

pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<DetectedPlane>()
            .add_systems(Startup, setup_surfaces);
    }
}

/// Spawn the horizontal floor plane and scene lighting.
fn setup_surfaces(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<AppConfig>,
    theme: Res<crate::theme::AppTheme>,
) {
    let half = config.scene.plane_half_extent;

    commands.spawn((
        Name::new("Detected plane"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(half * 2.0, half * 2.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: theme.surface0(),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::IDENTITY,
        DetectedPlane {
            half_extents: Vec2::splat(half),
        },
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 4.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("Horizontal plane ready ({:.1} m square)", half * 2.0);
}
