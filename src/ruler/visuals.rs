use bevy::prelude::*;

use super::session::{RulerSession, TapOutcome};
use crate::camera::RulerCamera;
use crate::config::AppConfig;
use crate::geometry::{line_mesh, line_segment};

/// Remove every marker, line and label and restart the pair.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ClearMeasurements;

/// Shared handles for marker spheres and line material.
#[derive(Resource)]
pub struct RulerAssets {
    pub marker_mesh: Handle<Mesh>,
    pub start_material: Handle<StandardMaterial>,
    pub end_material: Handle<StandardMaterial>,
    pub line_material: Handle<StandardMaterial>,
}

/// Anything spawned for the current pair.
#[derive(Component)]
pub struct RulerVisual;

#[derive(Component)]
pub struct MeasurementMarker;

#[derive(Component)]
pub struct MeasurementLine;

/// Screen-space text pinned to a world point.
#[derive(Component)]
pub struct DistanceLabel {
    pub anchor: Vec3,
}

/// Vertical gap between the anchor's screen position and the label, pixels.
const LABEL_SCREEN_OFFSET: f32 = 18.0;

pub fn setup_ruler_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<AppConfig>,
) {
    let marker = |color: Color| StandardMaterial {
        base_color: color,
        unlit: true,
        ..default()
    };

    commands.insert_resource(RulerAssets {
        marker_mesh: meshes.add(Sphere::new(config.ruler.marker_radius)),
        start_material: materials.add(marker(Color::srgb(0.83, 0.83, 0.83))),
        end_material: materials.add(marker(Color::srgb(0.5, 0.5, 0.5))),
        line_material: materials.add(marker(Color::WHITE)),
    });
}

fn place_marker(
    commands: &mut Commands,
    assets: &RulerAssets,
    point: Vec3,
    is_start: bool,
) -> Entity {
    let material = if is_start {
        assets.start_material.clone()
    } else {
        assets.end_material.clone()
    };
    commands
        .spawn((
            Name::new(if is_start { "Start marker" } else { "End marker" }),
            Mesh3d(assets.marker_mesh.clone()),
            MeshMaterial3d(material),
            Transform::from_translation(point),
            MeasurementMarker,
            RulerVisual,
        ))
        .id()
}

fn draw_line(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    assets: &RulerAssets,
    start: Vec3,
    end: Vec3,
) -> Entity {
    let segment = line_segment(start, end);
    commands
        .spawn((
            Name::new("Measurement line"),
            Mesh3d(meshes.add(line_mesh(&segment))),
            MeshMaterial3d(assets.line_material.clone()),
            Transform::IDENTITY,
            MeasurementLine,
            RulerVisual,
        ))
        .id()
}

fn draw_label(commands: &mut Commands, text: String, anchor: Vec3, font_size: f32) -> Entity {
    commands
        .spawn((
            Name::new("Distance label"),
            Text::new(text),
            TextFont {
                font_size,
                ..default()
            },
            TextColor(Color::WHITE),
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            Visibility::Hidden,
            DistanceLabel { anchor },
            RulerVisual,
        ))
        .id()
}

/// Render each tap outcome: a marker per tap, plus line and label per pair.
///
/// Several outcomes can arrive in one frame, so entities spawned earlier in
/// this run are tracked alongside the ones already in the world.
pub fn spawn_measurement_visuals(
    mut outcomes: MessageReader<TapOutcome>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    assets: Option<Res<RulerAssets>>,
    config: Res<AppConfig>,
    existing: Query<Entity, With<RulerVisual>>,
) {
    let Some(assets) = assets else {
        return;
    };

    let mut existing_cleared = false;
    let mut spawned: Vec<Entity> = Vec::new();

    for outcome in outcomes.read() {
        match *outcome {
            TapOutcome::StartPlaced(point) => {
                // A new pair replaces the previous one
                if !existing_cleared {
                    // A clear earlier in the frame may have queued these already
                    for entity in existing.iter() {
                        commands.entity(entity).try_despawn();
                    }
                    existing_cleared = true;
                }
                for entity in spawned.drain(..) {
                    commands.entity(entity).despawn();
                }
                spawned.push(place_marker(&mut commands, &assets, point, true));
            }
            TapOutcome::PairCompleted(measurement) => {
                spawned.push(place_marker(&mut commands, &assets, measurement.end, false));
                spawned.push(draw_line(
                    &mut commands,
                    &mut meshes,
                    &assets,
                    measurement.start,
                    measurement.end,
                ));
                spawned.push(draw_label(
                    &mut commands,
                    measurement.display_text(),
                    measurement.end,
                    config.ruler.label_font_size,
                ));
            }
        }
    }
}

pub fn clear_measurements(
    mut requests: MessageReader<ClearMeasurements>,
    mut session: ResMut<RulerSession>,
    mut commands: Commands,
    existing: Query<Entity, With<RulerVisual>>,
) {
    if requests.read().next().is_none() {
        return;
    }
    session.reset();
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    info!("Measurements cleared");
}

/// Keep labels over their anchors as the camera moves.
pub fn position_distance_labels(
    camera_query: Query<(&Camera, &GlobalTransform), With<RulerCamera>>,
    mut label_query: Query<(&DistanceLabel, &mut Node, &mut Visibility, &ComputedNode)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    for (label, mut node, mut visibility, computed) in label_query.iter_mut() {
        match camera.world_to_viewport(camera_transform, label.anchor) {
            Ok(screen) => {
                let size = computed.size() * computed.inverse_scale_factor();
                node.left = Val::Px(screen.x - size.x / 2.0);
                node.top = Val::Px(screen.y - size.y - LABEL_SCREEN_OFFSET);
                *visibility = Visibility::Inherited;
            }
            // Behind the camera
            Err(_) => *visibility = Visibility::Hidden,
        }
    }
}
