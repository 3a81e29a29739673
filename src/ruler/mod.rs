mod input;
mod session;
mod visuals;

pub use input::*;
pub use session::*;
pub use visuals::*;

use bevy::prelude::*;

use crate::config::AppConfig;

pub struct RulerPlugin;

impl Plugin for RulerPlugin {
    fn build(&self, app: &mut App) {
        let unit = app
            .world()
            .get_resource::<AppConfig>()
            .map(|c| c.ruler.default_unit)
            .unwrap_or_default();

        app.insert_resource(RulerSession::new(unit))
            .register_type::<RulerSession>()
            .add_message::<ScreenTap>()
            .add_systems(Startup, setup_ruler_assets)
            .add_systems(Update, collect_screen_taps.before(project_screen_taps));
        add_measurement_pipeline(app);
    }
}

/// Register the tap-to-visuals messages and systems.
///
/// A clear request is applied before the frame's taps, so a tap in the same
/// frame as Esc starts a fresh pair.
fn add_measurement_pipeline(app: &mut App) {
    app.add_message::<TapRay>()
        .add_message::<SurfaceHit>()
        .add_message::<TapOutcome>()
        .add_message::<ClearMeasurements>()
        .add_systems(
            Update,
            (
                project_screen_taps,
                resolve_tap_rays,
                clear_measurements,
                apply_surface_hits,
                spawn_measurement_visuals,
                position_distance_labels,
            )
                .chain(),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .insert_resource(AppConfig::default())
            .insert_resource(RulerSession::default())
            .add_message::<ScreenTap>()
            .add_systems(Startup, setup_ruler_assets);
        add_measurement_pipeline(&mut app);
        app
    }

    #[test]
    fn clear_and_tap_in_one_frame_starts_fresh_pair() {
        let mut app = pipeline_app();
        app.world_mut().write_message(SurfaceHit(Vec3::ZERO));
        app.update();
        assert!(app.world().resource::<RulerSession>().pending_start().is_some());

        app.world_mut().write_message(ClearMeasurements);
        app.world_mut().write_message(SurfaceHit(Vec3::X));
        app.update();

        let session = app.world().resource::<RulerSession>();
        assert_eq!(session.pending_start(), Some(Vec3::X));

        let mut markers = app
            .world_mut()
            .query_filtered::<&Transform, With<MeasurementMarker>>();
        let marker = markers.single(app.world()).unwrap();
        assert_eq!(marker.translation, Vec3::X);
    }
}
