use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};

mod camera;
mod config;
mod geometry;
#[cfg(feature = "inspector")]
mod inspector;
mod keyboard;
mod messaging;
mod panel;
mod paths;
mod ruler;
mod statusbar;
mod surface;
mod theme;
mod units;

use camera::CameraPlugin;
use config::ConfigPlugin;
use keyboard::HelpOverlayState;
use messaging::MessagingPlugin;
use panel::RulerPanelState;
use ruler::RulerPlugin;
use statusbar::StatusBarState;
use surface::SurfacePlugin;
use theme::AppTheme;

fn main() {
    let theme = AppTheme::default();
    let clear_color = theme.base();

    let mut app = App::new();
    app.add_plugins((
        DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "AR Ruler".to_string(),
                resolution: (1280, 720).into(),
                ..default()
            }),
            ..default()
        }),
        EguiPlugin::default(),
    ))
    .insert_resource(theme)
    .insert_resource(ClearColor(clear_color))
    .init_resource::<RulerPanelState>()
    .init_resource::<StatusBarState>()
    .init_resource::<HelpOverlayState>()
    // Config first: the other plugins read it while building
    .add_plugins(ConfigPlugin)
    .add_plugins((SurfacePlugin, CameraPlugin, RulerPlugin, MessagingPlugin))
    .add_systems(Update, keyboard::handle_keyboard_shortcuts)
    .add_systems(
        EguiPrimaryContextPass,
        (
            theme::setup_egui_fonts,
            statusbar::render_statusbar,
            panel::render_ruler_panel,
            keyboard::render_help_overlay,
        )
            .chain(),
    );

    #[cfg(feature = "inspector")]
    app.add_plugins(inspector::InspectorPlugin);

    app.run();
}
