/// ECS Inspector window using bevy-inspector-egui.
///
/// Provides a floating egui window with live, editable views of the ruler
/// session, the orbit camera and every entity. Rendered by an exclusive
/// system that requires &mut World access.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContext};
use bevy_inspector_egui::bevy_inspector;

use crate::camera::OrbitCamera;
use crate::ruler::RulerSession;

/// Resource controlling inspector window visibility.
#[derive(Resource, Default)]
pub struct InspectorState {
    pub open: bool,
}

pub struct InspectorPlugin;

impl Plugin for InspectorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InspectorState>()
            .add_systems(Update, (toggle_inspector, render_inspector_window).chain());
    }
}

/// F12 toggles the inspector.
fn toggle_inspector(keyboard: Res<ButtonInput<KeyCode>>, mut state: ResMut<InspectorState>) {
    if keyboard.just_pressed(KeyCode::F12) {
        state.open = !state.open;
    }
}

/// Exclusive system that renders the inspector window.
///
/// Must be exclusive because `bevy_inspector` functions require `&mut World`.
fn render_inspector_window(world: &mut World) {
    let open = world
        .get_resource::<InspectorState>()
        .is_some_and(|state| state.open);

    if !open {
        return;
    }

    // Clone the egui context so we can release the world borrow
    let Ok(mut egui_context) = world
        .query_filtered::<&mut EguiContext, With<bevy_egui::PrimaryEguiContext>>()
        .single(world)
        .map(|context| context.clone())
    else {
        return;
    };
    let ctx = egui_context.get_mut();

    egui::Window::new("Inspector")
        .default_size([400.0, 500.0])
        .resizable(true)
        .collapsible(true)
        .show(ctx, |ui: &mut egui::Ui| {
            egui::ScrollArea::both().show(ui, |ui: &mut egui::Ui| {
                egui::CollapsingHeader::new("Ruler")
                    .default_open(true)
                    .show(ui, |ui: &mut egui::Ui| {
                        ui.label("RulerSession");
                        bevy_inspector::ui_for_resource::<RulerSession>(world, ui);
                        ui.separator();

                        ui.label("OrbitCamera");
                        bevy_inspector::ui_for_resource::<OrbitCamera>(world, ui);
                    });

                ui.separator();

                egui::CollapsingHeader::new("Entities")
                    .default_open(false)
                    .show(ui, |ui: &mut egui::Ui| {
                        bevy_inspector::ui_for_entities(world, ui);
                    });
            });
        });
}
