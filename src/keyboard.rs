use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::ruler::{ClearMeasurements, RulerSession};

/// Resource for help overlay visibility
#[derive(Resource, Default)]
pub struct HelpOverlayState {
    pub visible: bool,
}

/// Shortcuts shown in the help overlay.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("Left click / tap", "Place start or end point"),
    ("Right drag", "Orbit camera"),
    ("Scroll / pinch", "Move closer or farther"),
    ("U", "Toggle inches / centimeters"),
    ("Esc", "Clear measurement"),
    ("H", "Toggle this help"),
    ("F12", "Toggle inspector"),
];

/// System to handle keyboard shortcuts
pub fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<RulerSession>,
    mut help_state: ResMut<HelpOverlayState>,
    mut clear_requests: MessageWriter<ClearMeasurements>,
    mut contexts: EguiContexts,
) {
    // Typing in the label field must not trigger shortcuts
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }

    // U - Toggle display unit
    if keyboard.just_pressed(KeyCode::KeyU) {
        let unit = session.toggle_unit();
        info!("Unit set to {}", unit);
    }

    // Escape - Close help first, otherwise clear the measurement
    if keyboard.just_pressed(KeyCode::Escape) {
        if help_state.visible {
            help_state.visible = false;
        } else {
            clear_requests.write(ClearMeasurements);
        }
    }

    // H - Toggle help overlay
    if keyboard.just_pressed(KeyCode::KeyH) {
        help_state.visible = !help_state.visible;
    }
}

/// Render the help overlay listing all shortcuts.
pub fn render_help_overlay(mut contexts: EguiContexts, help_state: Res<HelpOverlayState>) {
    if !help_state.visible {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    bevy_egui::egui::Window::new("Shortcuts")
        .collapsible(false)
        .resizable(false)
        .anchor(bevy_egui::egui::Align2::RIGHT_TOP, bevy_egui::egui::vec2(-12.0, 12.0))
        .show(ctx, |ui| {
            bevy_egui::egui::Grid::new("shortcuts_grid")
                .num_columns(2)
                .show(ui, |ui| {
                    for (key, action) in SHORTCUTS {
                        ui.strong(*key);
                        ui.label(*action);
                        ui.end_row();
                    }
                });
        });
}
