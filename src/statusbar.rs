use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::messaging::{MessagingClient, PublishStatus};
use crate::ruler::RulerSession;
use crate::theme::{AppTheme, to_egui_color32};

/// FPS smoothing state using exponential moving average.
#[derive(Resource, Default)]
pub struct StatusBarState {
    /// Smoothed FPS value
    pub fps: f32,
}

impl StatusBarState {
    pub fn record_frame(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let instant_fps = 1.0 / dt;
        if self.fps == 0.0 {
            self.fps = instant_fps;
        } else {
            self.fps += FPS_SMOOTHING * (instant_fps - self.fps);
        }
    }
}

/// Height of the statusbar in pixels.
const STATUSBAR_HEIGHT: f32 = 22.0;
/// Font size for all statusbar text.
const FONT_SIZE: f32 = 11.0;
/// EMA smoothing factor for FPS (lower = smoother, 0.05 = ~1s window at 60fps).
const FPS_SMOOTHING: f32 = 0.05;

/// Render the bottom statusbar as an egui BottomPanel.
pub fn render_statusbar(
    mut contexts: EguiContexts,
    theme: Res<AppTheme>,
    session: Res<RulerSession>,
    client: Res<MessagingClient>,
    time: Res<Time>,
    mut state: ResMut<StatusBarState>,
) {
    state.record_frame(time.delta_secs());

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let panel_bg = to_egui_color32(theme.bg_secondary());
    let border_color = to_egui_color32(theme.bg_contrast());
    let dim = to_egui_color32(theme.text_dim());
    let primary = to_egui_color32(theme.text());

    let frame = egui::Frame::default()
        .fill(panel_bg)
        .stroke(egui::Stroke::new(1.0, border_color))
        .inner_margin(egui::Margin::symmetric(8, 2));

    egui::TopBottomPanel::bottom("statusbar")
        .exact_height(STATUSBAR_HEIGHT)
        .frame(frame)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;

                render_publisher_section(ui, &client.status, &theme);

                separator(ui, dim);

                ui.label(egui::RichText::new(session.hint()).size(FONT_SIZE).color(primary));

                separator(ui, dim);

                ui.label(
                    egui::RichText::new(format!("Unit: {}", session.selected_unit))
                        .size(FONT_SIZE)
                        .color(primary),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0} FPS", state.fps))
                            .size(FONT_SIZE)
                            .color(dim),
                    );
                });
            });
        });
}

/// Render the publisher status dot and label.
fn render_publisher_section(ui: &mut egui::Ui, status: &PublishStatus, theme: &AppTheme) {
    let color = match status {
        PublishStatus::Disabled => theme.text_dim(),
        PublishStatus::Idle | PublishStatus::Sent(_) => theme.text_success(),
        PublishStatus::Sending => theme.text_warn(),
        PublishStatus::Failed(_) => theme.text_error(),
    };
    let color = to_egui_color32(color);

    let (rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, color);
    ui.label(egui::RichText::new(status.label()).size(FONT_SIZE).color(color));
}

/// Draw a dim vertical separator between statusbar sections.
fn separator(ui: &mut egui::Ui, color: egui::Color32) {
    ui.label(egui::RichText::new("|").size(FONT_SIZE).color(color));
}
