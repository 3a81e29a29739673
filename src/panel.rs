/// Floating ruler panel: label entry, unit toggle, last reading and Send.
///
/// Also hosts the "Measurement sent" confirmation shown after a broadcast.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use egui_phosphor::regular;

use crate::messaging::{MeasurementSent, MessagingClient, PublishStatus, SendMeasurement};
use crate::ruler::{ClearMeasurements, Measurement, RulerSession};
use crate::units::LengthUnit;

#[derive(Resource, Default)]
pub struct RulerPanelState {
    /// Free text prefixed to broadcast payloads
    pub label: String,
    /// Pending confirmation message
    pub alert: Option<String>,
}

/// What the user asked for this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelActions {
    pub send: bool,
    pub clear: bool,
}

/// Everything the panel body reads or edits.
pub struct PanelView<'a> {
    pub label: &'a mut String,
    pub unit: &'a mut LengthUnit,
    pub last: Option<&'a Measurement>,
    pub hint: &'a str,
    pub status: &'a PublishStatus,
    pub messaging_enabled: bool,
}

pub fn ruler_panel_ui(ui: &mut egui::Ui, view: PanelView<'_>) -> PanelActions {
    let mut actions = PanelActions::default();

    ui.horizontal(|ui| {
        ui.label("Label:");
        ui.text_edit_singleline(view.label);
    });

    ui.horizontal(|ui| {
        ui.label("Unit:");
        ui.selectable_value(view.unit, LengthUnit::Inches, "in");
        ui.selectable_value(view.unit, LengthUnit::Centimeters, "cm");
    });

    ui.separator();

    match view.last {
        Some(m) => {
            ui.label(egui::RichText::new(m.display_text()).heading().strong());
            ui.label(
                egui::RichText::new(format!("{}", m.meters()))
                    .small()
                    .weak(),
            );
        }
        None => {
            ui.label(egui::RichText::new("No measurement").weak());
        }
    }
    ui.label(view.hint);

    ui.separator();

    ui.horizontal(|ui| {
        let can_send = view.last.is_some() && view.messaging_enabled;
        let send = ui.add_enabled(
            can_send,
            egui::Button::new(format!("{} Send", regular::PAPER_PLANE_TILT)),
        );
        if send.clicked() {
            actions.send = true;
        }
        if ui.button(format!("{} Clear", regular::TRASH)).clicked() {
            actions.clear = true;
        }
    });

    ui.label(egui::RichText::new(view.status.label()).small());

    actions
}

/// Modal-style confirmation with a single OK button.
pub fn sent_alert_ui(ctx: &egui::Context, alert: &mut Option<String>) {
    let Some(message) = alert.as_ref() else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new("sent_alert")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(message.as_str());
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

    if dismissed {
        *alert = None;
    }
}

pub fn render_ruler_panel(
    mut contexts: EguiContexts,
    mut panel: ResMut<RulerPanelState>,
    mut session: ResMut<RulerSession>,
    client: Res<MessagingClient>,
    mut sent_events: MessageReader<MeasurementSent>,
    mut send_requests: MessageWriter<SendMeasurement>,
    mut clear_requests: MessageWriter<ClearMeasurements>,
) {
    if sent_events.read().last().is_some() {
        panel.alert = Some("Measurement sent".to_string());
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut unit = session.selected_unit;
    let last = session.last;
    let panel = &mut *panel;

    let actions = egui::Window::new(format!("{} Ruler", regular::RULER))
        .default_pos(egui::pos2(12.0, 12.0))
        .resizable(false)
        .show(ctx, |ui| {
            ruler_panel_ui(
                ui,
                PanelView {
                    label: &mut panel.label,
                    unit: &mut unit,
                    last: last.as_ref(),
                    hint: session.hint(),
                    status: &client.status,
                    messaging_enabled: client.is_enabled(),
                },
            )
        })
        .and_then(|r| r.inner)
        .unwrap_or_default();

    // Only touch the session when the unit really changed
    if unit != session.selected_unit {
        session.selected_unit = unit;
        info!("Unit set to {}", unit);
    }

    if actions.send {
        send_requests.write(SendMeasurement {
            label: panel.label.clone(),
        });
    }
    if actions.clear {
        clear_requests.write(ClearMeasurements);
    }

    sent_alert_ui(ctx, &mut panel.alert);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;
    use egui_kittest::{Harness, kittest::Queryable};

    struct Fixture {
        label: String,
        unit: LengthUnit,
        session: RulerSession,
        status: PublishStatus,
        enabled: bool,
    }

    impl Fixture {
        fn new(unit: LengthUnit) -> Self {
            Self {
                label: String::new(),
                unit,
                session: RulerSession::new(unit),
                status: PublishStatus::Idle,
                enabled: true,
            }
        }

        fn measured(unit: LengthUnit) -> Self {
            let mut fixture = Self::new(unit);
            fixture.session.on_tap(Vec3::ZERO);
            fixture.session.on_tap(Vec3::X);
            fixture
        }
    }

    fn harness(fixture: Fixture) -> Harness<'static, Fixture> {
        Harness::new_ui_state(
            |ui, f: &mut Fixture| {
                let last = f.session.last;
                ruler_panel_ui(
                    ui,
                    PanelView {
                        label: &mut f.label,
                        unit: &mut f.unit,
                        last: last.as_ref(),
                        hint: f.session.hint(),
                        status: &f.status,
                        messaging_enabled: f.enabled,
                    },
                );
            },
            fixture,
        )
    }

    #[test]
    fn test_panel_shows_controls() {
        let harness = harness(Fixture::new(LengthUnit::Inches));
        harness.get_by_label("Label:");
        harness.get_by_label("Unit:");
        harness.get_by_label("in");
        harness.get_by_label("cm");
        harness.get_by_label("No measurement");
        harness.get_by_label("Tap start point");
        harness.get_by_label("Ready");
    }

    #[test]
    fn test_panel_shows_last_measurement_in_inches() {
        let harness = harness(Fixture::measured(LengthUnit::Inches));
        harness.get_by_label("39.37 in");
        harness.get_by_label("1.000 m");
    }

    #[test]
    fn test_panel_shows_last_measurement_in_centimeters() {
        let harness = harness(Fixture::measured(LengthUnit::Centimeters));
        harness.get_by_label("100.00 cm");
    }

    #[test]
    fn test_panel_shows_failed_status() {
        let mut fixture = Fixture::measured(LengthUnit::Inches);
        fixture.status = PublishStatus::Failed("endpoint answered HTTP 500".to_string());
        let harness = harness(fixture);
        harness.get_by_label("Failed: endpoint answered HTTP 500");
    }

    #[test]
    fn test_alert_shows_message() {
        let harness = Harness::new_state(
            |ctx, alert: &mut Option<String>| {
                sent_alert_ui(ctx, alert);
            },
            Some("Measurement sent".to_string()),
        );
        harness.get_by_label("Measurement sent");
        harness.get_by_label("OK");
    }

    #[test]
    fn test_no_alert_without_message() {
        let harness = Harness::new_state(
            |ctx, alert: &mut Option<String>| {
                sent_alert_ui(ctx, alert);
            },
            None,
        );
        assert!(harness.query_by_label("OK").is_none());
    }
}
