pub mod client;

pub use client::*;

use bevy::prelude::*;
use chrono::{DateTime, Local};
use std::time::Duration;

use crate::config::{AppConfig, MessagingConfig};
use crate::ruler::{Measurement, RulerSession};

/// Ask for the latest measurement to be broadcast with the given label.
#[derive(Message, Debug, Clone)]
pub struct SendMeasurement {
    pub label: String,
}

/// Fired once per successful broadcast.
#[derive(Message, Debug, Clone)]
pub struct MeasurementSent {
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PublishStatus {
    #[default]
    Disabled,
    Idle,
    Sending,
    Sent(DateTime<Local>),
    Failed(String),
}

impl PublishStatus {
    pub fn label(&self) -> String {
        match self {
            PublishStatus::Disabled => "Messaging off".to_string(),
            PublishStatus::Idle => "Ready".to_string(),
            PublishStatus::Sending => "Sending...".to_string(),
            PublishStatus::Sent(at) => format!("Sent {}", at.format("%H:%M:%S")),
            PublishStatus::Failed(msg) => format!("Failed: {}", msg),
        }
    }
}

/// Main-thread side of the measurement broadcaster.
#[derive(Resource, Default)]
pub struct MessagingClient {
    handle: Option<PublisherHandle>,
    pub channel: String,
    pub event: String,
    pub status: PublishStatus,
    in_flight: usize,
}

impl MessagingClient {
    pub fn new(handle: PublisherHandle, config: &MessagingConfig) -> Self {
        Self {
            handle: Some(handle),
            channel: config.channel.clone(),
            event: config.event_name.clone(),
            status: PublishStatus::Idle,
            in_flight: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_running())
    }

    /// Queue `measurement` with `label` for broadcast.
    pub fn send(&mut self, measurement: &Measurement, label: &str) -> Result<(), PublishError> {
        let handle = self.handle.as_ref().ok_or(PublishError::Closed)?;
        handle.publish(PublishRequest {
            channel: self.channel.clone(),
            event: self.event.clone(),
            payload: measurement.broadcast_text(label),
        })?;
        self.in_flight += 1;
        self.status = PublishStatus::Sending;
        Ok(())
    }

    /// Pull finished results and update the status. Returns successful payloads.
    pub fn poll(&mut self) -> Vec<String> {
        let Some(handle) = self.handle.as_ref() else {
            return Vec::new();
        };

        let mut sent = Vec::new();
        for result in handle.drain_results() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match result.outcome {
                Ok(at) => {
                    info!("Measurement sent on {}: {}", result.request.channel, result.request.payload);
                    self.status = PublishStatus::Sent(at.with_timezone(&Local));
                    sent.push(result.request.payload);
                }
                Err(e) => {
                    warn!("Failed to send measurement: {}", e);
                    self.status = PublishStatus::Failed(e);
                }
            }
        }
        if self.in_flight > 0 {
            self.status = PublishStatus::Sending;
        }
        sent
    }

    pub fn shutdown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.shutdown();
            info!("Messaging stopped");
        }
        self.status = PublishStatus::Disabled;
    }
}

pub struct MessagingPlugin;

impl Plugin for MessagingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MessagingClient>()
            .add_message::<SendMeasurement>()
            .add_message::<MeasurementSent>()
            .add_systems(Startup, setup_messaging)
            .add_systems(
                Update,
                (
                    send_requested_measurements,
                    collect_publish_results.after(send_requested_measurements),
                    shutdown_on_exit,
                ),
            );
    }
}

fn build_transport(config: &MessagingConfig) -> Result<Transport, PublishError> {
    if config.endpoint_url.trim().is_empty() {
        return Ok(Transport::Log);
    }
    let http = HttpTransport::new(
        config.endpoint_url.trim(),
        config.auth_token.clone(),
        Duration::from_millis(config.timeout_ms),
    )?;
    Ok(Transport::Http(http))
}

/// Start the publisher worker from config.
pub fn setup_messaging(mut commands: Commands, app_config: Res<AppConfig>) {
    let config = &app_config.messaging;
    if !config.enabled {
        info!("Messaging disabled in config");
        return;
    }

    let transport = match build_transport(config) {
        Ok(t) => t,
        Err(e) => {
            warn!("Messaging unavailable: {}", e);
            commands.insert_resource(MessagingClient {
                status: PublishStatus::Failed(e.to_string()),
                ..default()
            });
            return;
        }
    };

    if matches!(transport, Transport::Log) {
        info!("No messaging endpoint configured, measurements will be logged");
    } else {
        info!("Publishing measurements to {} on {}", config.endpoint_url, config.channel);
    }

    match PublisherHandle::spawn(transport) {
        Ok(handle) => commands.insert_resource(MessagingClient::new(handle, config)),
        Err(e) => {
            error!("Failed to start publisher thread: {}", e);
            commands.insert_resource(MessagingClient {
                status: PublishStatus::Failed(e.to_string()),
                ..default()
            });
        }
    }
}

fn send_requested_measurements(
    mut requests: MessageReader<SendMeasurement>,
    session: Res<RulerSession>,
    mut client: ResMut<MessagingClient>,
) {
    for request in requests.read() {
        let Some(measurement) = session.last else {
            debug!("Send requested with no measurement");
            continue;
        };
        if let Err(e) = client.send(&measurement, &request.label) {
            warn!("Cannot send measurement: {}", e);
            client.status = PublishStatus::Failed(e.to_string());
        }
    }
}

fn collect_publish_results(
    mut client: ResMut<MessagingClient>,
    mut sent_events: MessageWriter<MeasurementSent>,
) {
    for payload in client.poll() {
        sent_events.write(MeasurementSent { payload });
    }
}

fn shutdown_on_exit(mut exit: MessageReader<AppExit>, mut client: ResMut<MessagingClient>) {
    if exit.read().next().is_some() {
        client.shutdown();
    }
}
