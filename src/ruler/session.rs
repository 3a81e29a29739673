use bevy::prelude::*;

use crate::geometry::distance;
use crate::units::{LengthUnit, Meters};

/// Which tap comes next.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum TapState {
    #[default]
    AwaitingStart,
    /// Start placed, holding its position until the end tap.
    AwaitingEnd { start: Vec3 },
}

/// A completed start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Measurement {
    pub start: Vec3,
    pub end: Vec3,
    /// Distance converted to `unit`.
    pub distance: f32,
    pub unit: LengthUnit,
}

impl Measurement {
    fn between(start: Vec3, end: Vec3, unit: LengthUnit) -> Self {
        Self {
            start,
            end,
            distance: Meters(distance(start, end)).to_unit(unit),
            unit,
        }
    }

    /// Unconverted length in meters.
    pub fn meters(&self) -> Meters {
        Meters(distance(self.start, self.end))
    }

    /// Text shown next to the end marker, e.g. `12.34 in`.
    pub fn display_text(&self) -> String {
        format!("{:.2} {}", self.distance, self.unit.abbreviation())
    }

    /// Broadcast payload: `<label> <distance> <unit>`.
    pub fn broadcast_text(&self, label: &str) -> String {
        format!("{} {}", label, self.display_text())
    }
}

/// Result of feeding one resolved tap to the session.
#[derive(Debug, Clone, Copy, PartialEq, Message)]
pub enum TapOutcome {
    StartPlaced(Vec3),
    PairCompleted(Measurement),
}

/// Tap counter and unit flag for the measuring interaction.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct RulerSession {
    pub state: TapState,
    pub selected_unit: LengthUnit,
    /// Most recent completed pair; replaced by the next one.
    pub last: Option<Measurement>,
}

impl RulerSession {
    pub fn new(unit: LengthUnit) -> Self {
        Self {
            selected_unit: unit,
            ..default()
        }
    }

    /// Advance the state machine with a point that hit a surface.
    pub fn on_tap(&mut self, point: Vec3) -> TapOutcome {
        match self.state {
            TapState::AwaitingStart => {
                self.state = TapState::AwaitingEnd { start: point };
                TapOutcome::StartPlaced(point)
            }
            TapState::AwaitingEnd { start } => {
                let measurement = Measurement::between(start, point, self.selected_unit);
                self.state = TapState::AwaitingStart;
                self.last = Some(measurement);
                TapOutcome::PairCompleted(measurement)
            }
        }
    }

    pub fn toggle_unit(&mut self) -> LengthUnit {
        self.selected_unit = self.selected_unit.toggled();
        self.selected_unit
    }

    /// Drop any pending start and the last result.
    pub fn reset(&mut self) {
        self.state = TapState::AwaitingStart;
        self.last = None;
    }

    #[cfg(test)]
    pub fn pending_start(&self) -> Option<Vec3> {
        match self.state {
            TapState::AwaitingStart => None,
            TapState::AwaitingEnd { start } => Some(start),
        }
    }

    /// Short prompt for the status bar.
    pub fn hint(&self) -> &'static str {
        match self.state {
            TapState::AwaitingStart => "Tap start point",
            TapState::AwaitingEnd { .. } => "Tap end point",
        }
    }
}
