//! Length units for measurements.
//!
//! Raw distances are always carried in meters; conversion to a display unit
//! happens once, when a tap pair completes.

use bevy::prelude::Reflect;
use serde::{Deserialize, Serialize};

/// Conversion factor: meters to inches
pub const METERS_TO_INCHES: f32 = 39.3701;

/// Conversion factor: meters to centimeters
pub const METERS_TO_CENTIMETERS: f32 = 100.0;

pub fn meters_to_inches(m: f32) -> f32 {
    m * METERS_TO_INCHES
}

pub fn meters_to_centimeters(m: f32) -> f32 {
    m * METERS_TO_CENTIMETERS
}

/// Distance in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Meters(pub f32);

impl Meters {
    /// Convert to inches.
    pub fn to_inches(self) -> f32 {
        meters_to_inches(self.0)
    }

    /// Convert to centimeters.
    pub fn to_centimeters(self) -> f32 {
        meters_to_centimeters(self.0)
    }

    /// Convert to the given display unit.
    pub fn to_unit(self, unit: LengthUnit) -> f32 {
        match unit {
            LengthUnit::Inches => self.to_inches(),
            LengthUnit::Centimeters => self.to_centimeters(),
        }
    }
}

impl std::fmt::Display for Meters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} m", self.0)
    }
}

/// Display unit selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Inches,
    Centimeters,
}

impl LengthUnit {
    /// Short suffix used in labels and broadcast payloads.
    pub fn abbreviation(self) -> &'static str {
        match self {
            LengthUnit::Inches => "in",
            LengthUnit::Centimeters => "cm",
        }
    }

    /// The other unit.
    pub fn toggled(self) -> Self {
        match self {
            LengthUnit::Inches => LengthUnit::Centimeters,
            LengthUnit::Centimeters => LengthUnit::Inches,
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_meter_in_inches() {
        assert!((meters_to_inches(1.0) - 39.3701).abs() < 1e-4);
    }

    #[test]
    fn one_meter_in_centimeters() {
        assert_eq!(meters_to_centimeters(1.0), 100.0);
    }

    #[test]
    fn conversion_does_not_round() {
        let m = Meters(0.123_456);
        assert!((m.to_centimeters() - 12.3456).abs() < 1e-4);
        assert!((m.to_inches() - 0.123_456 * 39.3701).abs() < 1e-5);
    }

    #[test]
    fn to_unit_matches_direct_conversion() {
        let m = Meters(2.5);
        assert_eq!(m.to_unit(LengthUnit::Inches), m.to_inches());
        assert_eq!(m.to_unit(LengthUnit::Centimeters), m.to_centimeters());
    }

    #[test]
    fn toggle_flips_between_the_two_units() {
        assert_eq!(LengthUnit::Inches.toggled(), LengthUnit::Centimeters);
        assert_eq!(LengthUnit::Centimeters.toggled(), LengthUnit::Inches);
        assert_eq!(LengthUnit::Inches.toggled().toggled(), LengthUnit::Inches);
    }

    #[test]
    fn abbreviations() {
        assert_eq!(LengthUnit::Inches.to_string(), "in");
        assert_eq!(LengthUnit::Centimeters.to_string(), "cm");
    }

    #[test]
    fn unit_round_trips_through_toml() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            unit: LengthUnit,
        }
        let text = toml::to_string(&Wrapper { unit: LengthUnit::Centimeters }).unwrap();
        assert!(text.contains("\"centimeters\""));
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.unit, LengthUnit::Centimeters);
    }
}
