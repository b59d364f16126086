use core::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[cfg(windows)]
use winsafe::co;

bitflags! {
    /// The fields of a [`DisplayMode`] the OS should honor when the mode is applied.
    ///
    /// Fields that are not marked present are ignored, even if populated.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ModeFields: u32 {
        const BITS_PER_PEL = 1 << 0;
        const PELS_WIDTH = 1 << 1;
        const PELS_HEIGHT = 1 << 2;
        const DISPLAY_FREQUENCY = 1 << 3;
    }
}

/// Contains the position of a display on the virtual desktop
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a position
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Contains the resolution of a display
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Creates a new resolution
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors that occur while parsing a resolution from a string
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseResolutionError {
    #[error("Invalid resolution format: {0:?}. Expected format: <width>x<height>")]
    MissingSeparator(String),
    #[error("Invalid width in {input:?}: {source}")]
    Width {
        input: String,
        source: std::num::ParseIntError,
    },
    #[error("Invalid height in {input:?}: {source}")]
    Height {
        input: String,
        source: std::num::ParseIntError,
    },
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    /// Parses `<width>x<height>`; the separator is case-insensitive.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        let (width, height) = lowered
            .split_once('x')
            .ok_or_else(|| ParseResolutionError::MissingSeparator(s.to_string()))?;
        let width = width
            .trim()
            .parse()
            .map_err(|source| ParseResolutionError::Width {
                input: s.to_string(),
                source,
            })?;
        let height = height
            .trim()
            .parse()
            .map_err(|source| ParseResolutionError::Height {
                input: s.to_string(),
                source,
            })?;
        Ok(Self::new(width, height))
    }
}

/// Refresh rate in Hz. Zero means the driver did not report a usable rate.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshRate(pub u32);

impl RefreshRate {
    pub fn is_set(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RefreshRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Color depth in bits per pixel
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitDepth(pub u32);

/// Contains the orientation of a display
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Orientation {
    #[default]
    Landscape, // default
    LandscapeFlipped, // upside-down
    Portrait,         // rotate right
    PortraitFlipped,  // rotate left
}

#[cfg(windows)]
impl Orientation {
    /// Creates a new orientation from `winsafe::co::DMDO`
    pub(crate) fn from_winsafe(co_dmdo: co::DMDO) -> Option<Self> {
        match co_dmdo {
            co::DMDO::DEFAULT => Some(Orientation::Landscape),
            co::DMDO::D90 => Some(Orientation::PortraitFlipped),
            co::DMDO::D180 => Some(Orientation::LandscapeFlipped),
            co::DMDO::D270 => Some(Orientation::Portrait),
            _ => None,
        }
    }

    pub(crate) fn to_winsafe(self) -> co::DMDO {
        match self {
            Orientation::Landscape => co::DMDO::DEFAULT,
            Orientation::PortraitFlipped => co::DMDO::D90,
            Orientation::LandscapeFlipped => co::DMDO::D180,
            Orientation::Portrait => co::DMDO::D270,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "Default"),
            Orientation::LandscapeFlipped => write!(f, "UpsideDown"),
            Orientation::Portrait => write!(f, "Right"),
            Orientation::PortraitFlipped => write!(f, "Left"),
        }
    }
}

/// Contains the fixed output (scaling) of a display
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FixedOutput {
    #[default]
    Default,
    Stretch,
    Center,
}

#[cfg(windows)]
impl FixedOutput {
    /// Creates a new fixed output from `winsafe::co::DMDFO`
    pub(crate) fn from_winsafe(co_dmdfo: co::DMDFO) -> Option<Self> {
        match co_dmdfo {
            co::DMDFO::DEFAULT => Some(FixedOutput::Default),
            co::DMDFO::STRETCH => Some(FixedOutput::Stretch),
            co::DMDFO::CENTER => Some(FixedOutput::Center),
            _ => None,
        }
    }

    pub(crate) fn to_winsafe(self) -> co::DMDFO {
        match self {
            FixedOutput::Default => co::DMDFO::DEFAULT,
            FixedOutput::Stretch => co::DMDFO::STRETCH,
            FixedOutput::Center => co::DMDFO::CENTER,
        }
    }
}

impl fmt::Display for FixedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixedOutput::Default => write!(f, "Default"),
            FixedOutput::Stretch => write!(f, "Stretch"),
            FixedOutput::Center => write!(f, "Center"),
        }
    }
}

/// One concrete mode of a display, as reported by or handed to the OS.
///
/// Only the attributes in [`DisplayMode::fields`] are honored when the mode is applied; everything
/// else is carried along so a mode cloned from the current one keeps the driver's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMode {
    pub device_name: String,
    pub position: Position,
    pub orientation: Orientation,
    pub fixed_output: FixedOutput,
    pub resolution: Resolution,
    pub bit_depth: BitDepth,
    pub refresh_rate: RefreshRate,
    pub fields: ModeFields,
}

impl DisplayMode {
    /// Creates a mode with no fields marked present
    pub fn new(resolution: Resolution, bit_depth: BitDepth, refresh_rate: RefreshRate) -> Self {
        Self {
            device_name: String::new(),
            position: Position::default(),
            orientation: Orientation::default(),
            fixed_output: FixedOutput::default(),
            resolution,
            bit_depth,
            refresh_rate,
            fields: ModeFields::empty(),
        }
    }

    /// The refresh rate the OS will be asked for, if any.
    pub fn applied_refresh_rate(&self) -> Option<RefreshRate> {
        if self.fields.contains(ModeFields::DISPLAY_FREQUENCY) && self.refresh_rate.is_set() {
            Some(self.refresh_rate)
        } else {
            None
        }
    }

    pub fn summary(&self) -> ModeSummary {
        ModeSummary {
            width: self.resolution.width,
            height: self.resolution.height,
            refresh_rate: self.refresh_rate,
            bits_per_pixel: self.bit_depth,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DisplayMode {{ device: {}, resolution: {}, refresh_rate: {}, bpp: {}, position: {}, orientation: {}, fixed_output: {}, fields: {:?} }}",
            self.device_name,
            self.resolution,
            self.refresh_rate,
            self.bit_depth.0,
            self.position,
            self.orientation,
            self.fixed_output,
            self.fields
        )
    }
}

/// The user-facing part of a [`DisplayMode`], used when listing supported modes
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModeSummary {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: RefreshRate,
    pub bits_per_pixel: BitDepth,
}

impl fmt::Display for ModeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {} Hz ({} bpp)",
            self.width, self.height, self.refresh_rate, self.bits_per_pixel.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolution() {
        assert_eq!("1920x1080".parse(), Ok(Resolution::new(1920, 1080)));
    }

    #[test]
    fn resolution_separator_is_case_insensitive() {
        assert_eq!("1920X1080".parse(), Ok(Resolution::new(1920, 1080)));
    }

    #[test]
    fn resolution_parts_may_be_padded() {
        assert_eq!(" 2560 x 1440 ".parse(), Ok(Resolution::new(2560, 1440)));
    }

    #[test]
    fn rejects_non_numeric_width() {
        let err = "abcx1080".parse::<Resolution>().unwrap_err();
        assert!(matches!(err, ParseResolutionError::Width { .. }));
    }

    #[test]
    fn rejects_wrong_separator() {
        let err = "1920-1080".parse::<Resolution>().unwrap_err();
        assert_eq!(
            err,
            ParseResolutionError::MissingSeparator("1920-1080".to_string())
        );
    }

    #[test]
    fn rejects_trailing_dimension() {
        let err = "1920x1080x60".parse::<Resolution>().unwrap_err();
        assert!(matches!(err, ParseResolutionError::Height { .. }));
    }

    #[test]
    fn refresh_rate_only_applied_when_marked_present() {
        let mut mode = DisplayMode::new(Resolution::new(1920, 1080), BitDepth(32), RefreshRate(60));
        assert_eq!(mode.applied_refresh_rate(), None);

        mode.fields |= ModeFields::DISPLAY_FREQUENCY;
        assert_eq!(mode.applied_refresh_rate(), Some(RefreshRate(60)));

        mode.refresh_rate = RefreshRate(0);
        assert_eq!(mode.applied_refresh_rate(), None);
    }

    #[test]
    fn summary_serializes_flat() {
        let mode = DisplayMode::new(Resolution::new(1680, 1050), BitDepth(32), RefreshRate(75));
        let json = serde_json::to_value(mode.summary()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "width": 1680,
                "height": 1050,
                "refresh_rate": 75,
                "bits_per_pixel": 32
            })
        );
        assert_eq!(mode.summary().to_string(), "1680x1050 @ 75 Hz (32 bpp)");
    }
}
