//! Quarter-turn rotation values
//!
//! Page rotations in PDF are restricted to multiples of 90 degrees. This
//! module models them as a closed set so no other angle is representable.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Angle that is not a multiple of 90 degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid rotation angle: {0} (must be a multiple of 90)")]
pub struct InvalidAngle(pub i64);

/// Rotation direction for a single quarter-turn step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RotateDirection {
    #[default]
    Clockwise,
    CounterClockwise,
}

/// Clockwise rotation in quarter-turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All rotations in clockwise order starting from 0°
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Build from a signed number of quarter-turns, wrapping modulo 4
    pub fn from_quarter_turns(turns: i64) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    /// Number of clockwise quarter-turns (0..=3)
    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Angle in degrees (0, 90, 180 or 270)
    pub fn degrees(self) -> u16 {
        u16::from(self.quarter_turns()) * 90
    }

    /// Advance by +90°, wrapping 270° back to 0°
    pub fn clockwise(self) -> Self {
        Self::from_quarter_turns(i64::from(self.quarter_turns()) + 1)
    }

    /// Step back by 90°, wrapping 0° to 270°
    pub fn counter_clockwise(self) -> Self {
        Self::from_quarter_turns(i64::from(self.quarter_turns()) - 1)
    }

    /// One quarter-turn step in the given direction
    pub fn step(self, direction: RotateDirection) -> Self {
        match direction {
            RotateDirection::Clockwise => self.clockwise(),
            RotateDirection::CounterClockwise => self.counter_clockwise(),
        }
    }

    /// Sum of two rotations modulo 360°
    pub fn compose(self, other: Rotation) -> Self {
        Self::from_quarter_turns(i64::from(self.quarter_turns()) + i64::from(other.quarter_turns()))
    }

    pub fn is_identity(self) -> bool {
        self == Self::Deg0
    }

    /// Interpret a raw `/Rotate` value read from a source document.
    ///
    /// Out-of-range multiples of 90 are normalized. Anything else is not a
    /// legal page rotation and is read as 0°, which is how viewers display
    /// such pages.
    pub fn from_pdf_value(value: i64) -> Self {
        Self::try_from(value).unwrap_or_else(|_| {
            tracing::warn!(value, "Ignoring /Rotate value that is not a multiple of 90");
            Self::Deg0
        })
    }
}

impl TryFrom<i64> for Rotation {
    type Error = InvalidAngle;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        if degrees % 90 != 0 {
            return Err(InvalidAngle(degrees));
        }
        Ok(Self::from_quarter_turns(degrees / 90))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        i64::from(rotation.degrees())
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
