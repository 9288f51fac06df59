use std::fmt;

use serde::{Deserialize, Serialize};

/// IELTS band on the half-point scale, stored as half-steps (2 = 1.0, 18 = 9.0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f32", try_from = "f32")]
pub struct Band(u8);

impl Band {
    pub const MIN: Band = Band(2);
    pub const MAX: Band = Band(18);

    pub fn from_half_steps(steps: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0).contains(&steps).then_some(Band(steps))
    }

    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 2.0
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f32())
    }
}

impl From<Band> for f32 {
    fn from(band: Band) -> f32 {
        band.as_f32()
    }
}

impl TryFrom<f32> for Band {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        let steps = value * 2.0;
        if steps.fract() != 0.0 {
            return Err(format!("{value} is not on the half-band scale"));
        }
        Band::from_half_steps(steps as u8).ok_or_else(|| format!("{value} is outside 1.0-9.0"))
    }
}

/// Raw-score to band conversion for a fixed number of items.
pub struct BandTable {
    items: u32,
    /// (minimum correct, band half-steps), highest first.
    steps: &'static [(u32, u8)],
}

const LISTENING_40: &[(u32, u8)] = &[
    (39, 18),
    (37, 17),
    (35, 16),
    (32, 15),
    (30, 14),
    (26, 13),
    (23, 12),
    (18, 11),
    (16, 10),
    (13, 9),
    (10, 8),
    (8, 7),
    (6, 6),
    (4, 5),
    (3, 4),
    (2, 3),
    (0, 2),
];

impl BandTable {
    /// The 40-item listening table.
    pub fn listening() -> Self {
        Self {
            items: 40,
            steps: LISTENING_40,
        }
    }

    pub fn items(&self) -> u32 {
        self.items
    }

    /// Band for `correct` out of the table's own item count.
    pub fn lookup(&self, correct: u32) -> Band {
        let steps = self
            .steps
            .iter()
            .find(|(min, _)| correct >= *min)
            .map(|(_, band)| *band)
            .unwrap_or(Band::MIN.0);
        Band(steps)
    }

    /// Band for `correct` out of `total`; other totals are rescaled to the
    /// table's item count (rounded to nearest) before lookup.
    pub fn band_for(&self, correct: u32, total: u32) -> Band {
        if total == 0 {
            return Band::MIN;
        }
        let correct = correct.min(total);
        if total == self.items {
            return self.lookup(correct);
        }
        let scaled = (f64::from(correct) * f64::from(self.items) / f64::from(total)).round();
        self.lookup(scaled as u32)
    }
}
